use prediction_validation::{
    ErrorWindowPipeline, ReportWriter, RunSummary, SumOverflow, ValidationError,
};
use std::io::Cursor;
use std::num::NonZeroUsize;

const BIG: &str = "40000000000000000000000000000";

fn validate_err(window: usize, actual: &str, predicted: &str) -> (String, ValidationError) {
    let mut writer = ReportWriter::new(Vec::new());
    let err = ErrorWindowPipeline::new(
        NonZeroUsize::new(window).unwrap(),
        Cursor::new(actual.to_string()),
        Cursor::new(predicted.to_string()),
    )
    .run(&mut writer)
    .unwrap_err();
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    (out, err)
}

fn validate(window: usize, actual: &str, predicted: &str) -> (String, RunSummary) {
    let mut writer = ReportWriter::new(Vec::new());
    let summary = ErrorWindowPipeline::new(
        NonZeroUsize::new(window).unwrap(),
        Cursor::new(actual.to_string()),
        Cursor::new(predicted.to_string()),
    )
    .run(&mut writer)
    .unwrap();
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    (out, summary)
}

#[test]
fn test_single_unit_window() {
    let (out, _) = validate(1, "1|AAA|10.00\n", "1|AAA|12.00\n");
    assert_eq!(out, "1|1|2.00\n");
}

#[test]
fn test_window_primes_before_reporting() {
    let (out, summary) = validate(
        2,
        "1|AAA|10.00\n2|AAA|20.00\n",
        "1|AAA|10.00\n2|AAA|22.00\n",
    );
    assert_eq!(out, "1|2|1.00\n");
    assert_eq!(summary.time_units, 2);
    assert_eq!(summary.reports, 1);
}

#[test]
fn test_unit_without_predictions_keeps_alignment() {
    let (out, _) = validate(
        2,
        "1|AAA|10.00\n2|AAA|10.00\n3|AAA|10.00\n4|AAA|10.00\n",
        "1|AAA|11.00\n3|AAA|13.00\n4|BBB|99.00\n",
    );
    // Unit 2 has no prediction, unit 4 only predicts an unknown entity.
    assert_eq!(out, "1|2|1.00\n2|3|3.00\n3|4|3.00\n");
}

#[test]
fn test_window_of_empty_units_is_na() {
    let (out, _) = validate(2, "1|AAA|1.00\n2|AAA|1.00\n3|AAA|1.00\n", "1|AAA|2.00\n");
    assert_eq!(out, "1|2|1.00\n2|3|NA\n");
}

#[test]
fn test_gap_in_actual_time_axis_still_advances() {
    let (out, _) = validate(2, "1|AAA|1.00\n3|AAA|1.00\n", "1|AAA|3.00\n3|AAA|1.00\n");
    assert_eq!(out, "1|2|2.00\n2|3|0.00\n");
}

#[test]
fn test_malformed_lines_do_not_change_output() {
    let actual = "1|AAA|10.00\n1|BBB|5.00\n2|AAA|20.00\n2|BBB|6.00\n";
    let predicted = "1|AAA|11.00\n1|BBB|5.50\n2|AAA|19.00\n2|BBB|6.00\n";
    let (clean, _) = validate(2, actual, predicted);

    let noisy_actual = "junk\n1|AAA|10.00\n1|BBB\n1|BBB|5.00\n\n2|AAA|20.00\n2|BBB|6.00\n||||\n";
    let noisy_predicted = "1|AAA|11.00\n1|BBB|5.50|extra\n1|BBB|5.50\n2|AAA|19.00\nnope\n2|BBB|6.00\n";
    let (noisy, summary) = validate(2, noisy_actual, noisy_predicted);

    assert_eq!(clean, "1|2|0.63\n");
    assert_eq!(noisy, clean);
    assert_eq!(summary.malformed_lines, 6);
}

#[test]
fn test_empty_actual_stream_writes_nothing() {
    let (out, summary) = validate(3, "", "1|AAA|1.00\n");
    assert_eq!(out, "");
    assert_eq!(summary, RunSummary::default());
}

#[test]
fn test_empty_predicted_stream() {
    let (out, summary) = validate(1, "5|AAA|1.00\n6|AAA|1.00\n", "");
    assert_eq!(out, "5|5|NA\n6|6|NA\n");
    assert_eq!(summary.unmatched_actual, 2);
}

#[test]
fn test_start_time_follows_first_actual_record() {
    let (out, _) = validate(3, "10|X|1.00\n11|X|1.00\n12|X|1.00\n13|X|1.00\n", "12|X|1.30\n13|X|0.70\n");
    assert_eq!(out, "10|12|0.30\n11|13|0.30\n");
}

#[test]
fn test_trailing_predictions_are_ignored() {
    let (out, summary) = validate(1, "1|A|1.00\n", "1|A|1.00\n2|A|5.00\n3|A|5.00\n");
    assert_eq!(out, "1|1|0.00\n");
    assert_eq!(summary.predicted_records, 1);
}

#[test]
fn test_invalid_number_keeps_partial_output() {
    let mut writer = ReportWriter::new(Vec::new());
    let err = ErrorWindowPipeline::new(
        NonZeroUsize::new(1).unwrap(),
        Cursor::new("1|A|1.00\n2|A|2.00\n3|A|oops\n4|A|1.00\n"),
        Cursor::new("1|A|1.50\n2|A|2.00\n3|A|1.00\n4|A|1.00\n"),
    )
    .run(&mut writer)
    .unwrap_err();

    assert!(matches!(
        err,
        ValidationError::InvalidNumber { line: 3, field: "value", .. }
    ));
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert_eq!(out, "1|1|0.50\n2|2|0.00\n");
}

#[test]
fn test_invalid_predicted_time_aborts() {
    let mut writer = ReportWriter::new(Vec::new());
    let err = ErrorWindowPipeline::new(
        NonZeroUsize::new(1).unwrap(),
        Cursor::new("1|A|1.00\n2|A|1.00\n"),
        Cursor::new("1|A|1.00\ntwo|A|1.00\n"),
    )
    .run(&mut writer)
    .unwrap_err();

    assert!(matches!(err, ValidationError::InvalidNumber { field: "time", .. }));
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert_eq!(out, "");
}

#[test]
fn test_exact_decimal_deltas() {
    // 0.1 + 0.2 style sums must not pick up binary noise before rounding.
    let (out, _) = validate(
        1,
        "1|A|0.10\n1|B|0.20\n1|C|0.30\n1|D|0.02\n",
        "1|A|0.20\n1|B|0.40\n1|C|0.00\n1|D|0.00\n",
    );
    // (0.10 + 0.20 + 0.30 + 0.02) / 4 = 0.155
    assert_eq!(out, "1|1|0.16\n");
}

#[test]
fn test_bundled_sample() {
    let (out, summary) = validate(
        3,
        include_str!("../demos/stock_window/input/actual.txt"),
        include_str!("../demos/stock_window/input/predicted.txt"),
    );
    assert_eq!(out, "1|3|0.23\n2|4|0.25\n3|5|0.26\n4|6|0.29\n");
    assert_eq!(summary.time_units, 6);
}

#[test]
fn test_delta_overflow_keeps_partial_output() {
    let (out, err) = validate_err(
        1,
        &format!("1|A|1.00\n2|A|{BIG}\n3|A|1.00\n"),
        &format!("1|A|1.25\n2|A|-{BIG}\n3|A|1.00\n"),
    );
    assert!(matches!(err, ValidationError::Overflow(SumOverflow { time: 2 })));
    assert_eq!(out, "1|1|0.25\n");
}

#[test]
fn test_time_unit_sum_overflow_aborts() {
    let (out, err) = validate_err(
        1,
        &format!("1|A|1.00\n2|A|{BIG}\n2|B|{BIG}\n"),
        "1|A|1.00\n2|A|0\n2|B|0\n",
    );
    assert!(matches!(err, ValidationError::Overflow(SumOverflow { time: 2 })));
    assert_eq!(out, "1|1|0.00\n");
}

#[test]
fn test_window_sum_overflow_aborts() {
    // Each unit fits on its own; two of them in one window do not.
    let (out, err) = validate_err(
        2,
        &format!("1|A|1.00\n2|A|1.00\n3|A|{BIG}\n4|A|{BIG}\n5|A|1.00\n"),
        "1|A|1.00\n2|A|1.00\n3|A|0\n4|A|0\n5|A|1.00\n",
    );
    assert!(matches!(err, ValidationError::Overflow(SumOverflow { time: 4 })));
    assert!(out.starts_with("1|2|0.00\n2|3|"));
    assert_eq!(out.lines().count(), 2);
}
