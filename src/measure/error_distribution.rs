use hdrhistogram::{CreationError, Histogram};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Largest trackable delta in cents; larger deltas saturate.
const MAX_CENTS: u64 = 1_000_000_000_000;

/// Summary of the recorded deltas, in cents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionStats {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

/// Distribution of per-entity absolute deltas, bucketed to the cent.
pub struct ErrorDistribution {
    histogram: Histogram<u64>,
}

impl ErrorDistribution {
    pub fn new() -> Result<Self, CreationError> {
        // 3 significant figures
        let histogram = Histogram::<u64>::new_with_bounds(1, MAX_CENTS, 3)?;
        Ok(Self { histogram })
    }

    pub fn record(&mut self, delta: Decimal) {
        let cents = delta
            .abs()
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.round().to_u64())
            .unwrap_or(MAX_CENTS);
        self.histogram.saturating_record(cents);
    }

    pub fn get_stats(&self) -> DistributionStats {
        let count = self.histogram.len();
        if count == 0 {
            return DistributionStats::default();
        }

        DistributionStats {
            count,
            min: self.histogram.min(),
            max: self.histogram.max(),
            mean: self.histogram.mean(),
            p50: self.histogram.value_at_quantile(0.5),
            p90: self.histogram.value_at_quantile(0.9),
            p99: self.histogram.value_at_quantile(0.99),
        }
    }
}

impl DistributionStats {
    pub fn format_stats(&self) -> String {
        if self.count == 0 {
            return "No deltas recorded".into();
        }

        format!(
            "\tsamples={},\tmin={},\tmax={},\tmean={},\tp50={},\tp90={},\tp99={}",
            self.count,
            format_cents(self.min as f64),
            format_cents(self.max as f64),
            format_cents(self.mean),
            format_cents(self.p50 as f64),
            format_cents(self.p90 as f64),
            format_cents(self.p99 as f64),
        )
    }
}

fn format_cents(cents: f64) -> String {
    format!("{:.2}", cents / 100.0)
}
