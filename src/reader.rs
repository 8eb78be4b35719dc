use crate::error::Result;
use crate::record::{PendingRecord, Record};
use spdlog::prelude::*;
use std::io::BufRead;

/// Serves a time-sorted `time|entity|value` stream one time unit at a time.
///
/// At most one well-formed line is buffered ahead of the consumer, so memory
/// does not depend on the stream length. Lines with the wrong field count or
/// that are not valid UTF-8 are skipped without surfacing to the caller.
pub struct TimeGroupedReader<R> {
    source: R,
    name: &'static str,
    line_buf: Vec<u8>,
    line_no: u64,
    lookahead: Option<PendingRecord>,
    exhausted: bool,
    consumed: u64,
    skipped_malformed: u64,
    skipped_stale: u64,
}

impl<R: BufRead> TimeGroupedReader<R> {
    pub fn new(source: R) -> Self {
        Self::named("input", source)
    }

    /// Creates a reader whose log lines are tagged with `name`.
    pub fn named(name: &'static str, source: R) -> Self {
        Self {
            source,
            name,
            line_buf: Vec::new(),
            line_no: 0,
            lookahead: None,
            exhausted: false,
            consumed: 0,
            skipped_malformed: 0,
            skipped_stale: 0,
        }
    }

    /// Time of the next unconsumed record, or `None` at end of stream.
    ///
    /// Repeated calls without a consume in between return the same value and
    /// read nothing further.
    pub fn peek_time_unit(&mut self) -> Result<Option<i64>> {
        Ok(self.fill()?.map(|pending| pending.time))
    }

    /// Hands every consecutive record stamped `time` to `sink` and returns how
    /// many there were. Stops before the first record of another time unit.
    pub fn consume_time_unit(&mut self, time: i64, mut sink: impl FnMut(Record)) -> Result<u64> {
        let mut count = 0;
        while self.peek_time_unit()? == Some(time) {
            let Some(pending) = self.lookahead.take() else {
                break;
            };
            sink(pending.into_record()?);
            count += 1;
        }
        self.consumed += count;
        Ok(count)
    }

    /// Drops records stamped earlier than `time`. Returns the number dropped.
    pub fn skip_before(&mut self, time: i64) -> Result<u64> {
        let mut count = 0;
        loop {
            let Some((line, past)) = self.fill()?.map(|pending| (pending.line, pending.time))
            else {
                break;
            };
            if past >= time {
                break;
            }
            trace!(
                "[{}] line {}: dropping record for past time unit {}",
                self.name, line, past
            );
            self.lookahead = None;
            count += 1;
        }
        self.skipped_stale += count;
        Ok(count)
    }

    pub fn records_consumed(&self) -> u64 {
        self.consumed
    }

    pub fn lines_skipped(&self) -> u64 {
        self.skipped_malformed
    }

    pub fn records_dropped(&self) -> u64 {
        self.skipped_stale
    }

    fn fill(&mut self) -> Result<Option<&PendingRecord>> {
        if self.lookahead.is_none() && !self.exhausted {
            self.lookahead = self.next_well_formed()?;
            self.exhausted = self.lookahead.is_none();
        }
        Ok(self.lookahead.as_ref())
    }

    fn next_well_formed(&mut self) -> Result<Option<PendingRecord>> {
        loop {
            self.line_buf.clear();
            if self.source.read_until(b'\n', &mut self.line_buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let parsed = match std::str::from_utf8(&self.line_buf) {
                Ok(text) => PendingRecord::parse(self.line_no, text)?,
                Err(_) => None,
            };
            if let Some(pending) = parsed {
                return Ok(Some(pending));
            }
            self.skipped_malformed += 1;
            trace!("[{}] line {}: skipping malformed line", self.name, self.line_no);
        }
    }
}
