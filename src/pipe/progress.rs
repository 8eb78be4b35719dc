use crate::stage::{OutputCollector, Stage};
use spdlog::info;
use std::marker::PhantomData;
use std::time::Instant;

/// A pipe that logs how many items went through it every `interval` items.
pub struct Progress<T> {
    name: String,
    interval: usize,
    count: usize,
    last_instant: Instant,
    start_instant: Instant,
    _phantom: PhantomData<T>,
}

impl<T> Progress<T> {
    pub fn new(name: impl Into<String>, interval: usize) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            interval: interval.max(1),
            count: 0,
            last_instant: now,
            start_instant: now,
            _phantom: PhantomData,
        }
    }
}

impl<T> Stage<T, T> for Progress<T> {
    #[inline(always)]
    fn process<C>(&mut self, data: &T, collector: &mut C)
    where
        C: OutputCollector<T>,
    {
        self.count += 1;
        if self.count.is_multiple_of(self.interval) {
            let now = Instant::now();
            let rate = self.interval as f64 / now.duration_since(self.last_instant).as_secs_f64();
            let avg = self.count as f64 / now.duration_since(self.start_instant).as_secs_f64();

            info!(
                "[{}] Processed {}, Rate: {}/s, Avg: {}/s",
                self.name,
                format_count(self.count as f64),
                format_count(rate),
                format_count(avg)
            );
            self.last_instant = now;
        }
        collector.push(data);
    }
}

pub fn progress<T>(name: impl Into<String>, interval: usize) -> Progress<T> {
    Progress::new(name, interval)
}

fn format_count(val: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "b"), (1e6, "m"), (1e3, "k")];
    if !val.is_finite() {
        return "-".into();
    }
    for (scale, suffix) in UNITS {
        if val >= scale {
            return format!("{:.2}{}", val / scale, suffix);
        }
    }
    if val == val.floor() {
        format!("{:.0}", val)
    } else {
        format!("{:.2}", val)
    }
}
