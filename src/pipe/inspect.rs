/// Passes the item through while performing a side effect.
pub fn inspect<T>(mut f: impl FnMut(&T)) -> impl FnMut(&T) -> Option<T>
where
    T: Clone,
{
    move |item| {
        f(item);
        Some(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::WindowReport;
    use crate::accumulator::WindowAverage;

    #[test]
    fn test_inspect_logic() {
        let mut seen = Vec::new();
        let report = WindowReport {
            begin: 1,
            end: 2,
            average: WindowAverage::NotAvailable,
        };

        let res = inspect(|r: &WindowReport| seen.push(r.end))(&report);

        assert_eq!(res, Some(report));
        assert_eq!(seen, vec![2]);
    }
}
