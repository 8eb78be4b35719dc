mod error_distribution;

pub use error_distribution::{DistributionStats, ErrorDistribution};
