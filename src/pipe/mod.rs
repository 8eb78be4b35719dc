mod inspect;
mod progress;
mod window_average;

pub use inspect::inspect;
pub use progress::{Progress, progress};
pub use window_average::{WindowAverageStage, window_average};
