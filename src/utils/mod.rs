pub mod file_name;
pub mod logging;
pub mod time_fmt;

pub use file_name::safe_file_stem;
pub use logging::truncate_text;
pub use time_fmt::{format_remaining, progress_percent, TimerUrgency};
