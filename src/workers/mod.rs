pub mod report_scheduler;

pub use report_scheduler::{run_report_once, run_report_scheduler};
