pub mod report_sources;

pub use report_sources::{CodeSearch, ContentSource, ReportMailer, RunHistorySource};
