pub mod counters;
pub mod models;
pub mod render;
pub mod run_history;

pub use counters::{keys, Counters};
pub use models::{ItemStatus, RepoIdentity, WorkflowMatch};
pub use render::EmailReport;
pub use run_history::summarize;
