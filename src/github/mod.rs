pub mod client;
pub mod models;
pub mod detector;
pub mod workflow_parser;

pub use client::GitHubClient;
pub use models::*;
pub use detector::{Framework, FrameworkDetector, MarkerFiles};
pub use workflow_parser::{DescriptorError, WorkflowParser};
