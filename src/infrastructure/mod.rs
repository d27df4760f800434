pub mod logging;
pub mod notifications;
