pub mod sendgrid_client;

pub use sendgrid_client::{SendGridClient, SendGridMessage};
