//! Outgoing application email

pub mod message;
pub mod sender;

pub use message::OutgoingMail;
pub use sender::{MailTransport, SmtpMailer};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MailError {
    #[error("SMTP authentication failed ({0}). Use an app-specific password for this account; the regular account password will not work")]
    Authentication(String),

    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

impl MailError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, MailError::Authentication(_))
    }
}
