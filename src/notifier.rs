use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("destinatario inválido: {0}")]
    InvalidRecipient(String),

    #[error("fallo al entregar el mensaje: {0}")]
    Delivery(String),
}

/// Outbound message delivery. Failures are reported, never retried here.
pub trait Notifier: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

/// Writes outgoing mail to the log instead of a mail server.
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new<S: Into<String>>(sender: S) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        if !recipient.contains('@') {
            return Err(NotifierError::InvalidRecipient(recipient.to_string()));
        }

        info!(from = %self.sender, to = %recipient, subject = %subject, "outgoing mail");
        debug!("{}", body);
        Ok(())
    }
}
