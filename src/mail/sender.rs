use super::{MailError, OutgoingMail};
use crate::config::{SmtpConfig, SmtpSecurity};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use log::{debug, info};
use std::time::Duration;

/// Delivers one prepared email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = match config.security {
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?,
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(config.username.clone(), config.password.clone()));
        }

        debug!("SMTP transport for {}:{} ({:?})", config.host, config.port, config.security);

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = mail.to_message()?;

        self.transport.send(message).await.map_err(|e| {
            let code = e.status().map(|c| c.to_string());
            classify_failure(code.as_deref(), &e.to_string())
        })?;

        info!("Sent '{}' to {} via {}", mail.subject, mail.to, self.host);
        Ok(())
    }
}

/// Rejected logins get their own variant so the user is told what to fix.
pub fn classify_failure(code: Option<&str>, message: &str) -> MailError {
    let auth_code = matches!(code, Some("530") | Some("534") | Some("535"));
    let auth_text = message.to_lowercase().contains("authentication");

    if auth_code || auth_text {
        MailError::Authentication(message.to_string())
    } else {
        MailError::Transport(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_classify_failure() {
        assert!(classify_failure(Some("535"), "5.7.8 Username and Password not accepted").is_authentication());
        assert!(classify_failure(Some("534"), "Application-specific password required").is_authentication());
        assert!(classify_failure(None, "Authentication mechanism not supported").is_authentication());
        assert_eq!(
            classify_failure(Some("421"), "Service not available"),
            MailError::Transport("Service not available".to_string())
        );
    }

    #[test]
    fn test_authentication_message_mentions_app_password() {
        let message = MailError::Authentication("535".to_string()).to_string();
        assert!(message.contains("app-specific password"));
    }

    #[tokio::test]
    async fn test_builds_for_every_security_mode() {
        let mut config = Config::default().smtp;
        for security in [SmtpSecurity::StartTls, SmtpSecurity::Tls, SmtpSecurity::Plain] {
            config.security = security;
            assert!(SmtpMailer::from_config(&config).is_ok());
        }
    }

    #[tokio::test]
    async fn test_bad_sender_fails_before_connecting() {
        let mut config = Config::default().smtp;
        config.host = "127.0.0.1".to_string();
        config.port = 1;
        config.security = SmtpSecurity::Plain;
        let mailer = SmtpMailer::from_config(&config).unwrap();

        let mail = OutgoingMail::new("nobody", "hr@acme.com", "Hi", "Body");
        let err = mailer.send(&mail).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress { .. }));
    }
}
