//! Outbound email for the contact form.
//!
//! Each accepted submission produces two messages: the notification to the
//! studio inbox, whose failure fails the request, and the acknowledgment back
//! to the sender, whose failure is logged and swallowed. Transport is SMTP
//! via lettre; tests substitute the [`Mailer`] trait with a recording fake.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use backlot_core::Config;

/// One outbound plain-text message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Set on notifications so the studio can reply straight to the sender.
    pub reply_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("message build failed: {0}")]
    Build(String),
    #[error("smtp transport failed: {0}")]
    Transport(String),
}

/// Transport seam so tests can observe sends without an SMTP server.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// SMTP-backed [`Mailer`].
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpMailer {
    /// Create the mailer from config. Returns `None` when SMTP host or the
    /// sender address are not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let from = config.smtp_from.clone()?;
        let port = config.smtp_port;

        let credentials = config
            .smtp_username
            .as_deref()
            .zip(config.smtp_password.as_deref())
            .map(|(user, password)| Credentials::new(user.to_string(), password.to_string()));

        let mailer = if config.smtp_tls {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port);
            let b = match credentials {
                Some(credentials) => b.credentials(credentials),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Mailer initialized (SMTP with STARTTLS)");
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = match credentials {
                Some(credentials) => b.credentials(credentials),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Mailer initialized (SMTP, no TLS)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("recipient: {}", e)))?;
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("SMTP_FROM: {}", e)))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str());
        if let Some(reply_to) = &email.reply_to {
            if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
                builder = builder.reply_to(mailbox);
            }
        }

        let message = builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config(host: Option<&str>, from: Option<&str>) -> Config {
        Config {
            server_port: 0,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            asset_cdn_base_url: "https://cdn.example.com/images/site".to_string(),
            contact_recipient: Some("studio@example.com".to_string()),
            smtp_host: host.map(String::from),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: from.map(String::from),
            smtp_tls: true,
            contact_rate_limit_max: 5,
            contact_rate_limit_window_secs: 3600,
            contact_rate_limit_max_keys: 1000,
            contact_max_body_bytes: 65536,
            revalidate_secret: None,
            frontend_revalidate_url: None,
            trusted_proxy_count: 1,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn from_config_requires_host_and_sender() {
        assert!(SmtpMailer::from_config(&smtp_config(None, None)).is_none());
        assert!(SmtpMailer::from_config(&smtp_config(Some("smtp.example.com"), None)).is_none());
        assert!(SmtpMailer::from_config(&smtp_config(None, Some("noreply@example.com"))).is_none());
        assert!(SmtpMailer::from_config(&smtp_config(
            Some("smtp.example.com"),
            Some("noreply@example.com")
        ))
        .is_some());
    }
}
