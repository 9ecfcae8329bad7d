//! Buffered email delivery of a run's log output.
//!
//! Every event is kept in memory and sent as one plain-text message when the
//! owning [`Notifier`](crate::Notifier) is dropped.

use std::sync::Mutex;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::notify::{LogEntry, LogSink};

/// Default SMTP port (SMTPS).
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP settings for the mail sink.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay host name
    pub server: String,
    /// Relay port
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Address the log is sent to
    pub recipient: Option<String>,
    /// Connect with implicit TLS
    pub secure: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
            recipient: None,
            secure: false,
        }
    }
}

/// Something that can send a finished log body.
pub trait MailTransport: Send + Sync {
    fn deliver(&self, body: &str) -> Result<(), NotifyError>;
}

/// Sends mail through an SMTP relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl SmtpMailer {
    /// Validate `config` and build the SMTP transport.
    ///
    /// No connection is made here; the relay is contacted on delivery.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let server = config.server.trim();
        if server.is_empty() || server.contains(char::is_whitespace) {
            return Err(NotifyError::NotificationConfig(format!(
                "invalid SMTP server address [{}]",
                config.server
            )));
        }

        let recipient = config.recipient.as_deref().ok_or_else(|| {
            NotifyError::NotificationConfig("no recipient email address given".to_string())
        })?;
        let to: Mailbox = recipient.parse().map_err(|e| {
            NotifyError::NotificationConfig(format!(
                "invalid recipient address [{}]: {}",
                recipient, e
            ))
        })?;

        let host = local_hostname();
        let from = sender_address(&host)?;

        let builder = if config.secure {
            SmtpTransport::relay(server).map_err(|e| {
                NotifyError::NotificationConfig(format!(
                    "cannot configure TLS for SMTP server [{}]: {}",
                    server, e
                ))
            })?
        } else {
            SmtpTransport::builder_dangerous(server)
        };
        let builder = builder.port(config.port);

        let builder = match (&config.user, &config.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            (None, None) => builder,
            _ => {
                return Err(NotifyError::NotificationConfig(
                    "SMTP user and password must be given together".to_string(),
                ))
            }
        };

        debug!(server = %server, port = config.port, secure = config.secure, "SMTP transport configured");

        Ok(Self {
            transport: builder.build(),
            from,
            to,
            subject: format!("vboxautoss script output for host [{}]", host),
        })
    }
}

impl MailTransport for SmtpMailer {
    fn deliver(&self, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Delivery(format!("failed to build message: {}", e)))?;

        self.transport
            .send(&message)
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        info!(to = %self.to, "Log output emailed");
        Ok(())
    }
}

/// Accumulates events and hands them to a [`MailTransport`] on flush.
pub struct BufferingMailSink<T: MailTransport> {
    transport: T,
    buffer: Mutex<Vec<String>>,
}

impl<T: MailTransport> BufferingMailSink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: Mutex::new(Vec::new()),
        }
    }
}

impl<T: MailTransport> LogSink for BufferingMailSink<T> {
    fn record(&self, entry: &LogEntry) {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.to_string());
    }

    fn flush(&self) -> Result<(), NotifyError> {
        let lines = std::mem::take(
            &mut *self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        if lines.is_empty() {
            return Ok(());
        }
        self.transport.deliver(&lines.join("\n"))
    }
}

/// `vboxautoss@<host>`, or `vboxautoss@localhost` if the host name is not a
/// valid mail domain.
fn sender_address(host: &str) -> Result<Mailbox, NotifyError> {
    if let Ok(mailbox) = format!("vboxautoss@{}", host).parse() {
        return Ok(mailbox);
    }
    debug!(host = %host, "Hostname is not a valid mail domain, using localhost");
    "vboxautoss@localhost".parse().map_err(|e| {
        NotifyError::NotificationConfig(format!("cannot build sender address: {}", e))
    })
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Notifier;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl MailTransport for RecordingTransport {
        fn deliver(&self, body: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    fn mail_config() -> MailConfig {
        MailConfig {
            server: "smtp.example.com".to_string(),
            user: Some("backup".to_string()),
            password: Some("secret".to_string()),
            recipient: Some("ops@example.com".to_string()),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_buffered_events_sent_as_one_message() {
        let transport = RecordingTransport::default();
        {
            let notifier = Notifier::new().with_sink(BufferingMailSink::new(transport.clone()));
            notifier.info("Taking snapshot for vm [web1]");
            notifier.warn("Deleting snapshot [s1] for VM [web1]");
        }

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let lines: Vec<&str> = sent[0].lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[    INFO] --- Taking snapshot for vm [web1]"));
        assert!(lines[1].ends_with("[    WARN] --- Deleting snapshot [s1] for VM [web1]"));
    }

    #[test]
    fn test_nothing_sent_when_buffer_empty() {
        let transport = RecordingTransport::default();
        drop(Notifier::new().with_sink(BufferingMailSink::new(transport.clone())));

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_flush_drains_buffer() {
        let transport = RecordingTransport::default();
        let sink = BufferingMailSink::new(transport.clone());
        sink.record(&LogEntry::new(tracing::Level::INFO, "once"));

        sink.flush().unwrap();
        sink.flush().unwrap();

        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_smtp_mailer_from_valid_config() {
        let mailer = SmtpMailer::from_config(&mail_config()).unwrap();
        assert_eq!(mailer.to.email.to_string(), "ops@example.com");
        assert!(mailer.subject.starts_with("vboxautoss script output for host ["));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let config = MailConfig {
            recipient: Some("not an address".to_string()),
            ..mail_config()
        };
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(NotifyError::NotificationConfig(_))
        ));
    }

    #[test]
    fn test_invalid_server_rejected() {
        let config = MailConfig {
            server: "smtp example com".to_string(),
            ..mail_config()
        };
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(NotifyError::NotificationConfig(_))
        ));
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let config = MailConfig {
            password: None,
            ..mail_config()
        };
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(NotifyError::NotificationConfig(_))
        ));
    }
}
