//! Delivery of routed reports.
//!
//! The engine's output is handed to a [`Dispatch`] implementation. [`Mailer`]
//! delivers synchronously; [`DetachedDispatcher`] runs a `Mailer` on its own
//! thread and returns immediately, so a slow or broken mail transport never
//! holds up the caller.
//!
//! Transport selection follows [`DeliveryConfig`]: an SMTP relay when
//! `smtp_server` is set, otherwise the local `sendmail` program.

pub mod message;
pub mod sendmail;
pub mod smtp;

pub use message::MailMessage;
pub use sendmail::SendmailTransport;
pub use smtp::{SmtpSession, SmtpTransport};

use crate::config::DeliveryConfig;
use crate::error::{Result, TagmailError};
use crate::ir::RoutedGroup;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// Sends fully built messages.
pub trait Transport {
    fn send_all(&self, messages: &[MailMessage]) -> Result<()>;
}

/// Receives the routed groups of one pass.
pub trait Dispatch {
    fn dispatch(&self, host: &str, groups: Vec<RoutedGroup>) -> Result<()>;
}

/// Synchronous delivery using the configured transport.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: DeliveryConfig,
}

impl Mailer {
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// The transport `deliver` would use.
    pub fn transport(&self) -> Result<Box<dyn Transport>> {
        if let Some(server) = &self.config.smtp_server {
            return Ok(Box::new(SmtpTransport::new(
                server.clone(),
                self.config.smtp_port,
                self.config.smtp_helo.clone(),
                self.config.timeout(),
            )));
        }
        if let Some(program) = self
            .config
            .sendmail
            .as_ref()
            .filter(|program| !program.as_os_str().is_empty())
        {
            return Ok(Box::new(SendmailTransport::new(program.clone())));
        }
        Err(TagmailError::DeliveryError(
            "SMTP server is unset and could not find sendmail".to_string(),
        ))
    }

    /// One message per group, in group order.
    pub fn messages(&self, host: &str, groups: &[RoutedGroup]) -> Vec<MailMessage> {
        let subject = self.config.subject_for(host);
        groups
            .iter()
            .map(|group| {
                MailMessage::new(
                    self.config.report_from.clone(),
                    group.recipients.clone(),
                    subject.clone(),
                    group.body.clone(),
                )
            })
            .collect()
    }

    pub fn deliver(&self, host: &str, groups: &[RoutedGroup]) -> Result<()> {
        if groups.is_empty() {
            return Ok(());
        }
        let transport = self.transport()?;
        transport.send_all(&self.messages(host, groups))
    }
}

impl Dispatch for Mailer {
    fn dispatch(&self, host: &str, groups: Vec<RoutedGroup>) -> Result<()> {
        self.deliver(host, &groups)
    }
}

/// Fire-and-forget delivery on a dedicated thread.
///
/// `dispatch` only fails when the thread cannot be spawned. Delivery failures
/// are logged from the worker; the caller never observes them.
#[derive(Debug, Clone)]
pub struct DetachedDispatcher {
    mailer: Arc<Mailer>,
}

impl DetachedDispatcher {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            mailer: Arc::new(Mailer::new(config)),
        }
    }

    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }
}

impl Dispatch for DetachedDispatcher {
    fn dispatch(&self, host: &str, groups: Vec<RoutedGroup>) -> Result<()> {
        let mailer = Arc::clone(&self.mailer);
        let host = host.to_string();
        info!(groups = groups.len(), host = %host, "sending tagmail reports");

        thread::Builder::new()
            .name("tagmail-delivery".to_string())
            .spawn(move || {
                if let Err(e) = mailer.deliver(&host, &groups) {
                    error!(host = %host, error = %e, "Could not send report emails");
                }
            })
            .map(drop)
            .map_err(|e| {
                TagmailError::DeliveryError(format!("cannot start delivery thread: {e}"))
            })
    }
}
