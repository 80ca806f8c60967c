//! Delivery through a local mail transfer agent.

use super::message::MailMessage;
use super::Transport;
use crate::error::{Result, TagmailError};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `<program> <recipient>...` once per message, feeding the message on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendmailTransport {
    pub program: PathBuf,
}

impl SendmailTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn send_one(&self, message: &MailMessage) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&message.to)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                sendmail_error(format!("cannot run {}: {e}", self.program.display()))
            })?;

        // An MTA that exits early closes the pipe; its exit status explains why.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(message.format().as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(sendmail_error(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        write_result.map_err(|e| {
            sendmail_error(format!(
                "cannot write message to {}: {e}",
                self.program.display()
            ))
        })?;

        debug!(recipients = %message.to.join(","), "sendmail accepted message");
        Ok(())
    }
}

impl Transport for SendmailTransport {
    fn send_all(&self, messages: &[MailMessage]) -> Result<()> {
        for message in messages {
            self.send_one(message)?;
        }
        Ok(())
    }
}

fn sendmail_error(message: impl Into<String>) -> TagmailError {
    TagmailError::DeliveryError(format!("sendmail: {}", message.into()))
}
