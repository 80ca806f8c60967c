//! Minimal SMTP client: one session delivers every report of a run.

use super::message::MailMessage;
use super::Transport;
use crate::error::{Result, TagmailError};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// Relay settings for [`SmtpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpTransport {
    pub server: String,
    pub port: u16,
    pub helo: String,
    pub timeout: Duration,
}

impl SmtpTransport {
    pub fn new(server: impl Into<String>, port: u16, helo: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            port,
            helo: helo.into(),
            timeout,
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs = (self.server.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| smtp_error(format!("cannot resolve {}:{}: {e}", self.server, self.port)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(smtp_error(match last_error {
            Some(e) => format!("cannot connect to {}:{}: {e}", self.server, self.port),
            None => format!("no addresses for {}:{}", self.server, self.port),
        }))
    }
}

impl Transport for SmtpTransport {
    fn send_all(&self, messages: &[MailMessage]) -> Result<()> {
        let stream = self.connect()?;
        let reader = BufReader::new(stream.try_clone()?);
        let mut session = SmtpSession::new(reader, stream);

        session.greet(&self.helo)?;
        for message in messages {
            session.send(message)?;
        }
        session.quit()
    }
}

/// Command/reply exchange over any reader and writer pair.
pub struct SmtpSession<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> SmtpSession<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Wait for the 220 banner, then HELO.
    pub fn greet(&mut self, helo: &str) -> Result<()> {
        self.expect(&[220])?;
        self.command(&format!("HELO {helo}"), &[250])
    }

    pub fn send(&mut self, message: &MailMessage) -> Result<()> {
        self.command(&format!("MAIL FROM:<{}>", message.from), &[250])?;
        for recipient in &message.to {
            self.command(&format!("RCPT TO:<{recipient}>"), &[250, 251])?;
        }
        self.command("DATA", &[354])?;

        for line in message.format().lines() {
            if line.starts_with('.') {
                self.writer.write_all(b".")?;
            }
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\r\n")?;
        }
        self.writer.write_all(b".\r\n")?;
        self.writer.flush()?;
        self.expect(&[250])?;

        debug!(recipients = %message.to.join(","), "smtp message accepted");
        Ok(())
    }

    pub fn quit(&mut self) -> Result<()> {
        self.command("QUIT", &[221])
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn command(&mut self, line: &str, accepted: &[u16]) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;
        self.expect(accepted)
    }

    /// Read one possibly multi-line reply and check its code.
    fn expect(&mut self, accepted: &[u16]) -> Result<()> {
        let mut text = String::new();
        let code = loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(smtp_error("connection closed by server"));
            }
            let line = line.trim_end();
            let code = line
                .get(..3)
                .and_then(|digits| digits.parse::<u16>().ok())
                .ok_or_else(|| smtp_error(format!("malformed reply {line:?}")))?;
            text.push_str(line.get(4..).unwrap_or(""));

            if line.as_bytes().get(3) != Some(&b'-') {
                break code;
            }
            text.push(' ');
        };

        if accepted.contains(&code) {
            Ok(())
        } else {
            Err(smtp_error(format!("unexpected reply {code} {text}")))
        }
    }
}

fn smtp_error(message: impl Into<String>) -> TagmailError {
    TagmailError::DeliveryError(format!("smtp: {}", message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn message(body: &str) -> MailMessage {
        MailMessage::new(
            "puppet@example.com",
            vec!["a@x".to_string(), "b@x".to_string()],
            "Puppet Report for web01",
            body,
        )
    }

    fn session(replies: &str) -> SmtpSession<Cursor<Vec<u8>>, Vec<u8>> {
        SmtpSession::new(Cursor::new(replies.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_full_conversation() {
        let mut s = session(
            "220 mail.example.com ESMTP\r\n\
             250 hello\r\n\
             250 sender ok\r\n\
             250 rcpt ok\r\n\
             251 will forward\r\n\
             354 go ahead\r\n\
             250 queued\r\n\
             221 bye\r\n",
        );

        s.greet("agent.example.com").unwrap();
        s.send(&message("first\n.hidden\nlast")).unwrap();
        s.quit().unwrap();

        let (_, written) = s.into_parts();
        let written = String::from_utf8(written).unwrap();
        assert!(written.starts_with("HELO agent.example.com\r\nMAIL FROM:<puppet@example.com>\r\n"));
        assert!(written.contains("RCPT TO:<a@x>\r\nRCPT TO:<b@x>\r\nDATA\r\n"));
        assert!(written.contains("To: a@x, b@x\r\n"));
        assert!(written.contains("\r\nfirst\r\n..hidden\r\nlast\r\n.\r\nQUIT\r\n"));
    }

    #[test]
    fn test_multiline_greeting() {
        let mut s = session("220-mail.example.com\r\n220-more banner\r\n220 ready\r\n250 hi\r\n");
        assert!(s.greet("h").is_ok());
    }

    #[test]
    fn test_rejected_recipient() {
        let mut s = session("250 sender ok\r\n550 no such user\r\n");
        let err = s.send(&message("x")).unwrap_err();
        match err {
            TagmailError::DeliveryError(msg) => {
                assert!(msg.contains("550"));
                assert!(msg.contains("no such user"));
            }
            other => panic!("Expected DeliveryError, got {other:?}"),
        }
    }

    #[test]
    fn test_connection_closed() {
        let mut s = session("");
        let err = s.greet("h").unwrap_err();
        assert!(err.to_string().contains("connection closed"));
    }

    #[test]
    fn test_malformed_reply() {
        let mut s = session("hello there\r\n");
        let err = s.greet("h").unwrap_err();
        assert!(err.to_string().contains("malformed reply"));
    }
}
