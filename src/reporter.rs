use crate::config::EmailServerConfig;
use crate::error::Result;
use crate::models::RunStatus;
use async_trait::async_trait;
use chrono::Local;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

const SUBJECT_PREFIX: &str = "每日健康打卡: ";

/// End-of-run notification channel. The SMTP impl is the real one; tests
/// swap in a recorder.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &str, status: RunStatus, lines: &[String]) -> Result<()>;
}

/// Sends the run report through the configured mail relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &EmailServerConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(Credentials::new(
                config.from_email.clone(),
                config.authcode.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from_email.parse()?,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, to: &str, status: RunStatus, lines: &[String]) -> Result<()> {
        let mut contents = Vec::with_capacity(lines.len() + 1);
        contents.push(status.emoji().to_string());
        contents.extend(lines.iter().cloned());

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(format!("{SUBJECT_PREFIX}{}", status.desc()))
            .header(ContentType::TEXT_PLAIN)
            .body(contents.join("\n"))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// One run's narrative. Lines are mirrored into the shared append-only
/// log file as they happen and buffered in memory for the single report
/// email sent at the end of the run.
pub struct RunLog {
    file: File,
    cache: Vec<String>,
    notifier: Arc<dyn Notifier>,
    to_email: String,
    notified: bool,
}

impl RunLog {
    /// Opens (appending) the shared log file, writes the blank run
    /// separator and the `[Time]` header, and seeds the buffer with it.
    pub async fn start(path: &Path, notifier: Arc<dyn Notifier>, to_email: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await?;

        let now = format!("[Time] {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let mut log = Self {
            file,
            cache: vec![now.clone()],
            notifier,
            to_email: to_email.to_string(),
            notified: false,
        };
        log.write_line("").await?;
        log.write_line(&now).await?;
        Ok(log)
    }

    async fn write_line(&mut self, msg: &str) -> Result<()> {
        self.file.write_all(msg.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await?;
        Ok(())
    }

    /// Durable log only; never mailed.
    pub async fn debug(&mut self, msg: &str) -> Result<()> {
        self.write_line(msg).await
    }

    pub async fn info(&mut self, msg: &str) -> Result<()> {
        self.write_line(msg).await?;
        self.cache.push(msg.to_string());
        Ok(())
    }

    pub async fn warning(&mut self, msg: &str) -> Result<()> {
        self.write_line(msg).await?;
        self.cache.push(msg.to_string());
        Ok(())
    }

    /// Records the failure and immediately mails the whole buffer. Only
    /// the first notification of a run goes out; the flag flips before the
    /// send so a transport failure is not retried with a duplicate.
    pub async fn error(&mut self, msg: &str) -> Result<()> {
        self.write_line(msg).await?;
        self.cache.push(msg.to_string());
        if !self.notified {
            self.notified = true;
            self.notifier
                .notify(&self.to_email, RunStatus::Failure, &self.cache)
                .await?;
        }
        Ok(())
    }

    /// Mails the success report; a no-op if a failure was already mailed.
    pub async fn end_with_success(&mut self) -> Result<()> {
        if !self.notified {
            self.notified = true;
            self.notifier
                .notify(&self.to_email, RunStatus::Success, &self.cache)
                .await?;
        }
        Ok(())
    }
}
