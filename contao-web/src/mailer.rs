// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::{Arc, Mutex};

use crate::configuration::MailConfig;

/// A plain-text message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, host: &str) -> Result<Self> {
        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        let from = config
            .from
            .parse()
            .map_err(|e| anyhow!("Invalid MAIL_FROM address: {}", e))?;

        Ok(Self {
            transport: builder.port(config.smtp_port).build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email
                .to
                .parse()
                .map_err(|e| anyhow!("Invalid recipient address: {}", e))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Logs messages instead of delivering them and keeps them for inspection.
#[derive(Default)]
pub struct LogMailer {
    sent: Mutex<Vec<Email>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Email not delivered (no SMTP host configured)"
        );
        self.sent
            .lock()
            .map_err(|_| anyhow!("Mail log lock poisoned"))?
            .push(email.clone());
        Ok(())
    }
}

pub fn create_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.smtp_host.as_deref() {
        Some(host) => Ok(Arc::new(SmtpMailer::new(config, host)?)),
        None => Ok(Arc::new(LogMailer::new())),
    }
}
