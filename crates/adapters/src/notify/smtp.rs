// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SMTP notifier via `lettre`
//!
//! Port 465 uses implicit TLS; otherwise `tls = true` means STARTTLS and
//! `tls = false` a plain connection. Credentials come from `SMTP_USERNAME`
//! and `SMTP_PASSWORD` when both are set.

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tw_core::MailConfig;

const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends alerts as plain-text email
#[derive(Clone, Debug)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;
        let to = config
            .to
            .iter()
            .filter(|addr| !addr.trim().is_empty())
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(NotifyError::Config(
                "at least one recipient is required".to_string(),
            ));
        }

        let mut builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
                .map_err(|e| NotifyError::Config(e.to_string()))?
        } else if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|e| NotifyError::Config(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        }
        .port(config.port);

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    pub(crate) fn message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder().from(self.from.clone());
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        builder
            .subject(&notification.subject)
            .body(notification.body.clone())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

fn parse_mailbox(addr: &str) -> Result<Mailbox, NotifyError> {
    addr.trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| NotifyError::Config(format!("{}: {}", addr, e)))
}

#[async_trait]
impl NotifyAdapter for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let email = self.message(notification)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::info!(
            recipients = self.to.len(),
            to = %self.to.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", "),
            "alert mailed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "smtp_tests.rs"]
mod tests;
