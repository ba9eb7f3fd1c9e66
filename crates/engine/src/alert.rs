// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of the overdue alert

use tw_adapters::Notification;
use tw_core::config::{DEFAULT_LIST_TEXT, DEFAULT_SUBJECT, DEFAULT_TEXT};
use tw_core::{MailConfig, OverdueRecord};

/// Fixed parts of the alert sent after a scan that found overdue jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTemplate {
    pub subject: String,
    /// Header line; followed by `: <machine>`
    pub text: String,
    /// Heading above the bulleted job list
    pub list_text: String,
    /// Host the daemon runs on
    pub machine: String,
}

impl AlertTemplate {
    /// Default wording for the given machine
    pub fn new(machine: impl Into<String>) -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            text: DEFAULT_TEXT.to_string(),
            list_text: DEFAULT_LIST_TEXT.to_string(),
            machine: machine.into(),
        }
    }

    /// Wording from the mail section, or the defaults when mail is off
    pub fn from_mail(mail: Option<&MailConfig>, machine: impl Into<String>) -> Self {
        match mail {
            Some(mail) => Self {
                subject: mail.subject.clone(),
                text: mail.text.clone(),
                list_text: mail.list_text.clone(),
                machine: machine.into(),
            },
            None => Self::new(machine),
        }
    }

    /// Build the notification for a scan's overdue jobs, in encounter order
    pub fn render(&self, overdue: &[OverdueRecord]) -> Notification {
        let mut body = format!("{}: {}\n\n{}:\n", self.text, self.machine, self.list_text);
        for record in overdue {
            body.push_str(&format!("- {}\n", record.path.display_name()));
        }
        Notification::new(self.subject.clone(), body)
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
