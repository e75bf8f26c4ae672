//! User-facing notifications and confirmation prompts.
//!
//! Pages report every outcome through a `Notifier` and ask a `Confirm`
//! before destructive actions; the presentation layer supplies both.

use log::{error, info, warn};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices into the diagnostic log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => {
                info!("event=notice module=notify level={:?} message={}", notice.level, notice.message)
            }
            NoticeLevel::Warning => {
                warn!("event=notice module=notify level=warning message={}", notice.message)
            }
            NoticeLevel::Error => {
                error!("event=notice module=notify level=error message={}", notice.message)
            }
        }
    }
}

/// Keeps every notice in memory; used by headless callers and tests.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the collected notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

/// Yes/no prompt shown before destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectingNotifier, Confirm, Notice, NoticeLevel, Notifier};

    #[test]
    fn collecting_notifier_drains_on_take() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Notice::error("Failed to load deals"));
        let notices = notifier.take();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn closures_confirm() {
        let deny = |_: &str| false;
        assert!(!deny.confirm("Delete?"));
    }
}
