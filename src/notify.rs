//! ユーザー向け通知チャネル
//!
//! 送りっぱなし（待たない・再送しない）。

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// 標準出力へ表示し、ログにも残す
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => {
                log::info!("{}", message);
                println!("ℹ {}", message);
            }
            NoticeLevel::Success => {
                log::info!("{}", message);
                println!("✔ {}", message);
            }
            NoticeLevel::Warning => {
                log::warn!("{}", message);
                println!("⚠ {}", message);
            }
            NoticeLevel::Error => {
                log::error!("{}", message);
                eprintln!("✖ {}", message);
            }
        }
    }
}

/// 通知を溜めておき、ホスト側がまとめて取り出す
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.lock().iter().filter(|n| n.level == level).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let notice = Notice {
            level,
            message: message.to_string(),
        };
        self.lock().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_notifier_drain() {
        let notifier = QueuedNotifier::new();
        notifier.info("3 images pending");
        notifier.success("2 new images ready");
        notifier.success("1 new image ready");

        assert_eq!(notifier.count(NoticeLevel::Success), 2);

        let notices = notifier.drain();
        assert_eq!(notices.len(), 3);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[0].message, "3 images pending");
        assert!(notifier.drain().is_empty());
    }
}
