use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Sending half of the notification surface. Cheap to clone; a closed or
/// absent receiver just means nobody is watching.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn channel() -> (Self, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn info(&self, text: impl Into<String>) {
        self.send(NoticeLevel::Info, text.into());
    }

    pub fn success(&self, text: impl Into<String>) {
        self.send(NoticeLevel::Success, text.into());
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.send(NoticeLevel::Warning, text.into());
    }

    pub fn error(&self, text: impl Into<String>) {
        self.send(NoticeLevel::Error, text.into());
    }

    fn send(&self, level: NoticeLevel, text: String) {
        debug!(?level, "{text}");
        let Some(tx) = &self.tx else { return };
        let notice = Notice {
            level,
            text,
            at: Utc::now(),
        };
        if tx.send(notice).is_err() {
            debug!("notice dropped: receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_arrive_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.info("one");
        notifier.warning("two");

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!((first.level, first.text.as_str()), (NoticeLevel::Info, "one"));
        assert_eq!((second.level, second.text.as_str()), (NoticeLevel::Warning, "two"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_silent_and_closed_notifiers_do_not_panic() {
        Notifier::silent().error("nobody listening");

        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.success("still fine");
    }
}
