//! Notifier adapters
//!
//! `TracingNotifier` writes notices to the log. `ChannelNotifier` forwards
//! them to whoever renders the view through an unbounded tokio channel.

use tokio::sync::mpsc;

use crate::ports::outbound::{Notice, NoticeLevel, NotifierPort};

#[derive(Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotifierPort for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(text = %notice.message, "Notice"),
            NoticeLevel::Warning => tracing::warn!(text = %notice.message, "Notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(level = %notice.level, text = %notice.message, "Notice")
            }
        }
    }
}

#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotifierPort for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // The view may already be gone; notices are best effort.
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped: receiver closed");
        }
    }
}
