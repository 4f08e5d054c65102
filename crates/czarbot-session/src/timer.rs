//! Self-addressed timers.
//!
//! A timer is a sleeping task that, when it wakes, posts a message into
//! its session's own mailbox. It holds only a weak sender, so pending
//! timers never keep a finished session's mailbox open, and a timer that
//! wakes after the session is gone does nothing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Which timer fired. Round timers carry the round number they were set
/// for so a late one can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    LobbyNag,
    AnswerDeadline(u32),
    JudgeDeadline(u32),
}

/// The pending timers of one session. Dropping it cancels them all.
pub(crate) struct Timers<M: Send + 'static> {
    mailbox: mpsc::WeakSender<M>,
    pending: Vec<JoinHandle<()>>,
}

impl<M: Send + 'static> Timers<M> {
    pub(crate) fn new(mailbox: mpsc::WeakSender<M>) -> Self {
        Self {
            mailbox,
            pending: Vec::new(),
        }
    }

    /// Posts `message` into the mailbox once `delay` has passed.
    pub(crate) fn after(&mut self, delay: Duration, message: M) {
        let mailbox = self.mailbox.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = mailbox.upgrade() {
                let _ = sender.send(message).await;
            }
        });
        self.pending.retain(|t| !t.is_finished());
        self.pending.push(task);
    }

    pub(crate) fn cancel_all(&mut self) {
        for task in self.pending.drain(..) {
            task.abort();
        }
    }
}

impl<M: Send + 'static> Drop for Timers<M> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_posts_after_delay() {
        let (tx, mut rx) = mpsc::channel::<TimerKind>(4);
        let mut timers = Timers::new(tx.downgrade());
        timers.after(Duration::from_secs(30), TimerKind::AnswerDeadline(3));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(TimerKind::AnswerDeadline(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_timers_cancels_them() {
        let (tx, mut rx) = mpsc::channel::<TimerKind>(4);
        let mut timers = Timers::new(tx.downgrade());
        timers.after(Duration::from_secs(5), TimerKind::LobbyNag);
        drop(timers);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_after_mailbox_closed_is_silent() {
        let (tx, rx) = mpsc::channel::<TimerKind>(4);
        let mut timers = Timers::new(tx.downgrade());
        drop(tx);
        drop(rx);
        timers.after(Duration::from_secs(1), TimerKind::JudgeDeadline(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(timers.pending.iter().all(|t| t.is_finished()));
    }
}
