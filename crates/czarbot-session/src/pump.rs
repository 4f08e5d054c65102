//! Output pump: delivers one session's game output to the transport.
//!
//! A single task per session reads lines in the order the game produced
//! them, so channel messages and whispers never overtake each other.
//! Whispers are paced: the pump waits until `spacing` has passed since the
//! previous whisper before sending the next one.
//!
//! The backlog is bounded. A session whose transport stalls waits for room
//! before applying its next command.

use std::sync::Arc;
use std::time::Duration;

use czarbot_protocol::{ChannelName, Recipient};
use czarbot_transport::ChatTransport;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Where a session pushes its output.
pub(crate) type OutputSender = mpsc::Sender<(Recipient, String)>;

/// Spawns the pump for `channel`. It runs until every [`OutputSender`] is
/// dropped and the backlog is delivered.
pub(crate) fn spawn_pump<T: ChatTransport>(
    channel: ChannelName,
    transport: Arc<T>,
    spacing: Duration,
    capacity: usize,
) -> (OutputSender, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(run(channel, transport, spacing, rx));
    (tx, task)
}

async fn run<T: ChatTransport>(
    channel: ChannelName,
    transport: Arc<T>,
    spacing: Duration,
    mut lines: mpsc::Receiver<(Recipient, String)>,
) {
    let mut last_whisper: Option<Instant> = None;

    while let Some((recipient, text)) = lines.recv().await {
        match recipient {
            Recipient::Channel => {
                if let Err(error) = transport.say(&channel, &text).await {
                    tracing::warn!(%channel, %error, "say failed, dropping line");
                }
            }
            Recipient::Player(nick) => {
                if let Some(last) = last_whisper {
                    tokio::time::sleep_until(last + spacing).await;
                }
                if let Err(error) = transport.whisper(&channel, &nick, &text).await {
                    tracing::warn!(%channel, %nick, %error, "whisper failed, dropping line");
                }
                last_whisper = Some(Instant::now());
            }
        }
    }

    tracing::debug!(%channel, "output pump drained");
}

#[cfg(test)]
mod tests {
    use czarbot_protocol::Nick;
    use czarbot_transport::{MemoryTransport, Outbound};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_whispers_are_spaced_and_order_is_kept() {
        let (transport, mut peer) = MemoryTransport::new();
        let (tx, task) = spawn_pump(
            ChannelName::new("#cah"),
            Arc::new(transport),
            Duration::from_millis(750),
            8,
        );

        let bob = Nick::new("bob");
        tx.send((Recipient::Player(bob.clone()), "one".into())).await.unwrap();
        tx.send((Recipient::Channel, "between".into())).await.unwrap();
        tx.send((Recipient::Player(bob), "two".into())).await.unwrap();
        drop(tx);
        task.await.unwrap();

        let mut sent = Vec::new();
        while let Ok(item) = peer.outbound.try_recv() {
            sent.push(item);
        }
        let texts: Vec<_> = sent.iter().filter_map(|(_, line)| line.text()).collect();
        assert_eq!(texts, vec!["one", "between", "two"]);
        assert!(matches!(sent[1].1, Outbound::Say { .. }));
        assert!(sent[2].0 - sent[0].0 >= Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_send_failures_do_not_stop_the_pump() {
        let (transport, mut peer) = MemoryTransport::new();
        let transport = Arc::new(transport);
        let (tx, task) = spawn_pump(
            ChannelName::new("#cah"),
            Arc::clone(&transport),
            Duration::ZERO,
            8,
        );

        transport.set_fail_sends(true);
        tx.send((Recipient::Channel, "lost".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        transport.set_fail_sends(false);
        tx.send((Recipient::Channel, "kept".into())).await.unwrap();
        drop(tx);
        task.await.unwrap();

        let texts: Vec<String> = peer
            .drain()
            .iter()
            .filter_map(|l| l.text().map(str::to_string))
            .collect();
        assert_eq!(texts, vec!["kept".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlog_is_bounded_while_whispers_wait() {
        let (transport, _peer) = MemoryTransport::new();
        let (tx, _task) = spawn_pump(
            ChannelName::new("#cah"),
            Arc::new(transport),
            Duration::from_secs(60),
            2,
        );

        let bob = Nick::new("bob");
        for n in 0..4 {
            tx.send((Recipient::Player(bob.clone()), format!("w{n}")))
                .await
                .unwrap();
        }
        // The pump holds one whisper while it waits, two more are queued.
        assert!(tx.try_send((Recipient::Channel, "overflow".into())).is_err());
    }
}
