//! In-memory [`ChatTransport`] backed by Tokio channels.
//!
//! [`MemoryTransport::new`] returns the transport plus a [`MemoryPeer`]: the
//! "chat server" side. Tests push inbound events through the peer and read
//! back everything the bot said or whispered, stamped with the Tokio clock
//! so pacing can be asserted under paused time.

use std::sync::atomic::{AtomicBool, Ordering};

use czarbot_protocol::{ChannelName, InboundEvent, Nick};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use crate::{ChatTransport, TransportError};

/// Something the bot sent to the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Join {
        channel: ChannelName,
    },
    Say {
        channel: ChannelName,
        text: String,
    },
    Whisper {
        channel: ChannelName,
        nick: Nick,
        text: String,
    },
}

impl Outbound {
    /// The text of a `Say` or `Whisper`, if this is one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Say { text, .. } | Self::Whisper { text, .. } => Some(text),
            Self::Join { .. } => None,
        }
    }
}

/// A channel-backed chat transport.
pub struct MemoryTransport {
    inbound: Mutex<mpsc::Receiver<InboundEvent>>,
    outbound: mpsc::UnboundedSender<(Instant, Outbound)>,
    fail_sends: AtomicBool,
}

/// The far end of a [`MemoryTransport`].
pub struct MemoryPeer {
    /// Events pushed here are returned by `next_event`.
    pub inbound: mpsc::Sender<InboundEvent>,
    /// Everything the bot sent, with the instant it was sent.
    pub outbound: mpsc::UnboundedReceiver<(Instant, Outbound)>,
}

impl MemoryTransport {
    /// Creates a connected transport/peer pair.
    pub fn new() -> (Self, MemoryPeer) {
        let (in_tx, in_rx) = mpsc::channel(256);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let transport = Self {
            inbound: Mutex::new(in_rx),
            outbound: out_tx,
            fail_sends: AtomicBool::new(false),
        };
        let peer = MemoryPeer {
            inbound: in_tx,
            outbound: out_rx,
        };
        (transport, peer)
    }

    /// Makes every following `say`/`whisper` fail with
    /// [`TransportError::SendFailed`] until switched back off.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Relaxed);
    }

    fn deliver(&self, line: Outbound) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::Relaxed) {
            return Err(TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "send failure injected",
            )));
        }
        tracing::trace!(?line, "memory transport send");
        self.outbound
            .send((Instant::now(), line))
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }
}

impl ChatTransport for MemoryTransport {
    async fn join(&self, channel: &ChannelName) -> Result<(), TransportError> {
        self.deliver(Outbound::Join {
            channel: channel.clone(),
        })
    }

    async fn say(
        &self,
        channel: &ChannelName,
        text: &str,
    ) -> Result<(), TransportError> {
        self.deliver(Outbound::Say {
            channel: channel.clone(),
            text: text.to_string(),
        })
    }

    async fn whisper(
        &self,
        channel: &ChannelName,
        nick: &Nick,
        text: &str,
    ) -> Result<(), TransportError> {
        self.deliver(Outbound::Whisper {
            channel: channel.clone(),
            nick: nick.clone(),
            text: text.to_string(),
        })
    }

    async fn next_event(&self) -> Result<Option<InboundEvent>, TransportError> {
        Ok(self.inbound.lock().await.recv().await)
    }
}

impl MemoryPeer {
    /// Collects everything sent so far without waiting.
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut lines = Vec::new();
        while let Ok((_, line)) = self.outbound.try_recv() {
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_say_and_whisper_reach_the_peer_in_order() {
        let (transport, mut peer) = MemoryTransport::new();
        let channel = ChannelName::new("#cah");

        transport.say(&channel, "hello").await.unwrap();
        transport
            .whisper(&channel, &Nick::new("bob"), "psst")
            .await
            .unwrap();

        let lines = peer.drain();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), Some("hello"));
        assert!(matches!(
            &lines[1],
            Outbound::Whisper { nick, .. } if nick.as_str() == "bob"
        ));
    }

    #[tokio::test]
    async fn test_inbound_events_are_returned_by_next_event() {
        let (transport, peer) = MemoryTransport::new();
        let event = InboundEvent::Join {
            channel: "#cah".into(),
            nick: "alice".into(),
        };
        peer.inbound.send(event.clone()).await.unwrap();

        assert_eq!(transport.next_event().await.unwrap(), Some(event));
    }

    #[tokio::test]
    async fn test_next_event_returns_none_when_peer_closes() {
        let (transport, peer) = MemoryTransport::new();
        drop(peer);
        assert_eq!(transport.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_injected_send_failure() {
        let (transport, mut peer) = MemoryTransport::new();
        transport.set_fail_sends(true);

        let err = transport
            .say(&ChannelName::new("#cah"), "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::SendFailed(_)));
        assert!(peer.drain().is_empty());

        transport.set_fail_sends(false);
        transport.say(&ChannelName::new("#cah"), "ok").await.unwrap();
        assert_eq!(peer.drain().len(), 1);
    }
}
