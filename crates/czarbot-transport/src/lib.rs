//! Chat transport abstraction for czarbot.
//!
//! The bot doesn't care whether it talks to IRC, Twitch chat, or a test
//! harness. It needs four things from a transport: join a channel, say
//! something in it, whisper to one participant, and hand over the next
//! inbound event. [`ChatTransport`] is that contract.
//!
//! [`MemoryTransport`] is a channel-backed implementation used by tests and
//! the console demo.

mod error;
mod memory;

pub use error::TransportError;
pub use memory::{MemoryPeer, MemoryTransport, Outbound};

use std::future::Future;

use czarbot_protocol::{ChannelName, InboundEvent, Nick};

/// A connected chat client.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one transport is shared (behind an `Arc`)
///   by the dispatcher lanes and every session's output pump.
/// - Every returned future is `Send` so callers can drive it from spawned
///   Tokio tasks.
pub trait ChatTransport: Send + Sync + 'static {
    /// Joins a channel so the bot receives its events.
    fn join(
        &self,
        channel: &ChannelName,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Says `text` publicly in `channel`.
    fn say(
        &self,
        channel: &ChannelName,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Whispers `text` privately to `nick`, in the context of `channel`.
    fn whisper(
        &self,
        channel: &ChannelName,
        nick: &Nick,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Waits for the next inbound event.
    ///
    /// Returns `Ok(None)` once the transport is closed cleanly.
    fn next_event(
        &self,
    ) -> impl Future<Output = Result<Option<InboundEvent>, TransportError>> + Send;
}
