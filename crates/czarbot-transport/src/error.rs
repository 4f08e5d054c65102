/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection to the chat server is gone.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a line failed. Callers log this; nothing retries.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving the next event failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
