// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for WebSocket communication.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A successful connect yields two independent halves so the engine can
//! write user intents while it waits on server frames.

use std::future::Future;
use std::pin::Pin;

use tally_core::protocol::{ClientMessage, ServerMessage};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Outbound half of a connected transport.
pub trait TransportSink: Send {
    /// Send a message to the server.
    fn send(
        &mut self,
        msg: ClientMessage,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Close the connection from the client side.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;
}

/// Inbound half of a connected transport.
pub trait TransportStream: Send {
    /// Receive the next message from the server.
    ///
    /// Returns `None` when the connection is closed. Frames that fail to
    /// decode are logged and skipped, never fatal.
    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<ServerMessage>>> + Send + '_>>;
}

/// Connector for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync + 'static {
    /// Connect to the server and split into send/receive halves.
    fn connect(
        &self,
        url: &str,
    ) -> Pin<
        Box<
            dyn Future<Output = TransportResult<(Box<dyn TransportSink>, Box<dyn TransportStream>)>>
                + Send
                + '_,
        >,
    >;
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport
    }
}

struct WebSocketSink {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
}

struct WebSocketSource {
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl Transport for WebSocketTransport {
    fn connect(
        &self,
        url: &str,
    ) -> Pin<
        Box<
            dyn Future<Output = TransportResult<(Box<dyn TransportSink>, Box<dyn TransportStream>)>>
                + Send
                + '_,
        >,
    > {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            Ok((
                Box::new(WebSocketSink { sink }) as Box<dyn TransportSink>,
                Box::new(WebSocketSource { stream }) as Box<dyn TransportStream>,
            ))
        })
    }
}

impl TransportSink for WebSocketSink {
    fn send(
        &mut self,
        msg: ClientMessage,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let json = msg
                .to_json()
                .map_err(|e| TransportError::Serialization(e.to_string()))?;

            self.sink
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            // Flush to ensure the data is actually sent and we detect connection failures
            self.sink
                .flush()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            self.sink
                .close()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            Ok(())
        })
    }
}

impl TransportStream for WebSocketSource {
    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<ServerMessage>>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        match ServerMessage::from_json(&text) {
                            Ok(msg) => return Ok(Some(msg)),
                            Err(e) => {
                                // Malformed or unknown frame: drop it, keep the connection
                                tracing::warn!(error = %e, "dropping undecodable frame");
                                continue;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        return Ok(None);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Keepalive traffic, not protocol messages
                        continue;
                    }
                    Some(Ok(_)) => {
                        // Ignore binary and fragmented frames
                        continue;
                    }
                    Some(Err(e)) => {
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        return Ok(None);
                    }
                }
            }
        })
    }
}
