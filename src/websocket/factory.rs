use super::{Connector, Frame, FrameSink, FrameStream};
use crate::types::{RealtimeError, Result};
use futures::future::{self, BoxFuture};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Production connector backed by tokio-tungstenite
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Open a WebSocket and adapt both halves to text frames
    pub async fn create(url: String) -> Result<(FrameSink, FrameStream)> {
        let (ws_stream, response) = connect_async(url.as_str()).await?;
        tracing::debug!(
            "WebSocket handshake completed with HTTP status {}",
            response.status()
        );

        let (write_half, read_half) = ws_stream.split();

        let sink: FrameSink = Box::pin(write_half.with(|text: String| {
            future::ready(Ok::<_, RealtimeError>(Message::Text(text.into())))
        }));
        let stream: FrameStream = Box::pin(
            read_half.map(|message| message.map(Frame::from).map_err(RealtimeError::from)),
        );

        Ok((sink, stream))
    }
}

impl Connector for WebSocketFactory {
    fn connect(&self, url: String) -> BoxFuture<'static, Result<(FrameSink, FrameStream)>> {
        Box::pin(Self::create(url))
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text.as_str().to_owned()),
            Message::Close(frame) => match frame {
                Some(close_frame) => Frame::Close {
                    code: Some(u16::from(close_frame.code)),
                    reason: close_frame.reason.as_str().to_owned(),
                },
                None => Frame::Close {
                    code: None,
                    reason: String::new(),
                },
            },
            Message::Binary(data) => Frame::Ignored(format!("binary ({} bytes)", data.len())),
            Message::Ping(data) => Frame::Ignored(format!("ping ({} bytes)", data.len())),
            Message::Pong(data) => Frame::Ignored(format!("pong ({} bytes)", data.len())),
            Message::Frame(_) => Frame::Ignored("raw frame".to_string()),
        }
    }
}
