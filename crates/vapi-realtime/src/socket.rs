//! The duplex call socket.
//!
//! Connecting spawns a writer and a reader task so the socket is owned
//! entirely by this crate: callers push [`ClientFrame`]s into a channel
//! and drain [`ServerFrame`]s out of another. The reader terminates the
//! stream with exactly one `Closed`, which is the signal session
//! teardown keys off.

use crate::VapiError;
use bytes::Bytes;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::protocol::Message as WsMessage,
};
use tracing::{debug, warn};

type CallSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CHANNEL_BUFFER: usize = 256;

/// Frames sent to the voice agent.
#[derive(Debug, PartialEq)]
pub enum ClientFrame {
    /// Raw PCM captured from the caller's microphone.
    Audio(Bytes),
    /// `{"type":"end-call"}` termination request.
    EndCall,
    /// Close the websocket and stop the writer.
    Close,
}

/// Frames received from the voice agent.
#[derive(Debug)]
pub enum ServerFrame {
    /// Raw PCM to play back to the caller.
    Audio(Bytes),
    /// A JSON control frame, unparsed.
    Control(String),
    /// The socket closed, peer-initiated or after `Close`.
    Closed,
}

/// Open the call websocket and pump it through a pair of channels.
///
/// Completes once the socket handshake has succeeded, which is the
/// "transport open" moment of the call lifecycle. Once the writer task
/// is gone (socket closed or closing), sends on the returned sender fail
/// and the frame is simply lost, which is the wanted wind-down behavior.
pub async fn connect(
    url: &str,
) -> Result<(mpsc::Sender<ClientFrame>, mpsc::Receiver<ServerFrame>), VapiError> {
    let (socket, _) = connect_async(url).await?;
    let (sink, stream) = socket.split();

    let (frame_tx, frame_rx) = mpsc::channel(CHANNEL_BUFFER);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER);
    tokio::spawn(write_loop(sink, frame_rx));
    tokio::spawn(read_loop(stream, event_tx));
    debug!(%url, "call socket connected");

    Ok((frame_tx, event_rx))
}

fn encode(frame: ClientFrame) -> WsMessage {
    match frame {
        ClientFrame::Audio(data) => WsMessage::Binary(data),
        ClientFrame::EndCall => {
            WsMessage::Text(serde_json::json!({"type": "end-call"}).to_string().into())
        }
        ClientFrame::Close => WsMessage::Close(None),
    }
}

async fn write_loop(
    mut sink: SplitSink<CallSocket, WsMessage>,
    mut frames: mpsc::Receiver<ClientFrame>,
) {
    while let Some(frame) = frames.recv().await {
        let stop = matches!(&frame, ClientFrame::Close);
        if let Err(err) = sink.send(encode(frame)).await {
            debug!(error = %err, "call socket write failed, stopping writer");
            break;
        }
        if stop {
            break;
        }
    }
}

async fn read_loop(mut stream: SplitStream<CallSocket>, events: mpsc::Sender<ServerFrame>) {
    while let Some(message) = stream.next().await {
        let frame = match message {
            Ok(WsMessage::Binary(data)) => ServerFrame::Audio(data),
            Ok(WsMessage::Text(text)) => ServerFrame::Control(text.to_string()),
            Ok(WsMessage::Close(close)) => {
                debug!(?close, "call socket closed by peer");
                break;
            }
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "call socket read failed");
                break;
            }
        };
        if events.send(frame).await.is_err() {
            return;
        }
    }
    let _ = events.send(ServerFrame::Closed).await;
}
