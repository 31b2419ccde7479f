use crate::error::ChannelError;
use crate::signaling::{ChannelEvent, SignalingChannel};
use async_trait::async_trait;
use duocall_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};
use url::Url;

/// WebSocket adapter for the signaling relay.
///
/// Holds one authenticated connection for one client identity. Outbound
/// messages are serialized to JSON frames by a writer task; inbound
/// frames are decoded and forwarded as [`ChannelEvent`]s. Reconnection
/// is the embedder's concern; when the socket drops, the adapter flips
/// to not-ready, emits [`ChannelEvent::NotReady`] and stays dead.
pub struct WsSignalingChannel {
    tx: mpsc::UnboundedSender<SignalMessage>,
    ready: Arc<AtomicBool>,
}

impl WsSignalingChannel {
    /// Connect and authenticate against the relay.
    ///
    /// The identity token travels as a `token` query parameter on the
    /// handshake. A 401/403 handshake response maps to
    /// [`ChannelError::Auth`], which is fatal to the room visit.
    pub async fn connect(
        url: &str,
        identity_token: &str,
    ) -> Result<(Self, mpsc::Receiver<ChannelEvent>), ChannelError> {
        let mut url =
            Url::parse(url).map_err(|e| ChannelError::Transport(format!("invalid url: {e}")))?;
        url.query_pairs_mut().append_pair("token", identity_token);

        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(classify_handshake_error)?;
        info!("signaling channel connected");

        let (event_tx, event_rx) = mpsc::channel(256);
        let (tx, rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicBool::new(true));

        let _ = event_tx.send(ChannelEvent::Ready).await;
        tokio::spawn(pump(ws_stream, rx, event_tx, ready.clone()));

        Ok((Self { tx, ready }, event_rx))
    }
}

#[async_trait]
impl SignalingChannel for WsSignalingChannel {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError> {
        if !self.is_ready() {
            return Err(ChannelError::NotReady);
        }
        self.tx.send(msg).map_err(|_| {
            self.ready.store(false, Ordering::SeqCst);
            ChannelError::NotReady
        })
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

fn classify_handshake_error(err: tungstenite::Error) -> ChannelError {
    match err {
        tungstenite::Error::Http(response)
            if response.status().as_u16() == 401 || response.status().as_u16() == 403 =>
        {
            ChannelError::Auth(format!("handshake rejected with {}", response.status()))
        }
        other => ChannelError::Transport(other.to_string()),
    }
}

async fn pump<S>(
    ws_stream: tokio_tungstenite::WebSocketStream<S>,
    mut outbound: mpsc::UnboundedReceiver<SignalMessage>,
    events: mpsc::Sender<ChannelEvent>,
    ready: Arc<AtomicBool>,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, mut receiver) = ws_stream.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to serialize signal message: {e}"),
            }
        }
    });

    let recv_events = events.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                    Ok(signal) => {
                        debug!("inbound signal: {:?}", signal);
                        if recv_events.send(ChannelEvent::Signal(signal)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("invalid signal message from relay: {e}"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    ready.store(false, Ordering::SeqCst);
    let _ = events.send(ChannelEvent::NotReady).await;
    info!("signaling channel closed");
}
