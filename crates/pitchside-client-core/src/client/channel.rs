//! Push-notification channel tied to the authenticated session
//!
//! At most one channel is live per process. It is opened only after the
//! session has fully reached `Authenticated`, authenticates itself with a
//! single auth frame and is torn down whenever the session leaves
//! `Authenticated` (logout, token rejection, backend unreachable). There is
//! no automatic reconnect: a new channel is opened only when the session
//! re-enters `Authenticated`.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use ewebsock::{WsEvent, WsMessage};
use tracing::{debug, info, warn};

use pitchside_shared::{
    const_config::path::PATH_WS,
    push::{self, NoticeKind, PushFrame},
    time::Timestamp,
    token::AuthToken,
};

use super::{Client, ClientInner};

pub trait WakeFn: Fn() + Send + Sync + 'static {}
impl<T> WakeFn for T where T: Fn() + Send + Sync + 'static {}

/// Type-erased wake callback handed to transports
pub type SharedWake = Arc<dyn Fn() + Send + Sync>;

/// State machine of the channel; `Authenticating` means the transport is open
/// and the auth frame is being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Closed,
    Connecting,
    Authenticating,
    Open,
}

/// A live bidirectional push connection
pub trait PushTransport: Debug + Send {
    fn send(&mut self, msg: WsMessage);
    fn try_recv(&mut self) -> Option<WsEvent>;
}

/// Creates [`PushTransport`]s; the seam that lets tests instrument the
/// channel lifecycle
pub trait PushConnector: Debug + Send + Sync {
    fn connect(&self, url: String, wake_up: SharedWake) -> anyhow::Result<Box<dyn PushTransport>>;
}

#[derive(Debug, Default)]
pub(crate) struct EwebsockConnector;

impl PushConnector for EwebsockConnector {
    fn connect(&self, url: String, wake_up: SharedWake) -> anyhow::Result<Box<dyn PushTransport>> {
        let (tx, rx) = ewebsock::connect_with_wakeup(url, Default::default(), move || wake_up())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("failed to connect web socket")?;
        Ok(Box::new(EwebsockTransport { tx, rx }))
    }
}

struct EwebsockTransport {
    tx: ewebsock::WsSender,
    rx: ewebsock::WsReceiver,
}

impl PushTransport for EwebsockTransport {
    fn send(&mut self, msg: WsMessage) {
        self.tx.send(msg);
    }

    fn try_recv(&mut self) -> Option<WsEvent> {
        self.rx.try_recv()
    }
}

impl Debug for EwebsockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EwebsockTransport {{ .. }}")
    }
}

impl Client {
    /// Opens the channel for the current authenticated session
    ///
    /// Idempotent: skipped when a channel is already open or opening. Never
    /// fatal, failures are logged and leave the channel `Closed`.
    #[tracing::instrument]
    pub(crate) async fn open_channel(&self) {
        let (token, url, wake_up) = {
            let mut inner = self.lock_inner();
            if !inner.session.is_authenticated() {
                debug!("session not authenticated, not opening a channel");
                return;
            }
            if inner.channel_state != ChannelState::Closed {
                debug!(state = ?inner.channel_state, "channel already open or opening, skipping");
                return;
            }
            let Some(token) = inner.token_store.get() else {
                warn!("no stored token to authenticate the channel with");
                return;
            };
            inner.channel_state = ChannelState::Connecting;
            (token, inner.ws_url(), Arc::clone(&inner.wake))
        };

        let mut transport = match self.connector.connect(url, wake_up) {
            Ok(transport) => transport,
            Err(e) => {
                warn!("failed to initiate channel connection: {e:#}");
                self.abandon_open_attempt(&token);
                return;
            }
        };

        // Wait for the transport to open before sending the auth frame
        if let Err(e) = wait_for_connection_to_open(transport.as_mut()).await {
            warn!("channel did not open: {e:#}");
            self.abandon_open_attempt(&token);
            return;
        }

        {
            let mut inner = self.lock_inner();
            // `Connecting` alone is not enough: a logout and re-login while
            // waiting re-enters `Connecting` for a newer attempt, so the
            // captured token must still be the stored one
            if inner.channel_state != ChannelState::Connecting
                || inner.token_store.get().as_ref() != Some(&token)
            {
                info!("channel attempt superseded while opening, dropping transport");
                return;
            }
            inner.channel_state = ChannelState::Authenticating;
        }
        transport.send(push::auth_frame(&token));

        let mut inner = self.lock_inner();
        let attempt_is_current = inner.channel_state == ChannelState::Authenticating
            && inner.token_store.get().as_ref() == Some(&token);
        if attempt_is_current && inner.session.is_authenticated() && inner.channel.is_none() {
            inner.channel = Some(transport);
            inner.channel_state = ChannelState::Open;
            info!("notification channel open");
        } else {
            info!("session moved on while opening, dropping transport");
            if attempt_is_current {
                inner.close_channel();
            }
        }
    }

    /// Resets the channel state after a failed open, unless a newer attempt
    /// for a different token already owns it
    fn abandon_open_attempt(&self, token: &AuthToken) {
        let mut inner = self.lock_inner();
        if inner.channel_state == ChannelState::Connecting
            && inner.token_store.get().as_ref() == Some(token)
        {
            inner.close_channel();
        }
    }

    /// Drains inbound channel events into the notice queue and prunes expired
    /// notices
    ///
    /// Intended to be called once per UI tick (the wake callback signals when
    /// there is something to drain). Transport close or error tears the
    /// channel down; reconnection only happens via a fresh login.
    pub fn process_channel_events(&self) {
        let now = Timestamp::now();
        let mut inner = self.lock_inner();
        inner.notices.prune_expired(now);
        let Some(transport) = inner.channel.as_mut() else {
            return;
        };
        let mut close = false;
        let mut frames = Vec::new();
        while let Some(event) = transport.try_recv() {
            match event {
                WsEvent::Message(WsMessage::Text(raw)) => frames.push(raw),
                WsEvent::Message(other) => debug!(?other, "ignoring non-text frame"),
                WsEvent::Opened => {} // Handled during open_channel
                WsEvent::Error(e) => {
                    warn!(error = %e, "channel transport error");
                    close = true;
                    break;
                }
                WsEvent::Closed => {
                    info!("channel closed by the server");
                    close = true;
                    break;
                }
            }
        }
        for raw in frames {
            match serde_json::from_str::<PushFrame>(&raw) {
                Ok(frame) => inner.notices.push(frame.kind, frame.message, now),
                // Surface the raw payload as an informational notice rather
                // than dropping it
                Err(e) => {
                    debug!(error = %e, "failed to parse inbound frame, surfacing raw payload");
                    inner.notices.push(NoticeKind::Info, raw, now)
                }
            };
        }
        if close {
            inner.close_channel();
        }
    }
}

impl ClientInner {
    pub(crate) fn close_channel(&mut self) {
        if self.channel.take().is_some() {
            info!("notification channel handle dropped");
        }
        self.channel_state = ChannelState::Closed;
    }

    /// Websocket url derived from the server address
    ///
    /// # Panic
    ///
    /// Panics if the server_address does not start with "http"
    pub(crate) fn ws_url(&self) -> String {
        assert!(self.server_address.starts_with("http"));
        let mut result = "ws".to_string();
        result.push_str(&self.server_address[4..]);
        result.push_str(PATH_WS);
        result
    }
}

async fn wait_for_connection_to_open(transport: &mut dyn PushTransport) -> anyhow::Result<()> {
    let event = loop {
        if let Some(m) = transport.try_recv() {
            break m;
        } else {
            reqwest_cross::yield_now().await;
        }
    };
    if matches!(event, WsEvent::Opened) {
        Ok(())
    } else {
        bail!("expected first event to be opened but got {event:?}")
    }
}
