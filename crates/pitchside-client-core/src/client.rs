use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::oneshot;
use tracing::{error, info, warn};

use pitchside_shared::{
    errors::{LoginError, ResolveError},
    req_args::LoginReqArgs,
    time::Timestamp,
    uac::{PermissionIndex, PermissionName, UserProfile},
};

pub mod api;
pub mod channel;
pub mod guards;
pub mod notices;
pub mod session;
pub mod storage;

use api::{AuthApi, HttpAuthApi};
use channel::{ChannelState, EwebsockConnector, PushConnector, PushTransport, SharedWake, WakeFn};
use notices::{Notice, NoticeQueue};
use session::SessionState;
use storage::TokenStore;

/// Process-wide session context
///
/// Holds the stored bearer token, the resolved profile with its derived
/// permission index, the transient notice queue and the push-notification
/// channel handle. Constructed once at process start and cloned into whatever
/// needs it; only its own transition methods ([`Client::login`],
/// [`Client::logout`], [`Client::refresh_user`]) write the shared state.
#[derive(Debug, Clone)]
pub struct Client {
    api: Arc<dyn AuthApi>,
    connector: Arc<dyn PushConnector>,
    inner: Arc<Mutex<ClientInner>>,
}

struct ClientInner {
    server_address: String,
    token_store: Box<dyn TokenStore>,
    session: SessionState,
    channel_state: ChannelState,
    channel: Option<Box<dyn PushTransport>>,
    notices: NoticeQueue,
    wake: SharedWake,
}

impl Debug for ClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientInner")
            .field("server_address", &self.server_address)
            .field("token_store", &self.token_store)
            .field("session", &self.session)
            .field("channel_state", &self.channel_state)
            .field("channel", &self.channel)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl ClientInner {
    fn new(server_address: String, token_store: Box<dyn TokenStore>) -> Self {
        Self {
            server_address,
            token_store,
            session: SessionState::default(),
            channel_state: ChannelState::default(),
            channel: None,
            notices: NoticeQueue::default(),
            wake: Arc::new(|| {}),
        }
    }
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(token_store))]
    pub fn new(server_address: String, token_store: Box<dyn TokenStore>) -> Self {
        let api = Arc::new(HttpAuthApi::new(server_address.clone()));
        Self::from_parts(server_address, token_store, api, Arc::new(EwebsockConnector))
    }

    /// Assembles a client from its seams, used by tests and by clients that
    /// bring their own transport
    pub fn from_parts(
        server_address: String,
        token_store: Box<dyn TokenStore>,
        api: Arc<dyn AuthApi>,
        connector: Arc<dyn PushConnector>,
    ) -> Self {
        Self {
            api,
            connector,
            inner: Arc::new(Mutex::new(ClientInner::new(server_address, token_store))),
        }
    }

    /// Callback invoked when the push transport has new events, typically the
    /// UI's repaint request
    pub fn set_wake_fn<F: WakeFn>(&self, wake_up: F) {
        self.lock_inner().wake = Arc::new(wake_up);
    }

    /// Exchanges the credentials for a token, persists it and resolves the
    /// session (profile, permission index, notification channel)
    ///
    /// On failure the session state is left unchanged and the error is
    /// surfaced to the caller.
    #[tracing::instrument(skip(args))]
    // WARNING: Must skip args as it contains the password
    pub async fn login(&self, args: LoginReqArgs) -> Result<(), LoginError> {
        let rx = self.api.exchange_credentials(&args);
        let token = await_outcome(rx)
            .await
            .ok_or_else(|| LoginError::Unreachable(CANCELED_MSG.to_string()))??;
        {
            let mut inner = self.lock_inner();
            if let Err(e) = inner.token_store.set(&token) {
                // Session still works for this process, it just won't survive
                // a restart
                error!("failed to persist token: {e:#}");
            }
        }
        info!("credential exchange succeeded, resolving session");
        self.resolve_session().await?;
        Ok(())
    }

    /// Closes the notification channel, clears the stored token and leaves
    /// the session `Unauthenticated`
    ///
    /// Side-effect-complete before returning and safe to call at any time,
    /// including when nothing is open or stored.
    #[tracing::instrument]
    pub fn logout(&self) {
        let mut inner = self.lock_inner();
        inner.close_channel();
        if let Err(e) = inner.token_store.clear() {
            error!("failed to clear stored token: {e:#}");
        }
        inner.session = SessionState::Unauthenticated;
        info!("logged out");
    }

    /// Re-resolves the session from the currently stored token
    ///
    /// Also used at process start to settle the initial state. Callers that
    /// need the updated profile or permissions must await full completion,
    /// not fire-and-forget.
    #[tracing::instrument]
    pub async fn refresh_user(&self) -> Result<(), ResolveError> {
        self.resolve_session().await
    }

    async fn resolve_session(&self) -> Result<(), ResolveError> {
        let token = {
            let mut inner = self.lock_inner();
            match inner.token_store.get() {
                Some(token) => {
                    inner.session = SessionState::Resolving;
                    token
                }
                None => {
                    inner.close_channel();
                    inner.session = SessionState::Unauthenticated;
                    return Ok(());
                }
            }
        };
        let result = match await_outcome(self.api.fetch_profile(&token)).await {
            Some(result) => result,
            None => Err(ResolveError::Unreachable(CANCELED_MSG.to_string())),
        };
        {
            let mut inner = self.lock_inner();
            // A login or logout may have replaced the token while the request
            // was in flight, in which case this result no longer applies
            if inner.token_store.get().as_ref() != Some(&token) {
                info!("discarding resolution result for a superseded token");
                return Ok(());
            }
            match result {
                Ok(profile) => {
                    let index = PermissionIndex::build(&profile);
                    info!(user = %profile.email, permissions = index.len(), "session resolved");
                    inner.session = SessionState::Authenticated {
                        profile: Arc::new(profile),
                        permissions: Arc::new(index),
                    };
                }
                Err(ResolveError::InvalidCredential) => {
                    warn!("stored token rejected by the server, clearing it");
                    if let Err(e) = inner.token_store.clear() {
                        error!("failed to clear rejected token: {e:#}");
                    }
                    inner.close_channel();
                    inner.session = SessionState::Unauthenticated;
                    return Err(ResolveError::InvalidCredential);
                }
                Err(ResolveError::Unreachable(reason)) => {
                    warn!(%reason, "session resolution could not complete, token retained");
                    inner.close_channel();
                    inner.session = SessionState::Failed {
                        reason: reason.clone(),
                    };
                    return Err(ResolveError::Unreachable(reason));
                }
            }
        }
        self.open_channel().await;
        Ok(())
    }

    #[tracing::instrument(ret)]
    pub async fn health_check(&self) -> Result<(), ResolveError> {
        match await_outcome(self.api.health_check()).await {
            Some(result) => result,
            None => Err(ResolveError::Unreachable(CANCELED_MSG.to_string())),
        }
    }

    pub fn session_state(&self) -> SessionState {
        self.lock_inner().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_inner().session.is_authenticated()
    }

    /// True while the initial or a forced resolution has not settled yet
    pub fn is_loading(&self) -> bool {
        self.lock_inner().session.is_loading()
    }

    pub fn user(&self) -> Option<Arc<UserProfile>> {
        self.lock_inner().session.profile().cloned()
    }

    pub fn permissions(&self) -> Option<Arc<PermissionIndex>> {
        self.lock_inner().session.permissions().cloned()
    }

    /// False unless authenticated; superusers always pass
    pub fn has_permission(&self, name: &PermissionName) -> bool {
        self.has_all_permissions(std::slice::from_ref(name))
    }

    /// Conjunctive over `required`; false unless authenticated
    pub fn has_all_permissions(&self, required: &[PermissionName]) -> bool {
        match self.lock_inner().session.permissions() {
            Some(index) => index.has_all(required),
            None => false,
        }
    }

    /// Snapshot of the live notices in insertion order, expired ones pruned
    pub fn notices(&self) -> Vec<Notice> {
        let mut inner = self.lock_inner();
        inner.notices.prune_expired(Timestamp::now());
        inner.notices.iter().cloned().collect()
    }

    pub fn channel_state(&self) -> ChannelState {
        self.lock_inner().channel_state
    }

    fn lock_inner(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().expect("client-core mutex poisoned")
    }
}

const CANCELED_MSG: &str = "response channel closed before a result arrived";

/// Maps a dropped-sender (`Canceled`) to `None`
async fn await_outcome<T>(rx: oneshot::Receiver<T>) -> Option<T> {
    rx.await.ok()
}
