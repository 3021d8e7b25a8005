//! Mock implementations of the client-core seams used by the integration
//! tests: a scripted backend, an instrumented push transport and a token
//! store the test can reach into mid-flight.

#![allow(dead_code)] // Not every test binary uses every helper

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ewebsock::{WsEvent, WsMessage};
use futures::channel::oneshot;

use pitchside_client_core::{AuthApi, Client, PushConnector, PushTransport, TokenStore};
use pitchside_shared::{
    errors::{LoginError, ResolveError},
    req_args::LoginReqArgs,
    token::AuthToken,
    uac::{EmailAddress, Permission, Role, RoleDisplayName, RoleName, UserId, UserProfile},
};

pub const SERVER_ADDRESS: &str = "http://localhost:8000";

/// Token store backed by state the test keeps a handle to, so stored tokens
/// can be inspected and replaced while a resolution is in flight
#[derive(Debug, Clone, Default)]
pub struct SharedTokenStore(pub Arc<Mutex<Option<AuthToken>>>);

impl SharedTokenStore {
    pub fn stored(&self) -> Option<AuthToken> {
        self.0.lock().unwrap().clone()
    }

    pub fn put(&self, token: impl Into<AuthToken>) {
        *self.0.lock().unwrap() = Some(token.into());
    }
}

impl TokenStore for SharedTokenStore {
    fn get(&self) -> Option<AuthToken> {
        self.stored()
    }

    fn set(&mut self, token: &AuthToken) -> anyhow::Result<()> {
        *self.0.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        *self.0.lock().unwrap() = None;
        Ok(())
    }
}

/// Backend double: responses are scripted ahead of time; an unscripted
/// profile fetch parks its sender so the test controls completion order
#[derive(Debug, Default)]
pub struct ScriptedApi {
    login_results: Mutex<VecDeque<Result<AuthToken, LoginError>>>,
    profile_results: Mutex<VecDeque<Result<UserProfile, ResolveError>>>,
    parked_profile_senders: Mutex<Vec<oneshot::Sender<Result<UserProfile, ResolveError>>>>,
}

impl ScriptedApi {
    pub fn script_login(&self, result: Result<AuthToken, LoginError>) {
        self.login_results.lock().unwrap().push_back(result);
    }

    pub fn script_profile(&self, result: Result<UserProfile, ResolveError>) {
        self.profile_results.lock().unwrap().push_back(result);
    }

    /// Completes the oldest in-flight (parked) profile fetch
    pub fn complete_parked_profile(&self, result: Result<UserProfile, ResolveError>) {
        let sender = self
            .parked_profile_senders
            .lock()
            .unwrap()
            .remove(0);
        sender.send(result).expect("receiver dropped");
    }

    pub fn parked_profile_count(&self) -> usize {
        self.parked_profile_senders.lock().unwrap().len()
    }
}

impl AuthApi for ScriptedApi {
    fn exchange_credentials(
        &self,
        _args: &LoginReqArgs,
    ) -> oneshot::Receiver<Result<AuthToken, LoginError>> {
        let (tx, rx) = oneshot::channel();
        let scripted = self.login_results.lock().unwrap().pop_front();
        match scripted {
            Some(result) => tx.send(result).expect("receiver dropped"),
            None => drop(tx), // Surfaces as Unreachable to the client
        }
        rx
    }

    fn fetch_profile(
        &self,
        _token: &AuthToken,
    ) -> oneshot::Receiver<Result<UserProfile, ResolveError>> {
        let (tx, rx) = oneshot::channel();
        let scripted = self.profile_results.lock().unwrap().pop_front();
        match scripted {
            Some(result) => tx.send(result).expect("receiver dropped"),
            None => self.parked_profile_senders.lock().unwrap().push(tx),
        }
        rx
    }

    fn health_check(&self) -> oneshot::Receiver<Result<(), ResolveError>> {
        let (tx, rx) = oneshot::channel();
        tx.send(Ok(())).expect("receiver dropped");
        rx
    }
}

/// Everything a test wants to observe about one mock transport
#[derive(Debug, Default)]
pub struct TransportProbe {
    pub sent: Vec<WsMessage>,
    pub inbound: VecDeque<WsEvent>,
}

#[derive(Debug)]
struct MockTransport {
    probe: Arc<Mutex<TransportProbe>>,
    live: Arc<AtomicUsize>,
}

impl PushTransport for MockTransport {
    fn send(&mut self, msg: WsMessage) {
        self.probe.lock().unwrap().sent.push(msg);
    }

    fn try_recv(&mut self) -> Option<WsEvent> {
        self.probe.lock().unwrap().inbound.pop_front()
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hands out [`MockTransport`]s, keeping one probe per connection, and tracks
/// how many transports are live at once (the single-channel invariant)
///
/// By default each transport reports `Opened` immediately; a gated connector
/// holds connections unopened until the test releases them.
#[derive(Debug)]
pub struct MockConnector {
    auto_open: bool,
    live: Arc<AtomicUsize>,
    max_live: AtomicUsize,
    connect_count: AtomicUsize,
    probes: Mutex<Vec<Arc<Mutex<TransportProbe>>>>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self {
            auto_open: true,
            live: Arc::default(),
            max_live: AtomicUsize::new(0),
            connect_count: AtomicUsize::new(0),
            probes: Mutex::default(),
        }
    }
}

impl MockConnector {
    /// Connections stay unopened until [`Self::release_open`] is called
    pub fn gated() -> Self {
        Self {
            auto_open: false,
            ..Self::default()
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live transports observed
    pub fn max_live_count(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn sent_frames(&self) -> Vec<WsMessage> {
        self.last_probe().lock().unwrap().sent.clone()
    }

    /// Frames sent on the `index`-th connection (in connect order)
    pub fn sent_frames_at(&self, index: usize) -> Vec<WsMessage> {
        self.probe_at(index).lock().unwrap().sent.clone()
    }

    /// Queues an inbound event on the most recent transport
    pub fn push_inbound(&self, event: WsEvent) {
        self.last_probe().lock().unwrap().inbound.push_back(event);
    }

    /// Delivers `Opened` on the `index`-th connection of a gated connector
    pub fn release_open(&self, index: usize) {
        self.probe_at(index)
            .lock()
            .unwrap()
            .inbound
            .push_back(WsEvent::Opened);
    }

    fn last_probe(&self) -> Arc<Mutex<TransportProbe>> {
        self.probes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport was connected yet")
    }

    fn probe_at(&self, index: usize) -> Arc<Mutex<TransportProbe>> {
        Arc::clone(&self.probes.lock().unwrap()[index])
    }
}

impl PushConnector for MockConnector {
    fn connect(
        &self,
        _url: String,
        _wake_up: Arc<dyn Fn() + Send + Sync>,
    ) -> anyhow::Result<Box<dyn PushTransport>> {
        let inbound = if self.auto_open {
            VecDeque::from([WsEvent::Opened])
        } else {
            VecDeque::new()
        };
        let probe = Arc::new(Mutex::new(TransportProbe {
            sent: Vec::new(),
            inbound,
        }));
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let live_now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live_now, Ordering::SeqCst);
        self.probes.lock().unwrap().push(Arc::clone(&probe));
        Ok(Box::new(MockTransport {
            probe,
            live: Arc::clone(&self.live),
        }))
    }
}

/// A full test harness around one [`Client`]
pub struct Harness {
    pub client: Client,
    pub api: Arc<ScriptedApi>,
    pub connector: Arc<MockConnector>,
    pub store: SharedTokenStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_connector(MockConnector::default())
    }

    /// Harness whose channel connections stay unopened until released
    pub fn gated() -> Self {
        Self::with_connector(MockConnector::gated())
    }

    fn with_connector(connector: MockConnector) -> Self {
        let api = Arc::new(ScriptedApi::default());
        let connector = Arc::new(connector);
        let store = SharedTokenStore::default();
        let client = Client::from_parts(
            SERVER_ADDRESS.to_string(),
            Box::new(store.clone()),
            Arc::clone(&api) as Arc<dyn AuthApi>,
            Arc::clone(&connector) as Arc<dyn PushConnector>,
        );
        Self {
            client,
            api,
            connector,
            store,
        }
    }
}

pub fn profile(email: &str, is_superuser: bool, permission_names: &[&str]) -> UserProfile {
    let permissions = permission_names
        .iter()
        .enumerate()
        .map(|(i, name)| Permission {
            id: (i as u64).into(),
            name: (*name).try_into().unwrap(),
            description: None,
            module_group: None,
        })
        .collect();
    let role = Role {
        id: 1.into(),
        name: RoleName::try_from("plan_starter").unwrap(),
        display_name: RoleDisplayName::try_from("+EV Starter".to_string()).unwrap(),
        description: None,
        is_active: true,
        permissions,
    };
    UserProfile {
        id: UserId::nil(),
        email: EmailAddress::try_from(email).unwrap(),
        full_name: None,
        is_active: true,
        is_superuser,
        roles: vec![role],
    }
}

pub fn login_args() -> LoginReqArgs {
    LoginReqArgs::new("a@b.com", "pw".to_string())
}

/// Inbound text frame as the server's connection manager would send it
pub fn push_text_frame(raw: &str) -> WsEvent {
    WsEvent::Message(WsMessage::Text(raw.to_string()))
}
