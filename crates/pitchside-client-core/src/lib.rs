//! Session, authorization and real-time-notice manager shared between the
//! clients.
//!
//! The [`Client`] is the process-wide session context: it owns the stored
//! bearer token, the resolved [`pitchside_shared::uac::UserProfile`], the
//! derived permission index and the push-notification channel. It is intended
//! to be constructed once at process start and cloned into whatever needs it.
//!
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called (native targets).

#![warn(unused_crate_dependencies)]


mod client;

pub use client::{
    api::{AuthApi, HttpAuthApi},
    channel::{ChannelState, PushConnector, PushTransport, SharedWake, WakeFn},
    guards::{self, GuardOutcome},
    notices::{Notice, NoticeId, NoticeQueue},
    session::SessionState,
    storage::{MemoryTokenStore, TokenStore},
    Client,
};

#[cfg(not(target_arch = "wasm32"))]
pub use client::storage::FileTokenStore;
