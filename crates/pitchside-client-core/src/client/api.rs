//! The request/response side of the backend: credential exchange, profile
//! resolution and the health check
//!
//! Methods return a `oneshot::Receiver` so the same shape works for callers
//! that await and callers that poll from a UI tick.

use std::fmt::Debug;

use futures::channel::oneshot;
use reqwest::StatusCode;
use tracing::warn;

use pitchside_shared::{
    const_config::path::{PathSpec, PATH_API_AUTH_LOGIN, PATH_API_HEALTH, PATH_API_USERS_ME},
    errors::{LoginError, ResolveError},
    req_args::LoginReqArgs,
    token::AuthToken,
    uac::UserProfile,
};

pub trait AuthApi: Debug + Send + Sync {
    /// `POST` the login form; does NOT touch any stored state
    fn exchange_credentials(
        &self,
        args: &LoginReqArgs,
    ) -> oneshot::Receiver<Result<AuthToken, LoginError>>;

    /// Resolves `token` into the profile it belongs to
    fn fetch_profile(&self, token: &AuthToken)
        -> oneshot::Receiver<Result<UserProfile, ResolveError>>;

    fn health_check(&self) -> oneshot::Receiver<Result<(), ResolveError>>;
}

/// [`AuthApi`] implementation against the real backend
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    api_client: reqwest::Client,
    server_address: String,
}

#[derive(Debug, serde::Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
}

impl HttpAuthApi {
    pub fn new(server_address: String) -> Self {
        let api_client = reqwest::Client::builder()
            .build()
            .expect("Unable to create reqwest client");
        Self {
            api_client,
            server_address,
        }
    }

    fn request(&self, path_spec: PathSpec) -> reqwest::RequestBuilder {
        self.api_client.request(
            path_spec.method,
            format!("{}{}", self.server_address, path_spec.path),
        )
    }
}

impl AuthApi for HttpAuthApi {
    #[tracing::instrument(skip(args))]
    // WARNING: Must skip args as it contains the password
    fn exchange_credentials(
        &self,
        args: &LoginReqArgs,
    ) -> oneshot::Receiver<Result<AuthToken, LoginError>> {
        let (tx, rx) = oneshot::channel();
        let request = self
            .request(PATH_API_AUTH_LOGIN)
            .form(&args.form_pairs());
        reqwest_cross::fetch(request, move |resp: reqwest::Result<reqwest::Response>| async {
            let msg = process_token(resp).await;
            tx.send(msg).expect("failed to send oneshot msg");
        });
        rx
    }

    #[tracing::instrument]
    fn fetch_profile(
        &self,
        token: &AuthToken,
    ) -> oneshot::Receiver<Result<UserProfile, ResolveError>> {
        let (tx, rx) = oneshot::channel();
        let request = self
            .request(PATH_API_USERS_ME)
            .bearer_auth(token.as_str());
        reqwest_cross::fetch(request, move |resp: reqwest::Result<reqwest::Response>| async {
            let msg = process_json_body(resp).await;
            tx.send(msg).expect("failed to send oneshot msg");
        });
        rx
    }

    #[tracing::instrument]
    fn health_check(&self) -> oneshot::Receiver<Result<(), ResolveError>> {
        let (tx, rx) = oneshot::channel();
        let request = self.request(PATH_API_HEALTH);
        reqwest_cross::fetch(request, move |resp: reqwest::Result<reqwest::Response>| async {
            let msg = process_empty(resp).await;
            tx.send(msg).expect("failed to send oneshot msg");
        });
        rx
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_token(
    response: reqwest::Result<reqwest::Response>,
) -> Result<AuthToken, LoginError> {
    let response = response.map_err(|e| LoginError::Unreachable(e.to_string()))?;
    match response.status() {
        StatusCode::OK => {
            let body: AccessTokenResponse = response.json().await.map_err(|e| {
                LoginError::Unreachable(format!("failed to parse login response: {e}"))
            })?;
            if !body.token_type.is_empty() && !body.token_type.eq_ignore_ascii_case("bearer") {
                warn!(token_type = %body.token_type, "unexpected token type from the server");
            }
            Ok(body.access_token.into())
        }
        StatusCode::UNAUTHORIZED => Err(LoginError::InvalidCredentials),
        status => Err(LoginError::Unreachable(
            read_error_body(response, status).await,
        )),
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_json_body<T>(
    response: reqwest::Result<reqwest::Response>,
) -> Result<T, ResolveError>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let response = response.map_err(|e| ResolveError::Unreachable(e.to_string()))?;
    match response.status() {
        StatusCode::OK => response
            .json()
            .await
            .map_err(|e| ResolveError::Unreachable(format!("failed to parse result as json: {e}"))),
        StatusCode::UNAUTHORIZED => Err(ResolveError::InvalidCredential),
        status => Err(ResolveError::Unreachable(
            read_error_body(response, status).await,
        )),
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_empty(response: reqwest::Result<reqwest::Response>) -> Result<(), ResolveError> {
    let response = response.map_err(|e| ResolveError::Unreachable(e.to_string()))?;
    let status = response.status();
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(ResolveError::Unreachable(
            read_error_body(response, status).await,
        ))
    }
}

async fn read_error_body(response: reqwest::Response, status: StatusCode) -> String {
    match response.text().await {
        Ok(body) if !body.is_empty() => format!("request failed with status code {status}: {body}"),
        _ => format!("request failed with status code {status} and no body"),
    }
}
