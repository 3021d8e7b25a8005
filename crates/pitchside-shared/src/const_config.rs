//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

pub mod client {
    use crate::time::Seconds;

    /// How long a notice stays in the queue before it self-expires
    pub const CLIENT_NOTICE_TTL: Seconds = Seconds::new(7);

    /// Upper bound on notices held in memory, oldest dropped first
    pub const CLIENT_NOTICE_QUEUE_CAP: usize = 32;

    /// Fixed name the bearer token is persisted under
    pub const CLIENT_TOKEN_STORAGE_KEY: &str = "auth_token";
}

pub mod path {
    use reqwest::Method;

    #[derive(Debug, Clone)]
    pub struct PathSpec {
        pub path: &'static str,
        pub method: Method,
    }

    impl PathSpec {
        pub const fn get(path: &'static str) -> Self {
            Self {
                path,
                method: Method::GET,
            }
        }

        pub const fn post(path: &'static str) -> Self {
            Self {
                path,
                method: Method::POST,
            }
        }
    }

    pub const PATH_API_AUTH_LOGIN: PathSpec = PathSpec::post("/api/v1/auth/login");
    pub const PATH_API_USERS_ME: PathSpec = PathSpec::get("/api/v1/users/me");
    pub const PATH_API_HEALTH: PathSpec = PathSpec::get("/api/v1/health");
    /// Websocket endpoint, relative to the server address with the scheme
    /// switched from http(s) to ws(s)
    pub const PATH_WS: &str = "/api/v1/ws";
}
