use std::fmt::Debug;

use pitchside_shared::token::AuthToken;

/// Durable holder of the bearer token, owned exclusively by the [`Client`]
///
/// `set` and `clear` are synchronous and must be immediately observable by
/// subsequent `get` calls; durable implementations additionally survive a
/// process restart. No network effects.
///
/// [`Client`]: crate::Client
pub trait TokenStore: Debug + Send {
    fn get(&self) -> Option<AuthToken>;
    fn set(&mut self, token: &AuthToken) -> anyhow::Result<()>;
    fn clear(&mut self) -> anyhow::Result<()>;
}

/// Non-durable store for targets without a usable filesystem and for tests
#[derive(Debug, Default)]
pub struct MemoryTokenStore(Option<AuthToken>);

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<AuthToken> {
        self.0.clone()
    }

    fn set(&mut self, token: &AuthToken) -> anyhow::Result<()> {
        self.0 = Some(token.clone());
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.0 = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTokenStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::*;
    use anyhow::Context as _;
    use pitchside_shared::const_config::client::CLIENT_TOKEN_STORAGE_KEY;
    use std::path::PathBuf;

    /// Persists the token in a file under a fixed name inside `dir`
    ///
    /// Absence of the file means "unauthenticated at startup".
    #[derive(Debug)]
    pub struct FileTokenStore {
        path: PathBuf,
    }

    impl FileTokenStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self {
                path: dir.into().join(CLIENT_TOKEN_STORAGE_KEY),
            }
        }
    }

    impl TokenStore for FileTokenStore {
        fn get(&self) -> Option<AuthToken> {
            let contents = std::fs::read_to_string(&self.path).ok()?;
            let token = contents.trim();
            if token.is_empty() {
                None
            } else {
                Some(token.into())
            }
        }

        fn set(&mut self, token: &AuthToken) -> anyhow::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create token folder: {parent:?}"))?;
            }
            std::fs::write(&self.path, token.as_str())
                .with_context(|| format!("failed to write token file: {:?}", self.path))
        }

        fn clear(&mut self) -> anyhow::Result<()> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e)
                    .with_context(|| format!("failed to remove token file: {:?}", self.path)),
            }
        }
    }
}
