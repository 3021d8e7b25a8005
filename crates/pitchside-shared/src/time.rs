//! Simple time wrappers to make many errors hard to make

use std::fmt::Display;

/// Intended to be similar to Duration but always clear that it is in Seconds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Seconds(u64);

/// Milliseconds since the unix epoch. Intended to be similar to Instant but
/// keeps on ticking if the computer is sleeping, only works with dates after
/// the epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(
            web_time::SystemTime::UNIX_EPOCH
                .elapsed()
                .expect("expected date on system to be after the epoch")
                .as_millis() as u64,
        )
    }

    pub fn as_millis_since_unix_epoch(&self) -> u64 {
        self.0
    }

    pub fn as_local_datetime(&self) -> chrono::DateTime<chrono::Local> {
        chrono::DateTime::from_timestamp_millis(self.0.try_into().unwrap())
            .expect("wow this program wasn't meant to last that long")
            .into()
    }

    /// Returns the number of whole seconds since `past_time` or None if
    /// `past_time` is in the future
    pub fn seconds_since(self, past_time: Self) -> Option<Seconds> {
        if self.0 < past_time.0 {
            None
        } else {
            Some(Seconds::new((self.0 - past_time.0) / 1_000))
        }
    }
}

impl std::ops::Add<Seconds> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Seconds) -> Self::Output {
        Self(self.0 + rhs.0 * 1_000)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Seconds {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns true if this represents zero seconds
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_millis(&self) -> u64 {
        self.0 * 1_000
    }
}

impl From<u64> for Seconds {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Seconds> for std::time::Duration {
    fn from(value: Seconds) -> Self {
        std::time::Duration::from_secs(value.0)
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
