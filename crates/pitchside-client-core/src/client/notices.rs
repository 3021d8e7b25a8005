use std::collections::VecDeque;

use tracing::warn;

use pitchside_shared::{
    const_config::client::{CLIENT_NOTICE_QUEUE_CAP, CLIENT_NOTICE_TTL},
    push::NoticeKind,
    time::Timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NoticeId(u64);

/// Ephemeral user-facing alert sourced from the push channel
///
/// Purely transient: held in memory only and gone after the TTL whether or
/// not anything displayed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: Timestamp,
}

impl Notice {
    pub fn expires_at(&self) -> Timestamp {
        self.created_at + CLIENT_NOTICE_TTL
    }
}

/// Insertion-ordered bounded queue of notices
///
/// The TTL is a single fixed value so insertion order is also expiry order
/// and pruning only ever pops from the front. No per-item timers.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    next_id: u64,
    entries: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn push(&mut self, kind: NoticeKind, message: String, now: Timestamp) -> NoticeId {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        if self.entries.len() >= CLIENT_NOTICE_QUEUE_CAP {
            let dropped = self.entries.pop_front();
            warn!(?dropped, "notice queue full, dropping the oldest notice");
        }
        self.entries.push_back(Notice {
            id,
            kind,
            message,
            created_at: now,
        });
        id
    }

    /// Removes every notice whose TTL has elapsed at `now`
    pub fn prune_expired(&mut self, now: Timestamp) {
        while self
            .entries
            .front()
            .is_some_and(|notice| notice.expires_at() <= now)
        {
            self.entries.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
