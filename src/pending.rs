//! # Feature: Pending Forwards
//!
//! Remembers which guild a user most recently joined so their next direct
//! message can be relayed to that guild's staff channel. Entries are one-shot
//! and have no expiry.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial release backed by DashMap

use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct PendingForwards {
    entries: Arc<DashMap<u64, u64>>,
}

impl PendingForwards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the most recent join is honoured.
    pub fn record_join(&self, user_id: u64, guild_id: u64) {
        self.entries.insert(user_id, guild_id);
    }

    /// Remove and return the guild the user joined, if one is pending
    pub fn consume(&self, user_id: u64) -> Option<u64> {
        self.entries.remove(&user_id).map(|(_, guild_id)| guild_id)
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.entries.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
