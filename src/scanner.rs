//! Finding sessions that still need delta processing

use std::collections::BTreeSet;
use tracing::debug;

use crate::Result;
use crate::config::SessionMatch;
use crate::store::{LogKind, SessionLogStore};
use crate::types::SessionId;

/// Coordinate sessions without a matching delta log, in id order.
///
/// With [`SessionMatch::Exact`] this is the set difference `coordinates \ deltas`.
/// With [`SessionMatch::Substring`] a coordinate session is also considered
/// processed when any delta id merely contains its id.
pub fn unprocessed(
    coordinates: &BTreeSet<SessionId>,
    deltas: &BTreeSet<SessionId>,
    policy: SessionMatch,
) -> Vec<SessionId> {
    coordinates
        .iter()
        .filter(|id| match policy {
            SessionMatch::Exact => !deltas.contains(*id),
            SessionMatch::Substring => !deltas.iter().any(|d| d.as_str().contains(id.as_str())),
        })
        .cloned()
        .collect()
}

/// Scans a store for unprocessed sessions
#[derive(Debug, Clone)]
pub struct SessionScanner {
    store: SessionLogStore,
    policy: SessionMatch,
}

impl SessionScanner {
    pub fn new(store: SessionLogStore, policy: SessionMatch) -> Self {
        Self { store, policy }
    }

    /// List both log kinds and return the sessions still lacking a delta log.
    pub fn scan(&self) -> Result<Vec<SessionId>> {
        let coordinates = self.store.list_session_ids(LogKind::Coordinate)?;
        let deltas = self.store.list_session_ids(LogKind::Delta)?;
        let pending = unprocessed(&coordinates, &deltas, self.policy);

        debug!(
            "Scan found {} coordinate logs, {} delta logs, {} unprocessed",
            coordinates.len(),
            deltas.len(),
            pending.len()
        );
        Ok(pending)
    }
}
