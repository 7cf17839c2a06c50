//! The session registry: every participant currently in the room.
//!
//! Besides the id → session lookup it keeps the ids in join order. That
//! order is what the turn rotation and owner promotion walk, so neither
//! depends on `HashMap` iteration order.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is plain data. It is owned by the room and reached
//! only through the room's lock.

use std::collections::HashMap;

use scribble_protocol::{PlayerResult, PlayerView, Role, SessionId};

use crate::session::{Session, SessionSender, normalize_name};

/// What happened when a session left.
#[derive(Debug)]
pub struct Departure {
    /// The removed session (its sender is dropped with it).
    pub session: Session,
    /// The session promoted to owner, if the leaver was the owner and
    /// anyone remains.
    pub promoted: Option<SessionId>,
}

/// Registry of connected sessions.
///
/// ```text
/// join() ──→ [in registry] ──→ leave()
///   │                            │
///   └─ first in room? → Owner    └─ was Owner? → earliest joiner promoted
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    /// Ids in join order. Kept in sync with `sessions`.
    order: Vec<SessionId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session under a fresh id.
    ///
    /// The first session in an empty room becomes the owner; everyone
    /// after that joins as a player.
    pub fn join(&mut self, name: &str, sender: SessionSender) -> &Session {
        let id = SessionId::new();
        let role = if self.sessions.is_empty() {
            Role::Owner
        } else {
            Role::Player
        };
        let session = Session::new(id, normalize_name(name), role, sender);

        tracing::info!(
            session_id = %id,
            name = %session.name,
            %role,
            total = self.sessions.len() + 1,
            "session joined"
        );

        self.order.push(id);
        self.sessions.entry(id).or_insert(session)
    }

    /// Removes a session.
    ///
    /// If the owner leaves and others remain, the earliest-joined remaining
    /// session is promoted. Unknown ids are ignored and return `None`.
    pub fn leave(&mut self, id: SessionId) -> Option<Departure> {
        let session = self.sessions.remove(&id)?;
        self.order.retain(|other| *other != id);

        let mut promoted = None;
        if session.role == Role::Owner {
            if let Some(next) = self
                .order
                .first()
                .and_then(|next| self.sessions.get_mut(next))
            {
                next.role = Role::Owner;
                promoted = Some(next.id);
                tracing::info!(
                    session_id = %next.id,
                    name = %next.name,
                    "promoted to room owner"
                );
            }
        }

        tracing::info!(
            session_id = %id,
            name = %session.name,
            total = self.sessions.len(),
            "session left"
        );

        Some(Departure { session, promoted })
    }

    /// Looks up a session.
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Looks up a session for mutation.
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Whether the id belongs to a connected session.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Session ids in join order.
    pub fn order(&self) -> &[SessionId] {
        &self.order
    }

    /// Sessions in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    /// The current owner, if the room is non-empty.
    pub fn owner(&self) -> Option<SessionId> {
        self.iter().find(|s| s.is_owner()).map(|s| s.id)
    }

    /// Number of connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Adds points to a session's score. Returns the new score.
    pub fn award(&mut self, id: &SessionId, points: u32) -> Option<u32> {
        let session = self.sessions.get_mut(id)?;
        session.score = session.score.saturating_add(points);
        Some(session.score)
    }

    /// Clears every score to zero.
    pub fn reset_scores(&mut self) {
        for session in self.sessions.values_mut() {
            session.score = 0;
        }
    }

    /// The `players` list, in join order. `drawer` is flagged as drawing.
    pub fn players(&self, drawer: Option<SessionId>) -> Vec<PlayerView> {
        self.iter()
            .map(|s| s.view(Some(s.id) == drawer))
            .collect()
    }

    /// Standings, best score first. Ties keep join order.
    pub fn ranked(&self) -> Vec<PlayerResult> {
        let mut results: Vec<PlayerResult> =
            self.iter().map(Session::result).collect();
        // `sort_by` is stable, so equal scores stay in join order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }
}
