//! Outbound message fan-out.
//!
//! Transitions run under the room lock and record what to send in an
//! [`Outbox`]. The outbox captures each recipient's [`Outlet`] along with
//! the message, so it can be delivered once the lock is released.

use scribble_protocol::{ChatMessage, ServerMessage, SessionId};
use scribble_session::{Outlet, Session, SessionRegistry};

use crate::round::Round;

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every session in the room.
    All,
    /// One session.
    Session(SessionId),
    /// Every session but one (typically the sender).
    AllExcept(SessionId),
}

/// Messages computed under the lock, waiting to be delivered.
#[derive(Debug, Default)]
#[must_use = "an outbox does nothing until delivered"]
pub struct Outbox {
    deliveries: Vec<(Outlet, ServerMessage)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `msg` for every session matching `to`.
    pub fn push(&mut self, sessions: &SessionRegistry, to: Recipient, msg: ServerMessage) {
        match to {
            Recipient::All => {
                for session in sessions.iter() {
                    self.push_to(session, msg.clone());
                }
            }
            Recipient::Session(id) => {
                if let Some(session) = sessions.get(&id) {
                    self.push_to(session, msg);
                }
            }
            Recipient::AllExcept(excluded) => {
                for session in sessions.iter().filter(|s| s.id != excluded) {
                    self.push_to(session, msg.clone());
                }
            }
        }
    }

    /// Queues `msg` for one session.
    pub fn push_to(&mut self, session: &Session, msg: ServerMessage) {
        self.deliveries.push((session.outlet(), msg));
    }

    /// The `players` list, to everyone.
    pub fn players(&mut self, sessions: &SessionRegistry, round: &Round) {
        let msg = ServerMessage::Players(sessions.players(drawing(round)));
        self.push(sessions, Recipient::All, msg);
    }

    /// `gameState`, tailored per recipient, to everyone.
    pub fn game_state(&mut self, sessions: &SessionRegistry, round: &Round) {
        for session in sessions.iter() {
            self.push_to(session, ServerMessage::GameState(round.view_for(session.id)));
        }
    }

    /// `gameState` to one session.
    pub fn game_state_to(&mut self, session: &Session, round: &Round) {
        self.push_to(session, ServerMessage::GameState(round.view_for(session.id)));
    }

    /// A system notice, to everyone.
    pub fn notice(&mut self, sessions: &SessionRegistry, text: impl Into<String>) {
        self.chat(sessions, ChatMessage::system(text));
    }

    /// A chat line, to everyone.
    pub fn chat(&mut self, sessions: &SessionRegistry, chat: ChatMessage) {
        self.push(sessions, Recipient::All, ServerMessage::Chat(chat));
    }

    /// Appends everything queued in `other`, keeping order.
    pub fn extend(&mut self, other: Outbox) {
        self.deliveries.extend(other.deliveries);
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Messages queued for one session, in order.
    pub fn messages_for(&self, id: SessionId) -> impl Iterator<Item = &ServerMessage> {
        self.deliveries
            .iter()
            .filter(move |(outlet, _)| outlet.id() == id)
            .map(|(_, msg)| msg)
    }

    /// Sends everything. Returns how many messages were accepted by their
    /// session channels.
    pub fn deliver(self) -> usize {
        self.deliveries
            .into_iter()
            .map(|(outlet, msg)| outlet.send(msg))
            .filter(|sent| *sent)
            .count()
    }
}

/// The drawer to flag in `players`: only while a round is running.
fn drawing(round: &Round) -> Option<SessionId> {
    round.drawer().filter(|_| round.is_active())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_push_routes_by_recipient() {
        let mut sessions = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = sessions.join("a", tx_a).id;
        let b = sessions.join("b", tx_b).id;

        let mut outbox = Outbox::new();
        outbox.push(&sessions, Recipient::All, ServerMessage::clear_canvas());
        outbox.push(&sessions, Recipient::Session(b), ServerMessage::clear_canvas());
        outbox.push(&sessions, Recipient::AllExcept(b), ServerMessage::clear_canvas());
        outbox.push(&sessions, Recipient::Session(SessionId::new()), ServerMessage::clear_canvas());

        assert_eq!(outbox.messages_for(a).count(), 2);
        assert_eq!(outbox.messages_for(b).count(), 2);
        assert_eq!(outbox.deliver(), 4);

        let count = |rx: &mut mpsc::UnboundedReceiver<ServerMessage>| {
            std::iter::from_fn(|| rx.try_recv().ok()).count()
        };
        assert_eq!(count(&mut rx_a), 2);
        assert_eq!(count(&mut rx_b), 2);
    }

    #[test]
    fn test_deliver_counts_only_open_channels() {
        let mut sessions = SessionRegistry::new();
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        sessions.join("a", tx_a);
        sessions.join("b", tx_b);
        drop(rx_a);

        let mut outbox = Outbox::new();
        outbox.notice(&sessions, "hello");
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.deliver(), 1);
    }

    #[test]
    fn test_players_flags_drawer_only_while_active() {
        let mut sessions = SessionRegistry::new();
        let a = sessions.join("a", mpsc::unbounded_channel().0).id;
        let round = Round::choosing(a, vec!["kite".into()], 1, 80);

        let mut outbox = Outbox::new();
        outbox.players(&sessions, &round);
        outbox.players(&sessions, &Round::idle());

        let flags: Vec<bool> = outbox
            .messages_for(a)
            .map(|msg| match msg {
                ServerMessage::Players(players) => players[0].is_drawing,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }
}
