//! End-to-end round flow through `RoomHandle`, with real timers.
//!
//! All tests run with a paused clock: `sleep` jumps virtual time forward
//! once every task is idle, so an 80 second round takes no real time.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use scribble_protocol::{
    ChatRequest, ChooseWord, ClientMessage, GameStateView, PlayerResult, ServerMessage,
    SessionId,
};
use scribble_room::{Phase, Room, RoomConfig, RoomError, RoomHandle, WordBank};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

struct Client {
    id: SessionId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Client {
    async fn join(room: &RoomHandle, name: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = room.join(name, tx).await;
        Self { id, rx }
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }

    fn chats(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::Chat(chat) => Some(chat.message),
                _ => None,
            })
            .collect()
    }

    fn last_state(&mut self) -> Option<GameStateView> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::GameState(state) => Some(state),
                _ => None,
            })
            .last()
    }
}

fn room_with(config: RoomConfig) -> RoomHandle {
    RoomHandle::from_room(Room::with_words(
        config,
        WordBank::new(["apple", "kite", "moon", "tree"]),
        StdRng::seed_from_u64(11),
    ))
}

fn room() -> RoomHandle {
    room_with(RoomConfig::default())
}

async fn start(room: &RoomHandle, owner: &Client) {
    room.dispatch(owner.id, ClientMessage::StartGame)
        .await
        .expect("start game");
}

async fn choose(room: &RoomHandle, drawer: SessionId) -> String {
    room.dispatch(drawer, ClientMessage::ChooseWord(ChooseWord { word_index: 0 }))
        .await
        .expect("choose word");
    room.read().await.round().word().expect("word chosen").to_string()
}

async fn say(room: &RoomHandle, who: &Client, text: &str) -> Result<(), RoomError> {
    room.dispatch(
        who.id,
        ClientMessage::Chat(ChatRequest {
            message: text.to_string(),
        }),
    )
    .await
}

async fn drawer(room: &RoomHandle) -> SessionId {
    room.read().await.round().drawer().expect("drawer assigned")
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_two_player_round_then_auto_restart() {
    let room = room();
    let mut a = Client::join(&room, "alice").await;
    let mut b = Client::join(&room, "bob").await;

    start(&room, &a).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(drawer(&room).await, a.id);

    let word = choose(&room, a.id).await;
    let hint = b.last_state().unwrap().word_hint;
    assert_eq!(hint.chars().count(), word.chars().count());
    assert_ne!(hint, word);
    assert_eq!(a.last_state().unwrap().word_hint, word);

    say(&room, &b, &word).await.unwrap();
    assert_eq!(room.phase().await, Phase::RoundEnd);
    assert_eq!(
        room.read().await.sessions().get(&b.id).unwrap().score,
        100
    );
    let chats = a.chats();
    assert!(chats.contains(&"bob guessed the word!".to_string()));
    assert!(chats.contains(&format!("The word was: {word}")));

    // Nothing happens before the restart delay...
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(room.phase().await, Phase::RoundEnd);

    // ...then the next drawer is up.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(drawer(&room).await, b.id);
    assert_eq!(room.read().await.round().number(), 2);
    b.drain();
}

// =========================================================================
// Clock
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_clock_counts_down_each_second() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    start(&room, &a).await;
    choose(&room, a.id).await;
    b.drain();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let remaining: Vec<u32> = b
        .drain()
        .into_iter()
        .filter_map(|msg| match msg {
            ServerMessage::GameState(state) => Some(state.time_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, vec![79, 78, 77]);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_clock_catches_up_from_elapsed_time() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    start(&room, &a).await;
    choose(&room, a.id).await;
    b.drain();
    // Let the clock task arm its first tick.
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Jump past three ticks at once; one late tick fires.
    tokio::time::advance(Duration::from_millis(3500)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = b.last_state().expect("countdown refreshed");
    assert_eq!(state.time_remaining, 77);
    assert_eq!(room.phase().await, Phase::Drawing);
}

#[tokio::test(start_paused = true)]
async fn test_time_up_ends_round_and_reveals_word() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    start(&room, &a).await;
    let word = choose(&room, a.id).await;
    b.drain();

    tokio::time::sleep(Duration::from_secs(79)).await;
    assert_eq!(room.phase().await, Phase::Drawing);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(room.phase().await, Phase::RoundEnd);
    let chats = b.chats();
    assert!(chats.contains(&"Time's up!".to_string()));
    assert!(chats.contains(&format!("The word was: {word}")));
    assert!(!room.read().await.round().has_clock());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(drawer(&room).await, b.id);
}

#[tokio::test(start_paused = true)]
async fn test_choosing_phase_has_no_clock() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let _b = Client::join(&room, "b").await;
    start(&room, &a).await;

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(room.read().await.round().time_remaining(), 80);
}

// =========================================================================
// Early endings and departures
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drawer_leaving_cancels_clock() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let b = Client::join(&room, "b").await;
    let _c = Client::join(&room, "c").await;
    start(&room, &a).await;
    choose(&room, a.id).await;

    room.leave(a.id).await;
    assert_eq!(room.phase().await, Phase::RoundEnd);
    assert!(!room.read().await.round().has_clock());

    // Restart picks up with the earliest remaining joiner.
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(drawer(&room).await, b.id);

    // The old round's clock must not end the new round.
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(room.phase().await, Phase::Choosing);
    assert_eq!(room.read().await.round().number(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_too_few_players_resets_room() {
    let room = room();
    let mut a = Client::join(&room, "a").await;
    let b = Client::join(&room, "b").await;
    start(&room, &a).await;
    choose(&room, a.id).await;
    a.drain();

    room.leave(b.id).await;
    assert_eq!(room.phase().await, Phase::Idle);
    let state = a.last_state().unwrap();
    assert!(!state.is_active);
    assert_eq!(state.round_number, 0);
    assert_eq!(state.current_drawer, None);

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(room.phase().await, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_during_restart_delay_cancels_restart() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let b = Client::join(&room, "b").await;
    start(&room, &a).await;
    let word = choose(&room, a.id).await;
    say(&room, &b, &word).await.unwrap();
    assert!(room.read().await.restart_pending());

    room.leave(b.id).await;
    assert!(!room.read().await.restart_pending());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(room.phase().await, Phase::RoundEnd);
}

#[tokio::test(start_paused = true)]
async fn test_manual_start_during_delay_replaces_restart() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let b = Client::join(&room, "b").await;
    start(&room, &a).await;
    let word = choose(&room, a.id).await;
    say(&room, &b, &word).await.unwrap();

    start(&room, &a).await;
    assert_eq!(room.read().await.round().number(), 2);

    // The cancelled restart must not start a third round.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(room.read().await.round().number(), 2);
    assert_eq!(room.phase().await, Phase::Choosing);
}

// =========================================================================
// Rotation and scoring
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_every_player_draws_in_join_order() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let b = Client::join(&room, "b").await;
    let c = Client::join(&room, "c").await;
    let clients = [&a, &b, &c];

    start(&room, &a).await;
    let mut drawers = Vec::new();
    for _ in 0..6 {
        let current = drawer(&room).await;
        drawers.push(current);
        let word = choose(&room, current).await;
        for client in clients.iter().filter(|c| c.id != current) {
            say(&room, client, &word).await.unwrap();
        }
        assert_eq!(room.phase().await, Phase::RoundEnd);
        tokio::time::sleep(Duration::from_secs(6)).await;
    }
    assert_eq!(drawers, vec![a.id, b.id, c.id, a.id, b.id, c.id]);
}

#[tokio::test(start_paused = true)]
async fn test_repeat_guess_is_not_rebroadcast() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    let mut c = Client::join(&room, "c").await;
    start(&room, &a).await;
    let word = choose(&room, a.id).await;

    say(&room, &b, &word).await.unwrap();
    c.drain();
    say(&room, &b, &word).await.unwrap();
    assert!(c.drain().is_empty());
    assert_eq!(room.read().await.sessions().get(&b.id).unwrap().score, 100);
    b.drain();
}

#[tokio::test(start_paused = true)]
async fn test_cycle_end_sends_ranked_results() {
    let room = room_with(RoomConfig {
        max_rounds: 2,
        ..RoomConfig::default()
    });
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    let c = Client::join(&room, "c").await;
    let clients = [&a, &b, &c];

    start(&room, &a).await;
    for _ in 0..2 {
        let current = drawer(&room).await;
        let word = choose(&room, current).await;
        // Only the first non-drawer guesses, so scores differ.
        let guesser = clients.iter().find(|c| c.id != current).unwrap();
        say(&room, guesser, &word).await.unwrap();
        tokio::time::sleep(Duration::from_secs(81)).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
    }

    let results: Vec<PlayerResult> = b
        .drain()
        .into_iter()
        .find_map(|msg| match msg {
            ServerMessage::Results(results) => Some(results),
            _ => None,
        })
        .expect("results after last round");
    // Round 1: a draws, b guesses. Round 2: b draws, a guesses.
    let scores: Vec<(SessionId, u32)> = results.iter().map(|r| (r.id, r.score)).collect();
    assert_eq!(scores, vec![(a.id, 100), (b.id, 100), (c.id, 0)]);

    let room = room.read().await;
    assert_eq!(room.round().number(), 1);
    assert!(room.sessions().iter().all(|s| s.score == 0));
}

#[tokio::test(start_paused = true)]
async fn test_default_cycle_wraps_after_ten_rounds() {
    let room = room();
    let a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;

    start(&room, &a).await;
    for round in 1..=10 {
        assert_eq!(room.read().await.round().number(), round);
        let current = drawer(&room).await;
        let word = choose(&room, current).await;
        let clients = [&a, &b];
        let guesser = clients.iter().find(|c| c.id != current).unwrap();
        say(&room, guesser, &word).await.unwrap();
        assert_eq!(room.phase().await, Phase::RoundEnd);
        b.drain();
        tokio::time::sleep(Duration::from_secs(6)).await;
    }

    let messages = b.drain();
    let results = messages
        .iter()
        .find_map(|msg| match msg {
            ServerMessage::Results(results) => Some(results.clone()),
            _ => None,
        })
        .expect("results on the eleventh start");
    let scores: Vec<(SessionId, u32)> = results.iter().map(|r| (r.id, r.score)).collect();
    assert_eq!(scores, vec![(a.id, 500), (b.id, 500)]);
    assert!(messages.iter().any(|msg| matches!(
        msg,
        ServerMessage::Chat(chat) if chat.message == "Final Results!"
    )));

    let room = room.read().await;
    assert_eq!(room.phase(), Phase::Choosing);
    assert_eq!(room.round().number(), 1);
    assert!(room.sessions().iter().all(|s| s.score == 0));
}

// =========================================================================
// Rejections
// =========================================================================

#[tokio::test]
async fn test_start_alone_sends_notice() {
    let room = room();
    let mut a = Client::join(&room, "a").await;
    a.drain();

    let err = room.dispatch(a.id, ClientMessage::StartGame).await.unwrap_err();
    assert_eq!(err, RoomError::NotEnoughPlayers { have: 1, need: 2 });
    assert_eq!(a.chats(), vec!["Need at least 2 players to start the game!"]);
}

#[tokio::test]
async fn test_rejected_requests_send_nothing() {
    let room = room();
    let _a = Client::join(&room, "a").await;
    let mut b = Client::join(&room, "b").await;
    b.drain();

    assert_eq!(
        room.dispatch(b.id, ClientMessage::StartGame).await,
        Err(RoomError::NotOwner(b.id))
    );
    assert_eq!(
        room.dispatch(b.id, ClientMessage::Draw(serde_json::json!({"x": 1})))
            .await,
        Err(RoomError::WrongPhase(Phase::Idle))
    );
    assert_eq!(say(&room, &b, "").await, Err(RoomError::EmptyMessage));
    assert!(b.drain().is_empty());
}
