use std::sync::Arc;

use sofia_core::constants::ERROR_REPLY;
use sofia_core::profile::{Engagement, welcome_message};
use sofia_core::{Clock as _, DayKey, ManualClock, Message, Role, UserProfile};
use sofia_storage::{KeyValueStore, MemoryStore, transcripts};

use super::{FailingHandler, GatedHandler, ReadOnlyStore, ScriptedProvider, at, clock_at};
use crate::chat_session::ChatSession;
use crate::delay::NoDelay;
use crate::turn_service::{TurnHandler, TurnService};

const USER: &str = "user-1";

fn turns(provider: ScriptedProvider, clock: &Arc<ManualClock>) -> Arc<TurnService> {
    Arc::new(
        TurnService::new(Arc::new(provider))
            .with_delay(Arc::new(NoDelay))
            .with_clock(clock.clone()),
    )
}

fn session(
    store: &Arc<MemoryStore>,
    handler: Arc<dyn TurnHandler>,
    clock: &Arc<ManualClock>,
) -> ChatSession {
    ChatSession::new(store.clone(), handler, clock.clone())
}

fn contents(messages: &[Message]) -> Vec<(Role, String)> {
    messages.iter().map(|m| (m.role, m.content.clone())).collect()
}

#[tokio::test]
async fn test_send_then_reload_preserves_order() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::text("Entendo."), &clock), &clock);

    assert!(chat.load(USER).await.is_empty());
    let reply = chat.send("Estou muito ansioso hoje", USER).await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "Entendo.");
    assert!(!chat.is_loading());

    let reopened = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    let loaded = reopened.load(USER).await;
    assert_eq!(
        contents(&loaded),
        vec![
            (Role::User, "Estou muito ansioso hoje".to_owned()),
            (Role::Assistant, "Entendo.".to_owned()),
        ]
    );
    assert_eq!(loaded, chat.messages());
}

#[tokio::test]
async fn test_day_rollover_starts_fresh_transcript() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 23, 59, 30));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    chat.load(USER).await;

    chat.send("antes da meia-noite", USER).await.unwrap();
    assert_eq!(chat.day_key().as_str(), "2024-05-01");

    clock.advance(chrono::Duration::minutes(1));
    chat.send("depois da meia-noite", USER).await.unwrap();

    assert_eq!(chat.day_key().as_str(), "2024-05-02");
    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "depois da meia-noite");

    let days = transcripts::list_days(store.as_ref(), USER).await.unwrap();
    assert_eq!(days.len(), 2);
    let first_day: DayKey = "2024-05-01".parse().unwrap();
    let old = transcripts::load_messages(store.as_ref(), USER, &first_day).await.unwrap();
    assert_eq!(old[0].content, "antes da meia-noite");
}

#[tokio::test]
async fn test_load_after_midnight_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 22, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    chat.send("boa noite", USER).await.unwrap();

    clock.set(at(2024, 5, 2, 8, 0, 0));
    assert!(chat.load(USER).await.is_empty());
    assert!(chat.messages().is_empty());
    assert_eq!(chat.day_key().as_str(), "2024-05-02");
}

#[tokio::test]
async fn test_failed_turn_records_error_reply() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, Arc::new(FailingHandler), &clock);

    let reply = chat.send("oi", USER).await.unwrap();
    assert_eq!(reply.content, ERROR_REPLY);
    assert!(!chat.is_loading());

    let stored = transcripts::load_messages(store.as_ref(), USER, &clock.day_key()).await.unwrap();
    assert_eq!(
        contents(&stored),
        vec![(Role::User, "oi".to_owned()), (Role::Assistant, ERROR_REPLY.to_owned())]
    );
}

#[tokio::test]
async fn test_loading_flag_spans_the_turn() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let handler = Arc::new(GatedHandler::default());
    let chat = Arc::new(session(&store, handler.clone(), &clock));

    let task = {
        let chat = chat.clone();
        tokio::spawn(async move { chat.send("oi", USER).await })
    };

    handler.entered.notified().await;
    assert!(chat.is_loading());
    let stored = transcripts::load_records(store.as_ref(), USER, &clock.day_key()).await.unwrap();
    assert_eq!(stored.len(), 1, "user message is persisted before the reply");
    assert_eq!(chat.messages().len(), 1);

    handler.release.notify_one();
    let reply = task.await.unwrap().unwrap();
    assert_eq!(reply.content, "re: oi");
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn test_concurrent_sends_are_serialized() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);

    let (a, b) = tokio::join!(chat.send("um", USER), chat.send("dois", USER));
    a.unwrap();
    b.unwrap();

    let stored = transcripts::load_messages(store.as_ref(), USER, &clock.day_key()).await.unwrap();
    assert_eq!(stored.len(), 4);
    let roles: Vec<_> = stored.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(stored, chat.messages());
}

#[tokio::test]
async fn test_corrupt_transcript_loads_empty_and_is_replaced() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let key = sofia_storage::keys::transcript_key(USER, &clock.day_key());
    store.set(&key, "{not json").await.unwrap();

    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    assert!(chat.load(USER).await.is_empty());

    chat.send("oi", USER).await.unwrap();
    let stored = transcripts::load_messages(store.as_ref(), USER, &clock.day_key()).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_clear_only_touches_memory() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    chat.send("oi", USER).await.unwrap();

    chat.clear();
    assert!(chat.messages().is_empty());
    assert_eq!(chat.load(USER).await.len(), 2);
}

#[tokio::test]
async fn test_send_with_typing_delivers_chunks() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::text("Entendo."), &clock), &clock);

    let mut delivered = Vec::new();
    let mut sink = |chunk: &str| -> anyhow::Result<()> {
        delivered.push(chunk.to_owned());
        Ok(())
    };
    chat.send_with_typing("oi", USER, &mut sink).await.unwrap();
    assert_eq!(delivered, vec!["Entendo.".to_owned()]);
}

#[tokio::test]
async fn test_greet_uses_profile_once() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);

    assert!(chat.greet(USER).await.unwrap().is_none(), "no profile, no greeting");

    let profile = UserProfile {
        previous_therapy: Some(false),
        stress_level: Some(8),
        ..UserProfile::default()
    };
    chat.save_profile(USER, &profile).await.unwrap();
    assert_eq!(chat.load_profile(USER).await, Some(profile.clone()));

    let welcome = chat.greet(USER).await.unwrap().unwrap();
    assert_eq!(welcome.content, welcome_message(&profile));
    assert_eq!(chat.messages().len(), 1);
    assert!(chat.greet(USER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_profile_is_absent() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    store.set(&sofia_storage::keys::profile_key(USER), "[1, 2").await.unwrap();

    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);
    assert_eq!(chat.load_profile(USER).await, None);
    assert!(chat.greet(USER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_check_in_after_silence() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let chat = session(&store, turns(ScriptedProvider::default(), &clock), &clock);

    assert!(chat.check_in(USER, Engagement::High).await.unwrap().is_none(), "empty transcript");
    chat.send("oi", USER).await.unwrap();
    assert!(chat.check_in(USER, Engagement::High).await.unwrap().is_none(), "not idle yet");

    clock.advance(chrono::Duration::minutes(4));
    let nudge = chat.check_in(USER, Engagement::High).await.unwrap().unwrap();
    assert_eq!(nudge.role, Role::Assistant);
    assert_eq!(chat.messages().len(), 3);
}

#[tokio::test]
async fn test_failed_persist_keeps_memory_in_step_with_storage() {
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let provider_turns = turns(ScriptedProvider::text("Entendo."), &clock);
    let chat = ChatSession::new(Arc::new(ReadOnlyStore), provider_turns.clone(), clock.clone());

    let err = chat.send("Olá", USER).await.unwrap_err();
    assert!(err.to_string().contains("read-only"), "{err}");
    assert!(chat.messages().is_empty());
    assert!(!chat.is_loading());
    assert!(provider_turns.history().is_empty());
}

#[tokio::test]
async fn test_clear_drops_turn_history() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 10, 0, 0));
    let provider_turns = turns(ScriptedProvider::text("Entendo."), &clock);
    let chat = session(&store, provider_turns.clone(), &clock);

    chat.send("Olá", USER).await.unwrap();
    assert_eq!(provider_turns.history().len(), 2);

    chat.clear();
    assert!(chat.messages().is_empty());
    assert!(provider_turns.history().is_empty());
}

#[tokio::test]
async fn test_day_rollover_drops_turn_history() {
    let store = Arc::new(MemoryStore::new());
    let clock = clock_at(at(2024, 5, 1, 23, 59, 0));
    let provider_turns =
        turns(ScriptedProvider::new(vec![Ok("Boa noite.".to_owned()), Ok("Bom dia.".to_owned())]), &clock);
    let chat = session(&store, provider_turns.clone(), &clock);

    chat.send("Ainda acordado", USER).await.unwrap();
    clock.advance(chrono::Duration::minutes(2));
    chat.send("Acordei", USER).await.unwrap();

    let history = contents(&provider_turns.history());
    assert_eq!(
        history,
        vec![(Role::User, "Acordei".to_owned()), (Role::Assistant, "Bom dia.".to_owned())]
    );
    assert_eq!(contents(&chat.messages()), history);
    assert_eq!(chat.day_key().as_str(), "2024-05-02");
}
