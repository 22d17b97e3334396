/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Integration tests for the presence controller against the in-memory roster store.

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::mpsc;
use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};
use presence_client::{
    ChangeBatch, Identity, ImageSnapshot, MemoryRosterStore, Notifier, Opacity,
    PresenceController, PresenceView, RecordChange, RosterStore, SessionContext, UserRecord,
    Visit,
};

#[derive(Clone, Debug, PartialEq)]
enum ViewCall {
    Upsert(String, String),
    Thumbnail(String, usize),
    Opacity(String, Opacity),
    MarkSelf(String),
}

#[derive(Default)]
struct RecordingView {
    calls: RefCell<Vec<ViewCall>>,
}

impl RecordingView {
    fn take(&self) -> Vec<ViewCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

impl PresenceView for RecordingView {
    fn upsert_node(&self, id: &str, label: &str) {
        self.calls
            .borrow_mut()
            .push(ViewCall::Upsert(id.into(), label.into()));
    }

    fn show_thumbnail(&self, id: &str, image: &ImageSnapshot) {
        self.calls
            .borrow_mut()
            .push(ViewCall::Thumbnail(id.into(), image.bytes.len()));
    }

    fn set_opacity(&self, id: &str, opacity: Opacity) {
        self.calls
            .borrow_mut()
            .push(ViewCall::Opacity(id.into(), opacity));
    }

    fn mark_self(&self, id: &str) {
        self.calls.borrow_mut().push(ViewCall::MarkSelf(id.into()));
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(&'a self, message: &'a str) -> LocalBoxFuture<'a, ()> {
        self.messages.borrow_mut().push(message.to_string());
        futures::future::ready(()).boxed_local()
    }
}

fn session(my_user_id: &str, store: MemoryRosterStore) -> SessionContext<MemoryRosterStore> {
    SessionContext::new(
        Identity {
            uid: my_user_id.to_string(),
            display_name: None,
        },
        Visit::Returning,
        Rc::new(store),
    )
}

fn controller(my_user_id: &str) -> PresenceController<RecordingView, RecordingNotifier> {
    PresenceController::new(
        &session(my_user_id, MemoryRosterStore::new()),
        RecordingView::default(),
        RecordingNotifier::default(),
    )
}

#[test]
fn initial_batch_creates_self_node_without_notifying() {
    let presence = controller("u1");

    let messages = presence.apply_batch(ChangeBatch::initial(vec![RecordChange::added(
        UserRecord::new("u1", "Ana", "2"),
    )]));

    assert!(messages.is_empty());
    assert_eq!(
        presence.view().take(),
        vec![
            ViewCall::Upsert("u1".into(), "Ana (2)".into()),
            ViewCall::Opacity("u1".into(), Opacity::FULL),
            ViewCall::MarkSelf("u1".into()),
        ]
    );
    assert!(presence.roster().node("u1").unwrap().is_self);
}

#[test]
fn later_batches_notify_once_per_added_or_modified_record() {
    let presence = controller("u1");
    presence.apply_batch(ChangeBatch::initial(vec![RecordChange::added(
        UserRecord::new("u1", "Ana", "2"),
    )]));
    presence.view().take();

    let messages = presence.apply_batch(ChangeBatch::update(vec![RecordChange::added(
        UserRecord::new("u2", "Leo", "K"),
    )]));

    assert_eq!(messages, vec!["Leo (K) wants to chat.".to_string()]);
    assert_eq!(presence.roster().node("u2").unwrap().opacity, Opacity::FULL);
    assert!(!presence.roster().node("u2").unwrap().is_self);

    let messages = presence.apply_batch(ChangeBatch::update(vec![
        RecordChange::modified(UserRecord::new("u2", "Leo", "K")),
        RecordChange::removed(UserRecord::new("u3", "Max", "4")),
        RecordChange::added(UserRecord::new("u4", "Zoe", "5")),
    ]));
    assert_eq!(
        messages,
        vec![
            "Leo (K) wants to chat.".to_string(),
            "Zoe (5) wants to chat.".to_string(),
        ]
    );
    // Removals are display-only: no node is created for u3.
    assert!(presence.roster().node("u3").is_none());
}

#[test]
fn missing_own_record_in_initial_batch_is_not_fatal() {
    let presence = controller("me");
    let messages = presence.apply_batch(ChangeBatch::initial(vec![RecordChange::added(
        UserRecord::new("u2", "Leo", "K"),
    )]));
    assert!(messages.is_empty());
    assert!(!presence
        .view()
        .take()
        .iter()
        .any(|c| matches!(c, ViewCall::MarkSelf(_))));
}

#[test]
fn thumbnails_are_shown_when_a_record_carries_an_image() {
    let presence = controller("u1");
    let record =
        UserRecord::new("u2", "Leo", "K").with_image(ImageSnapshot::new(vec![7; 64], "image/webp"));
    presence.apply_batch(ChangeBatch::update(vec![RecordChange::modified(record)]));
    assert!(presence
        .view()
        .take()
        .contains(&ViewCall::Thumbnail("u2".into(), 64)));
}

#[test]
fn decay_fades_nodes_and_sightings_restore_them() {
    let presence = controller("u1");
    presence.apply_batch(ChangeBatch::initial(vec![
        RecordChange::added(UserRecord::new("u1", "Ana", "2")),
        RecordChange::added(UserRecord::new("u2", "Leo", "K")),
    ]));
    presence.view().take();

    for _ in 0..4 {
        presence.decay_tick();
    }
    assert_eq!(
        presence.roster().node("u2").unwrap().opacity,
        Opacity::from_tenths(6)
    );
    let calls = presence.view().take();
    assert_eq!(calls.len(), 8);
    assert_eq!(
        calls.last(),
        Some(&ViewCall::Opacity("u2".into(), Opacity::from_tenths(6)))
    );

    presence.apply_batch(ChangeBatch::update(vec![RecordChange::modified(
        UserRecord::new("u2", "Leo", "K"),
    )]));
    assert_eq!(presence.roster().node("u2").unwrap().opacity, Opacity::FULL);
    assert_eq!(
        presence.roster().node("u1").unwrap().opacity,
        Opacity::from_tenths(6)
    );
}

#[test]
fn decay_clamps_at_transparent() {
    let presence = controller("u1");
    presence.apply_batch(ChangeBatch::initial(vec![RecordChange::added(
        UserRecord::new("u1", "Ana", "2"),
    )]));
    for _ in 0..25 {
        presence.decay_tick();
    }
    let node = presence.roster().node("u1").unwrap().clone();
    assert_eq!(node.opacity, Opacity::TRANSPARENT);
    assert_eq!(presence.roster().len(), 1);
}

#[tokio::test]
async fn run_follows_the_store_subscription() {
    let store = MemoryRosterStore::new();
    store.upsert(UserRecord::new("u1", "Ana", "2"));
    let session = session("u1", store.clone());
    let presence = PresenceController::new(
        &session,
        RecordingView::default(),
        RecordingNotifier::default(),
    );

    // Take the initial batch plus two updates, then stop.
    let batches = session.store().subscribe().take(3);
    store.upsert(UserRecord::new("u2", "Leo", "K"));
    store.upsert_all(vec![
        UserRecord::new("u3", "Max", "4"),
        UserRecord::new("u2", "Leo", "1"),
    ]);

    presence.clone().run(batches).await;

    assert_eq!(
        *presence.notifier().messages.borrow(),
        vec![
            "Leo (K) wants to chat.".to_string(),
            "Max (4) wants to chat.".to_string(),
            "Leo (1) wants to chat.".to_string(),
        ]
    );
    assert_eq!(presence.roster().len(), 3);
    assert_eq!(presence.roster().node("u2").unwrap().label, "Leo (1)");
    assert!(presence.roster().node("u1").unwrap().is_self);
}

#[tokio::test]
async fn run_decay_ticks_once_per_item() {
    let presence = controller("u1");
    presence.apply_batch(ChangeBatch::initial(vec![RecordChange::added(
        UserRecord::new("u1", "Ana", "2"),
    )]));

    let (mut tx, rx) = mpsc::channel::<()>(8);
    for _ in 0..3 {
        tx.try_send(()).unwrap();
    }
    drop(tx);
    presence.clone().run_decay(rx).await;

    assert_eq!(
        presence.roster().node("u1").unwrap().opacity,
        Opacity::from_tenths(7)
    );
}

#[tokio::test]
async fn decay_and_subscription_interleave_on_one_executor() {
    let store = MemoryRosterStore::new();
    store.upsert(UserRecord::new("u1", "Ana", "2"));
    let session = session("u1", store.clone());
    let presence = PresenceController::new(
        &session,
        RecordingView::default(),
        RecordingNotifier::default(),
    );

    let (mut ticks_tx, ticks_rx) = mpsc::unbounded::<()>();
    let batches = session.store().subscribe().take(2);
    let changes = presence.clone().run(batches);
    let decay = presence.clone().run_decay(ticks_rx);

    ticks_tx.unbounded_send(()).unwrap();
    ticks_tx.unbounded_send(()).unwrap();
    ticks_tx.close_channel();
    store.upsert(UserRecord::new("u2", "Leo", "K"));

    futures::join!(changes, decay);

    let roster = presence.roster();
    assert_eq!(roster.len(), 2);
    assert!(roster.node("u1").unwrap().opacity < Opacity::FULL);
}

/// A notifier whose permission prompt is never answered.
#[derive(Default)]
struct UnansweredPrompt {
    asked: RefCell<Vec<String>>,
}

impl Notifier for UnansweredPrompt {
    fn notify<'a>(&'a self, message: &'a str) -> LocalBoxFuture<'a, ()> {
        self.asked.borrow_mut().push(message.to_string());
        futures::future::pending().boxed_local()
    }
}

#[tokio::test(start_paused = true)]
async fn pending_notifications_do_not_hold_back_later_batches() {
    let store = MemoryRosterStore::new();
    store.upsert(UserRecord::new("u1", "Ana", "2"));
    let session = session("u1", store.clone());
    let presence = PresenceController::new(
        &session,
        RecordingView::default(),
        UnansweredPrompt::default(),
    );

    let batches = session.store().subscribe();
    store.upsert(UserRecord::new("u2", "Leo", "K"));
    store.upsert(UserRecord::new("u3", "Max", "4"));
    store.upsert(UserRecord::new("u4", "Zoe", "5"));

    let run = presence.clone().run(batches);
    let outcome = tokio::time::timeout(std::time::Duration::from_millis(200), run).await;
    assert!(outcome.is_err(), "the subscription never ends");

    assert_eq!(presence.roster().len(), 4);
    assert!(presence.roster().node("u4").is_some());
    // Only the first prompt has been raised; the rest wait their turn, in order.
    assert_eq!(
        *presence.notifier().asked.borrow(),
        vec!["Leo (K) wants to chat.".to_string()]
    );
}
