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

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use presence_types::{ChangeBatch, ChangeKind};

use super::roster::{PresenceRoster, Sighting};
use super::{Opacity, PresenceView};
use crate::notify::Notifier;
use crate::session::SessionContext;

/// Keeps a [`PresenceView`] in sync with the roster store and fades idle users out.
///
/// Two loops drive it: [`run`](Self::run) consumes change batches from a subscription and
/// [`run_decay`](Self::run_decay) consumes timer ticks. Both may be spawned on the same
/// single-threaded executor; they share the roster through a `RefCell` and never hold a borrow
/// across an await point.
pub struct PresenceController<V, N> {
    roster: Rc<RefCell<PresenceRoster>>,
    view: Rc<V>,
    notifier: Rc<N>,
}

impl<V, N> Clone for PresenceController<V, N> {
    fn clone(&self) -> Self {
        Self {
            roster: Rc::clone(&self.roster),
            view: Rc::clone(&self.view),
            notifier: Rc::clone(&self.notifier),
        }
    }
}

impl<V: PresenceView, N: Notifier> PresenceController<V, N> {
    pub fn new<S>(session: &SessionContext<S>, view: V, notifier: N) -> Self {
        Self {
            roster: Rc::new(RefCell::new(PresenceRoster::new(session.my_user_id()))),
            view: Rc::new(view),
            notifier: Rc::new(notifier),
        }
    }

    pub fn roster(&self) -> Ref<'_, PresenceRoster> {
        self.roster.borrow()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Consumes change batches until the subscription ends.
    ///
    /// Notifications are queued and shown in order by a second loop, so a pending permission
    /// prompt never holds back roster updates. Completes once the subscription has ended and
    /// every queued notification has been handled.
    pub async fn run<St>(self, batches: St)
    where
        St: Stream<Item = ChangeBatch>,
    {
        let (messages_tx, mut messages_rx) = mpsc::unbounded::<String>();

        let apply = async {
            let mut batches = std::pin::pin!(batches);
            while let Some(batch) = batches.next().await {
                for message in self.apply_batch(batch) {
                    let _ = messages_tx.unbounded_send(message);
                }
            }
            info!("Roster subscription ended");
            messages_tx.close_channel();
        };

        let notify = async {
            while let Some(message) = messages_rx.next().await {
                self.notifier.notify(&message).await;
            }
        };

        futures::join!(apply, notify);
    }

    /// Applies one batch to the roster and the view.
    ///
    /// Returns the notifications the batch calls for: none for the initial batch, otherwise one
    /// per added or modified record, in batch order.
    pub fn apply_batch(&self, batch: ChangeBatch) -> Vec<String> {
        info!(
            "Got a roster batch with {} change(s), initial={}",
            batch.len(),
            batch.initial
        );
        let mut roster = self.roster.borrow_mut();
        let mut messages = Vec::new();

        for change in batch.changes {
            let record = change.record;
            match change.kind {
                ChangeKind::Added | ChangeKind::Modified => {
                    let label = record.label();
                    if roster.sight(&record.id, label.clone()) == Sighting::New {
                        debug!("New presence node {} for {label}", record.id);
                    }
                    self.view.upsert_node(&record.id, &label);
                    if let Some(image) = &record.image {
                        self.view.show_thumbnail(&record.id, image);
                    }
                    self.view.set_opacity(&record.id, Opacity::FULL);
                    if !batch.initial {
                        messages.push(record.chat_request_message());
                    }
                }
                ChangeKind::Removed => {
                    info!("Removed person: {} ({})", record.id, record.label());
                }
            }
        }

        if batch.initial {
            if roster.mark_self() {
                self.view.mark_self(roster.my_user_id());
            } else {
                warn!(
                    "Own record {} missing from the initial roster",
                    roster.my_user_id()
                );
            }
        }

        messages
    }

    /// Fades every node by one step.
    pub fn decay_tick(&self) {
        let faded = self.roster.borrow_mut().decay();
        debug!("Decay tick faded {} node(s)", faded.len());
        for (id, opacity) in faded {
            self.view.set_opacity(&id, opacity);
        }
    }

    /// Runs [`decay_tick`](Self::decay_tick) once per item of `ticks`.
    pub async fn run_decay<T>(self, ticks: T)
    where
        T: Stream<Item = ()>,
    {
        let mut ticks = std::pin::pin!(ticks);
        while ticks.next().await.is_some() {
            self.decay_tick();
        }
    }
}
