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

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::future::{self, LocalBoxFuture};
use futures::stream::LocalBoxStream;
use futures::{FutureExt, StreamExt};
use log::debug;
use presence_types::{ChangeBatch, ImageSnapshot, RecordChange, Registration, UserRecord};
use web_time::{SystemTime, UNIX_EPOCH};

use super::RosterStore;
use crate::error::{PresenceError, Result};

/// An in-process [`RosterStore`].
///
/// Records keep their insertion order, timestamps are strictly increasing, and every write is
/// published to live subscribers as a single-change batch. Clones share the same roster, so one
/// clone can play "another client" while the other is used by the session.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: Vec<UserRecord>,
    subscribers: Vec<UnboundedSender<ChangeBatch>>,
    last_timestamp: f64,
}

impl Inner {
    fn stamp(&mut self) -> f64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or_default();
        self.last_timestamp = if now > self.last_timestamp {
            now
        } else {
            self.last_timestamp + 1.0
        };
        self.last_timestamp
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn write(&mut self, mut record: UserRecord) -> RecordChange {
        record.timestamp = Some(self.stamp());
        match self.position(&record.id) {
            Some(i) => {
                self.records[i] = record.clone();
                RecordChange::modified(record)
            }
            None => {
                self.records.push(record.clone());
                RecordChange::added(record)
            }
        }
    }

    fn modify<F>(&mut self, id: &str, f: F) -> Result<RecordChange>
    where
        F: FnOnce(&mut UserRecord),
    {
        let i = self
            .position(id)
            .ok_or_else(|| PresenceError::MissingRecord(id.to_string()))?;
        let ts = self.stamp();
        let record = &mut self.records[i];
        f(record);
        record.timestamp = Some(ts);
        Ok(RecordChange::modified(record.clone()))
    }

    fn publish(&mut self, changes: Vec<RecordChange>) {
        if changes.is_empty() {
            return;
        }
        let batch = ChangeBatch::update(changes);
        let before = self.subscribers.len();
        self.subscribers
            .retain(|tx| tx.unbounded_send(batch.clone()).is_ok());
        if self.subscribers.len() != before {
            debug!(
                "Dropped {} closed roster subscription(s)",
                before - self.subscribers.len()
            );
        }
    }
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current copy of a record.
    pub fn get(&self, id: &str) -> Option<UserRecord> {
        let inner = self.inner.borrow();
        inner.position(id).map(|i| inner.records[i].clone())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().records.is_empty()
    }

    /// Number of subscriptions that have not been dropped yet, as of the last write.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Writes a whole record, the way another client would. Returns the stamped copy.
    pub fn upsert(&self, record: UserRecord) -> UserRecord {
        self.upsert_all(vec![record]).remove(0)
    }

    /// Writes several records and publishes them as one batch, in order.
    pub fn upsert_all(&self, records: Vec<UserRecord>) -> Vec<UserRecord> {
        let mut inner = self.inner.borrow_mut();
        let changes: Vec<RecordChange> = records.into_iter().map(|r| inner.write(r)).collect();
        let stamped = changes.iter().map(|c| c.record.clone()).collect();
        inner.publish(changes);
        stamped
    }

    /// Deletes a record, the way an external admin tool would.
    pub fn remove(&self, id: &str) -> Option<UserRecord> {
        let mut inner = self.inner.borrow_mut();
        let i = inner.position(id)?;
        let record = inner.records.remove(i);
        inner.publish(vec![RecordChange::removed(record.clone())]);
        Some(record)
    }

    fn apply_modify<F>(&self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut inner = self.inner.borrow_mut();
        let change = inner.modify(id, f)?;
        inner.publish(vec![change]);
        Ok(())
    }
}

impl RosterStore for MemoryRosterStore {
    fn fetch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<Option<UserRecord>>> {
        future::ready(Ok(self.get(id))).boxed_local()
    }

    fn create_self<'a>(
        &'a self,
        id: &'a str,
        registration: &'a Registration,
    ) -> LocalBoxFuture<'a, Result<()>> {
        self.upsert(registration.clone().into_record(id));
        future::ready(Ok(())).boxed_local()
    }

    fn touch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<()>> {
        future::ready(self.apply_modify(id, |_| {})).boxed_local()
    }

    fn update_image<'a>(
        &'a self,
        id: &'a str,
        image: &'a ImageSnapshot,
    ) -> LocalBoxFuture<'a, Result<()>> {
        let result = self.apply_modify(id, |record| record.image = Some(image.clone()));
        future::ready(result).boxed_local()
    }

    fn subscribe(&self) -> LocalBoxStream<'static, ChangeBatch> {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.borrow_mut();
        let snapshot = inner
            .records
            .iter()
            .cloned()
            .map(RecordChange::added)
            .collect();
        // The receiver is still alive here, so this send cannot fail.
        let _ = tx.unbounded_send(ChangeBatch::initial(snapshot));
        inner.subscribers.push(tx);
        rx.boxed_local()
    }
}
