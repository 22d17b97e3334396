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

//! [`RosterStore`] backed by a Firestore collection.
//!
//! Each user owns one document named after their uid, with the fields `name`, `grade`, `ts`
//! (server timestamp), `image` (Firestore Blob) and `image_mime`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::future::LocalBoxFuture;
use futures::stream::{LocalBoxStream, Stream};
use futures::{FutureExt, StreamExt};
use js_sys::{Function, Object, Reflect, Uint8Array};
use log::{debug, error, info, warn};
use presence_types::{
    ChangeBatch, ChangeKind, ImageSnapshot, RecordChange, Registration, UserRecord,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::firebase::{
    blob_from_uint8_array, firestore, server_timestamp, CollectionReference, DocumentChange,
    DocumentSnapshot, FirestoreBlob, QuerySnapshot, Timestamp,
};
use crate::config::DEFAULT_SNAPSHOT_MIME;
use crate::error::{PresenceError, Result};
use crate::roster::RosterStore;

#[derive(Deserialize)]
struct StoredFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    grade: String,
    #[serde(default)]
    image_mime: Option<String>,
}

pub struct FirestoreRosterStore {
    collection: CollectionReference,
}

impl FirestoreRosterStore {
    pub fn new(collection: &str) -> Self {
        info!("Using roster collection {collection}");
        Self {
            collection: firestore().collection(collection),
        }
    }

    /// Wraps an existing collection reference, or any object with the same
    /// `doc` / `onSnapshot` shape.
    pub fn from_collection(collection: JsValue) -> Self {
        Self {
            collection: collection.unchecked_into(),
        }
    }

    async fn write(&self, id: &str, fields: Object, create: bool) -> Result<()> {
        let doc = self.collection.doc(id);
        let promise = if create {
            doc.set(&fields)
        } else {
            doc.update(&fields)
        };
        JsFuture::from(promise)
            .await
            .map_err(|e| PresenceError::Store(PresenceError::from(e).to_string()))?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<UserRecord>> {
        let snapshot: DocumentSnapshot = JsFuture::from(self.collection.doc(id).get())
            .await
            .map_err(|e| PresenceError::Store(PresenceError::from(e).to_string()))?
            .unchecked_into();
        if !snapshot.exists() {
            return Ok(None);
        }
        record_from_snapshot(&snapshot).map(Some)
    }
}

fn set_field(object: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(object, &JsValue::from_str(key), value)?;
    Ok(())
}

fn timestamp_fields() -> Result<Object> {
    let fields = Object::new();
    set_field(&fields, "ts", &server_timestamp())?;
    Ok(fields)
}

fn present(value: JsValue) -> Option<JsValue> {
    if value.is_null() || value.is_undefined() {
        None
    } else {
        Some(value)
    }
}

fn record_from_snapshot(snapshot: &DocumentSnapshot) -> Result<UserRecord> {
    let data = snapshot.data();
    let fields: StoredFields = serde_wasm_bindgen::from_value(data.clone())
        .map_err(|e| PresenceError::Store(format!("Malformed record {}: {e}", snapshot.id())))?;

    // Pending server timestamps read back as null in local snapshots.
    let timestamp = Reflect::get(&data, &"ts".into())
        .ok()
        .and_then(present)
        .map(|ts| ts.unchecked_into::<Timestamp>().to_millis());

    let image = Reflect::get(&data, &"image".into())
        .ok()
        .and_then(present)
        .map(|blob| {
            let bytes = blob.unchecked_into::<FirestoreBlob>().to_uint8_array().to_vec();
            let mime = fields
                .image_mime
                .clone()
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_MIME.to_string());
            ImageSnapshot::new(bytes, mime)
        });

    Ok(UserRecord {
        id: snapshot.id(),
        name: fields.name,
        grade: fields.grade,
        timestamp,
        image,
    })
}

fn batch_from_snapshot(snapshot: &QuerySnapshot, initial: bool) -> ChangeBatch {
    let mut changes = Vec::new();
    for change in snapshot.doc_changes().iter() {
        let change: DocumentChange = change.unchecked_into();
        let kind = match change.kind().parse::<ChangeKind>() {
            Ok(kind) => kind,
            Err(e) => {
                error!("{e}");
                continue;
            }
        };
        match record_from_snapshot(&change.doc()) {
            Ok(record) => changes.push(RecordChange { kind, record }),
            Err(e) => warn!("Skipping {kind} change: {e}"),
        }
    }
    ChangeBatch { initial, changes }
}

impl RosterStore for FirestoreRosterStore {
    fn fetch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<Option<UserRecord>>> {
        self.fetch(id).boxed_local()
    }

    fn create_self<'a>(
        &'a self,
        id: &'a str,
        registration: &'a Registration,
    ) -> LocalBoxFuture<'a, Result<()>> {
        async move {
            let fields = timestamp_fields()?;
            set_field(&fields, "name", &JsValue::from_str(&registration.name))?;
            set_field(&fields, "grade", &JsValue::from_str(&registration.grade))?;
            self.write(id, fields, true).await
        }
        .boxed_local()
    }

    fn touch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<()>> {
        async move { self.write(id, timestamp_fields()?, false).await }.boxed_local()
    }

    fn update_image<'a>(
        &'a self,
        id: &'a str,
        image: &'a ImageSnapshot,
    ) -> LocalBoxFuture<'a, Result<()>> {
        async move {
            let fields = timestamp_fields()?;
            let bytes = Uint8Array::from(image.bytes.as_slice());
            set_field(&fields, "image", &blob_from_uint8_array(&bytes))?;
            set_field(&fields, "image_mime", &JsValue::from_str(&image.mime))?;
            self.write(id, fields, false).await
        }
        .boxed_local()
    }

    fn subscribe(&self) -> LocalBoxStream<'static, ChangeBatch> {
        Subscription {
            collection: self.collection.clone(),
            active: None,
        }
        .boxed_local()
    }
}

struct ActiveSubscription {
    batches: UnboundedReceiver<ChangeBatch>,
    unsubscribe: Function,
    _observer: Closure<dyn FnMut(QuerySnapshot)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

/// Registers the Firestore listener on first poll and removes it on drop.
struct Subscription {
    collection: CollectionReference,
    active: Option<ActiveSubscription>,
}

impl Subscription {
    fn listen(&self) -> ActiveSubscription {
        let (tx, rx) = unbounded();
        let error_tx = tx.clone();
        let mut initial = true;
        let observer = Closure::<dyn FnMut(QuerySnapshot)>::new(move |snapshot: QuerySnapshot| {
            let batch = batch_from_snapshot(&snapshot, std::mem::replace(&mut initial, false));
            if tx.unbounded_send(batch).is_err() {
                debug!("Roster snapshot arrived after the subscription was dropped");
            }
        });
        // Firestore stops a refused listener for good, so the stream ends with it.
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |e: JsValue| {
            warn!("Roster subscription refused: {}", PresenceError::from(e));
            error_tx.close_channel();
        });
        let unsubscribe = self.collection.on_snapshot(
            observer.as_ref().unchecked_ref(),
            on_error.as_ref().unchecked_ref(),
        );
        ActiveSubscription {
            batches: rx,
            unsubscribe,
            _observer: observer,
            _on_error: on_error,
        }
    }
}

impl Stream for Subscription {
    type Item = ChangeBatch;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ChangeBatch>> {
        if self.active.is_none() {
            let active = self.listen();
            self.active = Some(active);
        }
        match self.active.as_mut() {
            Some(active) => active.batches.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = active.unsubscribe.call0(&JsValue::NULL) {
                warn!("Failed to unsubscribe from roster: {e:?}");
            }
        }
    }
}
