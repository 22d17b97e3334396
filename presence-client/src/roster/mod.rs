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

//! Access to the shared roster of user records.

mod memory;

pub use memory::MemoryRosterStore;

use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use presence_types::{ChangeBatch, ImageSnapshot, Registration, UserRecord};

use crate::error::Result;

/// A realtime document store holding one [`UserRecord`] per user id.
///
/// Every write stamps a server-assigned timestamp. Callers treat writes as fire-and-forget unless
/// they explicitly await them.
pub trait RosterStore {
    /// Returns the user's record, or `None` on their first visit.
    fn fetch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<Option<UserRecord>>>;

    /// Writes a brand-new record from the registration dialog.
    fn create_self<'a>(
        &'a self,
        id: &'a str,
        registration: &'a Registration,
    ) -> LocalBoxFuture<'a, Result<()>>;

    /// Refreshes only the timestamp of an existing record.
    fn touch_self<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<()>>;

    /// Overwrites the record's image and refreshes its timestamp.
    fn update_image<'a>(
        &'a self,
        id: &'a str,
        image: &'a ImageSnapshot,
    ) -> LocalBoxFuture<'a, Result<()>>;

    /// Subscribes to every change in the roster.
    ///
    /// The stream is lazy and infinite. Its first item is an `initial` batch listing every
    /// existing record as added; later items carry changes in the store's order. Dropping the
    /// stream cancels the subscription, and calling `subscribe` again starts a fresh one.
    fn subscribe(&self) -> LocalBoxStream<'static, ChangeBatch>;
}
