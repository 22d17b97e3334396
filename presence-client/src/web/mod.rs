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
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Browser implementations of the client's seams.
//!
//! The page is expected to load the Firebase compat SDK (`firebase.auth()`,
//! `firebase.firestore()`) and FirebaseUI before the wasm module starts.

mod canvas;
mod firebase;
mod firestore;
mod identity;
mod media;
mod notification;
mod ready;
mod recorder;

pub use canvas::CanvasFrameGrabber;
pub use firestore::FirestoreRosterStore;
pub use identity::FirebaseIdentity;
pub use media::{attach_to_video, click_for_stream, get_user_media};
pub use notification::BrowserNotifications;
pub use ready::await_ready;
pub use recorder::{BlobClipSink, BrowserRecorder};
