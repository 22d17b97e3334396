//! This crate provides the client-side (browser) logic of the classroom presence roster.  It
//! registers the current user in a shared document store, keeps a live roster of everyone else
//! with fading presence indicators, raises a desktop notification when somebody new shows up, and
//! drives the camera for periodic snapshots or push-to-talk clips.
//!
//! The logic is platform-agnostic and talks to the outside world through a handful of traits:
//!
//! * [`IdentityProvider`] resolves who is signed in.
//! * [`RosterStore`] reads and writes roster records and streams change batches.
//! * [`PresenceView`] renders presence nodes.
//! * [`Notifier`] shows "wants to chat" notifications.
//! * [`CaptureStrategy`] is one way of using the camera (snapshots or push-to-talk).
//!
//! With the `wasm` feature enabled, the [`web`] module provides the browser implementations of
//! these seams (Firebase auth and Firestore, `Notification`, `getUserMedia`, `MediaRecorder`).
//! Without it, [`MemoryRosterStore`] and the traits are enough to run the whole flow natively,
//! which is how the tests exercise it.
//!
//! # Outline of usage
//!
//! ```ignore
//! let session = bootstrap(&identity, &form, store, &config.oauth_client_id).await?;
//!
//! let presence = PresenceController::new(&session, view, notifier);
//! spawn_local(presence.clone().run(session.store().subscribe()));
//! spawn_local(presence.run_decay(IntervalStream::new(config.decay_period_ms).map(|_| ())));
//!
//! let strategy = SnapshotStrategy::new(session.clone(), grabber, ticks);
//! strategy.run().await;
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod notify;
pub mod presence;
pub mod roster;
pub mod session;

#[cfg(feature = "wasm")]
pub mod web;

pub use capture::{
    CaptureMode, CaptureStrategy, Chunk, Clip, ClipGatherer, ClipSink, FrameGrabber,
    LoggingClipSink, MediaConstraints, PushToTalkStrategy, Recorder, SnapshotStrategy,
};
pub use config::PresenceConfig;
pub use error::{PresenceError, Result};
pub use notify::{NotificationBackend, NotificationPermission, Notifier, PermissionGatedNotifier};
pub use presence::{Opacity, PresenceController, PresenceNode, PresenceRoster, PresenceView};
pub use roster::{MemoryRosterStore, RosterStore};
pub use session::{bootstrap, Identity, IdentityProvider, RegistrationForm, SessionContext, Visit};

pub use presence_types::{
    ChangeBatch, ChangeKind, ImageSnapshot, RecordChange, Registration, UserRecord,
};
