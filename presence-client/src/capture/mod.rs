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

//! Camera and microphone capture.
//!
//! Once the user has granted a media stream, exactly one [`CaptureStrategy`] uses it:
//!
//! * [`SnapshotStrategy`] periodically uploads the current video frame to the user's roster
//!   record, so everyone else sees a live-ish thumbnail.
//! * [`PushToTalkStrategy`] records audio/video while the capture button is held and hands the
//!   finished clip to a [`ClipSink`].

mod constraints;
mod push_to_talk;
mod snapshot;

pub use constraints::{AudioConstraints, Ideal, MediaConstraints, VideoConstraints};
pub use push_to_talk::{
    Chunk, Clip, ClipGatherer, ClipSink, LoggingClipSink, PushToTalkStrategy, Recorder,
};
pub use snapshot::{FrameGrabber, SnapshotStrategy};

use futures::future::LocalBoxFuture;
use serde::Deserialize;
use std::fmt;

/// Which [`CaptureStrategy`] the capture button drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    #[default]
    Snapshot,
    PushToTalk,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CaptureMode::Snapshot => write!(f, "snapshot"),
            CaptureMode::PushToTalk => write!(f, "push-to-talk"),
        }
    }
}

/// One way of using the captured media stream.
///
/// The page forwards capture-button presses and releases, and spawns [`run`](Self::run) for the
/// strategy's background work.
pub trait CaptureStrategy {
    fn mode(&self) -> CaptureMode;

    /// Text for the capture button once the strategy is active, if it needs one.
    fn button_label(&self) -> Option<&'static str> {
        None
    }

    fn press(&self) {}

    fn release(&self) {}

    /// Background loop; completes only when its input (timer or recorder) ends.
    fn run(&self) -> LocalBoxFuture<'_, ()>;
}
