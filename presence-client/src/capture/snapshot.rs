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

use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use futures::{FutureExt, StreamExt};
use log::{debug, warn};
use presence_types::ImageSnapshot;

use super::{CaptureMode, CaptureStrategy};
use crate::error::Result;
use crate::roster::RosterStore;
use crate::session::SessionContext;

/// Encodes the current video frame.
pub trait FrameGrabber {
    fn grab(&self) -> LocalBoxFuture<'_, Result<ImageSnapshot>>;
}

/// Uploads a frame to the user's roster record on every tick.
///
/// A failed capture or upload is logged and the next tick tries again.
pub struct SnapshotStrategy<S, G> {
    session: SessionContext<S>,
    grabber: G,
    ticks: RefCell<Option<LocalBoxStream<'static, ()>>>,
}

impl<S: RosterStore, G: FrameGrabber> SnapshotStrategy<S, G> {
    pub fn new(session: SessionContext<S>, grabber: G, ticks: LocalBoxStream<'static, ()>) -> Self {
        Self {
            session,
            grabber,
            ticks: RefCell::new(Some(ticks)),
        }
    }

    /// Grabs one frame and overwrites the record's image with it.
    pub async fn capture_once(&self) -> Result<()> {
        let image = self.grabber.grab().await?;
        debug!(
            "Snapshot of {} is {:.1}kb",
            self.session.my_user_id(),
            image.size_kb()
        );
        self.session
            .store()
            .update_image(self.session.my_user_id(), &image)
            .await
    }

    async fn run_ticks(&self) {
        let Some(mut ticks) = self.ticks.borrow_mut().take() else {
            warn!("Snapshot loop is already running");
            return;
        };
        while ticks.next().await.is_some() {
            if let Err(e) = self.capture_once().await {
                warn!("Snapshot failed: {e}");
            }
        }
    }
}

impl<S: RosterStore, G: FrameGrabber> CaptureStrategy for SnapshotStrategy<S, G> {
    fn mode(&self) -> CaptureMode {
        CaptureMode::Snapshot
    }

    fn run(&self) -> LocalBoxFuture<'_, ()> {
        self.run_ticks().boxed_local()
    }
}
