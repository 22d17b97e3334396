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
use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use futures::{FutureExt, StreamExt};
use log::{debug, info, warn};
use web_time::Instant;

use super::{CaptureMode, CaptureStrategy};
use crate::error::Result;

/// A piece of recorded media as delivered by the recorder.
pub trait Chunk {
    fn byte_len(&self) -> usize;
}

impl Chunk for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

/// Controls the platform media recorder. Chunks come back through a separate stream.
pub trait Recorder {
    /// Starts recording, asking for a chunk every `timeslice_ms`.
    fn start(&self, timeslice_ms: u32) -> Result<()>;

    /// Stops recording. The recorder delivers one last chunk afterwards.
    fn stop(&self) -> Result<()>;
}

/// Every chunk recorded during one press of the button, in arrival order.
#[derive(Debug)]
pub struct Clip<C> {
    pub chunks: Vec<C>,
    pub held_for: Option<Duration>,
}

impl<C: Chunk> Clip<C> {
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Chunk::byte_len).sum()
    }
}

/// Receives finished clips.
pub trait ClipSink<C> {
    fn deliver(&self, clip: Clip<C>);
}

/// A [`ClipSink`] that reports the clip size and discards it.
///
/// Clips have no upload destination yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingClipSink;

impl<C: Chunk> ClipSink<C> for LoggingClipSink {
    fn deliver(&self, clip: Clip<C>) {
        info!(
            "Final gather of recorded clip: {}kb from {} chunk(s), held for {:?}",
            (clip.byte_len() as f64 / 1024.0).round(),
            clip.chunks.len(),
            clip.held_for.unwrap_or_default()
        );
    }
}

/// Accumulates recorder chunks between a press and the chunk that follows the release.
#[derive(Debug)]
pub struct ClipGatherer<C> {
    chunks: Vec<C>,
    final_gather: bool,
    pressed_at: Option<Instant>,
}

impl<C> Default for ClipGatherer<C> {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            final_gather: false,
            pressed_at: None,
        }
    }
}

impl<C: Chunk> ClipGatherer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_press(&mut self) {
        self.pressed_at = Some(Instant::now());
    }

    /// The next chunk to arrive will close the clip.
    pub fn on_release(&mut self) {
        self.final_gather = true;
    }

    /// Handles one chunk-available event, returning the whole clip if this was the final one.
    ///
    /// Empty chunks are logged and dropped but still close the clip after a release.
    pub fn on_data(&mut self, chunk: C) -> Option<Clip<C>> {
        let len = chunk.byte_len();
        if len > 0 {
            self.chunks.push(chunk);
            debug!("Recorder chunk available: {len} bytes");
        } else {
            warn!("Empty recorder chunk, dropping it");
        }
        if !self.final_gather {
            return None;
        }
        self.final_gather = false;
        Some(Clip {
            chunks: std::mem::take(&mut self.chunks),
            held_for: self.pressed_at.take().map(|t| t.elapsed()),
        })
    }

    pub fn pending_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_final_gather(&self) -> bool {
        self.final_gather
    }
}

/// Records while the capture button is held.
///
/// Pressing starts the recorder with a fixed timeslice; releasing stops it, and the chunk the
/// recorder delivers after stopping closes the clip, which goes to the [`ClipSink`].
pub struct PushToTalkStrategy<R, C, K> {
    recorder: R,
    sink: K,
    timeslice_ms: u32,
    gatherer: RefCell<ClipGatherer<C>>,
    chunks: RefCell<Option<LocalBoxStream<'static, C>>>,
}

impl<R, C, K> PushToTalkStrategy<R, C, K>
where
    R: Recorder,
    C: Chunk,
    K: ClipSink<C>,
{
    pub fn new(recorder: R, chunks: LocalBoxStream<'static, C>, sink: K, timeslice_ms: u32) -> Self {
        Self {
            recorder,
            sink,
            timeslice_ms,
            gatherer: RefCell::new(ClipGatherer::new()),
            chunks: RefCell::new(Some(chunks)),
        }
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn pending_chunks(&self) -> usize {
        self.gatherer.borrow().pending_chunks()
    }

    /// Feeds one chunk through the gatherer, delivering the clip if it is complete.
    pub fn on_data(&self, chunk: C) {
        let clip = self.gatherer.borrow_mut().on_data(chunk);
        if let Some(clip) = clip {
            self.sink.deliver(clip);
        }
    }

    async fn gather(&self) {
        let Some(mut chunks) = self.chunks.borrow_mut().take() else {
            warn!("Push-to-talk gatherer is already running");
            return;
        };
        while let Some(chunk) = chunks.next().await {
            self.on_data(chunk);
        }
        info!("Recorder chunk stream ended");
    }
}

impl<R, C, K> CaptureStrategy for PushToTalkStrategy<R, C, K>
where
    R: Recorder,
    C: Chunk,
    K: ClipSink<C>,
{
    fn mode(&self) -> CaptureMode {
        CaptureMode::PushToTalk
    }

    fn button_label(&self) -> Option<&'static str> {
        Some("Hold to Talk")
    }

    fn press(&self) {
        self.gatherer.borrow_mut().on_press();
        if let Err(e) = self.recorder.start(self.timeslice_ms) {
            warn!("Failed to start recording: {e}");
        }
    }

    fn release(&self) {
        if let Err(e) = self.recorder.stop() {
            warn!("Failed to stop recording: {e}");
        }
        self.gatherer.borrow_mut().on_release();
    }

    fn run(&self) -> LocalBoxFuture<'_, ()> {
        self.gather().boxed_local()
    }
}
