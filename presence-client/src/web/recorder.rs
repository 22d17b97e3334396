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

use std::rc::Rc;

use futures::channel::mpsc::unbounded;
use futures::stream::LocalBoxStream;
use futures::StreamExt;
use js_sys::Array;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobEvent, MediaRecorder, MediaStream};

use crate::capture::{Chunk, Clip, ClipSink, Recorder};
use crate::error::Result;

impl Chunk for Blob {
    fn byte_len(&self) -> usize {
        self.size() as usize
    }
}

/// [`Recorder`] over the platform `MediaRecorder`.
///
/// Chunks from `dataavailable` events are forwarded, in order, to the stream returned by
/// [`new`](Self::new).
pub struct BrowserRecorder {
    recorder: MediaRecorder,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl BrowserRecorder {
    pub fn new(stream: &MediaStream) -> Result<(Self, LocalBoxStream<'static, Blob>)> {
        let recorder = MediaRecorder::new_with_media_stream(stream)?;
        let (tx, rx) = unbounded();
        let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
            let chunk = match event.data().map(Ok).unwrap_or_else(Blob::new) {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Unreadable recorder chunk: {e:?}");
                    return;
                }
            };
            let _ = tx.unbounded_send(chunk);
        });
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        info!(
            "Recorder: {} {:?}",
            recorder.mime_type(),
            recorder.state()
        );
        Ok((
            Self {
                recorder,
                _on_data: on_data,
            },
            rx.boxed_local(),
        ))
    }
}

impl Recorder for BrowserRecorder {
    fn start(&self, timeslice_ms: u32) -> Result<()> {
        info!("Recording started: {:?}", self.recorder.state());
        self.recorder
            .start_with_time_slice(i32::try_from(timeslice_ms).unwrap_or(i32::MAX))?;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.recorder.stop()?;
        Ok(())
    }
}

/// Concatenates a clip's chunks into one `Blob`.
///
/// The concatenated clip goes to `on_clip` when one is set; there is no default upload target.
#[derive(Clone, Default)]
pub struct BlobClipSink {
    on_clip: Option<Rc<dyn Fn(Blob)>>,
}

impl BlobClipSink {
    pub fn new(on_clip: Rc<dyn Fn(Blob)>) -> Self {
        Self {
            on_clip: Some(on_clip),
        }
    }
}

impl ClipSink<Blob> for BlobClipSink {
    fn deliver(&self, clip: Clip<Blob>) {
        let parts: Array = clip.chunks.iter().collect();
        let clip_blob = match Blob::new_with_blob_sequence(&parts) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to concatenate recorded chunks: {e:?}");
                return;
            }
        };
        info!(
            "Final gather of recorded video: {}kb after {:?}",
            (clip_blob.size() / 1024.0).round(),
            clip.held_for.unwrap_or_default()
        );
        match &self.on_clip {
            Some(on_clip) => on_clip(clip_blob),
            None => info!("No clip destination configured, discarding clip"),
        }
    }
}
