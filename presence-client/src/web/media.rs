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

use futures::channel::oneshot;
use gloo_timers::future::TimeoutFuture;
use gloo_utils::window;
use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use crate::capture::MediaConstraints;
use crate::error::{PresenceError, Result};

const VIDEO_READY_POLL_MS: u32 = 250;

/// Asks the browser for a camera and microphone stream.
pub async fn get_user_media(constraints: &MediaConstraints) -> Result<MediaStream> {
    let media_devices = window().navigator().media_devices()?;
    let constraints: MediaStreamConstraints = serde_wasm_bindgen::to_value(constraints)
        .map_err(|e| PresenceError::Media(format!("Bad media constraints: {e}")))?
        .unchecked_into();
    let promise = media_devices.get_user_media_with_constraints(&constraints)?;
    let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;

    for track in stream.get_tracks().iter() {
        let track: MediaStreamTrack = track.unchecked_into();
        let settings = js_sys::JSON::stringify(&track.get_settings())
            .map(String::from)
            .unwrap_or_default();
        info!("Track: {} ({}): {settings}", track.id(), track.kind());
    }
    Ok(stream)
}

/// Waits for the first click on `button`, then requests the media stream.
///
/// Browsers only grant camera access in response to a user gesture. Later clicks are ignored.
pub async fn click_for_stream(
    button: &HtmlElement,
    constraints: &MediaConstraints,
) -> Result<MediaStream> {
    let (tx, rx) = oneshot::channel::<()>();
    let mut tx = Some(tx);
    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        if let Some(tx) = tx.take() {
            info!("Click for video detected.");
            let _ = tx.send(());
        }
    });
    button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
    info!("Waiting for the video start click.");

    let clicked = rx.await;
    button.set_onclick(None);
    drop(on_click);
    clicked.map_err(|_| PresenceError::Media("capture button handler dropped".to_string()))?;

    get_user_media(constraints).await
}

/// Shows `stream` in `video` and waits until the element reports real frame dimensions.
pub async fn attach_to_video(video: &HtmlVideoElement, stream: &MediaStream) -> Result<()> {
    video.set_src_object(Some(stream));
    let playing = video.clone();
    let on_metadata = Closure::once_into_js(move || {
        if let Err(e) = playing.play() {
            log::warn!("Video element refused to play: {e:?}");
        }
    });
    video.set_onloadedmetadata(Some(on_metadata.unchecked_ref()));

    while video.video_width() == 0 {
        info!("Awaiting video element to be ready.");
        TimeoutFuture::new(VIDEO_READY_POLL_MS).await;
    }
    info!(
        "Video element ready at {}x{}",
        video.video_width(),
        video.video_height()
    );
    Ok(())
}
