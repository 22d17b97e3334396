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

//! Page setup: sign-in, registration, the live roster and the capture button.

use std::rc::Rc;

use anyhow::Context;
use futures::StreamExt;
use gloo_timers::future::IntervalStream;
use log::info;
use presence_client::web::{
    attach_to_video, await_ready, click_for_stream, BlobClipSink, BrowserNotifications,
    BrowserRecorder, CanvasFrameGrabber, FirebaseIdentity, FirestoreRosterStore,
};
use presence_client::{
    bootstrap, CaptureMode, CaptureStrategy, MediaConstraints, PermissionGatedNotifier,
    PresenceConfig, PresenceController, PushToTalkStrategy, RosterStore, SessionContext,
    SnapshotStrategy,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, MediaStream};

use crate::constants::app_config;
use crate::registration::DialogRegistrationForm;
use crate::view::{DomPresenceView, PageElements};

/// Runs the whole page script. Returns once the capture strategy is armed.
pub async fn run() -> anyhow::Result<()> {
    await_ready().await?;
    let config = app_config()?;
    let document = gloo_utils::document();
    let page = PageElements::from_document(&document)?;
    info!("Page ready, capture mode {}", config.capture_mode);

    let form = DialogRegistrationForm::new(&page);
    let session = bootstrap(
        &FirebaseIdentity::new(),
        &form,
        FirestoreRosterStore::new(&config.roster_collection),
        &config.oauth_client_id,
    )
    .await
    .context("session bootstrap failed")?;
    info!(
        "Signed in as {} ({:?} visit)",
        session.my_user_id(),
        session.visit()
    );

    start_presence(&session, &config, &page);

    let stream = click_for_stream(&page.capture_button, &MediaConstraints::default()).await?;
    attach_to_video(&page.video_main, &stream).await?;

    let strategy = capture_strategy(&session, &config, &page, &stream)?;
    arm_capture_button(&page.capture_button, strategy);
    Ok(())
}

fn start_presence(
    session: &SessionContext<FirestoreRosterStore>,
    config: &PresenceConfig,
    page: &PageElements,
) {
    let view = DomPresenceView::new(gloo_utils::document(), page.pings.clone());
    let notifier = if config.notifications_enabled {
        PermissionGatedNotifier::new(BrowserNotifications)
    } else {
        PermissionGatedNotifier::disabled(BrowserNotifications)
    };
    let presence = PresenceController::new(session, view, notifier);

    spawn_local(presence.clone().run(session.store().subscribe()));
    spawn_local(presence.run_decay(IntervalStream::new(config.decay_period_ms)));
}

fn capture_strategy(
    session: &SessionContext<FirestoreRosterStore>,
    config: &PresenceConfig,
    page: &PageElements,
    stream: &MediaStream,
) -> anyhow::Result<Rc<dyn CaptureStrategy>> {
    let strategy: Rc<dyn CaptureStrategy> = match config.capture_mode {
        CaptureMode::Snapshot => {
            let grabber = CanvasFrameGrabber::new(
                &page.video_main,
                &config.snapshot_mime,
                config.snapshot_quality,
            )?;
            let ticks = IntervalStream::new(config.snapshot_period_ms).boxed_local();
            Rc::new(SnapshotStrategy::new(session.clone(), grabber, ticks))
        }
        CaptureMode::PushToTalk => {
            let (recorder, chunks) = BrowserRecorder::new(stream)?;
            Rc::new(PushToTalkStrategy::new(
                recorder,
                chunks,
                BlobClipSink::default(),
                config.recorder_timeslice_ms,
            ))
        }
    };
    Ok(strategy)
}

fn arm_capture_button(button: &HtmlElement, strategy: Rc<dyn CaptureStrategy>) {
    if let Some(label) = strategy.button_label() {
        button.set_text_content(Some(label));
    }

    let pressed = Rc::clone(&strategy);
    let on_press = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_: web_sys::MouseEvent| {
        pressed.press();
    });
    button.set_onmousedown(Some(on_press.as_ref().unchecked_ref()));
    on_press.forget();

    let released = Rc::clone(&strategy);
    let on_release =
        Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_: web_sys::MouseEvent| {
            released.release();
        });
    button.set_onmouseup(Some(on_release.as_ref().unchecked_ref()));
    on_release.forget();

    info!("Capture armed in {} mode", strategy.mode());
    spawn_local(async move { strategy.run().await });
}
