use futures::channel::oneshot;
use js_sys::Reflect;
use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_time::Instant;

use crate::error::Result;

fn is_complete(document: &web_sys::Document) -> bool {
    Reflect::get(document, &"readyState".into())
        .ok()
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "complete")
}

/// Resolves once the page has loaded, so DOM lookups are safe no matter when the module runs.
pub async fn await_ready() -> Result<()> {
    let started = Instant::now();
    let document = gloo_utils::document();
    if is_complete(&document) {
        info!("Page already complete");
        return Ok(());
    }

    let window = gloo_utils::window();
    let (tx, rx) = oneshot::channel::<()>();
    let mut tx = Some(tx);
    let on_ready = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(());
        }
    });
    let callback = on_ready.as_ref().unchecked_ref();
    document.add_event_listener_with_callback_and_bool("DOMContentLoaded", callback, true)?;
    window.add_event_listener_with_callback_and_bool("load", callback, true)?;

    let _ = rx.await;

    document.remove_event_listener_with_callback_and_bool("DOMContentLoaded", callback, true)?;
    window.remove_event_listener_with_callback_and_bool("load", callback, true)?;
    info!("Page ready after {:?}", started.elapsed());
    Ok(())
}
