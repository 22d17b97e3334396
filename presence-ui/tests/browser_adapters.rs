// Copyright 2025 Security Union LLC
// Licensed under MIT OR Apache-2.0
//
// Tests for the browser adapters: clip concatenation, thumbnail URL
// lifetime and the roster subscription.

#![cfg(all(target_arch = "wasm32", not(target_os = "wasi")))]

mod support;

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use presence_client::web::{BlobClipSink, FirestoreRosterStore};
use presence_client::{Clip, ClipSink, ImageSnapshot, PresenceView, RosterStore};
use presence_ui::view::DomPresenceView;
use support::{cleanup, mount_page};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Blob, HtmlImageElement};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

/// A 1x1 transparent GIF.
const PIXEL_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

fn blob_of(len: usize) -> Blob {
    let bytes = vec![7u8; len];
    Blob::new_with_u8_array_sequence(&Array::of1(&Uint8Array::from(bytes.as_slice()))).unwrap()
}

#[wasm_bindgen_test]
fn final_gather_concatenates_chunks_into_one_blob() {
    let delivered: Rc<RefCell<Option<Blob>>> = Rc::default();
    let slot = Rc::clone(&delivered);
    let sink = BlobClipSink::new(Rc::new(move |blob: Blob| {
        *slot.borrow_mut() = Some(blob);
    }));

    sink.deliver(Clip {
        chunks: vec![blob_of(10), blob_of(20), blob_of(30)],
        held_for: None,
    });

    let clip = delivered.borrow_mut().take().expect("clip should be delivered");
    assert_eq!(clip.size(), 60.0);
}

#[wasm_bindgen_test]
async fn thumbnail_url_is_revoked_once_loaded() {
    let (mount, page) = mount_page();
    let view = DomPresenceView::new(gloo_utils::document(), page.pings.clone());
    view.upsert_node("adapter-u1", "Ana (2)");

    view.show_thumbnail(
        "adapter-u1",
        &ImageSnapshot::new(PIXEL_GIF.to_vec(), "image/gif"),
    );

    let img: HtmlImageElement = page
        .pings
        .get_elements_by_class_name("thumbnail")
        .item(0)
        .unwrap()
        .unchecked_into();
    let url = img.src();
    assert!(url.starts_with("blob:"));

    for _ in 0..40 {
        if img.complete() && img.natural_width() > 0 {
            break;
        }
        TimeoutFuture::new(25).await;
    }
    assert_eq!(img.natural_width(), 1, "thumbnail should have loaded");
    // Let the load handler run before probing the URL.
    TimeoutFuture::new(25).await;

    let fetched = JsFuture::from(gloo_utils::window().fetch_with_str(&url)).await;
    assert!(fetched.is_err(), "revoked blob URL should no longer resolve");

    cleanup(&mount);
}

/// A stand-in for a Firestore collection whose `onSnapshot` runs `body`.
fn fake_collection(body: &str) -> JsValue {
    let collection = Object::new();
    let on_snapshot = Function::new_with_args("next, error", body);
    Reflect::set(&collection, &"onSnapshot".into(), &on_snapshot).unwrap();
    collection.into()
}

#[wasm_bindgen_test]
async fn subscription_starts_with_an_initial_batch() {
    let store = FirestoreRosterStore::from_collection(fake_collection(
        "next({ docChanges: function() { return []; } }); return function() {};",
    ));

    let mut batches = store.subscribe();
    let first = batches.next().await.unwrap();
    assert!(first.initial);
    assert!(first.is_empty());
}

#[wasm_bindgen_test]
async fn refused_subscription_ends_the_stream() {
    let store = FirestoreRosterStore::from_collection(fake_collection(
        "error(new Error('Missing or insufficient permissions.')); return function() {};",
    ));

    let mut batches = store.subscribe();
    assert!(batches.next().await.is_none());
}
