// Copyright 2025 Security Union LLC
// Licensed under MIT OR Apache-2.0
//
// Shared test harness for presence-ui browser tests.
//
// Provides the page markup, mount/cleanup helpers and runtime config
// injection so that individual test files stay focused on assertions.
//
// Each test file that does `mod support;` compiles its own copy, so not every
// function is used in every compilation unit.
#![allow(dead_code)]

use presence_ui::view::PageElements;

/// The markup contract the page script expects.
pub const PAGE_MARKUP: &str = r#"
    <dialog id="register_dialog">
        <input id="first" type="text">
        <select id="grade">
            <option>K</option>
            <option>1</option>
            <option>2</option>
        </select>
        <button class="close">Done</button>
    </dialog>
    <div id="pings"></div>
    <button id="capture_button">Start Video</button>
    <video id="video_main"></video>
"#;

/// Create a fresh `<div>`, attach it to `<body>`, and return it.
pub fn create_mount_point() -> web_sys::Element {
    let document = gloo_utils::document();
    let div = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&div).unwrap();
    div
}

/// Mount the full page markup and resolve its elements.
pub fn mount_page() -> (web_sys::Element, PageElements) {
    let mount = create_mount_point();
    mount.set_inner_html(PAGE_MARKUP);
    let page = PageElements::from_document(&gloo_utils::document()).unwrap();
    (mount, page)
}

/// Remove the mount-point from `<body>` so subsequent tests start clean.
pub fn cleanup(mount: &web_sys::Element) {
    gloo_utils::document()
        .body()
        .unwrap()
        .remove_child(mount)
        .ok();
}

/// Inject a `window.__APP_CONFIG` object.
pub fn inject_app_config(entries: &[(&str, wasm_bindgen::JsValue)]) {
    let config = js_sys::Object::new();
    for (key, value) in entries {
        js_sys::Reflect::set(&config, &(*key).into(), value).unwrap();
    }
    let frozen = js_sys::Object::freeze(&config);
    js_sys::Reflect::set(&gloo_utils::window(), &"__APP_CONFIG".into(), &frozen).unwrap();
}

/// Remove `window.__APP_CONFIG` so tests don't leak state.
pub fn remove_app_config() {
    let window = gloo_utils::window();
    let _ = js_sys::Reflect::delete_property(&window.into(), &"__APP_CONFIG".into());
}
