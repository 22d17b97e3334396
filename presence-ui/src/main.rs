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

use log::{info, warn};
use wasm_bindgen_futures::spawn_local;

fn main() {
    let level = if cfg!(feature = "debugAssertions") {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    let _ = console_log::init_with_level(level);
    console_error_panic_hook::set_once();

    spawn_local(async {
        match presence_ui::app::run().await {
            Ok(()) => info!("Finished setup script."),
            Err(e) => warn!("Setup failed: {e:#}"),
        }
    });
}
