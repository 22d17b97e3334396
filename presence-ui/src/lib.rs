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

//! presence-ui library root.
//!
//! Re-exports the page modules so that integration tests (under `tests/`) can
//! drive the DOM view and the registration dialog. The binary entry-point lives
//! in `main.rs`.

pub mod app;
pub mod constants;
pub mod registration;
pub mod view;
