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

//! Error types for the presence client.

use thiserror::Error;

/// Errors returned by the presence client and its collaborators.
#[derive(Debug, Error)]
pub enum PresenceError {
    /// The identity provider could not resolve a signed-in user.
    #[error("Identity error: {0}")]
    Identity(String),

    /// A read or write against the roster store failed.
    #[error("Roster store error: {0}")]
    Store(String),

    /// The user's record does not exist yet.
    #[error("No roster record for user {0}")]
    MissingRecord(String),

    /// Camera, microphone, canvas or recorder failure.
    #[error("Media capture error: {0}")]
    Media(String),

    /// The platform could not display a notification.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Runtime configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A DOM element the page contract requires is absent or of the wrong type.
    #[error("Missing DOM element: #{0}")]
    MissingElement(String),

    /// A JavaScript exception or rejected promise.
    #[error("JavaScript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, PresenceError>;

#[cfg(feature = "wasm")]
impl From<wasm_bindgen::JsValue> for PresenceError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        use wasm_bindgen::JsCast;

        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            return PresenceError::Js(String::from(error.message()));
        }
        match value.as_string() {
            Some(message) => PresenceError::Js(message),
            None => PresenceError::Js(format!("{value:?}")),
        }
    }
}

impl From<serde_json::Error> for PresenceError {
    fn from(e: serde_json::Error) -> Self {
        PresenceError::Config(e.to_string())
    }
}
