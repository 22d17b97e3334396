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

//! Runtime configuration.
//!
//! The page injects a `window.__APP_CONFIG` object; every key is optional and falls back to the
//! values the classroom deployment has always used.

use crate::capture::CaptureMode;
use crate::error::Result;
use presence_types::truthy;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_OAUTH_CLIENT_ID: &str =
    "955533863396-mdtdedhlovdl74trt385u6ne8ge7p1bu.apps.googleusercontent.com";
pub const DEFAULT_ROSTER_COLLECTION: &str = "students";
pub const DEFAULT_SNAPSHOT_PERIOD_MS: u32 = 2_000;
pub const DEFAULT_RECORDER_TIMESLICE_MS: u32 = 3_000;
pub const DEFAULT_DECAY_PERIOD_MS: u32 = 60_000;
pub const DEFAULT_SNAPSHOT_MIME: &str = "image/webp";
pub const DEFAULT_SNAPSHOT_QUALITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresenceConfig {
    pub oauth_client_id: String,
    pub roster_collection: String,
    pub capture_mode: CaptureMode,
    pub snapshot_period_ms: u32,
    pub recorder_timeslice_ms: u32,
    pub decay_period_ms: u32,
    pub snapshot_mime: String,
    pub snapshot_quality: f64,
    #[serde(deserialize_with = "bool_or_truthy")]
    pub notifications_enabled: bool,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            oauth_client_id: DEFAULT_OAUTH_CLIENT_ID.to_string(),
            roster_collection: DEFAULT_ROSTER_COLLECTION.to_string(),
            capture_mode: CaptureMode::default(),
            snapshot_period_ms: DEFAULT_SNAPSHOT_PERIOD_MS,
            recorder_timeslice_ms: DEFAULT_RECORDER_TIMESLICE_MS,
            decay_period_ms: DEFAULT_DECAY_PERIOD_MS,
            snapshot_mime: DEFAULT_SNAPSHOT_MIME.to_string(),
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY,
            notifications_enabled: true,
        }
    }
}

impl PresenceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// Deployments write flags either as JSON booleans or as "true"/"1" strings.
fn bool_or_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => truthy(Some(&s)),
    })
}
