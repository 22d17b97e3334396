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
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// An encoded camera frame attached to a roster record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSnapshot {
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImageSnapshot {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Size of the encoded image in kilobytes, for logging.
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

// Frames are a few kilobytes; printing them would drown the console.
impl fmt::Debug for ImageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSnapshot")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

/// One participant in the roster, keyed by the identity provider's user id.
///
/// Records are created on a user's first visit and updated on every later
/// visit and every snapshot. Nothing in this workspace deletes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// Server-assigned ordering value in milliseconds since the epoch.
    /// `None` until the store has stamped the write.
    #[serde(default, rename = "ts")]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub image: Option<ImageSnapshot>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grade: grade.into(),
            timestamp: None,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageSnapshot) -> Self {
        self.image = Some(image);
        self
    }

    /// Text shown on the presence node, e.g. `Ana (2)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.grade)
    }

    /// Text of the desktop notification raised when this record changes.
    pub fn chat_request_message(&self) -> String {
        format!("{} wants to chat.", self.label())
    }
}

/// Values collected by the registration dialog on a user's first visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub grade: String,
}

impl Registration {
    pub fn new(name: &str, grade: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            grade: grade.trim().to_string(),
        }
    }

    pub fn into_record(self, id: impl Into<String>) -> UserRecord {
        UserRecord::new(id, self.name, self.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_and_message_follow_name_and_grade() {
        let record = UserRecord::new("u2", "Leo", "K");
        assert_eq!(record.label(), "Leo (K)");
        assert_eq!(record.chat_request_message(), "Leo (K) wants to chat.");
    }

    #[test]
    fn registration_trims_dialog_values() {
        let registration = Registration::new("  Ana ", "2\n");
        assert_eq!(registration.name, "Ana");
        assert_eq!(registration.grade, "2");
        let record = registration.into_record("u1");
        assert_eq!(record.label(), "Ana (2)");
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn record_without_optional_fields_deserializes() {
        let record: UserRecord =
            serde_json::from_str(r#"{"id":"u1","name":"Ana","grade":"2"}"#).unwrap();
        assert_eq!(record.timestamp, None);
        assert_eq!(record.image, None);
    }

    #[test]
    fn image_debug_hides_bytes() {
        let image = ImageSnapshot::new(vec![0; 2048], "image/webp");
        assert_eq!(
            format!("{image:?}"),
            r#"ImageSnapshot { len: 2048, mime: "image/webp" }"#
        );
        assert_eq!(image.size_kb(), 2.0);
    }
}
