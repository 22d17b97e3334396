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

//! Shared data model for the classroom presence roster.

pub mod change;
pub mod record;

pub use change::{ChangeBatch, ChangeKind, RecordChange, UnknownChangeKind};
pub use record::{ImageSnapshot, Registration, UserRecord};

/// Returns true for the usual "enabled" spellings (`true`, `1`), case-insensitive.
pub fn truthy(s: Option<&str>) -> bool {
    if let Some(s) = s {
        ["true", "1"].contains(&s.trim().to_lowercase().as_str())
    } else {
        false
    }
}
