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

//! Change events delivered by a roster subscription.

use crate::record::UserRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Added and modified records refresh the roster; removals are display-only.
    pub fn is_sighting(self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::Modified)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown change type: {0}")]
pub struct UnknownChangeKind(pub String);

impl FromStr for ChangeKind {
    type Err = UnknownChangeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(ChangeKind::Added),
            "modified" => Ok(ChangeKind::Modified),
            "removed" => Ok(ChangeKind::Removed),
            other => Err(UnknownChangeKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordChange {
    pub kind: ChangeKind,
    pub record: UserRecord,
}

impl RecordChange {
    pub fn added(record: UserRecord) -> Self {
        Self {
            kind: ChangeKind::Added,
            record,
        }
    }

    pub fn modified(record: UserRecord) -> Self {
        Self {
            kind: ChangeKind::Modified,
            record,
        }
    }

    pub fn removed(record: UserRecord) -> Self {
        Self {
            kind: ChangeKind::Removed,
            record,
        }
    }
}

/// A group of changes delivered together by the store.
///
/// `initial` is set only on the first batch of a subscription, which describes
/// every record that already existed as `added`. Changes keep the order of the
/// store's underlying change set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub initial: bool,
    pub changes: Vec<RecordChange>,
}

impl ChangeBatch {
    pub fn initial(changes: Vec<RecordChange>) -> Self {
        Self {
            initial: true,
            changes,
        }
    }

    pub fn update(changes: Vec<RecordChange>) -> Self {
        Self {
            initial: false,
            changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
