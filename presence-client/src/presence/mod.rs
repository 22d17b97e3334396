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

//! The live roster: one fading presence node per user seen this session.

mod controller;
mod opacity;
mod roster;

pub use controller::PresenceController;
pub use opacity::Opacity;
pub use roster::{PresenceNode, PresenceRoster, Sighting};

use presence_types::ImageSnapshot;

/// Renders presence nodes.
///
/// Nodes are keyed by user id. The view only ever creates and updates nodes; nodes are never
/// removed during a session.
pub trait PresenceView {
    /// Creates the node for `id` if it does not exist yet, then sets its label.
    fn upsert_node(&self, id: &str, label: &str);

    /// Replaces the node's thumbnail with the given image.
    fn show_thumbnail(&self, id: &str, image: &ImageSnapshot);

    fn set_opacity(&self, id: &str, opacity: Opacity);

    /// Highlights the node belonging to the signed-in user.
    fn mark_self(&self, id: &str);
}
