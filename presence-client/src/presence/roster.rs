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

use std::collections::HashMap;

use super::opacity::Opacity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresenceNode {
    pub id: String,
    pub label: String,
    pub opacity: Opacity,
    pub is_self: bool,
}

/// Whether a sighting created a node or refreshed an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sighting {
    New,
    Refreshed,
}

/// Presence state for every user id seen during this page session.
///
/// Nodes keep the order in which ids were first seen, which is also the order the view appends
/// them in.
#[derive(Debug)]
pub struct PresenceRoster {
    my_user_id: String,
    nodes: Vec<PresenceNode>,
    index: HashMap<String, usize>,
}

impl PresenceRoster {
    pub fn new(my_user_id: impl Into<String>) -> Self {
        Self {
            my_user_id: my_user_id.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn my_user_id(&self) -> &str {
        &self.my_user_id
    }

    /// Records an add/modify sighting: sets the label and resets opacity to full.
    pub fn sight(&mut self, id: &str, label: String) -> Sighting {
        if let Some(&i) = self.index.get(id) {
            let node = &mut self.nodes[i];
            node.label = label;
            node.opacity = Opacity::FULL;
            return Sighting::Refreshed;
        }
        self.index.insert(id.to_string(), self.nodes.len());
        self.nodes.push(PresenceNode {
            id: id.to_string(),
            label,
            opacity: Opacity::FULL,
            is_self: false,
        });
        Sighting::New
    }

    /// Flags the signed-in user's node. Returns false when that node has not been seen.
    pub fn mark_self(&mut self) -> bool {
        match self.index.get(&self.my_user_id) {
            Some(&i) => {
                self.nodes[i].is_self = true;
                true
            }
            None => false,
        }
    }

    /// Fades every node by one step and returns the nodes whose opacity changed.
    pub fn decay(&mut self) -> Vec<(String, Opacity)> {
        self.nodes
            .iter_mut()
            .filter_map(|node| {
                let next = node.opacity.decayed();
                if next == node.opacity {
                    return None;
                }
                node.opacity = next;
                Some((node.id.clone(), next))
            })
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&PresenceNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PresenceNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
