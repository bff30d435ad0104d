//! Ancestor walk and classification rules.
//!
//! The walk follows `parent` links from a leaf item up to its root with an
//! explicit loop, so a pathological chain can never grow the call stack.
//! Classification is a pure function over the collected chain.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{Item, ItemKind, NotificationEvent, NotificationKind};
use crate::services::{ItemSource, KeywordClassifier};

/// Hop limit used when no configuration overrides it.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 100;

/// How the walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached a story, a parentless item, or a non-comment ancestor
    Root,
    /// A parent was missing or could not be fetched
    Broken,
}

/// Leaf-first list of visited items.
#[derive(Debug, Clone)]
pub struct Chain {
    nodes: Vec<Item>,
    end: ChainEnd,
}

impl Chain {
    fn new(nodes: Vec<Item>, end: ChainEnd) -> Self {
        Self { nodes, end }
    }

    pub fn leaf(&self) -> &Item {
        &self.nodes[0]
    }

    /// Top-most item reached. For a broken chain this is not a story.
    pub fn root(&self) -> &Item {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Everything above the leaf, nearest first.
    pub fn ancestors(&self) -> &[Item] {
        &self.nodes[1..]
    }

    pub fn nodes(&self) -> &[Item] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn end(&self) -> ChainEnd {
        self.end
    }
}

/// Walk from `leaf` to its root.
///
/// Fetch failures and missing parents end the walk with what was collected.
/// Exceeding `max_depth` hops or revisiting an id is a malformed chain.
pub async fn walk_chain(source: &dyn ItemSource, leaf: Item, max_depth: usize) -> Result<Chain> {
    let leaf_id = leaf.id;
    let mut seen = HashSet::from([leaf.id]);
    let mut nodes = vec![leaf];

    loop {
        let current = &nodes[nodes.len() - 1];
        let parent_id = match (current.kind, current.parent) {
            (ItemKind::Comment, Some(id)) => id,
            _ => return Ok(Chain::new(nodes, ChainEnd::Root)),
        };

        if nodes.len() > max_depth {
            return Err(AppError::malformed_chain(
                leaf_id,
                format!("more than {} ancestors", max_depth),
            ));
        }
        if !seen.insert(parent_id) {
            return Err(AppError::malformed_chain(
                leaf_id,
                format!("cycle through item {}", parent_id),
            ));
        }

        match source.get_item(parent_id).await {
            Ok(Some(parent)) => nodes.push(parent),
            Ok(None) => {
                log::debug!("Item {}: parent {} not found", leaf_id, parent_id);
                return Ok(Chain::new(nodes, ChainEnd::Broken));
            }
            Err(e) => {
                log::warn!("Item {}: failed to fetch parent {}: {}", leaf_id, parent_id, e);
                return Ok(Chain::new(nodes, ChainEnd::Broken));
            }
        }
    }
}

/// Apply every rule to a walked chain.
///
/// Authorship rules come first, then keyword rules, so when two events share
/// a dedup subject the authorship one is delivered. Removed ancestors are
/// part of the chain but never match anything.
pub fn classify(
    chain: &Chain,
    classifier: &KeywordClassifier,
    watched_user: Option<&str>,
) -> Vec<NotificationEvent> {
    let leaf = chain.leaf();
    let root = chain.root();
    let mut events = Vec::new();

    match leaf.kind {
        ItemKind::Story => {
            if let Some(user) = watched_user {
                if leaf.is_authored_by(user) {
                    events.push(NotificationEvent::new(
                        NotificationKind::UserStory,
                        leaf,
                        leaf,
                        leaf.id,
                    ));
                }
            }
            if classifier.matches(&leaf.searchable_text()) {
                events.push(NotificationEvent::new(
                    NotificationKind::StoryKeywords,
                    leaf,
                    leaf,
                    leaf.id,
                ));
            }
        }
        ItemKind::Comment => {
            let ancestors = || chain.ancestors().iter().filter(|a| !a.is_removed());

            if let Some(user) = watched_user {
                if leaf.is_authored_by(user) {
                    events.push(NotificationEvent::new(
                        NotificationKind::UserComment,
                        leaf,
                        root,
                        leaf.id,
                    ));
                }
                // The leaf never counts as the comment being replied to
                if ancestors().any(|a| a.is_comment() && a.is_authored_by(user)) {
                    events.push(NotificationEvent::new(
                        NotificationKind::ReplyToUserComment,
                        leaf,
                        root,
                        root.id,
                    ));
                }
                if root.is_story() && !root.is_removed() && root.is_authored_by(user) {
                    events.push(NotificationEvent::new(
                        NotificationKind::ReplyToUserStory,
                        leaf,
                        root,
                        root.id,
                    ));
                }
            }

            // Leaf text first, then the thread above it; one event either way.
            let keyword_hit = classifier.matches(&leaf.searchable_text())
                || ancestors().any(|a| classifier.matches(&a.searchable_text()));
            if keyword_hit {
                events.push(NotificationEvent::new(
                    NotificationKind::CommentKeywords,
                    leaf,
                    root,
                    leaf.id,
                ));
            }
        }
        ItemKind::Other => {}
    }

    events
}
