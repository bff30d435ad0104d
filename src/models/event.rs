//! Notification events produced by the classification walk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Why a notification is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new story matches the keyword set
    StoryKeywords,
    /// A new comment matches, or sits in a thread that matches
    CommentKeywords,
    /// The watched user posted a story
    UserStory,
    /// The watched user posted a comment
    UserComment,
    /// Someone replied beneath one of the watched user's comments
    ReplyToUserComment,
    /// Someone commented on the watched user's story
    ReplyToUserStory,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        NotificationKind::StoryKeywords,
        NotificationKind::CommentKeywords,
        NotificationKind::UserStory,
        NotificationKind::UserComment,
        NotificationKind::ReplyToUserComment,
        NotificationKind::ReplyToUserStory,
    ];

    /// Stable slug used in dedup markers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StoryKeywords => "story-keywords",
            NotificationKind::CommentKeywords => "comment-keywords",
            NotificationKind::UserStory => "user-story",
            NotificationKind::UserComment => "user-comment",
            NotificationKind::ReplyToUserComment => "reply-to-user-comment",
            NotificationKind::ReplyToUserStory => "reply-to-user-story",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified relationship that may become a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    /// Item the message centers on
    pub subject: Item,
    /// Top of the chain, used for framing
    pub root: Item,
    /// Id whose marker gates delivery. Events sharing a subject collapse
    /// into whichever is delivered first.
    pub dedup_subject: u64,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, subject: &Item, root: &Item, dedup_subject: u64) -> Self {
        Self {
            kind,
            subject: subject.clone(),
            root: root.clone(),
            dedup_subject,
        }
    }
}
