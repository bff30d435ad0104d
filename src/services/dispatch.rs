// src/services/dispatch.rs

//! Notification formatting and dispatch.
//!
//! One fixed template per `NotificationKind`. Titles render as Slack links,
//! `<permalink|title>`; items without a title get the bare permalink.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Item, NotificationKind};
use crate::services::Notifier;
use crate::utils::{permalink, slack_escape};

/// Formats events and hands them to a transport.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    item_url: String,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, item_url: impl Into<String>) -> Self {
        Self {
            notifier,
            item_url: item_url.into(),
        }
    }

    /// Format the message for `kind` and send it.
    pub async fn format_and_send(
        &self,
        kind: NotificationKind,
        subject: &Item,
        root: &Item,
    ) -> Result<()> {
        let text = self.format(kind, subject, root);
        log::debug!("Dispatching {} for item {}", kind, subject.id);
        self.notifier.send(&text).await
    }

    pub fn format(&self, kind: NotificationKind, subject: &Item, root: &Item) -> String {
        let subject_link = self.link(subject);
        let root_link = self.link(root);
        let replier = subject.by.as_deref().unwrap_or("unknown");

        match kind {
            NotificationKind::StoryKeywords => format!(
                "A new interesting story was posted on HackerNews: {}",
                subject_link
            ),
            NotificationKind::CommentKeywords => format!(
                "A new interesting comment was posted on HackerNews: {} in {}",
                self.bare(subject),
                root_link
            ),
            NotificationKind::UserStory => {
                format!("Your story was posted on HackerNews: {}", subject_link)
            }
            NotificationKind::UserComment => format!(
                "Your comment was posted on HackerNews: {} in {}",
                self.bare(subject),
                root_link
            ),
            NotificationKind::ReplyToUserComment => format!(
                "{} replied to your comment on HackerNews: {} in {}",
                slack_escape(replier),
                self.bare(subject),
                root_link
            ),
            NotificationKind::ReplyToUserStory => format!(
                "New comment on your HackerNews story {}: {}",
                root_link,
                self.bare(subject)
            ),
        }
    }

    fn bare(&self, item: &Item) -> String {
        permalink(&self.item_url, item.id)
    }

    fn link(&self, item: &Item) -> String {
        let url = self.bare(item);
        match item.display_title() {
            Some(title) => format!("<{}|{}>", url, slack_escape(title)),
            None => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use crate::services::LogNotifier;

    const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(LogNotifier), ITEM_URL)
    }

    fn story() -> Item {
        Item {
            id: 4500,
            kind: ItemKind::Story,
            title: Some("Serverless Go on Lambda".into()),
            by: Some("alice".into()),
            ..Item::default()
        }
    }

    fn comment() -> Item {
        Item {
            id: 4600,
            kind: ItemKind::Comment,
            parent: Some(4500),
            text: Some("nice".into()),
            by: Some("bob".into()),
            ..Item::default()
        }
    }

    #[test]
    fn test_story_keywords_template() {
        let s = story();
        assert_eq!(
            dispatcher().format(NotificationKind::StoryKeywords, &s, &s),
            "A new interesting story was posted on HackerNews: \
             <https://news.ycombinator.com/item?id=4500|Serverless Go on Lambda>"
        );
    }

    #[test]
    fn test_untitled_story_uses_bare_link() {
        let s = Item {
            title: None,
            ..story()
        };
        assert_eq!(
            dispatcher().format(NotificationKind::StoryKeywords, &s, &s),
            "A new interesting story was posted on HackerNews: \
             https://news.ycombinator.com/item?id=4500"
        );
    }

    #[test]
    fn test_comment_templates_reference_both_items() {
        let d = dispatcher();
        let (s, c) = (story(), comment());
        for kind in [
            NotificationKind::CommentKeywords,
            NotificationKind::UserComment,
            NotificationKind::ReplyToUserComment,
            NotificationKind::ReplyToUserStory,
        ] {
            let text = d.format(kind, &c, &s);
            assert!(text.contains("item?id=4600"), "{kind}: {text}");
            assert!(text.contains("item?id=4500|Serverless Go on Lambda"), "{kind}: {text}");
        }
    }

    #[test]
    fn test_templates_are_distinct() {
        let d = dispatcher();
        let (s, c) = (story(), comment());
        let mut texts: Vec<_> = NotificationKind::ALL
            .iter()
            .map(|&k| d.format(k, &c, &s))
            .collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), 6);
    }

    #[test]
    fn test_reply_names_the_replier() {
        let (s, c) = (story(), comment());
        let text = dispatcher().format(NotificationKind::ReplyToUserComment, &c, &s);
        assert!(text.starts_with("bob replied to your comment"), "{text}");
        assert!(!text.contains("alice"), "{text}");
    }

    #[test]
    fn test_title_is_escaped() {
        let s = Item {
            title: Some("Show HN: <blink> & friends".into()),
            ..story()
        };
        let text = dispatcher().format(NotificationKind::UserStory, &s, &s);
        assert!(text.ends_with("|Show HN: &lt;blink&gt; &amp; friends>"));
    }
}
