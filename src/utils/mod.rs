//! Utility functions and helpers.

pub mod http;

/// Permalink for an item, `{item_url}{id}`.
pub fn permalink(item_url: &str, id: u64) -> String {
    format!("{}{}", item_url, id)
}

/// Escape text for Slack mrkdwn (`&`, `<`, `>`).
pub fn slack_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permalink() {
        assert_eq!(
            permalink("https://news.ycombinator.com/item?id=", 8863),
            "https://news.ycombinator.com/item?id=8863"
        );
    }

    #[test]
    fn test_slack_escape() {
        assert_eq!(slack_escape("a <b> & c"), "a &lt;b&gt; &amp; c");
        assert_eq!(slack_escape("plain"), "plain");
    }
}
