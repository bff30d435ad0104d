// src/services/classifier.rs

//! Keyword classifier for item text.
//!
//! Text is reduced to plain lowercase tokens before matching:
//! markup stripped, links dropped, ASCII punctuation removed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

use crate::models::KeywordConfig;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("valid url pattern"));

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~]"##).expect("valid punctuation class")
});

/// Elements whose text content is never user-visible.
const HIDDEN_ELEMENTS: [&str; 2] = ["script", "style"];

/// Matches text against `(primary AND qualifier) OR standalone` term groups.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    primary: HashSet<String>,
    qualifier: HashSet<String>,
    standalone: HashSet<String>,
}

impl KeywordClassifier {
    pub fn new(config: &KeywordConfig) -> Self {
        let lower = |terms: &[String]| -> HashSet<String> {
            terms.iter().map(|t| t.trim().to_lowercase()).collect()
        };
        Self {
            primary: lower(&config.primary),
            qualifier: lower(&config.qualifier),
            standalone: lower(&config.standalone),
        }
    }

    /// Whether `text` contains the configured keyword combination.
    pub fn matches(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let tokens: HashSet<String> = tokenize(text).into_iter().collect();
        let any = |terms: &HashSet<String>| terms.iter().any(|t| tokens.contains(t));

        (any(&self.primary) && any(&self.qualifier)) || any(&self.standalone)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

/// Plain text content of an HTML fragment, entities decoded.
///
/// Text nodes are joined with spaces so `foo<p>bar` yields two words.
pub fn strip_html(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let mut parts = Vec::new();

    for node in fragment.tree.root().descendants() {
        let Node::Text(content) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(&**content);
        }
    }

    parts.join(" ")
}

/// Normalize text into lowercase match tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let plain = strip_html(text).replace(['\r', '\n'], " ").to_lowercase();
    // Links run from `http` to the next whitespace, wherever they start
    let plain = URL.replace_all(&plain, " ");

    plain
        .split_whitespace()
        .map(|word| PUNCTUATION.replace_all(word, " "))
        .flat_map(|word| {
            word.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}
