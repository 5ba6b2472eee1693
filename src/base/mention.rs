//! Mention extraction and GitHub to Slack handle translation.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, LazyLock},
};

use regex::Regex;

/// An `@` followed by one or more word characters.
///
/// This also matches the domain of an e-mail address (`test@test.com` yields
/// `@test`); such tokens are dropped later because they are not in the directory.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").expect("mention pattern is valid"));

/// Find every distinct `@handle` token in the text.
pub fn find_mentions(text: &str) -> BTreeSet<String> {
    MENTION_REGEX.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Find the mentions present in `current` that were not already present in `previous`.
pub fn find_new_mentions(current: &str, previous: &str) -> BTreeSet<String> {
    let before = find_mentions(previous);

    find_mentions(current).into_iter().filter(|m| !before.contains(m)).collect()
}

/// Translates GitHub mentions into Slack mentions.
///
/// Lookups ignore ASCII case, since GitHub logins are case-insensitive and the
/// configuration loader lowercases table keys.
///
/// It is designed to be trivially cloneable.
#[derive(Debug, Clone, Default)]
pub struct MentionDirectory {
    entries: Arc<HashMap<String, String>>,
}

impl MentionDirectory {
    pub fn new(github_to_slack: &HashMap<String, String>) -> Self {
        let entries = github_to_slack.iter().map(|(github, slack)| (normalize(github), slack.clone())).collect();

        Self { entries: Arc::new(entries) }
    }

    /// The Slack handle for a GitHub mention, if one is configured.
    pub fn resolve(&self, mention: &str) -> Option<&str> {
        self.entries.get(&normalize(mention)).map(String::as_str)
    }

    /// Render the mentions as a space separated list of Slack pings.
    ///
    /// Mentions without a Slack handle are dropped. The output is empty when
    /// nobody can be pinged.
    pub fn render<'a, I>(&self, mentions: I) -> String
    where
        I: IntoIterator<Item = &'a String>,
    {
        let ordered: BTreeSet<&String> = mentions.into_iter().collect();

        ordered.into_iter().filter_map(|m| self.resolve(m)).map(|slack| format!("<{slack}>")).collect::<Vec<_>>().join(" ")
    }
}

fn normalize(handle: &str) -> String {
    let handle = handle.trim().to_ascii_lowercase();

    if handle.starts_with('@') { handle } else { format!("@{handle}") }
}

// Tests.
