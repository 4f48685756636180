//! IRCv3 message tag parsing for TMI lines.
//!
//! Twitch attaches metadata such as `display-name`, `badge-info` and
//! `msg-param-months` as a `;`-separated list of `key=value` pairs in
//! front of the line.

use std::collections::HashMap;

/// Key/value metadata attached to a server line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags {
    inner: HashMap<String, String>,
}

impl Tags {
    /// Parse the raw tag segment (without the leading `@`).
    ///
    /// Each entry is split on its first `=`; an entry without `=` maps to
    /// an empty value. Values are unescaped per IRCv3. Empty entries are
    /// skipped.
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .split(';')
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), unescape_tag_value(value)),
                None => (entry.to_string(), String::new()),
            })
            .collect();
        Self { inner }
    }

    /// Look up a tag value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Look up a tag value, treating an empty value as absent.
    ///
    /// Twitch sends `display-name=` for users without a display name.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Unescape a tag value from wire format.
pub fn unescape_tag_value(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_twitch_resub_tags() {
        let tags = Tags::parse("badge-info=;display-name=Foo;msg-id=resub");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("badge-info"), Some(""));
        assert_eq!(tags.get("display-name"), Some("Foo"));
        assert_eq!(tags.get("msg-id"), Some("resub"));
    }

    #[test]
    fn test_value_containing_equals() {
        let tags = Tags::parse("emote-sets=0;reply=a=b");
        assert_eq!(tags.get("reply"), Some("a=b"));
    }

    #[test]
    fn test_key_without_value() {
        let tags = Tags::parse("flag;mod=1");
        assert_eq!(tags.get("flag"), Some(""));
        assert_eq!(tags.get("mod"), Some("1"));
    }

    #[test]
    fn test_empty_entries_skipped() {
        let tags = Tags::parse("a=1;;b=2;");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_system_msg_unescaped() {
        let tags = Tags::parse("system-msg=Foo\\ssubscribed\\sat\\sTier\\s1.");
        assert_eq!(tags.get("system-msg"), Some("Foo subscribed at Tier 1."));
    }

    #[test]
    fn test_non_empty() {
        let tags = Tags::parse("display-name=;login=foo");
        assert_eq!(tags.non_empty("display-name"), None);
        assert_eq!(tags.non_empty("login"), Some("foo"));
        assert_eq!(tags.non_empty("missing"), None);
    }

    #[test]
    fn test_unescape_combined() {
        let input = "a\\:b\\sc\\\\d\\re\\nf";
        let expected = "a;b c\\d\re\nf";
        assert_eq!(unescape_tag_value(input), expected);
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape_tag_value("test\\"), "test");
    }

    #[test]
    fn test_unescape_unknown_escape() {
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }
}
