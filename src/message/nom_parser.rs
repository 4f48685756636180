//! Nom-based parser for the TMI line grammar.
//!
//! ```text
//! [@tags ]:[nick!nick@nick.]tmi.twitch.tv ACTION #channel[ :message]
//! ```
//!
//! The parser matches a prefix of the line: anything after the channel
//! that is not a ` :message` trailer is ignored.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, satisfy},
    combinator::{opt, recognize, rest},
    error::{context, ErrorKind, ParseError, VerboseError},
    sequence::{pair, preceded, terminated},
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Host every TMI line is sourced from.
pub const TMI_HOST: &str = "tmi.twitch.tv";

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn whitespace(input: &str) -> ParseResult<&str, char> {
    satisfy(char::is_whitespace)(input)
}

/// Parse the tag segment (the part after `@` and before the separating space).
fn parse_tags(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message tags",
        terminated(
            preceded(char('@'), take_while1(|c: char| !c.is_whitespace())),
            whitespace,
        ),
    )(input)
}

/// Parse `nick!nick@nick.` where all three names are identical.
fn parse_user_prefix(input: &str) -> ParseResult<&str, &str> {
    let start = input;
    let (input, nick) = take_while1(is_name_char)(input)?;
    let (input, _) = char('!')(input)?;
    let (input, user) = take_while1(is_name_char)(input)?;
    let (input, _) = char('@')(input)?;
    let (input, host) = take_while1(is_name_char)(input)?;
    let (input, _) = char('.')(input)?;

    if user != nick || host != nick {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            start,
            ErrorKind::Verify,
        )));
    }

    Ok((input, nick))
}

/// Parse the action verb (`PRIVMSG`, `USERNOTICE`, `JOIN`, ...).
fn parse_action(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing action",
        take_while1(|c: char| c.is_ascii_uppercase()),
    )(input)
}

/// Parse a `#channel` name, keeping the leading `#`.
fn parse_channel(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing channel",
        recognize(pair(char('#'), take_while1(is_name_char))),
    )(input)
}

/// Parse the optional ` :message` trailer.
fn parse_trailing(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing trailing message",
        preceded(pair(whitespace, char(':')), rest),
    )(input)
}

/// Parse a complete TMI line into its components.
pub fn parse_line(input: &str) -> ParseResult<&str, ParsedLine<'_>> {
    let (input, tags) = opt(parse_tags)(input)?;
    let (input, _) = context("parsing source", char(':'))(input)?;
    let (input, nickname) = opt(parse_user_prefix)(input)?;
    let (input, _) = context("parsing tmi host", tag(TMI_HOST))(input)?;
    let (input, _) = char(' ')(input)?;
    let (input, action) = parse_action(input)?;
    let (input, _) = char(' ')(input)?;
    let (input, channel) = parse_channel(input)?;
    let (input, message) = opt(parse_trailing)(input)?;

    Ok((
        input,
        ParsedLine {
            tags,
            nickname,
            action,
            channel,
            message,
        },
    ))
}

/// A parsed TMI line with borrowed string slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Sender nickname, absent for server-originated lines.
    pub nickname: Option<&'a str>,
    /// The action verb.
    pub action: &'a str,
    /// Channel name including the leading `#`.
    pub channel: &'a str,
    /// Trailing message text, if present.
    pub message: Option<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// Parse a line, returning `None` if it does not fit the grammar.
    pub fn parse(input: &'a str) -> Option<Self> {
        match parse_line(input) {
            Ok((_rest, line)) => Some(line),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let position = e
                    .errors
                    .first()
                    .map(|(remaining, _)| input.len() - remaining.len())
                    .unwrap_or(0);
                tracing::trace!(position, line = input, "line does not match tmi grammar");
                None
            }
            Err(nom::Err::Incomplete(_)) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privmsg() {
        let line =
            ParsedLine::parse(":nick!nick@nick.tmi.twitch.tv PRIVMSG #chan :hello world").unwrap();
        assert_eq!(line.tags, None);
        assert_eq!(line.nickname, Some("nick"));
        assert_eq!(line.action, "PRIVMSG");
        assert_eq!(line.channel, "#chan");
        assert_eq!(line.message, Some("hello world"));
    }

    #[test]
    fn test_parse_with_tags() {
        let line = ParsedLine::parse(
            "@badge-info=;display-name=Foo;msg-id=resub :tmi.twitch.tv USERNOTICE #chan :thanks",
        )
        .unwrap();
        assert_eq!(line.tags, Some("badge-info=;display-name=Foo;msg-id=resub"));
        assert_eq!(line.nickname, None);
        assert_eq!(line.action, "USERNOTICE");
        assert_eq!(line.message, Some("thanks"));
    }

    #[test]
    fn test_parse_join_without_message() {
        let line = ParsedLine::parse(":foo_1!foo_1@foo_1.tmi.twitch.tv JOIN #bar").unwrap();
        assert_eq!(line.nickname, Some("foo_1"));
        assert_eq!(line.action, "JOIN");
        assert_eq!(line.channel, "#bar");
        assert_eq!(line.message, None);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let line = ParsedLine::parse(":tmi.twitch.tv USERNOTICE #chan :").unwrap();
        assert_eq!(line.message, Some(""));
    }

    #[test]
    fn test_mismatched_nicknames_rejected() {
        assert!(ParsedLine::parse(":a!b@a.tmi.twitch.tv PRIVMSG #chan :hi").is_none());
        assert!(ParsedLine::parse(":a!a@b.tmi.twitch.tv PRIVMSG #chan :hi").is_none());
    }

    #[test]
    fn test_missing_source_colon_rejected() {
        assert!(ParsedLine::parse("tmi.twitch.tv PRIVMSG #chan :hi").is_none());
    }

    #[test]
    fn test_other_host_rejected() {
        assert!(ParsedLine::parse(":nick!user@host PRIVMSG #chan :hi").is_none());
    }

    #[test]
    fn test_numeric_reply_rejected() {
        assert!(ParsedLine::parse(":tmi.twitch.tv 001 bot :Welcome, GLHF!").is_none());
    }

    #[test]
    fn test_channel_requires_hash() {
        assert!(ParsedLine::parse(":tmi.twitch.tv CLEARCHAT chan").is_none());
    }

    #[test]
    fn test_trailing_garbage_ignored() {
        let line = ParsedLine::parse(":tmi.twitch.tv CLEARCHAT #chan someone").unwrap();
        assert_eq!(line.action, "CLEARCHAT");
        assert_eq!(line.message, None);
    }
}
