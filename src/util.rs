//! Text helpers for outbound chat messages.

/// Twitch rejects chat messages longer than this many characters.
pub const MAX_CHAT_CHARS: usize = 500;

/// Returns the text up to (not including) the first CR, LF or NUL.
///
/// Outbound parameters must never contain a line terminator, or a
/// single send could smuggle a second command onto the wire. NUL is
/// rejected by the line encoder, so it ends the text as well.
///
/// # Examples
///
/// ```
/// use slirc_tmi::util::first_line;
///
/// assert_eq!(first_line("hello\r\nPRIVMSG #x :evil"), "hello");
/// assert_eq!(first_line("hi\0there"), "hi");
/// assert_eq!(first_line("no breaks"), "no breaks");
/// ```
#[inline]
pub fn first_line(s: &str) -> &str {
    match s.find(['\r', '\n', '\0']) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Truncates a string to at most `max_chars` characters.
///
/// # Examples
///
/// ```
/// use slirc_tmi::util::truncate_chars;
///
/// assert_eq!(truncate_chars("hello", 3), "hel");
/// assert_eq!(truncate_chars("héllo", 3), "hél");
/// assert_eq!(truncate_chars("👋🌍🚀", 2), "👋🌍");
/// ```
#[inline]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Prepare free text for a `PRIVMSG`: first line only, capped at
/// [`MAX_CHAT_CHARS`].
pub fn sanitize_chat_text(s: &str) -> &str {
    truncate_chars(first_line(s), MAX_CHAT_CHARS)
}
