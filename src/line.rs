//! Line-based codec for tokio.
//!
//! Decoding splits the receive buffer on CR, LF or CRLF and yields one
//! `String` per non-empty line. An incomplete line stays buffered until
//! the rest of it arrives, so a line split across two reads is decoded
//! exactly once. Encoding writes a [`ClientCommand`] followed by CRLF.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::command::ClientCommand;
use crate::error::ProtocolError;

/// Maximum accepted line length in bytes, terminator excluded.
pub const MAX_LINE_LEN: usize = 16 * 1024;

/// Line codec for the TMI connection.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for a terminator
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Dropping an over-long line until its terminator shows up
    discarding: bool,
    /// Last line ended in a bare CR at the end of the buffer; swallow a
    /// leading LF on the next call
    skip_lf: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
            skip_lf: false,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Validate that an outbound line contains no line breaks or NUL.
    fn validate_line(s: &str) -> Result<(), ProtocolError> {
        match s.chars().find(|&ch| matches!(ch, '\r' | '\n' | '\0')) {
            Some(ch) => Err(ProtocolError::IllegalControlChar(ch)),
            None => Ok(()),
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        loop {
            if self.skip_lf {
                match src.first() {
                    Some(b'\n') => {
                        src.advance(1);
                        self.skip_lf = false;
                    }
                    Some(_) => self.skip_lf = false,
                    None => return Ok(None),
                }
            }

            let Some(offset) = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n' || *b == b'\r')
            else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.max_len {
                    warn!(
                        buffered = src.len(),
                        limit = self.max_len,
                        "discarding over-long line"
                    );
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let end = self.next_index + offset;
            self.next_index = 0;
            let line = src.split_to(end);
            let terminator = src[0];
            src.advance(1);
            if terminator == b'\r' {
                match src.first() {
                    Some(b'\n') => src.advance(1),
                    Some(_) => {}
                    None => self.skip_lf = true,
                }
            }

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "discarding over-long line");
                continue;
            }

            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        // Unterminated final line: hand it out rather than dropping it.
        self.next_index = 0;
        if src.is_empty() || self.discarding {
            src.clear();
            self.discarding = false;
            return Ok(None);
        }
        let line = src.split_to(src.len());
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

impl Encoder<ClientCommand> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, cmd: ClientCommand, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = cmd.to_string();
        Self::validate_line(&line)?;

        if line.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_decode_crlf_lines() {
        let mut codec = LineCodec::new();
        let mut buf =
            BytesMut::from(&b"PING :tmi.twitch.tv\r\n:a!a@a.tmi.twitch.tv JOIN #c\r\n"[..]);
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec!["PING :tmi.twitch.tv", ":a!a@a.tmi.twitch.tv JOIN #c"]
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line_across_reads() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :tmi.tw"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"itch.tv\r\nPI");
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("PING :tmi.twitch.tv")
        );
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"PI");
    }

    #[test]
    fn test_decode_crlf_split_between_reads() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"first\r"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("first"));
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\nsecond\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["second"]);
    }

    #[test]
    fn test_decode_bare_lf_and_cr() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"a\nb\rc\r\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_decode_skips_empty_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"\r\n\r\nx\r\n\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["x"]);
    }

    #[test]
    fn test_decode_discards_over_long_line() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"abc\r\nok\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["ok"]);
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"hi \xff\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("hi \u{FFFD}")
        );
    }

    #[test]
    fn test_decode_eof_flushes_unterminated_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"done\r\ntail"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("done"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("tail"));
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(ClientCommand::Join("#chan".into()), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"JOIN #chan\r\n");
    }

    #[test]
    fn test_encode_rejects_embedded_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let err = codec
            .encode(ClientCommand::Nick("a\nb".into()), &mut buf)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IllegalControlChar('\n')));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_rejects_over_long_line() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::new();
        let err = codec
            .encode(ClientCommand::Join("#a-very-long-channel".into()), &mut buf)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { .. }));
    }
}
