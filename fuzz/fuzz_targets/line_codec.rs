//! Fuzz target for line framing
//!
//! Splits the input into arbitrary chunks and checks the decoder never
//! panics or yields a line containing a terminator.

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use slirc_tmi::LineCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, rest)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let mut codec = LineCodec::with_max_len(256);
    let mut buf = BytesMut::new();
    for piece in rest.chunks(chunk) {
        buf.extend_from_slice(piece);
        while let Ok(Some(line)) = codec.decode(&mut buf) {
            assert!(!line.contains('\n') && !line.contains('\r'));
        }
    }
    if let Ok(Some(line)) = codec.decode_eof(&mut buf) {
        assert!(!line.contains('\n'));
    }
});
