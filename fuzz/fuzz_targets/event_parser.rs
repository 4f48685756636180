//! Fuzz target for TMI line parsing
//!
//! Feeds arbitrary lines to `Event::parse`, which must classify every
//! input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_tmi::Event;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        let event = Event::parse(input);
        let _ = event.kind();
        let _ = event.channel();
    }
});
