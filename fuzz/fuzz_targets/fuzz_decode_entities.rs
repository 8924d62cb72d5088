#![no_main]

//! Fuzz target for HTML entity decoding of descriptions and comments.

use libfuzzer_sys::fuzz_target;

use jira_migrate::html::decode_entities;

fuzz_target!(|text: &str| {
    let decoded = decode_entities(Some(text));
    // Every reference is at least as long as the UTF-8 it decodes to.
    assert!(decoded.len() <= text.len());
});
