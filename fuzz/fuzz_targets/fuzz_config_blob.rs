//! Fuzz target: postcard configuration blob
//!
//! Verifies that arbitrary bytes never panic the config decoder and that
//! anything it accepts also passes validation.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;

use bootmenu::config::{decode_config, load_config_or_default, validate_config};

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = decode_config(data) {
        assert!(validate_config(&cfg).is_ok());
    }
    let cfg = load_config_or_default(Some(data));
    assert!(validate_config(&cfg).is_ok());
});
