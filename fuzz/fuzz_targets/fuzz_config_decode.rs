//! Fuzz target: `SystemConfig` decoding
//!
//! Decodes arbitrary bytes as postcard and as JSON.  Any config that
//! decodes and passes `validate()` must survive a re-encode unchanged.
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use cooplight::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = postcard::from_bytes::<SystemConfig>(data) {
        if config.validate().is_ok() {
            let bytes = postcard::to_allocvec(&config).unwrap();
            let again: SystemConfig = postcard::from_bytes(&bytes).unwrap();
            assert_eq!(again, config);
            assert!(config.ticks_per_status() >= 1);
        }
    }

    if let Ok(config) = serde_json::from_slice::<SystemConfig>(data) {
        if config.validate().is_ok() {
            let json = serde_json::to_string(&config).unwrap();
            let again: SystemConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(again, config);
        }
    }
});
