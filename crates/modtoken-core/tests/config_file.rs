// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Loading tokenizer configuration from disk.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use modtoken_core::value::{ModuleType, Record};
use modtoken_core::{CachePolicy, ConfigError, DynamicMetadata, ModuleTokenFactory, TokenizerConfig};

fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn file_config_drives_factory() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let file = write_config(
        r#"{ "cache_policy": "reference_identity", "identity_bytes": 32, "cache_fast_path": false }"#,
    );
    let config = TokenizerConfig::from_path(file.path()).unwrap();
    assert_eq!(config.cache_policy, CachePolicy::ReferenceIdentity);
    assert_eq!(config.identity_bytes, 32);
    assert!(!config.cache_fast_path);
    assert!(config.cache_general_path);

    let factory = ModuleTokenFactory::with_config(config).unwrap();
    let ty = ModuleType::new("Configured");
    assert_eq!(factory.module_id(&ty).as_str().len(), 64);

    let meta = DynamicMetadata::from(Record::new().with("global", true));
    assert_eq!(factory.create(&ty, Some(&meta)), factory.create(&ty, Some(&meta)));
    assert_eq!(factory.create(&ty, None), factory.create(&ty, None));
    let stats = factory.cache_stats();
    assert_eq!((stats.fast_hits, stats.fast_misses), (0, 0));
    assert_eq!((stats.general_hits, stats.general_misses), (1, 1));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = write_config("{ not json");
    let err = TokenizerConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("[CONFIG_PARSE]"));
}

#[test]
fn weak_identity_in_file_is_rejected() {
    let file = write_config(r#"{ "identity_bytes": 15 }"#);
    let err = TokenizerConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::IdentityTooShort { got: 15, .. }));
}
