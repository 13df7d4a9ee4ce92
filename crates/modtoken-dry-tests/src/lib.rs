// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for modtoken crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`ident`] - Deterministic identity sources
//! - [`hasher`] - Hasher that records every input it digests
//! - [`fixtures`] - Metadata graphs used across the test suite

pub mod fixtures;
pub mod hasher;
pub mod ident;

pub use fixtures::{circular_value, providers_with, single_empty_provider};
pub use hasher::RecordingHasher;
pub use ident::{FixedIdentitySource, SequenceIdentitySource};
