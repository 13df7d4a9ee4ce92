// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value graph for dynamic module metadata.
//!
//! A DI container describes a module with a static type ([`ModuleType`]) plus an
//! optional, arbitrarily nested metadata blob. This crate models that blob as a
//! closed [`Value`] enum so the tokenizer in `modtoken-core` can match on it
//! exhaustively instead of probing shapes at runtime.
//!
//! # Identity vs. content
//!
//! Composite values ([`Record`], [`Sequence`]) and the opaque leaves
//! ([`Callable`], [`Marker`], [`ModuleType`]) are `Arc`-backed handles. Cloning a
//! handle shares the underlying node, so a record can hold a reference to itself.
//! Each handle exposes a [`NodeId`] (its address) and a [`WeakAnchor`], which is
//! what identity-keyed caches hold instead of a strong reference.
//!
//! # Cycles
//!
//! Self-referential graphs are legal and leak like any other `Arc` cycle. The
//! `Debug` impls are shallow so printing a cyclic value terminates.
#![forbid(unsafe_code)]

mod anchor;
mod callable;
mod json;
mod marker;
mod metadata;
mod module_type;
mod value;

pub use anchor::{NodeId, WeakAnchor};
pub use callable::{Callable, CallableKind};
pub use marker::Marker;
pub use metadata::ModuleMetadata;
pub use module_type::{ModuleType, BOOTSTRAP_MODULE_NAME};
pub use value::{Record, Sequence, Value, ValueKind};
