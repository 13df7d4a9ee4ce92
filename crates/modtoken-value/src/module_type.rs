// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Static module type descriptors.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::anchor::{NodeId, WeakAnchor};
use crate::callable::Callable;

/// Name of the framework's reserved bootstrap module.
pub const BOOTSTRAP_MODULE_NAME: &str = "InternalCoreModule";

#[derive(Debug)]
struct ModuleTypeInner {
    name: String,
}

/// Identity-comparable handle for a module's static type.
///
/// Equality and hashing use the handle's allocation, not its name: two
/// separately created `ModuleType`s named `"AppModule"` are distinct types.
#[derive(Clone, Debug)]
pub struct ModuleType(Arc<ModuleTypeInner>);

impl ModuleType {
    /// Declare a new module type.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ModuleTypeInner { name: name.into() }))
    }

    /// The process-wide reserved bootstrap module type.
    ///
    /// Always returns a handle to the same descriptor.
    pub fn bootstrap() -> Self {
        static BOOTSTRAP: OnceLock<ModuleType> = OnceLock::new();
        BOOTSTRAP
            .get_or_init(|| ModuleType::new(BOOTSTRAP_MODULE_NAME))
            .clone()
    }

    /// Declared name of the module type.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Identity of this descriptor.
    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Non-owning handle to this descriptor.
    pub fn anchor(&self) -> WeakAnchor {
        WeakAnchor::new(&self.0)
    }

    /// Returns `true` if both handles refer to the same descriptor.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The descriptor as a class-like callable, for embedding in metadata.
    pub fn as_callable(&self) -> Callable {
        Callable::constructor(self.name())
    }
}

impl PartialEq for ModuleType {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ModuleType {}

impl Hash for ModuleType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id().hash(state);
    }
}
