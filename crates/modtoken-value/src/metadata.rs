// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builder for the conventional dynamic-module metadata shape.

use crate::module_type::ModuleType;
use crate::value::{Record, Sequence, Value};

/// Builds a dynamic-module [`Record`] with a fixed field order.
///
/// Fields are emitted as `module`, `global`, `imports`, `controllers`,
/// `providers`, `exports`; unset fields are omitted. Since record field order is
/// part of the canonical form, routing construction through this builder keeps
/// equivalent modules hashing the same no matter which setter ran first.
#[derive(Clone, Debug, Default)]
pub struct ModuleMetadata {
    module: Option<Value>,
    global: Option<bool>,
    imports: Option<Sequence>,
    controllers: Option<Sequence>,
    providers: Option<Sequence>,
    exports: Option<Sequence>,
}

impl ModuleMetadata {
    /// Start metadata for `module`.
    pub fn new(module: &ModuleType) -> Self {
        Self {
            module: Some(Value::from(module)),
            ..Self::default()
        }
    }

    /// Start metadata without a `module` field.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Mark the module as global.
    pub fn global(mut self, global: bool) -> Self {
        self.global = Some(global);
        self
    }

    /// Imported modules.
    pub fn imports(mut self, imports: Sequence) -> Self {
        self.imports = Some(imports);
        self
    }

    /// Controllers.
    pub fn controllers(mut self, controllers: Sequence) -> Self {
        self.controllers = Some(controllers);
        self
    }

    /// Providers.
    pub fn providers(mut self, providers: Sequence) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Exported tokens or modules.
    pub fn exports(mut self, exports: Sequence) -> Self {
        self.exports = Some(exports);
        self
    }

    /// Produce the metadata record.
    pub fn build(self) -> Record {
        let record = Record::new();
        if let Some(module) = self.module {
            record.insert("module", module);
        }
        if let Some(global) = self.global {
            record.insert("global", global);
        }
        let lists = [
            ("imports", self.imports),
            ("controllers", self.controllers),
            ("providers", self.providers),
            ("exports", self.exports),
        ];
        for (key, list) in lists {
            if let Some(list) = list {
                record.insert(key, list);
            }
        }
        record
    }
}
