// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The tokenizer façade.

use std::sync::Arc;

use modtoken_value::{ModuleMetadata, ModuleType, Record, Value};
use tracing::{debug, trace};

use crate::cache::{CacheStats, TokenCache};
use crate::canonical::encode;
use crate::compose::{Blake3Hasher, Token, TokenComposer, TokenHasher};
use crate::config::{CachePolicy, TokenizerConfig};
use crate::error::ConfigError;
use crate::ident::{IdentityAssigner, IdentitySource, ModuleIdentity, RandomIdentitySource};

/// Metadata that carries its own identity.
///
/// The identity is minted once at construction. Passing a stamped module to
/// [`ModuleTokenFactory::create`] returns that identity verbatim, so separately
/// declared module descriptions can share one token without content hashing.
#[derive(Clone, Debug)]
pub struct StampedModule(Arc<StampedInner>);

#[derive(Debug)]
struct StampedInner {
    identity: ModuleIdentity,
    metadata: Record,
}

impl StampedModule {
    /// Stamp `metadata` with a fresh random identity.
    pub fn new(metadata: ModuleMetadata) -> Self {
        Self::from_record(metadata.build())
    }

    /// Stamp an already built record with a fresh random identity.
    pub fn from_record(metadata: Record) -> Self {
        Self::with_source(metadata, &RandomIdentitySource::default())
    }

    /// Stamp `metadata` with an identity drawn from `source`.
    pub fn with_source(metadata: Record, source: &impl IdentitySource) -> Self {
        Self(Arc::new(StampedInner {
            identity: ModuleIdentity::new(source.generate()),
            metadata,
        }))
    }

    /// The stamped identity.
    pub fn identity(&self) -> &ModuleIdentity {
        &self.0.identity
    }

    /// The wrapped metadata.
    pub fn metadata(&self) -> &Record {
        &self.0.metadata
    }
}

/// Optional metadata passed alongside a module type.
#[derive(Clone, Debug)]
pub enum DynamicMetadata {
    /// Arbitrary metadata graph, tokenized by content.
    Plain(Value),
    /// Metadata with a pre-assigned identity.
    Stamped(StampedModule),
}

impl From<Value> for DynamicMetadata {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<Record> for DynamicMetadata {
    fn from(record: Record) -> Self {
        Self::Plain(Value::Record(record))
    }
}

impl From<ModuleMetadata> for DynamicMetadata {
    fn from(metadata: ModuleMetadata) -> Self {
        Self::Plain(Value::Record(metadata.build()))
    }
}

impl From<StampedModule> for DynamicMetadata {
    fn from(stamped: StampedModule) -> Self {
        Self::Stamped(stamped)
    }
}

/// Produces deduplication tokens for module definitions.
///
/// Per call, exactly one of these applies, checked in order:
///
/// 1. **Pre-stamped** metadata: its identity is the token.
/// 2. **Bootstrap** type: a fresh random token, never cached. It is drawn
///    from the thread RNG, not from the factory's identity source.
/// 3. **No metadata** (`None` or [`Value::Undefined`]): fast path,
///    `digest(identity + "_" + name)`.
/// 4. **Metadata**: canonical encoding → [`OpaqueTokenRecord`] → digest.
///    Recomputed every call under [`CachePolicy::ContentHash`], memoized per
///    metadata object under [`CachePolicy::ReferenceIdentity`].
///
/// [`OpaqueTokenRecord`]: crate::OpaqueTokenRecord
///
/// The factory is `Send + Sync`; all shared state sits behind the assigner's
/// and cache's locks.
pub struct ModuleTokenFactory<S = RandomIdentitySource, H = Blake3Hasher> {
    config: TokenizerConfig,
    assigner: IdentityAssigner<S>,
    composer: TokenComposer<H>,
    cache: TokenCache,
    bootstrap: ModuleType,
}

impl ModuleTokenFactory {
    /// Factory with default configuration, random identities and BLAKE3.
    pub fn new() -> Self {
        Self::from_parts(
            TokenizerConfig::default(),
            RandomIdentitySource::default(),
            Blake3Hasher,
        )
    }

    /// Factory with a validated configuration.
    pub fn with_config(config: TokenizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = RandomIdentitySource::new(config.identity_bytes);
        Ok(Self::from_parts(config, source, Blake3Hasher))
    }

    /// Name used for `ty` in token records.
    pub fn module_name(ty: &ModuleType) -> &str {
        ty.name()
    }
}

impl Default for ModuleTokenFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdentitySource, H: TokenHasher> ModuleTokenFactory<S, H> {
    /// Factory over explicit collaborators. `config` is validated.
    pub fn with_parts(config: TokenizerConfig, source: S, hasher: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, source, hasher))
    }

    fn from_parts(config: TokenizerConfig, source: S, hasher: H) -> Self {
        Self {
            config,
            assigner: IdentityAssigner::new(source),
            composer: TokenComposer::new(hasher),
            cache: TokenCache::new(),
            bootstrap: ModuleType::bootstrap(),
        }
    }

    /// Replace the reserved bootstrap type.
    pub fn with_bootstrap(mut self, bootstrap: ModuleType) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Token for `ty` with optional dynamic metadata.
    pub fn create(&self, ty: &ModuleType, dynamic: Option<&DynamicMetadata>) -> Token {
        let value = match dynamic {
            Some(DynamicMetadata::Stamped(stamped)) => {
                trace!(module = ty.name(), "pre-stamped metadata");
                return Token::from(stamped.identity());
            }
            Some(DynamicMetadata::Plain(value)) if !value.is_undefined() => Some(value),
            Some(DynamicMetadata::Plain(_)) | None => None,
        };

        if ty.ptr_eq(&self.bootstrap) {
            debug!(module = ty.name(), "bootstrap module bypasses tokenization");
            let fresh = RandomIdentitySource::new(self.config.identity_bytes).generate();
            return Token::new(fresh);
        }

        let id = self.assigner.get_or_create(ty);
        let name = ModuleTokenFactory::module_name(ty);
        match value {
            None => self.fast_token(ty, &id, name),
            Some(value) => self.general_token(ty, &id, name, value),
        }
    }

    /// Identity assigned to `ty`, assigning one if needed.
    pub fn module_id(&self, ty: &ModuleType) -> ModuleIdentity {
        self.assigner.get_or_create(ty)
    }

    /// Active configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// The identity assigner.
    pub fn assigner(&self) -> &IdentityAssigner<S> {
        &self.assigner
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sweep identity and cache entries for dropped types and metadata
    /// objects. Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        self.assigner.purge() + self.cache.purge()
    }

    fn fast_token(&self, ty: &ModuleType, id: &ModuleIdentity, name: &str) -> Token {
        let make = || {
            self.composer
                .compose_fast(&TokenComposer::<H>::fast_key(id, name))
        };
        if !self.config.cache_fast_path {
            return make();
        }
        self.cache.fast(&ty.anchor(), make)
    }

    fn general_token(
        &self,
        ty: &ModuleType,
        id: &ModuleIdentity,
        name: &str,
        value: &Value,
    ) -> Token {
        let digest = || {
            let encoded = encode(value);
            self.composer.compose(id, name, Some(&encoded))
        };
        match (self.config.cache_policy, value.anchor()) {
            (CachePolicy::ReferenceIdentity, Some(anchor)) if self.config.cache_general_path => {
                self.cache.by_reference(&anchor, &ty.anchor(), digest)
            }
            _ => digest(),
        }
    }
}

impl<S, H> std::fmt::Debug for ModuleTokenFactory<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleTokenFactory")
            .field("config", &self.config)
            .field("bootstrap", &self.bootstrap.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modtoken_value::Sequence;

    fn providers_meta() -> DynamicMetadata {
        Record::new()
            .with("providers", Sequence::new().with(Record::new()))
            .into()
    }

    #[test]
    fn fast_path_is_idempotent() {
        let factory = ModuleTokenFactory::new();
        let ty = ModuleType::new("Module");
        assert_eq!(factory.create(&ty, None), factory.create(&ty, None));
    }

    #[test]
    fn undefined_counts_as_absent() {
        let factory = ModuleTokenFactory::new();
        let ty = ModuleType::new("Module");
        let undefined = DynamicMetadata::Plain(Value::Undefined);
        assert_eq!(factory.create(&ty, Some(&undefined)), factory.create(&ty, None));
    }

    #[test]
    fn metadata_changes_token() {
        let factory = ModuleTokenFactory::new();
        let ty = ModuleType::new("Module");
        assert_ne!(
            factory.create(&ty, Some(&providers_meta())),
            factory.create(&ty, None)
        );
    }

    #[test]
    fn bootstrap_is_never_cached() {
        let factory = ModuleTokenFactory::new();
        let boot = ModuleType::bootstrap();
        assert_ne!(factory.create(&boot, None), factory.create(&boot, None));
        assert_ne!(
            factory.create(&boot, Some(&providers_meta())),
            factory.create(&boot, Some(&providers_meta()))
        );
        assert!(factory.assigner().get(&boot).is_none());
        assert_eq!(factory.cache_stats(), CacheStats::default());
    }

    struct Pinned;

    impl IdentitySource for Pinned {
        fn generate(&self) -> String {
            "pinned".into()
        }
    }

    #[test]
    fn bootstrap_ignores_pinned_identity_source() {
        let factory =
            ModuleTokenFactory::from_parts(TokenizerConfig::default(), Pinned, Blake3Hasher);
        let boot = ModuleType::bootstrap();
        let first = factory.create(&boot, None);
        assert_ne!(first, factory.create(&boot, None));
        assert_ne!(first.as_str(), "pinned");
        assert_eq!(factory.module_id(&ModuleType::new("M")).as_str(), "pinned");
    }

    #[test]
    fn purge_reclaims_entries_of_dropped_types() {
        let config = TokenizerConfig {
            cache_policy: CachePolicy::ReferenceIdentity,
            ..TokenizerConfig::default()
        };
        let factory = ModuleTokenFactory::from_parts(config, Pinned, Blake3Hasher);
        let meta = providers_meta();
        for i in 0..4 {
            let ty = ModuleType::new(format!("Scoped{i}"));
            factory.create(&ty, None);
            factory.create(&ty, Some(&meta));
        }
        // Per type: one identity, one fast entry, one reference pair.
        assert_eq!(factory.purge(), 12);
        assert_eq!(factory.purge(), 0);
    }

    #[test]
    fn content_policy_keeps_no_table() {
        let factory = ModuleTokenFactory::new();
        let ty = ModuleType::new("Module");
        let token = factory.create(&ty, Some(&providers_meta()));
        assert_eq!(token, factory.create(&ty, Some(&providers_meta())));
        let stats = factory.cache_stats();
        assert_eq!((stats.general_hits, stats.general_misses), (0, 0));
        assert_eq!(factory.purge(), 0);
    }

    #[test]
    fn custom_bootstrap_replaces_default() {
        let internal = ModuleType::new("Internal");
        let factory = ModuleTokenFactory::new().with_bootstrap(internal.clone());
        assert_ne!(factory.create(&internal, None), factory.create(&internal, None));
        let boot = ModuleType::bootstrap();
        assert_eq!(factory.create(&boot, None), factory.create(&boot, None));
    }

    #[test]
    fn stamped_identity_wins() {
        let factory = ModuleTokenFactory::new();
        let stamped = StampedModule::from_record(Record::new().with("global", true));
        let meta = DynamicMetadata::from(stamped.clone());
        let a = factory.create(&ModuleType::new("A"), Some(&meta));
        let b = factory.create(&ModuleType::bootstrap(), Some(&meta));
        assert_eq!(a.as_str(), stamped.identity().as_str());
        assert_eq!(a, b);
    }

    #[test]
    fn disabled_caches_still_agree() {
        let config = TokenizerConfig {
            cache_fast_path: false,
            cache_general_path: false,
            ..TokenizerConfig::default()
        };
        let factory = ModuleTokenFactory::with_config(config).unwrap_or_default();
        let ty = ModuleType::new("Module");
        assert_eq!(factory.create(&ty, None), factory.create(&ty, None));
        assert_eq!(
            factory.create(&ty, Some(&providers_meta())),
            factory.create(&ty, Some(&providers_meta()))
        );
        assert_eq!(factory.cache_stats(), CacheStats::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TokenizerConfig {
            identity_bytes: 1,
            ..TokenizerConfig::default()
        };
        assert!(ModuleTokenFactory::with_config(config).is_err());
    }

    #[test]
    fn module_name_is_type_name() {
        let factory = ModuleTokenFactory::new();
        let ty = ModuleType::new("CatsModule");
        assert_eq!(ModuleTokenFactory::module_name(&ty), "CatsModule");
        assert_eq!(factory.module_id(&ty), factory.module_id(&ty));
    }

    #[test]
    fn factory_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModuleTokenFactory>();
    }
}
