//! Configurable yet non-changing constants for the Fusion front end.

/// The default extension of Fusion source files, e.g. `Root.fusion`.
pub const DEFAULT_FILE_EXTENSION: &str = "fusion";
/// The name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "fusion.toml";

/// Every key starting with this prefix is reserved for the merged tree itself.
pub const RESERVED_KEY_PREFIX: &str = "__";

pub const META_KEY: &str = "__meta";
pub const PROTOTYPES_KEY: &str = "__prototypes";
pub const VALUE_KEY: &str = "__value";
pub const EEL_EXPRESSION_KEY: &str = "__eelExpression";
pub const OBJECT_TYPE_KEY: &str = "__objectType";
pub const PROTOTYPE_OBJECT_NAME_KEY: &str = "__prototypeObjectName";
pub const PROTOTYPE_CHAIN_KEY: &str = "__prototypeChain";
pub const STOP_INHERITANCE_CHAIN_KEY: &str = "__stopInheritanceChain";
/// Keys that only the merged tree itself may write. A literal path segment
/// spelling one of them out is rejected.
pub const RESERVED_KEYS: &[&str] = &[
    META_KEY,
    PROTOTYPES_KEY,
    STOP_INHERITANCE_CHAIN_KEY,
    PROTOTYPE_OBJECT_NAME_KEY,
    PROTOTYPE_CHAIN_KEY,
    VALUE_KEY,
    EEL_EXPRESSION_KEY,
    OBJECT_TYPE_KEY,
];

/// The meta property that marks a prototype property as private.
pub const PRIVATE_META_NAME: &str = "private";

pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_KEY_PREFIX) && RESERVED_KEYS.contains(&key)
}
