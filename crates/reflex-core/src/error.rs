//! Error types for the object model

use thiserror::Error;

/// Errors reported by registration, dynamic access and dynamic calls
///
/// Pure lookups (`get_class`, `member`, enum value queries) return `Option`
/// instead; these variants cover operations that can fail for more than one
/// reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RttiError {
    /// No class with this name is registered
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// The class has no member with this name (or not of the expected kind)
    #[error("Class '{class}' has no member '{member}'")]
    MemberNotFound {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// A name or value is not part of an enum table
    #[error("'{value}' is not a value of enum type {type_name}")]
    UnknownEnumValue {
        /// Enum type name
        type_name: String,
        /// Offending name or value
        value: String,
    },

    /// No module with this id is registered
    #[error("Module not found: {0}")]
    ModuleNotFound(u32),

    /// A value has the wrong storage type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// A string cannot be parsed into the target type
    #[error("Cannot parse '{input}' as {type_name}")]
    ParseError {
        /// Target type name
        type_name: String,
        /// Input string
        input: String,
    },

    /// Wrong number of parameters
    #[error("Expected {expected} parameters, got {got}")]
    ArityMismatch {
        /// Declared parameter count
        expected: usize,
        /// Supplied parameter count
        got: usize,
    },

    /// Malformed parameter string
    #[error("Invalid parameter string: {0}")]
    InvalidParams(String),

    /// No constructor accepts the given parameters
    #[error("Class '{class}' has no constructor matching {signature}")]
    NoMatchingConstructor {
        /// Class name
        class: String,
        /// Parameter signature or input that failed to match
        signature: String,
    },

    /// A class with this name is already registered
    #[error("Class already registered: {0}")]
    DuplicateClass(String),

    /// A class declares the same member name twice
    #[error("Class '{class}' already has a member '{member}'")]
    DuplicateMember {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// The base class chain loops back on itself
    #[error("Cyclic inheritance: {0}")]
    CyclicInheritance(String),

    /// A base class link cannot be resolved
    #[error("Class '{class}' derives from unknown class '{base}'")]
    MissingBaseClass {
        /// Derived class name
        class: String,
        /// Unresolved base class name
        base: String,
    },

    /// A descriptor is malformed
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for object model operations
pub type RttiResult<T> = Result<T, RttiError>;

/// Errors that can occur while loading `reflex.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A setting is out of range
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for RttiError {
    fn from(err: ConfigError) -> Self {
        RttiError::Config(err.to_string())
    }
}
