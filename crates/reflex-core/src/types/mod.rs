//! Type descriptors
//!
//! A [`TypeDescriptor`] describes one storage type: a primitive, an enum or a
//! flag set. Primitive descriptors are created once on first use and shared
//! for the lifetime of the process; enum and flag descriptors are built with
//! [`EnumBuilder`] and receive a process-unique type ID.
//!
//! Unregistered or erased types resolve to [`TypeDescriptor::unknown`], which
//! answers every query with an empty result instead of failing.

mod convert;
mod value;

pub use convert::RttiType;
pub use value::{Color3, Color4, TypeKind, Value};

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::error::{RttiError, RttiResult};

/// Shared handle to a type descriptor
pub type TypeRef = Arc<TypeDescriptor>;

/// First type ID handed out to enum and flag types
pub const FIRST_ENUM_TYPE_ID: i32 = 1000;

static NEXT_ENUM_TYPE_ID: AtomicI32 = AtomicI32::new(FIRST_ENUM_TYPE_ID);

static UNKNOWN: Lazy<TypeRef> = Lazy::new(|| {
    Arc::new(TypeDescriptor {
        type_id: TypeKind::Unknown.id(),
        type_name: String::new(),
        storage: TypeKind::Unknown,
        flavor: Flavor::Plain,
        entries: Vec::new(),
    })
});

static PRIMITIVES: Lazy<FxHashMap<TypeKind, TypeRef>> = Lazy::new(|| {
    TypeKind::PRIMITIVES
        .iter()
        .map(|&kind| {
            let desc = TypeDescriptor {
                type_id: kind.id(),
                type_name: kind.name().to_string(),
                storage: kind,
                flavor: Flavor::Plain,
                entries: Vec::new(),
            };
            (kind, Arc::new(desc))
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Plain,
    Enum,
    Flag,
}

/// One named value of an enum or flag type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    /// Symbolic name
    pub name: String,
    /// Underlying value, stored in the type's storage kind
    pub value: Value,
    /// Human readable description
    pub description: String,
}

/// Description of a storage type
#[derive(Debug)]
pub struct TypeDescriptor {
    type_id: i32,
    type_name: String,
    storage: TypeKind,
    flavor: Flavor,
    entries: Vec<EnumEntry>,
}

impl TypeDescriptor {
    /// The "unknown type" sentinel
    pub fn unknown() -> TypeRef {
        UNKNOWN.clone()
    }

    /// Shared descriptor of a primitive storage kind
    ///
    /// Returns the unknown sentinel for [`TypeKind::Unknown`].
    pub fn primitive(kind: TypeKind) -> TypeRef {
        PRIMITIVES.get(&kind).cloned().unwrap_or_else(Self::unknown)
    }

    /// Look up a primitive descriptor by its signature name (`"int"`, `"float"`, ...)
    pub fn primitive_by_name(name: &str) -> Option<TypeRef> {
        TypeKind::PRIMITIVES
            .iter()
            .find(|kind| kind.name() == name)
            .map(|&kind| Self::primitive(kind))
    }

    /// Numeric type ID, `-1` for unknown types
    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    /// Type name as used in signatures
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Storage kind of values of this type
    pub fn storage(&self) -> TypeKind {
        self.storage
    }

    /// Whether this is the unknown sentinel
    pub fn is_unknown(&self) -> bool {
        self.type_id == TypeKind::Unknown.id()
    }

    /// Whether this is an enum type
    pub fn is_enum(&self) -> bool {
        self.flavor == Flavor::Enum
    }

    /// Whether this is a flag type
    pub fn is_flag(&self) -> bool {
        self.flavor == Flavor::Flag
    }

    /// Enum entries in declaration order
    pub fn enum_entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// Names of all enum entries in declaration order
    pub fn enum_values(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Underlying value of an enum entry as a string, `None` for unknown names
    pub fn enum_value(&self, name: &str) -> Option<String> {
        self.entry_by_name(name).map(|e| e.value.to_string())
    }

    /// Description of an enum entry, `None` for unknown names
    pub fn enum_description(&self, name: &str) -> Option<&str> {
        self.entry_by_name(name).map(|e| e.description.as_str())
    }

    fn entry_by_name(&self, name: &str) -> Option<&EnumEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn entry_by_value(&self, value: &Value) -> Option<&EnumEntry> {
        self.entries.iter().find(|e| &e.value == value)
    }

    /// Default value of this type
    ///
    /// For enums this is the first entry, for everything else the zero value
    /// of the storage kind.
    pub fn default_value(&self) -> Value {
        match (self.flavor, self.entries.first()) {
            (Flavor::Enum, Some(first)) => first.value.clone(),
            _ => self.storage.default_value(),
        }
    }

    /// Bring a value into this type's storage kind
    ///
    /// With `strict` set, enum values must name an entry of the table.
    pub fn coerce(&self, value: Value, strict: bool) -> RttiResult<Value> {
        if self.is_unknown() {
            return Err(RttiError::TypeMismatch {
                expected: "<unknown>".to_string(),
                got: value.kind().name().to_string(),
            });
        }
        let value = value.coerce(self.storage)?;
        if strict && self.is_enum() && self.entry_by_value(&value).is_none() {
            return Err(RttiError::UnknownEnumValue {
                type_name: self.type_name.clone(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// Parse a string into a value of this type
    ///
    /// Enums parse a symbolic name or the decimal form [`format`](Self::format)
    /// writes for values outside the table; strictness is left to
    /// [`coerce`](Self::coerce). Flags parse `A|B` name lists, where a decimal
    /// number is accepted for bits without a name.
    pub fn parse(&self, input: &str) -> RttiResult<Value> {
        match self.flavor {
            Flavor::Plain => Value::parse(self.storage, input),
            Flavor::Enum => self.parse_enum(input.trim()),
            Flavor::Flag => self.parse_flags(input),
        }
    }

    fn parse_enum(&self, input: &str) -> RttiResult<Value> {
        if let Some(entry) = self.entry_by_name(input) {
            return Ok(entry.value.clone());
        }
        input
            .parse::<i128>()
            .ok()
            .and_then(|raw| Value::from_integer(self.storage, raw))
            .ok_or_else(|| self.unknown_name(input))
    }

    /// Canonical string form of a value of this type
    pub fn format(&self, value: &Value) -> String {
        match self.flavor {
            Flavor::Plain => value.to_string(),
            Flavor::Enum => match self.entry_by_value(value) {
                Some(entry) => entry.name.clone(),
                None => value.to_string(),
            },
            Flavor::Flag => self.format_flags(value),
        }
    }

    fn unknown_name(&self, input: &str) -> RttiError {
        RttiError::UnknownEnumValue {
            type_name: self.type_name.clone(),
            value: input.to_string(),
        }
    }

    fn parse_flags(&self, input: &str) -> RttiResult<Value> {
        let mut bits: i128 = 0;
        for part in input.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(entry) = self.entry_by_name(part) {
                bits |= entry.value.as_integer().unwrap_or(0);
            } else if let Ok(raw) = part.parse::<u64>() {
                bits |= raw as i128;
            } else {
                return Err(self.unknown_name(part));
            }
        }
        Value::from_integer(self.storage, bits).ok_or_else(|| RttiError::ParseError {
            type_name: self.type_name.clone(),
            input: input.to_string(),
        })
    }

    fn format_flags(&self, value: &Value) -> String {
        let Some(mut rest) = value.as_integer() else {
            return value.to_string();
        };
        if rest == 0 {
            return match self.entry_by_value(value) {
                Some(entry) => entry.name.clone(),
                None => "0".to_string(),
            };
        }
        let mut names = Vec::new();
        for entry in &self.entries {
            let bits = entry.value.as_integer().unwrap_or(0);
            if bits != 0 && rest & bits == bits {
                names.push(entry.name.clone());
                rest &= !bits;
            }
        }
        if rest != 0 {
            names.push(rest.to_string());
        }
        names.join("|")
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeDescriptor {}

/// Builder for enum and flag type descriptors
///
/// ```ignore
/// let paint = EnumBuilder::new("Paint")
///     .value("Red", 0, "Red paint")
///     .value("Green", 1, "Green paint")
///     .build()?;
/// ```
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    storage: TypeKind,
    flavor: Flavor,
    entries: Vec<(String, i128, String)>,
}

impl EnumBuilder {
    /// Start an enum type stored as `int`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: TypeKind::Int32,
            flavor: Flavor::Enum,
            entries: Vec::new(),
        }
    }

    /// Start a flag type stored as `uint32`
    pub fn flags(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: TypeKind::UInt32,
            flavor: Flavor::Flag,
            entries: Vec::new(),
        }
    }

    /// Use another integer storage kind
    pub fn storage(mut self, kind: TypeKind) -> Self {
        self.storage = kind;
        self
    }

    /// Add a named value
    pub fn value(mut self, name: impl Into<String>, value: i128, description: impl Into<String>) -> Self {
        self.entries.push((name.into(), value, description.into()));
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> RttiResult<TypeRef> {
        if self.name.is_empty() {
            return Err(RttiError::InvalidRegistration("enum type without a name".to_string()));
        }
        if !self.storage.is_integer() {
            return Err(RttiError::InvalidRegistration(format!(
                "enum type {} must use integer storage, not {}",
                self.name, self.storage
            )));
        }

        let mut entries: Vec<EnumEntry> = Vec::with_capacity(self.entries.len());
        for (name, raw, description) in self.entries {
            if entries.iter().any(|e| e.name == name) {
                return Err(RttiError::InvalidRegistration(format!(
                    "duplicate value '{}' in enum type {}",
                    name, self.name
                )));
            }
            let value = Value::from_integer(self.storage, raw).ok_or_else(|| {
                RttiError::InvalidRegistration(format!(
                    "value {} of '{}' does not fit into {}",
                    raw, name, self.storage
                ))
            })?;
            entries.push(EnumEntry {
                name,
                value,
                description,
            });
        }

        Ok(Arc::new(TypeDescriptor {
            type_id: NEXT_ENUM_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            type_name: self.name,
            storage: self.storage,
            flavor: self.flavor,
            entries,
        }))
    }
}
