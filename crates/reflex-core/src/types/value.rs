//! Dynamic values and their canonical string forms
//!
//! Every attribute slot, method argument and event argument travels through the
//! object model as a [`Value`]. Each value has exactly one canonical string form,
//! produced by `Display` and accepted by [`Value::parse`]:
//!
//! | Kind              | Canonical form                         |
//! |-------------------|----------------------------------------|
//! | `bool`            | `true` / `false`                       |
//! | integers          | decimal                                |
//! | `float`/`double`  | shortest string that round-trips       |
//! | `string`          | verbatim                               |
//! | vectors / colors  | space separated components (`"1 2 3"`) |

use std::fmt;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{RttiError, RttiResult};

/// Storage kind of a value
///
/// Enum and flag types store their underlying integer in one of the
/// integer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Unknown / erased type
    Unknown,
    /// No value
    Void,
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// UTF-8 string
    String,
    /// Two component float vector
    Vector2,
    /// Three component float vector
    Vector3,
    /// Four component float vector
    Vector4,
    /// RGB color
    Color3,
    /// RGBA color
    Color4,
}

impl TypeKind {
    /// All storage kinds with a registered primitive descriptor
    pub const PRIMITIVES: [TypeKind; 18] = [
        TypeKind::Void,
        TypeKind::Bool,
        TypeKind::Int8,
        TypeKind::Int16,
        TypeKind::Int32,
        TypeKind::Int64,
        TypeKind::UInt8,
        TypeKind::UInt16,
        TypeKind::UInt32,
        TypeKind::UInt64,
        TypeKind::Float,
        TypeKind::Double,
        TypeKind::String,
        TypeKind::Vector2,
        TypeKind::Vector3,
        TypeKind::Vector4,
        TypeKind::Color3,
        TypeKind::Color4,
    ];

    /// Numeric type ID (`-1` for unknown)
    pub fn id(self) -> i32 {
        match self {
            TypeKind::Unknown => -1,
            TypeKind::Void => 1,
            TypeKind::Bool => 2,
            TypeKind::Int8 => 3,
            TypeKind::Int16 => 4,
            TypeKind::Int32 => 5,
            TypeKind::Int64 => 6,
            TypeKind::UInt8 => 7,
            TypeKind::UInt16 => 8,
            TypeKind::UInt32 => 9,
            TypeKind::UInt64 => 10,
            TypeKind::Float => 11,
            TypeKind::Double => 12,
            TypeKind::String => 13,
            TypeKind::Vector2 => 20,
            TypeKind::Vector3 => 21,
            TypeKind::Vector4 => 22,
            TypeKind::Color3 => 23,
            TypeKind::Color4 => 24,
        }
    }

    /// Type name used in signatures
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Unknown => "",
            TypeKind::Void => "void",
            TypeKind::Bool => "bool",
            TypeKind::Int8 => "int8",
            TypeKind::Int16 => "int16",
            TypeKind::Int32 => "int",
            TypeKind::Int64 => "int64",
            TypeKind::UInt8 => "uint8",
            TypeKind::UInt16 => "uint16",
            TypeKind::UInt32 => "uint32",
            TypeKind::UInt64 => "uint64",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Vector2 => "vec2",
            TypeKind::Vector3 => "vec3",
            TypeKind::Vector4 => "vec4",
            TypeKind::Color3 => "color3",
            TypeKind::Color4 => "color4",
        }
    }

    /// Whether this kind stores an integer
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKind::Int8
                | TypeKind::Int16
                | TypeKind::Int32
                | TypeKind::Int64
                | TypeKind::UInt8
                | TypeKind::UInt16
                | TypeKind::UInt32
                | TypeKind::UInt64
        )
    }

    /// Default value of this kind
    pub fn default_value(self) -> Value {
        match self {
            TypeKind::Unknown | TypeKind::Void => Value::Void,
            TypeKind::Bool => Value::Bool(false),
            TypeKind::Int8 => Value::Int8(0),
            TypeKind::Int16 => Value::Int16(0),
            TypeKind::Int32 => Value::Int32(0),
            TypeKind::Int64 => Value::Int64(0),
            TypeKind::UInt8 => Value::UInt8(0),
            TypeKind::UInt16 => Value::UInt16(0),
            TypeKind::UInt32 => Value::UInt32(0),
            TypeKind::UInt64 => Value::UInt64(0),
            TypeKind::Float => Value::Float(0.0),
            TypeKind::Double => Value::Double(0.0),
            TypeKind::String => Value::String(String::new()),
            TypeKind::Vector2 => Value::Vector2(Vec2::ZERO),
            TypeKind::Vector3 => Value::Vector3(Vec3::ZERO),
            TypeKind::Vector4 => Value::Vector4(Vec4::ZERO),
            TypeKind::Color3 => Value::Color3(Color3::BLACK),
            TypeKind::Color4 => Value::Color4(Color4::TRANSPARENT),
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RGB color with float components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color3 {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color3 {
    /// Black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// White
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a color from its components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// RGBA color with float components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color4 {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color4 {
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from its components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (return of `void` functions)
    #[default]
    Void,
    /// Boolean
    Bool(bool),
    /// Signed 8-bit integer
    Int8(i8),
    /// Signed 16-bit integer
    Int16(i16),
    /// Signed 32-bit integer
    Int32(i32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 8-bit integer
    UInt8(u8),
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String
    String(String),
    /// Two component vector
    Vector2(Vec2),
    /// Three component vector
    Vector3(Vec3),
    /// Four component vector
    Vector4(Vec4),
    /// RGB color
    Color3(Color3),
    /// RGBA color
    Color4(Color4),
}

impl Value {
    /// Storage kind of this value
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::Void => TypeKind::Void,
            Value::Bool(_) => TypeKind::Bool,
            Value::Int8(_) => TypeKind::Int8,
            Value::Int16(_) => TypeKind::Int16,
            Value::Int32(_) => TypeKind::Int32,
            Value::Int64(_) => TypeKind::Int64,
            Value::UInt8(_) => TypeKind::UInt8,
            Value::UInt16(_) => TypeKind::UInt16,
            Value::UInt32(_) => TypeKind::UInt32,
            Value::UInt64(_) => TypeKind::UInt64,
            Value::Float(_) => TypeKind::Float,
            Value::Double(_) => TypeKind::Double,
            Value::String(_) => TypeKind::String,
            Value::Vector2(_) => TypeKind::Vector2,
            Value::Vector3(_) => TypeKind::Vector3,
            Value::Vector4(_) => TypeKind::Vector4,
            Value::Color3(_) => TypeKind::Color3,
            Value::Color4(_) => TypeKind::Color4,
        }
    }

    /// Integer payload widened to `i128`, if this is an integer
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Int8(v) => Some(v as i128),
            Value::Int16(v) => Some(v as i128),
            Value::Int32(v) => Some(v as i128),
            Value::Int64(v) => Some(v as i128),
            Value::UInt8(v) => Some(v as i128),
            Value::UInt16(v) => Some(v as i128),
            Value::UInt32(v) => Some(v as i128),
            Value::UInt64(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Build an integer value of the given kind, `None` if out of range
    pub fn from_integer(kind: TypeKind, v: i128) -> Option<Value> {
        Some(match kind {
            TypeKind::Int8 => Value::Int8(i8::try_from(v).ok()?),
            TypeKind::Int16 => Value::Int16(i16::try_from(v).ok()?),
            TypeKind::Int32 => Value::Int32(i32::try_from(v).ok()?),
            TypeKind::Int64 => Value::Int64(i64::try_from(v).ok()?),
            TypeKind::UInt8 => Value::UInt8(u8::try_from(v).ok()?),
            TypeKind::UInt16 => Value::UInt16(u16::try_from(v).ok()?),
            TypeKind::UInt32 => Value::UInt32(u32::try_from(v).ok()?),
            TypeKind::UInt64 => Value::UInt64(u64::try_from(v).ok()?),
            _ => return None,
        })
    }

    /// Convert this value into the given storage kind
    ///
    /// Integers convert between widths when the value fits, `float`
    /// widens to `double`. Everything else must match exactly.
    pub fn coerce(self, kind: TypeKind) -> RttiResult<Value> {
        if self.kind() == kind {
            return Ok(self);
        }
        let mismatch = |got: TypeKind| RttiError::TypeMismatch {
            expected: kind.name().to_string(),
            got: got.name().to_string(),
        };
        if kind.is_integer() {
            if let Some(v) = self.as_integer() {
                return Value::from_integer(kind, v).ok_or_else(|| RttiError::ParseError {
                    type_name: kind.name().to_string(),
                    input: v.to_string(),
                });
            }
        }
        match (kind, &self) {
            (TypeKind::Double, Value::Float(v)) => Ok(Value::Double(*v as f64)),
            _ => Err(mismatch(self.kind())),
        }
    }

    /// Parse the canonical string form of a value of the given kind
    pub fn parse(kind: TypeKind, input: &str) -> RttiResult<Value> {
        let err = || RttiError::ParseError {
            type_name: kind.name().to_string(),
            input: input.to_string(),
        };
        let s = input.trim();
        let value = match kind {
            TypeKind::Unknown => return Err(err()),
            TypeKind::Void => {
                if s.is_empty() {
                    Value::Void
                } else {
                    return Err(err());
                }
            }
            TypeKind::Bool => Value::Bool(parse_bool(s).ok_or_else(err)?),
            TypeKind::Int8 => Value::Int8(s.parse().map_err(|_| err())?),
            TypeKind::Int16 => Value::Int16(s.parse().map_err(|_| err())?),
            TypeKind::Int32 => Value::Int32(s.parse().map_err(|_| err())?),
            TypeKind::Int64 => Value::Int64(s.parse().map_err(|_| err())?),
            TypeKind::UInt8 => Value::UInt8(s.parse().map_err(|_| err())?),
            TypeKind::UInt16 => Value::UInt16(s.parse().map_err(|_| err())?),
            TypeKind::UInt32 => Value::UInt32(s.parse().map_err(|_| err())?),
            TypeKind::UInt64 => Value::UInt64(s.parse().map_err(|_| err())?),
            TypeKind::Float => Value::Float(s.parse().map_err(|_| err())?),
            TypeKind::Double => Value::Double(s.parse().map_err(|_| err())?),
            // Strings are taken verbatim, surrounding whitespace included
            TypeKind::String => Value::String(input.to_string()),
            TypeKind::Vector2 => {
                let [x, y] = parse_components::<2>(s).ok_or_else(err)?;
                Value::Vector2(Vec2::new(x, y))
            }
            TypeKind::Vector3 => {
                let [x, y, z] = parse_components::<3>(s).ok_or_else(err)?;
                Value::Vector3(Vec3::new(x, y, z))
            }
            TypeKind::Vector4 => {
                let [x, y, z, w] = parse_components::<4>(s).ok_or_else(err)?;
                Value::Vector4(Vec4::new(x, y, z, w))
            }
            TypeKind::Color3 => {
                let [r, g, b] = parse_components::<3>(s).ok_or_else(err)?;
                Value::Color3(Color3::new(r, g, b))
            }
            TypeKind::Color4 => {
                let [r, g, b, a] = parse_components::<4>(s).ok_or_else(err)?;
                Value::Color4(Color4::new(r, g, b, a))
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Vector2(v) => write!(f, "{} {}", v.x, v.y),
            Value::Vector3(v) => write!(f, "{} {} {}", v.x, v.y, v.z),
            Value::Vector4(v) => write!(f, "{} {} {} {}", v.x, v.y, v.z, v.w),
            Value::Color3(c) => write!(f, "{} {} {}", c.r, c.g, c.b),
            Value::Color4(c) => write!(f, "{} {} {} {}", c.r, c.g, c.b, c.a),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s == "1" || s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s == "0" || s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_components<const N: usize>(s: &str) -> Option<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut parts = s.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
