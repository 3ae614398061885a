//! Conversion between Rust types and [`Value`]
//!
//! Implement [`RttiType`] to let a Rust type appear in typed attribute,
//! method and event signatures.

use glam::{Vec2, Vec3, Vec4};

use super::{Color3, Color4, TypeDescriptor, TypeKind, TypeRef, Value};
use crate::error::{RttiError, RttiResult};

/// A Rust type with a descriptor and a [`Value`] representation
pub trait RttiType: Sized + 'static {
    /// Descriptor of this type
    fn type_ref() -> TypeRef;

    /// Wrap into a dynamic value
    fn into_value(self) -> Value;

    /// Extract from a dynamic value
    fn from_value(value: &Value) -> RttiResult<Self>;
}

fn mismatch(expected: TypeKind, value: &Value) -> RttiError {
    RttiError::TypeMismatch {
        expected: expected.name().to_string(),
        got: value.kind().name().to_string(),
    }
}

// Integers accept any integer value that fits
macro_rules! impl_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl RttiType for $ty {
                fn type_ref() -> TypeRef {
                    TypeDescriptor::primitive(TypeKind::$kind)
                }

                fn into_value(self) -> Value {
                    Value::$kind(self)
                }

                fn from_value(value: &Value) -> RttiResult<Self> {
                    let wide = value
                        .as_integer()
                        .ok_or_else(|| mismatch(TypeKind::$kind, value))?;
                    <$ty>::try_from(wide).map_err(|_| RttiError::ParseError {
                        type_name: TypeKind::$kind.name().to_string(),
                        input: wide.to_string(),
                    })
                }
            }
        )*
    };
}

impl_integer! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
}

macro_rules! impl_exact {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl RttiType for $ty {
                fn type_ref() -> TypeRef {
                    TypeDescriptor::primitive(TypeKind::$kind)
                }

                fn into_value(self) -> Value {
                    Value::$kind(self)
                }

                fn from_value(value: &Value) -> RttiResult<Self> {
                    match value {
                        Value::$kind(v) => Ok(v.clone()),
                        other => Err(mismatch(TypeKind::$kind, other)),
                    }
                }
            }
        )*
    };
}

impl_exact! {
    bool => Bool,
    f32 => Float,
    String => String,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    Color3 => Color3,
    Color4 => Color4,
}

impl RttiType for f64 {
    fn type_ref() -> TypeRef {
        TypeDescriptor::primitive(TypeKind::Double)
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn from_value(value: &Value) -> RttiResult<Self> {
        match *value {
            Value::Double(v) => Ok(v),
            Value::Float(v) => Ok(v as f64),
            ref other => Err(mismatch(TypeKind::Double, other)),
        }
    }
}

impl RttiType for () {
    fn type_ref() -> TypeRef {
        TypeDescriptor::primitive(TypeKind::Void)
    }

    fn into_value(self) -> Value {
        Value::Void
    }

    fn from_value(value: &Value) -> RttiResult<Self> {
        match value {
            Value::Void => Ok(()),
            other => Err(mismatch(TypeKind::Void, other)),
        }
    }
}
