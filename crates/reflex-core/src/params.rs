//! Signatures and parameter marshaling
//!
//! Dynamic calls come in two forms: a slice of [`Value`]s checked against a
//! [`Signature`], and a parameter string that is parsed into such a slice.
//! The string form is a whitespace separated list of `key=value` pairs:
//!
//! ```text
//! params  := ws* (pair (ws+ pair)*)? ws*
//! pair    := ident '=' value
//! ident   := [A-Za-z_][A-Za-z0-9_]*
//! value   := '"' chars '"' | '\'' chars '\'' | bare
//! ```
//!
//! Inside quotes `\"`, `\'` and `\\` produce the literal character. Function
//! parameters are bound by key `Param<N>` where `N` is the zero based index.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{RttiError, RttiResult};
use crate::types::{RttiType, TypeRef, Value};

/// Return and parameter types of a function, constructor or event
#[derive(Debug, Clone)]
pub struct Signature {
    ret: TypeRef,
    params: Vec<TypeRef>,
}

impl Signature {
    /// Create a signature
    pub fn new(ret: TypeRef, params: Vec<TypeRef>) -> Self {
        Self { ret, params }
    }

    /// Signature of a typed function `fn(A) -> R`
    pub fn of<R: RttiType, A: ParamPack>() -> Self {
        Self::new(R::type_ref(), A::type_refs())
    }

    /// Return type
    pub fn return_type(&self) -> &TypeRef {
        &self.ret
    }

    /// Parameter types in order
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the parameter types equal the given list
    pub fn params_match(&self, types: &[TypeRef]) -> bool {
        self.params.len() == types.len()
            && self.params.iter().zip(types).all(|(a, b)| a.type_id() == b.type_id())
    }

    /// Parameter list without the return type, e.g. `(int,float)`
    pub fn param_list(&self) -> String {
        let names: Vec<&str> = self.params.iter().map(|t| t.type_name()).collect();
        format!("({})", names.join(","))
    }

    /// Check arity and bring every argument into its parameter type
    ///
    /// `strict` is forwarded to enum parameter checks.
    pub fn check_args(&self, args: &[Value], strict: bool) -> RttiResult<Vec<Value>> {
        if args.len() != self.params.len() {
            return Err(RttiError::ArityMismatch {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        self.params
            .iter()
            .zip(args)
            .map(|(ty, arg)| ty.coerce(arg.clone(), strict))
            .collect()
    }

    /// Parse a parameter string into typed arguments
    pub fn parse_args(&self, input: &str) -> RttiResult<Vec<Value>> {
        let raw = bind_indexed(&parse_params(input)?, self.params.len())?;
        self.params
            .iter()
            .zip(raw)
            .map(|(ty, s)| ty.parse(&s))
            .collect()
    }

    /// Canonical string of a return value
    pub fn format_return(&self, value: &Value) -> String {
        self.ret.format(value)
    }

    /// Format typed arguments as a parameter string
    pub fn format_args(&self, args: &[Value]) -> String {
        let pairs: Vec<(String, String)> = self
            .params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (ty, v))| (format!("Param{}", i), ty.format(v)))
            .collect();
        format_params(&pairs)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.ret.type_name(), self.param_list())
    }
}

/// Parse a parameter string into `(key, value)` pairs in input order
pub fn parse_params(input: &str) -> RttiResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = input.char_indices().peekable();

    loop {
        skip_whitespace(&mut chars);
        let Some(&(start, first)) = chars.peek() else {
            break;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(invalid(format!("expected a key at offset {}", start)));
        }

        let mut key = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                key.push(c);
                chars.next();
            } else {
                break;
            }
        }
        match chars.next() {
            Some((_, '=')) => {}
            _ => return Err(invalid(format!("expected '=' after key '{}'", key))),
        }

        let value = match chars.peek() {
            Some(&(_, quote @ ('"' | '\''))) => {
                chars.next();
                read_quoted(&mut chars, quote, &key)?
            }
            _ => read_bare(&mut chars, &key)?,
        };

        // Pairs must be separated by whitespace
        if let Some(&(offset, c)) = chars.peek() {
            if !c.is_whitespace() {
                return Err(invalid(format!("unexpected '{}' at offset {}", c, offset)));
            }
        }
        pairs.push((key, value));
    }

    Ok(pairs)
}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<CharIndices<'_>>, quote: char, key: &str) -> RttiResult<String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, '\\')) => match chars.next() {
                Some((_, c @ ('"' | '\'' | '\\'))) => value.push(c),
                Some((_, c)) => {
                    value.push('\\');
                    value.push(c);
                }
                None => break,
            },
            Some((_, c)) if c == quote => return Ok(value),
            Some((_, c)) => value.push(c),
            None => break,
        }
    }
    Err(invalid(format!("unterminated value for '{}'", key)))
}

fn read_bare(chars: &mut Peekable<CharIndices<'_>>, key: &str) -> RttiResult<String> {
    let mut value = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        if c == '"' || c == '\'' {
            return Err(invalid(format!("quote inside bare value for '{}'", key)));
        }
        value.push(c);
        chars.next();
    }
    Ok(value)
}

fn invalid(msg: String) -> RttiError {
    RttiError::InvalidParams(msg)
}

/// Quote a value for a parameter string
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Format `(key, value)` pairs as a parameter string with quoted values
pub fn format_params(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, quote(v)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order `Param<N>` pairs by index
///
/// Every index below `arity` must appear exactly once and no other key is
/// allowed.
pub fn bind_indexed(pairs: &[(String, String)], arity: usize) -> RttiResult<Vec<String>> {
    let mut slots: Vec<Option<String>> = vec![None; arity];
    for (key, value) in pairs {
        let index: usize = key
            .strip_prefix("Param")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| invalid(format!("unexpected key '{}'", key)))?;
        let slot = slots.get_mut(index).ok_or(RttiError::ArityMismatch {
            expected: arity,
            got: index + 1,
        })?;
        if slot.is_some() {
            return Err(invalid(format!("duplicate key '{}'", key)));
        }
        *slot = Some(value.clone());
    }

    let supplied = slots.iter().filter(|s| s.is_some()).count();
    if supplied != arity {
        return Err(RttiError::ArityMismatch {
            expected: arity,
            got: supplied,
        });
    }
    Ok(slots.into_iter().flatten().collect())
}

/// A tuple of [`RttiType`]s usable as a typed parameter pack
pub trait ParamPack: Sized {
    /// Parameter types in order
    fn type_refs() -> Vec<TypeRef>;

    /// Wrap each element into a value
    fn into_values(self) -> Vec<Value>;

    /// Extract from checked arguments
    fn from_values(values: &[Value]) -> RttiResult<Self>;
}

macro_rules! impl_param_pack {
    ($len:expr; $($name:ident : $idx:tt),*) => {
        impl<$($name: RttiType),*> ParamPack for ($($name,)*) {
            fn type_refs() -> Vec<TypeRef> {
                vec![$($name::type_ref()),*]
            }

            #[allow(clippy::unused_unit)]
            fn into_values(self) -> Vec<Value> {
                vec![$(self.$idx.into_value()),*]
            }

            #[allow(unused_variables, clippy::unused_unit)]
            fn from_values(values: &[Value]) -> RttiResult<Self> {
                if values.len() != $len {
                    return Err(RttiError::ArityMismatch {
                        expected: $len,
                        got: values.len(),
                    });
                }
                Ok(($($name::from_value(&values[$idx])?,)*))
            }
        }
    };
}

impl_param_pack!(0;);
impl_param_pack!(1; A: 0);
impl_param_pack!(2; A: 0, B: 1);
impl_param_pack!(3; A: 0, B: 1, C: 2);
impl_param_pack!(4; A: 0, B: 1, C: 2, D: 3);
impl_param_pack!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_param_pack!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_param_pack!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_param_pack!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeDescriptor, TypeKind};

    fn pairs(input: &str) -> Vec<(String, String)> {
        parse_params(input).unwrap()
    }

    #[test]
    fn test_parse_quoting_styles() {
        let p = pairs(r#"Param0=200 Param1='0.753' Param2="hello world""#);
        assert_eq!(
            p,
            vec![
                ("Param0".to_string(), "200".to_string()),
                ("Param1".to_string(), "0.753".to_string()),
                ("Param2".to_string(), "hello world".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_escapes() {
        let p = pairs(r#"Text="say \"hi\" \\ there" Other='it\'s'"#);
        assert_eq!(p[0].1, r#"say "hi" \ there"#);
        assert_eq!(p[1].1, "it's");
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert!(pairs("").is_empty());
        assert!(pairs("   \t ").is_empty());
        assert_eq!(pairs(r#"  A=""  "#), vec![("A".to_string(), String::new())]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_params("=1").is_err());
        assert!(parse_params("A 1").is_err());
        assert!(parse_params(r#"A="open"#).is_err());
        assert!(parse_params(r#"A="1"B="2""#).is_err());
        assert!(parse_params("A=x\"y").is_err());
    }

    #[test]
    fn test_quote_round_trip() {
        let value = r#"a "quoted" \ value"#;
        let formatted = format_params(&[("Text".to_string(), value.to_string())]);
        assert_eq!(pairs(&formatted)[0].1, value);
    }

    #[test]
    fn test_bind_indexed_any_order() {
        let bound = bind_indexed(&pairs("Param1=b Param0=a"), 2).unwrap();
        assert_eq!(bound, vec!["a", "b"]);
    }

    #[test]
    fn test_bind_indexed_errors() {
        assert!(matches!(
            bind_indexed(&pairs("Param0=a"), 2),
            Err(RttiError::ArityMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            bind_indexed(&pairs("Param0=a Param2=c"), 2),
            Err(RttiError::ArityMismatch { .. })
        ));
        assert!(matches!(
            bind_indexed(&pairs("Param0=a Param0=b"), 1),
            Err(RttiError::InvalidParams(_))
        ));
        assert!(matches!(
            bind_indexed(&pairs("Speed=1"), 1),
            Err(RttiError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_signature_display() {
        let sig = Signature::of::<i32, (i32, i32)>();
        assert_eq!(sig.to_string(), "int(int,int)");
        assert_eq!(Signature::of::<(), ()>().to_string(), "void()");
        assert_eq!(sig.arity(), 2);
    }

    #[test]
    fn test_signature_parse_and_check() {
        let sig = Signature::of::<i32, (i32, f32)>();
        let args = sig.parse_args(r#"Param0="2" Param1='0.5'"#).unwrap();
        assert_eq!(args, vec![Value::Int32(2), Value::Float(0.5)]);
        assert!(sig.parse_args("Param0=x Param1=1").is_err());

        let checked = sig.check_args(&[Value::Int64(3), Value::Float(1.0)], true).unwrap();
        assert_eq!(checked[0], Value::Int32(3));
        assert!(sig.check_args(&[Value::Int32(3)], true).is_err());
        assert_eq!(sig.format_args(&checked), r#"Param0="3" Param1="1""#);
    }

    #[test]
    fn test_params_match() {
        let sig = Signature::of::<(), (i32, String)>();
        let int = TypeDescriptor::primitive(TypeKind::Int32);
        let string = TypeDescriptor::primitive(TypeKind::String);
        assert!(sig.params_match(&[int.clone(), string]));
        assert!(!sig.params_match(&[int]));
    }

    #[test]
    fn test_param_pack() {
        let values = (1u8, String::from("x"), true).into_values();
        assert_eq!(values.len(), 3);
        let back = <(u8, String, bool)>::from_values(&values).unwrap();
        assert_eq!(back, (1, "x".to_string(), true));
        assert!(<(u8,)>::from_values(&values).is_err());
        assert!(<()>::type_refs().is_empty());
    }
}
