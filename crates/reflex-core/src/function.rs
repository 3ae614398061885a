//! Dynamic functions and constructors
//!
//! A [`DynamicFunction`] is bound to a class, not to an instance: it receives
//! the object it is called on as its first argument. The string call path is
//! layered on the value path (parse, call, format), and the value path on the
//! typed closure registered by the class.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RttiResult;
use crate::object::Object;
use crate::params::{ParamPack, Signature};
use crate::types::{RttiType, Value};

type Callable = Arc<dyn Fn(&mut Object, &[Value]) -> RttiResult<Value> + Send + Sync>;
type Initializer = Arc<dyn Fn(&mut Object, &[Value]) -> RttiResult<()> + Send + Sync>;

/// A method callable by name with dynamic or string parameters
#[derive(Clone)]
pub struct DynamicFunction {
    signature: Signature,
    callable: Callable,
}

impl DynamicFunction {
    /// Wrap a typed closure `Fn(&mut Object, (A, B, ..)) -> R`
    pub fn new<R, A, F>(f: F) -> Self
    where
        R: RttiType,
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> R + Send + Sync + 'static,
    {
        Self {
            signature: Signature::of::<R, A>(),
            callable: Arc::new(move |obj, args| {
                let pack = A::from_values(args)?;
                Ok(f(obj, pack).into_value())
            }),
        }
    }

    /// Wrap a typed closure that can fail
    pub fn fallible<R, A, F>(f: F) -> Self
    where
        R: RttiType,
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> RttiResult<R> + Send + Sync + 'static,
    {
        Self {
            signature: Signature::of::<R, A>(),
            callable: Arc::new(move |obj, args| {
                let pack = A::from_values(args)?;
                Ok(f(obj, pack)?.into_value())
            }),
        }
    }

    /// Wrap an untyped closure with an explicit signature
    ///
    /// Arguments are checked against the signature before the closure runs.
    pub fn from_dynamic(
        signature: Signature,
        f: impl Fn(&mut Object, &[Value]) -> RttiResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            callable: Arc::new(f),
        }
    }

    /// Return and parameter types
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call with dynamic values
    pub fn call(&self, obj: &mut Object, args: &[Value]) -> RttiResult<Value> {
        let args = self.signature.check_args(args, obj.strict_enums())?;
        let ret = (self.callable)(obj, &args)?;
        self.signature.return_type().coerce(ret, false)
    }

    /// Call with a parameter string, returning the canonical result string
    pub fn call_str(&self, obj: &mut Object, params: &str) -> RttiResult<String> {
        let args = self.signature.parse_args(params).map_err(|err| {
            debug!(signature = %self.signature, params, error = %err, "rejected call parameters");
            err
        })?;
        let ret = self.call(obj, &args)?;
        Ok(self.signature.format_return(&ret))
    }

    /// Call with a typed parameter pack
    pub fn call_typed<R: RttiType, A: ParamPack>(&self, obj: &mut Object, args: A) -> RttiResult<R> {
        R::from_value(&self.call(obj, &args.into_values())?)
    }
}

impl fmt::Debug for DynamicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFunction")
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// Constructor of a class
///
/// The registry allocates the object with default attribute values; the
/// initializer then runs on it with the checked arguments.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    signature: Signature,
    init: Initializer,
}

impl ConstructorDescriptor {
    /// Wrap a typed initializer `Fn(&mut Object, (A, B, ..))`
    pub fn new<A, F>(f: F) -> Self
    where
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> RttiResult<()> + Send + Sync + 'static,
    {
        Self {
            signature: Signature::of::<(), A>(),
            init: Arc::new(move |obj, args| f(obj, A::from_values(args)?)),
        }
    }

    /// Constructor without parameters that keeps the default values
    pub fn default_values() -> Self {
        Self::new(|_: &mut Object, (): ()| Ok(()))
    }

    /// Wrap an untyped initializer with an explicit signature
    pub fn from_dynamic(
        signature: Signature,
        f: impl Fn(&mut Object, &[Value]) -> RttiResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            init: Arc::new(f),
        }
    }

    /// Parameter types (return type is `void`)
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether this constructor takes no parameters
    pub fn is_default(&self) -> bool {
        self.signature.arity() == 0
    }

    pub(crate) fn initialize(&self, obj: &mut Object, args: &[Value]) -> RttiResult<()> {
        let args = self.signature.check_args(args, obj.strict_enums())?;
        (self.init)(obj, &args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("params", &self.signature.param_list())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use crate::error::RttiError;
    use crate::registry::ClassRegistry;
    use crate::types::{TypeDescriptor, TypeKind};

    fn object() -> Object {
        let registry = ClassRegistry::new();
        registry
            .register_class(
                ClassBuilder::new("Counter")
                    .attribute::<i32>("Count", 0, "")
                    .default_constructor("")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry.create_default("Counter").unwrap()
    }

    #[test]
    fn test_typed_function() {
        let add = DynamicFunction::new(|_: &mut Object, (a, b): (i32, i32)| a + b);
        let mut obj = object();
        assert_eq!(add.signature().to_string(), "int(int,int)");
        assert_eq!(add.call(&mut obj, &[Value::Int32(2), Value::Int32(3)]).unwrap(), Value::Int32(5));
        assert_eq!(add.call_str(&mut obj, r#"Param0="2" Param1="3""#).unwrap(), "5");
        assert_eq!(add.call_typed::<i32, _>(&mut obj, (4, 5)).unwrap(), 9);
    }

    #[test]
    fn test_call_failures_are_reported() {
        let add = DynamicFunction::new(|_: &mut Object, (a, b): (i32, i32)| a + b);
        let mut obj = object();
        assert!(matches!(
            add.call(&mut obj, &[Value::Int32(2)]),
            Err(RttiError::ArityMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            add.call(&mut obj, &[Value::Int32(2), Value::String("3".into())]),
            Err(RttiError::TypeMismatch { .. })
        ));
        assert!(add.call_str(&mut obj, "Param0=2").is_err());
        assert!(add.call_str(&mut obj, "Param0=2 Param1=three").is_err());
    }

    #[test]
    fn test_function_mutates_object() {
        let bump = DynamicFunction::fallible(|obj: &mut Object, (by,): (i32,)| {
            let count: i32 = obj.get("Count")?;
            obj.set("Count", count + by)?;
            Ok(())
        });
        let mut obj = object();
        assert_eq!(bump.signature().to_string(), "void(int)");
        assert_eq!(bump.call_str(&mut obj, "Param0=3").unwrap(), "");
        bump.call_typed::<(), _>(&mut obj, (4,)).unwrap();
        assert_eq!(obj.get::<i32>("Count").unwrap(), 7);
    }

    #[test]
    fn test_dynamic_function() {
        let int = TypeDescriptor::primitive(TypeKind::Int32);
        let neg = DynamicFunction::from_dynamic(Signature::new(int.clone(), vec![int]), |_, args| {
            match args[0] {
                Value::Int32(v) => Ok(Value::Int32(-v)),
                _ => Ok(Value::Void),
            }
        });
        let mut obj = object();
        assert_eq!(neg.call_str(&mut obj, "Param0=8").unwrap(), "-8");
    }

    #[test]
    fn test_constructor_descriptor() {
        let ctor = ConstructorDescriptor::new(|obj: &mut Object, (count,): (i32,)| obj.set("Count", count));
        assert!(!ctor.is_default());
        assert_eq!(ctor.signature().param_list(), "(int)");
        let mut obj = object();
        ctor.initialize(&mut obj, &[Value::Int32(11)]).unwrap();
        assert_eq!(obj.get::<i32>("Count").unwrap(), 11);
        assert!(ConstructorDescriptor::default_values().is_default());
    }
}
