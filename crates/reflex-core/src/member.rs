//! Member descriptors
//!
//! Every entry of a class is a [`MemberDescriptor`]: a name, a description,
//! a free-form annotation and a payload describing the attribute, method,
//! constructor, event or slot behind it. Descriptors are shared between a class and
//! the layouts of its subclasses and are never copied.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::RttiResult;
use crate::event::{DynamicEvent, EventHandler};
use crate::function::{ConstructorDescriptor, DynamicFunction};
use crate::params::Signature;
use crate::types::{TypeRef, Value};

/// Kind of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Typed attribute slot
    Attribute,
    /// Invokable method
    Method,
    /// Object constructor
    Constructor,
    /// Signal emitted by instances
    Event,
    /// Handler instances expose for connecting to signals
    Slot,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Attribute => "attribute",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Event => "event",
            MemberKind::Slot => "slot",
        };
        f.write_str(s)
    }
}

/// Type and default value of an attribute
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    ty: TypeRef,
    default: Value,
}

impl AttributeDescriptor {
    /// Create an attribute descriptor; the default is brought into the type
    ///
    /// Enum defaults must be an entry of the table.
    pub fn new(ty: TypeRef, default: Value) -> RttiResult<Self> {
        let default = ty.coerce(default, !ty.enum_entries().is_empty())?;
        Ok(Self { ty, default })
    }

    /// Attribute type
    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    /// Default value
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Validate a value for storage in this attribute
    ///
    /// With `strict` set, enum attributes only accept values of their table.
    pub fn check(&self, value: Value, strict: bool) -> RttiResult<Value> {
        self.ty.coerce(value, strict && !self.ty.is_flag())
    }
}

/// Signature of an event member
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    signature: Signature,
}

impl EventDescriptor {
    /// Create an event descriptor
    pub fn new(signature: Signature) -> Self {
        Self { signature }
    }

    /// Event signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Create a fresh, unconnected event for one instance
    pub fn instantiate(&self) -> DynamicEvent {
        DynamicEvent::new(self.signature.clone())
    }
}

type SlotCallback = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Signature and callback of a slot member
///
/// Each object gets its own handler from [`SlotDescriptor::instantiate`], so
/// connections made through one object never affect another.
#[derive(Clone)]
pub struct SlotDescriptor {
    signature: Signature,
    callback: SlotCallback,
}

impl SlotDescriptor {
    /// Create a slot receiving argument lists checked against `signature`
    pub fn new(signature: Signature, callback: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self {
            signature,
            callback: Arc::new(callback),
        }
    }

    /// Slot signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Create a handler with its own identity for one instance
    pub fn instantiate(&self) -> EventHandler<Vec<Value>> {
        let signature = self.signature.clone();
        let callback = self.callback.clone();
        EventHandler::new(move |args: &Vec<Value>| match signature.check_args(args, false) {
            Ok(args) => callback(&args),
            Err(err) => warn!(signature = %signature, error = %err, "slot call skipped"),
        })
    }
}

impl fmt::Debug for SlotDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDescriptor")
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// What a member refers to
#[derive(Debug)]
pub enum MemberPayload {
    /// Attribute slot
    Attribute(AttributeDescriptor),
    /// Method
    Method(DynamicFunction),
    /// Constructor
    Constructor(ConstructorDescriptor),
    /// Event
    Event(EventDescriptor),
    /// Slot
    Slot(SlotDescriptor),
}

/// One entry of a class description
#[derive(Debug)]
pub struct MemberDescriptor {
    name: String,
    description: String,
    annotation: String,
    payload: MemberPayload,
}

impl MemberDescriptor {
    /// Create a member
    pub fn new(name: impl Into<String>, description: impl Into<String>, payload: MemberPayload) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            annotation: String::new(),
            payload,
        }
    }

    /// Attach an annotation
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    pub(crate) fn set_annotation(&mut self, annotation: String) {
        self.annotation = annotation;
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Annotation
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        match self.payload {
            MemberPayload::Attribute(_) => MemberKind::Attribute,
            MemberPayload::Method(_) => MemberKind::Method,
            MemberPayload::Constructor(_) => MemberKind::Constructor,
            MemberPayload::Event(_) => MemberKind::Event,
            MemberPayload::Slot(_) => MemberKind::Slot,
        }
    }

    /// Payload
    pub fn payload(&self) -> &MemberPayload {
        &self.payload
    }

    /// Attribute payload, if this is an attribute
    pub fn as_attribute(&self) -> Option<&AttributeDescriptor> {
        match &self.payload {
            MemberPayload::Attribute(a) => Some(a),
            _ => None,
        }
    }

    /// Method payload, if this is a method
    pub fn as_method(&self) -> Option<&DynamicFunction> {
        match &self.payload {
            MemberPayload::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Constructor payload, if this is a constructor
    pub fn as_constructor(&self) -> Option<&ConstructorDescriptor> {
        match &self.payload {
            MemberPayload::Constructor(c) => Some(c),
            _ => None,
        }
    }

    /// Event payload, if this is an event
    pub fn as_event(&self) -> Option<&EventDescriptor> {
        match &self.payload {
            MemberPayload::Event(e) => Some(e),
            _ => None,
        }
    }

    /// Slot payload, if this is a slot
    pub fn as_slot(&self) -> Option<&SlotDescriptor> {
        match &self.payload {
            MemberPayload::Slot(s) => Some(s),
            _ => None,
        }
    }

    /// Type or signature shown in listings
    pub fn type_string(&self) -> String {
        match &self.payload {
            MemberPayload::Attribute(a) => a.type_ref().type_name().to_string(),
            MemberPayload::Method(m) => m.signature().to_string(),
            MemberPayload::Constructor(c) => format!("Object{}", c.signature().param_list()),
            MemberPayload::Event(e) => e.signature().to_string(),
            MemberPayload::Slot(s) => s.signature().to_string(),
        }
    }
}
