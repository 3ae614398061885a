//! Reflectable object instances
//!
//! An [`Object`] is created by a constructor of its class and is accessed
//! through its class layout by member name. It owns one value slot per
//! effective attribute, one event per effective event member and one handler
//! per effective slot member, and keeps its class descriptor alive for as
//! long as it exists.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::class::{ClassDescriptor, ClassLayout};
use crate::error::{RttiError, RttiResult};
use crate::event::{DynamicEvent, EventHandler};
use crate::function::DynamicFunction;
use crate::params::{format_params, parse_params, ParamPack};
use crate::registry::ClassRegistry;
use crate::types::{RttiType, Value};
use crate::var::{DynVar, DynVarMut};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Which attributes `get_values` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFilter {
    /// Every attribute
    WithDefault,
    /// Only attributes that differ from their default
    NoDefault,
}

/// A live instance of a registered class
pub struct Object {
    id: u64,
    class: Arc<ClassDescriptor>,
    layout: Arc<ClassLayout>,
    values: Vec<Value>,
    signals: Vec<DynamicEvent>,
    slots: Vec<EventHandler<Vec<Value>>>,
    strict_enums: bool,
    native: Option<Box<dyn Any + Send + Sync>>,
    destroyed: DynamicEvent,
}

impl Object {
    pub(crate) fn new(class: Arc<ClassDescriptor>, layout: Arc<ClassLayout>, strict_enums: bool) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            values: layout.default_values(),
            signals: layout.instantiate_events(),
            slots: layout.instantiate_slots(),
            class,
            layout,
            strict_enums,
            native: None,
            destroyed: DynamicEvent::typed::<()>(),
        }
    }

    /// Process-unique object id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Class of this object
    pub fn get_class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Effective members of the class
    pub fn layout(&self) -> &Arc<ClassLayout> {
        &self.layout
    }

    pub(crate) fn strict_enums(&self) -> bool {
        self.strict_enums
    }

    /// Whether this object's class is `class_name` or derives from it
    pub fn is_instance_of(&self, registry: &ClassRegistry, class_name: &str) -> bool {
        self.class.class_name() == class_name
            || registry.is_derived_from(self.class.class_name(), class_name)
    }

    fn not_found(&self, member: &str) -> RttiError {
        RttiError::MemberNotFound {
            class: self.class.class_name().to_string(),
            member: member.to_string(),
        }
    }

    /// Read handle to an attribute
    pub fn attribute(&self, name: &str) -> Option<DynVar<'_>> {
        let slot = self.layout.attribute_slot(name)?;
        let member = self.layout.member(name)?;
        let attr = member.as_attribute()?;
        Some(DynVar::new(member, attr, &self.values[slot]))
    }

    /// Write handle to an attribute
    pub fn attribute_mut(&mut self, name: &str) -> Option<DynVarMut<'_>> {
        self.var_mut(name).ok()
    }

    fn var_mut(&mut self, name: &str) -> RttiResult<DynVarMut<'_>> {
        let (slot, member) = match (self.layout.attribute_slot(name), self.layout.member(name)) {
            (Some(slot), Some(member)) => (slot, member.clone()),
            _ => return Err(self.not_found(name)),
        };
        let attr = member
            .as_attribute()
            .cloned()
            .ok_or_else(|| self.not_found(name))?;
        Ok(DynVarMut::new(member, attr, &mut self.values[slot], self.strict_enums))
    }

    /// Read handles to every attribute in slot order
    pub fn attributes(&self) -> impl Iterator<Item = DynVar<'_>> + '_ {
        self.layout
            .attributes()
            .zip(&self.values)
            .filter_map(|(member, value)| {
                member
                    .as_attribute()
                    .map(|attr| DynVar::new(member, attr, value))
            })
    }

    /// Attribute value in canonical string form
    pub fn get_attribute(&self, name: &str) -> RttiResult<String> {
        self.attribute(name)
            .map(|var| var.get_string())
            .ok_or_else(|| self.not_found(name))
    }

    /// Parse and store an attribute value
    pub fn set_attribute(&mut self, name: &str, value: &str) -> RttiResult<()> {
        self.var_mut(name)?.set_string(value)
    }

    /// Reset an attribute to its default value
    pub fn set_attribute_default(&mut self, name: &str) -> RttiResult<()> {
        self.var_mut(name)?.set_default();
        Ok(())
    }

    /// Attribute value
    pub fn get_value(&self, name: &str) -> RttiResult<Value> {
        self.attribute(name)
            .map(|var| var.get().clone())
            .ok_or_else(|| self.not_found(name))
    }

    /// Store an attribute value, converting it into the attribute type
    pub fn set_value(&mut self, name: &str, value: Value) -> RttiResult<()> {
        self.var_mut(name)?.set(value)
    }

    /// Typed attribute read
    pub fn get<T: RttiType>(&self, name: &str) -> RttiResult<T> {
        T::from_value(&self.get_value(name)?)
    }

    /// Typed attribute write
    pub fn set<T: RttiType>(&mut self, name: &str, value: T) -> RttiResult<()> {
        self.set_value(name, value.into_value())
    }

    /// Method by name
    pub fn method(&self, name: &str) -> Option<DynamicFunction> {
        self.layout.member(name)?.as_method().cloned()
    }

    fn require_method(&self, name: &str) -> RttiResult<DynamicFunction> {
        self.method(name).ok_or_else(|| self.not_found(name))
    }

    /// Call a method with dynamic values
    pub fn call_method(&mut self, name: &str, args: &[Value]) -> RttiResult<Value> {
        self.require_method(name)?.call(self, args)
    }

    /// Call a method with a parameter string, returning the result string
    pub fn call_method_str(&mut self, name: &str, params: &str) -> RttiResult<String> {
        self.require_method(name)?.call_str(self, params)
    }

    /// Call a method with a typed parameter pack
    pub fn call_typed<R: RttiType, A: ParamPack>(&mut self, name: &str, args: A) -> RttiResult<R> {
        self.require_method(name)?.call_typed(self, args)
    }

    /// Signal of this object by event member name
    pub fn signal(&self, name: &str) -> Option<&DynamicEvent> {
        self.layout.event_slot(name).map(|slot| &self.signals[slot])
    }

    /// Handler of this object by slot member name
    ///
    /// ```ignore
    /// sender.signal("Changed").unwrap().connect(receiver.slot("OnChanged").unwrap());
    /// ```
    pub fn slot(&self, name: &str) -> Option<&EventHandler<Vec<Value>>> {
        self.layout.slot_index(name).map(|i| &self.slots[i])
    }

    /// Slot handlers with their member names
    pub fn slots(&self) -> impl Iterator<Item = (&str, &EventHandler<Vec<Value>>)> + '_ {
        self.layout.slots().map(|m| m.name()).zip(self.slots.iter())
    }

    /// Signal emitted when this object is dropped
    pub fn destroyed(&self) -> &DynamicEvent {
        &self.destroyed
    }

    /// Attribute values as a `Name="value"` list in slot order
    pub fn get_values(&self, filter: ValueFilter) -> String {
        let pairs: Vec<(String, String)> = self
            .attributes()
            .filter(|var| filter == ValueFilter::WithDefault || !var.is_default())
            .map(|var| (var.name().to_string(), var.get_string()))
            .collect();
        format_params(&pairs)
    }

    /// Set attributes from a `Name="value"` list
    ///
    /// Either every listed attribute is written or none is.
    pub fn set_values(&mut self, params: &str) -> RttiResult<()> {
        let mut staged = Vec::new();
        for (name, raw) in parse_params(params)? {
            let var = self.attribute(&name).ok_or_else(|| self.not_found(&name))?;
            let value = var.parse_value(&raw, self.strict_enums)?;
            staged.push((self.value_slot(&name)?, value));
        }
        self.commit(staged);
        Ok(())
    }

    /// Reset every attribute to its default value
    pub fn set_default_values(&mut self) {
        self.values = self.layout.default_values();
    }

    fn value_slot(&self, name: &str) -> RttiResult<usize> {
        self.layout
            .attribute_slot(name)
            .ok_or_else(|| self.not_found(name))
    }

    fn commit(&mut self, staged: Vec<(usize, Value)>) {
        for (slot, value) in staged {
            self.values[slot] = value;
        }
    }

    /// Serialize the class name and attribute values
    ///
    /// Numbers and booleans map to JSON scalars, vectors and colors to
    /// arrays, everything else (strings, enums, flags) to its canonical string.
    /// NaN and infinite floats have no JSON number form and are written as
    /// their canonical string (`NaN`, `inf`, `-inf`).
    pub fn to_json(&self) -> JsonValue {
        let mut attributes = JsonMap::new();
        for var in self.attributes() {
            attributes.insert(var.name().to_string(), value_to_json(&var));
        }
        json!({
            "class": self.class.class_name(),
            "attributes": attributes,
        })
    }

    /// Apply attribute values produced by [`Object::to_json`]
    ///
    /// The class name must match. Either every attribute is written or none is.
    pub fn apply_json(&mut self, doc: &JsonValue) -> RttiResult<()> {
        let class = doc.get("class").and_then(JsonValue::as_str).unwrap_or_default();
        if class != self.class.class_name() {
            return Err(RttiError::TypeMismatch {
                expected: self.class.class_name().to_string(),
                got: class.to_string(),
            });
        }
        let Some(attributes) = doc.get("attributes").and_then(JsonValue::as_object) else {
            return Ok(());
        };

        let mut staged = Vec::new();
        for (name, json) in attributes {
            let var = self.attribute(name).ok_or_else(|| self.not_found(name))?;
            let raw = json_to_string(json).ok_or_else(|| RttiError::ParseError {
                type_name: var.type_ref().type_name().to_string(),
                input: json.to_string(),
            })?;
            let value = var.parse_value(&raw, self.strict_enums)?;
            staged.push((self.value_slot(name)?, value));
        }
        self.commit(staged);
        Ok(())
    }

    /// Attach native data of any type
    pub fn set_native<T: Any + Send + Sync>(&mut self, data: T) {
        self.native = Some(Box::new(data));
    }

    /// Builder form of [`Object::set_native`]
    pub fn with_native<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.set_native(data);
        self
    }

    /// Native data, if present and of type `T`
    pub fn native<T: Any>(&self) -> Option<&T> {
        self.native.as_ref()?.downcast_ref()
    }

    /// Mutable native data, if present and of type `T`
    pub fn native_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.native.as_mut()?.downcast_mut()
    }
}

fn value_to_json(var: &DynVar<'_>) -> JsonValue {
    let ty = var.type_ref();
    if ty.is_enum() || ty.is_flag() {
        return JsonValue::String(var.get_string());
    }
    match var.get() {
        Value::Bool(v) => json!(v),
        Value::Float(v) => float_to_json(*v),
        Value::Double(v) => float_to_json(*v),
        Value::Vector2(v) => floats_to_json(&v.to_array()),
        Value::Vector3(v) => floats_to_json(&v.to_array()),
        Value::Vector4(v) => floats_to_json(&v.to_array()),
        Value::Color3(c) => floats_to_json(&[c.r, c.g, c.b]),
        Value::Color4(c) => floats_to_json(&[c.r, c.g, c.b, c.a]),
        Value::Int8(v) => json!(v),
        Value::Int16(v) => json!(v),
        Value::Int32(v) => json!(v),
        Value::Int64(v) => json!(v),
        Value::UInt8(v) => json!(v),
        Value::UInt16(v) => json!(v),
        Value::UInt32(v) => json!(v),
        Value::UInt64(v) => json!(v),
        Value::Void | Value::String(_) => JsonValue::String(var.get_string()),
    }
}

fn float_to_json<F: Into<f64> + fmt::Display + Copy>(v: F) -> JsonValue {
    let f: f64 = v.into();
    if f.is_finite() {
        json!(f)
    } else {
        JsonValue::String(v.to_string())
    }
}

fn floats_to_json(components: &[f32]) -> JsonValue {
    JsonValue::Array(components.iter().map(|&c| float_to_json(c)).collect())
}

fn json_to_string(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Array(items) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) => Some(s.clone()),
                    other => other.as_f64().map(|f| f.to_string()),
                })
                .collect();
            parts.map(|p| p.join(" "))
        }
        _ => None,
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.destroyed.event().emit(&Vec::new());
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_values(ValueFilter::WithDefault))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("class", &self.class.class_name())
            .field("values", &self.values)
            .finish()
    }
}
