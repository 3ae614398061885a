//! Dynamic variables
//!
//! [`DynVar`] and [`DynVarMut`] are handles to one attribute slot of an
//! [`Object`](crate::Object). They borrow the object, so a handle can never
//! outlive the storage it refers to. Failed writes leave the slot unchanged.

use std::sync::Arc;

use crate::error::RttiResult;
use crate::member::{AttributeDescriptor, MemberDescriptor};
use crate::types::{TypeRef, Value};

/// Read access to one attribute of an object
#[derive(Debug, Clone, Copy)]
pub struct DynVar<'a> {
    member: &'a MemberDescriptor,
    attr: &'a AttributeDescriptor,
    value: &'a Value,
}

impl<'a> DynVar<'a> {
    pub(crate) fn new(member: &'a MemberDescriptor, attr: &'a AttributeDescriptor, value: &'a Value) -> Self {
        Self { member, attr, value }
    }

    /// Attribute name
    pub fn name(&self) -> &'a str {
        self.member.name()
    }

    /// Attribute description
    pub fn description(&self) -> &'a str {
        self.member.description()
    }

    /// Attribute annotation
    pub fn annotation(&self) -> &'a str {
        self.member.annotation()
    }

    /// Attribute type
    pub fn type_ref(&self) -> &'a TypeRef {
        self.attr.type_ref()
    }

    /// Current value
    pub fn get(&self) -> &'a Value {
        self.value
    }

    /// Current value in canonical string form
    pub fn get_string(&self) -> String {
        self.attr.type_ref().format(self.value)
    }

    /// Default value
    pub fn default_value(&self) -> &'a Value {
        self.attr.default_value()
    }

    /// Default value in canonical string form
    pub fn default_string(&self) -> String {
        self.attr.type_ref().format(self.attr.default_value())
    }

    /// Whether the current value equals the default
    pub fn is_default(&self) -> bool {
        self.value == self.attr.default_value()
    }

    pub(crate) fn parse_value(&self, input: &str, strict: bool) -> RttiResult<Value> {
        self.attr.check(self.attr.type_ref().parse(input)?, strict)
    }
}

/// Write access to one attribute of an object
#[derive(Debug)]
pub struct DynVarMut<'a> {
    member: Arc<MemberDescriptor>,
    attr: AttributeDescriptor,
    value: &'a mut Value,
    strict: bool,
}

impl<'a> DynVarMut<'a> {
    pub(crate) fn new(
        member: Arc<MemberDescriptor>,
        attr: AttributeDescriptor,
        value: &'a mut Value,
        strict: bool,
    ) -> Self {
        Self {
            member,
            attr,
            value,
            strict,
        }
    }

    /// Read-only view
    pub fn as_var(&self) -> DynVar<'_> {
        DynVar::new(&self.member, &self.attr, &*self.value)
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        self.member.name()
    }

    /// Attribute type
    pub fn type_ref(&self) -> &TypeRef {
        self.attr.type_ref()
    }

    /// Current value
    pub fn get(&self) -> &Value {
        &*self.value
    }

    /// Current value in canonical string form
    pub fn get_string(&self) -> String {
        self.as_var().get_string()
    }

    /// Store a value, converting it into the attribute type
    pub fn set(&mut self, value: Value) -> RttiResult<()> {
        *self.value = self.attr.check(value, self.strict)?;
        Ok(())
    }

    /// Parse and store a string value
    pub fn set_string(&mut self, input: &str) -> RttiResult<()> {
        *self.value = self.as_var().parse_value(input, self.strict)?;
        Ok(())
    }

    /// Reset to the default value
    pub fn set_default(&mut self) {
        *self.value = self.attr.default_value().clone();
    }

    /// Copy the value of another variable
    ///
    /// Values of the same type are copied directly, anything else goes
    /// through the canonical string form.
    pub fn set_var(&mut self, other: &DynVar<'_>) -> RttiResult<()> {
        if other.type_ref().type_id() == self.attr.type_ref().type_id() {
            *self.value = other.get().clone();
            Ok(())
        } else {
            self.set_string(&other.get_string())
        }
    }
}
