//! Class descriptors
//!
//! A [`ClassDescriptor`] holds what one class declares itself: its name,
//! base class link, members in declaration order and properties. What an
//! instance actually carries, inherited members included, is the class'
//! [`ClassLayout`], computed by the registry once the base chain resolves.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::{RttiError, RttiResult};
use crate::event::{DynamicEvent, EventHandler};
use crate::function::{ConstructorDescriptor, DynamicFunction};
use crate::member::{
    AttributeDescriptor, EventDescriptor, MemberDescriptor, MemberKind, MemberPayload, SlotDescriptor,
};
use crate::object::Object;
use crate::params::{ParamPack, Signature};
use crate::registry::ClassRegistry;
use crate::types::{RttiType, TypeRef, Value};

/// Metadata of one reflectable class
pub struct ClassDescriptor {
    full_name: String,
    name: String,
    namespace: String,
    base_class_name: String,
    description: String,
    module_id: u32,
    members: Vec<Arc<MemberDescriptor>>,
    member_index: FxHashMap<String, usize>,
    properties: Vec<(String, String)>,
    layout_cache: Mutex<Option<(u64, Arc<ClassLayout>)>>,
}

impl ClassDescriptor {
    /// Create an empty class description
    ///
    /// `name` is the short class name; the full name is composed with the
    /// namespace as `namespace::name`.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        Self {
            full_name: compose_name(&namespace, &name),
            name,
            namespace,
            base_class_name: String::new(),
            description: String::new(),
            module_id: 0,
            members: Vec::new(),
            member_index: FxHashMap::default(),
            properties: Vec::new(),
            layout_cache: Mutex::new(None),
        }
    }

    fn set_namespace(&mut self, namespace: String) {
        self.full_name = compose_name(&namespace, &self.name);
        self.namespace = namespace;
    }

    /// Full class name (`namespace::name`)
    pub fn class_name(&self) -> &str {
        &self.full_name
    }

    /// Short class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace, empty for the root namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full name of the base class, empty for root classes
    pub fn base_class_name(&self) -> &str {
        &self.base_class_name
    }

    /// Set the base class
    pub fn set_base_class_name(&mut self, base: impl Into<String>) {
        self.base_class_name = base.into();
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Id of the module that registered this class
    pub fn module_id(&self) -> u32 {
        self.module_id
    }

    pub(crate) fn set_module_id(&mut self, id: u32) {
        self.module_id = id;
    }

    /// Add a member; names must be unique within the class
    pub fn add_member(&mut self, member: MemberDescriptor) -> RttiResult<()> {
        if self.member_index.contains_key(member.name()) {
            return Err(RttiError::DuplicateMember {
                class: self.full_name.clone(),
                member: member.name().to_string(),
            });
        }
        self.member_index
            .insert(member.name().to_string(), self.members.len());
        self.members.push(Arc::new(member));
        Ok(())
    }

    /// Own members in declaration order
    pub fn members(&self) -> &[Arc<MemberDescriptor>] {
        &self.members
    }

    /// Own member by name
    pub fn member(&self, name: &str) -> Option<&Arc<MemberDescriptor>> {
        self.member_index.get(name).map(|&i| &self.members[i])
    }

    /// Set a property; the last write for a key wins
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
    }

    /// Own properties in first insertion order
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Own property by key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Constructors in declaration order
    pub fn constructors(&self) -> impl Iterator<Item = (&str, &ConstructorDescriptor)> + '_ {
        self.members
            .iter()
            .filter_map(|m| m.as_constructor().map(|c| (m.name(), c)))
    }

    /// Whether the class declares any constructor
    pub fn has_constructor(&self) -> bool {
        self.constructors().next().is_some()
    }

    /// Whether the class declares a constructor without parameters
    pub fn has_default_constructor(&self) -> bool {
        self.constructors().any(|(_, c)| c.is_default())
    }

    /// Create an instance with the first constructor whose parameter types
    /// equal the argument types
    pub fn create(self: &Arc<Self>, registry: &ClassRegistry, args: &[Value]) -> RttiResult<Object> {
        let ctor = self
            .constructors()
            .map(|(_, c)| c)
            .find(|c| {
                c.signature().arity() == args.len()
                    && c.signature()
                        .params()
                        .iter()
                        .zip(args)
                        .all(|(ty, v)| ty.storage() == v.kind())
            })
            .ok_or_else(|| {
                let kinds: Vec<&str> = args.iter().map(|v| v.kind().name()).collect();
                RttiError::NoMatchingConstructor {
                    class: self.full_name.clone(),
                    signature: format!("({})", kinds.join(",")),
                }
            })?;
        self.instantiate(registry, ctor, args)
    }

    /// Create an instance with the first constructor that accepts the
    /// parameter string
    pub fn create_str(self: &Arc<Self>, registry: &ClassRegistry, params: &str) -> RttiResult<Object> {
        for (_, ctor) in self.constructors() {
            if let Ok(args) = ctor.signature().parse_args(params) {
                return self.instantiate(registry, ctor, &args);
            }
        }
        Err(RttiError::NoMatchingConstructor {
            class: self.full_name.clone(),
            signature: params.to_string(),
        })
    }

    /// Create an instance with the default constructor
    pub fn create_default(self: &Arc<Self>, registry: &ClassRegistry) -> RttiResult<Object> {
        self.create(registry, &[])
    }

    /// Create an instance with a constructor chosen by member name
    pub fn create_named(
        self: &Arc<Self>,
        registry: &ClassRegistry,
        ctor_name: &str,
        params: &str,
    ) -> RttiResult<Object> {
        let ctor = self
            .member(ctor_name)
            .and_then(|m| m.as_constructor())
            .ok_or_else(|| RttiError::MemberNotFound {
                class: self.full_name.clone(),
                member: ctor_name.to_string(),
            })?;
        let args = ctor.signature().parse_args(params)?;
        self.instantiate(registry, ctor, &args)
    }

    fn instantiate(
        self: &Arc<Self>,
        registry: &ClassRegistry,
        ctor: &ConstructorDescriptor,
        args: &[Value],
    ) -> RttiResult<Object> {
        let layout = registry.layout(self)?;
        let mut obj = Object::new(self.clone(), layout, registry.options().strict_enum_values);
        ctor.initialize(&mut obj, args)?;
        Ok(obj)
    }

    pub(crate) fn cached_layout(&self, generation: u64) -> Option<Arc<ClassLayout>> {
        match &*self.layout_cache.lock() {
            Some((gen, layout)) if *gen == generation => Some(layout.clone()),
            _ => None,
        }
    }

    pub(crate) fn store_layout(&self, generation: u64, layout: Arc<ClassLayout>) {
        *self.layout_cache.lock() = Some((generation, layout));
    }
}

fn compose_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace, name)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.full_name)
            .field("base", &self.base_class_name)
            .field("module", &self.module_id)
            .field("members", &self.members.len())
            .finish()
    }
}

/// Effective members of a class, inherited ones included
///
/// Inherited members come first. A member declared with the name of an
/// inherited one replaces it: the inherited entry is dropped and the own
/// member takes its place at the end. Constructors are not inherited.
#[derive(Debug)]
pub struct ClassLayout {
    members: Vec<Arc<MemberDescriptor>>,
    index: FxHashMap<String, usize>,
    attributes: Vec<usize>,
    attribute_slots: FxHashMap<String, usize>,
    events: Vec<usize>,
    slots: Vec<usize>,
    properties: Vec<(String, String)>,
}

impl ClassLayout {
    pub(crate) fn build(class: &ClassDescriptor, base: Option<&ClassLayout>) -> Self {
        let mut members: Vec<Arc<MemberDescriptor>> = Vec::new();
        let mut properties: Vec<(String, String)> = Vec::new();

        if let Some(base) = base {
            members.extend(
                base.members
                    .iter()
                    .filter(|m| m.kind() != MemberKind::Constructor)
                    .cloned(),
            );
            properties.extend(base.properties.iter().cloned());
        }
        for own in &class.members {
            members.retain(|m| m.name() != own.name());
            members.push(own.clone());
        }
        for (key, value) in &class.properties {
            match properties.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.clone(),
                None => properties.push((key.clone(), value.clone())),
            }
        }

        let mut index = FxHashMap::default();
        let mut attributes = Vec::new();
        let mut attribute_slots = FxHashMap::default();
        let mut events = Vec::new();
        let mut slots = Vec::new();
        for (i, member) in members.iter().enumerate() {
            index.insert(member.name().to_string(), i);
            match member.kind() {
                MemberKind::Attribute => {
                    attribute_slots.insert(member.name().to_string(), attributes.len());
                    attributes.push(i);
                }
                MemberKind::Event => events.push(i),
                MemberKind::Slot => slots.push(i),
                _ => {}
            }
        }

        Self {
            members,
            index,
            attributes,
            attribute_slots,
            events,
            slots,
            properties,
        }
    }

    /// Effective members
    pub fn members(&self) -> &[Arc<MemberDescriptor>] {
        &self.members
    }

    /// Effective member by name
    pub fn member(&self, name: &str) -> Option<&Arc<MemberDescriptor>> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    /// Effective members of one kind
    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &Arc<MemberDescriptor>> + '_ {
        self.members.iter().filter(move |m| m.kind() == kind)
    }

    /// Attribute members in slot order
    pub fn attributes(&self) -> impl Iterator<Item = &Arc<MemberDescriptor>> + '_ {
        self.attributes.iter().map(|&i| &self.members[i])
    }

    /// Number of attribute slots
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Slot index of an attribute
    pub fn attribute_slot(&self, name: &str) -> Option<usize> {
        self.attribute_slots.get(name).copied()
    }

    /// Event members in slot order
    pub fn events(&self) -> impl Iterator<Item = &Arc<MemberDescriptor>> + '_ {
        self.events.iter().map(|&i| &self.members[i])
    }

    /// Slot index of an event
    pub fn event_slot(&self, name: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|&i| self.members[i].name() == name)
    }

    /// Slot members in instance order
    pub fn slots(&self) -> impl Iterator<Item = &Arc<MemberDescriptor>> + '_ {
        self.slots.iter().map(|&i| &self.members[i])
    }

    /// Instance index of a slot member
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|&i| self.members[i].name() == name)
    }

    /// Merged properties
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Merged property by key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn default_values(&self) -> Vec<Value> {
        self.attributes()
            .filter_map(|m| m.as_attribute())
            .map(|a| a.default_value().clone())
            .collect()
    }

    pub(crate) fn instantiate_events(&self) -> Vec<DynamicEvent> {
        self.events()
            .filter_map(|m| m.as_event())
            .map(|e| e.instantiate())
            .collect()
    }

    pub(crate) fn instantiate_slots(&self) -> Vec<EventHandler<Vec<Value>>> {
        self.slots()
            .filter_map(|m| m.as_slot())
            .map(|s| s.instantiate())
            .collect()
    }
}

/// Fluent builder for class descriptors
///
/// Errors are collected and reported by [`ClassBuilder::build`].
///
/// ```ignore
/// let car = ClassBuilder::new("Car")
///     .namespace("Demo")
///     .base("Demo::Vehicle")
///     .attribute::<u32>("Doors", 4, "Number of doors")
///     .method("Honk", "Sound the horn", |_: &mut Object, (): ()| "beep".to_string())
///     .default_constructor("Create a car")
///     .build()?;
/// ```
pub struct ClassBuilder {
    class: ClassDescriptor,
    error: Option<RttiError>,
}

impl ClassBuilder {
    /// Start a class in the root namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: ClassDescriptor::new(name, ""),
            error: None,
        }
    }

    /// Place the class into a namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.class.set_namespace(namespace.into());
        self
    }

    /// Set the full name of the base class
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.class.set_base_class_name(base);
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.class.set_description(description);
        self
    }

    /// Set the owning module id
    pub fn module(mut self, id: u32) -> Self {
        self.class.set_module_id(id);
        self
    }

    /// Set a property
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.class.set_property(key, value);
        self
    }

    /// Add an attribute of Rust type `T`
    pub fn attribute<T: RttiType>(self, name: &str, default: T, description: &str) -> Self {
        self.attribute_with(name, T::type_ref(), default.into_value(), description)
    }

    /// Add an attribute of an explicit type, e.g. an enum
    pub fn attribute_with(mut self, name: &str, ty: TypeRef, default: Value, description: &str) -> Self {
        match AttributeDescriptor::new(ty, default) {
            Ok(attr) => self.push(MemberDescriptor::new(name, description, MemberPayload::Attribute(attr))),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Add an enum attribute whose default is given by name
    pub fn enum_attribute(mut self, name: &str, ty: TypeRef, default: &str, description: &str) -> Self {
        match ty.parse(default) {
            Ok(value) => self.attribute_with(name, ty, value, description),
            Err(err) => {
                self.fail(err);
                self
            }
        }
    }

    /// Set the annotation of the most recently added member
    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        let annotation = annotation.into();
        match self.class.members.last_mut().and_then(Arc::get_mut) {
            Some(member) => member.set_annotation(annotation),
            None => self.fail(RttiError::InvalidRegistration(format!(
                "annotation '{}' on class {} without a member",
                annotation, self.class.full_name
            ))),
        }
        self
    }

    /// Add a method from a typed closure
    pub fn method<R, A, F>(mut self, name: &str, description: &str, f: F) -> Self
    where
        R: RttiType,
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> R + Send + Sync + 'static,
    {
        self.push(MemberDescriptor::new(
            name,
            description,
            MemberPayload::Method(DynamicFunction::new(f)),
        ));
        self
    }

    /// Add a method from a typed closure that can fail
    pub fn method_fallible<R, A, F>(mut self, name: &str, description: &str, f: F) -> Self
    where
        R: RttiType,
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> RttiResult<R> + Send + Sync + 'static,
    {
        self.push(MemberDescriptor::new(
            name,
            description,
            MemberPayload::Method(DynamicFunction::fallible(f)),
        ));
        self
    }

    /// Add a prebuilt method
    pub fn method_with(mut self, name: &str, description: &str, function: DynamicFunction) -> Self {
        self.push(MemberDescriptor::new(name, description, MemberPayload::Method(function)));
        self
    }

    /// Add a constructor from a typed initializer
    pub fn constructor<A, F>(mut self, name: &str, description: &str, f: F) -> Self
    where
        A: ParamPack + 'static,
        F: Fn(&mut Object, A) -> RttiResult<()> + Send + Sync + 'static,
    {
        self.push(MemberDescriptor::new(
            name,
            description,
            MemberPayload::Constructor(ConstructorDescriptor::new(f)),
        ));
        self
    }

    /// Add a parameterless constructor named `ctor` keeping default values
    pub fn default_constructor(mut self, description: &str) -> Self {
        self.push(MemberDescriptor::new(
            "ctor",
            description,
            MemberPayload::Constructor(ConstructorDescriptor::default_values()),
        ));
        self
    }

    /// Add an event with the typed parameter pack `A`
    pub fn event<A: ParamPack>(self, name: &str, description: &str) -> Self {
        self.event_with(name, Signature::of::<(), A>(), description)
    }

    /// Add an event with an explicit signature
    pub fn event_with(mut self, name: &str, signature: Signature, description: &str) -> Self {
        self.push(MemberDescriptor::new(
            name,
            description,
            MemberPayload::Event(EventDescriptor::new(signature)),
        ));
        self
    }

    /// Add a slot from a typed closure
    ///
    /// Calls whose arguments do not convert into `A` are skipped.
    pub fn slot<A, F>(self, name: &str, description: &str, f: F) -> Self
    where
        A: ParamPack + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.slot_with(name, Signature::of::<(), A>(), description, move |args| {
            match A::from_values(args) {
                Ok(pack) => f(pack),
                Err(err) => warn!(error = %err, "typed slot call skipped"),
            }
        })
    }

    /// Add a slot with an explicit signature receiving checked arguments
    pub fn slot_with(
        mut self,
        name: &str,
        signature: Signature,
        description: &str,
        f: impl Fn(&[Value]) + Send + Sync + 'static,
    ) -> Self {
        self.push(MemberDescriptor::new(
            name,
            description,
            MemberPayload::Slot(SlotDescriptor::new(signature, f)),
        ));
        self
    }

    fn push(&mut self, member: MemberDescriptor) {
        if let Err(err) = self.class.add_member(member) {
            self.fail(err);
        }
    }

    fn fail(&mut self, err: RttiError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Finish the description
    pub fn build(self) -> RttiResult<ClassDescriptor> {
        match self.error {
            Some(err) => Err(err),
            None if self.class.name.is_empty() => Err(RttiError::InvalidRegistration(
                "class without a name".to_string(),
            )),
            None => Ok(self.class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> ClassDescriptor {
        ClassBuilder::new("Vehicle")
            .namespace("Demo")
            .description("Anything that moves")
            .property("Icon", "vehicle.png")
            .property("Category", "Transport")
            .attribute::<f32>("Speed", 0.0, "Current speed")
            .annotation("unit=m/s")
            .attribute::<String>("Name", "unnamed".to_string(), "Display name")
            .event::<(f32,)>("SpeedChanged", "Emitted when the speed changes")
            .default_constructor("Default constructor")
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_name() {
        let class = vehicle();
        assert_eq!(class.class_name(), "Demo::Vehicle");
        assert_eq!(class.name(), "Vehicle");
        assert_eq!(class.namespace(), "Demo");
        assert_eq!(ClassDescriptor::new("Root", "").class_name(), "Root");
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let class = vehicle();
        let names: Vec<&str> = class.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Speed", "Name", "SpeedChanged", "ctor"]);
        let again: Vec<&str> = class.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, again);
        assert_eq!(class.member("Speed").unwrap().annotation(), "unit=m/s");
        assert!(class.has_default_constructor());
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let err = ClassBuilder::new("Bad")
            .attribute::<i32>("X", 0, "")
            .attribute::<f32>("X", 0.0, "")
            .build()
            .unwrap_err();
        assert!(matches!(err, RttiError::DuplicateMember { .. }));
    }

    #[test]
    fn test_properties_last_write_wins() {
        let mut class = vehicle();
        class.set_property("Icon", "car.png");
        assert_eq!(class.property("Icon"), Some("car.png"));
        assert_eq!(class.properties().len(), 2);
        assert_eq!(class.property("Missing"), None);
    }

    #[test]
    fn test_layout_flattening() {
        let base = vehicle();
        let base_layout = ClassLayout::build(&base, None);

        let car = ClassBuilder::new("Car")
            .namespace("Demo")
            .base("Demo::Vehicle")
            .property("Icon", "car.png")
            .attribute::<u32>("Doors", 4, "")
            .attribute::<f32>("Speed", 10.0, "Overridden speed")
            .build()
            .unwrap();
        let layout = ClassLayout::build(&car, Some(&base_layout));

        let names: Vec<&str> = layout.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Name", "SpeedChanged", "Doors", "Speed"]);
        assert_eq!(layout.attribute_count(), 3);
        assert_eq!(layout.attribute_slot("Speed"), Some(2));
        assert_eq!(layout.event_slot("SpeedChanged"), Some(0));
        assert_eq!(layout.property("Icon"), Some("car.png"));
        assert_eq!(layout.property("Category"), Some("Transport"));
        assert_eq!(
            layout.default_values(),
            vec![Value::String("unnamed".into()), Value::UInt32(4), Value::Float(10.0)]
        );
    }

    #[test]
    fn test_annotation_without_member_fails() {
        assert!(ClassBuilder::new("Empty").annotation("x").build().is_err());
    }

    #[test]
    fn test_enum_attribute_default_by_name() {
        let paint = crate::types::EnumBuilder::new("Paint")
            .value("Red", 0, "")
            .value("Green", 1, "")
            .build()
            .unwrap();
        let class = ClassBuilder::new("Painted")
            .enum_attribute("Color", paint.clone(), "Green", "")
            .build()
            .unwrap();
        let attr = class.member("Color").unwrap().as_attribute().unwrap();
        assert_eq!(attr.default_value(), &Value::Int32(1));
        assert!(ClassBuilder::new("Painted")
            .enum_attribute("Color", paint, "Purple", "")
            .build()
            .is_err());
    }
}
