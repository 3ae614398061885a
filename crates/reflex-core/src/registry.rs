//! Class registry
//!
//! The [`ClassRegistry`] maps full class names to descriptors and answers
//! hierarchy queries. Classes are grouped by the module that registered
//! them so that a module can take its classes away again on unload.
//!
//! Registration and unloading take a write lock; lookups and queries take a
//! read lock. Registry events are emitted after the lock has been released,
//! so handlers may call back into the registry.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::class::{ClassDescriptor, ClassLayout};
use crate::config::RegistryOptions;
use crate::error::{RttiError, RttiResult};
use crate::event::Event;
use crate::member::MemberPayload;
use crate::object::Object;
use crate::types::Value;

static GLOBAL: Lazy<ClassRegistry> = Lazy::new(ClassRegistry::new);

/// Process-wide registry
///
/// Components that can take an explicit registry should prefer one; the
/// global instance serves code that has no way to receive it.
pub fn global() -> &'static ClassRegistry {
    &GLOBAL
}

/// Metadata of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// Module id, `0` until registered
    pub id: u32,
    /// Module name
    pub name: String,
    /// Vendor
    pub vendor: String,
    /// License
    pub license: String,
    /// Description
    pub description: String,
    /// Whether the module was loaded as a plugin
    pub plugin: bool,
}

impl ModuleInfo {
    /// Describe a module; the id is assigned on registration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            vendor: String::new(),
            license: String::new(),
            description: String::new(),
            plugin: false,
        }
    }

    /// Set the vendor
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Set the license
    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as plugin
    pub fn plugin(mut self, plugin: bool) -> Self {
        self.plugin = plugin;
        self
    }
}

/// Code that registers a batch of types
pub trait ModuleRegistrar {
    /// Module metadata
    fn module_info(&self) -> ModuleInfo;

    /// Register every type of the module
    fn register_types(&self, ctx: &mut ModuleContext<'_>) -> RttiResult<()>;
}

/// Registration context handed to a [`ModuleRegistrar`]
pub struct ModuleContext<'a> {
    registry: &'a ClassRegistry,
    module_id: u32,
    classes: Vec<Arc<ClassDescriptor>>,
}

impl<'a> ModuleContext<'a> {
    /// Registry being populated
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Id assigned to the module
    pub fn module_id(&self) -> u32 {
        self.module_id
    }

    /// Register a class as part of this module
    pub fn register_class(&mut self, mut class: ClassDescriptor) -> RttiResult<Arc<ClassDescriptor>> {
        class.set_module_id(self.module_id);
        let class = self.registry.register_class(class)?;
        self.classes.push(class.clone());
        Ok(class)
    }

    /// Classes registered so far
    pub fn classes(&self) -> &[Arc<ClassDescriptor>] {
        &self.classes
    }
}

/// Whether `get_classes` walks the whole subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    /// Every class derived from the base
    Recursive,
    /// Direct children only
    NonRecursive,
}

/// Whether `get_classes` reports the base class itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseInclusion {
    /// Include the base class
    IncludeBase,
    /// Exclude the base class
    NoBase,
}

/// Whether `get_classes` reports classes without a default constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractInclusion {
    /// Include abstract classes
    IncludeAbstract,
    /// Only classes with a default constructor
    NoAbstract,
}

/// Filter for [`ClassRegistry::get_classes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassQuery {
    /// Subtree walk
    pub recursion: Recursion,
    /// Base class inclusion
    pub base: BaseInclusion,
    /// Abstract class inclusion
    pub abstracts: AbstractInclusion,
    /// Restrict to classes of one module
    pub module: Option<u32>,
}

impl ClassQuery {
    /// Query with explicit flags and no module filter
    pub fn new(recursion: Recursion, base: BaseInclusion, abstracts: AbstractInclusion) -> Self {
        Self {
            recursion,
            base,
            abstracts,
            module: None,
        }
    }

    /// Restrict to one module
    pub fn in_module(mut self, module_id: u32) -> Self {
        self.module = Some(module_id);
        self
    }
}

impl Default for ClassQuery {
    fn default() -> Self {
        Self::new(
            Recursion::Recursive,
            BaseInclusion::NoBase,
            AbstractInclusion::IncludeAbstract,
        )
    }
}

#[derive(Default)]
struct Inner {
    classes: Vec<Arc<ClassDescriptor>>,
    by_name: FxHashMap<String, Arc<ClassDescriptor>>,
    modules: Vec<ModuleInfo>,
}

impl Inner {
    fn get(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.by_name.get(name)
    }

    fn is_derived_from(&self, class: &str, base: &str) -> bool {
        let mut current = match self.get(class) {
            Some(c) => c.base_class_name(),
            None => return false,
        };
        // Chains are acyclic, the bound only guards against unresolved loops
        for _ in 0..=self.classes.len() {
            if current.is_empty() {
                return false;
            }
            if current == base {
                return true;
            }
            current = match self.get(current) {
                Some(c) => c.base_class_name(),
                None => return false,
            };
        }
        false
    }

    fn ensure_module(&mut self, id: u32) -> Option<ModuleInfo> {
        if self.modules.iter().any(|m| m.id == id) {
            return None;
        }
        let mut info = ModuleInfo::new("");
        info.id = id;
        self.modules.push(info.clone());
        Some(info)
    }

    fn remove_classes_of(&mut self, module_id: u32) -> Vec<Arc<ClassDescriptor>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.classes)
            .into_iter()
            .partition(|c| c.module_id() == module_id);
        self.classes = kept;
        for class in &removed {
            self.by_name.remove(class.class_name());
        }
        removed
    }

    fn remove_exact(&mut self, classes: &[Arc<ClassDescriptor>]) -> Vec<Arc<ClassDescriptor>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.classes)
            .into_iter()
            .partition(|c| classes.iter().any(|r| Arc::ptr_eq(r, c)));
        self.classes = kept;
        for class in &removed {
            self.by_name.remove(class.class_name());
        }
        removed
    }
}

/// Directory of registered classes
pub struct ClassRegistry {
    options: RegistryOptions,
    inner: RwLock<Inner>,
    generation: AtomicU64,
    next_module_id: AtomicU32,
    class_loaded: Event<Arc<ClassDescriptor>>,
    class_unloaded: Event<Arc<ClassDescriptor>>,
    module_loaded: Event<ModuleInfo>,
    module_unloaded: Event<ModuleInfo>,
}

impl ClassRegistry {
    /// Create an empty registry with default options
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Create an empty registry
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            next_module_id: AtomicU32::new(options.first_module_id),
            options,
            inner: RwLock::new(Inner::default()),
            generation: AtomicU64::new(0),
            class_loaded: Event::new(),
            class_unloaded: Event::new(),
            module_loaded: Event::new(),
            module_unloaded: Event::new(),
        }
    }

    /// Options this registry was created with
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Emitted after a class has been registered
    pub fn class_loaded(&self) -> &Event<Arc<ClassDescriptor>> {
        &self.class_loaded
    }

    /// Emitted after a class has been removed
    pub fn class_unloaded(&self) -> &Event<Arc<ClassDescriptor>> {
        &self.class_unloaded
    }

    /// Emitted after a module has been registered
    pub fn module_loaded(&self) -> &Event<ModuleInfo> {
        &self.module_loaded
    }

    /// Emitted after a module has been removed
    pub fn module_unloaded(&self) -> &Event<ModuleInfo> {
        &self.module_unloaded
    }

    /// Hand out a module id that has not been used by this registry
    pub fn unique_module_id(&self) -> u32 {
        let inner = self.inner.read();
        loop {
            let id = self.next_module_id.fetch_add(1, Ordering::Relaxed);
            if !inner.modules.iter().any(|m| m.id == id) {
                return id;
            }
        }
    }

    /// Register module metadata, assigning an id if it has none
    ///
    /// Registering an id again replaces its metadata.
    pub fn register_module(&self, mut info: ModuleInfo) -> u32 {
        if info.id == 0 {
            info.id = self.unique_module_id();
        }
        {
            let mut inner = self.inner.write();
            match inner.modules.iter_mut().find(|m| m.id == info.id) {
                Some(existing) => *existing = info.clone(),
                None => inner.modules.push(info.clone()),
            }
        }
        info!(module = info.id, name = %info.name, "module registered");
        self.module_loaded.emit(&info);
        info.id
    }

    /// Module metadata by id
    pub fn module(&self, id: u32) -> Option<ModuleInfo> {
        self.inner.read().modules.iter().find(|m| m.id == id).cloned()
    }

    /// All modules in registration order
    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.inner.read().modules.clone()
    }

    /// Register a class
    ///
    /// Rejects duplicate names, cyclic base chains and signatures with more
    /// parameters than allowed. The base class does not have to be
    /// registered yet.
    pub fn register_class(&self, class: ClassDescriptor) -> RttiResult<Arc<ClassDescriptor>> {
        if let Err(err) = self.check_signatures(&class) {
            warn!(class = class.class_name(), error = %err, "class rejected");
            return Err(err);
        }

        let class = Arc::new(class);
        let new_module = {
            let mut inner = self.inner.write();
            let name = class.class_name();
            if inner.by_name.contains_key(name) {
                warn!(class = name, "duplicate class rejected");
                return Err(RttiError::DuplicateClass(name.to_string()));
            }
            if self.closes_cycle(&inner, &class) {
                warn!(class = name, base = class.base_class_name(), "cyclic class rejected");
                return Err(RttiError::CyclicInheritance(name.to_string()));
            }
            inner.classes.push(class.clone());
            inner.by_name.insert(name.to_string(), class.clone());
            self.generation.fetch_add(1, Ordering::AcqRel);
            inner.ensure_module(class.module_id())
        };

        debug!(
            class = class.class_name(),
            base = class.base_class_name(),
            module = class.module_id(),
            "class registered"
        );
        if let Some(module) = new_module {
            self.module_loaded.emit(&module);
        }
        self.class_loaded.emit(&class);
        Ok(class)
    }

    fn check_signatures(&self, class: &ClassDescriptor) -> RttiResult<()> {
        let max = self.options.max_parameters;
        for member in class.members() {
            let arity = match member.payload() {
                MemberPayload::Method(m) => m.signature().arity(),
                MemberPayload::Constructor(c) => c.signature().arity(),
                MemberPayload::Event(e) => e.signature().arity(),
                MemberPayload::Slot(s) => s.signature().arity(),
                MemberPayload::Attribute(_) => 0,
            };
            if arity > max {
                return Err(RttiError::InvalidRegistration(format!(
                    "{}::{} takes {} parameters, at most {} are allowed",
                    class.class_name(),
                    member.name(),
                    arity,
                    max
                )));
            }
        }
        Ok(())
    }

    fn closes_cycle(&self, inner: &Inner, class: &ClassDescriptor) -> bool {
        let own = class.class_name();
        let mut current = class.base_class_name();
        for _ in 0..=inner.classes.len() {
            if current.is_empty() {
                return false;
            }
            if current == own {
                return true;
            }
            current = match inner.get(current) {
                Some(c) => c.base_class_name(),
                None => return false,
            };
        }
        true
    }

    /// Remove every class registered by a module
    ///
    /// Objects of removed classes stay valid; they keep their descriptor.
    pub fn unregister_classes_from_module(&self, module_id: u32) -> Vec<Arc<ClassDescriptor>> {
        let removed = {
            let mut inner = self.inner.write();
            let removed = inner.remove_classes_of(module_id);
            if !removed.is_empty() {
                self.generation.fetch_add(1, Ordering::AcqRel);
            }
            removed
        };
        for class in &removed {
            debug!(class = class.class_name(), module = module_id, "class unregistered");
            self.class_unloaded.emit(class);
        }
        removed
    }

    /// Remove a module and all of its classes
    pub fn unload_module(&self, module_id: u32) -> RttiResult<Vec<Arc<ClassDescriptor>>> {
        if self.module(module_id).is_none() {
            return Err(RttiError::ModuleNotFound(module_id));
        }
        let removed = self.unregister_classes_from_module(module_id);
        let info = {
            let mut inner = self.inner.write();
            let pos = inner.modules.iter().position(|m| m.id == module_id);
            pos.map(|pos| inner.modules.remove(pos))
        };
        if let Some(info) = info {
            info!(module = module_id, name = %info.name, classes = removed.len(), "module unloaded");
            self.module_unloaded.emit(&info);
        }
        Ok(removed)
    }

    /// Register a module and let it register its types
    ///
    /// If the registrar fails, the classes it registered during this call are
    /// removed again. A module record created by this call is dropped; a
    /// record that existed before gets its previous metadata back.
    pub fn load_module(&self, registrar: &dyn ModuleRegistrar) -> RttiResult<u32> {
        let info = registrar.module_info();
        let previous = match info.id {
            0 => None,
            id => self.module(id),
        };
        let module_id = self.register_module(info);
        let mut ctx = ModuleContext {
            registry: self,
            module_id,
            classes: Vec::new(),
        };
        match registrar.register_types(&mut ctx) {
            Ok(()) => {
                info!(module = module_id, classes = ctx.classes.len(), "module loaded");
                Ok(module_id)
            }
            Err(err) => {
                warn!(module = module_id, error = %err, "module registration failed, rolling back");
                self.roll_back_load(module_id, &ctx.classes, previous);
                Err(err)
            }
        }
    }

    fn roll_back_load(
        &self,
        module_id: u32,
        classes: &[Arc<ClassDescriptor>],
        previous: Option<ModuleInfo>,
    ) {
        let (removed, dropped) = {
            let mut inner = self.inner.write();
            let removed = inner.remove_exact(classes);
            if !removed.is_empty() {
                self.generation.fetch_add(1, Ordering::AcqRel);
            }
            let pos = inner.modules.iter().position(|m| m.id == module_id);
            let dropped = match (pos, previous) {
                (Some(pos), Some(previous)) => {
                    inner.modules[pos] = previous;
                    None
                }
                (Some(pos), None) => Some(inner.modules.remove(pos)),
                (None, _) => None,
            };
            (removed, dropped)
        };
        for class in &removed {
            debug!(class = class.class_name(), module = module_id, "class unregistered");
            self.class_unloaded.emit(class);
        }
        if let Some(info) = dropped {
            info!(module = module_id, name = %info.name, "module dropped");
            self.module_unloaded.emit(&info);
        }
    }

    /// Class by full name
    pub fn get_class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.inner.read().get(name).cloned()
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.inner.read().classes.len()
    }

    /// All classes in registration order
    pub fn classes(&self) -> Vec<Arc<ClassDescriptor>> {
        self.inner.read().classes.clone()
    }

    /// Classes related to `base`, in registration order
    ///
    /// An empty `base` selects every class.
    pub fn get_classes(&self, base: &str, query: ClassQuery) -> Vec<Arc<ClassDescriptor>> {
        let mut out = Vec::new();
        self.get_classes_into(&mut out, base, query);
        out
    }

    /// Append the result of [`ClassRegistry::get_classes`] to `out`
    pub fn get_classes_into(&self, out: &mut Vec<Arc<ClassDescriptor>>, base: &str, query: ClassQuery) {
        let inner = self.inner.read();
        for class in &inner.classes {
            let name = class.class_name();
            let related = base.is_empty()
                || (name == base && query.base == BaseInclusion::IncludeBase)
                || class.base_class_name() == base
                || (query.recursion == Recursion::Recursive && inner.is_derived_from(name, base));
            if !related {
                continue;
            }
            if query.module.is_some_and(|m| m != class.module_id()) {
                continue;
            }
            if query.abstracts == AbstractInclusion::NoAbstract && !class.has_default_constructor() {
                continue;
            }
            out.push(class.clone());
        }
    }

    /// Whether `class` derives from `base`, directly or indirectly
    pub fn is_derived_from(&self, class: &str, base: &str) -> bool {
        self.inner.read().is_derived_from(class, base)
    }

    /// Resolved base class
    pub fn base_class(&self, class: &str) -> Option<Arc<ClassDescriptor>> {
        let inner = self.inner.read();
        let base = inner.get(class)?.base_class_name();
        inner.get(base).cloned()
    }

    /// Direct children of a class
    pub fn derived_classes(&self, class: &str) -> Vec<Arc<ClassDescriptor>> {
        self.get_classes(
            class,
            ClassQuery::new(
                Recursion::NonRecursive,
                BaseInclusion::NoBase,
                AbstractInclusion::IncludeAbstract,
            ),
        )
    }

    /// Effective member layout of a class
    ///
    /// Cached per class until the set of registered classes changes.
    pub fn layout(&self, class: &Arc<ClassDescriptor>) -> RttiResult<Arc<ClassLayout>> {
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(layout) = class.cached_layout(generation) {
            return Ok(layout);
        }

        let base = match class.base_class_name() {
            "" => None,
            name => {
                let base = self.get_class(name).ok_or_else(|| RttiError::MissingBaseClass {
                    class: class.class_name().to_string(),
                    base: name.to_string(),
                })?;
                Some(self.layout(&base)?)
            }
        };
        let layout = Arc::new(ClassLayout::build(class, base.as_deref()));
        class.store_layout(generation, layout.clone());
        Ok(layout)
    }

    fn require_class(&self, name: &str) -> RttiResult<Arc<ClassDescriptor>> {
        self.get_class(name)
            .ok_or_else(|| RttiError::ClassNotFound(name.to_string()))
    }

    /// Create an object from dynamic constructor arguments
    pub fn create(&self, class: &str, args: &[Value]) -> RttiResult<Object> {
        self.require_class(class)?.create(self, args)
    }

    /// Create an object from a constructor parameter string
    pub fn create_str(&self, class: &str, params: &str) -> RttiResult<Object> {
        self.require_class(class)?.create_str(self, params)
    }

    /// Create an object with the default constructor
    pub fn create_default(&self, class: &str) -> RttiResult<Object> {
        self.require_class(class)?.create_default(self)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;

    fn class(name: &str, base: &str) -> ClassDescriptor {
        ClassBuilder::new(name)
            .base(base)
            .default_constructor("")
            .build()
            .unwrap()
    }

    fn names(classes: &[Arc<ClassDescriptor>]) -> Vec<&str> {
        classes.iter().map(|c| c.class_name()).collect()
    }

    #[test]
    fn test_register_and_get() {
        let registry = ClassRegistry::new();
        registry.register_class(class("Point", "")).unwrap();
        assert_eq!(registry.get_class("Point").unwrap().class_name(), "Point");
        assert!(registry.get_class("Nonexistent").is_none());
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let registry = ClassRegistry::new();
        registry.register_class(class("Point", "")).unwrap();
        let err = registry.register_class(class("Point", "")).unwrap_err();
        assert_eq!(err, RttiError::DuplicateClass("Point".to_string()));
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn test_forward_reference_and_cycle() {
        let registry = ClassRegistry::new();
        registry.register_class(class("B", "A")).unwrap();
        registry.register_class(class("C", "B")).unwrap();
        let err = registry.register_class(class("A", "C")).unwrap_err();
        assert!(matches!(err, RttiError::CyclicInheritance(_)));
        assert!(matches!(
            registry.register_class(class("Self", "Self")),
            Err(RttiError::CyclicInheritance(_))
        ));
        registry.register_class(class("A", "")).unwrap();
        assert!(registry.is_derived_from("C", "A"));
    }

    #[test]
    fn test_get_classes_filters() {
        let registry = ClassRegistry::new();
        registry.register_class(class("Root", "")).unwrap();
        registry.register_class(class("Mid", "Root")).unwrap();
        registry
            .register_class(ClassBuilder::new("Leaf").base("Mid").build().unwrap())
            .unwrap();
        registry.register_class(class("Other", "")).unwrap();

        let recursive = registry.get_classes("Root", ClassQuery::default());
        assert_eq!(names(&recursive), vec!["Mid", "Leaf"]);

        let direct = registry.derived_classes("Root");
        assert_eq!(names(&direct), vec!["Mid"]);

        let with_base = registry.get_classes(
            "Root",
            ClassQuery::new(Recursion::Recursive, BaseInclusion::IncludeBase, AbstractInclusion::NoAbstract),
        );
        assert_eq!(names(&with_base), vec!["Root", "Mid"]);

        assert_eq!(registry.get_classes("", ClassQuery::default()).len(), 4);
    }

    #[test]
    fn test_module_filter_and_unload() {
        let registry = ClassRegistry::new();
        let id = registry.register_module(ModuleInfo::new("Extra").vendor("Acme"));
        assert_eq!(id, 10000);
        registry.register_class(class("Core", "")).unwrap();
        registry
            .register_class(ClassBuilder::new("Foo").module(id).build().unwrap())
            .unwrap();
        registry
            .register_class(ClassBuilder::new("Bar").module(id).build().unwrap())
            .unwrap();

        let in_module = registry.get_classes("", ClassQuery::default().in_module(id));
        assert_eq!(names(&in_module), vec!["Foo", "Bar"]);

        let removed = registry.unload_module(id).unwrap();
        assert_eq!(names(&removed), vec!["Foo", "Bar"]);
        assert!(registry.get_class("Foo").is_none());
        assert!(registry.get_class("Core").is_some());
        assert!(registry.module(id).is_none());
        assert!(matches!(registry.unload_module(id), Err(RttiError::ModuleNotFound(_))));
    }

    #[test]
    fn test_unknown_module_is_created() {
        let registry = ClassRegistry::new();
        registry
            .register_class(ClassBuilder::new("Foo").module(42).build().unwrap())
            .unwrap();
        let module = registry.module(42).unwrap();
        assert_eq!(module.name, "");
        assert_eq!(registry.modules().len(), 1);
    }

    #[test]
    fn test_unique_module_ids() {
        let opts = RegistryOptions {
            first_module_id: 500,
            ..RegistryOptions::default()
        };
        let registry = ClassRegistry::with_options(opts);
        let mut taken = ModuleInfo::new("Taken");
        taken.id = 501;
        registry.register_module(taken);
        assert_eq!(registry.unique_module_id(), 500);
        assert_eq!(registry.unique_module_id(), 502);
    }

    #[test]
    fn test_max_parameters_enforced() {
        let registry = ClassRegistry::with_options(RegistryOptions {
            max_parameters: 1,
            ..RegistryOptions::default()
        });
        let wide = ClassBuilder::new("Wide")
            .method("Add", "", |_: &mut Object, (a, b): (i32, i32)| a + b)
            .build()
            .unwrap();
        assert!(matches!(
            registry.register_class(wide),
            Err(RttiError::InvalidRegistration(_))
        ));
    }

    #[test]
    fn test_layout_missing_base() {
        let registry = ClassRegistry::new();
        let orphan = registry.register_class(class("Orphan", "Ghost")).unwrap();
        assert!(matches!(
            registry.layout(&orphan),
            Err(RttiError::MissingBaseClass { .. })
        ));
        assert!(registry.create_default("Orphan").is_err());
        registry.register_class(class("Ghost", "")).unwrap();
        assert!(registry.layout(&orphan).is_ok());
    }

    #[test]
    fn test_registry_events() {
        let registry = ClassRegistry::new();
        let loaded = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let l = loaded.clone();
        registry
            .class_loaded()
            .connect_fn(move |c: &Arc<ClassDescriptor>| l.lock().push(c.class_name().to_string()));
        let unloaded = Arc::new(AtomicU32::new(0));
        let u = unloaded.clone();
        registry.class_unloaded().connect_fn(move |_| {
            u.fetch_add(1, Ordering::SeqCst);
        });

        let id = registry.register_module(ModuleInfo::new("M"));
        registry
            .register_class(ClassBuilder::new("Foo").module(id).build().unwrap())
            .unwrap();
        registry.unload_module(id).unwrap();

        assert_eq!(*loaded.lock(), vec!["Foo"]);
        assert_eq!(unloaded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_registry() {
        assert!(std::ptr::eq(global(), global()));
    }
}
