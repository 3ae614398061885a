//! Integration tests for module registration and unloading

use std::sync::Arc;

use parking_lot::Mutex;
use reflex_core::{
    ClassBuilder, ClassQuery, ClassRegistry, ModuleContext, ModuleInfo, ModuleRegistrar, Object,
    RttiError, RttiResult,
};

/// Module registering the given class names, failing on `fail_on`
struct NamedModule {
    id: u32,
    name: &'static str,
    classes: Vec<&'static str>,
    fail_on: Option<&'static str>,
}

impl NamedModule {
    fn new(name: &'static str, classes: &[&'static str]) -> Self {
        Self {
            id: 0,
            name,
            classes: classes.to_vec(),
            fail_on: None,
        }
    }
}

impl ModuleRegistrar for NamedModule {
    fn module_info(&self) -> ModuleInfo {
        let mut info = ModuleInfo::new(self.name)
            .vendor("Reflex")
            .license("MIT")
            .description("test module");
        info.id = self.id;
        info
    }

    fn register_types(&self, ctx: &mut ModuleContext<'_>) -> RttiResult<()> {
        for &class in &self.classes {
            if self.fail_on == Some(class) {
                return Err(RttiError::InvalidRegistration(class.to_string()));
            }
            ctx.register_class(ClassBuilder::new(class).default_constructor("").build()?)?;
        }
        Ok(())
    }
}

#[test]
fn test_unload_module_removes_its_classes() {
    let registry = ClassRegistry::new();
    let foo_bar = registry.load_module(&NamedModule::new("foobar", &["Foo", "Bar"])).unwrap();
    let other = registry.load_module(&NamedModule::new("other", &["Baz"])).unwrap();
    assert_ne!(foo_bar, other);
    assert_eq!(registry.get_class("Foo").unwrap().module_id(), foo_bar);

    let removed = registry.unload_module(foo_bar).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(registry.get_class("Foo").is_none());
    assert!(registry.get_class("Bar").is_none());
    assert!(registry.get_class("Baz").is_some());
    assert!(registry.module(foo_bar).is_none());
    assert!(registry.module(other).is_some());

    assert!(matches!(registry.unload_module(foo_bar), Err(RttiError::ModuleNotFound(_))));
}

#[test]
fn test_objects_outlive_unloaded_classes() {
    let registry = ClassRegistry::new();
    let id = registry.load_module(&NamedModule::new("foobar", &["Foo"])).unwrap();
    let foo = registry.create_default("Foo").unwrap();
    registry.unload_module(id).unwrap();

    assert_eq!(foo.get_class().class_name(), "Foo");
    assert!(registry.create_default("Foo").is_err());
}

#[test]
fn test_failed_load_rolls_back() {
    let registry = ClassRegistry::new();
    let module = NamedModule {
        id: 0,
        name: "broken",
        classes: vec!["Good", "Bad"],
        fail_on: Some("Bad"),
    };
    assert!(registry.load_module(&module).is_err());
    assert!(registry.get_class("Good").is_none());
    assert!(registry.modules().iter().all(|m| m.name != "broken"));
}

#[test]
fn test_failed_reload_keeps_existing_module() {
    let registry = ClassRegistry::new();
    let fixed = NamedModule {
        id: 7,
        ..NamedModule::new("fixed", &["Foo"])
    };
    assert_eq!(registry.load_module(&fixed).unwrap(), 7);

    let unloaded = Arc::new(Mutex::new(Vec::new()));
    let sink = unloaded.clone();
    registry
        .class_unloaded()
        .connect_fn(move |c| sink.lock().push(c.class_name().to_string()));
    let sink = unloaded.clone();
    registry
        .module_unloaded()
        .connect_fn(move |m: &ModuleInfo| sink.lock().push(format!("module {}", m.id)));

    let again = NamedModule {
        id: 7,
        ..NamedModule::new("fixed-again", &["Extra", "Foo"])
    };
    assert_eq!(
        registry.load_module(&again).unwrap_err(),
        RttiError::DuplicateClass("Foo".to_string())
    );

    assert_eq!(registry.get_class("Foo").unwrap().module_id(), 7);
    assert!(registry.get_class("Extra").is_none());
    assert_eq!(registry.module(7).unwrap().name, "fixed");
    assert_eq!(*unloaded.lock(), vec!["Extra"]);
}

#[test]
fn test_duplicate_class_across_modules() {
    let registry = ClassRegistry::new();
    registry.load_module(&NamedModule::new("first", &["Shared"])).unwrap();
    let err = registry
        .load_module(&NamedModule::new("second", &["Own", "Shared"]))
        .unwrap_err();
    assert_eq!(err, RttiError::DuplicateClass("Shared".to_string()));
    assert!(registry.get_class("Own").is_none());
    assert!(registry.get_class("Shared").is_some());
}

#[test]
fn test_module_filter_and_metadata() {
    let registry = ClassRegistry::new();
    let a = registry.load_module(&NamedModule::new("a", &["A1", "A2"])).unwrap();
    registry.load_module(&NamedModule::new("b", &["B1"])).unwrap();

    let in_a: Vec<String> = registry
        .get_classes("", ClassQuery::default().in_module(a))
        .iter()
        .map(|c| c.class_name().to_string())
        .collect();
    assert_eq!(in_a, vec!["A1", "A2"]);

    let info = registry.module(a).unwrap();
    assert_eq!(info.name, "a");
    assert_eq!(info.vendor, "Reflex");
    assert!(!info.plugin);
}

#[test]
fn test_registry_events() {
    let registry = ClassRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let sink = log.clone();
    registry
        .module_loaded()
        .connect_fn(move |m: &ModuleInfo| sink.lock().push(format!("+module {}", m.name)));
    let sink = log.clone();
    registry
        .class_loaded()
        .connect_fn(move |c| sink.lock().push(format!("+class {}", c.class_name())));
    let sink = log.clone();
    registry
        .class_unloaded()
        .connect_fn(move |c| sink.lock().push(format!("-class {}", c.class_name())));
    let sink = log.clone();
    registry
        .module_unloaded()
        .connect_fn(move |m: &ModuleInfo| sink.lock().push(format!("-module {}", m.name)));

    let id = registry.load_module(&NamedModule::new("m", &["X"])).unwrap();
    registry.unload_module(id).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["+module m", "+class X", "-class X", "-module m"]
    );
}

#[test]
fn test_registrar_sees_its_registry() {
    struct Derived;

    impl ModuleRegistrar for Derived {
        fn module_info(&self) -> ModuleInfo {
            ModuleInfo::new("derived")
        }

        fn register_types(&self, ctx: &mut ModuleContext<'_>) -> RttiResult<()> {
            ctx.register_class(
                ClassBuilder::new("Base")
                    .method("Id", "", |obj: &mut Object, (): ()| obj.id() as i64)
                    .build()?,
            )?;
            ctx.register_class(ClassBuilder::new("Child").base("Base").default_constructor("").build()?)?;
            assert_eq!(ctx.classes().len(), 2);
            assert!(ctx.registry().is_derived_from("Child", "Base"));
            Ok(())
        }
    }

    let registry = ClassRegistry::new();
    registry.load_module(&Derived).unwrap();
    let mut child = registry.create_default("Child").unwrap();
    let id = child.id() as i64;
    assert_eq!(child.call_typed::<i64, _>("Id", ()).unwrap(), id);
}
