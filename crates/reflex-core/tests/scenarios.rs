//! End-to-end tests of the registry, dynamic variables and dynamic calls
//!
//! Each test builds its own registry so they can run in parallel.

use reflex_core::{
    AbstractInclusion, BaseInclusion, ClassBuilder, ClassQuery, ClassRegistry, EnumBuilder, Object,
    Recursion, RttiError, Value, ValueFilter,
};

fn vehicles() -> ClassRegistry {
    let registry = ClassRegistry::new();
    registry
        .register_class(
            ClassBuilder::new("Vehicle")
                .attribute::<f32>("Speed", 0.0, "Current speed")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register_class(
            ClassBuilder::new("Car")
                .base("Vehicle")
                .attribute::<i32>("Doors", 4, "Number of doors")
                .default_constructor("Create a car")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

fn names(classes: &[std::sync::Arc<reflex_core::ClassDescriptor>]) -> Vec<&str> {
    classes.iter().map(|c| c.class_name()).collect()
}

#[test]
fn test_derived_classes_exclude_base() {
    let registry = vehicles();
    let mut out = Vec::new();
    registry.get_classes_into(
        &mut out,
        "Vehicle",
        ClassQuery::new(Recursion::Recursive, BaseInclusion::NoBase, AbstractInclusion::IncludeAbstract),
    );
    assert_eq!(names(&out), vec!["Car"]);

    let with_base = registry.get_classes(
        "Vehicle",
        ClassQuery::new(Recursion::Recursive, BaseInclusion::IncludeBase, AbstractInclusion::IncludeAbstract),
    );
    assert_eq!(names(&with_base), vec!["Vehicle", "Car"]);

    let concrete = registry.get_classes(
        "Vehicle",
        ClassQuery::new(Recursion::Recursive, BaseInclusion::IncludeBase, AbstractInclusion::NoAbstract),
    );
    assert_eq!(names(&concrete), vec!["Car"]);
}

#[test]
fn test_deep_hierarchy_recursion() {
    let registry = vehicles();
    registry
        .register_class(ClassBuilder::new("SportsCar").base("Car").build().unwrap())
        .unwrap();

    let all = registry.get_classes("Vehicle", ClassQuery::default());
    assert_eq!(names(&all), vec!["Car", "SportsCar"]);

    let direct = registry.get_classes(
        "Vehicle",
        ClassQuery::new(Recursion::NonRecursive, BaseInclusion::NoBase, AbstractInclusion::IncludeAbstract),
    );
    assert_eq!(names(&direct), vec!["Car"]);
    assert!(registry.is_derived_from("SportsCar", "Vehicle"));
    assert!(!registry.is_derived_from("Vehicle", "SportsCar"));
}

#[test]
fn test_inherited_attributes() {
    let registry = vehicles();
    let mut car = registry.create_default("Car").unwrap();
    assert_eq!(car.get_values(ValueFilter::WithDefault), r#"Speed="0" Doors="4""#);
    car.set_attribute("Speed", "88").unwrap();
    assert_eq!(car.get::<f32>("Speed").unwrap(), 88.0);
}

#[test]
fn test_enum_variable_rejects_unknown_name() {
    let color = EnumBuilder::new("Color")
        .value("Red", 0, "")
        .value("Green", 1, "")
        .value("Blue", 2, "")
        .build()
        .unwrap();
    let registry = ClassRegistry::new();
    registry
        .register_class(
            ClassBuilder::new("Lamp")
                .enum_attribute("Tint", color, "Red", "Light color")
                .default_constructor("")
                .build()
                .unwrap(),
        )
        .unwrap();

    let mut lamp = registry.create_default("Lamp").unwrap();
    let mut tint = lamp.attribute_mut("Tint").unwrap();
    tint.set_string("Green").unwrap();
    assert_eq!(*tint.get(), Value::Int32(1));

    assert!(tint.set_string("Purple").is_err());
    assert_eq!(*tint.get(), Value::Int32(1));
    assert_eq!(tint.get_string(), "Green");
}

#[test]
fn test_call_method_by_string() {
    let registry = ClassRegistry::new();
    registry
        .register_class(
            ClassBuilder::new("Calculator")
                .method("Add", "Add two numbers", |_: &mut Object, (a, b): (i32, i32)| a + b)
                .default_constructor("")
                .build()
                .unwrap(),
        )
        .unwrap();

    let mut calc = registry.create_default("Calculator").unwrap();
    assert_eq!(calc.call_method_str("Add", r#"Param0="2" Param1="3""#).unwrap(), "5");
    assert_eq!(calc.call_method_str("Add", "Param1=10 Param0=-4").unwrap(), "6");
    assert!(calc.call_method_str("Add", r#"Param0="2""#).is_err());
}

#[test]
fn test_missing_class_is_not_found() {
    let registry = vehicles();
    assert!(registry.get_class("Nonexistent").is_none());
    assert!(matches!(
        registry.create_default("Nonexistent"),
        Err(RttiError::ClassNotFound(name)) if name == "Nonexistent"
    ));
    assert!(registry.get_classes("Nonexistent", ClassQuery::default()).is_empty());
}

#[test]
fn test_abstract_class_cannot_be_created() {
    let registry = vehicles();
    assert!(matches!(
        registry.create_default("Vehicle"),
        Err(RttiError::NoMatchingConstructor { .. })
    ));
}

#[test]
fn test_constructor_overloads() {
    let registry = ClassRegistry::new();
    registry
        .register_class(
            ClassBuilder::new("Point")
                .namespace("geo")
                .attribute::<i32>("X", 0, "")
                .attribute::<i32>("Y", 0, "")
                .default_constructor("Origin")
                .constructor("FromXY", "Point at x, y", |obj: &mut Object, (x, y): (i32, i32)| {
                    obj.set("X", x)?;
                    obj.set("Y", y)
                })
                .build()
                .unwrap(),
        )
        .unwrap();

    let class = registry.get_class("geo::Point").unwrap();
    assert_eq!(class.name(), "Point");
    assert_eq!(class.namespace(), "geo");

    let origin = registry.create_default("geo::Point").unwrap();
    assert_eq!(origin.get_values(ValueFilter::NoDefault), "");

    let point = registry
        .create("geo::Point", &[Value::Int32(3), Value::Int32(4)])
        .unwrap();
    assert_eq!(point.get_values(ValueFilter::NoDefault), r#"X="3" Y="4""#);

    let parsed = registry.create_str("geo::Point", "Param0=5 Param1=6").unwrap();
    assert_eq!(parsed.get::<i32>("Y").unwrap(), 6);

    assert!(registry.create("geo::Point", &[Value::Int32(3)]).is_err());
}

#[test]
fn test_class_properties_and_member_order() {
    let registry = ClassRegistry::new();
    let class = registry
        .register_class(
            ClassBuilder::new("Widget")
                .property("category", "ui")
                .property("icon", "widget.png")
                .property("category", "layout")
                .attribute::<bool>("Visible", true, "")
                .method_fallible("Show", "", |obj: &mut Object, (): ()| obj.set("Visible", true))
                .event::<()>("Clicked", "")
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(class.property("category"), Some("layout"));
    assert_eq!(class.properties().len(), 2);
    let members: Vec<&str> = class.members().iter().map(|m| m.name()).collect();
    assert_eq!(members, vec!["Visible", "Show", "Clicked"]);
}
