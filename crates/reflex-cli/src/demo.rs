//! Demo module shipped with the CLI

use glam::Vec3;
use reflex_core::{
    ClassBuilder, EnumBuilder, ModuleContext, ModuleInfo, ModuleRegistrar, Object, RttiResult,
};
use tracing::info;

/// Registers `Vehicle`, `Car` and `Calculator`
pub struct DemoModule;

impl ModuleRegistrar for DemoModule {
    fn module_info(&self) -> ModuleInfo {
        ModuleInfo::new("demo")
            .vendor("Reflex")
            .license("MIT")
            .description("Example classes for exploring the registry")
    }

    fn register_types(&self, ctx: &mut ModuleContext<'_>) -> RttiResult<()> {
        let paint = EnumBuilder::new("Paint")
            .value("Red", 0, "Signal red")
            .value("Green", 1, "Racing green")
            .value("Blue", 2, "Ocean blue")
            .build()?;
        let extras = EnumBuilder::flags("Extras")
            .value("None", 0, "No extras")
            .value("Sunroof", 1, "Sliding roof")
            .value("Turbo", 2, "Turbocharger")
            .value("Towbar", 4, "Trailer hitch")
            .build()?;

        ctx.register_class(
            ClassBuilder::new("Vehicle")
                .description("Anything that moves")
                .property("category", "transport")
                .attribute::<f32>("Speed", 0.0, "Current speed in km/h")
                .attribute("Position", Vec3::ZERO, "World position")
                .enum_attribute("Color", paint, "Red", "Body color")
                .method_fallible("Accelerate", "Add to the speed and return it", accelerate)
                .method_fallible("Stop", "Bring the vehicle to a halt", |obj: &mut Object, (): ()| {
                    obj.set("Speed", 0.0f32)
                })
                .event::<(f32,)>("SpeedChanged", "Emitted with the new speed")
                .slot("Honk", "Sound the horn", |(times,): (i32,)| info!(times, "honk"))
                .build()?,
        )?;

        ctx.register_class(
            ClassBuilder::new("Car")
                .base("Vehicle")
                .description("Four wheels and a plate")
                .attribute::<i32>("Doors", 4, "Number of doors")
                .attribute("Plate", String::new(), "License plate")
                .annotation("unique")
                .attribute_with("Extras", extras.clone(), extras.default_value(), "Fitted extras")
                .default_constructor("Create a four door car")
                .constructor("WithDoors", "Create a car with the given door count", |obj: &mut Object, (doors,): (i32,)| {
                    obj.set("Doors", doors)
                })
                .build()?,
        )?;

        ctx.register_class(
            ClassBuilder::new("Calculator")
                .namespace("math")
                .description("Integer and floating point arithmetic")
                .attribute::<f64>("Memory", 0.0, "Last result")
                .method("Add", "Add two integers", |_: &mut Object, (a, b): (i32, i32)| a + b)
                .method_fallible("Multiply", "Multiply into memory", |obj: &mut Object, (a, b): (f64, f64)| {
                    obj.set("Memory", a * b)?;
                    Ok(a * b)
                })
                .method_fallible("Recall", "Value in memory", |obj: &mut Object, (): ()| {
                    obj.get::<f64>("Memory")
                })
                .default_constructor("Create a calculator with empty memory")
                .build()?,
        )?;

        Ok(())
    }
}

fn accelerate(obj: &mut Object, (by,): (f32,)) -> RttiResult<f32> {
    let speed = obj.get::<f32>("Speed")? + by;
    obj.set("Speed", speed)?;
    if let Some(signal) = obj.signal("SpeedChanged") {
        signal.emit_typed((speed,))?;
    }
    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{ClassQuery, ClassRegistry, Value, ValueFilter};

    fn registry() -> ClassRegistry {
        let registry = ClassRegistry::new();
        registry.load_module(&DemoModule).unwrap();
        registry
    }

    #[test]
    fn test_demo_hierarchy() {
        let registry = registry();
        let names: Vec<String> = registry
            .get_classes("Vehicle", ClassQuery::default())
            .iter()
            .map(|c| c.class_name().to_string())
            .collect();
        assert_eq!(names, vec!["Car"]);
        assert!(registry.get_class("math::Calculator").is_some());
    }

    #[test]
    fn test_demo_car() {
        let registry = registry();
        let mut car = registry.create_str("Car", "Param0=2").unwrap();
        assert_eq!(car.get::<i32>("Doors").unwrap(), 2);
        car.set_attribute("Extras", "Sunroof|Towbar").unwrap();
        assert_eq!(car.get_attribute("Extras").unwrap(), "Sunroof|Towbar");
        assert_eq!(car.call_method_str("Accelerate", "Param0=30").unwrap(), "30");
        assert_eq!(
            car.get_values(ValueFilter::NoDefault),
            r#"Speed="30" Doors="2" Extras="Sunroof|Towbar""#
        );
    }

    #[test]
    fn test_demo_calculator() {
        let registry = registry();
        let mut calc = registry.create_default("math::Calculator").unwrap();
        assert_eq!(calc.call_method_str("Add", r#"Param0="2" Param1="3""#).unwrap(), "5");
        calc.call_method_str("Multiply", "Param0=1.5 Param1=4").unwrap();
        assert_eq!(calc.call_method_str("Recall", "").unwrap(), "6");
    }

    #[test]
    fn test_demo_stop_and_honk() {
        let registry = registry();
        let mut car = registry.create_default("Car").unwrap();
        car.call_method_str("Accelerate", "Param0=30").unwrap();
        assert_eq!(car.call_method_str("Stop", "").unwrap(), "");
        assert_eq!(car.get::<f32>("Speed").unwrap(), 0.0);

        assert_eq!(car.slots().map(|(name, _)| name).collect::<Vec<_>>(), vec!["Honk"]);
        car.slot("Honk").unwrap().call(&vec![Value::Int32(2)]);
    }
}
