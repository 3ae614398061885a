//! Integration tests for registry configuration files

use std::io::Write;

use reflex_core::{ClassBuilder, ClassRegistry, Object, RegistryOptions, RttiError, Value};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_options_from_file_drive_registry() {
    let file = write_config(
        r#"
[registry]
max_parameters = 2
strict_enum_values = true
"#,
    );
    let options = RegistryOptions::from_file(file.path()).unwrap();
    assert_eq!(options.max_parameters, 2);

    let registry = ClassRegistry::with_options(options);
    let three = ClassBuilder::new("Wide")
        .method("Sum", "", |_: &mut Object, (a, b, c): (i32, i32, i32)| a + b + c)
        .build()
        .unwrap();
    assert!(matches!(
        registry.register_class(three),
        Err(RttiError::InvalidRegistration(_))
    ));

    let two = ClassBuilder::new("Narrow")
        .method("Sum", "", |_: &mut Object, (a, b): (i32, i32)| a + b)
        .default_constructor("")
        .build()
        .unwrap();
    registry.register_class(two).unwrap();
    let mut narrow = registry.create_default("Narrow").unwrap();
    assert_eq!(
        narrow.call_method("Sum", &[Value::Int32(1), Value::Int32(2)]).unwrap(),
        Value::Int32(3)
    );
}

#[test]
fn test_first_module_id_from_file() {
    let file = write_config("[registry]\nfirst_module_id = 500\n");
    let registry = ClassRegistry::with_options(RegistryOptions::from_file(file.path()).unwrap());
    assert_eq!(registry.unique_module_id(), 500);
    assert_eq!(registry.unique_module_id(), 501);
}

#[test]
fn test_invalid_config_file() {
    let file = write_config("[registry]\nmax_parameters = \"many\"\n");
    assert!(RegistryOptions::from_file(file.path()).is_err());

    let missing = file.path().with_extension("missing");
    assert!(RegistryOptions::from_file(&missing).is_err());
}
