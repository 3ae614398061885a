//! `reflex create` — Create an object and print its attribute values.

use reflex_core::{ClassRegistry, ValueFilter};

use crate::output::StyledOutput;

pub struct CreateOptions {
    pub params: Option<String>,
    pub values: Option<String>,
    pub json: bool,
}

pub fn execute(
    registry: &ClassRegistry,
    class_name: &str,
    options: &CreateOptions,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let mut obj = match &options.params {
        Some(params) => registry.create_str(class_name, params)?,
        None => registry.create_default(class_name)?,
    };
    if let Some(values) = &options.values {
        obj.set_values(values)?;
    }

    if options.json {
        out.plain(&serde_json::to_string_pretty(&obj.to_json())?);
        out.newline();
        return Ok(());
    }

    out.heading(obj.get_class().class_name());
    for var in obj.attributes() {
        out.plain("  ");
        out.name(var.name());
        out.plain(" = ");
        out.plain(&format!("\"{}\"", var.get_string()));
        if !var.is_default() {
            out.dim(" (modified)");
        }
        out.newline();
    }
    let changed = obj.get_values(ValueFilter::NoDefault);
    if !changed.is_empty() {
        out.newline();
        out.field("Changed", &changed);
    }
    out.flush();
    Ok(())
}
