//! `reflex call` — Call a method by name with a parameter string.

use reflex_core::ClassRegistry;

use crate::output::StyledOutput;

pub fn execute(
    registry: &ClassRegistry,
    class_name: &str,
    method: &str,
    params: &str,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let mut obj = registry.create_default(class_name)?;
    let function = obj
        .method(method)
        .ok_or_else(|| anyhow::anyhow!("{} has no method {}", class_name, method))?;

    let result = obj.call_method_str(method, params)?;
    out.type_name(&function.signature().to_string());
    out.plain(" ");
    out.name(method);
    out.plain(" -> ");
    out.plain(&result);
    out.newline();
    out.flush();
    Ok(())
}
