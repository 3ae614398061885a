//! `reflex modules` — List registered modules.

use reflex_core::ClassRegistry;

use crate::output::StyledOutput;

pub fn execute(registry: &ClassRegistry, json: bool, out: &mut StyledOutput) -> anyhow::Result<()> {
    let modules = registry.modules();
    if json {
        out.plain(&serde_json::to_string_pretty(&modules)?);
        out.newline();
        return Ok(());
    }

    for module in &modules {
        let classes = registry
            .classes()
            .iter()
            .filter(|c| c.module_id() == module.id)
            .count();
        out.name(&module.name);
        out.dim(&format!(" #{}", module.id));
        out.newline();
        if !module.vendor.is_empty() {
            out.field("Vendor", &module.vendor);
        }
        if !module.license.is_empty() {
            out.field("License", &module.license);
        }
        if !module.description.is_empty() {
            out.field("Description", &module.description);
        }
        out.field("Classes", &classes.to_string());
    }
    out.flush();
    Ok(())
}
