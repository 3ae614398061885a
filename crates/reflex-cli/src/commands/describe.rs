//! `reflex describe` — Show the effective members of a class.

use reflex_core::{ClassRegistry, MemberKind};

use crate::output::StyledOutput;

pub fn execute(registry: &ClassRegistry, class_name: &str, out: &mut StyledOutput) -> anyhow::Result<()> {
    let class = registry
        .get_class(class_name)
        .ok_or_else(|| anyhow::anyhow!("class not found: {}", class_name))?;
    let layout = registry.layout(&class)?;

    out.heading(class.class_name());
    if !class.description().is_empty() {
        out.field("Description", class.description());
    }
    if !class.base_class_name().is_empty() {
        out.field("Base", class.base_class_name());
    }
    let module = registry
        .module(class.module_id())
        .map(|m| format!("{} ({})", m.name, m.id))
        .unwrap_or_else(|| class.module_id().to_string());
    out.field("Module", &module);
    for (key, value) in layout.properties() {
        out.field(key, value);
    }

    let sections = [
        ("Attributes", MemberKind::Attribute),
        ("Methods", MemberKind::Method),
        ("Events", MemberKind::Event),
        ("Slots", MemberKind::Slot),
    ];
    for (title, kind) in sections {
        let members: Vec<_> = layout.members_of(kind).collect();
        if members.is_empty() {
            continue;
        }
        out.newline();
        out.heading(title);
        for member in members {
            out.plain("  ");
            out.type_name(&member.type_string());
            out.plain(" ");
            out.name(member.name());
            if let Some(attr) = member.as_attribute() {
                let default = attr.type_ref().format(attr.default_value());
                out.plain(&format!(" = \"{}\"", default));
            }
            if !member.annotation().is_empty() {
                out.dim(&format!(" [{}]", member.annotation()));
            }
            if !member.description().is_empty() {
                out.dim(&format!("  {}", member.description()));
            }
            out.newline();
        }
    }

    let constructors: Vec<_> = class.constructors().collect();
    if !constructors.is_empty() {
        out.newline();
        out.heading("Constructors");
        for (name, ctor) in constructors {
            out.plain("  ");
            out.name(name);
            out.type_name(&ctor.signature().param_list());
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
