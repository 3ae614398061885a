//! `reflex classes` — List registered classes.

use reflex_core::{AbstractInclusion, BaseInclusion, ClassQuery, ClassRegistry, Recursion};

use crate::output::StyledOutput;

pub struct ClassFilter {
    pub base: String,
    pub recursive: bool,
    pub include_base: bool,
    pub concrete: bool,
}

impl ClassFilter {
    fn query(&self) -> ClassQuery {
        // Listing everything is always recursive
        let recursion = if self.recursive || self.base.is_empty() {
            Recursion::Recursive
        } else {
            Recursion::NonRecursive
        };
        let base = if self.include_base {
            BaseInclusion::IncludeBase
        } else {
            BaseInclusion::NoBase
        };
        let abstracts = if self.concrete {
            AbstractInclusion::NoAbstract
        } else {
            AbstractInclusion::IncludeAbstract
        };
        ClassQuery::new(recursion, base, abstracts)
    }
}

pub fn execute(registry: &ClassRegistry, filter: &ClassFilter, out: &mut StyledOutput) -> anyhow::Result<()> {
    if !filter.base.is_empty() && registry.get_class(&filter.base).is_none() {
        anyhow::bail!("class not found: {}", filter.base);
    }

    let classes = registry.get_classes(&filter.base, filter.query());
    if classes.is_empty() {
        out.warning("no classes");
        out.newline();
        return Ok(());
    }

    for class in &classes {
        out.name(class.class_name());
        if !class.base_class_name().is_empty() {
            out.plain(" : ");
            out.type_name(class.base_class_name());
        }
        if !class.has_default_constructor() {
            out.dim(" (abstract)");
        }
        if !class.description().is_empty() {
            out.dim(&format!("  {}", class.description()));
        }
        out.newline();
    }
    out.flush();
    Ok(())
}
