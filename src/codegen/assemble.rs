//! Puts the emitted slices together and checks the result.
//!
//! Declaration order: factories, the marker constructor, variant records,
//! `match()` with the canonical-form block, then the stage chain.
use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Ctx, canonical, constructors, matcher, records};
use crate::error::GenError;
use crate::ir::{Class, ImportTable, Member, Modifier, Symbol, Unit};

pub fn unit(ctx: &Ctx<'_>) -> Unit {
    let spec = ctx.spec;
    let mut class = Class::new(&[Modifier::Public, Modifier::Abstract], spec.name.clone(), ctx.type_params());
    let variants: Vec<String> = spec.variants.iter().map(|v| format!("{{@link {}}}", v.name)).collect();
    class.doc = ctx.doc(vec![
        format!("One of {}.", variants.join(", ")),
        String::new(),
        "Values are immutable; use {@link #match()} to take them apart.".into(),
    ]);

    class.members.extend(constructors::members(ctx));
    class.members.push(Member::Method(constructors::marker(ctx)));
    class.members.extend(records::record_classes(ctx).into_iter().map(Member::Class));
    class.members.push(Member::Method(matcher::entry(ctx)));
    class.members.extend(canonical::members(ctx));
    class.members.extend(matcher::stage_classes(ctx).into_iter().map(Member::Class));

    Unit { package: spec.package.clone(), class }
}

/// Defects in the generator itself, caught before anything is printed.
pub fn check(unit: &Unit) -> Result<(), GenError> {
    let declared = unit.class.declared_types();
    check_class(&unit.class, &declared)
}

fn check_class(class: &Class, declared: &BTreeSet<String>) -> Result<(), GenError> {
    for nested in class.classes() {
        check_class(nested, declared)?;
    }
    if let Some(name) = class.local_references().into_iter().find(|n| !declared.contains(n)) {
        return Err(GenError::UndeclaredType { class: class.name.clone(), name });
    }
    let scope: HashMap<&str, Option<&str>> =
        class.type_params.iter().map(|p| (p.name.as_str(), p.bound.as_deref())).collect();
    let mut seen = HashSet::new();
    for method in class.methods() {
        let signature = method.erased_signature(&scope);
        if !seen.insert(signature.clone()) {
            return Err(GenError::SignatureClash { class: class.name.clone(), signature });
        }
    }
    Ok(())
}

/// Binds imports for every symbol the unit mentions. Names the unit
/// declares shadow imports; field type imports must bind.
pub fn imports(ctx: &Ctx<'_>, unit: &Unit) -> Result<ImportTable, GenError> {
    let reserved = unit.class.declared_types();
    let required: BTreeSet<Symbol> = ctx
        .spec
        .variants
        .iter()
        .flat_map(|v| &v.fields)
        .flat_map(|f| &f.ty.imports)
        .map(|import| Symbol::parse(import))
        .collect();
    let symbols = unit.class.symbols();
    tracing::trace!(symbols = symbols.len(), required = required.len(), "binding imports");
    Ok(ImportTable::build(ctx.spec.package.as_deref(), &reserved, &required, &symbols)?)
}
