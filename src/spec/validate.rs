//! Input invariants. A spec that passes here can be emitted without the
//! emitters having to second-guess names, templates or type references.
use std::collections::HashMap;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FieldSpec, SumTypeSpec, Template, VariantSpec};
use crate::error::SpecError;
use crate::naming;

// ------------------------------- Policy ---------------------------------- //

/// `3^k − 1` overloads per action shape, each carrying a lambda. Every
/// lambda costs a synthetic method and several constant-pool entries, and
/// from eight fields on a stage class overflows its 65535-entry pool.
pub const MAX_PATTERN_FIELDS: usize = 7;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Identifiers inside a type expression, with the character before them.
static TYPE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^A-Za-z0-9_$])([A-Za-z_$][A-Za-z0-9_$]*)").unwrap());

/// Single capital letter, optionally numbered: the shape of a type variable.
/// A class with such a name must be imported, qualified or a variant of the
/// sum itself.
static TYPE_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][0-9]*$").unwrap());

// ------------------------------ Validation -------------------------------- //

pub fn validate(spec: &SumTypeSpec) -> Result<(), SpecError> {
    identifier("sum type name", &spec.name)?;
    if let Some(package) = &spec.package {
        qualified(package)?;
    }
    if let Some(namespace) = &spec.validator_namespace {
        qualified(namespace)?;
    }
    let helper = spec.equality_helper();
    match helper.rsplit_once('.') {
        Some((class, method)) => {
            qualified(class)?;
            identifier("equality helper", method)?;
        }
        None => return Err(SpecError::InvalidQualifiedName(helper.to_string())),
    }

    if spec.variants.is_empty() {
        return Err(SpecError::NoVariants(spec.name.clone()));
    }

    let mut generics = IndexSet::new();
    for g in &spec.generics {
        identifier("generic parameter", &g.name)?;
        if !generics.insert(g.name.as_str()) {
            return Err(SpecError::DuplicateGeneric(g.name.clone()));
        }
    }

    let mut variants = IndexSet::new();
    for v in &spec.variants {
        identifier("variant name", &v.name)?;
        if !variants.insert(v.name.as_str()) {
            return Err(SpecError::DuplicateVariant { sum: spec.name.clone(), variant: v.name.clone() });
        }
        variant(spec, v, &generics)?;
    }

    derived_names(spec)
}

fn variant(spec: &SumTypeSpec, v: &VariantSpec, generics: &IndexSet<&str>) -> Result<(), SpecError> {
    if v.fields.len() > MAX_PATTERN_FIELDS {
        return Err(SpecError::TooManyFields {
            variant: v.name.clone(),
            count: v.fields.len(),
            max: MAX_PATTERN_FIELDS,
        });
    }

    let singleton_factories: Vec<String> = spec
        .variants
        .iter()
        .filter(|o| o.is_singleton())
        .map(|o| naming::factory(&o.name))
        .collect();

    let mut fields = IndexSet::new();
    for f in &v.fields {
        identifier("field name", &f.name)?;
        if !fields.insert(f.name.as_str()) {
            return Err(SpecError::DuplicateField { variant: v.name.clone(), field: f.name.clone() });
        }
        // accessors are zero-argument instance methods
        if naming::RESERVED_MEMBERS.contains(&f.name.as_str()) || singleton_factories.contains(&f.name) {
            return Err(SpecError::ReservedName { variant: v.name.clone(), name: f.name.clone() });
        }
        field_type(spec, v, f, generics)?;
    }

    if let Some(hook) = &v.validation_hook {
        match hook.rsplit_once('.') {
            Some((class, method)) => {
                qualified(class)?;
                identifier("validation hook", method)?;
            }
            None if spec.validator_namespace.is_some() => identifier("validation hook", hook)?,
            None => {
                return Err(SpecError::UnqualifiedHook { variant: v.name.clone(), hook: hook.clone() });
            }
        }
    }

    let display = v.display().map_err(|e| bad_template(v, "display", e.to_string()))?;
    placeholders(v, "display", &display)?;
    if let Some(alias) = v.alias() {
        let alias = alias.map_err(|e| bad_template(v, "alias", e.to_string()))?;
        placeholders(v, "alias", &alias)?;
    }
    Ok(())
}

fn field_type(spec: &SumTypeSpec, v: &VariantSpec, f: &FieldSpec, generics: &IndexSet<&str>) -> Result<(), SpecError> {
    let text = f.ty.name.trim();
    if text.is_empty() {
        return Err(SpecError::EmptyType { variant: v.name.clone(), field: f.name.clone() });
    }
    for import in &f.ty.imports {
        qualified(import)?;
    }
    let texts = std::iter::once(text).chain(f.ty.boxed.as_deref());
    for text in texts {
        for cap in TYPE_TOKEN.captures_iter(text) {
            if &cap[1] == "." {
                continue;
            }
            let token = &cap[2];
            let imported = f.ty.imports.iter().any(|i| i.rsplit('.').next() == Some(token));
            let declared = spec.variants.iter().any(|o| o.name == token);
            if TYPE_VAR.is_match(token) && !generics.contains(token) && !imported && !declared {
                return Err(SpecError::UnresolvedTypeVariable {
                    variant: v.name.clone(),
                    field: f.name.clone(),
                    var: token.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn placeholders(v: &VariantSpec, what: &'static str, template: &Template) -> Result<(), SpecError> {
    for name in template.fields() {
        if !v.fields.iter().any(|f| f.name == name) {
            return Err(bad_template(v, what, format!("unknown field `{name}`")));
        }
    }
    Ok(())
}

/// Generated names must stay distinct from each other and from the
/// declared ones.
fn derived_names(spec: &SumTypeSpec) -> Result<(), SpecError> {
    let mut types: HashMap<String, String> = HashMap::new();
    claim(&mut types, spec.name.clone(), format!("sum type {}", spec.name))?;
    for g in &spec.generics {
        claim(&mut types, g.name.clone(), format!("generic {}", g.name))?;
    }
    for v in &spec.variants {
        claim(&mut types, v.name.clone(), format!("variant {}", v.name))?;
    }
    for v in &spec.variants {
        claim(&mut types, naming::stage_type(&v.name), format!("matcher of {}", v.name))?;
    }

    let mut members: HashMap<String, String> = HashMap::new();
    for v in &spec.variants {
        let owner = format!("variant {}", v.name);
        claim(&mut members, naming::factory(&v.name), owner.clone())?;
        if v.is_singleton() {
            claim(&mut members, naming::constant(&v.name), owner)?;
        }
    }
    // `otherwise` completes every matcher stage
    for reserved in naming::RESERVED_MEMBERS.iter().chain(["equivalenceKey", "otherwise"].iter()) {
        if let Some(owner) = members.get(*reserved) {
            return Err(SpecError::NameClash {
                name: reserved.to_string(),
                first: owner.clone(),
                second: "generated member".into(),
            });
        }
    }
    Ok(())
}

// ------------------------------- Utilities -------------------------------- //

fn claim(table: &mut HashMap<String, String>, name: String, owner: String) -> Result<(), SpecError> {
    if let Some(first) = table.get(&name) {
        if *first != owner {
            return Err(SpecError::NameClash { name, first: first.clone(), second: owner });
        }
        return Ok(());
    }
    table.insert(name, owner);
    Ok(())
}

fn identifier(what: &'static str, name: &str) -> Result<(), SpecError> {
    if IDENT.is_match(name) && !naming::is_keyword(name) {
        Ok(())
    } else {
        Err(SpecError::InvalidIdentifier { what, name: name.to_string() })
    }
}

fn qualified(name: &str) -> Result<(), SpecError> {
    let ok = !name.is_empty() && name.split('.').all(|part| IDENT.is_match(part) && !naming::is_keyword(part));
    if ok { Ok(()) } else { Err(SpecError::InvalidQualifiedName(name.to_string())) }
}

fn bad_template(v: &VariantSpec, what: &'static str, reason: String) -> SpecError {
    SpecError::BadTemplate { variant: v.name.clone(), what, reason }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{GenericParam, TypeRef};

    fn color() -> SumTypeSpec {
        let mut spec = SumTypeSpec::new(
            "Color",
            vec![
                VariantSpec::singleton("White"),
                VariantSpec::singleton("Black"),
                VariantSpec::new(
                    "RGB",
                    vec![FieldSpec::new("r", "int"), FieldSpec::new("g", "int"), FieldSpec::new("b", "int")],
                )
                .with_hook("rangeCheck"),
            ],
        );
        spec.validator_namespace = Some("com.example.Validators".into());
        spec
    }

    #[test]
    fn accepts_color() {
        assert_eq!(validate(&color()), Ok(()));
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        let empty = SumTypeSpec::new("Never", vec![]);
        assert_eq!(validate(&empty), Err(SpecError::NoVariants("Never".into())));

        let mut dup = color();
        dup.variants.push(VariantSpec::singleton("White"));
        assert!(matches!(validate(&dup), Err(SpecError::DuplicateVariant { .. })));

        let mut dup_field = color();
        dup_field.variants[2].fields.push(FieldSpec::new("r", "long"));
        assert!(matches!(validate(&dup_field), Err(SpecError::DuplicateField { .. })));
    }

    #[test]
    fn rejects_keywords_and_reserved_members() {
        let mut kw = color();
        kw.variants[2].fields[0].name = "class".into();
        assert!(matches!(validate(&kw), Err(SpecError::InvalidIdentifier { .. })));

        let mut reserved = color();
        reserved.variants[2].fields[0].name = "match".into();
        assert!(matches!(validate(&reserved), Err(SpecError::ReservedName { .. })));

        let mut shadow = color();
        shadow.variants[2].fields[0].name = "white".into();
        assert!(matches!(validate(&shadow), Err(SpecError::ReservedName { .. })));
    }

    #[test]
    fn type_variables_must_be_declared() {
        let mut spec = SumTypeSpec::new("Box", vec![VariantSpec::new("Full", vec![FieldSpec::new("item", "List<T>")])]);
        assert!(matches!(validate(&spec), Err(SpecError::UnresolvedTypeVariable { var, .. }) if var == "T"));
        spec.generics.push(GenericParam::new("T"));
        assert_eq!(validate(&spec), Ok(()));

        // qualified segments are not type variables
        let spec = SumTypeSpec::new("Box", vec![VariantSpec::new("Full", vec![FieldSpec::new("item", "a.B")])]);
        assert_eq!(validate(&spec), Ok(()));
    }

    #[test]
    fn hooks_need_a_namespace() {
        let mut spec = color();
        spec.validator_namespace = None;
        assert!(matches!(validate(&spec), Err(SpecError::UnqualifiedHook { .. })));
        spec.variants[2].validation_hook = Some("com.example.Checks.range".into());
        assert_eq!(validate(&spec), Ok(()));
    }

    #[test]
    fn templates_reference_existing_fields() {
        let mut spec = color();
        spec.variants[2].display_template = Some("#{r}{g}{x}".into());
        assert!(matches!(validate(&spec), Err(SpecError::BadTemplate { what: "display", .. })));
        spec.variants[2].display_template = Some("#{r}{g}{b}".into());
        spec.variants[0].equivalence_alias = Some("RGB(255,255,255)".into());
        assert_eq!(validate(&spec), Ok(()));
    }

    #[test]
    fn derived_names_do_not_collide() {
        let clash = SumTypeSpec::new("Shape", vec![VariantSpec::singleton("Circle"), VariantSpec::singleton("CircleMatcher")]);
        assert!(matches!(validate(&clash), Err(SpecError::NameClash { .. })));

        let camel = SumTypeSpec::new("Shape", vec![VariantSpec::singleton("Foo"), VariantSpec::singleton("FOO")]);
        assert!(matches!(validate(&camel), Err(SpecError::NameClash { .. })));

        let nested = SumTypeSpec::new("Shape", vec![VariantSpec::singleton("Shape")]);
        assert!(matches!(validate(&nested), Err(SpecError::NameClash { .. })));

        let stage = SumTypeSpec::new("Shape", vec![VariantSpec::singleton("Otherwise")]);
        assert!(matches!(validate(&stage), Err(SpecError::NameClash { .. })));
    }

    #[test]
    fn equality_helper_needs_a_class() {
        let mut spec = color();
        spec.equality_helper = Some("equals".into());
        assert_eq!(validate(&spec), Err(SpecError::InvalidQualifiedName("equals".into())));
        spec.equality_helper = Some("com.acme.Eq.same".into());
        assert_eq!(validate(&spec), Ok(()));
    }

    fn wide(k: usize) -> SumTypeSpec {
        let fields = (0..k).map(|i| FieldSpec::new(format!("f{i}"), "int")).collect();
        SumTypeSpec::new("Wide", vec![VariantSpec::new("Row", fields)])
    }

    #[test]
    fn field_limit() {
        assert_eq!(MAX_PATTERN_FIELDS, 7);
        assert_eq!(validate(&wide(7)), Ok(()));
        assert!(matches!(validate(&wide(8)), Err(SpecError::TooManyFields { count: 8, max: 7, .. })));
        assert!(matches!(validate(&wide(10)), Err(SpecError::TooManyFields { count: 10, .. })));
    }

    #[test]
    fn single_letter_classes_resolve_through_imports_or_variants() {
        let bare = SumTypeSpec::new("Tree", vec![VariantSpec::new("Leaf", vec![FieldSpec::new("a", "A")])]);
        assert!(matches!(validate(&bare), Err(SpecError::UnresolvedTypeVariable { .. })));

        let mut imported = TypeRef::new("A");
        imported.imports.push("com.acme.A".into());
        let spec = SumTypeSpec::new("Tree", vec![VariantSpec::new("Leaf", vec![FieldSpec::new("a", imported)])]);
        assert_eq!(validate(&spec), Ok(()));

        let qualified = SumTypeSpec::new("Tree", vec![VariantSpec::new("Leaf", vec![FieldSpec::new("a", "com.acme.A")])]);
        assert_eq!(validate(&qualified), Ok(()));

        let own = SumTypeSpec::new(
            "Tree",
            vec![VariantSpec::singleton("X"), VariantSpec::new("Node", vec![FieldSpec::new("left", "X")])],
        );
        assert_eq!(validate(&own), Ok(()));
    }
}
