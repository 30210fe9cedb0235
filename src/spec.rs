//! Declarative description of a sum type, as produced by a front-end.
//!
//! Everything here is plain data. `validate` checks the invariants the
//! emitters rely on; `template` parses display/alias templates.
pub mod template;
pub mod validate;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub use template::{Segment, Template};
pub use validate::validate;

/// Equality helper used when no `equalityHelper` is configured.
pub const DEFAULT_EQUALITY_HELPER: &str = "java.util.Objects.equals";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SumTypeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    pub variants: Vec<VariantSpec>,
    /// Class that hosts the validation hooks, e.g. `com.acme.Validators`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_namespace: Option<String>,
    /// Qualified static method used for `EXACT` checks on reference types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equality_helper: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_hook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalence_alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A field type as written in Java source.
///
/// Deserializes from either `"int"` or `{"name": "int", "boxed": "Integer"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeRefRepr")]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boxed: Option<String>,
    /// Qualified names the type text needs imported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Short(String),
    Full {
        name: String,
        #[serde(default)]
        boxed: Option<String>,
        #[serde(default)]
        imports: Vec<String>,
    },
}

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Short(name) => TypeRef::new(name),
            TypeRefRepr::Full { name, boxed, imports } => TypeRef { name, boxed, imports },
        }
    }
}

/// Per-field constraint kind of one generated field-pattern overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Wildcard,
    Exact,
    Predicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SumTypeSpec {
    pub fn new(name: impl Into<String>, variants: Vec<VariantSpec>) -> Self {
        SumTypeSpec {
            name: name.into(),
            package: None,
            generics: Vec::new(),
            variants,
            validator_namespace: None,
            equality_helper: None,
        }
    }

    pub fn equality_helper(&self) -> &str {
        self.equality_helper.as_deref().unwrap_or(DEFAULT_EQUALITY_HELPER)
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        GenericParam { name: name.into(), bound: None }
    }

    pub fn bounded(name: impl Into<String>, bound: impl Into<String>) -> Self {
        GenericParam { name: name.into(), bound: Some(bound.into()) }
    }
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        VariantSpec {
            name: name.into(),
            fields,
            validation_hook: None,
            display_template: None,
            equivalence_alias: None,
        }
    }

    pub fn singleton(name: impl Into<String>) -> Self {
        VariantSpec::new(name, Vec::new())
    }

    pub fn with_hook(mut self, hook: impl Into<String>) -> Self {
        self.validation_hook = Some(hook.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.display_template = Some(template.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.equivalence_alias = Some(alias.into());
        self
    }

    /// Fieldless variants are constructed once and shared.
    pub fn is_singleton(&self) -> bool {
        self.fields.is_empty()
    }

    /// The display template, or the default `Name(f1,f2,…)` / `Name`.
    pub fn display(&self) -> Result<Template, template::TemplateError> {
        match &self.display_template {
            Some(src) => Template::parse(src),
            None => Ok(Template::default_for(self)),
        }
    }

    pub fn alias(&self) -> Option<Result<Template, template::TemplateError>> {
        self.equivalence_alias.as_deref().map(Template::parse)
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        FieldSpec { name: name.into(), ty: ty.into() }
    }
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef { name: name.into(), boxed: None, imports: Vec::new() }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        Primitive::from_name(self.name.trim())
    }

    /// The type predicates range over: `boxed`, else the primitive's
    /// wrapper, else the type itself.
    pub fn reference_type(&self) -> Cow<'_, str> {
        if let Some(boxed) = &self.boxed {
            return Cow::Borrowed(boxed);
        }
        match self.primitive() {
            Some(p) => Cow::Borrowed(p.boxed()),
            None => Cow::Borrowed(self.name.trim()),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::new(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::new(name)
    }
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "char" => Primitive::Char,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }

    pub fn boxed(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Char => "Character",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }

    /// `==` is not reflexive for NaN, so floating types compare through
    /// their wrapper's `compare`.
    pub fn is_floating(self) -> bool {
        matches!(self, Primitive::Float | Primitive::Double)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
