//! Error types for spec loading, validation and generation.
use thiserror::Error;

/// A malformed sum-type spec. Generation aborts before emitting any text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("sum type `{0}` declares no variants")]
    NoVariants(String),
    #[error("duplicate variant `{variant}` in `{sum}`")]
    DuplicateVariant { sum: String, variant: String },
    #[error("duplicate field `{field}` in variant `{variant}`")]
    DuplicateField { variant: String, field: String },
    #[error("duplicate generic parameter `{0}`")]
    DuplicateGeneric(String),
    #[error("`{name}` is not a valid Java identifier ({what})")]
    InvalidIdentifier { what: &'static str, name: String },
    #[error("`{0}` is not a valid qualified name")]
    InvalidQualifiedName(String),
    #[error("field `{variant}.{field}` has an empty type")]
    EmptyType { variant: String, field: String },
    #[error("field `{variant}.{field}` refers to undeclared type variable `{var}`")]
    UnresolvedTypeVariable { variant: String, field: String, var: String },
    #[error("{what} template of `{variant}`: {reason}")]
    BadTemplate { variant: String, what: &'static str, reason: String },
    #[error("`{name}` in `{variant}` clashes with a generated member")]
    ReservedName { variant: String, name: String },
    #[error("derived name `{name}` is produced by both `{first}` and `{second}`")]
    NameClash { name: String, first: String, second: String },
    #[error("validation hook `{hook}` of `{variant}` has no namespace")]
    UnqualifiedHook { variant: String, hook: String },
    #[error("variant `{variant}` has {count} fields; field patterns support at most {max}")]
    TooManyFields { variant: String, count: usize, max: usize },
    #[error("import `{import}` cannot be bound: `{simple}` is already taken")]
    ImportConflict { import: String, simple: String },
}

/// Failure of one generation run.
///
/// `Spec` is the only user-facing variant; the others indicate a defect in
/// the generator itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("internal: `{class}` references undeclared type `{name}`")]
    UndeclaredType { class: String, name: String },
    #[error("internal: `{class}` declares `{signature}` twice")]
    SignatureClash { class: String, signature: String },
}

/// Spec JSON that could not be deserialized.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct LoadError {
    pub path: String,
    pub message: String,
}
