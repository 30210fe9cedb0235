//! Identifier derivation. Every function here is a pure function of the
//! names it is given; nothing depends on generation order.
use crate::spec::{MatchMode, SumTypeSpec};

pub const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Instance methods every generated value already has.
pub const RESERVED_MEMBERS: &[&str] = &[
    "match", "toString", "hashCode", "equals", "getClass", "notify", "notifyAll", "wait",
    "clone", "finalize",
];

pub fn is_keyword(name: &str) -> bool {
    JAVA_KEYWORDS.contains(&name)
}

/// `RGB` → `rgb`, `HTTPRequest` → `httpRequest`, `White` → `white`.
pub fn lower_camel(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lower = match run {
        0 => 0,
        n if n == chars.len() => n,
        1 => 1,
        n if chars[n].is_lowercase() => n - 1,
        n => n,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let c = if i < lower { c.to_lowercase().collect::<Vec<_>>() } else { vec![*c] };
            c.into_iter()
        })
        .collect()
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `HttpRequest` → `HTTP_REQUEST`.
pub fn constant(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }
    out
}

/// Keywords get a trailing underscore: `Default` → `default_`.
pub fn escape(name: String) -> String {
    if is_keyword(&name) { format!("{name}_") } else { name }
}

/// Factory and total-combinator name of a variant.
pub fn factory(variant: &str) -> String {
    escape(lower_camel(variant))
}

pub fn guarded(variant: &str) -> String {
    format!("{}When", lower_camel(variant))
}

pub fn stage_type(variant: &str) -> String {
    format!("{variant}Matcher")
}

pub fn wither(field: &str) -> String {
    format!("with{}", capitalize(field))
}

/// One constrained field of a field-pattern overload.
#[derive(Debug, Clone, Copy)]
pub struct PatternPart<'a> {
    pub field: &'a str,
    pub mode: MatchMode,
    /// The field's erased type is itself `Predicate`, so the mode must be
    /// spelled out to keep the erased signatures apart.
    pub ambiguous: bool,
}

/// `rgbWhereRAndB`; ambiguous parts add `Is` (exact) or `If` (predicate).
pub fn pattern(variant: &str, parts: &[PatternPart<'_>]) -> String {
    let mut out = format!("{}Where", lower_camel(variant));
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str("And");
        }
        out.push_str(&capitalize(part.field));
        if part.ambiguous {
            out.push_str(match part.mode {
                MatchMode::Predicate => "If",
                _ => "Is",
            });
        }
    }
    out
}

/// `base`, or the first of `base1`, `base2`, … that is not taken.
pub fn fresh(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{base}{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Type variable for match results; avoids every type name the sum
/// type declares.
pub fn result_type_var(spec: &SumTypeSpec) -> String {
    fresh("R", |n| {
        n == spec.name
            || spec.generics.iter().any(|g| g.name == n)
            || spec.variants.iter().any(|v| v.name == n || stage_type(&v.name) == n)
    })
}
