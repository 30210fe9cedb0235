//! Display and equivalence-alias templates: literal text with `{field}`
//! placeholders; `{{` and `}}` stand for literal braces.
use thiserror::Error;

use super::VariantSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed `{{` at byte {at}")]
    Unclosed { at: usize },
    #[error("unmatched `}}` at byte {at}")]
    StrayClose { at: usize },
    #[error("empty placeholder at byte {at}")]
    EmptyPlaceholder { at: usize },
}

impl Template {
    pub fn parse(src: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = src.char_indices().peekable();
        while let Some((at, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    text.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => name.push(c),
                            None => return Err(TemplateError::Unclosed { at }),
                        }
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder { at });
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Field(name.to_string()));
                }
                '}' => return Err(TemplateError::StrayClose { at }),
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(Template { segments })
    }

    /// `White` for singletons, `RGB(r,g,b)` with the field values otherwise.
    pub fn default_for(variant: &VariantSpec) -> Self {
        if variant.is_singleton() {
            return Template { segments: vec![Segment::Text(variant.name.clone())] };
        }
        let mut segments = vec![Segment::Text(format!("{}(", variant.name))];
        for (i, field) in variant.fields.iter().enumerate() {
            if i > 0 {
                segments.push(Segment::Text(",".into()));
            }
            segments.push(Segment::Field(field.name.clone()));
        }
        segments.push(Segment::Text(")".into()));
        Template { segments }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// The literal text when the template has no placeholders.
    pub fn as_literal(&self) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(_) => return None,
            }
        }
        Some(out)
    }
}
