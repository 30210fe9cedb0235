//! JSON view of the generation plan: stages, their combinators and every
//! field-pattern overload with its mode vector.
use serde::Serialize;

use crate::codegen::matcher::{self, ActionShape};
use crate::codegen::{Ctx, GenOptions, pattern};
use crate::error::GenError;
use crate::naming;
use crate::spec::{MatchMode, SumTypeSpec};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub result_type: String,
    pub stages: Vec<StagePlan>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePlan {
    pub index: usize,
    pub variant: String,
    pub class: String,
    /// Next stage class, or the result type at the terminal stage.
    pub returns: String,
    pub terminal: bool,
    pub total: String,
    pub guarded: String,
    pub core: String,
    pub action_shapes: Vec<&'static str>,
    pub patterns: Vec<PatternPlan>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternPlan {
    pub code: usize,
    pub method: String,
    pub modes: Vec<MatchMode>,
}

#[tracing::instrument(level = "debug", skip_all, fields(sum = %spec.name))]
pub fn describe(spec: &SumTypeSpec) -> Result<Plan, GenError> {
    crate::spec::validate(spec)?;
    let options = GenOptions::default();
    let ctx = Ctx::new(spec, &options);
    let stages = matcher::stages(spec)
        .iter()
        .map(|stage| {
            let v = stage.variant;
            StagePlan {
                index: stage.index,
                variant: v.name.clone(),
                class: stage.class_name.clone(),
                returns: match stage.next {
                    Some(next) => naming::stage_type(&next.name),
                    None => ctx.result.clone(),
                },
                terminal: stage.is_terminal(),
                total: naming::factory(&v.name),
                guarded: naming::guarded(&v.name),
                core: stage.core_name(&ctx),
                action_shapes: ActionShape::for_variant(v).iter().map(|s| s.base_name()).collect(),
                patterns: pattern::expand(&ctx, v)
                    .into_iter()
                    .map(|o| PatternPlan { code: o.code, method: o.name, modes: o.modes })
                    .collect(),
            }
        })
        .collect();
    Ok(Plan { name: spec.name.clone(), package: spec.package.clone(), result_type: ctx.result.clone(), stages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{FieldSpec, VariantSpec};
    use serde_json::json;

    #[test]
    fn plan_lists_stages_and_patterns() {
        let spec = SumTypeSpec::new(
            "Shape",
            vec![
                VariantSpec::singleton("Empty"),
                VariantSpec::new("Rect", vec![FieldSpec::new("w", "int"), FieldSpec::new("h", "int")]),
            ],
        );
        let plan = serde_json::to_value(describe(&spec).unwrap()).unwrap();
        assert_eq!(plan["resultType"], json!("R"));
        assert_eq!(plan["stages"][0]["returns"], json!("RectMatcher"));
        assert_eq!(plan["stages"][0]["actionShapes"], json!(["result", "supplier"]));
        assert_eq!(plan["stages"][0]["patterns"], json!([]));
        assert_eq!(plan["stages"][1]["terminal"], json!(true));
        assert_eq!(plan["stages"][1]["patterns"].as_array().unwrap().len(), 8);
        assert_eq!(
            plan["stages"][1]["patterns"][4],
            json!({"code": 5, "method": "rectWhereWAndH", "modes": ["predicate", "exact"]})
        );
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(describe(&SumTypeSpec::new("Never", vec![])).is_err());
    }
}
