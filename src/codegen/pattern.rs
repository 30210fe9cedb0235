//! Field-pattern overloads.
//!
//! A variant with `k` fields gets one overload per non-trivial assignment of
//! a [`MatchMode`] to each field. Combination `c` in `1..3^k` is read in
//! base 3, least significant digit first: digit `i` is the mode of field
//! `i`. Every overload synthesizes a guard and forwards to the stage's
//! guarded combinator, once per action shape.
use super::Ctx;
use super::matcher::{ActionShape, Stage};
use crate::ir::{Expr, Method, Modifier, Param, Stmt, Symbol, Type, erase_text};
use crate::naming::{self, PatternPart};
use crate::spec::{FieldSpec, MatchMode, VariantSpec};

/// One field-pattern overload family: a name, the constrained parameters
/// and the guard they feed.
#[derive(Debug, Clone)]
pub struct FieldOverload {
    pub code: usize,
    pub modes: Vec<MatchMode>,
    pub name: String,
    pub params: Vec<Param>,
    /// `it -> conjunct && conjunct …`
    pub guard: Expr,
}

pub fn combination_count(fields: usize) -> usize {
    3usize.pow(fields as u32) - 1
}

pub fn decode(code: usize, fields: usize) -> Vec<MatchMode> {
    let mut rest = code;
    (0..fields)
        .map(|_| {
            let mode = match rest % 3 {
                0 => MatchMode::Wildcard,
                1 => MatchMode::Exact,
                _ => MatchMode::Predicate,
            };
            rest /= 3;
            mode
        })
        .collect()
}

pub fn encode(modes: &[MatchMode]) -> usize {
    modes.iter().rev().fold(0, |acc, mode| {
        acc * 3
            + match mode {
                MatchMode::Wildcard => 0,
                MatchMode::Exact => 1,
                MatchMode::Predicate => 2,
            }
    })
}

/// Fields whose exact-match parameter would erase to `Predicate`, the same
/// erasure as a predicate parameter.
fn ambiguous_fields(ctx: &Ctx<'_>, v: &VariantSpec) -> Vec<bool> {
    let scope = ctx.erasure_scope();
    v.fields.iter().map(|f| erase_text(&f.ty.name, &scope) == "Predicate").collect()
}

/// Method name of one combination.
pub fn method_name(ctx: &Ctx<'_>, v: &VariantSpec, modes: &[MatchMode]) -> String {
    let ambiguous = ambiguous_fields(ctx, v);
    let parts: Vec<PatternPart<'_>> = v
        .fields
        .iter()
        .zip(modes)
        .zip(&ambiguous)
        .filter(|((_, mode), _)| **mode != MatchMode::Wildcard)
        .map(|((f, mode), ambiguous)| PatternPart { field: &f.name, mode: *mode, ambiguous: *ambiguous })
        .collect();
    naming::pattern(&v.name, &parts)
}

pub fn expand(ctx: &Ctx<'_>, v: &VariantSpec) -> Vec<FieldOverload> {
    let k = v.fields.len();
    if k == 0 {
        return Vec::new();
    }
    let it = ctx.lambda_param(v);
    (1..=combination_count(k))
        .map(|code| {
            let modes = decode(code, k);
            let name = method_name(ctx, v, &modes);
            let params = v
                .fields
                .iter()
                .zip(&modes)
                .filter_map(|(f, mode)| param_type(ctx, f, *mode).map(|ty| Param::new(ty, f.name.clone())))
                .collect();
            FieldOverload { code, name, params, guard: guard(ctx, v, &modes, &it), modes }
        })
        .collect()
}

fn param_type(ctx: &Ctx<'_>, f: &FieldSpec, mode: MatchMode) -> Option<Type> {
    match mode {
        MatchMode::Wildcard => None,
        MatchMode::Exact => Some(ctx.field_type(f)),
        MatchMode::Predicate => Some(ctx.predicate_of(ctx.reference_type(f))),
    }
}

/// The check one field contributes; `subject` names the narrowed value.
pub fn conjunct(ctx: &Ctx<'_>, f: &FieldSpec, mode: MatchMode, subject: &str) -> Option<Expr> {
    let actual = Expr::name(subject).call(f.name.clone(), Vec::new());
    let expected = Expr::name(f.name.clone());
    match mode {
        MatchMode::Wildcard => None,
        MatchMode::Exact => Some(match f.ty.primitive() {
            Some(p) if p.is_floating() => {
                let owner = Type::sym(Symbol::java_lang(p.boxed()));
                Expr::eq(Expr::static_call(owner, "compare", vec![actual, expected]), Expr::Int(0))
            }
            Some(_) => Expr::eq(actual, expected),
            None => ctx.equality_call(actual, expected),
        }),
        MatchMode::Predicate => Some(expected.call("test", vec![actual])),
    }
}

/// Conjuncts in field order, wrapped in a one-parameter lambda.
pub fn guard(ctx: &Ctx<'_>, v: &VariantSpec, modes: &[MatchMode], it: &str) -> Expr {
    let conjuncts = v.fields.iter().zip(modes).filter_map(|(f, mode)| conjunct(ctx, f, *mode, it));
    Expr::lambda(&[it], Expr::and_all(conjuncts).unwrap_or(Expr::Bool(true)))
}

/// The overload family rendered once per action shape.
pub fn render(ctx: &Ctx<'_>, stage: &Stage<'_>, overload: &FieldOverload) -> Vec<Method> {
    let v = stage.variant;
    let returns = stage.returns(ctx);
    let guarded = naming::guarded(&v.name);
    ActionShape::for_variant(v)
        .iter()
        .map(|shape| {
            let action = ctx.action_param(shape.base_name(), Some(v));
            let mut params = overload.params.clone();
            params.push(Param::new(shape.param_type(ctx, ctx.variant_type(v)), action.clone()));
            let call = Expr::This.call(guarded.clone(), vec![overload.guard.clone(), Expr::name(action)]);
            Method::new(&[Modifier::Public], returns.clone(), overload.name.clone(), params, vec![Stmt::Return(call)])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GenOptions;
    use crate::codegen::matcher::stages;
    use crate::ir::ImportTable;
    use crate::ir::print::Printer;
    use crate::spec::{SumTypeSpec, TypeRef};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn spec(fields: Vec<FieldSpec>) -> SumTypeSpec {
        SumTypeSpec::new("Shape", vec![VariantSpec::singleton("Empty"), VariantSpec::new("Box", fields)])
    }

    fn show(e: &Expr) -> String {
        let names = ImportTable::default();
        Printer::new(&names, 4).expr(e, 0)
    }

    #[test]
    fn overload_count_is_three_to_the_k_minus_one() {
        for k in 0..=4usize {
            let fields = (0..k).map(|i| FieldSpec::new(format!("f{i}"), "int")).collect();
            let spec = spec(fields);
            let options = GenOptions::default();
            let ctx = Ctx::new(&spec, &options);
            let overloads = expand(&ctx, &spec.variants[1]);
            assert_eq!(overloads.len(), 3usize.pow(k as u32) - 1);
            assert!(overloads.iter().all(|o| o.modes.iter().any(|m| *m != MatchMode::Wildcard)));

            let stage_list = stages(&spec);
            let methods: usize = overloads.iter().map(|o| render(&ctx, &stage_list[1], o).len()).sum();
            assert_eq!(methods, overloads.len() * 3);
        }
    }

    #[test]
    fn decoding_is_a_bijection() {
        for k in 1..=4usize {
            let mut seen = HashSet::new();
            for code in 1..=combination_count(k) {
                let modes = decode(code, k);
                assert_eq!(modes.len(), k);
                assert_eq!(encode(&modes), code);
                assert!(seen.insert(modes));
            }
            assert!(!seen.contains(&vec![MatchMode::Wildcard; k]));
        }
        // least significant digit is the first field
        assert_eq!(decode(1, 3), vec![MatchMode::Exact, MatchMode::Wildcard, MatchMode::Wildcard]);
        assert_eq!(decode(5, 2), vec![MatchMode::Predicate, MatchMode::Exact]);
    }

    #[test]
    fn conjuncts_follow_field_order_and_kind() {
        let spec = spec(vec![
            FieldSpec::new("x", "int"),
            FieldSpec::new("name", "String"),
            FieldSpec::new("w", "double"),
        ]);
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let v = &spec.variants[1];

        let all_exact = [MatchMode::Exact; 3];
        assert_eq!(
            show(&guard(&ctx, v, &all_exact, "it")),
            "it -> it.x() == x && java.util.Objects.equals(it.name(), name) && java.lang.Double.compare(it.w(), w) == 0"
        );

        let mixed = [MatchMode::Predicate, MatchMode::Wildcard, MatchMode::Exact];
        assert_eq!(show(&guard(&ctx, v, &mixed, "it")), "it -> x.test(it.x()) && java.lang.Double.compare(it.w(), w) == 0");

        let overloads = expand(&ctx, v);
        let code = encode(&mixed);
        let o = overloads.iter().find(|o| o.code == code).unwrap();
        assert_eq!(o.name, "boxWhereXAndW");
        let params: Vec<String> = o.params.iter().map(|p| p.name.clone()).collect();
        assert_eq!(params, vec!["x", "w"]);
        let names = ImportTable::default();
        assert_eq!(Printer::new(&names, 4).ty(&o.params[0].ty), "java.util.function.Predicate<? super java.lang.Integer>");
    }

    #[test]
    fn predicate_typed_fields_spell_out_the_mode() {
        let check = FieldSpec::new(
            "check",
            TypeRef {
                name: "Predicate<String>".into(),
                boxed: None,
                imports: vec!["java.util.function.Predicate".into()],
            },
        );
        let spec = spec(vec![check, FieldSpec::new("n", "int")]);
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let names: Vec<String> = expand(&ctx, &spec.variants[1]).into_iter().map(|o| o.name).collect();
        assert!(names.contains(&"boxWhereCheckIs".to_string()));
        assert!(names.contains(&"boxWhereCheckIf".to_string()));
        assert!(names.contains(&"boxWhereCheckIfAndN".to_string()));
        assert!(names.contains(&"boxWhereN".to_string()));
    }

    #[test]
    fn lambda_parameter_avoids_field_names() {
        let spec = spec(vec![FieldSpec::new("it", "long")]);
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let overloads = expand(&ctx, &spec.variants[1]);
        assert_eq!(show(&overloads[0].guard), "it1 -> it1.it() == it");
    }

    #[test]
    fn overloads_forward_to_the_guarded_combinator() {
        let spec = spec(vec![FieldSpec::new("result", "int")]);
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let stage_list = stages(&spec);
        let overloads = expand(&ctx, &spec.variants[1]);
        let methods = render(&ctx, &stage_list[1], &overloads[0]);
        let names = ImportTable::default();
        let mut printer = Printer::new(&names, 4);
        printer.method(&methods[0]);
        assert_eq!(
            printer.finish(),
            "public R boxWhereResult(int result, R result1) {\n    return this.boxWhen(it -> it.result() == result, result1);\n}\n"
        );
    }
}
