//! Immutable variant classes.
use super::Ctx;
use crate::ir::{Class, Expr, FieldDecl, Member, Method, Modifier, Param, Stmt};
use crate::naming;
use crate::spec::VariantSpec;

pub fn record_classes(ctx: &Ctx<'_>) -> Vec<Class> {
    ctx.spec.variants.iter().map(|v| record_class(ctx, v)).collect()
}

pub fn record_class(ctx: &Ctx<'_>, v: &VariantSpec) -> Class {
    let mut class = Class::new(&[Modifier::Public, Modifier::Static, Modifier::Final], v.name.clone(), ctx.type_params());
    class.extends = Some(ctx.sum_type());

    for f in &v.fields {
        class.members.push(Member::Field(FieldDecl::new(
            &[Modifier::Private, Modifier::Final],
            ctx.field_type(f),
            f.name.clone(),
            None,
        )));
    }

    let params = v.fields.iter().map(|f| Param::new(ctx.field_type(f), f.name.clone())).collect();
    let assigns = v
        .fields
        .iter()
        .map(|f| Stmt::Assign { target: Expr::this_field(f.name.clone()), value: Expr::name(f.name.clone()) })
        .collect();
    class.members.push(Member::Method(Method::constructor(&[Modifier::Private], v.name.clone(), params, assigns)));

    for f in &v.fields {
        class.members.push(Member::Method(Method::new(
            &[Modifier::Public],
            ctx.field_type(f),
            f.name.clone(),
            Vec::new(),
            vec![Stmt::Return(Expr::this_field(f.name.clone()))],
        )));
    }
    for (i, _) in v.fields.iter().enumerate() {
        class.members.push(Member::Method(wither(ctx, v, i)));
    }
    class
}

/// `withF(f)`: a copy with field `index` replaced. The copy goes through
/// the variant's validator like any freshly built value.
pub fn wither(ctx: &Ctx<'_>, v: &VariantSpec, index: usize) -> Method {
    let replaced = &v.fields[index];
    let args: Vec<Expr> = v
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| if i == index { Expr::name(f.name.clone()) } else { Expr::this_field(f.name.clone()) })
        .collect();
    let mut body = Vec::new();
    if let Some(check) = ctx.validator_call(v, args.clone()) {
        body.push(Stmt::Expr(check));
    }
    body.push(Stmt::Return(Expr::new_(ctx.variant_type(v), args)));
    Method::new(
        &[Modifier::Public],
        ctx.variant_type(v),
        naming::wither(&replaced.name),
        vec![Param::new(ctx.field_type(replaced), replaced.name.clone())],
        body,
    )
}
