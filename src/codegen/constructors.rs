//! Static factories, one per variant.
use super::Ctx;
use crate::ir::{Annotation, Expr, FieldDecl, Member, Method, Modifier, Param, Stmt};
use crate::naming;
use crate::spec::VariantSpec;

pub fn members(ctx: &Ctx<'_>) -> Vec<Member> {
    let mut members = Vec::new();
    for v in &ctx.spec.variants {
        if v.is_singleton() {
            members.push(Member::Field(shared_instance(ctx, v)));
        }
        members.push(Member::Method(factory(ctx, v)));
    }
    members
}

/// The private marker constructor: nothing outside the unit can extend the
/// sum type.
pub fn marker(ctx: &Ctx<'_>) -> Method {
    Method::constructor(&[Modifier::Private], ctx.spec.name.clone(), Vec::new(), Vec::new())
}

/// Generic sums share one raw instance across all type arguments.
fn shared_instance(ctx: &Ctx<'_>, v: &VariantSpec) -> FieldDecl {
    let modifiers = [Modifier::Private, Modifier::Static, Modifier::Final];
    let name = naming::constant(&v.name);
    let init = Some(Expr::new_(ctx.variant_raw(v), Vec::new()));
    if ctx.spec.is_generic() {
        let mut field = FieldDecl::new(&modifiers, ctx.variant_raw(v), name, init);
        field.annotations.push(Annotation::suppress("rawtypes"));
        field
    } else {
        FieldDecl::new(&modifiers, ctx.sum_type(), name, init)
    }
}

fn factory(ctx: &Ctx<'_>, v: &VariantSpec) -> Method {
    let name = naming::factory(&v.name);
    let modifiers = [Modifier::Public, Modifier::Static];

    let mut method = if v.is_singleton() {
        let shared = Expr::name(naming::constant(&v.name));
        if ctx.spec.is_generic() {
            Method::new(&modifiers, ctx.sum_type(), name, Vec::new(), vec![Stmt::Return(Expr::cast(ctx.sum_type(), shared))])
                .annotated(Annotation::suppress("unchecked"))
        } else {
            Method::new(&modifiers, ctx.sum_type(), name, Vec::new(), vec![Stmt::Return(shared)])
        }
    } else {
        let params = v.fields.iter().map(|f| Param::new(ctx.field_type(f), f.name.clone())).collect();
        let args: Vec<Expr> = v.fields.iter().map(|f| Expr::name(f.name.clone())).collect();
        let mut body = Vec::new();
        if let Some(check) = ctx.validator_call(v, args.clone()) {
            body.push(Stmt::Expr(check));
        }
        body.push(Stmt::Return(Expr::new_(ctx.variant_type(v), args)));
        Method::new(&modifiers, ctx.sum_type(), name, params, body)
    };
    method.type_params = ctx.type_params();
    method.doc = factory_doc(ctx, v);
    method
}

fn factory_doc(ctx: &Ctx<'_>, v: &VariantSpec) -> Option<crate::ir::Doc> {
    if v.is_singleton() {
        return ctx.doc(vec![format!("The shared {{@link {}}} instance.", v.name)]);
    }
    let mut lines = vec![format!("Creates a {{@link {}}}.", v.name)];
    if v.validation_hook.is_some() {
        lines.push(String::new());
        lines.push("Arguments are checked by the variant's validator, whose exceptions propagate.".into());
    }
    ctx.doc(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GenOptions;
    use crate::ir::ImportTable;
    use crate::ir::print::Printer;
    use crate::spec::{FieldSpec, GenericParam, SumTypeSpec};
    use pretty_assertions::assert_eq;

    fn print(members: &[Member]) -> String {
        let names = ImportTable::default();
        let mut printer = Printer::new(&names, 4);
        let mut class = crate::ir::Class::new(&[], "X", Vec::new());
        class.members = members.to_vec();
        printer.class(&class);
        printer.finish()
    }

    #[test]
    fn singletons_are_shared_and_factories_validate() {
        let mut spec = SumTypeSpec::new(
            "Color",
            vec![
                VariantSpec::singleton("White"),
                VariantSpec::new("RGB", vec![FieldSpec::new("r", "int"), FieldSpec::new("g", "int")])
                    .with_hook("rangeCheck"),
            ],
        );
        spec.validator_namespace = Some("com.example.Validators".into());
        let options = GenOptions { docs: false, ..GenOptions::default() };
        let ctx = Ctx::new(&spec, &options);
        assert_eq!(
            print(&members(&ctx)),
            "\
class X {

    private static final Color WHITE = new White();

    public static Color white() {
        return WHITE;
    }

    public static Color rgb(int r, int g) {
        com.example.Validators.rangeCheck(r, g);
        return new RGB(r, g);
    }
}
"
        );
    }

    #[test]
    fn generic_singletons_use_one_raw_instance() {
        let mut spec = SumTypeSpec::new(
            "Option",
            vec![VariantSpec::singleton("None"), VariantSpec::new("Some", vec![FieldSpec::new("value", "T")])],
        );
        spec.generics.push(GenericParam::new("T"));
        let options = GenOptions { docs: false, ..GenOptions::default() };
        let ctx = Ctx::new(&spec, &options);
        assert_eq!(
            print(&members(&ctx)),
            "\
class X {

    @java.lang.SuppressWarnings(\"rawtypes\")
    private static final None NONE = new None();

    @java.lang.SuppressWarnings(\"unchecked\")
    public static <T> Option<T> none() {
        return (Option<T>) NONE;
    }

    public static <T> Option<T> some(T value) {
        return new Some<T>(value);
    }
}
"
        );
    }

    #[test]
    fn qualified_hooks_ignore_the_namespace() {
        let spec = SumTypeSpec::new(
            "Shape",
            vec![VariantSpec::new("Circle", vec![FieldSpec::new("radius", "double")]).with_hook("geo.Checks.positive")],
        );
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let text = print(&members(&ctx));
        assert!(text.contains("geo.Checks.positive(radius);"));
        assert!(text.contains("Arguments are checked by the variant's validator"));
    }
}
