//! `toString`, `equals` and `hashCode`, all derived from the match chain.
//!
//! The canonical string is computed once through an exhaustive match and
//! cached in a volatile field. Equality and hashing use the equivalence key:
//! the canonical string, or a variant's alias rendering when it declares one.
use super::Ctx;
use crate::ir::{Annotation, Expr, FieldDecl, Member, Method, Modifier, Param, Stmt, Type, sym};
use crate::naming;
use crate::spec::{Segment, Template, VariantSpec};

const CACHE: &str = "canonical";
const KEY: &str = "equivalenceKey";

pub fn members(ctx: &Ctx<'_>) -> Vec<Member> {
    let mut members = vec![
        Member::Field(FieldDecl::new(&[Modifier::Private, Modifier::Volatile], Type::sym(sym::string()), CACHE, None)),
        Member::Method(to_string(ctx)),
        Member::Method(equals(ctx)),
        Member::Method(hash_code(ctx)),
    ];
    if has_aliases(ctx) {
        members.push(Member::Method(equivalence_key(ctx)));
    }
    members
}

fn has_aliases(ctx: &Ctx<'_>) -> bool {
    ctx.spec.variants.iter().any(|v| v.equivalence_alias.is_some())
}

fn key_method(ctx: &Ctx<'_>) -> &'static str {
    if has_aliases(ctx) { KEY } else { "toString" }
}

/// Double-checked: the lock is only taken while the cache is empty.
fn to_string(ctx: &Ctx<'_>) -> Method {
    let local = "result";
    let cache = || Expr::this_field(CACHE);
    let empty = || Expr::eq(Expr::name(local), Expr::Null);
    let rendered = chain(ctx, |v| Some(v.display().unwrap_or_else(|_| Template::default_for(v))));
    let body = vec![
        Stmt::Local { ty: Type::sym(sym::string()), name: local.into(), init: cache() },
        Stmt::if_(
            empty(),
            vec![Stmt::Synchronized {
                lock: Expr::This,
                body: vec![
                    Stmt::Assign { target: Expr::name(local), value: cache() },
                    Stmt::if_(
                        empty(),
                        vec![
                            Stmt::Assign { target: Expr::name(local), value: rendered },
                            Stmt::Assign { target: cache(), value: Expr::name(local) },
                        ],
                    ),
                ],
            }],
        ),
        Stmt::Return(Expr::name(local)),
    ];
    Method::new(&[Modifier::Public], Type::sym(sym::string()), "toString", Vec::new(), body)
        .annotated(Annotation::override_())
}

fn equals(ctx: &Ctx<'_>) -> Method {
    let other = Expr::name("other");
    let key = key_method(ctx);
    let theirs = Expr::cast(ctx.sum_type_unknown(), other.clone()).call(key, Vec::new());
    let body = vec![
        Stmt::if_(Expr::eq(Expr::This, other.clone()), vec![Stmt::Return(Expr::Bool(true))]),
        Stmt::if_(
            other.instance_of(Type::local(ctx.spec.name.clone())).not(),
            vec![Stmt::Return(Expr::Bool(false))],
        ),
        Stmt::Return(Expr::This.call(key, Vec::new()).call("equals", vec![theirs])),
    ];
    Method::new(
        &[Modifier::Public],
        Type::raw("boolean"),
        "equals",
        vec![Param::new(Type::sym(sym::object()), "other")],
        body,
    )
    .annotated(Annotation::override_())
}

fn hash_code(ctx: &Ctx<'_>) -> Method {
    let hash = Expr::This.call(key_method(ctx), Vec::new()).call("hashCode", Vec::new());
    Method::new(&[Modifier::Public], Type::raw("int"), "hashCode", Vec::new(), vec![Stmt::Return(hash)])
        .annotated(Annotation::override_())
}

/// The alias rendering where declared; otherwise the canonical string.
fn equivalence_key(ctx: &Ctx<'_>) -> Method {
    let key = chain(ctx, |v| match v.alias() {
        Some(alias) => alias.ok(),
        None => None,
    });
    Method::new(&[Modifier::Private], Type::sym(sym::string()), KEY, Vec::new(), vec![Stmt::Return(key)])
}

/// `this.<String>match().a(…).b(…)…` with one branch per variant. A
/// variant without a template falls back to its own `toString`.
fn chain(ctx: &Ctx<'_>, template: impl Fn(&VariantSpec) -> Option<Template>) -> Expr {
    let start = Expr::This.call_typed(vec![Type::sym(sym::string())], "match", Vec::new());
    ctx.spec.variants.iter().fold(start, |chain, v| {
        let branch = match template(v) {
            Some(t) => render(ctx, v, &t),
            None => fallback(ctx, v),
        };
        chain.call(naming::factory(&v.name), vec![branch])
    })
}

/// A literal for placeholder-free templates, else a string concatenation
/// over the variant's accessors.
pub fn render(ctx: &Ctx<'_>, v: &VariantSpec, template: &Template) -> Expr {
    if let Some(literal) = template.as_literal() {
        return Expr::str(literal);
    }
    let it = ctx.lambda_param(v);
    let parts = template
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => Expr::str(text.clone()),
            Segment::Field(field) => Expr::name(it.clone()).call(field.clone(), Vec::new()),
        })
        .collect();
    Expr::lambda(&[it.as_str()], Expr::concat(parts))
}

fn fallback(ctx: &Ctx<'_>, v: &VariantSpec) -> Expr {
    // fieldless variants always render their literal template
    if v.is_singleton() {
        return render(ctx, v, &v.display().unwrap_or_else(|_| Template::default_for(v)));
    }
    let it = ctx.lambda_param(v);
    Expr::lambda(&[it.as_str()], Expr::name(it.clone()).call("toString", Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GenOptions;
    use crate::ir::ImportTable;
    use crate::ir::print::Printer;
    use crate::spec::{FieldSpec, SumTypeSpec};
    use pretty_assertions::assert_eq;

    fn color() -> SumTypeSpec {
        SumTypeSpec::new(
            "Color",
            vec![
                VariantSpec::singleton("White"),
                VariantSpec::singleton("Black"),
                VariantSpec::new(
                    "RGB",
                    vec![FieldSpec::new("r", "int"), FieldSpec::new("g", "int"), FieldSpec::new("b", "int")],
                ),
            ],
        )
    }

    fn print_method(m: &Method) -> String {
        let names = ImportTable::default();
        let mut printer = Printer::new(&names, 4);
        printer.method(m);
        printer.finish()
    }

    #[test]
    fn canonical_string_is_memoized_behind_a_double_check() {
        let spec = color();
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let members = members(&ctx);
        let Member::Field(cache) = &members[0] else { panic!("cache field first") };
        assert_eq!(cache.modifiers, vec![Modifier::Private, Modifier::Volatile]);
        let Member::Method(to_string) = &members[1] else { panic!("toString second") };
        assert_eq!(
            print_method(to_string),
            "\
@java.lang.Override
public java.lang.String toString() {
    java.lang.String result = this.canonical;
    if (result == null) {
        synchronized (this) {
            result = this.canonical;
            if (result == null) {
                result = this.<java.lang.String>match().white(\"White\").black(\"Black\").rgb(it -> \"RGB(\" + it.r() + \",\" + it.g() + \",\" + it.b() + \")\");
                this.canonical = result;
            }
        }
    }
    return result;
}
"
        );
    }

    #[test]
    fn equality_goes_through_the_canonical_string() {
        let spec = color();
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let text = print_method(&equals(&ctx));
        assert!(text.contains("    if (this == other) {\n        return true;\n    }\n"));
        assert!(text.contains("    if (!(other instanceof Color)) {\n        return false;\n    }\n"));
        assert!(text.contains("    return this.toString().equals(((Color) other).toString());\n"));
        assert!(print_method(&hash_code(&ctx)).contains("return this.toString().hashCode();"));
        assert_eq!(members(&ctx).len(), 4);
    }

    #[test]
    fn aliases_define_the_equivalence_key() {
        let mut spec = color();
        spec.variants[0].equivalence_alias = Some("RGB(255,255,255)".into());
        spec.variants[2].display_template = Some("#{r}/{g}/{b}".into());
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let members = members(&ctx);
        assert_eq!(members.len(), 5);
        let Member::Method(key) = &members[4] else { panic!("equivalenceKey last") };
        assert_eq!(
            print_method(key),
            "\
private java.lang.String equivalenceKey() {
    return this.<java.lang.String>match().white(\"RGB(255,255,255)\").black(\"Black\").rgb(it -> it.toString());
}
"
        );
        assert!(print_method(&equals(&ctx)).contains("this.equivalenceKey().equals(((Color) other).equivalenceKey())"));
        assert!(print_method(&to_string(&ctx)).contains(".rgb(it -> \"#\" + it.r() + \"/\" + it.g() + \"/\" + it.b())"));
    }

    #[test]
    fn templates_starting_with_a_field_still_concatenate_strings() {
        let spec = SumTypeSpec::new(
            "Num",
            vec![VariantSpec::new("Pair", vec![FieldSpec::new("a", "int"), FieldSpec::new("b", "int")]).with_template("{a}{b}")],
        );
        let options = GenOptions::default();
        let ctx = Ctx::new(&spec, &options);
        let v = &spec.variants[0];
        let names = ImportTable::default();
        let rendered = render(&ctx, v, &v.display().unwrap());
        assert_eq!(Printer::new(&names, 4).expr(&rendered, 0), "it -> \"\" + it.a() + it.b()");
    }
}
