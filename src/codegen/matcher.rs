//! The narrowing chain of matcher stages.
//!
//! Stage `i` carries the dispatched value and the action chosen so far. Its
//! combinators only concern variant `i`; each returns stage `i + 1`, and the
//! last stage returns the result itself. The first assigned action wins.
use std::collections::BTreeSet;

use super::{Ctx, pattern};
use crate::ir::{BinOp, Class, Expr, FieldDecl, Member, Method, Modifier, Param, Stmt, Type, TypeParam, sym};
use crate::naming;
use crate::spec::{SumTypeSpec, VariantSpec};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Stage<'a> {
    pub index: usize,
    pub variant: &'a VariantSpec,
    pub class_name: String,
    /// Variant of the following stage; `None` at the terminal stage.
    pub next: Option<&'a VariantSpec>,
}

/// How a caller supplies the result of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionShape {
    Value,
    Supplier,
    Function,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Stages in declaration order.
pub fn stages(spec: &SumTypeSpec) -> Vec<Stage<'_>> {
    spec.variants
        .iter()
        .enumerate()
        .map(|(index, variant)| Stage {
            index,
            variant,
            class_name: naming::stage_type(&variant.name),
            next: spec.variants.get(index + 1),
        })
        .collect()
}

impl Stage<'_> {
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// What every combinator of this stage returns.
    pub fn returns(&self, ctx: &Ctx<'_>) -> Type {
        match self.next {
            Some(next) => ctx.stage_type(next),
            None => ctx.result_type(),
        }
    }

    /// Public method names, the core method excluded.
    pub fn method_names(&self, ctx: &Ctx<'_>) -> BTreeSet<String> {
        let v = self.variant;
        let mut names = BTreeSet::from([naming::factory(&v.name), naming::guarded(&v.name), "otherwise".to_string()]);
        names.extend(pattern::expand(ctx, v).into_iter().map(|o| o.name));
        names
    }

    /// Name of the private method every combinator funnels into.
    pub fn core_name(&self, ctx: &Ctx<'_>) -> String {
        let taken = self.method_names(ctx);
        naming::fresh("select", |n| taken.contains(n))
    }
}

impl ActionShape {
    /// Fieldless variants have nothing to pass to a function.
    pub fn for_variant(v: &VariantSpec) -> &'static [ActionShape] {
        if v.is_singleton() {
            &[ActionShape::Value, ActionShape::Supplier]
        } else {
            &[ActionShape::Value, ActionShape::Supplier, ActionShape::Function]
        }
    }

    pub fn base_name(self) -> &'static str {
        match self {
            ActionShape::Value => "result",
            ActionShape::Supplier => "supplier",
            ActionShape::Function => "function",
        }
    }

    /// Parameter type; `subject` is what a function action receives.
    pub fn param_type(self, ctx: &Ctx<'_>, subject: Type) -> Type {
        match self {
            ActionShape::Value => ctx.result_type(),
            ActionShape::Supplier => ctx.supplier(),
            ActionShape::Function => ctx.function_of(subject),
        }
    }

    /// The parameter as a stage action (a function of the whole sum value);
    /// `narrow` casts to the variant before a function action is applied.
    pub fn to_action(self, param: &str, it: &str, narrow: Option<Type>) -> Expr {
        let body = match self {
            ActionShape::Value => Expr::name(param),
            ActionShape::Supplier => Expr::name(param).call("get", Vec::new()),
            ActionShape::Function => {
                let arg = match narrow {
                    Some(ty) => Expr::cast(ty, Expr::name(it)),
                    None => Expr::name(it),
                };
                Expr::name(param).call("apply", vec![arg])
            }
        };
        Expr::lambda(&[it], body)
    }
}

/// `match()` on the sum type: the entry into the first stage.
pub fn entry(ctx: &Ctx<'_>) -> Method {
    let first = &ctx.spec.variants[0];
    let start = Expr::new_(ctx.stage_type(first), vec![Expr::This, Expr::Null]);
    let doc = ctx.doc(vec![
        format!("Starts a match over every variant of {{@code {}}}, in declaration order.", ctx.spec.name),
        String::new(),
        "Each stage accepts a branch for one variant and the first branch whose".into(),
        "variant and guard accept the value is applied. A chain that runs out of".into(),
        "branches without a match throws {@code IllegalStateException}; end it".into(),
        "with {@code otherwise} to supply a default instead.".into(),
    ]);
    Method::new(&[Modifier::Public], ctx.stage_type(first), "match", Vec::new(), vec![Stmt::Return(start)])
        .generic(vec![TypeParam::new(ctx.result.clone())])
        .with_doc(doc)
}

pub fn stage_classes(ctx: &Ctx<'_>) -> Vec<Class> {
    stages(ctx.spec).iter().map(|stage| stage_class(ctx, stage)).collect()
}

pub fn stage_class(ctx: &Ctx<'_>, stage: &Stage<'_>) -> Class {
    let v = stage.variant;
    let core = stage.core_name(ctx);
    let mut class = Class::new(&[Modifier::Public, Modifier::Static, Modifier::Final], stage.class_name.clone(), ctx.stage_type_params());
    class.doc = ctx.doc(vec![match stage.next {
        Some(next) => format!("Match stage for {{@link {}}}; continues with {{@link {}}}.", v.name, naming::stage_type(&next.name)),
        None => format!("Final match stage, for {{@link {}}}.", v.name),
    }]);

    let state = [Modifier::Private, Modifier::Final];
    class.members.push(Member::Field(FieldDecl::new(&state, ctx.sum_type(), "value", None)));
    class.members.push(Member::Field(FieldDecl::new(&state, ctx.action_type(), "action", None)));
    class.members.push(Member::Method(Method::constructor(
        &[Modifier::Private],
        stage.class_name.clone(),
        vec![Param::new(ctx.sum_type(), "value"), Param::new(ctx.action_type(), "action")],
        vec![
            Stmt::Assign { target: Expr::this_field("value"), value: Expr::name("value") },
            Stmt::Assign { target: Expr::this_field("action"), value: Expr::name("action") },
        ],
    )));

    let returns = stage.returns(ctx);
    let it = ctx.lambda_param(v);
    let always = Expr::lambda(&[it.as_str()], Expr::Bool(true));
    let shapes = ActionShape::for_variant(v);

    for shape in shapes {
        let param = ctx.action_param(shape.base_name(), Some(v));
        let action = shape.to_action(&param, &it, Some(ctx.variant_type(v)));
        let call = Expr::This.call(core.clone(), vec![always.clone(), action]);
        class.members.push(Member::Method(Method::new(
            &[Modifier::Public],
            returns.clone(),
            naming::factory(&v.name),
            vec![Param::new(shape.param_type(ctx, ctx.variant_type(v)), param)],
            vec![Stmt::Return(call)],
        )));
    }

    let guard = ctx.action_param("guard", Some(v));
    for shape in shapes {
        let param = ctx.action_param(shape.base_name(), Some(v));
        let action = shape.to_action(&param, &it, Some(ctx.variant_type(v)));
        let call = Expr::This.call(core.clone(), vec![Expr::name(guard.clone()), action]);
        class.members.push(Member::Method(Method::new(
            &[Modifier::Public],
            returns.clone(),
            naming::guarded(&v.name),
            vec![
                Param::new(ctx.predicate_of(ctx.variant_type(v)), guard.clone()),
                Param::new(shape.param_type(ctx, ctx.variant_type(v)), param),
            ],
            vec![Stmt::Return(call)],
        )));
    }

    for overload in pattern::expand(ctx, v) {
        class.members.extend(pattern::render(ctx, stage, &overload).into_iter().map(Member::Method));
    }

    class.members.extend(otherwise(ctx).into_iter().map(Member::Method));
    class.members.push(Member::Method(select(ctx, stage, &core)));
    class
}

/// `otherwise(…)`: completes the chain with a default for any value no
/// earlier branch accepted.
fn otherwise(ctx: &Ctx<'_>) -> Vec<Method> {
    let mut methods = Vec::new();
    for shape in [ActionShape::Value, ActionShape::Supplier] {
        let param = shape.base_name();
        let call = Expr::This.call("otherwise", vec![shape.to_action(param, "it", None)]);
        methods.push(Method::new(
            &[Modifier::Public],
            ctx.result_type(),
            "otherwise",
            vec![Param::new(shape.param_type(ctx, ctx.sum_type()), param)],
            vec![Stmt::Return(call)],
        ));
    }
    let function = ActionShape::Function.base_name();
    methods.push(Method::new(
        &[Modifier::Public],
        ctx.result_type(),
        "otherwise",
        vec![Param::new(ctx.action_type(), function)],
        vec![
            Stmt::if_(
                Expr::binary(BinOp::Ne, Expr::this_field("action"), Expr::Null),
                vec![Stmt::Return(Expr::this_field("action").call("apply", vec![Expr::this_field("value")]))],
            ),
            Stmt::Return(Expr::name(function).call("apply", vec![Expr::this_field("value")])),
        ],
    ));
    methods
}

/// The core transition: keep an assigned action, else assign `action` when
/// the value is this stage's variant and `guard` holds.
fn select(ctx: &Ctx<'_>, stage: &Stage<'_>, name: &str) -> Method {
    let v = stage.variant;
    let value = Expr::this_field("value");
    let assigned = Expr::binary(BinOp::Ne, Expr::this_field("action"), Expr::Null);
    let accepts = Expr::binary(
        BinOp::And,
        value.clone().instance_of(ctx.variant_raw(v)),
        Expr::name("guard").call("test", vec![Expr::cast(ctx.variant_type(v), value.clone())]),
    );

    let body = match stage.next {
        Some(next) => {
            let advance = |action: Expr| Stmt::Return(Expr::new_(ctx.stage_type(next), vec![value.clone(), action]));
            vec![
                Stmt::if_(assigned, vec![advance(Expr::this_field("action"))]),
                Stmt::if_(accepts, vec![advance(Expr::name("action"))]),
                advance(Expr::Null),
            ]
        }
        None => {
            let message = Expr::concat(vec![
                Expr::str(format!("Non-exhaustive match on {}: no branch accepted ", ctx.spec.name)),
                value.clone().call("getClass", Vec::new()).call("getSimpleName", Vec::new()),
            ]);
            vec![
                Stmt::if_(assigned, vec![Stmt::Return(Expr::this_field("action").call("apply", vec![value.clone()]))]),
                Stmt::if_(accepts, vec![Stmt::Return(Expr::name("action").call("apply", vec![value.clone()]))]),
                Stmt::Throw(Expr::new_(Type::sym(sym::illegal_state()), vec![message])),
            ]
        }
    };

    Method::new(
        &[Modifier::Private],
        stage.returns(ctx),
        name.to_string(),
        vec![
            Param::new(ctx.predicate_of(ctx.variant_type(v)), "guard"),
            Param::new(ctx.action_type(), "action"),
        ],
        body,
    )
}
