//! Java source generation for one sum type.
//!
//! Each submodule builds one slice of the `ir` tree; `assemble` puts the
//! slices together in declaration order, checks the result and prints it.
pub mod assemble;
pub mod canonical;
pub mod constructors;
pub mod matcher;
pub mod pattern;
pub mod records;

use std::collections::HashMap;

use crate::error::GenError;
use crate::ir::{Doc, Expr, Symbol, Type, TypeParam, sym};
use crate::naming;
use crate::spec::{FieldSpec, SumTypeSpec, VariantSpec};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Output settings that do not change the generated API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Emit Javadoc on the public surface.
    pub docs: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions { indent: 4, docs: true }
    }
}

pub struct Codegen {
    options: GenOptions,
    out: String,
}

/// Everything the emitters derive from a `SumTypeSpec`, computed once per run.
pub struct Ctx<'a> {
    pub spec: &'a SumTypeSpec,
    pub options: &'a GenOptions,
    /// Type variable of match results.
    pub result: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Codegen {
    pub fn new(options: GenOptions) -> Self {
        Codegen { options, out: String::new() }
    }

    /// Generate the compilation unit for `spec`. On error nothing is
    /// appended.
    #[tracing::instrument(level = "debug", skip_all, fields(sum = %spec.name))]
    pub fn emit(&mut self, spec: &SumTypeSpec) -> Result<(), GenError> {
        let text = generate_with(spec, &self.options)?;
        self.out.push_str(&text);
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

pub fn generate(spec: &SumTypeSpec) -> Result<String, GenError> {
    generate_with(spec, &GenOptions::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(sum = %spec.name, variants = spec.variants.len()))]
pub fn generate_with(spec: &SumTypeSpec, options: &GenOptions) -> Result<String, GenError> {
    crate::spec::validate(spec)?;
    let ctx = Ctx::new(spec, options);
    let unit = assemble::unit(&ctx);
    assemble::check(&unit)?;
    let names = assemble::imports(&ctx, &unit)?;
    let text = crate::ir::print::print_unit(&unit, &names, options.indent);
    tracing::debug!(bytes = text.len(), "generated");
    Ok(text)
}

impl<'a> Ctx<'a> {
    pub fn new(spec: &'a SumTypeSpec, options: &'a GenOptions) -> Self {
        Ctx { spec, options, result: naming::result_type_var(spec) }
    }

    pub fn type_params(&self) -> Vec<TypeParam> {
        self.spec.generics.iter().map(TypeParam::from).collect()
    }

    /// Sum type parameters followed by the result variable.
    pub fn stage_type_params(&self) -> Vec<TypeParam> {
        let mut params = self.type_params();
        params.push(TypeParam::new(self.result.clone()));
        params
    }

    pub fn generic_args(&self) -> Vec<Type> {
        self.spec.generics.iter().map(|g| Type::local(g.name.clone())).collect()
    }

    pub fn sum_type(&self) -> Type {
        Type::local_with(self.spec.name.clone(), self.generic_args())
    }

    /// `Sum<?>` for casts of unknown instances; `Sum` when not generic.
    pub fn sum_type_unknown(&self) -> Type {
        let args = self.spec.generics.iter().map(|_| Type::any()).collect();
        Type::local_with(self.spec.name.clone(), args)
    }

    pub fn variant_type(&self, v: &VariantSpec) -> Type {
        Type::local_with(v.name.clone(), self.generic_args())
    }

    /// The variant class without arguments, for `instanceof` and raw
    /// singleton instances.
    pub fn variant_raw(&self, v: &VariantSpec) -> Type {
        Type::local(v.name.clone())
    }

    pub fn stage_type(&self, v: &VariantSpec) -> Type {
        let mut args = self.generic_args();
        args.push(self.result_type());
        Type::local_with(naming::stage_type(&v.name), args)
    }

    pub fn result_type(&self) -> Type {
        Type::local(self.result.clone())
    }

    pub fn field_type(&self, f: &FieldSpec) -> Type {
        Type::raw(f.ty.name.trim())
    }

    /// What a predicate on `f` ranges over. Primitive wrappers are
    /// `java.lang` symbols so a variant of the same name cannot shadow them.
    pub fn reference_type(&self, f: &FieldSpec) -> Type {
        match (&f.ty.boxed, f.ty.primitive()) {
            (None, Some(p)) => Type::sym(Symbol::java_lang(p.boxed())),
            _ => Type::raw(f.ty.reference_type()),
        }
    }

    /// `Function<? super From, ? extends R>`
    pub fn function_of(&self, from: Type) -> Type {
        Type::generic(sym::function(), vec![Type::super_of(from), Type::extends(self.result_type())])
    }

    /// `Predicate<? super Of>`
    pub fn predicate_of(&self, of: Type) -> Type {
        Type::generic(sym::predicate(), vec![Type::super_of(of)])
    }

    /// `Supplier<? extends R>`
    pub fn supplier(&self) -> Type {
        Type::generic(sym::supplier(), vec![Type::extends(self.result_type())])
    }

    /// The action a stage stores: a function of the whole sum value.
    pub fn action_type(&self) -> Type {
        self.function_of(self.sum_type())
    }

    /// Lambda parameter name that no field of `v` shadows.
    pub fn lambda_param(&self, v: &VariantSpec) -> String {
        naming::fresh("it", |n| v.fields.iter().any(|f| f.name == n))
    }

    /// Action parameter name that no field of `v` shadows.
    pub fn action_param(&self, base: &str, v: Option<&VariantSpec>) -> String {
        naming::fresh(base, |n| v.is_some_and(|v| v.fields.iter().any(|f| f.name == n)))
    }

    /// `Namespace.hook(args…)` when the variant is validated.
    pub fn validator_call(&self, v: &VariantSpec, args: Vec<Expr>) -> Option<Expr> {
        let hook = v.validation_hook.as_deref()?;
        let (owner, method) = match hook.rsplit_once('.') {
            Some((class, method)) => (Symbol::parse(class), method),
            None => (Symbol::parse(self.spec.validator_namespace.as_deref()?), hook),
        };
        Some(Expr::static_call(Type::sym(owner), method, args))
    }

    /// `Helper.equals(lhs, rhs)` for reference-typed exact matches.
    pub fn equality_call(&self, lhs: Expr, rhs: Expr) -> Expr {
        let helper = self.spec.equality_helper();
        let (class, method) = helper.rsplit_once('.').unwrap_or(("java.util.Objects", helper));
        Expr::static_call(Type::sym(Symbol::parse(class)), method, vec![lhs, rhs])
    }

    /// Erasure scope of the sum's own type parameters.
    pub fn erasure_scope(&self) -> HashMap<&str, Option<&str>> {
        self.spec.generics.iter().map(|g| (g.name.as_str(), g.bound.as_deref())).collect()
    }

    pub fn doc(&self, lines: Vec<String>) -> Option<Doc> {
        self.options.docs.then_some(Doc(lines))
    }
}
