// Strongly-typed Java IR for codegen. Emitters build it; `print` renders it.
pub mod imports;
pub mod print;

use std::collections::{BTreeSet, HashMap};

pub use imports::ImportTable;

// ————————————————————————————————————————————————————————————————————————————
// SYMBOLS & TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A top-level Java type outside the generated unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    pub package: String,   // empty for the default package
    pub name: String,
}

impl Symbol {
    pub fn new(package: &str, name: &str) -> Self {
        Symbol { package: package.to_string(), name: name.to_string() }
    }

    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, name)) => Symbol::new(package, name),
            None => Symbol::new("", qualified),
        }
    }

    pub fn java_lang(name: &str) -> Self {
        Symbol::new("java.lang", name)
    }

    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Well-known symbols referenced by generated code.
pub mod sym {
    use super::Symbol;

    pub fn object() -> Symbol { Symbol::java_lang("Object") }
    pub fn string() -> Symbol { Symbol::java_lang("String") }
    pub fn override_() -> Symbol { Symbol::java_lang("Override") }
    pub fn suppress_warnings() -> Symbol { Symbol::java_lang("SuppressWarnings") }
    pub fn illegal_state() -> Symbol { Symbol::java_lang("IllegalStateException") }
    pub fn function() -> Symbol { Symbol::new("java.util.function", "Function") }
    pub fn predicate() -> Symbol { Symbol::new("java.util.function", "Predicate") }
    pub fn supplier() -> Symbol { Symbol::new("java.util.function", "Supplier") }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Spec-provided type text, printed verbatim.
    Raw(String),
    Sym { sym: Symbol, args: Vec<Type> },
    /// A type declared in the unit: nested class or type variable.
    Local { name: String, args: Vec<Type> },
    Wildcard(Wildcard),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Wildcard {
    Any,
    Super(Box<Type>),
    Extends(Box<Type>),
}

impl Type {
    pub fn raw(text: impl Into<String>) -> Self {
        Type::Raw(text.into())
    }

    pub fn sym(sym: Symbol) -> Self {
        Type::Sym { sym, args: Vec::new() }
    }

    pub fn generic(sym: Symbol, args: Vec<Type>) -> Self {
        Type::Sym { sym, args }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Type::Local { name: name.into(), args: Vec::new() }
    }

    pub fn local_with(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Local { name: name.into(), args }
    }

    pub fn super_of(ty: Type) -> Self {
        Type::Wildcard(Wildcard::Super(Box::new(ty)))
    }

    pub fn extends(ty: Type) -> Self {
        Type::Wildcard(Wildcard::Extends(Box::new(ty)))
    }

    pub fn any() -> Self {
        Type::Wildcard(Wildcard::Any)
    }

    fn symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Type::Raw(_) => {}
            Type::Sym { sym, args } => {
                out.insert(sym.clone());
                args.iter().for_each(|a| a.symbols(out));
            }
            Type::Local { args, .. } => args.iter().for_each(|a| a.symbols(out)),
            Type::Wildcard(Wildcard::Any) => {}
            Type::Wildcard(Wildcard::Super(t) | Wildcard::Extends(t)) => t.symbols(out),
        }
    }

    fn locals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Type::Raw(_) => {}
            Type::Sym { args, .. } => args.iter().for_each(|a| a.locals(out)),
            Type::Local { name, args } => {
                out.push(name);
                args.iter().for_each(|a| a.locals(out));
            }
            Type::Wildcard(Wildcard::Any) => {}
            Type::Wildcard(Wildcard::Super(t) | Wildcard::Extends(t)) => t.locals(out),
        }
    }

    /// Erased type as it appears in a method descriptor, by simple name.
    pub fn erasure(&self, params: &HashMap<&str, Option<&str>>) -> String {
        match self {
            Type::Raw(text) => erase_text(text, params),
            Type::Sym { sym, .. } => sym.name.clone(),
            Type::Local { name, .. } => erase_text(name, params),
            Type::Wildcard(_) => "Object".into(),
        }
    }
}

/// Erasure of Java type text: type arguments dropped, qualifiers dropped,
/// type variables replaced by their first bound.
pub fn erase_text(text: &str, params: &HashMap<&str, Option<&str>>) -> String {
    erase_depth(text, params, 0)
}

fn erase_depth(text: &str, params: &HashMap<&str, Option<&str>>, depth: usize) -> String {
    let mut base = String::new();
    let mut nesting = 0usize;
    for c in text.chars() {
        match c {
            '<' => nesting += 1,
            '>' => nesting = nesting.saturating_sub(1),
            c if nesting == 0 && !c.is_whitespace() => base.push(c),
            _ => {}
        }
    }
    let dims = base.matches("[]").count();
    let head = base.trim_end_matches("[]");
    let head = head.rsplit('.').next().unwrap_or(head);
    let head = match params.get(head) {
        Some(_) if depth > 8 => "Object".to_string(),
        Some(Some(bound)) => {
            let first = bound.split('&').next().unwrap_or_default();
            erase_depth(first, params, depth + 1)
        }
        Some(None) => "Object".to_string(),
        None => head.to_string(),
    };
    format!("{head}{}", "[]".repeat(dims))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<String>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        TypeParam { name: name.into(), bound: None }
    }
}

impl From<&crate::spec::GenericParam> for TypeParam {
    fn from(g: &crate::spec::GenericParam) -> Self {
        TypeParam { name: g.name.clone(), bound: g.bound.clone() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS & STATEMENTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    This,
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Field(Box<Expr>, String),
    Call(Call),
    New { ty: Type, args: Vec<Expr> },
    Lambda { params: Vec<String>, body: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Not(Box<Expr>),
    InstanceOf(Box<Expr>, Type),
    Cast(Type, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub receiver: Receiver,
    pub type_args: Vec<Type>,
    pub method: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    Implicit,
    Expr(Box<Expr>),
    Static(Type),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Eq,
    Ne,
    Add,
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn str(text: impl Into<String>) -> Self {
        Expr::Str(text.into())
    }

    /// `this.name`
    pub fn this_field(name: impl Into<String>) -> Self {
        Expr::Field(Box::new(Expr::This), name.into())
    }

    pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        self.call_typed(Vec::new(), method, args)
    }

    pub fn call_typed(self, type_args: Vec<Type>, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(Call {
            receiver: Receiver::Expr(Box::new(self)),
            type_args,
            method: method.into(),
            args,
        })
    }

    pub fn static_call(owner: Type, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(Call { receiver: Receiver::Static(owner), type_args: Vec::new(), method: method.into(), args })
    }

    pub fn new_(ty: Type, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    pub fn lambda(params: &[&str], body: Expr) -> Self {
        Expr::Lambda { params: params.iter().map(|p| p.to_string()).collect(), body: Box::new(body) }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinOp::Eq, lhs, rhs)
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn instance_of(self, ty: Type) -> Self {
        Expr::InstanceOf(Box::new(self), ty)
    }

    pub fn cast(ty: Type, expr: Expr) -> Self {
        Expr::Cast(ty, Box::new(expr))
    }

    /// Left-nested `a && b && c`; `None` for no operands.
    pub fn and_all(operands: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        operands.into_iter().reduce(|lhs, rhs| Expr::binary(BinOp::And, lhs, rhs))
    }

    /// Left-nested `+` chain that is a string concatenation from the first
    /// operand on.
    pub fn concat(parts: Vec<Expr>) -> Expr {
        let mut parts = parts.into_iter().peekable();
        let first = match parts.peek() {
            Some(Expr::Str(_)) => parts.next(),
            _ => Some(Expr::str("")),
        };
        let first = first.unwrap_or_else(|| Expr::str(""));
        parts.fold(first, |lhs, rhs| Expr::binary(BinOp::Add, lhs, rhs))
    }

    fn visit(&self, ty: &mut impl FnMut(&Type)) {
        match self {
            Expr::Name(_) | Expr::This | Expr::Null | Expr::Bool(_) | Expr::Int(_) | Expr::Str(_) => {}
            Expr::Field(target, _) => target.visit(ty),
            Expr::Call(call) => {
                match &call.receiver {
                    Receiver::Implicit => {}
                    Receiver::Expr(e) => e.visit(ty),
                    Receiver::Static(t) => ty(t),
                }
                call.type_args.iter().for_each(&mut *ty);
                call.args.iter().for_each(|a| a.visit(ty));
            }
            Expr::New { ty: t, args } => {
                ty(t);
                args.iter().for_each(|a| a.visit(ty));
            }
            Expr::Lambda { body, .. } => body.visit(ty),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit(ty);
                rhs.visit(ty);
            }
            Expr::Not(e) => e.visit(ty),
            Expr::InstanceOf(e, t) | Expr::Cast(t, e) => {
                ty(t);
                e.visit(ty);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
    Local { ty: Type, name: String, init: Expr },
    Assign { target: Expr, value: Expr },
    If { cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt> },
    Synchronized { lock: Expr, body: Vec<Stmt> },
    Throw(Expr),
}

impl Stmt {
    pub fn if_(cond: Expr, then: Vec<Stmt>) -> Self {
        Stmt::If { cond, then, otherwise: Vec::new() }
    }

    fn visit(&self, ty: &mut impl FnMut(&Type)) {
        match self {
            Stmt::Expr(e) | Stmt::Return(e) | Stmt::Throw(e) => e.visit(ty),
            Stmt::Local { ty: t, init, .. } => {
                ty(t);
                init.visit(ty);
            }
            Stmt::Assign { target, value } => {
                target.visit(ty);
                value.visit(ty);
            }
            Stmt::If { cond, then, otherwise } => {
                cond.visit(ty);
                then.iter().chain(otherwise).for_each(|s| s.visit(ty));
            }
            Stmt::Synchronized { lock, body } => {
                lock.visit(ty);
                body.iter().for_each(|s| s.visit(ty));
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Private,
    Static,
    Abstract,
    Final,
    Volatile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub sym: Symbol,
    pub arg: Option<Expr>,
}

impl Annotation {
    pub fn override_() -> Self {
        Annotation { sym: sym::override_(), arg: None }
    }

    pub fn suppress(warning: &str) -> Self {
        Annotation { sym: sym::suppress_warnings(), arg: Some(Expr::str(warning)) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

impl Param {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Param { ty, name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Doc(pub Vec<String>);

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub doc: Option<Doc>,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub ret: Option<Type>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

impl Method {
    pub fn new(modifiers: &[Modifier], ret: Type, name: impl Into<String>, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Method {
            doc: None,
            annotations: Vec::new(),
            modifiers: modifiers.to_vec(),
            type_params: Vec::new(),
            ret: Some(ret),
            name: name.into(),
            params,
            body,
        }
    }

    pub fn constructor(modifiers: &[Modifier], name: impl Into<String>, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Method { ret: None, ..Method::new(modifiers, Type::local("void"), name, params, body) }
    }

    pub fn with_doc(mut self, doc: Option<Doc>) -> Self {
        self.doc = doc;
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn generic(mut self, type_params: Vec<TypeParam>) -> Self {
        self.type_params = type_params;
        self
    }

    /// `name(Erased, Erased)`; constructors are named `<init>`.
    pub fn erased_signature(&self, params: &HashMap<&str, Option<&str>>) -> String {
        let mut scope: HashMap<&str, Option<&str>> = params.iter().map(|(k, v)| (*k, *v)).collect();
        for tp in &self.type_params {
            scope.insert(tp.name.as_str(), tp.bound.as_deref());
        }
        let erased: Vec<String> = self.params.iter().map(|p| p.ty.erasure(&scope)).collect();
        let name = if self.ret.is_some() { self.name.as_str() } else { "<init>" };
        format!("{name}({})", erased.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub ty: Type,
    pub name: String,
    pub init: Option<Expr>,
}

impl FieldDecl {
    pub fn new(modifiers: &[Modifier], ty: Type, name: impl Into<String>, init: Option<Expr>) -> Self {
        FieldDecl { annotations: Vec::new(), modifiers: modifiers.to_vec(), ty, name: name.into(), init }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(Method),
    Class(Class),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub doc: Option<Doc>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<Type>,
    pub members: Vec<Member>,
}

impl Class {
    pub fn new(modifiers: &[Modifier], name: impl Into<String>, type_params: Vec<TypeParam>) -> Self {
        Class {
            doc: None,
            modifiers: modifiers.to_vec(),
            name: name.into(),
            type_params,
            extends: None,
            members: Vec::new(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.members.iter().filter_map(|m| match m {
            Member::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods().find(|m| m.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes().find(|c| c.name == name)
    }

    /// Calls `f` with every type mentioned anywhere in the class.
    pub fn visit_types(&self, f: &mut impl FnMut(&Type)) {
        if let Some(extends) = &self.extends {
            f(extends);
        }
        for member in &self.members {
            match member {
                Member::Field(field) => {
                    f(&field.ty);
                    field.annotations.iter().for_each(|a| f(&Type::sym(a.sym.clone())));
                    if let Some(init) = &field.init {
                        init.visit(f);
                    }
                }
                Member::Method(method) => {
                    method.annotations.iter().for_each(|a| f(&Type::sym(a.sym.clone())));
                    if let Some(ret) = &method.ret {
                        f(ret);
                    }
                    method.params.iter().for_each(|p| f(&p.ty));
                    method.body.iter().for_each(|s| s.visit(f));
                }
                Member::Class(class) => class.visit_types(f),
            }
        }
    }

    /// Every external symbol the class references.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.visit_types(&mut |t| t.symbols(&mut out));
        out
    }

    /// Names of unit-local types the class references.
    pub fn local_references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_types(&mut |t| {
            let mut names = Vec::new();
            t.locals(&mut names);
            out.extend(names.into_iter().map(str::to_string));
        });
        out
    }

    /// Names of every class and type parameter declared in this subtree.
    pub fn declared_types(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_declared(&mut out);
        out
    }

    fn collect_declared(&self, out: &mut BTreeSet<String>) {
        out.insert(self.name.clone());
        out.extend(self.type_params.iter().map(|t| t.name.clone()));
        for member in &self.members {
            match member {
                Member::Method(m) => out.extend(m.type_params.iter().map(|t| t.name.clone())),
                Member::Class(c) => c.collect_declared(out),
                Member::Field(_) => {}
            }
        }
    }
}

/// One Java compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub package: Option<String>,
    pub class: Class,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erasure_drops_arguments_and_substitutes_bounds() {
        let mut params = HashMap::new();
        params.insert("T", Some("Comparable<T>"));
        params.insert("U", None);
        assert_eq!(erase_text("java.util.List<String>", &params), "List");
        assert_eq!(erase_text("T", &params), "Comparable");
        assert_eq!(erase_text("U[]", &params), "Object[]");
        assert_eq!(erase_text("int", &params), "int");
        assert_eq!(erase_text("Map<K, List<V>>[][]", &params), "Map[][]");
    }

    #[test]
    fn concat_starts_with_a_string() {
        let e = Expr::concat(vec![Expr::name("a"), Expr::name("b")]);
        let Expr::Binary { lhs, .. } = e else { panic!("expected a + chain") };
        let Expr::Binary { lhs: first, .. } = *lhs else { panic!("expected nesting") };
        assert_eq!(*first, Expr::str(""));
    }

    #[test]
    fn symbols_are_collected_from_bodies() {
        let mut class = Class::new(&[Modifier::Public], "Box", Vec::new());
        class.members.push(Member::Method(Method::new(
            &[Modifier::Public],
            Type::sym(sym::string()),
            "show",
            vec![Param::new(Type::generic(sym::supplier(), vec![Type::local("Box")]), "s")],
            vec![Stmt::Return(Expr::static_call(Type::sym(Symbol::parse("a.b.Util")), "show", vec![]))],
        )));
        let symbols: Vec<String> = class.symbols().iter().map(Symbol::qualified).collect();
        assert_eq!(symbols, vec!["a.b.Util", "java.lang.String", "java.util.function.Supplier"]);
        assert!(class.local_references().contains("Box"));
    }
}
