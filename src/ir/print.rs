//! The single printer for the Java IR.
use super::{
    Annotation, BinOp, Call, Class, Doc, Expr, FieldDecl, ImportTable, Member, Method, Modifier, Param, Receiver,
    Stmt, Type, TypeParam, Unit, Wildcard,
};

// ------------------------------- Precedence ------------------------------- //

const PREC_LAMBDA: u8 = 0;
const PREC_AND: u8 = 4;
const PREC_EQUALITY: u8 = 8;
const PREC_RELATIONAL: u8 = 9;
const PREC_ADDITIVE: u8 = 11;
const PREC_UNARY: u8 = 13;
const PREC_POSTFIX: u8 = 15;

fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Lambda { .. } => PREC_LAMBDA,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::InstanceOf(..) => PREC_RELATIONAL,
        Expr::Not(_) | Expr::Cast(..) => PREC_UNARY,
        _ => PREC_POSTFIX,
    }
}

fn binary_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::And => PREC_AND,
        BinOp::Eq | BinOp::Ne => PREC_EQUALITY,
        BinOp::Add => PREC_ADDITIVE,
    }
}

fn operator(op: BinOp) -> &'static str {
    match op {
        BinOp::And => "&&",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Add => "+",
    }
}

// ------------------------------- Printer ---------------------------------- //

pub struct Printer<'a> {
    out: String,
    unit_indent: String,
    depth: usize,
    names: &'a ImportTable,
}

/// Render a whole compilation unit.
pub fn print_unit(unit: &Unit, names: &ImportTable, indent: usize) -> String {
    let mut p = Printer::new(names, indent);
    if let Some(package) = &unit.package {
        p.line(&format!("package {package};"));
        p.blank();
    }
    let imports = names.imports();
    if !imports.is_empty() {
        for import in &imports {
            p.line(&format!("import {import};"));
        }
        p.blank();
    }
    p.class(&unit.class);
    p.out
}

impl<'a> Printer<'a> {
    pub fn new(names: &'a ImportTable, indent: usize) -> Self {
        Printer { out: String::new(), unit_indent: " ".repeat(indent), depth: 0, names }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.unit_indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn doc(&mut self, doc: &Option<Doc>) {
        let Some(Doc(lines)) = doc else { return };
        self.line("/**");
        for l in lines {
            if l.is_empty() {
                self.line(" *");
            } else {
                self.line(&format!(" * {l}"));
            }
        }
        self.line(" */");
    }

    fn annotations(&mut self, annotations: &[Annotation]) {
        for a in annotations {
            let name = self.names.resolve(&a.sym);
            match &a.arg {
                Some(arg) => {
                    let arg = self.expr(arg, PREC_LAMBDA);
                    self.line(&format!("@{name}({arg})"));
                }
                None => self.line(&format!("@{name}")),
            }
        }
    }

    pub fn class(&mut self, class: &Class) {
        self.doc(&class.doc);
        let mut head = modifiers(&class.modifiers);
        head.push_str("class ");
        head.push_str(&class.name);
        head.push_str(&self.type_params(&class.type_params));
        if let Some(extends) = &class.extends {
            head.push_str(" extends ");
            head.push_str(&self.ty(extends));
        }
        head.push_str(" {");
        self.line(&head);
        self.depth += 1;
        let mut previous: Option<&Member> = None;
        for member in &class.members {
            let tight = matches!((previous, member), (Some(Member::Field(_)), Member::Field(_)));
            if !tight {
                self.blank();
            }
            match member {
                Member::Field(f) => self.field(f),
                Member::Method(m) => self.method(m),
                Member::Class(c) => self.class(c),
            }
            previous = Some(member);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn field(&mut self, field: &FieldDecl) {
        self.annotations(&field.annotations);
        let mut text = modifiers(&field.modifiers);
        text.push_str(&self.ty(&field.ty));
        text.push(' ');
        text.push_str(&field.name);
        if let Some(init) = &field.init {
            text.push_str(" = ");
            text.push_str(&self.expr(init, PREC_LAMBDA));
        }
        text.push(';');
        self.line(&text);
    }

    pub fn method(&mut self, method: &Method) {
        self.doc(&method.doc);
        self.annotations(&method.annotations);
        let mut head = modifiers(&method.modifiers);
        if !method.type_params.is_empty() {
            head.push_str(&self.type_params(&method.type_params));
            head.push(' ');
        }
        if let Some(ret) = &method.ret {
            head.push_str(&self.ty(ret));
            head.push(' ');
        }
        head.push_str(&method.name);
        head.push('(');
        head.push_str(&self.params(&method.params));
        if method.body.is_empty() {
            head.push_str(") {}");
            self.line(&head);
            return;
        }
        head.push_str(") {");
        self.line(&head);
        self.block(&method.body);
        self.line("}");
    }

    fn params(&self, params: &[Param]) -> String {
        params.iter().map(|p| format!("{} {}", self.ty(&p.ty), p.name)).collect::<Vec<_>>().join(", ")
    }

    fn type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let items: Vec<String> = params
            .iter()
            .map(|p| match &p.bound {
                Some(bound) => format!("{} extends {bound}", p.name),
                None => p.name.clone(),
            })
            .collect();
        format!("<{}>", items.join(", "))
    }

    fn block(&mut self, body: &[Stmt]) {
        self.depth += 1;
        for s in body {
            self.stmt(s);
        }
        self.depth -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => {
                let e = self.expr(e, PREC_LAMBDA);
                self.line(&format!("{e};"));
            }
            Stmt::Return(e) => {
                let e = self.expr(e, PREC_LAMBDA);
                self.line(&format!("return {e};"));
            }
            Stmt::Throw(e) => {
                let e = self.expr(e, PREC_LAMBDA);
                self.line(&format!("throw {e};"));
            }
            Stmt::Local { ty, name, init } => {
                let text = format!("{} {name} = {};", self.ty(ty), self.expr(init, PREC_LAMBDA));
                self.line(&text);
            }
            Stmt::Assign { target, value } => {
                let text = format!("{} = {};", self.expr(target, PREC_POSTFIX), self.expr(value, PREC_LAMBDA));
                self.line(&text);
            }
            Stmt::If { cond, then, otherwise } => {
                let cond = self.expr(cond, PREC_LAMBDA);
                self.line(&format!("if ({cond}) {{"));
                self.block(then);
                if otherwise.is_empty() {
                    self.line("}");
                } else {
                    self.line("} else {");
                    self.block(otherwise);
                    self.line("}");
                }
            }
            Stmt::Synchronized { lock, body } => {
                let lock = self.expr(lock, PREC_LAMBDA);
                self.line(&format!("synchronized ({lock}) {{"));
                self.block(body);
                self.line("}");
            }
        }
    }

    pub fn ty(&self, ty: &Type) -> String {
        match ty {
            Type::Raw(text) => text.trim().to_string(),
            Type::Sym { sym, args } => format!("{}{}", self.names.resolve(sym), self.type_args(args)),
            Type::Local { name, args } => format!("{name}{}", self.type_args(args)),
            Type::Wildcard(Wildcard::Any) => "?".into(),
            Type::Wildcard(Wildcard::Super(t)) => format!("? super {}", self.ty(t)),
            Type::Wildcard(Wildcard::Extends(t)) => format!("? extends {}", self.ty(t)),
        }
    }

    fn type_args(&self, args: &[Type]) -> String {
        if args.is_empty() {
            String::new()
        } else {
            format!("<{}>", args.iter().map(|a| self.ty(a)).collect::<Vec<_>>().join(", "))
        }
    }

    /// Print `e`, parenthesized when it binds looser than `min`.
    pub fn expr(&self, e: &Expr, min: u8) -> String {
        let text = match e {
            Expr::Name(name) => name.clone(),
            Expr::This => "this".into(),
            Expr::Null => "null".into(),
            Expr::Bool(b) => b.to_string(),
            Expr::Int(n) => n.to_string(),
            Expr::Str(s) => string_literal(s),
            Expr::Field(target, name) => format!("{}.{name}", self.expr(target, PREC_POSTFIX)),
            Expr::Call(call) => self.call(call),
            Expr::New { ty, args } => format!("new {}({})", self.ty(ty), self.args(args)),
            Expr::Lambda { params, body } => {
                let params = match params.as_slice() {
                    [single] => single.clone(),
                    many => format!("({})", many.join(", ")),
                };
                format!("{params} -> {}", self.expr(body, PREC_LAMBDA))
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = binary_precedence(*op);
                format!("{} {} {}", self.expr(lhs, prec), operator(*op), self.expr(rhs, prec + 1))
            }
            Expr::Not(inner) => format!("!{}", self.expr(inner, PREC_UNARY)),
            Expr::InstanceOf(inner, ty) => format!("{} instanceof {}", self.expr(inner, PREC_RELATIONAL), self.ty(ty)),
            Expr::Cast(ty, inner) => format!("({}) {}", self.ty(ty), self.expr(inner, PREC_UNARY)),
        };
        if precedence(e) < min { format!("({text})") } else { text }
    }

    fn call(&self, call: &Call) -> String {
        let type_args = self.type_args(&call.type_args);
        let args = self.args(&call.args);
        match &call.receiver {
            Receiver::Implicit => format!("{}({args})", call.method),
            Receiver::Expr(target) => {
                format!("{}.{type_args}{}({args})", self.expr(target, PREC_POSTFIX), call.method)
            }
            Receiver::Static(owner) => format!("{}.{type_args}{}({args})", self.ty(owner), call.method),
        }
    }

    fn args(&self, args: &[Expr]) -> String {
        args.iter().map(|a| self.expr(a, PREC_LAMBDA)).collect::<Vec<_>>().join(", ")
    }
}

fn modifiers(modifiers: &[Modifier]) -> String {
    let mut out = String::new();
    for m in modifiers {
        out.push_str(match m {
            Modifier::Public => "public ",
            Modifier::Private => "private ",
            Modifier::Static => "static ",
            Modifier::Abstract => "abstract ",
            Modifier::Final => "final ",
            Modifier::Volatile => "volatile ",
        });
    }
    out
}

/// Java string literal; non-ASCII text stays as UTF-8.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Symbol, sym};
    use pretty_assertions::assert_eq;

    fn show(e: &Expr) -> String {
        let names = ImportTable::default();
        Printer::new(&names, 4).expr(e, PREC_LAMBDA)
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let cast_call = Expr::cast(Type::local("RGB"), Expr::name("it")).call("r", vec![]);
        assert_eq!(show(&cast_call), "((RGB) it).r()");

        let not_instance = Expr::name("other").instance_of(Type::local("Color")).not();
        assert_eq!(show(&not_instance), "!(other instanceof Color)");

        let nested = Expr::binary(
            BinOp::Add,
            Expr::str("a"),
            Expr::binary(BinOp::Add, Expr::name("x"), Expr::name("y")),
        );
        assert_eq!(show(&nested), "\"a\" + (x + y)");

        let guard = Expr::binary(
            BinOp::And,
            Expr::name("value").instance_of(Type::local("RGB")),
            Expr::name("guard").call("test", vec![Expr::name("value")]),
        );
        assert_eq!(show(&guard), "value instanceof RGB && guard.test(value)");
    }

    #[test]
    fn lambdas() {
        assert_eq!(show(&Expr::lambda(&[], Expr::This.call("toString", vec![]))), "() -> this.toString()");
        assert_eq!(show(&Expr::lambda(&["it"], Expr::Bool(true))), "it -> true");
        let call = Expr::This.call("select", vec![Expr::lambda(&["it"], Expr::Bool(true))]);
        assert_eq!(show(&call), "this.select(it -> true)");
    }

    #[test]
    fn string_escapes() {
        assert_eq!(string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(string_literal("é\u{1}"), "\"é\\u0001\"");
    }

    #[test]
    fn prints_a_small_unit() {
        let mut class = Class::new(&[Modifier::Public, Modifier::Final], "Box", Vec::new());
        class.members.push(Member::Field(FieldDecl::new(&[Modifier::Private, Modifier::Final], Type::raw("int"), "a", None)));
        class.members.push(Member::Field(FieldDecl::new(&[Modifier::Private, Modifier::Final], Type::raw("int"), "b", None)));
        class.members.push(Member::Method(
            Method::new(
                &[Modifier::Public],
                Type::sym(sym::string()),
                "show",
                vec![Param::new(Type::generic(sym::supplier(), vec![Type::sym(sym::string())]), "s")],
                vec![Stmt::Return(Expr::static_call(Type::sym(Symbol::parse("a.Util")), "show", vec![Expr::name("s")]))],
            )
            .annotated(Annotation::override_()),
        ));
        let unit = Unit { package: Some("demo".into()), class };
        let symbols = unit.class.symbols();
        let names = ImportTable::build(Some("demo"), &Default::default(), &Default::default(), &symbols).unwrap();
        let expected = "\
package demo;

import a.Util;
import java.util.function.Supplier;

public final class Box {

    private final int a;
    private final int b;

    @Override
    public String show(Supplier<String> s) {
        return Util.show(s);
    }
}
";
        assert_eq!(print_unit(&unit, &names, 4), expected);
    }
}
