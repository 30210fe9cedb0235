//! Import binding: which symbols print by simple name, which must stay
//! qualified, and which need an `import` line.
use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::Symbol;
use crate::error::SpecError;

#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    package: Option<String>,
    bound: IndexMap<String, Symbol>,
}

impl ImportTable {
    /// `reserved` are simple names declared inside the unit (nested
    /// classes, type variables); they shadow any import. `required` symbols
    /// come from spec type text that is printed verbatim, so they must bind
    /// or generation fails. The rest bind in sorted order when their
    /// simple name is free and print qualified otherwise.
    pub fn build(
        package: Option<&str>,
        reserved: &BTreeSet<String>,
        required: &BTreeSet<Symbol>,
        symbols: &BTreeSet<Symbol>,
    ) -> Result<Self, SpecError> {
        let mut table = ImportTable { package: package.map(str::to_string), bound: IndexMap::new() };
        for sym in required {
            if !table.try_bind(reserved, sym) {
                return Err(SpecError::ImportConflict { import: sym.qualified(), simple: sym.name.clone() });
            }
        }
        for sym in symbols {
            table.try_bind(reserved, sym);
        }
        Ok(table)
    }

    fn try_bind(&mut self, reserved: &BTreeSet<String>, sym: &Symbol) -> bool {
        if sym.package.is_empty() {
            return true;
        }
        if reserved.contains(&sym.name) {
            return false;
        }
        match self.bound.get(&sym.name) {
            Some(existing) => existing == sym,
            None => {
                self.bound.insert(sym.name.clone(), sym.clone());
                true
            }
        }
    }

    /// How `sym` is spelled in the unit.
    pub fn resolve(&self, sym: &Symbol) -> String {
        match self.bound.get(&sym.name) {
            Some(existing) if existing == sym => sym.name.clone(),
            _ if sym.package.is_empty() => sym.name.clone(),
            _ => sym.qualified(),
        }
    }

    /// Sorted, deduplicated import lines (without `import`/`;`).
    pub fn imports(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .bound
            .values()
            .filter(|s| s.package != "java.lang")
            .filter(|s| Some(s.package.as_str()) != self.package.as_deref())
            .map(Symbol::qualified)
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<Symbol> {
        names.iter().map(|n| Symbol::parse(n)).collect()
    }

    #[test]
    fn imports_are_sorted_and_skip_implicit_packages() {
        let symbols = set(&[
            "java.util.function.Supplier",
            "java.lang.String",
            "com.example.Validators",
            "java.util.function.Function",
            "com.example.shapes.Local",
        ]);
        let table = ImportTable::build(Some("com.example.shapes"), &BTreeSet::new(), &BTreeSet::new(), &symbols).unwrap();
        assert_eq!(
            table.imports(),
            vec!["com.example.Validators", "java.util.function.Function", "java.util.function.Supplier"]
        );
        assert_eq!(table.resolve(&Symbol::java_lang("String")), "String");
    }

    #[test]
    fn shadowed_names_stay_qualified() {
        let reserved: BTreeSet<String> = ["Function".to_string()].into_iter().collect();
        let symbols = set(&["java.util.function.Function", "a.Pair", "b.Pair"]);
        let table = ImportTable::build(None, &reserved, &BTreeSet::new(), &symbols).unwrap();
        assert_eq!(table.resolve(&Symbol::parse("java.util.function.Function")), "java.util.function.Function");
        assert_eq!(table.resolve(&Symbol::parse("a.Pair")), "Pair");
        assert_eq!(table.resolve(&Symbol::parse("b.Pair")), "b.Pair");
        assert_eq!(table.imports(), vec!["a.Pair"]);
    }

    #[test]
    fn required_imports_win_or_fail() {
        let required = set(&["com.acme.String"]);
        let symbols = set(&["java.lang.String"]);
        let table = ImportTable::build(None, &BTreeSet::new(), &required, &symbols).unwrap();
        assert_eq!(table.resolve(&Symbol::java_lang("String")), "java.lang.String");
        assert_eq!(table.imports(), vec!["com.acme.String"]);

        let reserved: BTreeSet<String> = ["Point".to_string()].into_iter().collect();
        let err = ImportTable::build(None, &reserved, &set(&["geo.Point"]), &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, SpecError::ImportConflict { .. }));
    }
}
