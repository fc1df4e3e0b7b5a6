use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Ty;
use crate::parser::DeclKind;

pub type ScopeId = usize;

pub const GLOBAL_SCOPE: ScopeId = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// The declaring keyword; `None` for parameters, functions, classes and intrinsics.
    pub mutability: Option<DeclKind>,
    pub ty: Ty,
    pub initialized: bool,
    pub params: Vec<String>,
    pub builtin: bool,
}

impl Symbol {
    pub fn variable(mutability: Option<DeclKind>, ty: Ty, initialized: bool) -> Self {
        Self {
            kind: SymbolKind::Variable,
            mutability,
            ty,
            initialized,
            params: vec![],
            builtin: false,
        }
    }

    pub fn parameter() -> Self {
        Self {
            kind: SymbolKind::Parameter,
            mutability: None,
            ty: Ty::Unknown,
            initialized: true,
            params: vec![],
            builtin: false,
        }
    }

    pub fn function(params: Vec<String>, returns: Ty) -> Self {
        Self {
            kind: SymbolKind::Function,
            mutability: None,
            ty: Ty::Func(Box::new(returns)),
            initialized: true,
            params,
            builtin: false,
        }
    }

    fn intrinsic(mut self) -> Self {
        self.builtin = true;
        self
    }

    pub fn is_const(&self) -> bool {
        self.mutability == Some(DeclKind::Const)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Function => "function",
        };
        write!(f, "{} {}", kind, self.ty)?;
        if let Some(m) = self.mutability {
            write!(f, " ({})", m.keyword())?;
        }
        if self.kind == SymbolKind::Function {
            write!(f, " [{}]", self.params.join(", "))?;
        }
        if !self.initialized {
            write!(f, " uninitialized")?;
        }
        if self.builtin {
            write!(f, " builtin")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub symbols: BTreeMap<String, Symbol>,
}

/// Every scope the analysis opened, linked to its parent. Scope 0 is global.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                symbols: BTreeMap::new(),
            }],
        };
        table.declare(
            GLOBAL_SCOPE,
            "console",
            Symbol::variable(None, Ty::Object, true).intrinsic(),
        );
        table.declare(
            GLOBAL_SCOPE,
            "print",
            Symbol::function(vec!["value".to_string()], Ty::Unknown).intrinsic(),
        );
        table
    }

    pub fn push_scope(&mut self, parent: ScopeId, name: &str) -> ScopeId {
        let id = self.scopes.len();
        // Anonymous scopes are numbered so flattened keys stay unique.
        let name = if name == "block" || name == "arrow" {
            format!("{}{}", name, id)
        } else {
            name.to_string()
        };
        self.scopes.push(Scope {
            name,
            parent: Some(parent),
            symbols: BTreeMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Returns false if `name` already exists in `scope` itself.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> bool {
        let symbols = &mut self.scopes[scope].symbols;
        if symbols.contains_key(name) {
            return false;
        }
        symbols.insert(name.to_string(), symbol);
        true
    }

    fn find_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scopes[id].symbols.contains_key(name) {
                return Some(id);
            }
            current = self.scopes[id].parent;
        }
        None
    }

    /// Resolves `name` from `scope` outwards.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let id = self.find_scope(scope, name)?;
        self.scopes[id].symbols.get(name)
    }

    pub fn lookup_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        let id = self.find_scope(scope, name)?;
        self.scopes[id].symbols.get_mut(name)
    }

    pub fn get_global(&self, name: &str) -> Option<&Symbol> {
        self.scopes[GLOBAL_SCOPE].symbols.get(name)
    }

    fn qualified_name(&self, scope: ScopeId, name: &str) -> String {
        let mut parts = vec![name.to_string()];
        let mut current = scope;
        while let Some(parent) = self.scopes[current].parent {
            parts.push(self.scopes[current].name.clone());
            current = parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// Every symbol keyed by its scope path (`f::block3::x`), in scope creation order.
    pub fn flatten(&self) -> Vec<(String, &Symbol)> {
        self.scopes
            .iter()
            .enumerate()
            .flat_map(|(id, scope)| {
                scope
                    .symbols
                    .iter()
                    .map(move |(name, symbol)| (self.qualified_name(id, name), symbol))
            })
            .collect()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, symbol) in self.flatten() {
            writeln!(f, "{}: {}", name, symbol)?;
        }
        Ok(())
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat = self.flatten();
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (name, symbol) in flat {
            map.serialize_entry(&name, symbol)?;
        }
        map.end()
    }
}
