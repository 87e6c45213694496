//! Export contraction (spec.md §4.1.2).
//!
//! A package's export table may re-export a name brought in from
//! another package. Contraction walks that re-export graph depth
//! first, replacing every non-leaf export with the fully qualified
//! name of the underlying definition. Cycles and missing re-export
//! targets fail with a [`ContractionError`]; a successful contraction
//! is idempotent (contracting an already-contracted table is a no-op).

use loom_base::{Interner, Symbol};
use std::collections::HashMap;
use std::fmt;

/// One raw (pre-contraction) export entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Defined directly in the exporting package.
    Local(Symbol),
    /// Re-exports a name imported from another package.
    ReExport { package: Symbol, name: Symbol },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractionError {
    Cycle { path: Vec<(Symbol, Symbol)> },
    MissingTarget { package: Symbol, name: Symbol },
}

impl fmt::Display for ContractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractionError::Cycle { path } => {
                write!(f, "cyclic re-export through {} entries", path.len())
            }
            ContractionError::MissingTarget { .. } => write!(f, "re-export target does not exist"),
        }
    }
}

impl std::error::Error for ContractionError {}

/// Every package's raw export table, keyed by package name then by
/// exported name.
pub type RawExports = HashMap<Symbol, HashMap<Symbol, ExportTarget>>;

/// A package's export table after contraction: every exported name
/// maps directly to the qualified name of the definition it denotes.
pub type ContractedExports = HashMap<Symbol, HashMap<Symbol, Symbol>>;

/// Fully qualifies `<name>@<pkg>` for the final, contracted form.
fn qualified(interner: &mut Interner, name: Symbol, pkg: Symbol) -> Symbol {
    let text = format!("{}@{}", interner.resolve(name), interner.resolve(pkg));
    interner.intern(&text)
}

/// Contracts every package's export table in `raw`, reporting the
/// first cycle or missing target encountered. Contraction is
/// depth-first with memoization, so idempotent on an already-resolved
/// table: re-running over a `RawExports` built entirely of `Local`
/// entries (the shape a contracted table would have if fed back in)
/// returns the same mapping unchanged.
pub fn contract_exports(
    raw: &RawExports,
    interner: &mut Interner,
) -> Result<ContractedExports, ContractionError> {
    let mut resolved: ContractedExports = ContractedExports::new();
    for pkg in raw.keys() {
        resolved.insert(*pkg, HashMap::new());
    }

    for (&pkg, names) in raw {
        for &name in names.keys() {
            if resolved[&pkg].contains_key(&name) {
                continue;
            }
            let mut stack = Vec::new();
            let value = resolve_one(raw, &mut resolved, pkg, name, &mut stack, interner)?;
            resolved.get_mut(&pkg).unwrap().insert(name, value);
        }
    }

    Ok(resolved)
}

fn resolve_one(
    raw: &RawExports,
    resolved: &mut ContractedExports,
    pkg: Symbol,
    name: Symbol,
    stack: &mut Vec<(Symbol, Symbol)>,
    interner: &mut Interner,
) -> Result<Symbol, ContractionError> {
    if let Some(existing) = resolved.get(&pkg).and_then(|m| m.get(&name)) {
        return Ok(*existing);
    }
    if stack.contains(&(pkg, name)) {
        let mut path = stack.clone();
        path.push((pkg, name));
        return Err(ContractionError::Cycle { path });
    }

    let target = raw
        .get(&pkg)
        .and_then(|m| m.get(&name))
        .cloned()
        .ok_or(ContractionError::MissingTarget { package: pkg, name })?;

    stack.push((pkg, name));
    let final_name = match target {
        ExportTarget::Local(original) => qualified(interner, original, pkg),
        ExportTarget::ReExport { package, name: target_name } => {
            resolve_one(raw, resolved, package, target_name, stack, interner)?
        }
    };
    stack.pop();

    resolved.entry(pkg).or_default().insert(name, final_name);
    Ok(final_name)
}
