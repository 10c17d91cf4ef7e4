//! Shared material/texture table.
//!
//! Names are registered by the pre-pass before any section is translated, so a
//! consumer may reference a shared object whose declaration comes later in the
//! document. Each entry tracks which method constructs the object:
//!
//! - [`InitSite::Direct`]: constructed inline in an existing method.
//! - [`InitSite::LazyEnsure`]: constructed by a guarded `_ensure_<name>()` method
//!   that returns the cached instance on repeat calls.
//!
//! A consumer arriving before the declaration promotes the entry from `Direct`
//! to `LazyEnsure`. Promotion never goes back.

use std::collections::BTreeMap;

use crate::validate::{CompileError, ReferenceKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SharedKind {
    Material,
    Texture,
}

impl SharedKind {
    pub fn ensure_return_type(&self) -> &'static str {
        match self {
            SharedKind::Material => "Material",
            SharedKind::Texture => "BaseTexture",
        }
    }

    pub fn reference_kind(&self) -> ReferenceKind {
        match self {
            SharedKind::Material => ReferenceKind::Material,
            SharedKind::Texture => ReferenceKind::Texture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitSite {
    Direct(String),
    LazyEnsure(String),
}

impl InitSite {
    pub fn method(&self) -> &str {
        match self {
            InitSite::Direct(method) | InitSite::LazyEnsure(method) => method,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, InitSite::LazyEnsure(_))
    }

    /// `Direct` -> `LazyEnsure`. An already lazy site is unchanged.
    pub fn promote(&self, ensure_method: &str) -> InitSite {
        match self {
            InitSite::Direct(_) => InitSite::LazyEnsure(ensure_method.to_string()),
            lazy => lazy.clone(),
        }
    }
}

pub fn ensure_method_name(name: &str) -> String {
    format!("_ensure_{}", name)
}

#[derive(Debug, Clone)]
struct SharedEntry {
    site: InitSite,
    declared: bool,
}

/// How a consumer reaches a shared object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Already constructed; read the member.
    Member,
    /// Call the ensure method. `created` is true on the promoting access.
    Ensure { method: String, created: bool },
}

#[derive(Debug, Default)]
pub struct SharedObjects {
    entries: BTreeMap<(SharedKind, String), SharedEntry>,
}

impl SharedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: SharedKind, name: &str, init_method: &str) -> Result<()> {
        let key = (kind, name.to_string());
        if self.entries.contains_key(&key) {
            return Err(CompileError::conflict(format!(
                "shared {} '{}' is declared more than once",
                kind.reference_kind(),
                name
            )));
        }
        self.entries.insert(
            key,
            SharedEntry {
                site: InitSite::Direct(init_method.to_string()),
                declared: false,
            },
        );
        Ok(())
    }

    /// Resolves a consumer reference, promoting the entry when the object has
    /// not been constructed yet.
    pub fn access(&mut self, kind: SharedKind, name: &str) -> Result<Access> {
        let entry = self
            .entries
            .get_mut(&(kind, name.to_string()))
            .ok_or_else(|| CompileError::reference(kind.reference_kind(), name))?;

        if let InitSite::LazyEnsure(method) = &entry.site {
            return Ok(Access::Ensure {
                method: method.clone(),
                created: false,
            });
        }
        if entry.declared {
            return Ok(Access::Member);
        }

        let method = ensure_method_name(name);
        entry.site = entry.site.promote(&method);
        Ok(Access::Ensure {
            method,
            created: true,
        })
    }

    /// Marks the declaration as translated and returns where it must be built.
    pub fn declare(&mut self, kind: SharedKind, name: &str) -> Result<InitSite> {
        let entry = self
            .entries
            .get_mut(&(kind, name.to_string()))
            .ok_or_else(|| CompileError::reference(kind.reference_kind(), name))?;
        if entry.declared {
            return Err(CompileError::conflict(format!(
                "shared {} '{}' is declared more than once",
                kind.reference_kind(),
                name
            )));
        }
        entry.declared = true;
        Ok(entry.site.clone())
    }

    /// Registered names whose declaration was never translated.
    pub fn undeclared(&self) -> Vec<(SharedKind, &str)> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.declared)
            .map(|((kind, name), _)| (*kind, name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_before_declaration_promotes_once() {
        let mut shared = SharedObjects::new();
        shared.register(SharedKind::Material, "sharedMat", "__init").unwrap();

        let first = shared.access(SharedKind::Material, "sharedMat").unwrap();
        assert_eq!(
            first,
            Access::Ensure {
                method: "_ensure_sharedMat".to_string(),
                created: true
            }
        );
        let second = shared.access(SharedKind::Material, "sharedMat").unwrap();
        assert_eq!(
            second,
            Access::Ensure {
                method: "_ensure_sharedMat".to_string(),
                created: false
            }
        );

        let site = shared.declare(SharedKind::Material, "sharedMat").unwrap();
        assert_eq!(site, InitSite::LazyEnsure("_ensure_sharedMat".to_string()));
        assert!(shared.undeclared().is_empty());
    }

    #[test]
    fn test_reference_after_declaration_reads_member() {
        let mut shared = SharedObjects::new();
        shared.register(SharedKind::Texture, "wood", "__init").unwrap();
        let site = shared.declare(SharedKind::Texture, "wood").unwrap();
        assert_eq!(site.method(), "__init");
        assert!(!site.is_lazy());
        assert_eq!(shared.access(SharedKind::Texture, "wood").unwrap(), Access::Member);
    }

    #[test]
    fn test_unknown_reference_and_duplicates_fail() {
        let mut shared = SharedObjects::new();
        let err = shared.access(SharedKind::Material, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "Material reference not found: ghost");

        shared.register(SharedKind::Material, "m", "__init").unwrap();
        assert!(matches!(
            shared.register(SharedKind::Material, "m", "__init"),
            Err(CompileError::Conflict { .. })
        ));
        // Same name under a different kind is a separate entry.
        shared.register(SharedKind::Texture, "m", "__init").unwrap();

        shared.declare(SharedKind::Material, "m").unwrap();
        assert!(shared.declare(SharedKind::Material, "m").is_err());
        assert_eq!(shared.undeclared(), vec![(SharedKind::Texture, "m")]);
    }
}
