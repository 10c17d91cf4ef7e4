//! Object naming.
//!
//! Every constructed object gets a public name (author supplied or synthesized
//! as `Type1`, `Type2`, ...) and a private storage member derived from it.

use std::collections::{HashMap, HashSet};

use crate::class_builder::{ClassBuilder, MemberVariable, Modifier};
use crate::method_builder::MemberVisibility;
use crate::property_builder::PropertyBuilder;
use crate::validate::{CompileError, Result};

pub const PRIVATE_PREFIX: &str = "x_";

/// Private member name for a public identifier. Re-derivable from the identifier alone.
pub fn private_name_for(public_name: &str) -> String {
    format!("{}{}", PRIVATE_PREFIX, public_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNames {
    pub public_name: String,
    pub private_name: String,
    /// True iff the author named the object; gates the public accessor.
    pub is_referenceable: bool,
}

/// Per-type counters for synthesized names. Owned by one compile session.
///
/// Synthesized names never collide with a reserved (author supplied) name.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counters: HashMap<String, u32>,
    reserved: HashSet<String>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.trim().to_string());
    }

    fn next(&mut self, ty: &str) -> String {
        let counter = self.counters.entry(ty.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", ty, counter);
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn assign(&mut self, ty: &str, given: Option<&str>) -> ObjectNames {
        match given.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => ObjectNames {
                public_name: name.to_string(),
                private_name: private_name_for(name),
                is_referenceable: true,
            },
            None => {
                let name = self.next(ty);
                ObjectNames {
                    private_name: private_name_for(&name),
                    public_name: name,
                    is_referenceable: false,
                }
            }
        }
    }
}

/// Adds the private storage member and, for named objects, a protected getter.
///
/// Deferred objects may not exist yet when read, so their member is optional and
/// the getter type admits `undefined`.
pub fn declare(
    class: &mut ClassBuilder,
    ty: &str,
    names: &ObjectNames,
    is_deferred: bool,
) -> Result<()> {
    if class.has_member(&names.private_name) {
        return Err(CompileError::conflict(format!(
            "an object named '{}' is already declared",
            names.public_name
        )));
    }

    let modifier = if is_deferred {
        Modifier::Optional
    } else {
        Modifier::Definite
    };
    class.add_member(
        MemberVariable::new(&names.private_name, ty, MemberVisibility::Private).with_modifier(modifier),
    );

    if names.is_referenceable {
        let getter_type = if is_deferred {
            format!("{} | undefined", ty)
        } else {
            ty.to_string()
        };
        let mut getter = PropertyBuilder::new(&names.public_name, &getter_type, MemberVisibility::Protected);
        getter.add_getter_line(format!("return this.{};", names.private_name));
        class.add_property(getter);
    }

    Ok(())
}
