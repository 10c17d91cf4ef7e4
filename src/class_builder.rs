//! In-memory representation of the single class a view compiles into.
//!
//! Translators append fragments in whatever order they visit the document;
//! serialization always emits the same section order:
//!
//! 1. member variables (public, protected, private)
//! 2. constructor
//! 3. public properties, public methods
//! 4. protected properties, protected methods
//! 5. private properties, private methods

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::method_builder::{join_args, write_body, MemberVisibility, MethodArgument, MethodBuilder, MEMBER_INDENT};
use crate::property_builder::PropertyBuilder;
use crate::validate::{CompileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClassVisibility {
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "export")]
    Export,
    #[serde(rename = "export default")]
    #[default]
    ExportDefault,
}

impl ClassVisibility {
    fn prefix(&self) -> &'static str {
        match self {
            ClassVisibility::Private => "",
            ClassVisibility::Export => "export ",
            ClassVisibility::ExportDefault => "export default ",
        }
    }
}

/// TypeScript definite-assignment (`!`) or optional (`?`) marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Optional,
    Definite,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Optional => write!(f, "?"),
            Modifier::Definite => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberVariable {
    pub name: String,
    pub ty: String,
    pub visibility: MemberVisibility,
    pub modifier: Option<Modifier>,
    pub default_value: Option<String>,
}

impl MemberVariable {
    pub fn new(name: &str, ty: &str, visibility: MemberVisibility) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            visibility,
            modifier: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }
}

impl fmt::Display for MemberVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", MEMBER_INDENT, self.visibility, self.name)?;
        if let Some(modifier) = self.modifier {
            write!(f, "{}", modifier)?;
        }
        write!(f, ": {}", self.ty)?;
        if let Some(value) = &self.default_value {
            write!(f, " = {}", value)?;
        }
        write!(f, ";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBuilder {
    pub name: String,
    pub visibility: ClassVisibility,
    pub base_class: Option<String>,
    interfaces: Vec<String>,
    constructor_args: Vec<MethodArgument>,
    constructor_body: Vec<String>,
    members: Vec<MemberVariable>,
    properties: Vec<PropertyBuilder>,
    methods: Vec<MethodBuilder>,
}

impl ClassBuilder {
    pub fn new(name: &str, visibility: ClassVisibility) -> Self {
        Self {
            name: name.to_string(),
            visibility,
            base_class: None,
            interfaces: Vec::new(),
            constructor_args: Vec::new(),
            constructor_body: Vec::new(),
            members: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn add_interface(&mut self, name: &str) {
        self.interfaces.push(name.to_string());
    }

    pub fn set_constructor_args(&mut self, args: Vec<MethodArgument>) {
        self.constructor_args = args;
    }

    /// A constructor is only emitted once it has at least one statement.
    pub fn add_constructor_line(&mut self, line: impl Into<String>) {
        self.constructor_body.push(line.into());
    }

    pub fn add_member(&mut self, member: MemberVariable) {
        self.members.push(member);
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    pub fn add_property(&mut self, property: PropertyBuilder) {
        self.properties.push(property);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyBuilder> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn add_method(&mut self, method: MethodBuilder) -> &mut MethodBuilder {
        self.methods.push(method);
        let last = self.methods.len() - 1;
        &mut self.methods[last]
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodBuilder> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Result<&mut MethodBuilder> {
        self.methods
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| CompileError::UnknownMethod(name.to_string()))
    }

    /// Returns the named method, creating it with `make` on first use.
    pub fn method_or_insert_with<F>(&mut self, name: &str, make: F) -> &mut MethodBuilder
    where
        F: FnOnce() -> MethodBuilder,
    {
        match self.methods.iter().position(|m| m.name == name) {
            Some(index) => &mut self.methods[index],
            None => self.add_method(make()),
        }
    }

    fn header(&self) -> String {
        let mut header = format!("{}class {}", self.visibility.prefix(), self.name);
        if let Some(base) = &self.base_class {
            header.push_str(" extends ");
            header.push_str(base);
        }
        if !self.interfaces.is_empty() {
            header.push_str(" implements ");
            header.push_str(&self.interfaces.join(", "));
        }
        header
    }

    fn blocks(&self) -> Vec<String> {
        let mut blocks = Vec::new();

        for visibility in MemberVisibility::ORDER {
            let group: Vec<String> = self
                .members
                .iter()
                .filter(|m| m.visibility == visibility)
                .map(ToString::to_string)
                .collect();
            if !group.is_empty() {
                blocks.push(group.join("\n"));
            }
        }

        if !self.constructor_body.is_empty() {
            blocks.push(Constructor(self).to_string());
        }

        for visibility in MemberVisibility::ORDER {
            blocks.extend(
                self.properties
                    .iter()
                    .filter(|p| p.visibility == visibility)
                    .map(ToString::to_string),
            );
            blocks.extend(
                self.methods
                    .iter()
                    .filter(|m| m.visibility == visibility)
                    .map(ToString::to_string),
            );
        }

        blocks
    }
}

struct Constructor<'a>(&'a ClassBuilder);

impl fmt::Display for Constructor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}constructor({}) {{",
            MEMBER_INDENT,
            join_args(&self.0.constructor_args)
        )?;
        write_body(f, &self.0.constructor_body)?;
        write!(f, "{}}}", MEMBER_INDENT)
    }
}

impl fmt::Display for ClassBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.header())?;
        let blocks = self.blocks();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}
