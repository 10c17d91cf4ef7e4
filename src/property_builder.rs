use std::fmt;

use crate::method_builder::{write_body, MemberVisibility, MEMBER_INDENT};

/// A get/set accessor pair. No setter lines means a getter-only property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBuilder {
    pub name: String,
    pub ty: String,
    pub visibility: MemberVisibility,
    pub setter_argument: String,
    getter: Vec<String>,
    setter: Vec<String>,
}

impl PropertyBuilder {
    pub fn new(name: &str, ty: &str, visibility: MemberVisibility) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            visibility,
            setter_argument: "value".to_string(),
            getter: Vec::new(),
            setter: Vec::new(),
        }
    }

    pub fn add_getter_line(&mut self, line: impl Into<String>) {
        self.getter.push(line.into());
    }

    pub fn add_setter_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.setter.extend(lines.into_iter().map(Into::into));
    }

    pub fn has_setter(&self) -> bool {
        !self.setter.is_empty()
    }
}

impl fmt::Display for PropertyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}{} get {}(): {} {{",
            MEMBER_INDENT, self.visibility, self.name, self.ty
        )?;
        write_body(f, &self.getter)?;
        write!(f, "{}}}", MEMBER_INDENT)?;

        if self.has_setter() {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(
                f,
                "{}{} set {}({}: {}) {{",
                MEMBER_INDENT, self.visibility, self.name, self.setter_argument, self.ty
            )?;
            write_body(f, &self.setter)?;
            write!(f, "{}}}", MEMBER_INDENT)?;
        }
        Ok(())
    }
}
