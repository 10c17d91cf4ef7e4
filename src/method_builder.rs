use std::fmt;

use serde::{Deserialize, Serialize};

pub(crate) const MEMBER_INDENT: &str = "  ";
pub(crate) const BODY_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberVisibility {
    Public,
    Protected,
    Private,
}

impl MemberVisibility {
    pub const ORDER: [MemberVisibility; 3] = [
        MemberVisibility::Public,
        MemberVisibility::Protected,
        MemberVisibility::Private,
    ];
}

impl fmt::Display for MemberVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberVisibility::Public => write!(f, "public"),
            MemberVisibility::Protected => write!(f, "protected"),
            MemberVisibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArgument {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

impl MethodArgument {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            optional: false,
        }
    }

    pub fn optional(name: &str, ty: &str) -> Self {
        Self {
            optional: true,
            ..Self::new(name, ty)
        }
    }
}

impl fmt::Display for MethodArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.optional { "?" } else { "" };
        write!(f, "{}{}: {}", self.name, marker, self.ty)
    }
}

pub(crate) fn join_args(args: &[MethodArgument]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn write_body(f: &mut fmt::Formatter<'_>, lines: &[String]) -> fmt::Result {
    for line in lines {
        writeln!(f, "{}{}", BODY_INDENT, line)?;
    }
    Ok(())
}

/// A class method. Statements are stored verbatim and never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBuilder {
    pub name: String,
    pub return_type: String,
    pub visibility: MemberVisibility,
    pub args: Vec<MethodArgument>,
    pub is_static: bool,
    /// Emit as an arrow-function class field.
    pub is_arrow: bool,
    body: Vec<String>,
}

impl MethodBuilder {
    pub fn new(name: &str, return_type: &str, visibility: MemberVisibility) -> Self {
        Self {
            name: name.to_string(),
            return_type: return_type.to_string(),
            visibility,
            args: Vec::new(),
            is_static: false,
            is_arrow: false,
            body: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<MethodArgument>) -> Self {
        self.args = args;
        self
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    pub fn add_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }
}

impl fmt::Display for MethodBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = if self.is_static {
            format!("{} static", self.visibility)
        } else {
            self.visibility.to_string()
        };
        let args = join_args(&self.args);

        if self.is_arrow {
            writeln!(
                f,
                "{}{} {} = ({}): {} => {{",
                MEMBER_INDENT, modifiers, self.name, args, self.return_type
            )?;
        } else {
            writeln!(
                f,
                "{}{} {}({}): {} {{",
                MEMBER_INDENT, modifiers, self.name, args, self.return_type
            )?;
        }
        write_body(f, &self.body)?;
        write!(f, "{}}}", MEMBER_INDENT)
    }
}
