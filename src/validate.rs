//! Compile errors and diagnostics.
//!
//! Every failure the translators can raise is fatal: translation stops at the
//! first error and no partial output is returned. Each variant maps to a stable
//! code so tooling can match on it without parsing messages.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_REFERENCE: &str = "INS-ERR-REF-001";
pub const ERR_CONFLICT: &str = "INS-ERR-CONFLICT-001";
pub const ERR_MISSING_ATTRIBUTE: &str = "INS-ERR-ATTR-001";
pub const ERR_INVALID_EXPRESSION: &str = "INS-ERR-EXPR-001";
pub const ERR_UNKNOWN_ELEMENT: &str = "INS-ERR-ELEMENT-001";
pub const ERR_STRUCTURE: &str = "INS-ERR-STRUCTURE-001";
pub const ERR_XML: &str = "INS-ERR-XML-001";
pub const ERR_INTERNAL: &str = "INS-ERR-INTERNAL-001";

/// What kind of object a failed reference was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Material,
    Texture,
    Mesh,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Material => write!(f, "Material"),
            ReferenceKind::Texture => write!(f, "Texture"),
            ReferenceKind::Mesh => write!(f, "Mesh"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Variants raised against a document element carry its 1-based `line`; 0 means
/// not yet located (see [`CompileError::at_line`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{kind} reference not found: {name}")]
    Reference { kind: ReferenceKind, name: String, line: u32 },

    #[error("{kind} '{name}' is declared after it is used; declare it before the element that references it")]
    ForwardReference { kind: ReferenceKind, name: String, line: u32 },

    #[error("Conflicting assignments: {message}")]
    Conflict { message: String, line: u32 },

    #[error("<{element}> requires a '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String, line: u32 },

    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Unknown element <{element}> in {section}")]
    UnknownElement { element: String, section: String, line: u32 },

    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    #[error("XML error at line {line}: {message}")]
    Xml { message: String, line: u32 },

    #[error("Generated method '{0}' does not exist")]
    UnknownMethod(String),
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Reference { .. } | CompileError::ForwardReference { .. } => ERR_REFERENCE,
            CompileError::Conflict { .. } => ERR_CONFLICT,
            CompileError::MissingAttribute { .. } => ERR_MISSING_ATTRIBUTE,
            CompileError::InvalidExpression { .. } => ERR_INVALID_EXPRESSION,
            CompileError::UnknownElement { .. } => ERR_UNKNOWN_ELEMENT,
            CompileError::InvalidStructure(_) => ERR_STRUCTURE,
            CompileError::Xml { .. } => ERR_XML,
            CompileError::UnknownMethod(_) => ERR_INTERNAL,
        }
    }

    pub fn missing(element: &str, attribute: &str) -> Self {
        CompileError::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
            line: 0,
        }
    }

    pub fn reference(kind: ReferenceKind, name: &str) -> Self {
        CompileError::Reference {
            kind,
            name: name.to_string(),
            line: 0,
        }
    }

    pub fn forward_reference(kind: ReferenceKind, name: &str) -> Self {
        CompileError::ForwardReference {
            kind,
            name: name.to_string(),
            line: 0,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CompileError::Conflict {
            message: message.into(),
            line: 0,
        }
    }

    pub fn unknown_element(element: &str, section: &str) -> Self {
        CompileError::UnknownElement {
            element: element.to_string(),
            section: section.to_string(),
            line: 0,
        }
    }

    /// Locates the error at `line` unless it already has a line. Translators
    /// apply this per element, so the innermost element wins.
    pub fn at_line(mut self, at: u32) -> Self {
        match &mut self {
            CompileError::Reference { line, .. }
            | CompileError::ForwardReference { line, .. }
            | CompileError::Conflict { line, .. }
            | CompileError::MissingAttribute { line, .. }
            | CompileError::UnknownElement { line, .. } => {
                if *line == 0 {
                    *line = at;
                }
            }
            _ => {}
        }
        self
    }

    /// Source line carried by the error itself, if any.
    pub fn line(&self) -> Option<u32> {
        match self {
            CompileError::Xml { line, .. } => Some(*line),
            CompileError::Reference { line, .. }
            | CompileError::ForwardReference { line, .. }
            | CompileError::Conflict { line, .. }
            | CompileError::MissingAttribute { line, .. }
            | CompileError::UnknownElement { line, .. } => (*line > 0).then_some(*line),
            _ => None,
        }
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        Diagnostic {
            code: self.code().to_string(),
            message: self.to_string(),
            file: file.to_string(),
            line: self.line().unwrap_or(0),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Serializable form of a [`CompileError`], reported by the CLI and the Node bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}: [{}] {}", self.file, self.line, self.code, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.file, self.code, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_per_class() {
        let err = CompileError::reference(ReferenceKind::Material, "sharedMat");
        assert_eq!(err.code(), ERR_REFERENCE);
        assert_eq!(err.to_string(), "Material reference not found: sharedMat");

        let err = CompileError::missing("Custom", "factory");
        assert_eq!(err.code(), ERR_MISSING_ATTRIBUTE);
        assert_eq!(err.to_string(), "<Custom> requires a 'factory' attribute");
    }

    #[test]
    fn test_innermost_line_wins() {
        let err = CompileError::conflict("twice").at_line(12).at_line(3);
        assert_eq!(err.line(), Some(12));
        assert_eq!(err.to_string(), "Conflicting assignments: twice");
        assert_eq!(err.to_diagnostic("v.xml").line, 12);

        assert_eq!(CompileError::reference(ReferenceKind::Mesh, "m").line(), None);
        let structural = CompileError::InvalidStructure("x".to_string()).at_line(4);
        assert_eq!(structural.line(), None);
    }

    #[test]
    fn test_diagnostic_carries_xml_line() {
        let err = CompileError::Xml {
            message: "unexpected end".to_string(),
            line: 7,
        };
        let diag = err.to_diagnostic("views/Podium.xml");
        assert_eq!(diag.line, 7);
        assert_eq!(diag.code, ERR_XML);
        assert!(diag.to_string().starts_with("views/Podium.xml:7:"));
    }
}
