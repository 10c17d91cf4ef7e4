//! # Inscribe View Compiler
//!
//! Compiles a declarative view document (XML) into a TypeScript class that
//! builds the described scene and keeps it in sync with a host view-model.
//!
//! ## Pipeline
//!
//! 1. **Parse**: XML text into the [`Document`] tree ([`parse_document`]).
//! 2. **Pre-pass**: shared material/texture names and node names are recorded so
//!    consumers can reference declarations that come later in the document.
//! 3. **Sections**: each top-level section is handed to its translator in
//!    document order. Translators append statements to methods of one
//!    [`ClassBuilder`], through the session owned by [`DocumentTranslator`].
//! 4. **Finalize**: implicit imports are grouped by module and prepended to the
//!    serialized class.
//!
//! ## Attribute Values
//!
//! - `{...}` is a bound expression. `this` inside it means the host object and is
//!   rewritten to the host member. A pure property path (`{this.a.b}`) also gets
//!   a live binding that re-runs the setter on change.
//! - A literal matching a typed-primitive grammar (`#ff0000`, `0, 1, 0`) becomes
//!   a constructor call.
//! - Anything else is emitted as written.
//!
//! ## Invariants
//!
//! - Output is a pure function of the document and [`CompileOptions`].
//! - Every error is fatal for the document and carries a stable code
//!   ([`CompileError::code`]).

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod cache;
mod class_builder;
mod codegen;
pub mod config;
pub mod discovery;
mod document;
mod expression;
mod finalize;
mod gui;
mod imports;
pub mod logging;
mod materials;
mod method_builder;
mod names;
mod nodes;
mod parse;
mod properties;
mod property_builder;
mod references;
mod scope;
mod textures;
mod validate;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod expression_tests;
#[cfg(test)]
mod parse_tests;

pub use class_builder::{ClassBuilder, ClassVisibility, MemberVariable, Modifier};
pub use codegen::DocumentTranslator;
pub use config::{CompileOptions, Libraries, ProjectConfig};
pub use document::{Attribute, Document, Element};
pub use expression::{AttributeInfo, ExpressionTranslator, TranslateOptions};
pub use finalize::CompiledView;
pub use imports::{ImportOrigin, ImportTracker};
pub use method_builder::{MemberVisibility, MethodArgument, MethodBuilder};
pub use parse::parse_document;
pub use property_builder::PropertyBuilder;
pub use validate::{CompileError, Diagnostic, ReferenceKind};

/// Translates an already parsed document.
pub fn compile_document(document: &Document, options: &CompileOptions) -> Result<CompiledView, CompileError> {
    let class_name = document.class_name()?.to_string();
    let code = DocumentTranslator::new(options.clone()).translate(document)?;
    Ok(CompiledView { class_name, code })
}

/// Parses and translates one view document.
pub fn compile_view(source: &str, options: &CompileOptions) -> Result<CompiledView, CompileError> {
    let document = parse_document(source)?;
    compile_document(&document, options)
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_view_native(source: String, options_json: Option<String>) -> napi::Result<CompiledView> {
    let options: CompileOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Invalid compile options: {}", e)))?,
        None => CompileOptions::default(),
    };
    compile_view(&source, &options)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))
}
