//! Finalize module for the view compiler.
//!
//! Joins the import block and the serialized class into the output module.

use serde::{Deserialize, Serialize};

use crate::codegen::CompileSession;
use crate::imports::ImportOrigin;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi_derive::napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompiledView {
    pub class_name: String,
    pub code: String,
}

impl CompiledView {
    /// `<ClassName>.ts`
    pub fn file_name(&self) -> String {
        format!("{}.ts", self.class_name)
    }
}

fn emit_imports(session: &CompileSession) -> Vec<String> {
    // Author-written lines first, verbatim.
    let mut lines = session.explicit_imports.clone();
    for origin in ImportOrigin::ORDER {
        let names = session.imports.group(origin);
        if names.is_empty() {
            continue;
        }
        let specifiers: Vec<&str> = names.iter().map(String::as_str).collect();
        lines.push(format!(
            "import {{ {} }} from '{}';",
            specifiers.join(", "),
            session.options.libraries.module_for(origin)
        ));
    }
    lines
}

pub fn assemble(session: &CompileSession) -> String {
    let imports = emit_imports(session);
    let class = session.class.to_string();
    if imports.is_empty() {
        return class;
    }
    format!("{}\n\n{}", imports.join("\n"), class)
}
