//! Codegen module for the view compiler.
//!
//! [`DocumentTranslator`] drives one compilation: it seeds the class with the
//! infrastructure members, registers shared names in a pre-pass, dispatches each
//! section to its translator in document order and hands the finished
//! [`CompileSession`] to [`crate::finalize`].
//!
//! All mutable state of a compilation lives in the session. Section translators
//! borrow it for the duration of one call and never keep it.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::class_builder::{ClassBuilder, MemberVariable, Modifier};
use crate::config::CompileOptions;
use crate::document::{Document, Element, NodeKind, SectionKind};
use crate::expression::{AttributeInfo, ExpressionTranslator, TranslateOptions};
use crate::finalize;
use crate::gui::GuiTranslator;
use crate::imports::{ImportOrigin, ImportTracker};
use crate::materials::MaterialTranslator;
use crate::method_builder::{MemberVisibility, MethodArgument, MethodBuilder};
use crate::names::{NameGenerator, ObjectNames};
use crate::nodes::NodeTranslator;
use crate::properties::PropertyTranslator;
use crate::references::{Access, SharedKind, SharedObjects};
use crate::textures::TextureTranslator;
use crate::validate::{CompileError, ReferenceKind, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBER NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Names of the infrastructure members every generated class carries.
#[derive(Debug, Clone)]
pub struct MemberNames {
    pub root: &'static str,
    pub scene: &'static str,
    pub host: &'static str,
    pub init: &'static str,
    pub binding_engine: &'static str,
    pub property_changed: &'static str,
    pub is_initialized: &'static str,
}

impl MemberNames {
    pub fn new(is_mixin: bool) -> Self {
        Self {
            root: "_root",
            scene: "_scene",
            host: if is_mixin { "_mixin" } else { "_host" },
            init: "__init",
            binding_engine: "_bindingEngine",
            property_changed: "propertyChanged",
            is_initialized: "_isInitialized",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// A named mesh that a GUI texture or `linkWithMesh` can anchor to.
#[derive(Debug, Clone)]
pub struct MeshEntry {
    pub private_name: String,
    /// Method that constructs the mesh.
    pub method: String,
}

pub struct CompileSession {
    pub options: CompileOptions,
    pub is_mixin: bool,
    pub members: MemberNames,
    pub class: ClassBuilder,
    pub imports: ImportTracker,
    pub explicit_imports: Vec<String>,
    pub shared: SharedObjects,
    pub names: NameGenerator,
    pub expressions: ExpressionTranslator,
    pub meshes: HashMap<String, MeshEntry>,
    /// Every author-named node in the document, for forward-reference diagnostics.
    pub node_names: HashSet<String>,
    /// `(method, statement)` pairs appended after every section is translated,
    /// since later sections may still add to a method (a GUI on a deferred mesh).
    pub pending_triggers: Vec<(String, String)>,
    /// Deferred-group `onInit` calls, appended after the triggers.
    pub pending_callbacks: Vec<(String, String)>,
}

impl CompileSession {
    pub fn new(class_name: &str, is_mixin: bool, options: &CompileOptions) -> Self {
        let members = MemberNames::new(is_mixin);
        Self {
            class: ClassBuilder::new(class_name, options.class_visibility),
            expressions: ExpressionTranslator::new(members.host, members.binding_engine),
            options: options.clone(),
            is_mixin,
            members,
            imports: ImportTracker::new(),
            explicit_imports: Vec::new(),
            shared: SharedObjects::new(),
            names: NameGenerator::new(),
            meshes: HashMap::new(),
            node_names: HashSet::new(),
            pending_triggers: Vec::new(),
            pending_callbacks: Vec::new(),
        }
    }

    /// True for any method other than the main initializer.
    pub fn is_deferred(&self, method: &str) -> bool {
        method != self.members.init
    }

    pub fn emit(&mut self, method: &str, line: impl Into<String>) -> Result<()> {
        let line = line.into();
        trace!("{} <- {}", method, line);
        self.class.method_mut(method)?.add_line(line);
        Ok(())
    }

    pub fn emit_all<I, S>(&mut self, method: &str, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.emit(method, line)?;
        }
        Ok(())
    }

    /// Emits the one-time setter and, when present, the live binding.
    pub fn apply(&mut self, method: &str, info: AttributeInfo) -> Result<()> {
        self.emit(method, info.property_setter)?;
        if let Some(binding) = info.add_binding {
            self.emit(method, binding)?;
        }
        Ok(())
    }

    pub fn translate_attribute(
        &mut self,
        name: &str,
        raw: &str,
        target: &str,
        options: &TranslateOptions,
    ) -> Result<AttributeInfo> {
        self.expressions
            .translate(&mut self.imports, name, raw, target, options)
    }

    /// Synthesized names also skip members already on the class.
    pub fn assign_names(&mut self, ty: &str, given: Option<&str>) -> ObjectNames {
        let mut object = self.names.assign(ty, given);
        while !object.is_referenceable && self.class.has_member(&object.private_name) {
            object = self.names.assign(ty, None);
        }
        object
    }

    /// Expression reading a shared object from a consumer. Creates the ensure
    /// method on the promoting access.
    pub fn shared_reference(&mut self, kind: SharedKind, name: &str) -> Result<String> {
        match self.shared.access(kind, name)? {
            Access::Member => Ok(format!("this.{}", crate::names::private_name_for(name))),
            Access::Ensure { method, created } => {
                if created {
                    debug!("promoting shared {} '{}' to {}", kind.reference_kind(), name, method);
                    let return_type = kind.ensure_return_type();
                    self.imports.add(ImportOrigin::Core, return_type);
                    self.class.add_method(MethodBuilder::new(
                        &method,
                        return_type,
                        MemberVisibility::Private,
                    ));
                }
                Ok(format!("this.{}()", method))
            }
        }
    }

    pub fn mesh(&self, identifier: &str) -> Result<&MeshEntry> {
        match self.meshes.get(identifier) {
            Some(entry) => Ok(entry),
            None if self.node_names.contains(identifier) => {
                Err(CompileError::forward_reference(ReferenceKind::Mesh, identifier))
            }
            None => Err(CompileError::reference(ReferenceKind::Mesh, identifier)),
        }
    }

    /// Appends queued trigger checks, then queued callbacks, to their methods.
    pub fn flush_pending(&mut self) -> Result<()> {
        let triggers = std::mem::take(&mut self.pending_triggers);
        let callbacks = std::mem::take(&mut self.pending_callbacks);
        for (method, line) in triggers.into_iter().chain(callbacks) {
            self.emit(&method, line)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT TRANSLATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct DocumentTranslator {
    options: CompileOptions,
}

impl DocumentTranslator {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn translate(&self, document: &Document) -> Result<String> {
        let class_name = document.class_name()?;
        let is_mixin = document.is_mixin();
        debug!("translating view '{}' (mixin: {})", class_name, is_mixin);

        let mut session = CompileSession::new(class_name, is_mixin, &self.options);
        setup_infrastructure(&mut session);
        record_forward_names(&mut session, document)?;

        for section in document.sections() {
            translate_section(&mut session, section, &document.root.tag)?;
        }

        session.flush_pending()?;

        if let Some((kind, name)) = session.shared.undeclared().first() {
            return Err(CompileError::InvalidStructure(format!(
                "shared {} '{}' was registered but never translated",
                kind.reference_kind(),
                name
            )));
        }

        Ok(finalize::assemble(&session))
    }
}

fn setup_infrastructure(session: &mut CompileSession) {
    let m = session.members.clone();
    let host_arg = if session.is_mixin { "mixin" } else { "host" };

    session.imports.add(ImportOrigin::Core, "Node");
    session.imports.add(ImportOrigin::Core, "Scene");
    session.imports.add(ImportOrigin::Runtime, "BindingEngine");
    session.imports.add(ImportOrigin::Runtime, "Event");

    let class = &mut session.class;
    class.add_member(
        MemberVariable::new(m.root, "Node | null", MemberVisibility::Private).with_default("null"),
    );
    class.add_member(
        MemberVariable::new(m.scene, "Scene", MemberVisibility::Private)
            .with_modifier(Modifier::Definite),
    );
    class.add_member(
        MemberVariable::new(m.host, "any", MemberVisibility::Private).with_modifier(Modifier::Definite),
    );
    class.add_member(
        MemberVariable::new(m.binding_engine, "BindingEngine", MemberVisibility::Private)
            .with_modifier(Modifier::Definite),
    );
    class.add_member(
        MemberVariable::new(m.is_initialized, "boolean", MemberVisibility::Private)
            .with_default("false"),
    );

    let mut init = MethodBuilder::new(m.init, "void", MemberVisibility::Protected).with_args(vec![
        MethodArgument::new("root", "Node | Scene"),
        MethodArgument::new(host_arg, "any"),
    ]);
    init.add_lines([
        format!("if (this.{}) return;", m.is_initialized),
        format!("this.{} = true;", m.is_initialized),
        "if (root instanceof Scene) {".to_string(),
        format!("  this.{} = null;", m.root),
        format!("  this.{} = root;", m.scene),
        "} else {".to_string(),
        format!("  this.{} = root;", m.root),
        format!("  this.{} = root.getScene();", m.scene),
        "}".to_string(),
        format!("this.{} = {};", m.host, host_arg),
        format!("this.{} = new BindingEngine(this);", m.binding_engine),
    ]);

    if session.is_mixin {
        init.add_lines([
            format!("if (!{}.{}) {{", host_arg, m.property_changed),
            format!("  {}.{} = new Event();", host_arg, m.property_changed),
            "}".to_string(),
        ]);
    } else {
        session.imports.add(ImportOrigin::Runtime, "IPropertyChangedArgs");
        class.add_member(
            MemberVariable::new(m.property_changed, "Event<IPropertyChangedArgs>", MemberVisibility::Public)
                .with_modifier(Modifier::Definite),
        );
        init.add_line(format!("this.{} = new Event();", m.property_changed));

        class.set_constructor_args(vec![
            MethodArgument::new("root", "Node | Scene"),
            MethodArgument::optional("host", "any"),
        ]);
        class.add_constructor_line(format!("this.{}(root, host ?? this);", m.init));
    }

    class.add_method(init);
}

/// Pre-pass: shared material/texture names, every named node, and every
/// author-given name as reserved for the name generator.
fn record_forward_names(session: &mut CompileSession, document: &Document) -> Result<()> {
    let init = session.members.init;
    for section in document.sections() {
        reserve_author_names(&section.children, &mut session.names);
        let kind = match SectionKind::from_tag(&section.tag) {
            Some(SectionKind::Materials) => SharedKind::Material,
            Some(SectionKind::Textures) => SharedKind::Texture,
            Some(SectionKind::Nodes) => {
                collect_node_names(&section.children, &mut session.node_names);
                continue;
            }
            _ => continue,
        };
        for element in &section.children {
            let name = element.require("name")?.trim();
            debug!("registered shared {} '{}'", kind.reference_kind(), name);
            session
                .shared
                .register(kind, name, init)
                .map_err(|e| e.at_line(element.line))?;
        }
    }
    Ok(())
}

fn collect_node_names(elements: &[Element], names: &mut HashSet<String>) {
    for element in elements {
        // Material wrappers hold materials, not nodes.
        if NodeKind::from_tag(&element.tag) == Some(NodeKind::Material) {
            continue;
        }
        if let Some(name) = element.attr("name") {
            names.insert(name.trim().to_string());
        }
        collect_node_names(&element.children, names);
    }
}

fn reserve_author_names(elements: &[Element], names: &mut NameGenerator) {
    for element in elements {
        if let Some(name) = element.attr("name") {
            names.reserve(name);
        }
        reserve_author_names(&element.children, names);
    }
}

fn translate_section(session: &mut CompileSession, section: &Element, root_tag: &str) -> Result<()> {
    let kind = SectionKind::from_tag(&section.tag)
        .ok_or_else(|| CompileError::unknown_element(&section.tag, root_tag).at_line(section.line))?;
    debug!("section <{}> ({} elements)", section.tag, section.children.len());

    match kind {
        SectionKind::Imports => {
            session.explicit_imports.extend(
                section
                    .text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
            Ok(())
        }
        SectionKind::Properties => PropertyTranslator::new(session).translate(section),
        SectionKind::Nodes => NodeTranslator::new(session).translate(section),
        SectionKind::Materials => {
            let mut translator = MaterialTranslator::new(session);
            for element in &section.children {
                translator.translate_shared(element)?;
            }
            Ok(())
        }
        SectionKind::Textures => {
            let mut translator = TextureTranslator::new(session);
            for element in &section.children {
                translator.translate_shared(element)?;
            }
            Ok(())
        }
        SectionKind::Guis => GuiTranslator::new(session).translate(section),
    }
}
