//! Node section translation.
//!
//! Walks the `Nodes` tree. Every handler receives the member its object is
//! parented to and the method the construction statements go into; deferred
//! groups switch that method for their subtree.

use log::{debug, warn};

use crate::class_builder::MemberVariable;
use crate::codegen::{CompileSession, MeshEntry};
use crate::document::{Element, NodeKind, ShapeKind};
use crate::expression::TranslateOptions;
use crate::imports::ImportOrigin;
use crate::materials::MaterialTranslator;
use crate::method_builder::{MemberVisibility, MethodBuilder};
use crate::names::{self, ObjectNames};
use crate::references::SharedKind;
use crate::validate::{CompileError, Result};

const MODEL_LOADER_EVENTS: [&str; 4] = ["loaded", "loading", "loadFailed", "progress"];
const CUSTOM_META_ATTRIBUTES: [&str; 4] = ["name", "type", "factory", "attachChildrenTo"];

/// Where a node's statements land.
#[derive(Debug, Clone)]
struct Placement<'e> {
    /// Member expression the node is parented to, without `this.`.
    parent: String,
    parent_element: Option<&'e Element>,
    method: String,
}

pub struct NodeTranslator<'s> {
    session: &'s mut CompileSession,
}

impl<'s> NodeTranslator<'s> {
    pub fn new(session: &'s mut CompileSession) -> Self {
        Self { session }
    }

    pub fn translate(&mut self, section: &Element) -> Result<()> {
        for element in &section.children {
            let placement = Placement {
                parent: self.session.members.root.to_string(),
                parent_element: None,
                method: self.session.members.init.to_string(),
            };
            self.translate_recursive(element, &placement)?;
        }
        Ok(())
    }

    fn translate_recursive<'e>(&mut self, element: &'e Element, at: &Placement<'e>) -> Result<()> {
        self.translate_node(element, at)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_node<'e>(&mut self, element: &'e Element, at: &Placement<'e>) -> Result<()> {
        let kind = NodeKind::from_tag(&element.tag)
            .ok_or_else(|| CompileError::unknown_element(&element.tag, "Nodes"))?;
        debug!("node <{}> into {}", element.tag, at.method);

        match kind {
            NodeKind::TransformNode => self.translate_transform_node(element, at),
            NodeKind::Shape(shape) => self.translate_shape(element, shape, at),
            NodeKind::ModelLoader => self.translate_model_loader(element, at),
            NodeKind::Custom => self.translate_custom(element, at),
            NodeKind::DeferredGroup => self.translate_deferred_group(element, at),
            NodeKind::Material => self.translate_material(element, at),
        }
    }

    fn translate_children<'e>(&mut self, element: &'e Element, parent: &str, method: &str) -> Result<()> {
        let placement = Placement {
            parent: parent.to_string(),
            parent_element: Some(element),
            method: method.to_string(),
        };
        for child in &element.children {
            self.translate_recursive(child, &placement)?;
        }
        Ok(())
    }

    fn declare(&mut self, ty: &str, element: &Element, method: &str) -> Result<ObjectNames> {
        let object = self.session.assign_names(ty, element.attr("name"));
        let deferred = self.session.is_deferred(method);
        names::declare(&mut self.session.class, ty, &object, deferred)?;
        Ok(object)
    }

    fn node_options(&self, attribute: &str, method: &str) -> TranslateOptions<'static> {
        TranslateOptions {
            update_method: (attribute == "enabled").then_some("setEnabled"),
            deferred: self.session.is_deferred(method),
            ..Default::default()
        }
    }

    fn translate_transform_node(&mut self, element: &Element, at: &Placement) -> Result<()> {
        let ty = "TransformNode";
        self.session.imports.add(ImportOrigin::Core, ty);
        let object = self.declare(ty, element, &at.method)?;
        let scene = self.session.members.scene;

        self.session.emit_all(
            &at.method,
            [
                format!(
                    "this.{} = new {}('{}', this.{});",
                    object.private_name, ty, object.public_name, scene
                ),
                format!("this.{}.parent = this.{};", object.private_name, at.parent),
            ],
        )?;

        for attr in element.attrs_except(&["name"]) {
            let options = self.node_options(&attr.name, &at.method);
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            self.session.apply(&at.method, info)?;
        }

        self.translate_children(element, &object.private_name, &at.method)
    }

    fn translate_shape(&mut self, element: &Element, shape: ShapeKind, at: &Placement) -> Result<()> {
        let ty = shape.type_name();
        self.session.imports.add(ImportOrigin::Runtime, ty);
        let object = self.declare(ty, element, &at.method)?;
        let ctor_props = shape.constructor_props();

        let mut infos = Vec::new();
        for attr in element.attrs_except(&["name"]) {
            let options = self.node_options(&attr.name, &at.method);
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            infos.push((attr, info));
        }

        let props: Vec<String> = infos
            .iter()
            .filter(|(attr, _)| ctor_props.contains(&attr.name.as_str()))
            .map(|(attr, info)| format!("{}: {}", attr.name, info.value))
            .collect();
        let props_object = if props.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", props.join(", "))
        };

        self.session.emit_all(
            &at.method,
            [
                format!(
                    "this.{} = new {}(this.{}, '{}', {});",
                    object.private_name,
                    ty,
                    self.session.members.scene,
                    object.public_name,
                    props_object
                ),
                format!("this.{}.parent = this.{};", object.private_name, at.parent),
            ],
        )?;
        self.register_mesh(&object, &at.method);

        for (attr, info) in infos {
            if attr.name == "material" && self.session.expressions.bound(&attr.value)?.is_none() {
                let material = self
                    .session
                    .shared_reference(SharedKind::Material, attr.value.trim())?;
                self.session.emit(
                    &at.method,
                    format!("this.{}.material = {};", object.private_name, material),
                )?;
                continue;
            }

            if ctor_props.contains(&attr.name.as_str()) {
                // Passed to the constructor; only the live binding remains.
                if let Some(binding) = info.add_binding {
                    self.session.emit(&at.method, binding)?;
                }
            } else {
                self.session.apply(&at.method, info)?;
            }
        }

        self.translate_children(element, &object.private_name, &at.method)
    }

    fn translate_model_loader(&mut self, element: &Element, at: &Placement) -> Result<()> {
        let ty = "ModelLoader";
        self.session.imports.add(ImportOrigin::Runtime, ty);
        let url = self
            .session
            .expressions
            .extract_expression(element.require("url")?, true)?;
        let object = self.declare(ty, element, &at.method)?;

        self.session.emit_all(
            &at.method,
            [
                format!(
                    "this.{} = new {}(this.{}, '{}', {});",
                    object.private_name,
                    ty,
                    self.session.members.scene,
                    object.public_name,
                    url
                ),
                format!("this.{}.parent = this.{};", object.private_name, at.parent),
            ],
        )?;

        for attr in element.attrs_except(&["name"]) {
            let options = TranslateOptions {
                is_event: MODEL_LOADER_EVENTS.contains(&attr.name.as_str()),
                quote_if_needed: attr.name == "url",
                ..self.node_options(&attr.name, &at.method)
            };
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;

            if attr.name == "url" {
                if let Some(binding) = info.add_binding {
                    self.session.emit(&at.method, binding)?;
                }
            } else {
                self.session.apply(&at.method, info)?;
            }
        }

        self.translate_children(element, &object.private_name, &at.method)
    }

    fn translate_custom(&mut self, element: &Element, at: &Placement) -> Result<()> {
        let ty = element.require("type")?.trim().to_string();
        let factory = self
            .session
            .expressions
            .extract_expression(element.require("factory")?, false)?;
        let object = self.declare(&ty, element, &at.method)?;

        let options = TranslateOptions {
            skip_primitives: true,
            deferred: self.session.is_deferred(&at.method),
            ..Default::default()
        };
        let mut props = Vec::new();
        let mut bindings = Vec::new();
        for attr in element.attrs_except(&CUSTOM_META_ATTRIBUTES) {
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            props.push(format!("'{}': {}", info.name, info.value));
            bindings.extend(info.add_binding);
        }

        self.session.emit(
            &at.method,
            format!(
                "this.{} = ({})({{ {} }}, this.{});",
                object.private_name,
                factory,
                props.join(", "),
                at.parent
            ),
        )?;
        self.register_mesh(&object, &at.method);
        self.session.emit_all(&at.method, bindings)?;

        let children_parent = match element.attr("attachChildrenTo") {
            Some(member) => format!("{}.{}", object.private_name, member.trim()),
            None => object.private_name.clone(),
        };
        self.translate_children(element, &children_parent, &at.method)
    }

    fn translate_deferred_group(&mut self, element: &Element, at: &Placement) -> Result<()> {
        let name = element.require("name")?.trim();
        let flag = format!("_is_{}_initialized", name);
        let method = format!("ensure_{}", name);
        if self.session.class.has_method(&method) {
            return Err(CompileError::conflict(format!(
                "deferred group '{}' is declared more than once",
                name
            )));
        }

        self.session.class.add_member(
            MemberVariable::new(&flag, "boolean", MemberVisibility::Private)
                .with_default("false"),
        );
        let mut ensure = MethodBuilder::new(&method, "void", MemberVisibility::Protected);
        ensure.add_lines([
            format!("if (this.{}) return;", flag),
            format!("this.{} = true;", flag),
        ]);
        self.session.class.add_method(ensure);

        if let Some(raw) = element.attr("initWhen") {
            self.wire_init_trigger(raw, name, &method, &at.method)?;
        }

        let placement = Placement {
            parent: at.parent.clone(),
            parent_element: at.parent_element,
            method: method.clone(),
        };
        for child in &element.children {
            self.translate_recursive(child, &placement)?;
        }

        if let Some(raw) = element.attr("onInit") {
            let callback = self.session.expressions.extract_expression(raw, false)?;
            self.session
                .pending_callbacks
                .push((method, format!("({})();", callback)));
        }
        Ok(())
    }

    /// Bindings do not fire on registration, so the condition is also checked
    /// once after the enclosing method has built everything else.
    fn wire_init_trigger(&mut self, raw: &str, group: &str, ensure: &str, enclosing: &str) -> Result<()> {
        let condition = match self.session.expressions.bound(raw)? {
            Some(expr) => {
                match &expr.binding_path {
                    Some(path) => {
                        let binding = format!(
                            "this.{}.addBinding('{}', (value) => {{ if (value) this.{}(); }});",
                            self.session.members.binding_engine, path, ensure
                        );
                        self.session.emit(enclosing, binding)?;
                    }
                    None => warn!(
                        "initWhen of deferred group '{}' is not a property path; it is evaluated once and never re-checked",
                        group
                    ),
                }
                expr.code
            }
            None => raw.trim().to_string(),
        };

        self.session.pending_triggers.push((
            enclosing.to_string(),
            format!("if ({}) this.{}();", condition, ensure),
        ));
        Ok(())
    }

    fn translate_material(&mut self, element: &Element, at: &Placement) -> Result<()> {
        let Some(parent) = at.parent_element else {
            return Err(CompileError::InvalidStructure(
                "<Material> must be nested inside a node".to_string(),
            ));
        };
        if parent.has_attr("material") {
            return Err(CompileError::conflict(format!(
                "node '{}' has both a material attribute and a <Material> element",
                at.parent.trim_start_matches(names::PRIVATE_PREFIX)
            )));
        }

        let material = element.only_child()?;
        MaterialTranslator::new(self.session).translate_node_material(material, &at.parent, &at.method)
    }

    fn register_mesh(&mut self, object: &ObjectNames, method: &str) {
        if object.is_referenceable {
            self.session.meshes.insert(
                object.public_name.clone(),
                MeshEntry {
                    private_name: object.private_name.clone(),
                    method: method.to_string(),
                },
            );
        }
    }
}
