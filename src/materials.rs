//! Material translation: shared materials from the `Materials` section and
//! materials nested under a node with `<Material>`.

use log::debug;

use crate::codegen::CompileSession;
use crate::document::{slot_name_for_tag, Element, MaterialKind};
use crate::expression::TranslateOptions;
use crate::imports::ImportOrigin;
use crate::names::{self, ObjectNames};
use crate::references::SharedKind;
use crate::textures::TextureTranslator;
use crate::validate::{CompileError, Result};

pub struct MaterialTranslator<'s> {
    session: &'s mut CompileSession,
}

impl<'s> MaterialTranslator<'s> {
    pub fn new(session: &'s mut CompileSession) -> Self {
        Self { session }
    }

    pub fn translate_shared(&mut self, element: &Element) -> Result<()> {
        self.translate_shared_at(element)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_shared_at(&mut self, element: &Element) -> Result<()> {
        let kind = material_kind(element, "Materials")?;
        let name = element.require("name")?.trim();
        let site = self.session.shared.declare(SharedKind::Material, name)?;
        let method = site.method().to_string();
        let object = self.session.assign_names(kind.type_name(), Some(name));
        debug!("shared material '{}' into {}", name, method);

        let lazy = site.is_lazy() || self.session.is_deferred(&method);
        names::declare(&mut self.session.class, kind.type_name(), &object, lazy)?;

        if site.is_lazy() {
            self.session.emit(
                &method,
                format!("if (this.{0}) return this.{0};", object.private_name),
            )?;
        }
        self.translate_material(element, kind, &object, &method, None)?;
        if site.is_lazy() {
            self.session
                .emit(&method, format!("return this.{};", object.private_name))?;
        }
        Ok(())
    }

    /// A material owned by one node; `node` is the node's member.
    pub fn translate_node_material(&mut self, element: &Element, node: &str, method: &str) -> Result<()> {
        self.translate_node_material_at(element, node, method)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_node_material_at(&mut self, element: &Element, node: &str, method: &str) -> Result<()> {
        let kind = material_kind(element, "Material")?;
        let object = self
            .session
            .assign_names(kind.type_name(), element.attr("name"));
        let deferred = self.session.is_deferred(method);
        names::declare(&mut self.session.class, kind.type_name(), &object, deferred)?;

        self.translate_material(element, kind, &object, method, Some(node))
    }

    fn translate_material(
        &mut self,
        element: &Element,
        kind: MaterialKind,
        object: &ObjectNames,
        method: &str,
        node: Option<&str>,
    ) -> Result<()> {
        let ty = kind.type_name();
        self.session.imports.add(ImportOrigin::Core, ty);
        self.session.emit(
            method,
            format!(
                "this.{} = new {}('{}', this.{});",
                object.private_name, ty, object.public_name, self.session.members.scene
            ),
        )?;
        if let Some(node) = node {
            self.session.emit(
                method,
                format!("this.{}.material = this.{};", node, object.private_name),
            )?;
        }

        let options = TranslateOptions {
            deferred: self.session.is_deferred(method),
            ..Default::default()
        };
        for attr in element.attrs_except(&["name"]) {
            let is_slot = kind.has_slot(&attr.name);
            if is_slot && self.session.expressions.bound(&attr.value)?.is_none() {
                let texture = self
                    .session
                    .shared_reference(SharedKind::Texture, attr.value.trim())?;
                self.session.emit(
                    method,
                    format!("this.{}.{} = {};", object.private_name, attr.name, texture),
                )?;
                continue;
            }

            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            self.session.apply(method, info)?;
        }

        for slot_element in &element.children {
            let slot = slot_name_for_tag(&slot_element.tag);
            if !kind.has_slot(&slot) {
                return Err(CompileError::unknown_element(&slot_element.tag, ty).at_line(slot_element.line));
            }
            if element.has_attr(&slot) {
                return Err(CompileError::conflict(format!(
                    "texture slot '{}.{}' is set by both an attribute and a nested element",
                    object.public_name, slot
                ))
                .at_line(slot_element.line));
            }

            let texture = slot_element.only_child()?;
            TextureTranslator::new(self.session).translate_slot_texture(
                texture,
                &object.private_name,
                &slot,
                method,
            )?;
        }
        Ok(())
    }
}

fn material_kind(element: &Element, section: &str) -> Result<MaterialKind> {
    MaterialKind::from_tag(&element.tag)
        .ok_or_else(|| CompileError::unknown_element(&element.tag, section))
}
