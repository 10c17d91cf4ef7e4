//! Texture translation: shared textures from the `Textures` section and
//! textures nested in a material's slot element.

use log::debug;

use crate::codegen::CompileSession;
use crate::document::{Element, TextureKind};
use crate::expression::TranslateOptions;
use crate::imports::ImportOrigin;
use crate::names::{self, ObjectNames};
use crate::references::SharedKind;
use crate::validate::{CompileError, Result};

/// Reloads the texture when a bound source changes.
const SOURCE_UPDATE_METHOD: &str = "updateURL";

pub struct TextureTranslator<'s> {
    session: &'s mut CompileSession,
}

impl<'s> TextureTranslator<'s> {
    pub fn new(session: &'s mut CompileSession) -> Self {
        Self { session }
    }

    pub fn translate_shared(&mut self, element: &Element) -> Result<()> {
        self.translate_shared_at(element)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_shared_at(&mut self, element: &Element) -> Result<()> {
        let kind = texture_kind(element, "Textures")?;
        let name = element.require("name")?.trim();
        let site = self.session.shared.declare(SharedKind::Texture, name)?;
        let method = site.method().to_string();
        let object = self.session.assign_names(kind.type_name(), Some(name));
        debug!("shared texture '{}' into {}", name, method);

        let lazy = site.is_lazy() || self.session.is_deferred(&method);
        names::declare(&mut self.session.class, kind.type_name(), &object, lazy)?;

        if site.is_lazy() {
            self.session.emit(
                &method,
                format!("if (this.{0}) return this.{0};", object.private_name),
            )?;
        }
        self.translate_texture(element, kind, &object, &method)?;
        if site.is_lazy() {
            self.session
                .emit(&method, format!("return this.{};", object.private_name))?;
        }
        Ok(())
    }

    /// A texture owned by one material slot, e.g. `<DiffuseTexture><Texture/></DiffuseTexture>`.
    pub fn translate_slot_texture(
        &mut self,
        element: &Element,
        material: &str,
        slot: &str,
        method: &str,
    ) -> Result<()> {
        self.translate_slot_texture_at(element, material, slot, method)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_slot_texture_at(
        &mut self,
        element: &Element,
        material: &str,
        slot: &str,
        method: &str,
    ) -> Result<()> {
        let kind = texture_kind(element, slot)?;
        let object = self
            .session
            .assign_names(kind.type_name(), element.attr("name"));
        let deferred = self.session.is_deferred(method);
        names::declare(&mut self.session.class, kind.type_name(), &object, deferred)?;

        self.translate_texture(element, kind, &object, method)?;
        self.session.emit(
            method,
            format!("this.{}.{} = this.{};", material, slot, object.private_name),
        )
    }

    fn translate_texture(
        &mut self,
        element: &Element,
        kind: TextureKind,
        object: &ObjectNames,
        method: &str,
    ) -> Result<()> {
        let ty = kind.type_name();
        let source_attribute = kind.source_attribute();
        self.session.imports.add(ImportOrigin::Core, ty);

        let source = self
            .session
            .expressions
            .extract_expression(element.require(source_attribute)?, true)?;
        self.session.emit_all(
            method,
            [
                format!(
                    "this.{} = new {}({}, this.{});",
                    object.private_name, ty, source, self.session.members.scene
                ),
                format!("this.{}.name = '{}';", object.private_name, object.public_name),
            ],
        )?;

        let deferred = self.session.is_deferred(method);
        for attr in element.attrs_except(&["name"]) {
            if attr.name == source_attribute {
                // Already passed to the constructor.
                let options = TranslateOptions {
                    update_method: Some(SOURCE_UPDATE_METHOD),
                    quote_if_needed: true,
                    deferred,
                    ..Default::default()
                };
                let info = self.session.translate_attribute(
                    &attr.name,
                    &attr.value,
                    &object.private_name,
                    &options,
                )?;
                if let Some(binding) = info.add_binding {
                    self.session.emit(method, binding)?;
                }
                continue;
            }

            let options = TranslateOptions {
                deferred,
                ..Default::default()
            };
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            self.session.apply(method, info)?;
        }
        Ok(())
    }
}

fn texture_kind(element: &Element, section: &str) -> Result<TextureKind> {
    TextureKind::from_tag(&element.tag)
        .ok_or_else(|| CompileError::unknown_element(&element.tag, section))
}
