//! GUI section translation.
//!
//! Each root is an `AdvancedDynamicTexture`, either full screen or drawn on a
//! mesh. Every element below a root is a control class from the GUI library.

use log::debug;

use crate::codegen::CompileSession;
use crate::document::{Element, GuiRootKind};
use crate::expression::TranslateOptions;
use crate::imports::ImportOrigin;
use crate::names::{self, ObjectNames};
use crate::validate::{CompileError, Result};

const TEXTURE_TYPE: &str = "AdvancedDynamicTexture";
const TEXTURE_GUI_CTOR_ARGS: [&str; 3] = ["mesh", "width", "height"];
const LINK_WITH_MESH: &str = "linkWithMesh";

const GUI_OBSERVABLES: &[&str] = &[
    "onPointerClick",
    "onPointerDown",
    "onPointerEnter",
    "onPointerMove",
    "onPointerOut",
    "onPointerUp",
    "onImageLoaded",
    "onIsCheckedChanged",
    "onBeforeKeyAdd",
    "onBlur",
    "onFocus",
    "onKeyboardEventProcessed",
    "onTextChanged",
    "onTextCopy",
    "onTextCut",
    "onTextHighlight",
    "onTextPaste",
];

/// Control properties whose non-numeric literals are quoted (`50%`, `12px`, `Arial`).
const STRING_ATTRIBUTES: &[&str] = &[
    "clipboardData",
    "hoverCursor",
    "fontFamily",
    "fontStyle",
    "fontWeight",
    "text",
    "source",
    "promptMessage",
    "currentKey",
    "highlightedText",
    "margin",
    "placeholderText",
    "group",
    "fontSize",
    "height",
    "left",
    "top",
    "paddingBottom",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "width",
    "lineSpacing",
    "maxWidth",
    "x1",
    "x2",
    "y1",
    "y2",
    "barOffset",
    "thumbWidth",
    "background",
    "color",
    "disabledColor",
    "disabledColorItem",
    "shadowColor",
    "outlineColor",
    "focusedBackground",
    "focusedColor",
    "placeholderColor",
    "textHighlightColor",
    "borderColor",
];

pub struct GuiTranslator<'s> {
    session: &'s mut CompileSession,
}

impl<'s> GuiTranslator<'s> {
    pub fn new(session: &'s mut CompileSession) -> Self {
        Self { session }
    }

    pub fn translate(&mut self, section: &Element) -> Result<()> {
        self.session.imports.add(ImportOrigin::Gui, TEXTURE_TYPE);
        self.session.imports.add(ImportOrigin::Gui, "Control");

        for element in &section.children {
            let translated = match GuiRootKind::from_tag(&element.tag) {
                Some(GuiRootKind::FullScreen) => self.translate_full_screen(element),
                Some(GuiRootKind::TextureGui) => self.translate_texture_gui(element),
                None => Err(CompileError::unknown_element(&element.tag, "Guis")),
            };
            translated.map_err(|e| e.at_line(element.line))?;
        }
        Ok(())
    }

    fn translate_full_screen(&mut self, element: &Element) -> Result<()> {
        let method = self.session.members.init.to_string();
        let object = self.session.assign_names(TEXTURE_TYPE, element.attr("name"));
        names::declare(&mut self.session.class, TEXTURE_TYPE, &object, false)?;
        debug!("full screen gui '{}'", object.public_name);

        self.session.emit(
            &method,
            format!(
                "this.{} = {}.CreateFullscreenUI('{}', undefined, this.{});",
                object.private_name, TEXTURE_TYPE, object.public_name, self.session.members.scene
            ),
        )?;

        let options = TranslateOptions {
            skip_primitives: true,
            ..Default::default()
        };
        for attr in element.attrs_except(&["name"]) {
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            self.session.apply(&method, info)?;
        }

        self.translate_controls(element, &object, &method)
    }

    /// The mesh must already be translated; its construction method hosts the texture.
    fn translate_texture_gui(&mut self, element: &Element) -> Result<()> {
        let mesh_identifier = element.require("mesh")?.trim();
        let mesh = self.session.mesh(mesh_identifier)?.clone();
        let size = ["width", "height"]
            .iter()
            .map(|arg| match element.attr(arg) {
                Some(raw) => self.session.expressions.extract_expression(raw, false),
                None => Ok("undefined".to_string()),
            })
            .collect::<Result<Vec<_>>>()?;

        let method = mesh.method.clone();
        let deferred = self.session.is_deferred(&method);
        let object = self.session.assign_names(TEXTURE_TYPE, element.attr("name"));
        names::declare(&mut self.session.class, TEXTURE_TYPE, &object, deferred)?;
        debug!("mesh gui '{}' on '{}' in {}", object.public_name, mesh_identifier, method);

        let mesh_target = format!("{}{}", mesh.private_name, bang(deferred));

        self.session.emit(
            &method,
            format!(
                "this.{} = {}.CreateForMesh(this.{}, {}, {});",
                object.private_name, TEXTURE_TYPE, mesh_target, size[0], size[1]
            ),
        )?;

        let material_path = format!("{}.material", mesh_target);
        for attr in element.attrs_except(&["name"]) {
            if TEXTURE_GUI_CTOR_ARGS.contains(&attr.name.as_str()) {
                continue;
            }
            let options = TranslateOptions {
                skip_primitives: true,
                path_override: (attr.name == "alpha").then_some(material_path.as_str()),
                deferred,
                ..Default::default()
            };
            let info = self
                .session
                .translate_attribute(&attr.name, &attr.value, &object.private_name, &options)?;
            self.session.apply(&method, info)?;
        }

        self.translate_controls(element, &object, &method)
    }

    fn translate_controls(&mut self, element: &Element, parent: &ObjectNames, method: &str) -> Result<()> {
        for child in &element.children {
            self.translate_control(child, &parent.private_name, method)?;
        }
        Ok(())
    }

    fn translate_control(&mut self, element: &Element, parent: &str, method: &str) -> Result<()> {
        self.translate_control_at(element, parent, method)
            .map_err(|e| e.at_line(element.line))
    }

    fn translate_control_at(&mut self, element: &Element, parent: &str, method: &str) -> Result<()> {
        let ty = element.tag.as_str();
        self.session.imports.add(ImportOrigin::Gui, ty);
        let deferred = self.session.is_deferred(method);
        let object = self.session.assign_names(ty, element.attr("name"));
        names::declare(&mut self.session.class, ty, &object, deferred)?;

        let target = format!("{}{}", object.private_name, bang(deferred));
        self.session.emit_all(
            method,
            [
                format!("this.{} = new {}('{}');", object.private_name, ty, object.public_name),
                format!("this.{}{}.addControl(this.{});", parent, bang(deferred), target),
            ],
        )?;

        for attr in element.attrs_except(&["name"]) {
            let name = attr.name.as_str();
            if name == LINK_WITH_MESH && self.session.expressions.bound(&attr.value)?.is_none() {
                let mesh = self.session.mesh(attr.value.trim())?;
                let mesh_target = format!(
                    "{}{}",
                    mesh.private_name,
                    bang(self.session.is_deferred(&mesh.method))
                );
                self.session.emit(
                    method,
                    format!("this.{}.{}(this.{});", target, LINK_WITH_MESH, mesh_target),
                )?;
                continue;
            }

            let options = TranslateOptions {
                skip_primitives: true,
                is_observable: GUI_OBSERVABLES.contains(&name),
                quote_if_needed: STRING_ATTRIBUTES.contains(&name),
                update_method: (name == LINK_WITH_MESH).then_some(LINK_WITH_MESH),
                deferred,
                ..Default::default()
            };
            let info = self
                .session
                .translate_attribute(name, &attr.value, &object.private_name, &options)?;
            self.session.apply(method, info)?;
        }

        for child in &element.children {
            self.translate_control(child, &object.private_name, method)?;
        }
        Ok(())
    }
}

fn bang(deferred: bool) -> &'static str {
    if deferred {
        "!"
    } else {
        ""
    }
}
