//! View-model properties declared in the `Properties` section.

use log::debug;

use crate::class_builder::{MemberVariable, Modifier};
use crate::codegen::CompileSession;
use crate::document::Element;
use crate::imports::ImportOrigin;
use crate::method_builder::MemberVisibility;
use crate::names;
use crate::property_builder::PropertyBuilder;
use crate::validate::{CompileError, Result};

pub struct PropertyTranslator<'s> {
    session: &'s mut CompileSession,
}

impl<'s> PropertyTranslator<'s> {
    pub fn new(session: &'s mut CompileSession) -> Self {
        Self { session }
    }

    pub fn translate(&mut self, section: &Element) -> Result<()> {
        for element in &section.children {
            self.translate_property(element)
                .map_err(|e| e.at_line(element.line))?;
        }
        Ok(())
    }

    fn translate_property(&mut self, element: &Element) -> Result<()> {
        let name = element.require("name")?.trim();
        let ty = element.require("type")?.trim();
        let private_name = names::private_name_for(name);
        if self.session.class.has_member(&private_name) || self.session.class.property(name).is_some() {
            return Err(CompileError::conflict(format!(
                "property '{}' is declared more than once",
                name
            )));
        }
        debug!("property '{}': {}", name, ty);

        self.session.class.add_member(
            MemberVariable::new(&private_name, ty, MemberVisibility::Private)
                .with_modifier(Modifier::Definite),
        );

        if let Some(raw) = element.attr("default") {
            let value = self
                .session
                .expressions
                .typed_value(&mut self.session.imports, ty, raw)?;
            let init = self.session.members.init;
            self.session
                .emit(init, format!("this.{} = {};", private_name, value))?;
        }

        // Mixins notify through the host object they are mixed into.
        let notifier = if self.session.is_mixin {
            format!("this.{}", self.session.members.host)
        } else {
            "this".to_string()
        };

        let mut property = PropertyBuilder::new(name, ty, MemberVisibility::Public);
        property.add_getter_line(format!("return this.{};", private_name));
        property.add_setter_lines([
            format!("if (!isEqual(this.{}, value)) {{", private_name),
            format!("  this.{} = value;", private_name),
            format!(
                "  {}.{}.raise({{ propertyName: '{}', value }});",
                notifier, self.session.members.property_changed, name
            ),
            "}".to_string(),
        ]);
        self.session.class.add_property(property);
        self.session.imports.add(ImportOrigin::Utility, "isEqual");
        Ok(())
    }
}
