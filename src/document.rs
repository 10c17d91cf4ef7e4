//! # View Document Model
//!
//! The read-only tree the translators walk. A document root carries the class
//! name and the mixin flag; its children are the typed sections.
//!
//! ## Element Kinds
//!
//! Element tags are resolved once into closed kind enums ([`SectionKind`],
//! [`NodeKind`], [`MaterialKind`], [`TextureKind`], [`GuiRootKind`]). Translators
//! match on those, never on tag text.

use serde::{Deserialize, Serialize};

use crate::validate::{CompileError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
    /// Concatenated text and CDATA content.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub line: u32,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// The attribute value, or a missing-attribute error naming this element.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.attr(name)
            .ok_or_else(|| CompileError::missing(&self.tag, name).at_line(self.line))
    }

    /// Attributes minus those listed in `skip`, in document order.
    pub fn attrs_except<'a>(&'a self, skip: &'a [&str]) -> impl Iterator<Item = &'a Attribute> {
        self.attributes
            .iter()
            .filter(move |a| !skip.contains(&a.name.as_str()))
    }

    /// The single child of a wrapper element (`<Material>`, `<DiffuseTexture>`).
    pub fn only_child(&self) -> Result<&Element> {
        match self.children.as_slice() {
            [child] => Ok(child),
            [] => Err(CompileError::InvalidStructure(format!(
                "<{}> must contain exactly one element",
                self.tag
            ))),
            _ => Err(CompileError::InvalidStructure(format!(
                "<{}> must contain exactly one element, found {}",
                self.tag,
                self.children.len()
            ))),
        }
    }
}

/// A parsed view document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn class_name(&self) -> Result<&str> {
        match self.root.attr("name").map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(CompileError::missing(&self.root.tag, "name").at_line(self.root.line)),
        }
    }

    pub fn is_mixin(&self) -> bool {
        matches!(self.root.attr("isMixin").map(str::trim), Some("true"))
    }

    pub fn sections(&self) -> &[Element] {
        &self.root.children
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENT KINDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Imports,
    Properties,
    Nodes,
    Materials,
    Textures,
    Guis,
}

impl SectionKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Imports" => Some(SectionKind::Imports),
            "Properties" => Some(SectionKind::Properties),
            "Nodes" => Some(SectionKind::Nodes),
            "Materials" => Some(SectionKind::Materials),
            "Textures" => Some(SectionKind::Textures),
            "Guis" => Some(SectionKind::Guis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Box,
    Cylinder,
    Plane,
    Disc,
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Box => "Box",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Plane => "Plane",
            ShapeKind::Disc => "Disc",
        }
    }

    /// Attributes passed through the constructor options object.
    pub fn constructor_props(&self) -> &'static [&'static str] {
        match self {
            ShapeKind::Sphere => &["diameter", "segments"],
            ShapeKind::Box => &["width", "height", "depth", "size"],
            ShapeKind::Cylinder => &[
                "diameter",
                "diameterTop",
                "diameterBottom",
                "height",
                "tessellation",
            ],
            ShapeKind::Plane => &["width", "height", "size"],
            ShapeKind::Disc => &["radius", "tessellation"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    TransformNode,
    Shape(ShapeKind),
    ModelLoader,
    Custom,
    DeferredGroup,
    Material,
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TransformNode" => Some(NodeKind::TransformNode),
            "Sphere" => Some(NodeKind::Shape(ShapeKind::Sphere)),
            "Box" => Some(NodeKind::Shape(ShapeKind::Box)),
            "Cylinder" => Some(NodeKind::Shape(ShapeKind::Cylinder)),
            "Plane" => Some(NodeKind::Shape(ShapeKind::Plane)),
            "Disc" => Some(NodeKind::Shape(ShapeKind::Disc)),
            "ModelLoader" => Some(NodeKind::ModelLoader),
            "Custom" => Some(NodeKind::Custom),
            "DeferredGroup" => Some(NodeKind::DeferredGroup),
            "Material" => Some(NodeKind::Material),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Standard,
    Pbr,
}

impl MaterialKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "StandardMaterial" => Some(MaterialKind::Standard),
            "PBRMaterial" => Some(MaterialKind::Pbr),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            MaterialKind::Standard => "StandardMaterial",
            MaterialKind::Pbr => "PBRMaterial",
        }
    }

    pub fn texture_slots(&self) -> &'static [&'static str] {
        match self {
            MaterialKind::Standard => &[
                "ambientTexture",
                "bumpTexture",
                "cameraColorGradingTexture",
                "diffuseTexture",
                "emissiveTexture",
                "lightmapTexture",
                "opacityTexture",
                "reflectionTexture",
                "refractionTexture",
                "specularTexture",
            ],
            MaterialKind::Pbr => &[
                "albedoTexture",
                "ambientTexture",
                "bumpTexture",
                "emissiveTexture",
                "lightmapTexture",
                "metallicTexture",
                "microSurfaceTexture",
                "opacityTexture",
                "reflectionTexture",
                "reflectivityTexture",
                "refractionTexture",
            ],
        }
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.texture_slots().contains(&slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Texture,
    CubeTexture,
}

impl TextureKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Texture" => Some(TextureKind::Texture),
            "CubeTexture" => Some(TextureKind::CubeTexture),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TextureKind::Texture => "Texture",
            TextureKind::CubeTexture => "CubeTexture",
        }
    }

    /// The attribute holding the constructor's source location.
    pub fn source_attribute(&self) -> &'static str {
        match self {
            TextureKind::Texture => "url",
            TextureKind::CubeTexture => "rootUrl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiRootKind {
    FullScreen,
    TextureGui,
}

impl GuiRootKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FullScreen" => Some(GuiRootKind::FullScreen),
            "TextureGui" => Some(GuiRootKind::TextureGui),
            _ => None,
        }
    }
}

/// `DiffuseTexture` -> `diffuseTexture`.
pub fn slot_name_for_tag(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kinds_resolve_from_tags() {
        assert_eq!(
            NodeKind::from_tag("Box"),
            Some(NodeKind::Shape(ShapeKind::Box))
        );
        assert_eq!(NodeKind::from_tag("DeferredGroup"), Some(NodeKind::DeferredGroup));
        assert_eq!(NodeKind::from_tag("box"), None);
    }

    #[test]
    fn test_slot_name_lowercases_first_letter() {
        assert_eq!(slot_name_for_tag("DiffuseTexture"), "diffuseTexture");
        assert!(MaterialKind::Standard.has_slot(&slot_name_for_tag("EmissiveTexture")));
        assert!(!MaterialKind::Standard.has_slot("albedoTexture"));
    }

    #[test]
    fn test_document_root_accessors() {
        let doc = Document::new(
            Element::new("View")
                .with_attr("name", "Podium")
                .with_attr("isMixin", "true"),
        );
        assert_eq!(doc.class_name().unwrap(), "Podium");
        assert!(doc.is_mixin());

        let unnamed = Document::new(Element::new("View"));
        assert!(matches!(
            unnamed.class_name(),
            Err(CompileError::MissingAttribute { .. })
        ));
    }
}
