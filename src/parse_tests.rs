#[cfg(test)]
mod tests {
    use crate::parse::parse_document;
    use crate::validate::CompileError;

    #[test]
    fn test_namespaces_are_stripped() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<v:View xmlns:v="https://inscribe.dev/view" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" name="Hud">
  <v:Nodes>
    <v:TransformNode name="pivot" enabled="{this.visible}"/>
  </v:Nodes>
</v:View>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.root.tag, "View");
        assert_eq!(document.root.attributes.len(), 1);
        assert_eq!(document.class_name().unwrap(), "Hud");

        let nodes = &document.sections()[0];
        assert_eq!(nodes.tag, "Nodes");
        let pivot = &nodes.children[0];
        assert_eq!(pivot.tag, "TransformNode");
        assert_eq!(pivot.attr("enabled"), Some("{this.visible}"));
        assert_eq!(pivot.line, 4);
    }

    #[test]
    fn test_attribute_case_and_entities_survive() {
        let xml = r#"<View name="V"><Guis><FullScreen><TextBlock name="t" text="a &amp; b" onPointerClick="{() => this.go()}"/></FullScreen></Guis></View>"#;
        let document = parse_document(xml).unwrap();
        let text_block = &document.sections()[0].children[0].children[0];
        assert_eq!(text_block.attr("text"), Some("a & b"));
        assert!(text_block.has_attr("onPointerClick"));
        assert!(!text_block.has_attr("onpointerclick"));
    }

    #[test]
    fn test_import_text_and_cdata() {
        let xml = "<View name=\"V\">\n  <Imports>\n    import { a } from './a';\n    <![CDATA[import { b } from './b';]]>\n  </Imports>\n</View>";
        let document = parse_document(xml).unwrap();
        let imports = &document.sections()[0];
        assert!(imports.text.contains("import { a } from './a';"));
        assert!(imports.text.contains("import { b } from './b';"));
    }

    #[test]
    fn test_malformed_documents() {
        let err = parse_document("<View name=\"V\">\n<Nodes>\n</View>").unwrap_err();
        assert!(matches!(err, CompileError::Xml { .. }), "{:?}", err);

        let err = parse_document("").unwrap_err();
        assert!(err.to_string().contains("no root element"));

        let err = parse_document("<A/><B/>").unwrap_err();
        assert!(err.to_string().contains("more than one root"));
    }
}
