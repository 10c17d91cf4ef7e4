#[cfg(test)]
mod tests {
    use crate::class_builder::*;
    use crate::method_builder::*;
    use crate::property_builder::*;

    #[test]
    fn test_method_renders_args_and_body() {
        let mut method = MethodBuilder::new("resize", "void", MemberVisibility::Public).with_args(vec![
            MethodArgument::new("width", "number"),
            MethodArgument::optional("height", "number"),
        ]);
        method.add_line("this.w = width;");
        method.add_lines(["if (height) {", "  this.h = height;", "}"]);

        assert_eq!(
            method.to_string(),
            "  public resize(width: number, height?: number): void {\n    this.w = width;\n    if (height) {\n      this.h = height;\n    }\n  }"
        );
    }

    #[test]
    fn test_static_and_arrow_methods() {
        let mut method = MethodBuilder::new("create", "Foo", MemberVisibility::Protected);
        method.is_static = true;
        assert!(method.to_string().starts_with("  protected static create(): Foo {"));

        let mut arrow = MethodBuilder::new("onClick", "void", MemberVisibility::Private)
            .with_args(vec![MethodArgument::new("e", "any")]);
        arrow.is_arrow = true;
        arrow.add_line("this.clicked = true;");
        assert!(arrow
            .to_string()
            .starts_with("  private onClick = (e: any): void => {\n    this.clicked = true;"));
    }

    #[test]
    fn test_property_without_setter_is_getter_only() {
        let mut prop = PropertyBuilder::new("mesh", "Mesh | undefined", MemberVisibility::Protected);
        prop.add_getter_line("return this.x_mesh;");
        let out = prop.to_string();
        assert!(out.contains("protected get mesh(): Mesh | undefined {"));
        assert!(!out.contains(" set "));
    }

    #[test]
    fn test_property_setter_uses_argument_name() {
        let mut prop = PropertyBuilder::new("speed", "number", MemberVisibility::Public);
        prop.setter_argument = "next".to_string();
        prop.add_getter_line("return this.x_speed;");
        prop.add_setter_lines(["this.x_speed = next;"]);
        let out = prop.to_string();
        assert!(out.contains("public set speed(next: number) {\n    this.x_speed = next;\n  }"));
    }

    #[test]
    fn test_class_sections_follow_fixed_order() {
        let mut class = ClassBuilder::new("Scene1", ClassVisibility::ExportDefault);
        class.base_class = Some("Base".to_string());
        class.add_interface("IDisposable");
        class.add_interface("IView");

        let mut private_method = MethodBuilder::new("_helper", "void", MemberVisibility::Private);
        private_method.add_line("return;");
        class.add_method(private_method);
        class.add_method(MethodBuilder::new("dispose", "void", MemberVisibility::Public));

        let mut prop = PropertyBuilder::new("size", "number", MemberVisibility::Public);
        prop.add_getter_line("return 1;");
        class.add_property(prop);

        class.add_member(
            MemberVariable::new("_count", "number", MemberVisibility::Private).with_default("0"),
        );
        class.add_member(
            MemberVariable::new("changed", "Event", MemberVisibility::Public)
                .with_modifier(Modifier::Definite),
        );
        class.add_constructor_line("this.init();");

        let out = class.to_string();
        assert!(out.starts_with(
            "export default class Scene1 extends Base implements IDisposable, IView {\n"
        ));

        let positions: Vec<usize> = [
            "public changed!: Event;",
            "private _count: number = 0;",
            "constructor() {",
            "public get size()",
            "public dispose()",
            "private _helper()",
        ]
        .iter()
        .map(|needle| out.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", out);
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_constructor_omitted_without_body() {
        let mut class = ClassBuilder::new("Empty", ClassVisibility::Private);
        class.set_constructor_args(vec![MethodArgument::new("x", "number")]);
        let out = class.to_string();
        assert!(out.starts_with("class Empty {"));
        assert!(!out.contains("constructor"));
    }

    #[test]
    fn test_method_lookup_is_idempotent() {
        let mut class = ClassBuilder::new("Lookup", ClassVisibility::Export);
        class
            .method_or_insert_with("_ensure_mat", || {
                MethodBuilder::new("_ensure_mat", "Material", MemberVisibility::Private)
            })
            .add_line("first;");
        class
            .method_or_insert_with("_ensure_mat", || {
                MethodBuilder::new("_ensure_mat", "Material", MemberVisibility::Private)
            })
            .add_line("second;");

        assert!(class.has_method("_ensure_mat"));
        assert_eq!(class.method("_ensure_mat").unwrap().body().len(), 2);
        assert_eq!(class.to_string().matches("_ensure_mat()").count(), 1);
        assert!(class.method_mut("missing").is_err());
    }
}
