#[cfg(test)]
mod tests {
    use crate::expression::*;
    use crate::imports::{ImportOrigin, ImportTracker};
    use crate::validate::CompileError;

    /// Test-only helper: true when no import group has any entries.
    trait ImportTrackerExt {
        fn is_empty(&self) -> bool;
    }

    impl ImportTrackerExt for ImportTracker {
        fn is_empty(&self) -> bool {
            [
                ImportOrigin::Core,
                ImportOrigin::Gui,
                ImportOrigin::Runtime,
                ImportOrigin::Utility,
            ]
            .into_iter()
            .all(|origin| self.group(origin).is_empty())
        }
    }

    fn translator() -> ExpressionTranslator {
        ExpressionTranslator::new("_host", "_bindingEngine")
    }

    #[test]
    fn test_enabled_routes_through_activation_method() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(
                &mut imports,
                "enabled",
                "{this.viewModel.isShown}",
                "x_group",
                &TranslateOptions {
                    update_method: Some("setEnabled"),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(
            info.property_setter,
            "this.x_group.setEnabled(this._host.viewModel.isShown);"
        );
        assert_eq!(
            info.add_binding.as_deref(),
            Some("this._bindingEngine.addBinding('this._host.viewModel.isShown', (value) => { this.x_group.setEnabled(value); });")
        );
    }

    #[test]
    fn test_hex_color_becomes_from_hex_string() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(&mut imports, "background", "#AF103D", "x_mat", &TranslateOptions::default())
            .unwrap();

        assert_eq!(info.value, "Color3.FromHexString('#AF103D')");
        assert_eq!(info.property_setter, "this.x_mat.background = Color3.FromHexString('#AF103D');");
        assert!(info.add_binding.is_none());
        let core: Vec<&String> = imports.group(ImportOrigin::Core).iter().collect();
        assert_eq!(core, vec!["Color3"]);
    }

    #[test]
    fn test_eight_digit_hex_is_color4() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(&mut imports, "color", "#AF103DFF", "x_mat", &TranslateOptions::default())
            .unwrap();
        assert_eq!(info.value, "Color4.FromHexString('#AF103DFF')");
        assert!(imports.contains(ImportOrigin::Core, "Color4"));
        assert!(!imports.contains(ImportOrigin::Core, "Color3"));
    }

    #[test]
    fn test_tuples_match_grammars_in_order() {
        let t = translator();
        let mut imports = ImportTracker::new();
        let opts = TranslateOptions::default();

        let color = t.translate(&mut imports, "diffuseColor", "1, 0.5, 0", "x_m", &opts).unwrap();
        assert_eq!(color.value, "new Color3(1, 0.5, 0)");

        let rgba = t.translate(&mut imports, "c", "0,0,0,1", "x_m", &opts).unwrap();
        assert_eq!(rgba.value, "new Color4(0, 0, 0, 1)");

        let position = t.translate(&mut imports, "position", "-2,0.5,10", "x_n", &opts).unwrap();
        assert_eq!(position.value, "new Vector3(-2, 0.5, 10)");
    }

    #[test]
    fn test_primitive_translation_is_deterministic() {
        let t = translator();
        let mut first = ImportTracker::new();
        let mut second = ImportTracker::new();
        let opts = TranslateOptions::default();
        let a = t.translate(&mut first, "position", "1,2,3", "x_n", &opts).unwrap();
        let b = t.translate(&mut second, "position", "1,2,3", "x_n", &opts).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.group(ImportOrigin::Core), second.group(ImportOrigin::Core));
        assert_eq!(first.group(ImportOrigin::Core).len(), 1);
    }

    #[test]
    fn test_skip_primitives_leaves_literal() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(
                &mut imports,
                "position",
                "1,2,3",
                "x_n",
                &TranslateOptions {
                    skip_primitives: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(info.value, "1,2,3");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_operator_expression_is_never_bound() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(
                &mut imports,
                "visibility",
                "{ this.a > 0 ? 1 : this.b * 2 }",
                "x_n",
                &TranslateOptions::default(),
            )
            .unwrap();
        assert_eq!(
            info.property_setter,
            "this.x_n.visibility = this._host.a > 0 ? 1 : this._host.b * 2;"
        );
        assert!(info.add_binding.is_none());
    }

    #[test]
    fn test_events_and_observables_subscribe() {
        let t = translator();
        let mut imports = ImportTracker::new();

        let event = t
            .translate(
                &mut imports,
                "loaded",
                "{this.onLoaded}",
                "x_loader",
                &TranslateOptions {
                    is_event: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(event.property_setter, "this.x_loader.loaded.subscribe(this._host.onLoaded);");
        assert!(event.add_binding.is_none());

        let observable = t
            .translate(
                &mut imports,
                "onPointerClick",
                "{() => this.select()}",
                "x_button",
                &TranslateOptions {
                    is_observable: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            observable.property_setter,
            "this.x_button.onPointerClickObservable.add(() => this._host.select());"
        );
    }

    #[test]
    fn test_quotes_only_non_numeric_literals() {
        let t = translator();
        let mut imports = ImportTracker::new();
        let opts = TranslateOptions {
            quote_if_needed: true,
            skip_primitives: true,
            ..Default::default()
        };

        assert_eq!(t.translate(&mut imports, "text", "Hello", "x_l", &opts).unwrap().value, "'Hello'");
        assert_eq!(t.translate(&mut imports, "width", "0.5", "x_l", &opts).unwrap().value, "0.5");
        assert_eq!(t.translate(&mut imports, "width", "50px", "x_l", &opts).unwrap().value, "'50px'");
        assert_eq!(t.translate(&mut imports, "text", "it's", "x_l", &opts).unwrap().value, "'it\\'s'");
    }

    #[test]
    fn test_deferred_target_and_path_override() {
        let mut imports = ImportTracker::new();
        let info = translator()
            .translate(
                &mut imports,
                "alpha",
                "{this.opacity}",
                "x_gui",
                &TranslateOptions {
                    path_override: Some("x_screen.material"),
                    deferred: true,
                    skip_primitives: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(info.property_setter, "this.x_screen.material!.alpha = this._host.opacity;");
    }

    #[test]
    fn test_empty_expression_is_invalid() {
        let mut imports = ImportTracker::new();
        let err = translator()
            .translate(&mut imports, "enabled", "{   }", "x_n", &TranslateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidExpression { .. }));
    }

    #[test]
    fn test_extract_expression_and_typed_values() {
        let t = translator();
        assert_eq!(t.extract_expression("{this.modelUrl}", true).unwrap(), "this._host.modelUrl");
        assert_eq!(t.extract_expression("models/a.glb", true).unwrap(), "'models/a.glb'");
        assert_eq!(t.extract_expression("createThing", false).unwrap(), "createThing");

        let mut imports = ImportTracker::new();
        assert_eq!(t.typed_value(&mut imports, "boolean", "true").unwrap(), "true");
        assert_eq!(t.typed_value(&mut imports, "string", "hi").unwrap(), "'hi'");
        assert_eq!(t.typed_value(&mut imports, "Vector3", "0,1,0").unwrap(), "new Vector3(0, 1, 0)");
        // The Color3 grammar would match, but the declared type wins.
        assert_eq!(t.typed_value(&mut imports, "number[]", "1,0,0").unwrap(), "1,0,0");
        assert!(imports.contains(ImportOrigin::Core, "Vector3"));
        assert!(!imports.contains(ImportOrigin::Core, "Color3"));
    }
}
