//! Bound-expression analysis.
//!
//! Expressions inside `{...}` are written against the view-model: `this` in the
//! document means the host object. The generated class reaches the host through
//! a member, so every `this` that refers to the document's root is rewritten to
//! `this.<host>`. Regular `function` bodies rebind `this` and are left alone;
//! arrow functions do not, so their `this` is rewritten.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, Function, ThisExpression};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use oxc_syntax::scope::ScopeFlags;

use crate::validate::{CompileError, Result};

/// A bound expression after host rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostExpression {
    /// Source text with root references pointing at the host member.
    pub code: String,
    /// Dotted path (`this._host.a.b`) when the expression is nothing but a
    /// property chain from the root.
    pub binding_path: Option<String>,
}

pub fn analyze(code: &str, host_member: &str) -> Result<HostExpression> {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_typescript(true)
        .with_module(true);

    let expr = Parser::new(&allocator, code, source_type)
        .parse_expression()
        .map_err(|errors| CompileError::InvalidExpression {
            expression: code.to_string(),
            reason: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    let mut collector = RootReferenceCollector { spans: Vec::new() };
    collector.visit_expression(&expr);

    let host_ref = format!("this.{}", host_member);
    let mut rewritten = code.to_string();
    collector.spans.sort_by(|a, b| b.0.cmp(&a.0));
    for (start, end) in collector.spans {
        rewritten.replace_range((start as usize)..(end as usize), &host_ref);
    }

    let binding_path = property_path(&expr).map(|segments| {
        let mut path = host_ref.clone();
        for segment in segments {
            path.push('.');
            path.push_str(&segment);
        }
        path
    });

    Ok(HostExpression {
        code: rewritten,
        binding_path,
    })
}

/// Segments of a non-optional `this.a.b.c` chain, outermost last.
fn property_path(expr: &Expression) -> Option<Vec<String>> {
    match expr {
        Expression::StaticMemberExpression(member) if !member.optional => {
            let mut segments = match &member.object {
                Expression::ThisExpression(_) => Vec::new(),
                object => property_path(object)?,
            };
            segments.push(member.property.name.to_string());
            Some(segments)
        }
        _ => None,
    }
}

struct RootReferenceCollector {
    spans: Vec<(u32, u32)>,
}

impl<'a> Visit<'a> for RootReferenceCollector {
    fn visit_this_expression(&mut self, it: &ThisExpression) {
        self.spans.push((it.span.start, it.span.end));
    }

    // `this` inside a non-arrow function is that function's receiver.
    fn visit_function(&mut self, _func: &Function<'a>, _flags: ScopeFlags) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_rewritten_and_bindable() {
        let expr = analyze("this.viewModel.isShown", "_host").unwrap();
        assert_eq!(expr.code, "this._host.viewModel.isShown");
        assert_eq!(
            expr.binding_path.as_deref(),
            Some("this._host.viewModel.isShown")
        );
    }

    #[test]
    fn test_every_root_reference_is_rewritten() {
        let expr = analyze("this.a + this.b", "_mixin").unwrap();
        assert_eq!(expr.code, "this._mixin.a + this._mixin.b");
        assert!(expr.binding_path.is_none());
    }

    #[test]
    fn test_calls_and_optional_chains_are_not_paths() {
        assert!(analyze("this.getColor()", "_host").unwrap().binding_path.is_none());
        assert!(analyze("this.a?.b", "_host").unwrap().binding_path.is_none());
        assert!(analyze("this", "_host").unwrap().binding_path.is_none());
        assert!(analyze("other.a", "_host").unwrap().binding_path.is_none());
    }

    #[test]
    fn test_arrow_keeps_root_but_function_does_not() {
        let arrow = analyze("() => this.onLoaded()", "_host").unwrap();
        assert_eq!(arrow.code, "() => this._host.onLoaded()");

        let func = analyze("function () { return this.x; }", "_host").unwrap();
        assert_eq!(func.code, "function () { return this.x; }");
    }

    #[test]
    fn test_unparsable_expression_fails() {
        let err = analyze("this.a +", "_host").unwrap_err();
        assert!(matches!(err, CompileError::InvalidExpression { .. }));
    }
}
