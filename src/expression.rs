//! # Attribute Expression Translation
//!
//! An attribute value is one of three things:
//!
//! 1. **Bound expression**: `{...}`. The body is rewritten to read from the host
//!    (see [`crate::scope`]). Pure property paths also get a live binding.
//! 2. **Typed primitive**: a numeric tuple or hex color matching one of the
//!    registered grammars (`Color3`, `Color4`, `Vector3`), turned into a
//!    constructor call and recorded as an import.
//! 3. **Literal**: emitted as-is, or single-quoted for string-typed targets.
//!
//! The statement that applies the value is chosen by the caller through
//! [`TranslateOptions`], never inferred from the value.

use lazy_static::lazy_static;
use regex::Regex;

use crate::imports::{ImportOrigin, ImportTracker};
use crate::scope::{self, HostExpression};
use crate::validate::{CompileError, Result};

lazy_static! {
    static ref BOUND_EXPRESSION: Regex = Regex::new(r"^\{([\s\S]*)\}$").unwrap();
    static ref NUMERIC: Regex = Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").unwrap();
    static ref PRIMITIVES: Vec<(&'static str, Regex)> = {
        let component = r"(?:0?\.\d+|[01](?:\.0*)?)";
        let number = r"-?(?:\d+(?:\.\d*)?|\.\d+)";
        let tuple = |part: &str, arity: usize| {
            vec![part; arity].join(r"\s*,\s*")
        };
        vec![
            (
                "Color3",
                Regex::new(&format!(r"^(?:{}|#[0-9a-fA-F]{{6}})$", tuple(component, 3))).unwrap(),
            ),
            (
                "Color4",
                Regex::new(&format!(r"^(?:{}|#[0-9a-fA-F]{{8}})$", tuple(component, 4))).unwrap(),
            ),
            (
                "Vector3",
                Regex::new(&format!(r"^{}$", tuple(number, 3))).unwrap(),
            ),
        ]
    };
}

/// Result of translating one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    /// Right-hand side expression.
    pub value: String,
    /// Statement applying the value once.
    pub property_setter: String,
    /// Live subscription re-running the setter, for bound property paths.
    pub add_binding: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions<'a> {
    /// `target.name.subscribe(value)`
    pub is_event: bool,
    /// `target.nameObservable.add(value)`
    pub is_observable: bool,
    pub skip_primitives: bool,
    /// Quote non-numeric literals.
    pub quote_if_needed: bool,
    /// `target.method(value)` instead of assignment.
    pub update_method: Option<&'a str>,
    /// Replaces the target member in the setter path.
    pub path_override: Option<&'a str>,
    /// The target may not exist yet at type level; dereference with `!`.
    pub deferred: bool,
}

#[derive(Debug, Clone)]
pub struct ExpressionTranslator {
    host_member: String,
    binding_engine: String,
}

impl ExpressionTranslator {
    pub fn new(host_member: &str, binding_engine: &str) -> Self {
        Self {
            host_member: host_member.to_string(),
            binding_engine: binding_engine.to_string(),
        }
    }

    pub fn host_member(&self) -> &str {
        &self.host_member
    }

    /// Parses `{...}` content, or `None` if `raw` is not a bound expression.
    pub fn bound(&self, raw: &str) -> Result<Option<HostExpression>> {
        let value = raw.trim();
        let Some(caps) = BOUND_EXPRESSION.captures(value) else {
            return Ok(None);
        };
        let body = caps.get(1).map_or("", |m| m.as_str()).trim();
        if body.is_empty() {
            return Err(CompileError::InvalidExpression {
                expression: value.to_string(),
                reason: "expression is empty".to_string(),
            });
        }
        scope::analyze(body, &self.host_member).map(Some)
    }

    pub fn translate(
        &self,
        imports: &mut ImportTracker,
        name: &str,
        raw: &str,
        target: &str,
        options: &TranslateOptions,
    ) -> Result<AttributeInfo> {
        let value = raw.trim();
        let path = format!(
            "this.{}{}",
            options.path_override.unwrap_or(target),
            if options.deferred { "!" } else { "" }
        );
        let template = setter_template(&path, name, options);

        if let Some(expr) = self.bound(value)? {
            let add_binding = match (&expr.binding_path, template.rebindable) {
                (Some(binding_path), true) => Some(format!(
                    "this.{}.addBinding('{}', (value) => {{ {} }});",
                    self.binding_engine,
                    binding_path,
                    template.fill("value")
                )),
                _ => None,
            };
            return Ok(AttributeInfo {
                name: name.to_string(),
                property_setter: template.fill(&expr.code),
                value: expr.code,
                add_binding,
            });
        }

        let primitive = if options.skip_primitives {
            None
        } else {
            parse_primitive(imports, value)
        };
        let value = match primitive {
            Some(constructed) => constructed,
            None if options.quote_if_needed && !is_numeric(value) => quote(value),
            None => value.to_string(),
        };

        Ok(AttributeInfo {
            name: name.to_string(),
            property_setter: template.fill(&value),
            value,
            add_binding: None,
        })
    }

    /// Constructor-argument form: the rewritten expression, or the literal
    /// (quoted when asked).
    pub fn extract_expression(&self, raw: &str, quote_literal: bool) -> Result<String> {
        let value = raw.trim();
        Ok(match self.bound(value)? {
            Some(expr) => expr.code,
            None if quote_literal => quote(value),
            None => value.to_string(),
        })
    }

    /// Value of a declared type: only that type's grammar is tried, `string`
    /// literals are quoted.
    pub fn typed_value(&self, imports: &mut ImportTracker, ty: &str, raw: &str) -> Result<String> {
        let ty = ty.trim();
        let value = raw.trim();
        if let Some(expr) = self.bound(value)? {
            return Ok(expr.code);
        }

        let matches_type = PRIMITIVES
            .iter()
            .any(|(name, regex)| *name == ty && regex.is_match(value));
        if matches_type {
            imports.add(ImportOrigin::Core, ty);
            return Ok(construct(ty, value));
        }

        Ok(if ty == "string" {
            quote(value)
        } else {
            value.to_string()
        })
    }
}

struct SetterTemplate {
    prefix: String,
    suffix: &'static str,
    /// Event and observable registrations must not be replayed on change.
    rebindable: bool,
}

impl SetterTemplate {
    fn fill(&self, value: &str) -> String {
        format!("{}{}{}", self.prefix, value, self.suffix)
    }
}

fn setter_template(path: &str, name: &str, options: &TranslateOptions) -> SetterTemplate {
    if options.is_event {
        SetterTemplate {
            prefix: format!("{}.{}.subscribe(", path, name),
            suffix: ");",
            rebindable: false,
        }
    } else if options.is_observable {
        SetterTemplate {
            prefix: format!("{}.{}Observable.add(", path, name),
            suffix: ");",
            rebindable: false,
        }
    } else if let Some(method) = options.update_method {
        SetterTemplate {
            prefix: format!("{}.{}(", path, method),
            suffix: ");",
            rebindable: true,
        }
    } else {
        SetterTemplate {
            prefix: format!("{}.{} = ", path, name),
            suffix: ";",
            rebindable: true,
        }
    }
}

fn parse_primitive(imports: &mut ImportTracker, value: &str) -> Option<String> {
    let (ty, _) = PRIMITIVES.iter().find(|(_, regex)| regex.is_match(value))?;
    imports.add(ImportOrigin::Core, ty);
    Some(construct(ty, value))
}

fn construct(ty: &str, value: &str) -> String {
    if value.starts_with('#') {
        format!("{}.FromHexString('{}')", ty, value)
    } else {
        let args: Vec<&str> = value.split(',').map(str::trim).collect();
        format!("new {}({})", ty, args.join(", "))
    }
}

fn is_numeric(value: &str) -> bool {
    NUMERIC.is_match(value)
}

pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
