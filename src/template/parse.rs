//! Definition → [`Template`] compiler.
use serde_json::{Map, Value};

use super::{ArrayTemplate, ObjectTemplate, PropertyTemplate, Template, TypeRef, ValueTemplate};
use crate::error::{ContextPath, ParseError};
use crate::namespace::Namespace;
use crate::token::TokenParser;
use crate::traits::{type_of, TypeTag};

/// Compile a definition. Type names resolve through `namespace` when given,
/// otherwise against the built-ins only.
pub fn parse_template(definition: &Value, namespace: Option<&Namespace>) -> Result<Template, ParseError> {
    tracing::trace!(?definition, "compiling template");
    Parser { namespace, context: Vec::new() }.parse(definition)
}

struct Parser<'a> {
    namespace: Option<&'a Namespace>,
    context: Vec<String>,
}

impl Parser<'_> {
    fn parse(&mut self, definition: &Value) -> Result<Template, ParseError> {
        match definition {
            Value::Array(items) => self.parse_array(items),
            Value::Object(map) => self.parse_object(map),
            Value::String(s) => self.parse_string(s),
            // constants are their own default
            constant => Ok(Template::Value(ValueTemplate {
                tag: type_of(constant).into(),
                default: Some(constant.clone()),
            })),
        }
    }

    fn parse_string(&mut self, s: &str) -> Result<Template, ParseError> {
        let directive = match s.strip_prefix(':') {
            // `::text` escapes a literal string starting with a colon
            Some(rest) if !rest.starts_with(':') => rest,
            Some(rest) => return Ok(literal_string(rest)),
            None => return Ok(literal_string(s)),
        };

        let mut tokens = TokenParser::new(directive);
        let Some(name) = tokens.next() else {
            return Err(self.syntax("bad value template"));
        };
        let type_ref = self.resolve(name)?;
        let tag = type_ref.tag();

        let mut default = None;
        if let Some(token) = tokens.next() {
            if token != "default" {
                return Err(self.syntax(format!("unexpected token '{token}'")));
            }
            let value = self.default_literal(&mut tokens)?;
            if !tag.accepts(&value) {
                return Err(self.syntax(format!("default value conflicts with declared type {tag}")));
            }
            default = Some(value);
        }
        Ok(type_ref.instantiate(default))
    }

    fn parse_array(&mut self, items: &[Value]) -> Result<Template, ParseError> {
        let item = match items {
            [] => None,
            [item] => {
                let item = self.parse(item)?;
                if item.declared_default().is_some() {
                    return Err(self.syntax("array item should not have default value"));
                }
                Some(Box::new(item))
            }
            _ => return Err(self.syntax("array should not have multiple item templates")),
        };
        Ok(Template::Array(ArrayTemplate { default: None, item }))
    }

    fn parse_object(&mut self, map: &Map<String, Value>) -> Result<Template, ParseError> {
        let mut properties: Vec<PropertyTemplate> = Vec::with_capacity(map.len());
        for (spec, definition) in map {
            self.context.push(TokenParser::first(spec).to_string());
            let property = self.parse_property(spec, definition);
            let property = property.and_then(|p| {
                if properties.iter().any(|q| q.name == p.name) {
                    Err(self.syntax(format!("duplicate property '{}'", p.name)))
                } else {
                    Ok(p)
                }
            });
            self.context.pop();
            properties.push(property?);
        }
        Ok(Template::Object(ObjectTemplate { default: None, properties }))
    }

    /// `name [required] [nullable] [default <json>]`
    fn parse_property(&mut self, spec: &str, definition: &Value) -> Result<PropertyTemplate, ParseError> {
        let mut tokens = TokenParser::new(spec);
        let Some(name) = tokens.next() else {
            return Err(self.syntax("empty property name"));
        };
        let (mut required, mut nullable, mut default) = (false, true, None);

        tokens.next();
        if tokens.current() == Some("required") {
            required = true;
            nullable = false;
            tokens.next();
        }
        if tokens.current() == Some("nullable") {
            nullable = true;
            tokens.next();
        }
        if tokens.current() == Some("default") {
            default = Some(self.default_literal(&mut tokens)?);
        }
        if let Some(token) = tokens.current() {
            return Err(self.syntax(format!("unexpected token '{token}'")));
        }

        let mut template = self.parse(definition)?;
        if let Some(value) = default {
            if required {
                return Err(self.syntax("default value assigned to a required property"));
            }
            if template.declared_default().is_some() {
                return Err(self.syntax("multiple default values"));
            }
            let tag = template.tag();
            if !tag.accepts(&value) {
                return Err(self.syntax(format!("default value conflicts with declared type {tag}")));
            }
            template.set_default(value);
        }

        if template.tag() == TypeTag::Null && !nullable {
            return Err(self.syntax("null type must be nullable"));
        }
        Ok(PropertyTemplate { name: name.to_string(), required, nullable, template })
    }

    /// Decode everything after `default` as one JSON literal.
    fn default_literal(&self, tokens: &mut TokenParser<'_>) -> Result<Value, ParseError> {
        let Some(literal) = tokens.remainder() else {
            return Err(self.syntax("missing default value"));
        };
        tokens.done();
        serde_json::from_str(literal)
            .map_err(|e| self.syntax(format!("invalid default value `{literal}`: {e}")))
    }

    fn resolve(&self, name: &str) -> Result<TypeRef, ParseError> {
        let found = match self.namespace {
            Some(ns) => ns.resolve(name),
            None => TypeTag::from_name(name).map(TypeRef::Builtin),
        };
        found.ok_or_else(|| ParseError::UndefinedType {
            path: ContextPath(self.context.clone()),
            name: name.to_string(),
        })
    }

    fn syntax(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(&self.context, message)
    }
}

fn literal_string(s: &str) -> Template {
    Template::Value(ValueTemplate { tag: TypeTag::String, default: Some(Value::String(s.to_string())) })
}
