//! Compiled template tree.
//!
//! A definition (any JSON value) is compiled once by [`parse::parse_template`]
//! into a [`Template`], then reused read-only for any number of
//! [`Template::validate`] calls.
//!
//! ```text
//!   ObjectTemplate   := { PropertyTemplate: definition, ... }
//!   PropertyTemplate := name [required] [nullable] [default <json>]
//!   ArrayTemplate    := [] | [definition]
//!   directive        := :type-name [default <json>]
//!   constant         := number | boolean | null | string without leading ':'
//! ```
pub mod parse;
pub mod validate;

use std::sync::Arc;

use serde_json::Value;

pub use parse::parse_template;
pub use validate::ValidateOptions;

use crate::traits::TypeTag;

// ------------------------------- Nodes ----------------------------------- //

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Scalars and `any`; also what a constant definition compiles to.
    Value(ValueTemplate),
    Array(ArrayTemplate),
    Object(ObjectTemplate),
    /// Use of a user-defined type from a [`Namespace`](crate::Namespace).
    Named(NamedTemplate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueTemplate {
    pub tag: TypeTag,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayTemplate {
    pub default: Option<Value>,
    /// `None` leaves elements unconstrained. Never carries a default.
    pub item: Option<Box<Template>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectTemplate {
    pub default: Option<Value>,
    /// Definition order; drives validation order.
    pub properties: Vec<PropertyTemplate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTemplate {
    pub name: String,
    pub required: bool,
    pub nullable: bool,
    pub template: Template,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTemplate {
    pub def: Arc<TypeDef>,
    /// Default declared where the type is used, e.g. `:user default {...}`.
    pub default: Option<Value>,
}

/// A user-defined type: a name bound to a compiled template.
#[derive(Debug, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub template: Template,
}

// ------------------------------ Type refs -------------------------------- //

/// What a type name resolves to. Instantiated once per directive.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Builtin(TypeTag),
    Defined(Arc<TypeDef>),
}

impl TypeRef {
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeRef::Builtin(tag) => *tag,
            TypeRef::Defined(def) => def.template.tag(),
        }
    }

    /// Build a template node for this type, carrying `default`.
    pub fn instantiate(&self, default: Option<Value>) -> Template {
        match self {
            TypeRef::Builtin(TypeTag::Array) => {
                Template::Array(ArrayTemplate { default, item: None })
            }
            TypeRef::Builtin(TypeTag::Object) => {
                Template::Object(ObjectTemplate { default, properties: Vec::new() })
            }
            TypeRef::Builtin(tag) => Template::Value(ValueTemplate { tag: *tag, default }),
            TypeRef::Defined(def) => {
                Template::Named(NamedTemplate { def: Arc::clone(def), default })
            }
        }
    }
}

/// Built-ins compare by tag, user types by identity.
impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Builtin(a), TypeRef::Builtin(b)) => a == b,
            (TypeRef::Defined(a), TypeRef::Defined(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ------------------------------ Accessors -------------------------------- //

impl Template {
    /// Base tag; user-defined types report the tag they resolve to.
    pub fn tag(&self) -> TypeTag {
        match self {
            Template::Value(t) => t.tag,
            Template::Array(_) => TypeTag::Array,
            Template::Object(_) => TypeTag::Object,
            Template::Named(t) => t.def.template.tag(),
        }
    }

    /// Effective default. A named type falls back to its definition's.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Template::Value(t) => t.default.as_ref(),
            Template::Array(t) => t.default.as_ref(),
            Template::Object(t) => t.default.as_ref(),
            Template::Named(t) => t.default.as_ref().or_else(|| t.def.template.default_value()),
        }
    }

    /// Default declared on this node only, ignoring a named type's definition.
    pub fn declared_default(&self) -> Option<&Value> {
        match self {
            Template::Value(t) => t.default.as_ref(),
            Template::Array(t) => t.default.as_ref(),
            Template::Object(t) => t.default.as_ref(),
            Template::Named(t) => t.default.as_ref(),
        }
    }

    pub(crate) fn set_default(&mut self, value: Value) {
        let slot = match self {
            Template::Value(t) => &mut t.default,
            Template::Array(t) => &mut t.default,
            Template::Object(t) => &mut t.default,
            Template::Named(t) => &mut t.default,
        };
        *slot = Some(value);
    }

    /// Name of the user type behind this node, if any.
    pub fn type_name(&self) -> &str {
        match self {
            Template::Named(t) => &t.def.name,
            other => other.tag().as_str(),
        }
    }
}

impl ObjectTemplate {
    pub fn property(&self, name: &str) -> Option<&PropertyTemplate> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Arc<TypeDef> {
        Arc::new(TypeDef {
            name: "person".into(),
            template: Template::Object(ObjectTemplate {
                default: Some(json!({"name": "anon"})),
                properties: Vec::new(),
            }),
        })
    }

    #[test]
    fn builtin_instantiation_picks_node_kind() {
        let arr = TypeRef::Builtin(TypeTag::Array).instantiate(None);
        assert!(matches!(arr, Template::Array(ArrayTemplate { item: None, .. })));
        let obj = TypeRef::Builtin(TypeTag::Object).instantiate(Some(json!({})));
        assert_eq!(obj.default_value(), Some(&json!({})));
        let int = TypeRef::Builtin(TypeTag::Int).instantiate(Some(json!(5)));
        assert_eq!(int.tag(), TypeTag::Int);
        assert_eq!(int.type_name(), "int");
    }

    #[test]
    fn named_defaults_fall_back_to_definition() {
        let def = person();
        let plain = TypeRef::Defined(Arc::clone(&def)).instantiate(None);
        assert_eq!(plain.tag(), TypeTag::Object);
        assert_eq!(plain.type_name(), "person");
        assert_eq!(plain.default_value(), Some(&json!({"name": "anon"})));

        assert_eq!(plain.declared_default(), None);

        let mut own = TypeRef::Defined(def).instantiate(None);
        own.set_default(json!({"name": "bob"}));
        assert_eq!(own.default_value(), Some(&json!({"name": "bob"})));
        assert_eq!(own.declared_default(), Some(&json!({"name": "bob"})));
    }

    #[test]
    fn type_refs_compare_by_identity() {
        let def = person();
        assert_eq!(TypeRef::Defined(Arc::clone(&def)), TypeRef::Defined(Arc::clone(&def)));
        assert_ne!(TypeRef::Defined(def), TypeRef::Defined(person()));
        assert_eq!(TypeRef::Builtin(TypeTag::Int), TypeRef::Builtin(TypeTag::Int));
    }
}
