//! Named type registry.
//!
//! A [`Namespace`] maps type names to [`TypeRef`]s. User names shadow the
//! built-ins, so `string` itself can be redefined. Namespaces are plain
//! values: build one, optionally import from another, and pass it by
//! reference to [`Namespace::parse_template`].
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParseError;
use crate::template::{parse_template, Template, TypeDef, TypeRef};
use crate::traits::TypeTag;

#[derive(Debug, Clone, Default)]
pub struct Namespace {
    names: IndexMap<String, TypeRef>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// New namespace holding `names` (all names when `None`) of `parent`.
    pub fn import(parent: &Namespace, names: Option<&[&str]>) -> Result<Self, ParseError> {
        let mut ns = Self::new();
        ns.import_from(parent, names)?;
        Ok(ns)
    }

    /// Copy user-defined names from `other`. Built-ins are never imported.
    ///
    /// With an explicit list every name is checked before anything is
    /// copied; the first unknown one is reported.
    pub fn import_from(&mut self, other: &Namespace, names: Option<&[&str]>) -> Result<&mut Self, ParseError> {
        match names {
            None => {
                for (name, type_ref) in &other.names {
                    self.names.insert(name.clone(), type_ref.clone());
                }
            }
            Some(names) => {
                let picked = names
                    .iter()
                    .map(|name| match other.names.get(*name) {
                        Some(type_ref) => Ok((name.to_string(), type_ref.clone())),
                        None => Err(ParseError::BadImport { name: name.to_string() }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.names.extend(picked);
            }
        }
        tracing::debug!(count = self.names.len(), "imported type names");
        Ok(self)
    }

    /// Make `alias` another name for the existing type `name`.
    pub fn define_alias(&mut self, alias: &str, name: &str) -> Result<&mut Self, ParseError> {
        let type_ref = self.resolve(name).ok_or_else(|| ParseError::BadAlias {
            alias: alias.to_string(),
            name: name.to_string(),
        })?;
        tracing::debug!(alias, name, "defined type alias");
        self.names.insert(alias.to_string(), type_ref);
        Ok(self)
    }

    /// Compile `definition` against this namespace and register it as `name`.
    pub fn define_type(&mut self, name: &str, definition: &Value) -> Result<&mut Self, ParseError> {
        let template = self.parse_template(definition)?;
        Ok(self.define_template(name, template))
    }

    /// Register an already compiled template as `name`.
    pub fn define_template(&mut self, name: &str, template: Template) -> &mut Self {
        tracing::debug!(name, tag = %template.tag(), "defined type");
        let def = TypeDef { name: name.to_string(), template };
        self.names.insert(name.to_string(), TypeRef::Defined(Arc::new(def)));
        self
    }

    /// Drop a user-defined name. Removing an unknown name is a no-op.
    pub fn remove(&mut self, name: &str) {
        if self.names.shift_remove(name).is_some() {
            tracing::debug!(name, "removed type");
        }
    }

    /// User-defined names first, then the built-ins.
    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        self.names
            .get(name)
            .cloned()
            .or_else(|| TypeTag::from_name(name).map(TypeRef::Builtin))
    }

    pub fn parse_template(&self, definition: &Value) -> Result<Template, ParseError> {
        parse_template(definition, Some(self))
    }

    /// User-defined names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}
