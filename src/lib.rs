//! Runtime JSON templates.
//!
//! A template is written as JSON: `":int default 5"`, `[":string"]`,
//! `{"id required": ":int", "tags default []": [":string"]}`. It compiles
//! into a [`Template`] tree that checks values and can fill in declared
//! defaults for missing data.
//!
//! ```
//! use json_template::{create_template, ValidateOptions};
//! use serde_json::json;
//!
//! let t = create_template(&json!({"list default [1,2,3]": [":int"]})).unwrap();
//! let filled = t.validate_value(json!({}), ValidateOptions::apply_defaults()).unwrap();
//! assert_eq!(filled, json!({"list": [1, 2, 3]}));
//! ```
pub mod cli;
pub mod error;
pub mod namespace;
pub mod path_de;
pub mod template;
pub mod token;
pub mod traits;

use anyhow::{anyhow, Context};
use serde_json::Value;

pub use error::{ContextPath, ErrorKind, ParseError, ValidationError};
pub use namespace::Namespace;
pub use template::{parse_template, Template, TypeRef, ValidateOptions};
pub use traits::{type_test, TypeTag};

/// Compile a definition against the built-in types only.
pub fn create_template(definition: &Value) -> Result<Template, ParseError> {
    parse_template(definition, None)
}

/// Decode `source` as JSON, then compile it like [`create_template`].
pub fn create_template_from_json(source: &str) -> anyhow::Result<Template> {
    let definition: Value = path_de::from_str_with_path(source).map_err(|e| anyhow!(e))?;
    create_template(&definition).context("invalid template definition")
}
