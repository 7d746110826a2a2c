//! Template × value → value.
//!
//! Fail-fast: the first mismatch aborts the walk. With `apply_defaults` the
//! declared defaults are written into the value being validated; the
//! template itself is never touched.
use serde_json::Value;

use super::{PropertyTemplate, Template};
use crate::error::{ContextPath, ValidationError};
use crate::traits::TypeTag;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Replace absent values by their template's default.
    pub apply_defaults: bool,
}

impl ValidateOptions {
    pub fn apply_defaults() -> Self {
        Self { apply_defaults: true }
    }
}

impl Template {
    /// Validate a possibly absent value.
    ///
    /// `None` stands for a missing value. With `apply_defaults` it yields the
    /// declared default (itself possibly `None`) without a type check;
    /// otherwise it is a type error.
    pub fn validate(&self, value: Option<Value>, options: ValidateOptions) -> Result<Option<Value>, ValidationError> {
        tracing::trace!(tag = %self.tag(), present = value.is_some(), ?options, "validating value");
        Walk::new(options).check(self, value)
    }

    /// Validate a value that is known to be present.
    pub fn validate_value(&self, value: Value, options: ValidateOptions) -> Result<Value, ValidationError> {
        tracing::trace!(tag = %self.tag(), ?options, "validating value");
        Walk::new(options).check_present(self, value)
    }
}

/// State of one validation call.
struct Walk {
    apply_defaults: bool,
    context: Vec<String>,
}

impl Walk {
    fn new(options: ValidateOptions) -> Self {
        Self { apply_defaults: options.apply_defaults, context: Vec::new() }
    }

    fn check(&mut self, template: &Template, value: Option<Value>) -> Result<Option<Value>, ValidationError> {
        match value {
            None if self.apply_defaults => Ok(template.default_value().cloned()),
            None => Err(self.mismatch(template.tag(), None)),
            Some(value) => self.check_present(template, value).map(Some),
        }
    }

    fn check_present(&mut self, template: &Template, value: Value) -> Result<Value, ValidationError> {
        if !template.tag().accepts(&value) {
            return Err(self.mismatch(template.tag(), Some(&value)));
        }
        match (template, value) {
            (Template::Named(t), value) => self.check_present(&t.def.template, value),
            (Template::Array(t), Value::Array(mut items)) => {
                if let Some(item) = &t.item {
                    for (index, slot) in items.iter_mut().enumerate() {
                        self.context.push(index.to_string());
                        *slot = self.check_present(item, std::mem::take(slot))?;
                        self.context.pop();
                    }
                }
                Ok(Value::Array(items))
            }
            (Template::Object(t), Value::Object(mut map)) => {
                for prop in &t.properties {
                    self.context.push(prop.name.clone());
                    match map.get_mut(&prop.name) {
                        Some(slot) => {
                            *slot = self.check_property(prop, std::mem::take(slot))?;
                        }
                        None => {
                            if let Some(default) = self.absent_property(prop)? {
                                map.insert(prop.name.clone(), default);
                            }
                        }
                    }
                    self.context.pop();
                }
                Ok(Value::Object(map))
            }
            (_, value) => Ok(value),
        }
    }

    fn check_property(&mut self, prop: &PropertyTemplate, value: Value) -> Result<Value, ValidationError> {
        if value.is_null() {
            // an explicit null is a value, never replaced by a default
            return if prop.nullable { Ok(Value::Null) } else { Err(ValidationError::NotNullable { path: self.path() }) };
        }
        self.check_present(&prop.template, value)
    }

    fn absent_property(&mut self, prop: &PropertyTemplate) -> Result<Option<Value>, ValidationError> {
        if prop.required || !prop.nullable {
            return Err(ValidationError::Missing { path: self.path() });
        }
        if self.apply_defaults {
            Ok(prop.template.default_value().cloned())
        } else {
            Ok(None)
        }
    }

    fn mismatch(&self, expected: TypeTag, found: Option<&Value>) -> ValidationError {
        let found = match found {
            Some(value) => value.to_string(),
            None => "nothing".to_string(),
        };
        ValidationError::Mismatch { path: self.path(), expected, found }
    }

    fn path(&self) -> ContextPath {
        ContextPath(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::template::parse_template;
    use serde_json::json;

    fn template(definition: Value) -> Template {
        parse_template(&definition, None).unwrap()
    }

    fn check(t: &Template, value: Value) -> Result<Value, ValidationError> {
        t.validate_value(value, ValidateOptions::default())
    }

    fn fill(t: &Template, value: Value) -> Result<Value, ValidationError> {
        t.validate_value(value, ValidateOptions::apply_defaults())
    }

    #[test]
    fn int_with_default() {
        let t = template(json!(":int default 5"));
        assert!(check(&t, json!(10)).is_ok());
        assert!(check(&t, json!(-10)).is_ok());
        assert_eq!(t.validate(None, ValidateOptions::apply_defaults()).unwrap(), Some(json!(5)));
        for bad in [json!(null), json!(1.5), json!(-1.5), json!({}), json!([1]), json!(false), json!("1")] {
            let err = check(&t, bad.clone()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Type, "{bad}");
        }
    }

    #[test]
    fn absent_without_defaults_is_a_type_error() {
        let t = template(json!(":int default 5"));
        let err = t.validate(None, ValidateOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "(root): expects int but got nothing");
    }

    #[test]
    fn absent_without_declared_default_stays_absent() {
        let t = template(json!(":string"));
        assert_eq!(t.validate(None, ValidateOptions::apply_defaults()).unwrap(), None);
    }

    #[test]
    fn char_and_object_directives() {
        let t = template(json!(r#":char default "N""#));
        assert!(check(&t, json!("Y")).is_ok());
        assert!(check(&t, json!("ABC")).is_err());
        assert!(check(&t, json!(0)).is_err());

        let t = template(json!(r#":object default {"name": "anna"}"#));
        assert!(check(&t, json!({})).is_ok());
        assert!(check(&t, json!([1])).is_err());
        assert_eq!(t.validate(None, ValidateOptions::apply_defaults()).unwrap(), Some(json!({"name": "anna"})));
    }

    #[test]
    fn constants_fix_only_the_default() {
        let t = template(json!(5));
        assert_eq!(check(&t, json!(7.25)).unwrap(), json!(7.25));
        assert!(check(&t, json!("5")).is_err());
    }

    #[test]
    fn arrays_check_every_item() {
        let t = template(json!([":string"]));
        assert_eq!(check(&t, json!(["a", "b"])).unwrap(), json!(["a", "b"]));
        assert_eq!(check(&t, json!([])).unwrap(), json!([]));
        let err = check(&t, json!(["a", 2])).unwrap_err();
        assert_eq!(err.to_string(), "1: expects string but got 2");
        assert!(check(&t, json!({})).is_err());
        assert!(check(&t, json!("abc")).is_err());
    }

    #[test]
    fn any_accepts_everything() {
        let t = template(json!({"any": ":any default 1"}));
        assert_eq!(fill(&t, json!({})).unwrap(), json!({"any": 1}));
        assert_eq!(check(&t, json!({})).unwrap(), json!({}));
        assert!(check(&t, json!({"any": "abc"})).is_ok());
        assert!(check(&t, json!({"any": [1, {"x": null}]})).is_ok());

        let t = template(json!({"any": r#":any default {"val": 1}"#}));
        assert_eq!(fill(&t, json!({})).unwrap()["any"]["val"], json!(1));
    }

    #[test]
    fn required_rejects_absence_and_null() {
        let t = template(json!({"id required": ":int"}));
        let err = check(&t, json!({})).unwrap_err();
        assert_eq!(err, ValidationError::Missing { path: ContextPath(vec!["id".into()]) });
        let err = check(&t, json!({"id": null})).unwrap_err();
        assert!(matches!(err, ValidationError::NotNullable { .. }));
        assert!(err.path().contains("id"));
    }

    #[test]
    fn required_nullable_accepts_null_only() {
        let t = template(json!({"id required nullable": ":int"}));
        assert!(check(&t, json!({})).is_err());
        assert_eq!(check(&t, json!({"id": null})).unwrap(), json!({"id": null}));
    }

    #[test]
    fn explicit_null_is_never_defaulted() {
        let t = template(json!({"n default 3": ":int"}));
        assert_eq!(fill(&t, json!({"n": null})).unwrap(), json!({"n": null}));
        assert_eq!(fill(&t, json!({})).unwrap(), json!({"n": 3}));
    }

    #[test]
    fn object_property_errors() {
        let t = template(json!({"name": "anna", "id required": ":int", "fid required": [":int"]}));
        assert!(check(&t, json!({"name": "jack", "id": 5, "fid": [1, 3]})).is_ok());
        let err = check(&t, json!({"name": "jack", "id": 5, "fid": 1})).unwrap_err();
        assert_eq!(err.to_string(), "fid: expects array but got 1");
        let err = check(&t, json!({"name": "jack", "id": 5, "fid": [1, 1.5]})).unwrap_err();
        assert_eq!(err.to_string(), "fid.1: expects int but got 1.5");
    }

    #[test]
    fn extra_keys_pass_through() {
        let t = template(json!({"a": 1}));
        assert_eq!(fill(&t, json!({"z": true})).unwrap(), json!({"z": true, "a": 1}));
    }

    #[test]
    fn defaults_only_fill_absent_fields() {
        let t = template(json!({"a": 1, "b": {"c": "x"}}));
        let full = json!({"a": 2, "b": {"c": "y"}});
        assert_eq!(fill(&t, full.clone()).unwrap(), full);
    }

    #[test]
    fn nested_array_objects() {
        let t = template(json!({
            "o1": {"o2": {"o3": {"a31": [":int"], "a32": [{"n": 1, "s": "1"}]}}}
        }));
        let filled = fill(&t, json!({
            "o1": {"o2": {"o3": {"a31": [1, 2, 3], "a32": [{}, {"n": 2}, {"n": 3, "s": "3"}]}}}
        }))
        .unwrap();
        assert_eq!(filled, json!({
            "o1": {"o2": {"o3": {
                "a31": [1, 2, 3],
                "a32": [{"n": 1, "s": "1"}, {"n": 2, "s": "1"}, {"n": 3, "s": "3"}]
            }}}
        }));
    }
}
