//! Value classification and the extended type test.
//!
//! `int` refines `number` and `char` refines `string`. `any` is not a
//! runtime kind; templates special-case it via [`TypeTag::accepts`].
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

// ------------------------------- Kinds ----------------------------------- //

/// Runtime kind of a decoded JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Null,
    Array,
    Object,
    Number,
    String,
    Boolean,
}

/// Type names understood without a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Number,
    String,
    Char,
    Boolean,
    Null,
    Array,
    Object,
    Any,
}

impl TypeTag {
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Int,
        TypeTag::Number,
        TypeTag::String,
        TypeTag::Char,
        TypeTag::Boolean,
        TypeTag::Null,
        TypeTag::Array,
        TypeTag::Object,
        TypeTag::Any,
    ];

    /// Built-in lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Char => "char",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Any => "any",
        }
    }

    /// [`type_test`] plus the `any` wildcard.
    pub fn accepts(self, value: &Value) -> bool {
        self == TypeTag::Any || type_test(value, self)
    }
}

impl From<BaseType> for TypeTag {
    fn from(base: BaseType) -> Self {
        match base {
            BaseType::Null => TypeTag::Null,
            BaseType::Array => TypeTag::Array,
            BaseType::Object => TypeTag::Object,
            BaseType::Number => TypeTag::Number,
            BaseType::String => TypeTag::String,
            BaseType::Boolean => TypeTag::Boolean,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ----------------------------- Type test ---------------------------------- //

/// Optional sign followed by digits only.
static INTEGER_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// Magnitude from which floats are written in exponent form.
const EXPONENT_FROM: f64 = 1e21;

pub fn type_of(value: &Value) -> BaseType {
    match value {
        Value::Null => BaseType::Null,
        Value::Bool(_) => BaseType::Boolean,
        Value::Number(_) => BaseType::Number,
        Value::String(_) => BaseType::String,
        Value::Array(_) => BaseType::Array,
        Value::Object(_) => BaseType::Object,
    }
}

/// Whether the decimal rendering of `n` has no fraction and no exponent.
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| INTEGER_TEXT.is_match(&decimal_text(f)))
}

/// Plain positional digits below 1e21 (`1e16` → `10000000000000000`,
/// `3.0` → `3`), exponent form above.
fn decimal_text(f: f64) -> String {
    if f.abs() < EXPONENT_FROM { format!("{f}") } else { format!("{f:e}") }
}

/// Extended type test. Never true for [`TypeTag::Any`].
pub fn type_test(value: &Value, declared: TypeTag) -> bool {
    if TypeTag::from(type_of(value)) == declared {
        return true;
    }
    match (value, declared) {
        (Value::Number(n), TypeTag::Int) => is_integer(n),
        (Value::String(s), TypeTag::Char) => s.chars().count() == 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_of_each_kind() {
        assert_eq!(type_of(&json!(1)), BaseType::Number);
        assert_eq!(type_of(&json!(false)), BaseType::Boolean);
        assert_eq!(type_of(&json!([])), BaseType::Array);
        assert_eq!(type_of(&json!({})), BaseType::Object);
        assert_eq!(type_of(&json!("abc")), BaseType::String);
        assert_eq!(type_of(&json!(null)), BaseType::Null);
    }

    #[test]
    fn int_refines_number() {
        for n in [json!(0), json!(1), json!(-10), json!(u64::MAX), json!(i64::MIN), json!(3.0)] {
            assert!(type_test(&n, TypeTag::Int), "{n} should be int");
            assert!(type_test(&n, TypeTag::Number));
        }
        for n in [json!(1e16), json!(-1e16), json!(1e20), json!(123456789012345680000.0)] {
            assert!(type_test(&n, TypeTag::Int), "{n} should be int");
            assert!(type_test(&n, TypeTag::Number));
        }
        for x in [json!(1.1), json!(-1.5), json!(0.5), json!(1e-9), json!(1e21), json!(1e300)] {
            assert!(!type_test(&x, TypeTag::Int), "{x} should not be int");
            assert!(type_test(&x, TypeTag::Number));
        }
        assert!(!type_test(&json!("1"), TypeTag::Int));
    }

    #[test]
    fn decoded_large_floats_are_int() {
        for text in ["1e16", "1e20", "123456789012345680000", "-2.5e17"] {
            let n: Value = serde_json::from_str(text).unwrap();
            assert!(type_test(&n, TypeTag::Int), "{text} should be int");
        }
        let n: Value = serde_json::from_str("1e21").unwrap();
        assert!(!type_test(&n, TypeTag::Int));
        assert_eq!(decimal_text(1e16), "10000000000000000");
    }

    #[test]
    fn char_refines_string() {
        assert!(type_test(&json!("a"), TypeTag::Char));
        assert!(type_test(&json!("é"), TypeTag::Char));
        assert!(!type_test(&json!(""), TypeTag::Char));
        assert!(!type_test(&json!("10"), TypeTag::Char));
        assert!(!type_test(&json!(1), TypeTag::Char));
        assert!(type_test(&json!("10"), TypeTag::String));
    }

    #[test]
    fn any_is_left_to_templates() {
        assert!(!type_test(&json!(1), TypeTag::Any));
        for v in [json!(null), json!(1), json!("s"), json!([]), json!({}), json!(true)] {
            assert!(TypeTag::Any.accepts(&v));
        }
    }

    #[test]
    fn builtin_names() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_name(tag.as_str()), Some(tag));
        }
        assert_eq!(TypeTag::from_name("Integer"), None);
        assert_eq!(TypeTag::from_name("array<string>"), None);
    }
}
