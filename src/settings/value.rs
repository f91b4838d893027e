use std::fmt;

use thiserror::Error;

/// Type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Float,
    Bool,
    String,
    /// List of strings.
    List,
}

/// A raw value that does not fit the requested [`ValueType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{value}` is not a valid {expected}")]
pub struct CoerceError {
    pub value: String,
    pub expected: ValueType,
}

/// Value of a setting.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<String>),
}

const TRUE_LITERALS: [&str; 3] = ["true", "yes", "1"];
const FALSE_LITERALS: [&str; 3] = ["false", "no", "0"];

/// Parse a boolean literal, ignoring ASCII case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if TRUE_LITERALS.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE_LITERALS.iter().any(|f| raw.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

impl ValueType {
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Int => "integer",
            ValueType::Float => "float",
            ValueType::Bool => "boolean",
            ValueType::String => "string",
            ValueType::List => "list",
        }
    }

    /// Convert `raw` text into a [`Value`] of this type.
    ///
    /// * integers are base-10 `i64`, with an optional sign;
    /// * floats use the standard decimal notation;
    /// * booleans are `true`/`false`, `yes`/`no` or `1`/`0`, in any case;
    /// * strings are kept verbatim;
    /// * lists are comma separated, with items trimmed and empty items dropped.
    pub fn coerce(self, raw: &str) -> Result<Value, CoerceError> {
        let error = || CoerceError {
            value: raw.to_owned(),
            expected: self,
        };
        match self {
            ValueType::Int => raw.trim().parse().map(Value::Int).map_err(|_| error()),
            ValueType::Float => raw.trim().parse().map(Value::Float).map_err(|_| error()),
            ValueType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(error),
            ValueType::String => Ok(Value::String(raw.to_owned())),
            ValueType::List => Ok(Value::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_owned)
                    .collect(),
            )),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// Text form, as stored in a config file. [`ValueType::coerce`] reads it back.
    ///
    /// List items containing a comma cannot be represented.
    pub fn to_raw(&self) -> String {
        match self {
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format!("{value:?}"),
            Value::Bool(value) => value.to_string(),
            Value::String(value) => value.clone(),
            Value::List(items) => items.join(","),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

/// Literal form: strings are quoted, booleans are `True`/`False`, floats always have a
/// fractional part, and lists are bracketed.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::String(value) => write_quoted(f, value),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

/// Rust types that a setting can be read into.
pub trait SettingValue: Sized + Into<Value> {
    const TYPE: ValueType;

    /// Extract `Self` from `value`, [`None`] if it has another type.
    fn from_value(value: Value) -> Option<Self>;
}

impl SettingValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl SettingValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn from_value(value: Value) -> Option<Self> {
        value.as_float()
    }
}

impl SettingValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl SettingValue for String {
    const TYPE: ValueType = ValueType::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl SettingValue for Vec<String> {
    const TYPE: ValueType = ValueType::List;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_err, assert_none, assert_ok};

    #[test]
    fn integers() {
        assert_eq!(assert_ok!(ValueType::Int.coerce("28")), Value::Int(28));
        assert_eq!(assert_ok!(ValueType::Int.coerce(" -7 ")), Value::Int(-7));
        for bad in ["abc", "1.5", "0x10", ""] {
            let err = assert_err!(ValueType::Int.coerce(bad));
            assert_eq!(err.expected, ValueType::Int);
            assert_eq!(err.value, bad);
        }
    }

    #[test]
    fn floats() {
        assert_eq!(assert_ok!(ValueType::Float.coerce("1.5")), Value::Float(1.5));
        assert_eq!(assert_ok!(ValueType::Float.coerce("2")), Value::Float(2.0));
        assert_err!(ValueType::Float.coerce("one and a half"));
    }

    #[test]
    fn booleans() {
        for raw in ["true", "TRUE", "Yes", "1"] {
            assert_eq!(assert_ok!(ValueType::Bool.coerce(raw)), Value::Bool(true));
        }
        for raw in ["false", "False", "NO", "0"] {
            assert_eq!(assert_ok!(ValueType::Bool.coerce(raw)), Value::Bool(false));
        }
        assert_err!(ValueType::Bool.coerce("maybe"));
        assert_none!(parse_bool("2"));
    }

    #[test]
    fn strings_and_lists() {
        assert_eq!(
            assert_ok!(ValueType::String.coerce("  kept as is ")),
            Value::String("  kept as is ".into())
        );
        assert_eq!(
            assert_ok!(ValueType::List.coerce("a, b,,c ")),
            Value::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(assert_ok!(ValueType::List.coerce("")), Value::List(vec![]));
    }

    #[test]
    fn literal_display() {
        assert_eq!(Value::from("try this").to_string(), "'try this'");
        assert_eq!(Value::from("it's").to_string(), r"'it\'s'");
        assert_eq!(Value::List(vec![]).to_string(), "[]");
        assert_eq!(Value::List(vec!["a".into(), "b".into()]).to_string(), "['a', 'b']");
        assert_eq!(Value::from(28).to_string(), "28");
        assert_eq!(Value::from(false).to_string(), "False");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(1.0).to_string(), "1.0");
    }

    #[test]
    fn raw_form_reads_back() {
        let values = [
            Value::from(-3),
            Value::from(0.25),
            Value::from(true),
            Value::from("x = y"),
            Value::List(vec!["a".into(), "b".into()]),
        ];
        for value in values {
            let back = assert_ok!(value.value_type().coerce(&value.to_raw()));
            assert_eq!(back, value);
        }
    }

    #[test]
    fn typed_extraction() {
        assert_eq!(i64::from_value(Value::Int(3)), Some(3));
        assert_eq!(bool::from_value(Value::Int(3)), None);
        assert_eq!(String::from_value(Value::from("s")), Some("s".to_owned()));
    }
}
