use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// One record of the `/users/` collection as the table shows it.
///
/// Decoding is tolerant: display fields keep whatever JSON value the backend
/// sent, and flags only count as set when they are literally `true`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Field,
    #[serde(default)]
    pub name: Field,
    #[serde(default)]
    pub email: Field,
    #[serde(default, deserialize_with = "flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_admin: bool,
}

impl User {
    /// Cell texts in column order: id, name, email, active, admin.
    pub fn cells(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.name.to_string(),
            self.email.to_string(),
            yes_no(self.is_active).to_string(),
            yes_no(self.is_admin).to_string(),
        ]
    }
}

/// A display field that may be absent from the record.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Field {
    #[default]
    Missing,
    Present(Value),
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Field::Present)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Missing => f.write_str("undefined"),
            Field::Present(value) => write_value(f, value),
        }
    }
}

/// Writes a value the way a browser stringifies it inside a template literal.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(text) => f.write_str(text),
        Value::Number(number) => write_number(f, number),
        Value::Object(_) => f.write_str("[object Object]"),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                // Array elements that are null stringify to nothing.
                if !item.is_null() {
                    write_value(f, item)?;
                }
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) => write!(f, "{value}"),
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, number: &Number) -> fmt::Result {
    match number.as_f64() {
        // 1.0 prints as 1, and -0.0 as 0; past 1e21 browsers switch to exponents.
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e21 => {
            write!(f, "{}", float as i128)
        }
        _ => write!(f, "{number}"),
    }
}

impl From<&str> for Field {
    fn from(text: &str) -> Self {
        Field::Present(Value::String(text.to_string()))
    }
}

impl From<i64> for Field {
    fn from(number: i64) -> Self {
        Field::Present(Value::from(number))
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
