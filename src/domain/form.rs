//! Raw form input and the typed reader that turns it into validated values.

use crate::domain::enums::OptionSet;
use crate::utils::error::{FieldError, FieldErrorKind};
use crate::utils::validation::{self, FieldResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single value as delivered by a form widget or a saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FormValue {
    fn type_name(&self) -> &'static str {
        match self {
            FormValue::Bool(_) => "boolean",
            FormValue::Integer(_) => "integer",
            FormValue::Float(_) => "number",
            FormValue::Text(_) => "text",
        }
    }

    fn describe(&self) -> String {
        format!("{} {}", self.type_name(), self)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Integer(i) => Some(*i as f64),
            FormValue::Float(f) => Some(*f),
            FormValue::Text(s) => s.trim().parse::<f64>().ok(),
            FormValue::Bool(_) => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            FormValue::Integer(i) => Some(*i),
            FormValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            FormValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(b) => Some(*b),
            FormValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" => Some(true),
                "no" | "false" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, FormValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Bool(b) => write!(f, "{}", b),
            FormValue::Integer(i) => write!(f, "{}", i),
            FormValue::Float(x) => write!(f, "{}", x),
            FormValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Integer(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Float(value)
    }
}

/// Field name → raw value for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, FormValue>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FormValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FormValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn unset(&mut self, name: &str) -> Option<FormValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Blank text counts as unset, the way an emptied text box does.
    fn present(&self, name: &str) -> Option<&FormValue> {
        self.0.get(name).filter(|value| !value.is_blank())
    }
}

/// Reads typed values out of [`FormFields`], collecting every failure instead
/// of stopping at the first one.
///
/// Getters always return a value; on failure they record a [`FieldError`] and
/// hand back a placeholder so construction can continue. [`FieldReader::finish`]
/// then discards the record if anything was recorded.
pub struct FieldReader<'a> {
    prefix: String,
    fields: &'a FormFields,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(prefix: impl Into<String>, fields: &'a FormFields) -> Self {
        Self {
            prefix: prefix.into(),
            fields,
            errors: Vec::new(),
        }
    }

    pub fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    pub fn record(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Record the error of a follow-up check, if any.
    pub fn check(&mut self, result: FieldResult<()>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.fields.present(name).is_some()
    }

    fn mismatch(&mut self, name: &str, expected: &'static str, found: &FormValue) {
        let field = self.path(name);
        self.record(FieldError::new(
            field,
            FieldErrorKind::TypeMismatch {
                expected,
                found: found.describe(),
            },
        ));
    }

    pub fn required_text(&mut self, name: &str) -> String {
        match self.optional_text(name) {
            Some(text) => text,
            None => {
                if !self.has_error_for(name) {
                    let field = self.path(name);
                    self.record(FieldError::missing(field));
                }
                String::new()
            }
        }
    }

    pub fn optional_text(&mut self, name: &str) -> Option<String> {
        match self.fields.present(name)? {
            FormValue::Text(s) => Some(s.trim().to_string()),
            other => {
                let other = other.clone();
                self.mismatch(name, "text", &other);
                None
            }
        }
    }

    pub fn bool_or(&mut self, name: &str, default: bool) -> bool {
        let Some(value) = self.fields.present(name) else {
            return default;
        };
        match value.as_bool() {
            Some(b) => b,
            None => {
                let value = value.clone();
                self.mismatch(name, "boolean", &value);
                default
            }
        }
    }

    fn read_number(&mut self, name: &str) -> Option<f64> {
        let value = self.fields.present(name)?;
        match value.as_f64() {
            Some(number) if number.is_finite() => Some(number),
            Some(_) => {
                let field = self.path(name);
                self.record(FieldError::invalid(field, "Value must be a finite number"));
                None
            }
            None => {
                let value = value.clone();
                self.mismatch(name, "number", &value);
                None
            }
        }
    }

    pub fn number_or(&mut self, name: &str, default: f64, min: f64, max: f64) -> f64 {
        match self.read_number(name) {
            Some(number) => {
                let field = self.path(name);
                self.check(validation::validate_range(&field, number, min, max));
                number
            }
            None => default,
        }
    }

    /// Required number in `(0, max]`.
    pub fn positive_number(&mut self, name: &str, max: f64) -> f64 {
        let Some(number) = self.read_required(name, Self::read_number) else {
            return max;
        };
        let field = self.path(name);
        self.check(validation::validate_positive(&field, number, max));
        number
    }

    pub fn optional_positive_number(&mut self, name: &str, max: f64) -> Option<f64> {
        let number = self.read_number(name)?;
        let field = self.path(name);
        self.check(validation::validate_positive(&field, number, max));
        Some(number)
    }

    fn read_integer(&mut self, name: &str) -> Option<i64> {
        let value = self.fields.present(name)?;
        match value.as_i64() {
            Some(integer) => Some(integer),
            None => {
                let value = value.clone();
                self.mismatch(name, "integer", &value);
                None
            }
        }
    }

    pub fn integer_or(&mut self, name: &str, default: i64, min: i64, max: i64) -> i64 {
        match self.read_integer(name) {
            Some(integer) => {
                let field = self.path(name);
                self.check(validation::validate_range(&field, integer, min, max));
                integer
            }
            None => default,
        }
    }

    fn read_choice<E: OptionSet>(&mut self, name: &str) -> Option<E> {
        let value = self.fields.present(name)?.clone();
        let parsed = match &value {
            FormValue::Text(s) => E::parse_option(s),
            FormValue::Integer(i) => E::parse_option(&i.to_string()).or_else(|| E::from_numeric(*i)),
            // 7.0 在 TOML 中是浮點數；只有一位小數能精確還原時才以標籤比對
            FormValue::Float(f) => {
                let one_decimal = format!("{:.1}", f);
                if one_decimal.parse::<f64>().ok() == Some(*f) {
                    E::parse_option(&one_decimal)
                } else {
                    E::parse_option(&f.to_string())
                }
            }
            FormValue::Bool(_) => {
                self.mismatch(name, "option", &value);
                return None;
            }
        };

        if parsed.is_none() {
            let field = self.path(name);
            self.record(FieldError::new(
                field,
                FieldErrorKind::NotInDomain {
                    value: match &value {
                        FormValue::Text(s) => s.trim().to_string(),
                        other => other.to_string(),
                    },
                    allowed: E::allowed_labels(),
                },
            ));
        }
        parsed
    }

    pub fn choice<E: OptionSet>(&mut self, name: &str) -> E {
        self.read_required(name, Self::read_choice::<E>)
            .unwrap_or(E::ALL[0])
    }

    pub fn choice_or<E: OptionSet>(&mut self, name: &str, default: E) -> E {
        self.read_choice(name).unwrap_or(default)
    }

    pub fn optional_choice<E: OptionSet>(&mut self, name: &str) -> Option<E> {
        self.read_choice(name)
    }

    fn read_required<T>(
        &mut self,
        name: &str,
        read: impl FnOnce(&mut Self, &str) -> Option<T>,
    ) -> Option<T> {
        let present = self.is_present(name);
        let value = read(self, name);
        if !present {
            let field = self.path(name);
            self.record(FieldError::missing(field));
        }
        value
    }

    pub fn has_error_for(&self, name: &str) -> bool {
        let field = self.path(name);
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Hand back the record if no field failed, otherwise every recorded error.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
