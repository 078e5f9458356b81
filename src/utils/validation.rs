use crate::utils::error::{FieldError, FieldErrorKind, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub type FieldResult<T> = std::result::Result<T, FieldError>;

pub fn validate_path(field_name: &str, path: &str) -> FieldResult<()> {
    if path.is_empty() {
        return Err(FieldError::invalid(field_name, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(FieldError::invalid(field_name, "Path contains null bytes"));
    }

    Ok(())
}

/// 檔名本身不可含路徑分隔符
pub fn validate_file_name(field_name: &str, name: &str) -> FieldResult<()> {
    validate_path(field_name, name)?;

    if name.contains('/') || name.contains('\\') {
        return Err(FieldError::invalid(
            field_name,
            format!("'{}' must be a file name, not a path", name),
        ));
    }
    Ok(())
}

pub fn validate_file_extension(
    field_name: &str,
    file: &str,
    allowed_extensions: &[&str],
) -> FieldResult<()> {
    let extension = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        return Ok(());
    }

    Err(FieldError::invalid(
        field_name,
        format!(
            "Unsupported file extension '{}' for {}. Allowed extensions: {}",
            extension,
            file,
            allowed_extensions.join(", ")
        ),
    ))
}

pub fn validate_required<'a, T>(field_name: &str, value: &'a Option<T>) -> FieldResult<&'a T> {
    value.as_ref().ok_or_else(|| FieldError::missing(field_name))
}

pub fn validate_max_length(field_name: &str, value: &str, max_chars: usize) -> FieldResult<()> {
    let length = value.chars().count();
    if length > max_chars {
        return Err(FieldError::invalid(
            field_name,
            format!("Value is {} characters long, at most {} allowed", length, max_chars),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> FieldResult<()> {
    // NaN 與任何值比較皆為 false，需以否定形式判斷
    if !(value >= min && value <= max) {
        return Err(FieldError::new(
            field_name,
            FieldErrorKind::OutOfRange {
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            },
        ));
    }
    Ok(())
}

/// Range check that excludes zero: the value must lie in `(0, max]`.
pub fn validate_positive(field_name: &str, value: f64, max: f64) -> FieldResult<()> {
    if !(value > 0.0 && value <= max) {
        return Err(FieldError::new(
            field_name,
            FieldErrorKind::OutOfRange {
                value: value.to_string(),
                min: "0 (exclusive)".to_string(),
                max: max.to_string(),
            },
        ));
    }
    Ok(())
}
