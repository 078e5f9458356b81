//! Text helpers for values that end up inside FISH script lines.

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

static PROJECT_NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*fish\s+set\s+@project_name\s*=\s*['"]?(.*?)['"]?\s*$"#)
        .expect("project name pattern is valid")
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]+)>").expect("placeholder pattern is valid"));

/// Reduce free text to an identifier: alphanumerics kept, spaces and dashes
/// become underscores, everything else is dropped.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            ' ' | '-' | '_' => Some('_'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Make free text safe for a single-quoted FISH string.
///
/// Quotes and `;` (comment start) are removed, control characters become
/// spaces and whitespace runs collapse to a single space.
pub fn sanitize_text(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';'))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `<project>_<version>.f3dat`, falling back to `model` for names with no usable characters.
pub fn make_f3dat_filename(project_name: &str, version_tag: &str) -> String {
    let base = sanitize_identifier(project_name);
    let base = if base.is_empty() { "model".to_string() } else { base };
    format!("{}_{}.f3dat", base, version_tag)
}

/// 從既有的 .f3dat 內容讀回專案名稱
pub fn extract_project_name(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        PROJECT_NAME_LINE
            .captures(line.trim())
            .map(|caps| caps[1].trim().to_string())
    })
}

/// Replace `<token>` placeholders; unknown tokens stay untouched.
pub fn resolve_placeholders(template: &str, replacements: &BTreeMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            replacements
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Upload fields may hold a URL; only the last path segment, percent-decoded,
/// is the geometry file name.
pub fn file_name_from_location(location: &str) -> String {
    let trimmed = location.trim();

    if let Ok(url) = Url::parse(trimmed) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            if let Some(name) = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
            {
                return percent_decode_str(name).decode_utf8_lossy().into_owned();
            }
        }
    }

    Path::new(trimmed)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}
