//! Pure value coercion: raw input to typed [`Value`], exhaustively matched
//! over the declared [`OptionType`].
//!
//! Coercion is idempotent: feeding a coerced value back through
//! [`Value::to_raw`] and coercing again is a no-op. Path coercion expands
//! home and environment references and absolutizes lexically — it never
//! touches the filesystem (existence is someone else's problem).

use std::path::{Component, Path, PathBuf};

use crate::error::CoercionError;
use crate::types::{ElementType, OptionType, RawValue, Value};

/// Coerce a raw value to the declared option type.
pub fn coerce(raw: &RawValue, kind: OptionType) -> Result<Value, CoercionError> {
    match kind {
        OptionType::Bool => coerce_bool(raw).map(Value::Bool),
        OptionType::Path => coerce_path(raw).map(Value::Path),
        OptionType::Str => coerce_str(raw).map(Value::Str),
        OptionType::List(elements) => coerce_list(raw, elements).map(Value::List),
        OptionType::Dict => coerce_dict(raw),
    }
}

fn coerce_bool(raw: &RawValue) -> Result<bool, CoercionError> {
    const EXPECTED: &str = "a boolean (yes/true/t/y/1 or no/false/f/n/0)";
    match raw {
        RawValue::Bool(b) => Ok(*b),
        RawValue::String(s) => match s.to_lowercase().as_str() {
            "yes" | "true" | "t" | "y" | "1" => Ok(true),
            "no" | "false" | "f" | "n" | "0" => Ok(false),
            _ => Err(CoercionError {
                expected: EXPECTED,
                got: describe(raw),
            }),
        },
        _ => Err(CoercionError {
            expected: EXPECTED,
            got: describe(raw),
        }),
    }
}

fn coerce_path(raw: &RawValue) -> Result<PathBuf, CoercionError> {
    match raw {
        RawValue::String(s) => Ok(expand_path(s)),
        _ => Err(CoercionError {
            expected: "a path string",
            got: describe(raw),
        }),
    }
}

fn coerce_str(raw: &RawValue) -> Result<String, CoercionError> {
    match raw {
        RawValue::String(s) => Ok(s.clone()),
        RawValue::Bool(b) => Ok(b.to_string()),
        RawValue::Number(n) => Ok(n.to_string()),
        _ => Err(CoercionError {
            expected: "a string-like scalar",
            got: describe(raw),
        }),
    }
}

/// A non-list raw value is wrapped into a single-element list before element
/// coercion, so `inventory: /tmp/hosts` and `inventory: [/tmp/hosts]` read
/// the same.
fn coerce_list(raw: &RawValue, elements: ElementType) -> Result<Vec<Value>, CoercionError> {
    match raw {
        RawValue::Array(items) => items.iter().map(|v| coerce_element(v, elements)).collect(),
        scalar => Ok(vec![coerce_element(scalar, elements)?]),
    }
}

fn coerce_element(raw: &RawValue, elements: ElementType) -> Result<Value, CoercionError> {
    match elements {
        ElementType::Bool => coerce_bool(raw).map(Value::Bool),
        ElementType::Path => coerce_path(raw).map(Value::Path),
        ElementType::Str => coerce_str(raw).map(Value::Str),
    }
}

fn coerce_dict(raw: &RawValue) -> Result<Value, CoercionError> {
    const EXPECTED: &str = "a mapping of scalar values";
    let RawValue::Object(map) = raw else {
        return Err(CoercionError {
            expected: EXPECTED,
            got: describe(raw),
        });
    };

    let mut out = std::collections::BTreeMap::new();
    for (key, value) in map {
        let coerced = coerce_str(value).map_err(|_| CoercionError {
            expected: EXPECTED,
            got: format!("{} under key '{key}'", describe(value)),
        })?;
        out.insert(key.clone(), coerced);
    }
    Ok(Value::Dict(out))
}

/// Short description of a raw value for error messages.
fn describe(raw: &RawValue) -> String {
    match raw {
        RawValue::Null => "null".to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Number(n) => n.to_string(),
        RawValue::String(s) => format!("\"{s}\""),
        RawValue::Array(_) => "a list".to_string(),
        RawValue::Object(_) => "a mapping".to_string(),
    }
}

/// Expand environment references and a leading `~`, then absolutize against
/// the working directory and normalize `.`/`..` segments lexically.
pub fn expand_path(input: &str) -> PathBuf {
    let expanded = expand_vars_with(input, |name| std::env::var(name).ok());
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    let expanded = expand_user_with(&expanded, home.as_deref());

    let path = PathBuf::from(expanded);
    let absolute = if path.is_absolute() {
        path
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path,
        }
    };
    normalize(&absolute)
}

/// Replace `$NAME` and `${NAME}` references using `lookup`. Unresolvable
/// references are left literal, matching the usual shell-adjacent behavior.
fn expand_vars_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        if let Some(inner) = after.strip_prefix('{') {
            if let Some(end) = inner.find('}') {
                let name = &inner[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[dollar..dollar + name.len() + 3]),
                }
                rest = &inner[end + 1..];
                continue;
            }
        } else {
            let name_len = after
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(after.len());
            if name_len > 0 {
                let name = &after[..name_len];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[dollar..dollar + name_len + 1]),
                }
                rest = &after[name_len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Replace a leading `~` with the home directory, when one is known.
fn expand_user_with(input: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return input.to_string();
    };
    if input == "~" {
        return home.to_string_lossy().into_owned();
    }
    match input.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => input.to_string(),
    }
}

/// Lexical normalization: drop `.` segments, resolve `..` against the parent.
/// A `..` above the root is dropped, as absolutization conventionally does.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
