//! Option catalog loading and validation.
//!
//! The catalog is data, not code: every option's type, defaults, settings
//! paths, environment names, and CLI projection are declared once in a TOML
//! document and validated strictly here, so a malformed catalog fails at
//! startup instead of surfacing as silent misconfiguration later.
//!
//! Validation is all-or-nothing. Unknown keys inside an option definition are
//! caught with `serde_ignored` during deserialization; the structural rules
//! (mandatory keys, the closed type set, the elements-iff-list rule, entry
//! shapes) are checked per definition afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::SchemaError;
use crate::types::{ElementType, OptionType, RawValue};

/// Where to look for an option inside the pre-parsed settings mapping:
/// descend by `sections`, then read `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub sections: Vec<String>,
    pub name: String,
}

/// Parser arity override, from the catalog's `cli_opts.nargs` (`"?"`, `"*"`,
/// `"+"`, or an integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    Optional,
    ZeroOrMore,
    OneOrMore,
    Exactly(usize),
}

/// One normalized option definition. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDefinition {
    pub name: String,
    pub kind: OptionType,
    /// Raw default, coerced when the store is seeded. `None` means no sane
    /// default exists and the option starts with no recorded value.
    pub default: Option<RawValue>,
    /// Closed set of allowed values, forwarded to the argument parser.
    pub choices: Option<Vec<String>>,
    pub config: Vec<ConfigPath>,
    pub env: Vec<String>,
    pub cli: Vec<String>,
    pub nargs: Option<Nargs>,
    /// Argument-parser destination: the option name lowercased with `-`
    /// replaced by `_`.
    pub dest: String,
    /// Human text, normalized to end with a period.
    pub description: String,
}

impl OptionDefinition {
    /// True when the option projects to a positional argument (no associated
    /// name carries a dash prefix).
    pub fn is_positional(&self) -> bool {
        !self.cli.is_empty() && self.cli.iter().all(|name| !name.starts_with('-'))
    }

    /// The key this option's parsed value lives under in a parsed-argument
    /// namespace: the positional name itself for positionals (the parser
    /// convention), the computed dest otherwise.
    pub(crate) fn namespace_key(&self) -> &str {
        if self.is_positional() {
            &self.cli[0]
        } else {
            &self.dest
        }
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self.kind, OptionType::List(_) | OptionType::Dict)
    }
}

/// The canonical, validated option catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    options: BTreeMap<String, OptionDefinition>,
}

impl Schema {
    /// Parse and validate a TOML option catalog.
    pub fn from_toml_str(doc: &str) -> Result<Self, SchemaError> {
        Self::from_toml_str_with_overrides(doc, &[])
    }

    /// Like [`from_toml_str`](Self::from_toml_str), with computed-default
    /// overrides applied before structural default filling. Overrides exist
    /// for options whose default cannot be expressed in the catalog (an
    /// editor command derived from `EDITOR`, a cache directory). Later
    /// entries for the same name take precedence.
    pub fn from_toml_str_with_overrides(
        doc: &str,
        overrides: &[(String, RawValue)],
    ) -> Result<Self, SchemaError> {
        let mut ignored: Vec<String> = Vec::new();
        let deserializer = toml::Deserializer::new(doc);
        let raw: BTreeMap<String, RawOption> =
            serde_ignored::deserialize(deserializer, |path| ignored.push(path.to_string()))?;

        if let Some(err) = extra_keys_error(&ignored) {
            return Err(err);
        }

        let mut options = BTreeMap::new();
        for (name, entry) in raw {
            let definition = normalize_option(&name, entry, overrides)?;
            options.insert(name, definition);
        }
        Ok(Schema { options })
    }

    pub fn get(&self, name: &str) -> Option<&OptionDefinition> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Definitions in deterministic (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDefinition> {
        self.options.values()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Re-apply computed-default overrides to an already-loaded schema.
    /// Names that match no option are ignored.
    pub fn with_default_overrides(mut self, overrides: &[(String, RawValue)]) -> Self {
        for (name, value) in overrides {
            if let Some(def) = self.options.get_mut(name) {
                def.default = Some(value.clone());
            }
        }
        self
    }
}

/// Raw catalog entry as deserialized, before validation. Everything optional;
/// loose `toml::Value` shapes are validated by hand so each failure maps to
/// its own [`SchemaError`] kind.
#[derive(Debug, Deserialize)]
struct RawOption {
    description: Option<toml::Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    elements: Option<String>,
    default: Option<toml::Value>,
    choices: Option<toml::Value>,
    config: Option<toml::Value>,
    env: Option<toml::Value>,
    cli: Option<toml::Value>,
    cli_opts: Option<toml::Value>,
}

/// Group `serde_ignored` paths (`"option.key"`) by option and report the
/// first offending definition.
fn extra_keys_error(ignored: &[String]) -> Option<SchemaError> {
    let mut by_option: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for path in ignored {
        let (option, key) = path.split_once('.').unwrap_or((path.as_str(), ""));
        by_option.entry(option).or_default().insert(key);
    }
    let (option, keys) = by_option.into_iter().next()?;
    Some(SchemaError::ExtraKeys {
        at: option.to_string(),
        keys: keys.into_iter().map(str::to_string).collect(),
    })
}

fn normalize_option(
    name: &str,
    raw: RawOption,
    overrides: &[(String, RawValue)],
) -> Result<OptionDefinition, SchemaError> {
    let description = match raw.description {
        Some(value) => normalize_text(&value).map_err(|reason| {
            SchemaError::MalformedDescription {
                at: name.to_string(),
                reason,
            }
        })?,
        None => {
            return Err(SchemaError::MissingKeys {
                at: name.to_string(),
                keys: vec!["description".to_string()],
            });
        }
    };

    let kind = normalize_kind(name, raw.kind.as_deref(), raw.elements.as_deref())?;

    // Computed override first, then the declared default, then the structural
    // fill: containers start empty, scalars start absent.
    let override_default = overrides
        .iter()
        .rev()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone());
    let default = override_default
        .or_else(|| raw.default.as_ref().map(toml_to_raw))
        .or_else(|| match kind {
            OptionType::List(_) => Some(RawValue::Array(Vec::new())),
            OptionType::Dict => Some(RawValue::Object(serde_json::Map::new())),
            _ => None,
        });

    let choices = match raw.choices {
        Some(value) => Some(to_string_list(&value, &format!("{name} -> choices"))?),
        None => None,
    };

    let config = normalize_config_entries(name, raw.config)?;
    let env = normalize_named_entries(name, raw.env, "env")?;
    let cli = normalize_named_entries(name, raw.cli, "cli")?;
    let nargs = normalize_cli_opts(name, raw.cli_opts)?;

    Ok(OptionDefinition {
        name: name.to_string(),
        kind,
        default,
        choices,
        config,
        env,
        cli,
        nargs,
        dest: name.to_lowercase().replace('-', "_"),
        description,
    })
}

fn normalize_kind(
    name: &str,
    kind: Option<&str>,
    elements: Option<&str>,
) -> Result<OptionType, SchemaError> {
    // An option that declares no type is a plain string.
    let kind = kind.unwrap_or("str");

    if kind != "list" && elements.is_some() {
        return Err(SchemaError::UnexpectedElements {
            at: name.to_string(),
        });
    }

    match kind {
        "bool" => Ok(OptionType::Bool),
        "path" => Ok(OptionType::Path),
        "str" => Ok(OptionType::Str),
        "dict" => Ok(OptionType::Dict),
        "list" => {
            let elements = elements.ok_or_else(|| SchemaError::MissingElements {
                at: name.to_string(),
            })?;
            let element_type = match elements {
                "bool" => ElementType::Bool,
                "path" => ElementType::Path,
                "str" => ElementType::Str,
                other => {
                    return Err(SchemaError::InvalidElements {
                        at: name.to_string(),
                        found: other.to_string(),
                    });
                }
            };
            Ok(OptionType::List(element_type))
        }
        other => Err(SchemaError::InvalidType {
            at: name.to_string(),
            found: other.to_string(),
        }),
    }
}

/// Normalize human text: a string, or a list of strings joined with `". "`,
/// trimmed and terminated with a period.
fn normalize_text(value: &toml::Value) -> Result<String, String> {
    let joined = match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => {
            let mut lines = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    toml::Value::String(s) => lines.push(s.as_str()),
                    _ => return Err("value is not a string or list of strings".to_string()),
                }
            }
            lines.join(". ")
        }
        _ => return Err("value is not a string or list of strings".to_string()),
    };

    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return Err("required value is not set".to_string());
    }
    if trimmed.ends_with('.') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}."))
    }
}

/// Normalize to a list of strings: scalars are wrapped and stringified.
fn to_string_list(value: &toml::Value, at: &str) -> Result<Vec<String>, SchemaError> {
    let items = match value {
        toml::Value::Array(items) => items.clone(),
        scalar => vec![scalar.clone()],
    };
    items
        .iter()
        .map(|item| scalar_to_string(item, at))
        .collect()
}

fn scalar_to_string(value: &toml::Value, at: &str) -> Result<String, SchemaError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        _ => Err(SchemaError::MalformedEntry {
            at: at.to_string(),
            reason: "entry is not a scalar".to_string(),
        }),
    }
}

fn normalize_config_entries(
    name: &str,
    value: Option<toml::Value>,
) -> Result<Vec<ConfigPath>, SchemaError> {
    let at = format!("{name} -> config");
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let toml::Value::Array(entries) = value else {
        return Err(SchemaError::MalformedEntry {
            at,
            reason: "def is not a list".to_string(),
        });
    };

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let table = entry_table(&entry, &at)?;
        check_keys(&table, &["section", "name"], &[], &at)?;
        let sections = to_string_list(&table["section"], &at)?;
        let key_name = scalar_to_string(&table["name"], &at)?;
        out.push(ConfigPath {
            sections,
            name: key_name,
        });
    }
    Ok(out)
}

/// `env` and `cli` entries share the same shape: a list of `{ name = ... }`.
fn normalize_named_entries(
    name: &str,
    value: Option<toml::Value>,
    label: &str,
) -> Result<Vec<String>, SchemaError> {
    let at = format!("{name} -> {label}");
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let toml::Value::Array(entries) = value else {
        return Err(SchemaError::MalformedEntry {
            at,
            reason: "def is not a list".to_string(),
        });
    };

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let table = entry_table(&entry, &at)?;
        check_keys(&table, &["name"], &[], &at)?;
        out.push(scalar_to_string(&table["name"], &at)?);
    }
    Ok(out)
}

fn normalize_cli_opts(
    name: &str,
    value: Option<toml::Value>,
) -> Result<Option<Nargs>, SchemaError> {
    let at = format!("{name} -> cli_opts");
    let Some(value) = value else {
        return Ok(None);
    };
    let table = entry_table(&value, &at)?;
    check_keys(&table, &[], &["nargs"], &at)?;

    match table.get("nargs") {
        None => Ok(None),
        Some(toml::Value::String(s)) => match s.as_str() {
            "?" => Ok(Some(Nargs::Optional)),
            "*" => Ok(Some(Nargs::ZeroOrMore)),
            "+" => Ok(Some(Nargs::OneOrMore)),
            other => Err(SchemaError::MalformedEntry {
                at,
                reason: format!("nargs '{other}' is invalid, expecting ?, *, + or an integer"),
            }),
        },
        Some(toml::Value::Integer(n)) if *n >= 0 => Ok(Some(Nargs::Exactly(*n as usize))),
        Some(other) => Err(SchemaError::MalformedEntry {
            at,
            reason: format!("nargs '{other}' is invalid, expecting ?, *, + or an integer"),
        }),
    }
}

fn entry_table(value: &toml::Value, at: &str) -> Result<toml::Table, SchemaError> {
    match value {
        toml::Value::Table(table) => Ok(table.clone()),
        _ => Err(SchemaError::MalformedEntry {
            at: at.to_string(),
            reason: "def is not a dict".to_string(),
        }),
    }
}

/// Enforce a mandatory/optional key set on an entry table.
fn check_keys(
    table: &toml::Table,
    mandatory: &[&str],
    optional: &[&str],
    at: &str,
) -> Result<(), SchemaError> {
    let missing: Vec<String> = mandatory
        .iter()
        .filter(|key| !table.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingKeys {
            at: at.to_string(),
            keys: missing,
        });
    }

    let extra: Vec<String> = table
        .keys()
        .filter(|key| !mandatory.contains(&key.as_str()) && !optional.contains(&key.as_str()))
        .cloned()
        .collect();
    if !extra.is_empty() {
        return Err(SchemaError::ExtraKeys {
            at: at.to_string(),
            keys: extra,
        });
    }
    Ok(())
}

fn toml_to_raw(value: &toml::Value) -> RawValue {
    serde_json::to_value(value).unwrap_or(RawValue::Null)
}
