//! CLI schema projection and parsed-argument ingestion.
//!
//! The argument-parser surface is derived from the same catalog that drives
//! resolution, so the two can never drift apart. [`ArgSpec`] is the
//! framework-agnostic spec record an external parser consumes; [`Namespace`]
//! is the typed record of what that parser produced, fed back through
//! ingestion into the per-option stores under the CLI source.
//!
//! "Not supplied" is an explicit [`ArgValue::Unset`] marker. List- and
//! dict-typed options get a list-wrapped marker as their parser default so
//! absence stays detectable even through repeated-flag accumulation; flatten
//! drops every marker, and an option that yielded nothing real is skipped,
//! leaving the other sources authoritative.

use std::collections::BTreeMap;

use crate::coerce;
use crate::error::{CoercionError, ConfigError};
use crate::schema::{Nargs, OptionDefinition};
use crate::types::{OptionType, RawValue, Value};

/// Per-token conversion hook for scalar-typed options. List and dict options
/// take raw tokens and coerce after parsing instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenParser {
    Bool,
    Path,
    Str,
}

impl TokenParser {
    pub fn parse(&self, token: &str) -> Result<Value, CoercionError> {
        let raw = RawValue::String(token.to_string());
        let kind = match self {
            TokenParser::Bool => OptionType::Bool,
            TokenParser::Path => OptionType::Path,
            TokenParser::Str => OptionType::Str,
        };
        coerce::coerce(&raw, kind)
    }
}

/// A value slot in a parsed-argument namespace.
///
/// Repeated-flag accumulation produces nested lists (`--flag a b --flag c`
/// becomes a list of two lists); [`flatten`](Self::flatten) collapses the
/// nesting and drops every [`Unset`](Self::Unset) marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// The parser default: this argument never appeared on the command line.
    Unset,
    Scalar(Value),
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn flatten(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Value>) {
        match self {
            ArgValue::Unset => {}
            ArgValue::Scalar(value) => out.push(value.clone()),
            ArgValue::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

/// The typed parsed-argument record: namespace key (an option's dest, or the
/// positional name for positionals) to the value the parser produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    entries: BTreeMap<String, ArgValue>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.get(key)
    }
}

/// An argument-parser specification derived from one option definition.
/// Consumed by an external CLI-parsing collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// Flag names (`--log-level`, `-i`) or a positional name.
    pub names: Vec<String>,
    pub help: String,
    /// Parser destination. `None` when every name is positional — the
    /// positional name is the destination by parser convention.
    pub dest: Option<String>,
    /// What the parser should record when the argument never appears.
    pub default: ArgValue,
    pub nargs: Option<Nargs>,
    /// Accumulate repeated flags into nested lists.
    pub append: bool,
    /// Per-token conversion hook for scalar-typed options.
    pub parser: Option<TokenParser>,
    pub choices: Option<Vec<String>>,
}

/// Derive the argument spec for one option.
pub(crate) fn project(def: &OptionDefinition) -> ArgSpec {
    let container = def.is_container();

    let default = if container {
        ArgValue::List(vec![ArgValue::Unset])
    } else {
        ArgValue::Unset
    };

    // A catalog nargs override takes the arity as given; container options
    // without one accumulate repeated flags, one-or-more tokens each.
    let (nargs, append) = match def.nargs {
        Some(nargs) => (Some(nargs), false),
        None if container => (Some(Nargs::OneOrMore), true),
        None => (None, false),
    };

    let parser = match def.kind {
        OptionType::Bool => Some(TokenParser::Bool),
        OptionType::Path => Some(TokenParser::Path),
        OptionType::Str => Some(TokenParser::Str),
        OptionType::List(_) | OptionType::Dict => None,
    };

    let dest = if def.is_positional() {
        None
    } else {
        Some(def.dest.clone())
    };

    ArgSpec {
        names: def.cli.clone(),
        help: def.description.clone(),
        dest,
        default,
        nargs,
        append,
        parser,
        choices: def.choices.clone(),
    }
}

/// Fold one option's namespace entry into a raw value ready for recording
/// under the CLI source. `Ok(None)` means nothing real was supplied and the
/// option should be skipped.
pub(crate) fn ingest_option(
    def: &OptionDefinition,
    entry: Option<&ArgValue>,
) -> Result<Option<RawValue>, ConfigError> {
    let entry = match entry {
        Some(entry) => entry,
        None => return Ok(None),
    };

    match entry {
        ArgValue::Unset => Ok(None),
        ArgValue::Scalar(value) => Ok(Some(value.to_raw())),
        ArgValue::List(_) => {
            let tokens = entry.flatten();
            if tokens.is_empty() {
                return Ok(None);
            }
            if def.kind == OptionType::Dict {
                return parse_key_values(def, &tokens).map(Some);
            }
            // A scalar option behind an arity override still yields one value.
            if !def.is_container() && tokens.len() == 1 {
                return Ok(Some(tokens[0].to_raw()));
            }
            Ok(Some(RawValue::Array(
                tokens.iter().map(Value::to_raw).collect(),
            )))
        }
    }
}

/// Re-parse `KEY=value` tokens into a mapping. Splitting happens on the
/// first `=`, so values may themselves contain the separator.
fn parse_key_values(def: &OptionDefinition, tokens: &[Value]) -> Result<RawValue, ConfigError> {
    let mut out = serde_json::Map::new();
    for token in tokens {
        let pair = token.as_str().and_then(|s| s.split_once('='));
        match pair {
            Some((key, value)) => {
                out.insert(key.to_string(), RawValue::String(value.to_string()));
            }
            None => {
                return Err(ConfigError::MalformedKeyValue {
                    option: def.name.clone(),
                    token: token.to_string(),
                });
            }
        }
    }
    Ok(RawValue::Object(out))
}
