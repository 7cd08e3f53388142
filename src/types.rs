use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A raw, uncoerced value as it arrives from a source: a schema default, a
/// subtree of the pre-parsed settings mapping, an environment variable, or an
/// explicit runtime override. Settings files are parsed externally (YAML,
/// JSON, ...); the engine only ever sees this neutral representation.
pub type RawValue = serde_json::Value;

/// The declared type of an option. Coercion is an exhaustive match over this
/// set; adding a type is a compile-time exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Path,
    Str,
    /// A homogeneous list. The element type is part of the declaration, so a
    /// list option without one cannot be represented.
    List(ElementType),
    Dict,
}

/// Element type for list options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Bool,
    Path,
    Str,
}

impl OptionType {
    /// The catalog spelling of this type.
    pub fn name(&self) -> &'static str {
        match self {
            OptionType::Bool => "bool",
            OptionType::Path => "path",
            OptionType::Str => "str",
            OptionType::List(_) => "list",
            OptionType::Dict => "dict",
        }
    }
}

impl ElementType {
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Path => "path",
            ElementType::Str => "str",
        }
    }
}

/// A coerced option value. Absence is modeled by the *lack* of a value (a
/// missing store entry, [`ArgValue::Unset`](crate::ArgValue)), never by a
/// reserved in-band value — so "unset" can never collide with a real empty
/// string or empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
    Dict(BTreeMap<String, String>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Embed this value back into the raw representation. Coercing the result
    /// with the value's own type is a no-op, which is what makes re-recording
    /// an already-coerced value safe.
    pub fn to_raw(&self) -> RawValue {
        match self {
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Str(s) => RawValue::String(s.clone()),
            Value::Path(p) => RawValue::String(p.to_string_lossy().into_owned()),
            Value::List(items) => RawValue::Array(items.iter().map(Value::to_raw).collect()),
            Value::Dict(map) => RawValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), RawValue::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Dict(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

/// Where an option's effective value came from.
///
/// Distinct from [`SettingsSource`], which records where the settings *file*
/// itself was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionSource {
    NotFound,
    Default,
    UserConfig,
    Environment,
    Cli,
    Explicit,
}

impl fmt::Display for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            OptionSource::NotFound => "value was not defined in any source",
            OptionSource::Default => "default configuration value",
            OptionSource::UserConfig => "user provided configuration file",
            OptionSource::Environment => "user provided environment variable",
            OptionSource::Cli => "user provided cli argument",
            OptionSource::Explicit => "explicit value set at runtime",
        };
        write!(f, "{desc}")
    }
}

/// Where the settings file itself was found. Recorded on the resolver for
/// diagnostics; never used for per-option precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSource {
    #[default]
    NotFound,
    EnvironmentVariable,
    WellKnownLocation,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            SettingsSource::NotFound => "no settings file found",
            SettingsSource::EnvironmentVariable => "environment variable",
            SettingsSource::WellKnownLocation => "well known folder location",
        };
        write!(f, "{desc}")
    }
}

/// The default precedence order, highest priority first: an explicit runtime
/// override beats a CLI argument beats an environment variable beats the
/// settings file beats the compiled default.
pub const DEFAULT_PRECEDENCE: [OptionSource; 5] = [
    OptionSource::Explicit,
    OptionSource::Cli,
    OptionSource::Environment,
    OptionSource::UserConfig,
    OptionSource::Default,
];
