use thiserror::Error;

use crate::types::OptionSource;

/// A failure while loading or validating the option catalog.
///
/// Schema validation is all-or-nothing: the first failure aborts the whole
/// load and no partially-validated schema is ever returned. The `at` field is
/// a ` -> `-joined path into the catalog (e.g. `log-level -> config`) so the
/// message names exactly which definition is malformed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{at}: missing mandatory keys: {}", .keys.join(", "))]
    MissingKeys { at: String, keys: Vec<String> },

    #[error("{at}: unrecognized keys: {}", .keys.join(", "))]
    ExtraKeys { at: String, keys: Vec<String> },

    #[error("{at}: type '{found}' is invalid, expecting one of bool, dict, list, path, str")]
    InvalidType { at: String, found: String },

    #[error("{at}: elements '{found}' is invalid, expecting one of bool, path, str")]
    InvalidElements { at: String, found: String },

    #[error("{at}: elements cannot be set when type is not list")]
    UnexpectedElements { at: String },

    #[error("{at}: list type requires an elements entry")]
    MissingElements { at: String },

    #[error("{at}: description is invalid: {reason}")]
    MalformedDescription { at: String, reason: String },

    #[error("{at}: {reason}")]
    MalformedEntry { at: String, reason: String },
}

/// A value that cannot be interpreted as its declared type.
///
/// Standalone so the per-token parser hook handed to an argument parser can
/// report it without dragging the rest of the error surface along.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {got}")]
pub struct CoercionError {
    pub expected: &'static str,
    pub got: String,
}

/// A runtime configuration failure. All of these are fatal at startup.
///
/// `UnknownOption` is a programming defect — code queried or set a name the
/// schema never declared. `NoValue` is the other half of that coin: the name
/// is declared, but nothing was recorded in any scanned source and the caller
/// supplied no default. The two are deliberately distinct so defect messages
/// cannot be mistaken for user input errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid value for option '{option}' from {origin}: {source}")]
    Coercion {
        option: String,
        origin: OptionSource,
        #[source]
        source: CoercionError,
    },

    #[error("unknown option '{0}': not declared in the schema")]
    UnknownOption(String),

    #[error("no value for option '{option}' in the requested sources")]
    NoValue { option: String },

    #[error("option '{option}': could not parse '{token}' as KEY=value")]
    MalformedKeyValue { option: String, token: String },

    #[error("a schema is required — call .schema() or .schema_toml() on the builder")]
    SchemaRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_formats_path_and_keys() {
        let err = SchemaError::MissingKeys {
            at: "log-level -> config".into(),
            keys: vec!["section".into(), "name".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("log-level -> config"));
        assert!(msg.contains("section, name"));
    }

    #[test]
    fn coercion_error_names_option_and_origin() {
        let err = ConfigError::Coercion {
            option: "execution-environment".into(),
            origin: OptionSource::Environment,
            source: CoercionError {
                expected: "a boolean",
                got: "\"maybe\"".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("execution-environment"));
        assert!(msg.contains("user provided environment variable"));
    }

    #[test]
    fn unknown_option_reads_as_a_defect() {
        let err = ConfigError::UnknownOption("log-levle".into());
        assert!(err.to_string().contains("not declared in the schema"));
    }

    #[test]
    fn no_value_is_distinct_from_unknown() {
        let unknown = ConfigError::UnknownOption("x".into()).to_string();
        let absent = ConfigError::NoValue { option: "x".into() }.to_string();
        assert_ne!(unknown, absent);
        assert!(absent.contains("no value"));
    }

    #[test]
    fn malformed_key_value_carries_token() {
        let err = ConfigError::MalformedKeyValue {
            option: "set-environment-variable".into(),
            token: "TERM".into(),
        };
        assert!(err.to_string().contains("'TERM'"));
    }
}
