//! The resolution engine: one explicitly constructed configuration instance,
//! built once at startup and passed to every consumer.
//!
//! All mutation — seeding, CLI ingestion, explicit overrides — happens
//! sequentially before the rest of the application reads anything, so the
//! resolver needs no locking. Reads go through [`Resolver::get`] and friends;
//! callers never touch the per-option stores directly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::args::{self, ArgSpec, Namespace};
use crate::error::ConfigError;
use crate::schema::Schema;
use crate::store::OptionState;
use crate::types::{DEFAULT_PRECEDENCE, OptionSource, RawValue, SettingsSource, Value};

/// Resolved configuration with provenance.
///
/// Construct with [`Resolver::builder`](crate::ResolverBuilder). Lookup
/// failures split in two: [`ConfigError::UnknownOption`] when the name was
/// never in the schema (a defect in the calling code), and
/// [`ConfigError::NoValue`] when the option exists but no scanned source
/// recorded a value.
#[derive(Debug)]
pub struct Resolver {
    schema: Schema,
    values: BTreeMap<String, OptionState>,
    settings_source: SettingsSource,
    settings_path: Option<PathBuf>,
    notes: Vec<String>,
}

impl Resolver {
    pub fn builder() -> crate::builder::ResolverBuilder {
        crate::builder::ResolverBuilder::new()
    }

    pub(crate) fn from_parts(
        schema: Schema,
        values: BTreeMap<String, OptionState>,
        settings_source: SettingsSource,
        settings_path: Option<PathBuf>,
        notes: Vec<String>,
    ) -> Self {
        Self {
            schema,
            values,
            settings_source,
            settings_path,
            notes,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Where the settings file was found, for diagnostics.
    pub fn settings_source(&self) -> SettingsSource {
        self.settings_source
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    /// Human-readable messages collected while seeding. This engine runs
    /// before logging is configured (the log level is one of its options),
    /// so diagnostics are queued here for the caller to flush later.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Resolve an option under the default precedence order.
    pub fn get(&self, name: &str) -> Result<Value, ConfigError> {
        self.get_from(name, &DEFAULT_PRECEDENCE).map(|(_, value)| value)
    }

    /// Resolve an option and report which source won.
    pub fn get_with_origin(&self, name: &str) -> Result<(OptionSource, Value), ConfigError> {
        self.get_from(name, &DEFAULT_PRECEDENCE)
    }

    /// Resolve an option scanning only `sources`, in the given order.
    pub fn get_from(
        &self,
        name: &str,
        sources: &[OptionSource],
    ) -> Result<(OptionSource, Value), ConfigError> {
        let state = self
            .values
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        match state.lookup(sources) {
            Some((source, value)) => Ok((source, value.clone())),
            None => Err(ConfigError::NoValue {
                option: name.to_string(),
            }),
        }
    }

    /// Resolve with a caller-supplied fallback. The fallback short-circuits
    /// both failure cases and is never validated against the option's type
    /// or choices.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get_or_with_origin(name, default).1
    }

    pub fn get_or_with_origin(&self, name: &str, default: Value) -> (OptionSource, Value) {
        match self.get_with_origin(name) {
            Ok(found) => found,
            Err(_) => (OptionSource::NotFound, default),
        }
    }

    /// Record an explicit override, which outranks every other source until
    /// overwritten again. Used for values the application computes itself,
    /// like derived cache directories.
    pub fn set(&mut self, name: &str, raw: RawValue) -> Result<(), ConfigError> {
        let def = self
            .schema
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        let state = self
            .values
            .get_mut(name)
            .expect("layerfig: every schema option has a value store");
        state.record(def, &raw, OptionSource::Explicit)
    }

    /// The argument-parser spec for one option.
    pub fn arg_spec(&self, name: &str) -> Result<ArgSpec, ConfigError> {
        let def = self
            .schema
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        Ok(args::project(def))
    }

    /// Specs for every option with a CLI projection, in name order.
    pub fn arg_specs(&self) -> impl Iterator<Item = ArgSpec> + '_ {
        self.schema
            .iter()
            .filter(|def| !def.cli.is_empty())
            .map(args::project)
    }

    /// Fold a parsed-argument namespace into the stores under the CLI
    /// source. Options the namespace left unset keep their prior sources;
    /// ingesting the same namespace twice is a no-op for the second pass.
    pub fn ingest(&mut self, namespace: &Namespace) -> Result<(), ConfigError> {
        let schema = &self.schema;
        let values = &mut self.values;
        for def in schema.iter() {
            let entry = namespace.get(def.namespace_key());
            if let Some(raw) = args::ingest_option(def, entry)? {
                let state = values
                    .get_mut(&def.name)
                    .expect("layerfig: every schema option has a value store");
                state.record(def, &raw, OptionSource::Cli)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgValue;
    use crate::fixtures::test::{resolver, resolver_with};
    use serde_json::json;

    #[test]
    fn default_values_resolve_with_default_origin() {
        let config = resolver();
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Default);
        assert_eq!(value, Value::Str("info".into()));
    }

    #[test]
    fn environment_beats_settings_and_default() {
        let settings = json!({"ansible-navigator": {"logging": {"level": "warning"}}});
        let config = resolver_with(settings, &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Environment);
        assert_eq!(value, Value::Str("debug".into()));
    }

    #[test]
    fn settings_value_beats_default() {
        let settings = json!({"ansible-navigator": {"logging": {"level": "error"}}});
        let config = resolver_with(settings, &[]);
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::UserConfig);
        assert_eq!(value, Value::Str("error".into()));
    }

    #[test]
    fn narrowed_sources_skip_higher_precedence() {
        let config = resolver_with(json!({}), &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        let (source, value) = config
            .get_from("log-level", &[OptionSource::Default])
            .unwrap();
        assert_eq!(source, OptionSource::Default);
        assert_eq!(value, Value::Str("info".into()));
    }

    #[test]
    fn unknown_option_is_a_distinct_failure() {
        let config = resolver();
        let err = config.get("log-levle").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(_)));
    }

    #[test]
    fn known_option_without_value_is_no_value() {
        let config = resolver();
        // playbook has no default and nothing else supplied one
        let err = config.get("playbook").unwrap_err();
        assert!(matches!(err, ConfigError::NoValue { .. }));
    }

    #[test]
    fn caller_default_short_circuits_both_failures() {
        let config = resolver();
        let (source, value) = config.get_or_with_origin("playbook", Value::Str("site.yml".into()));
        assert_eq!(source, OptionSource::NotFound);
        assert_eq!(value, Value::Str("site.yml".into()));

        let value = config.get_or("not-an-option", Value::Bool(true));
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn caller_default_is_never_validated() {
        let config = resolver();
        // A bool fallback for a path-typed option is returned untouched.
        let value = config.get_or("playbook", Value::Bool(false));
        assert_eq!(value, Value::Bool(false));
    }

    #[test]
    fn set_records_an_explicit_override() {
        let mut config = resolver_with(json!({}), &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        config.set("log-level", json!("critical")).unwrap();
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Explicit);
        assert_eq!(value, Value::Str("critical".into()));
    }

    #[test]
    fn set_coerces_to_the_declared_type() {
        let mut config = resolver();
        config.set("execution-environment", json!("no")).unwrap();
        assert_eq!(
            config.get("execution-environment").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn set_unknown_option_fails() {
        let mut config = resolver();
        let err = config.set("no-such-option", json!(1)).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(_)));
    }

    #[test]
    fn explicit_wins_over_cli() {
        let mut config = resolver();
        let mut ns = Namespace::new();
        ns.insert("log_level", ArgValue::Scalar(Value::Str("warning".into())));
        config.ingest(&ns).unwrap();
        config.set("log-level", json!("error")).unwrap();
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Explicit);
        assert_eq!(value, Value::Str("error".into()));
    }

    #[test]
    fn cli_wins_over_environment() {
        let mut config = resolver_with(json!({}), &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        let mut ns = Namespace::new();
        ns.insert("log_level", ArgValue::Scalar(Value::Str("warning".into())));
        config.ingest(&ns).unwrap();
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Cli);
        assert_eq!(value, Value::Str("warning".into()));
    }

    #[test]
    fn unset_namespace_entries_leave_other_sources_authoritative() {
        let mut config = resolver_with(json!({}), &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        let mut ns = Namespace::new();
        ns.insert("log_level", ArgValue::Unset);
        ns.insert("inventory", ArgValue::List(vec![ArgValue::Unset]));
        config.ingest(&ns).unwrap();
        let (source, _) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Environment);
    }

    #[test]
    fn ingest_is_idempotent() {
        let mut config = resolver();
        let mut ns = Namespace::new();
        ns.insert(
            "pass_environment_variable",
            ArgValue::List(vec![
                ArgValue::Unset,
                ArgValue::List(vec![ArgValue::Scalar(Value::Str("TERM".into()))]),
            ]),
        );
        config.ingest(&ns).unwrap();
        let first = config.get("pass-environment-variable").unwrap();
        config.ingest(&ns).unwrap();
        let second = config.get("pass-environment-variable").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Value::List(vec![Value::Str("TERM".into())]));
    }

    #[test]
    fn ingest_builds_dict_from_key_value_tokens() {
        let mut config = resolver();
        let mut ns = Namespace::new();
        ns.insert(
            "set_environment_variable",
            ArgValue::List(vec![ArgValue::List(vec![
                ArgValue::Scalar(Value::Str("A=1".into())),
                ArgValue::Scalar(Value::Str("B=2".into())),
            ])]),
        );
        config.ingest(&ns).unwrap();
        let value = config.get("set-environment-variable").unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict["A"], "1");
        assert_eq!(dict["B"], "2");
    }

    #[test]
    fn ingest_reports_malformed_key_value_token() {
        let mut config = resolver();
        let mut ns = Namespace::new();
        ns.insert(
            "set_environment_variable",
            ArgValue::List(vec![ArgValue::Scalar(Value::Str("TERM".into()))]),
        );
        let err = config.ingest(&ns).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedKeyValue { token, .. } if token == "TERM"));
    }

    #[test]
    fn positional_options_ingest_under_their_own_name() {
        let mut config = resolver();
        let mut ns = Namespace::new();
        ns.insert("playbook", ArgValue::Scalar(Value::Path("/site.yml".into())));
        config.ingest(&ns).unwrap();
        let (source, value) = config.get_with_origin("playbook").unwrap();
        assert_eq!(source, OptionSource::Cli);
        assert_eq!(value.as_path().unwrap(), Path::new("/site.yml"));
    }

    #[test]
    fn spec_round_trip_matches_direct_coercion() {
        let mut config = resolver();
        let spec = config.arg_spec("log-file").unwrap();
        let parser = spec.parser.unwrap();

        let mut ns = Namespace::new();
        ns.insert(
            spec.dest.clone().unwrap(),
            ArgValue::Scalar(parser.parse("/var/log/app.log").unwrap()),
        );
        config.ingest(&ns).unwrap();

        let expected = crate::coerce::coerce(
            &json!("/var/log/app.log"),
            crate::types::OptionType::Path,
        )
        .unwrap();
        assert_eq!(config.get("log-file").unwrap(), expected);
    }

    #[test]
    fn arg_specs_cover_only_cli_options() {
        let config = resolver();
        let specs: Vec<ArgSpec> = config.arg_specs().collect();
        assert!(specs.iter().all(|spec| !spec.names.is_empty()));
        // cache-dir has no CLI projection
        assert!(specs.iter().all(|spec| !spec.names.contains(&"--cache-dir".to_string())));
    }

    #[test]
    fn arg_spec_unknown_option_fails() {
        let config = resolver();
        assert!(matches!(
            config.arg_spec("nope"),
            Err(ConfigError::UnknownOption(_))
        ));
    }

    #[test]
    fn resolved_types_match_declarations() {
        let mut config = resolver();
        config.set("cache-dir", json!("~/.cache/navigator")).unwrap();
        assert!(config.get("log-level").unwrap().as_str().is_some());
        assert!(config.get("execution-environment").unwrap().as_bool().is_some());
        assert!(config.get("cache-dir").unwrap().as_path().is_some());
        assert!(config.get("inventory-columns").unwrap().as_list().is_some());
        assert!(config.get("set-environment-variable").unwrap().as_dict().is_some());
    }

    #[test]
    fn end_to_end_environment_origin() {
        // Schema declares log-level with default "info" and one env name;
        // with the variable set and no CLI flag, the environment wins.
        let config = resolver_with(json!({}), &[("ANSIBLE_NAVIGATOR_LOG_LEVEL", "debug")]);
        let (source, value) = config.get_with_origin("log-level").unwrap();
        assert_eq!(source, OptionSource::Environment);
        assert_eq!(value, Value::Str("debug".into()));
    }
}
