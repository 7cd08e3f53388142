use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::resolver::Resolver;
use crate::schema::Schema;
use crate::store::OptionState;
use crate::types::{RawValue, SettingsSource};

/// Builder for constructing a seeded [`Resolver`].
///
/// Construction is the only place seeding happens: defaults, the settings
/// mapping, and the environment are consumed here, sequentially, with no
/// I/O beyond reading process environment variables — and even those can be
/// replaced with synthetic pairs for tests.
pub struct ResolverBuilder {
    schema: Option<Schema>,
    schema_toml: Option<String>,
    default_overrides: Vec<(String, RawValue)>,
    settings: Option<RawValue>,
    settings_source: SettingsSource,
    settings_path: Option<PathBuf>,
    env_vars: Option<Vec<(String, String)>>,
}

impl ResolverBuilder {
    pub(crate) fn new() -> Self {
        Self {
            schema: None,
            schema_toml: None,
            default_overrides: Vec::new(),
            settings: None,
            settings_source: SettingsSource::NotFound,
            settings_path: None,
            env_vars: None,
        }
    }

    /// Use an already-validated schema.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Parse and validate a TOML option catalog at build time. When both
    /// this and [`schema`](Self::schema) are set, the prebuilt schema wins.
    pub fn schema_toml(mut self, doc: &str) -> Self {
        self.schema_toml = Some(doc.to_string());
        self
    }

    /// Override an option's default with a value computed at load time (an
    /// editor command derived from `EDITOR`, a cache directory). Later calls
    /// for the same name take precedence.
    pub fn default_override(mut self, name: &str, value: RawValue) -> Self {
        self.default_overrides.push((name.to_string(), value));
        self
    }

    /// The pre-parsed settings-file mapping. Parsing the file (YAML, JSON,
    /// ...) is the caller's job; a missing file simply means this is never
    /// called.
    pub fn settings(mut self, mapping: RawValue) -> Self {
        self.settings = Some(mapping);
        self
    }

    /// Record where the settings file was found, for diagnostics.
    pub fn settings_source(mut self, source: SettingsSource) -> Self {
        self.settings_source = source;
        self
    }

    pub fn settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Replace the process environment with synthetic pairs. If not called,
    /// `std::env::vars()` is collected once at build time.
    pub fn env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Load the schema if needed, then seed every option's value store.
    pub fn build(self) -> Result<Resolver, ConfigError> {
        let schema = match (self.schema, self.schema_toml) {
            (Some(schema), _) => schema.with_default_overrides(&self.default_overrides),
            (None, Some(doc)) => {
                Schema::from_toml_str_with_overrides(&doc, &self.default_overrides)?
            }
            (None, None) => return Err(ConfigError::SchemaRequired),
        };

        let env_vars = self
            .env_vars
            .unwrap_or_else(|| std::env::vars().collect());

        let mut notes = Vec::new();
        match (self.settings_source, &self.settings_path) {
            (SettingsSource::NotFound, _) => {
                notes.push("no valid settings file found, using all default values".to_string());
            }
            (source, Some(path)) => {
                notes.push(format!("using settings file at {} ({source})", path.display()));
            }
            (source, None) => {
                notes.push(format!("using settings file ({source})"));
            }
        }

        let mut values = BTreeMap::new();
        for def in schema.iter() {
            let state = OptionState::seed(def, self.settings.as_ref(), &env_vars, &mut notes)?;
            values.insert(def.name.clone(), state);
        }

        Ok(Resolver::from_parts(
            schema,
            values,
            self.settings_source,
            self.settings_path,
            notes,
        ))
    }
}
