//! Per-option value bookkeeping: one candidate value per source.
//!
//! Each option gets one [`OptionState`], seeded at construction in a fixed
//! order — Default unconditionally, then the settings mapping, then the
//! environment — and updated later by CLI ingestion and explicit overrides.
//! Seeding takes the environment as plain `(name, value)` pairs so tests can
//! pass synthetic data instead of `std::env::vars()`.

use std::collections::BTreeMap;

use crate::coerce;
use crate::error::ConfigError;
use crate::schema::{ConfigPath, OptionDefinition};
use crate::types::{OptionSource, RawValue, Value};

/// The recorded candidate values for a single option, keyed by source.
/// At most one value per source; re-recording overwrites.
#[derive(Debug, Clone, Default)]
pub(crate) struct OptionState {
    values: BTreeMap<OptionSource, Value>,
}

impl OptionState {
    /// Seed from the definition's default, the pre-parsed settings mapping,
    /// and the environment, in that order.
    ///
    /// Every `config` entry is attempted; when several match, the last one
    /// wins. Environment names are scanned in order and the first present
    /// name wins, short-circuiting the rest. Lookups that simply miss are
    /// not errors; a value that cannot be coerced is.
    pub fn seed(
        def: &OptionDefinition,
        settings: Option<&RawValue>,
        env_vars: &[(String, String)],
        notes: &mut Vec<String>,
    ) -> Result<Self, ConfigError> {
        let mut state = OptionState::default();

        if let Some(default) = &def.default {
            state.record(def, default, OptionSource::Default)?;
        }

        if let Some(settings) = settings {
            for path in &def.config {
                if let Some(found) = descend(settings, path, &def.name, notes) {
                    state.record(def, found, OptionSource::UserConfig)?;
                }
            }
        }

        for name in &def.env {
            if let Some((_, value)) = env_vars.iter().find(|(key, _)| key == name) {
                let raw = RawValue::String(value.clone());
                state.record(def, &raw, OptionSource::Environment)?;
                break;
            }
        }

        Ok(state)
    }

    /// The first source in `order` with a recorded value.
    pub fn lookup(&self, order: &[OptionSource]) -> Option<(OptionSource, &Value)> {
        order
            .iter()
            .find_map(|source| self.values.get(source).map(|value| (*source, value)))
    }

    /// Coerce `raw` to the option's declared type and record it under
    /// `source`, overwriting any prior value for that source.
    pub fn record(
        &mut self,
        def: &OptionDefinition,
        raw: &RawValue,
        source: OptionSource,
    ) -> Result<(), ConfigError> {
        let value = coerce::coerce(raw, def.kind).map_err(|err| ConfigError::Coercion {
            option: def.name.clone(),
            origin: source,
            source: err,
        })?;
        self.values.insert(source, value);
        Ok(())
    }
}

/// Walk the settings mapping by section path, then read the key. A missing
/// segment contributes nothing; a non-mapping intermediate additionally
/// leaves a note, since it usually means a malformed settings file.
fn descend<'a>(
    settings: &'a RawValue,
    path: &ConfigPath,
    option: &str,
    notes: &mut Vec<String>,
) -> Option<&'a RawValue> {
    let mut current = settings;
    for segment in path.sections.iter().chain(std::iter::once(&path.name)) {
        match current {
            RawValue::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return None,
            },
            _ => {
                notes.push(format!(
                    "settings entry '{segment}' for option '{option}' is not a mapping, ignoring"
                ));
                return None;
            }
        }
    }
    Some(current)
}
