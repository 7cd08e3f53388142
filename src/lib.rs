//! Schema-driven layered configuration resolution with provenance. Declare
//! your options once, merge five sources under strict precedence, and always
//! know which source won.
//!
//! Layerfig is the configuration engine for tools whose options arrive from
//! many directions at once: compiled defaults, a user settings file,
//! environment variables, command-line arguments, and values the application
//! computes for itself. One declarative catalog drives everything — seeding,
//! coercion, resolution, and the CLI surface — so the argument parser and
//! the configuration schema can never drift apart.
//!
//! ```ignore
//! let mut config = Resolver::builder()
//!     .schema_toml(CATALOG)
//!     .settings(parsed_settings)
//!     .settings_source(SettingsSource::WellKnownLocation)
//!     .build()?;
//!
//! config.ingest(&namespace)?;          // after CLI parsing
//! let level = config.get("log-level")?;
//! let (origin, value) = config.get_with_origin("log-level")?;
//! ```
//!
//! # Design: catalog as source of truth
//!
//! The option catalog is data, not code. Each entry declares a name, a type
//! from the closed set {bool, path, str, list, dict}, an optional default
//! and choices, where to look in the settings mapping, which environment
//! variables to check, and how the option projects onto the command line.
//! The loader validates all of it strictly — unknown keys, missing
//! descriptions, a list without an element type — and a malformed catalog
//! aborts startup instead of misconfiguring it.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults      from the catalog (or computed overrides)
//!        ↑ overridden by
//! Settings file          pre-parsed mapping, per-option section paths
//!        ↑ overridden by
//! Environment vars       first matching name wins
//!        ↑ overridden by
//! CLI arguments          ingested from the parsed namespace
//!        ↑ overridden by
//! Explicit overrides     Resolver::set()
//! ```
//!
//! Every layer is **sparse**: a source only speaks for the options it
//! actually supplies, and unset options fall through to the layer below.
//! Each option keeps at most one candidate value per source, so resolution
//! is a single scan down a precedence list — and
//! [`get_with_origin`](Resolver::get_with_origin) reports which source won,
//! which is what makes "why is this value what it is" answerable in
//! diagnostics.
//!
//! # Absence is not a value
//!
//! "The user did not set this" and "the user set this to something
//! default-looking" are different facts. Layerfig never reserves a real
//! value to mean "unset": a store simply has no entry for that source, and
//! the parsed-argument record carries an explicit [`ArgValue::Unset`]
//! marker. The marker type cannot equal an empty string, an empty list, or
//! `false`, so the distinction survives even list-accumulating flags.
//!
//! # Typed coercion
//!
//! Every recorded value passes through one exhaustive coercion function:
//! `"Yes"` becomes `true`, `~/inventory.yml` becomes an absolute path,
//! scalars wrap into single-element lists, and `KEY=value` CLI tokens
//! re-parse into a mapping. A value that cannot be coerced is a fatal,
//! source-named error — a wrong type in the settings file is user input
//! error, not something to paper over.
//!
//! # Core library — no CLI framework required
//!
//! The core consumes a pre-parsed settings mapping and a typed
//! parsed-argument [`Namespace`]; it never reads files or argv itself.
//! Projection ([`Resolver::arg_spec`]) emits framework-agnostic [`ArgSpec`]
//! records any parser can consume. For [clap](https://docs.rs/clap) users,
//! an optional adapter (the `cli` module, behind the `clap` Cargo feature,
//! on by default) converts specs to `clap::Arg`s and matches back into a
//! [`Namespace`]. To use layerfig without clap:
//!
//! ```toml
//! layerfig = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`ConfigError`] (or [`SchemaError`] at
//! load time). Errors are designed to be user-facing and specific: schema
//! failures name the offending definition path, coercion failures name the
//! option and the source that supplied the bad value, and querying an
//! undeclared option is reported as the programming defect it is, distinct
//! from a declared option that simply has no value. Nothing is silently
//! swallowed; the one deliberate non-error is a settings lookup that misses,
//! which just falls through to the next source.

pub mod defaults;
pub mod error;
pub mod types;

mod args;
mod builder;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod resolver;
mod schema;
mod store;

#[cfg(test)]
mod fixtures;

pub use args::{ArgSpec, ArgValue, Namespace, TokenParser};
pub use builder::ResolverBuilder;
#[cfg(feature = "clap")]
pub use cli::{namespace_from_matches, to_clap_arg, to_clap_command};
pub use coerce::{coerce, expand_path};
pub use error::{CoercionError, ConfigError, SchemaError};
pub use resolver::Resolver;
pub use schema::{ConfigPath, Nargs, OptionDefinition, Schema};
pub use types::{
    DEFAULT_PRECEDENCE, ElementType, OptionSource, OptionType, RawValue, SettingsSource, Value,
};
