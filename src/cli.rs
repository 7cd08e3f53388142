//! Clap adapter for layerfig.
//!
//! This module is the **optional integration layer** between layerfig's
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! The adapter goes both ways and nothing else: [`to_clap_arg`] turns a
//! projected [`ArgSpec`] into a `clap::Arg`, and [`namespace_from_matches`]
//! rebuilds the typed [`Namespace`] from parsed matches, applying each
//! scalar option's per-token coercion hook as it goes (list/dict tokens stay
//! raw until ingestion, which is where their coercion lives). From there,
//! all logic flows through the clap-free [`Resolver`](crate::Resolver) API.
//!
//! If you use a different CLI parser (or no CLI at all), skip this module
//! and construct [`Namespace`] values directly.

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::args::{self, ArgSpec, ArgValue, Namespace};
use crate::error::ConfigError;
use crate::schema::{Nargs, OptionDefinition, Schema};
use crate::types::{OptionSource, Value};

/// Build a `clap::Arg` from a projected spec.
///
/// The first double-dash name becomes the long flag and the first
/// single-dash name the short flag; further names become aliases. A spec
/// whose names carry no dashes becomes a positional argument whose id is the
/// positional name itself.
pub fn to_clap_arg(spec: &ArgSpec) -> Arg {
    let id = spec
        .dest
        .clone()
        .unwrap_or_else(|| spec.names[0].clone());
    let mut arg = Arg::new(id).help(spec.help.clone());

    let mut longs: Vec<&str> = Vec::new();
    let mut shorts: Vec<char> = Vec::new();
    for name in &spec.names {
        if let Some(long) = name.strip_prefix("--") {
            longs.push(long);
        } else if let Some(short) = name.strip_prefix('-') {
            if let Some(c) = short.chars().next() {
                shorts.push(c);
            }
        }
    }
    if let Some(first) = longs.first() {
        arg = arg.long(first.to_string());
    }
    for alias in longs.iter().skip(1) {
        arg = arg.visible_alias(alias.to_string());
    }
    if let Some(first) = shorts.first() {
        arg = arg.short(*first);
    }
    for alias in shorts.iter().skip(1) {
        arg = arg.short_alias(*alias);
    }

    if spec.append {
        arg = arg.action(ArgAction::Append);
    }
    match spec.nargs {
        Some(Nargs::Optional) => arg = arg.num_args(0..=1),
        Some(Nargs::ZeroOrMore) => arg = arg.num_args(0..),
        Some(Nargs::OneOrMore) => arg = arg.num_args(1..),
        Some(Nargs::Exactly(n)) => arg = arg.num_args(n),
        None => {}
    }
    if let Some(choices) = &spec.choices {
        arg = arg.value_parser(clap::builder::PossibleValuesParser::new(choices.clone()));
    }
    arg
}

/// Build a `clap::Command` carrying every CLI-projected option in the schema.
pub fn to_clap_command(name: impl Into<clap::builder::Str>, schema: &Schema) -> Command {
    let mut command = Command::new(name);
    for def in schema.iter() {
        if def.cli.is_empty() {
            continue;
        }
        command = command.arg(to_clap_arg(&args::project(def)));
    }
    command
}

/// Rebuild a typed [`Namespace`] from parsed matches.
///
/// Options the command line never mentioned get their spec default (the
/// unset marker, list-wrapped for accumulating options), so ingestion can
/// tell "not supplied" from any real value. Scalar tokens run through the
/// option's per-token coercion hook here; a bad token fails before anything
/// reaches the stores.
pub fn namespace_from_matches(
    schema: &Schema,
    matches: &ArgMatches,
) -> Result<Namespace, ConfigError> {
    let mut namespace = Namespace::new();
    for def in schema.iter() {
        if def.cli.is_empty() {
            continue;
        }
        let spec = args::project(def);
        let key = def.namespace_key();

        // The try_ accessors treat an argument this command never defined
        // as absent, so one schema can project onto several per-subcommand
        // commands that each carry a subset of the options.
        let value = if spec.append {
            match matches.try_get_occurrences::<String>(key) {
                Ok(Some(occurrences)) => {
                    let mut groups = Vec::new();
                    for group in occurrences {
                        let mut items = Vec::new();
                        for token in group {
                            items.push(token_value(def, &spec, token)?);
                        }
                        groups.push(ArgValue::List(items));
                    }
                    ArgValue::List(groups)
                }
                _ => spec.default.clone(),
            }
        } else if spec.nargs.is_some() {
            match matches.try_get_many::<String>(key) {
                Ok(Some(tokens)) => {
                    let mut items = Vec::new();
                    for token in tokens {
                        items.push(token_value(def, &spec, token)?);
                    }
                    ArgValue::List(items)
                }
                _ => spec.default.clone(),
            }
        } else {
            match matches.try_get_one::<String>(key) {
                Ok(Some(token)) => token_value(def, &spec, token)?,
                _ => spec.default.clone(),
            }
        };

        namespace.insert(key, value);
    }
    Ok(namespace)
}

fn token_value(
    def: &OptionDefinition,
    spec: &ArgSpec,
    token: &str,
) -> Result<ArgValue, ConfigError> {
    match spec.parser {
        Some(parser) => parser
            .parse(token)
            .map(ArgValue::Scalar)
            .map_err(|err| ConfigError::Coercion {
                option: def.name.clone(),
                origin: OptionSource::Cli,
                source: err,
            }),
        None => Ok(ArgValue::Scalar(Value::Str(token.to_string()))),
    }
}
