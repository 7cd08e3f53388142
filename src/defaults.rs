//! Computed defaults for options whose value cannot be declared in the
//! catalog. Feed these to
//! [`ResolverBuilder::default_override`](crate::ResolverBuilder::default_override)
//! or record them with [`Resolver::set`](crate::Resolver::set) after
//! construction.

use std::path::PathBuf;

/// The command used to open a file in an editor: the user's `EDITOR` when
/// set, a line-aware `vi` invocation otherwise. `{filename}` and
/// `{line_number}` are substitution slots filled by the caller at edit time.
pub fn editor_command() -> String {
    match std::env::var("EDITOR") {
        Ok(editor) => format!("{editor} {{filename}}"),
        Err(_) => "vi +{line_number} {filename}".to_string(),
    }
}

/// The per-application cache directory under the platform cache location
/// (`$XDG_CACHE_HOME` or `~/.cache` on Linux). `None` when no home
/// directory can be determined.
pub fn cache_dir(app_name: &str) -> Option<PathBuf> {
    let dirs = directories::BaseDirs::new()?;
    Some(dirs.cache_dir().join(app_name))
}
