#[cfg(test)]
pub mod test {
    use crate::resolver::Resolver;
    use crate::types::{RawValue, SettingsSource};

    /// Option catalog for a terminal automation tool, covering every option
    /// type, multi-flag and positional CLI projections, multiple settings
    /// paths, and options with and without defaults.
    pub const CATALOG: &str = r#"
[cache-dir]
description = "Specify the cache directory"
type = "path"

[container-engine]
description = "Specify the container engine to run the execution environment"
type = "str"
default = "podman"
choices = ["podman", "docker"]
config = [{ section = ["ansible-navigator", "execution-environment"], name = "container-engine" }]
env = [{ name = "ANSIBLE_NAVIGATOR_CONTAINER_ENGINE" }]
cli = [{ name = "--ce" }, { name = "--container-engine" }]

[editor-command]
description = "Specify the command used to edit a file"
type = "str"

[execution-environment]
description = "Enable or disable the use of an execution environment"
type = "bool"
default = true
config = [{ section = ["ansible-navigator", "execution-environment"], name = "enabled" }]
env = [{ name = "ANSIBLE_NAVIGATOR_EXECUTION_ENVIRONMENT" }]
cli = [{ name = "--ee" }, { name = "--execution-environment" }]

[inventory]
description = "Specify an inventory path"
type = "list"
elements = "path"
config = [{ section = ["ansible-navigator"], name = "inventories" }]
env = [{ name = "ANSIBLE_NAVIGATOR_INVENTORIES" }]
cli = [{ name = "-i" }, { name = "--inventory" }]

[inventory-columns]
description = "Specify host attributes to show in the inventory view"
type = "list"
elements = "str"
default = []
config = [{ section = ["ansible-navigator", "inventory"], name = "columns" }]
cli = [{ name = "--ic" }, { name = "--inventory-columns" }]

[log-file]
description = "Specify the full path for the application log file"
type = "path"
default = "./navigator.log"
config = [{ section = ["ansible-navigator", "logging"], name = "file" }]
env = [{ name = "ANSIBLE_NAVIGATOR_LOG_FILE" }]
cli = [{ name = "--lf" }, { name = "--log-file" }]

[log-level]
description = "Specify the application log level"
type = "str"
default = "info"
choices = ["debug", "info", "warning", "error", "critical"]
config = [{ section = ["ansible-navigator", "logging"], name = "level" }]
env = [{ name = "ANSIBLE_NAVIGATOR_LOG_LEVEL" }]
cli = [{ name = "--ll" }, { name = "--log-level" }]

[mode]
description = "Specify the user interface mode"
type = "str"
default = "interactive"
choices = ["stdout", "interactive"]
config = [{ section = ["ansible-navigator"], name = "mode" }]
cli = [{ name = "-m" }, { name = "--mode" }]

[pass-environment-variable]
description = [
    "Specify an existing environment variable to be passed through",
    "to and set within the execution environment",
]
type = "list"
elements = "str"
config = [{ section = ["ansible-navigator", "execution-environment", "environment-variables"], name = "pass" }]
cli = [{ name = "--penv" }]

[playbook]
description = "Specify the playbook name"
type = "path"
config = [{ section = ["ansible-navigator"], name = "playbook" }]
cli = [{ name = "playbook" }]

[set-environment-variable]
description = "Specify an environment variable and a value to be set within the execution environment"
type = "dict"
config = [{ section = ["ansible-navigator", "execution-environment", "environment-variables"], name = "set" }]
cli = [{ name = "--senv" }]
"#;

    /// A resolver seeded with empty settings and no environment.
    pub fn resolver() -> Resolver {
        resolver_with(serde_json::json!({}), &[])
    }

    /// A resolver seeded with the given settings mapping and synthetic
    /// environment pairs.
    pub fn resolver_with(settings: RawValue, env: &[(&str, &str)]) -> Resolver {
        Resolver::builder()
            .schema_toml(CATALOG)
            .settings(settings)
            .settings_source(SettingsSource::WellKnownLocation)
            .env_vars(
                env.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
            .build()
            .expect("fixture catalog builds")
    }

    #[test]
    fn fixture_catalog_loads() {
        let config = resolver();
        assert_eq!(config.schema().len(), 12);
        assert!(config.schema().contains("set-environment-variable"));
    }
}
