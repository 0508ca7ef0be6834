//! Description file loading, validation and saving.

use crate::error::ConfigError;
use crate::section::{Keyed, Section};
use crate::types::{ComponentDescription, ProjectDescription};
use std::path::Path;

/// The description file name inside a component directory.
pub const COMPONENT_FILE: &str = "component.toml";

/// Loads and validates a `component.toml` from a component directory.
pub fn load_component(component_dir: &Path) -> Result<ComponentDescription, ConfigError> {
    let content = std::fs::read_to_string(component_dir.join(COMPONENT_FILE))?;
    load_component_from_str(&content)
}

/// Parses and validates a component description from a string.
pub fn load_component_from_str(content: &str) -> Result<ComponentDescription, ConfigError> {
    let desc: ComponentDescription =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_component(&desc)?;
    Ok(desc)
}

/// Loads and validates a project description file.
pub fn load_project(path: &Path) -> Result<ProjectDescription, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_project_from_str(&content)
}

/// Parses and validates a project description from a string.
pub fn load_project_from_str(content: &str) -> Result<ProjectDescription, ConfigError> {
    let desc: ProjectDescription =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_project(&desc)?;
    Ok(desc)
}

/// Renders a component description as `component.toml` text.
pub fn component_to_string(desc: &ComponentDescription) -> Result<String, ConfigError> {
    toml::to_string_pretty(desc).map_err(|e| ConfigError::SerializeError(e.to_string()))
}

/// Writes a component description to `<component_dir>/component.toml`.
pub fn save_component(component_dir: &Path, desc: &ComponentDescription) -> Result<(), ConfigError> {
    let text = component_to_string(desc)?;
    std::fs::create_dir_all(component_dir)?;
    std::fs::write(component_dir.join(COMPONENT_FILE), text)?;
    Ok(())
}

/// Writes a project description to `path`.
pub fn save_project(path: &Path, desc: &ProjectDescription) -> Result<(), ConfigError> {
    let text =
        toml::to_string_pretty(desc).map_err(|e| ConfigError::SerializeError(e.to_string()))?;
    std::fs::write(path, text)?;
    Ok(())
}

fn validate_component(desc: &ComponentDescription) -> Result<(), ConfigError> {
    if desc.component.name.trim().is_empty() {
        return Err(ConfigError::MissingField("component.name".to_string()));
    }
    unique_keys("hdl_files", &desc.hdl_files)?;
    unique_keys("generics", &desc.generics)?;
    unique_keys("ports", &desc.ports)?;
    unique_keys("interfaces", &desc.interfaces)?;
    Ok(())
}

fn validate_project(desc: &ProjectDescription) -> Result<(), ConfigError> {
    if desc.project.name.trim().is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if !is_vhdl_identifier(&desc.project.name) {
        return Err(ConfigError::ValidationError(format!(
            "project name '{}' is not a valid VHDL identifier",
            desc.project.name
        )));
    }
    unique_keys("wires", &desc.wires)?;
    unique_keys("clocks", &desc.clocks)?;
    unique_keys("instances", &desc.instances)?;
    for instance in &desc.instances {
        if instance.component.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "instances.{}.component",
                instance.name
            )));
        }
    }
    Ok(())
}

fn unique_keys<T: Keyed>(section: &'static str, records: &Section<T>) -> Result<(), ConfigError> {
    match records.duplicate_key() {
        Some(key) => Err(ConfigError::DuplicateEntry {
            section,
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

/// Returns `true` if `name` can be used as a basic VHDL identifier.
pub fn is_vhdl_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    matches!(bytes.first(), Some(b) if b.is_ascii_alphabetic())
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        && !name.contains("__")
        && !name.ends_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClockGenerator, InstanceInterfaceRecord};
    use orchestra_wishbone::{InterfaceKind, Role};

    const PROJECT: &str = r#"
[project]
name = "soc"
version = "0.1"
author = "someone"

[[wires]]
name = "main"

[[clocks]]
name = "sys"
frequency = "50MHz"

[[clocks]]
name = "fast"
frequency = 100000000
generator = "pll"

[[instances]]
name = "cpu0"
component = "cpu"

[[instances.interfaces]]
name = "wbm_noname"
link = "main"

[[instances]]
name = "ram0"
component = "ram"

[instances.generics]
depth = 10

[[instances.interfaces]]
name = "mem"
link = "main"
offset = "0x400"
"#;

    const COMPONENT: &str = r#"
[component]
name = "uart"
version = "1.0"
category = "communication"

[[hdl_files]]
name = "uart.vhd"
order = 1
top = true

[[generics]]
name = "width"
type = "integer"
value = "8"

[[ports]]
name = "wbs_adr_i"
interface = "wbs_noname"
role = "ADR"

[[ports]]
name = "tx"
interface = "export"
role = "export"

[[interfaces]]
name = "wbs_noname"
kind = "WBS"
clock = "default"
"#;

    #[test]
    fn parse_project() {
        let desc = load_project_from_str(PROJECT).unwrap();
        assert_eq!(desc.project.name, "soc");
        assert_eq!(desc.wires.get("main").unwrap().kind, "wishbone");
        assert_eq!(desc.clocks.get("fast").unwrap().generator, ClockGenerator::Pll);
        assert_eq!(desc.clocks.get("fast").unwrap().frequency.hz(), 100_000_000);
        let ram = desc.instances.get("ram0").unwrap();
        assert_eq!(ram.generics["depth"], "10");
        assert_eq!(ram.interfaces.get("mem").unwrap().offset, Some(0x400));
        let cpu = desc.instances.get("cpu0").unwrap();
        assert_eq!(
            cpu.interfaces.get("wbm_noname"),
            Some(&InstanceInterfaceRecord {
                name: "wbm_noname".into(),
                link: Some("main".into()),
                offset: None,
            })
        );
    }

    #[test]
    fn parse_component() {
        let desc = load_component_from_str(COMPONENT).unwrap();
        assert_eq!(desc.component.category, "communication");
        assert!(desc.hdl_files.get("uart.vhd").unwrap().top);
        assert_eq!(desc.ports.get("wbs_adr_i").unwrap().role, Role::Adr);
        assert_eq!(desc.ports.get("tx").unwrap().role, Role::Export);
        assert_eq!(desc.interfaces.get("wbs_noname").unwrap().kind, InterfaceKind::Slave);
    }

    #[test]
    fn missing_project_name_errors() {
        let err = load_project_from_str("[project]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn bad_project_name_errors() {
        let err = load_project_from_str("[project]\nname = \"my soc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn duplicate_wire_errors() {
        let toml = r#"
[project]
name = "soc"

[[wires]]
name = "main"

[[wires]]
name = "MAIN"
"#;
        let err = load_project_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateEntry { section: "wires", .. }));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_component_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        let toml = r#"
[component]
name = "x"

[[ports]]
name = "p"
interface = "i"
role = "IRQ"
"#;
        assert!(matches!(
            load_component_from_str(toml).unwrap_err(),
            ConfigError::ParseError(_)
        ));
    }

    #[test]
    fn project_round_trips_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("project.toml");
        let desc = load_project_from_str(PROJECT).unwrap();
        save_project(&path, &desc).unwrap();
        assert_eq!(load_project(&path).unwrap(), desc);
    }

    #[test]
    fn component_round_trips_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let desc = load_component_from_str(COMPONENT).unwrap();
        save_component(&dir.path().join("uart"), &desc).unwrap();
        assert_eq!(load_component(&dir.path().join("uart")).unwrap(), desc);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_component(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
