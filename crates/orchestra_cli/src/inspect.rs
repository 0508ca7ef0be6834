//! `orchestra classify` and `orchestra entity`: inspection helpers.

use std::path::Path;

use orchestra_vhdl::parse_entity_file;
use orchestra_wishbone::classify as classify_name;

/// Prints the classification of every name; exit code 1 if any is unknown.
pub fn classify(names: &[String]) -> Result<i32, Box<dyn std::error::Error>> {
    let mut unknown = 0;
    for name in names {
        println!("{}", describe(name));
        if !classify_name(name).is_known() {
            unknown += 1;
        }
    }
    Ok(if unknown == 0 { 0 } else { 1 })
}

/// One line describing how `name` classifies.
fn describe(name: &str) -> String {
    let c = classify_name(name);
    match (&c.name, c.role) {
        (Some(iface), Some(role)) => {
            format!("{name}: {} interface '{iface}', role {}", c.kind.prefix(), role.name())
        }
        _ => format!("{name}: unknown signal for {} interface", c.kind.prefix()),
    }
}

/// Parses `file` and prints its first entity declaration.
pub fn entity(file: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let entity = parse_entity_file(file)?;
    print!("{}", entity.to_declaration());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_and_unknown_names() {
        assert_eq!(
            describe("WBS_CTRL_ADR"),
            "WBS_CTRL_ADR: WBS interface 'ctrl', role ADR"
        );
        assert_eq!(describe("RESET"), "RESET: WBC interface 'default', role RST");
        assert_eq!(describe("FOO"), "FOO: GLS interface 'export', role export");
        assert_eq!(describe("WBS_FOO"), "WBS_FOO: unknown signal for WBS interface");
    }

    #[test]
    fn entity_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led.vhd");
        std::fs::write(&path, "entity led is port (o : out std_logic); end entity;").unwrap();
        assert_eq!(entity(&path).unwrap(), 0);
        assert!(entity(&dir.path().join("missing.vhd")).is_err());
    }
}
