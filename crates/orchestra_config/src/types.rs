//! Description records deserialized from `component.toml` and `project.toml`.

use crate::section::{Keyed, Section};
use orchestra_common::Frequency;
use orchestra_wishbone::{InterfaceKind, Role};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// The contents of a `component.toml`.
///
/// `generics`, `ports` and `interfaces` are derived from the top file's
/// entity when a top file is designated, and are compared against it again
/// by the component check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    /// Component metadata.
    pub component: ComponentMeta,
    /// HDL files in load order.
    #[serde(default)]
    pub hdl_files: Section<HdlFileRecord>,
    /// Generics of the top entity.
    #[serde(default)]
    pub generics: Section<GenericRecord>,
    /// Ports of the top entity with their interface assignment.
    #[serde(default)]
    pub ports: Section<PortRecord>,
    /// Interfaces of the component.
    #[serde(default)]
    pub interfaces: Section<InterfaceRecord>,
}

/// Component metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    /// The component (base) name.
    pub name: String,
    /// The component version string.
    #[serde(default)]
    pub version: String,
    /// A free-form category (e.g. "communication", "memory").
    #[serde(default)]
    pub category: String,
    /// A brief description.
    #[serde(default)]
    pub description: String,
}

/// One HDL source file of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdlFileRecord {
    /// File name inside the component bundle.
    pub name: String,
    /// Where the file is used (`all`, `synthesis`, `simulation`).
    #[serde(default = "default_scope")]
    pub scope: String,
    /// 1-based load order.
    #[serde(default)]
    pub order: u32,
    /// Whether this file holds the component's top entity.
    #[serde(default)]
    pub top: bool,
}

fn default_scope() -> String {
    "all".to_string()
}

/// A generic of the component's top entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRecord {
    /// The generic name.
    pub name: String,
    /// The VHDL type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// The default value, as VHDL text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A port of the component's top entity and its interface assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// The port name.
    pub name: String,
    /// The interface the port belongs to.
    pub interface: String,
    /// The role of the port inside the interface.
    pub role: Role,
}

/// An interface of the component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// The interface name.
    pub name: String,
    /// The interface kind.
    pub kind: InterfaceKind,
    /// For bus interfaces, the clock/reset interface that times it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// The contents of a `project.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescription {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Buses.
    #[serde(default)]
    pub wires: Section<WireRecord>,
    /// Clock domains.
    #[serde(default)]
    pub clocks: Section<ClockRecord>,
    /// Component instances.
    #[serde(default)]
    pub instances: Section<InstanceRecord>,
}

/// Project metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// The project name, also used for the top entity and output files.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// The project author.
    #[serde(default)]
    pub author: String,
    /// The target board or device, informational only.
    #[serde(default)]
    pub target: String,
}

/// A bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    /// The wire name.
    pub name: String,
    /// The bus type tag.
    #[serde(default = "default_wire_kind")]
    pub kind: String,
}

fn default_wire_kind() -> String {
    "wishbone".to_string()
}

/// A clock domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRecord {
    /// The clock domain name, also the name of its top-level input.
    pub name: String,
    /// The clock frequency.
    pub frequency: Frequency,
    /// How the clock is produced.
    #[serde(default)]
    pub generator: ClockGenerator,
}

/// How a clock domain's clock is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockGenerator {
    /// Fed directly from an input pin.
    #[default]
    Static,
    /// Produced by a PLL.
    Pll,
}

/// A component instance inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// The instance name.
    pub name: String,
    /// The base component name in the library.
    pub component: String,
    /// Generic overrides, by generic name.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_generic_map"
    )]
    pub generics: BTreeMap<String, String>,
    /// Interface links.
    #[serde(default)]
    pub interfaces: Section<InstanceInterfaceRecord>,
}

/// The link of one instance interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInterfaceRecord {
    /// The interface name.
    pub name: String,
    /// The wire (bus interfaces) or clock domain (clock interfaces).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// The base address of a slave interface.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_offset",
        deserialize_with = "deserialize_offset"
    )]
    pub offset: Option<u64>,
}

macro_rules! keyed {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.name
            }
        })*
    };
}

keyed!(
    HdlFileRecord,
    GenericRecord,
    PortRecord,
    InterfaceRecord,
    WireRecord,
    ClockRecord,
    InstanceRecord,
    InstanceInterfaceRecord
);

/// Parses an address written as decimal, `0x` hex or `0b` binary, with
/// optional `_` separators.
pub fn parse_address(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

fn serialize_offset<S: Serializer>(offset: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match offset {
        Some(v) => serializer.serialize_str(&format!("0x{v:x}")),
        None => serializer.serialize_none(),
    }
}

fn deserialize_offset<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OffsetVisitor;

    impl Visitor<'_> for OffsetVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an address as an integer or a string such as \"0x1000\"")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map(Some)
                .map_err(|_| E::custom(format!("negative address {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_address(v)
                .map(Some)
                .ok_or_else(|| E::custom(format!("invalid address '{v}'")))
        }
    }

    deserializer.deserialize_any(OffsetVisitor)
}

/// Accepts generic overrides written as strings, integers or booleans and
/// keeps them as VHDL text.
fn deserialize_generic_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct GenericValue(String);

    impl<'v> Deserialize<'v> for GenericValue {
        fn deserialize<V: Deserializer<'v>>(deserializer: V) -> Result<Self, V::Error> {
            struct ValueVisitor;

            impl Visitor<'_> for ValueVisitor {
                type Value = GenericValue;

                fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                    formatter.write_str("a string, integer or boolean generic value")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<GenericValue, E> {
                    Ok(GenericValue(v.to_string()))
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<GenericValue, E> {
                    Ok(GenericValue(v.to_string()))
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<GenericValue, E> {
                    Ok(GenericValue(v.to_string()))
                }

                fn visit_bool<E: de::Error>(self, v: bool) -> Result<GenericValue, E> {
                    Ok(GenericValue(v.to_string()))
                }
            }

            deserializer.deserialize_any(ValueVisitor)
        }
    }

    let raw = BTreeMap::<String, GenericValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_records_compare_by_value() {
        let mut interfaces = Section::new();
        interfaces
            .insert(InstanceInterfaceRecord {
                name: "wbs".into(),
                link: Some("main".into()),
                offset: Some(0x10),
            })
            .unwrap();
        let a = InstanceRecord {
            name: "ram0".into(),
            component: "ram".into(),
            generics: BTreeMap::new(),
            interfaces,
        };
        let b = a.clone();
        fn total_eq<T: Eq>(x: &T, y: &T) -> bool {
            x == y
        }
        assert!(total_eq(&a, &b));
    }

    #[test]
    fn parse_addresses() {
        assert_eq!(parse_address("4096"), Some(4096));
        assert_eq!(parse_address("0x1000"), Some(4096));
        assert_eq!(parse_address("0X10_00"), Some(4096));
        assert_eq!(parse_address("0b101"), Some(5));
        assert_eq!(parse_address("0xZZ"), None);
        assert_eq!(parse_address(""), None);
    }

    #[test]
    fn instance_interface_offsets() {
        let toml = r#"
[[interfaces]]
name = "ctrl"
link = "main"
offset = "0x20"

[[interfaces]]
name = "mem"
link = "main"
offset = 64

[[interfaces]]
name = "clk"
link = "sys"
"#;
        #[derive(Deserialize)]
        struct Wrapper {
            interfaces: Section<InstanceInterfaceRecord>,
        }
        let w: Wrapper = toml::from_str(toml).unwrap();
        assert_eq!(w.interfaces.get("ctrl").unwrap().offset, Some(0x20));
        assert_eq!(w.interfaces.get("mem").unwrap().offset, Some(64));
        assert_eq!(w.interfaces.get("clk").unwrap().offset, None);
    }

    #[test]
    fn generic_overrides_accept_scalars() {
        let toml = r#"
name = "uart0"
component = "uart"

[generics]
WIDTH = 16
name = "fast"
enabled = true
"#;
        let inst: InstanceRecord = toml::from_str(toml).unwrap();
        assert_eq!(inst.generics["width"], "16");
        assert_eq!(inst.generics["name"], "fast");
        assert_eq!(inst.generics["enabled"], "true");
    }

    #[test]
    fn clock_defaults_to_static() {
        let clock: ClockRecord = toml::from_str("name = \"sys\"\nfrequency = \"50MHz\"").unwrap();
        assert_eq!(clock.generator, ClockGenerator::Static);
        assert_eq!(clock.frequency.hz(), 50_000_000);
    }

    #[test]
    fn hdl_file_defaults() {
        let file: HdlFileRecord = toml::from_str("name = \"uart.vhd\"").unwrap();
        assert_eq!(file.scope, "all");
        assert_eq!(file.order, 0);
        assert!(!file.top);
    }
}
