//! Interface kinds and their canonical role tables.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of an interface, identified in port names by its prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// `GLS`: plain signals exported to the top level.
    #[serde(rename = "GLS")]
    Export,
    /// `WBM`: a Wishbone master.
    #[serde(rename = "WBM")]
    Master,
    /// `WBS`: a Wishbone slave.
    #[serde(rename = "WBS")]
    Slave,
    /// `WBC`: a clock and reset pair.
    #[serde(rename = "WBC")]
    ClockReset,
}

/// Signal direction as seen from the component owning the port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven into the component.
    In,
    /// Driven by the component.
    Out,
    /// Either direction (both for `DAT`, one of the two for clock/reset).
    InOut,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "inout"),
        }
    }
}

/// One line of a role table: the role, its direction, and whether it is
/// mandatory (upper-case in the original notation) or optional.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RoleSpec {
    /// The role.
    pub role: Role,
    /// The direction a port carrying this role must have.
    pub direction: Direction,
    /// Whether every interface of the kind must carry this role.
    pub required: bool,
}

impl RoleSpec {
    const fn required(role: Role, direction: Direction) -> Self {
        Self {
            role,
            direction,
            required: true,
        }
    }

    const fn optional(role: Role, direction: Direction) -> Self {
        Self {
            role,
            direction,
            required: false,
        }
    }
}

const EXPORT_ROLES: &[RoleSpec] = &[];

const MASTER_ROLES: &[RoleSpec] = &[
    RoleSpec::required(Role::Adr, Direction::Out),
    RoleSpec::required(Role::Dat, Direction::InOut),
    RoleSpec::required(Role::We, Direction::Out),
    RoleSpec::optional(Role::Sel, Direction::Out),
    RoleSpec::required(Role::Ack, Direction::In),
    RoleSpec::required(Role::Cyc, Direction::Out),
    RoleSpec::required(Role::Stb, Direction::Out),
];

const SLAVE_ROLES: &[RoleSpec] = &[
    RoleSpec::required(Role::Adr, Direction::In),
    RoleSpec::required(Role::Dat, Direction::InOut),
    RoleSpec::required(Role::We, Direction::In),
    RoleSpec::optional(Role::Sel, Direction::In),
    RoleSpec::required(Role::Ack, Direction::Out),
    RoleSpec::required(Role::Cyc, Direction::In),
    RoleSpec::required(Role::Stb, Direction::In),
];

const CLOCK_ROLES: &[RoleSpec] = &[
    RoleSpec::required(Role::Rst, Direction::InOut),
    RoleSpec::required(Role::Clk, Direction::InOut),
];

impl InterfaceKind {
    /// All kinds, in prefix-table order.
    pub const ALL: [InterfaceKind; 4] = [
        InterfaceKind::Export,
        InterfaceKind::Master,
        InterfaceKind::Slave,
        InterfaceKind::ClockReset,
    ];

    /// Returns the upper-case port-name prefix of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            InterfaceKind::Export => "GLS",
            InterfaceKind::Master => "WBM",
            InterfaceKind::Slave => "WBS",
            InterfaceKind::ClockReset => "WBC",
        }
    }

    /// Maps an upper-case name token to the kind it prefixes.
    pub fn from_prefix(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == token)
    }

    /// Returns the word used for this kind in report messages.
    pub fn describe(self) -> &'static str {
        match self {
            InterfaceKind::Export => "globals",
            InterfaceKind::Master => "master",
            InterfaceKind::Slave => "slave",
            InterfaceKind::ClockReset => "clock",
        }
    }

    /// Returns the role table of this kind.
    pub fn roles(self) -> &'static [RoleSpec] {
        match self {
            InterfaceKind::Export => EXPORT_ROLES,
            InterfaceKind::Master => MASTER_ROLES,
            InterfaceKind::Slave => SLAVE_ROLES,
            InterfaceKind::ClockReset => CLOCK_ROLES,
        }
    }

    /// Returns the table entry for `role`, if this kind carries it.
    pub fn spec(self, role: Role) -> Option<&'static RoleSpec> {
        self.roles().iter().find(|s| s.role == role)
    }

    /// Returns `true` for the two bus kinds linked to wires.
    pub fn is_bus(self) -> bool {
        matches!(self, InterfaceKind::Master | InterfaceKind::Slave)
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for InterfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_prefix(&s.to_ascii_uppercase())
            .ok_or_else(|| format!("unknown interface kind '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_round_trip() {
        for kind in InterfaceKind::ALL {
            assert_eq!(InterfaceKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(InterfaceKind::from_prefix("WBX"), None);
    }

    #[test]
    fn master_and_slave_tables_mirror_each_other() {
        for m in InterfaceKind::Master.roles() {
            let s = InterfaceKind::Slave.spec(m.role).unwrap();
            assert_eq!(s.required, m.required);
            let mirrored = match m.direction {
                Direction::In => Direction::Out,
                Direction::Out => Direction::In,
                Direction::InOut => Direction::InOut,
            };
            assert_eq!(s.direction, mirrored);
        }
    }

    #[test]
    fn sel_is_the_only_optional_bus_role() {
        let optional: Vec<_> = InterfaceKind::Master
            .roles()
            .iter()
            .filter(|s| !s.required)
            .map(|s| s.role)
            .collect();
        assert_eq!(optional, vec![Role::Sel]);
    }

    #[test]
    fn export_has_no_roles() {
        assert!(InterfaceKind::Export.roles().is_empty());
        assert!(InterfaceKind::Export.spec(Role::Adr).is_none());
    }

    #[test]
    fn parse_kind_case_insensitive() {
        assert_eq!("wbs".parse::<InterfaceKind>().unwrap(), InterfaceKind::Slave);
        assert!("bus".parse::<InterfaceKind>().is_err());
    }

    #[test]
    fn serde_uses_prefixes() {
        assert_eq!(
            serde_json::to_string(&InterfaceKind::ClockReset).unwrap(),
            "\"WBC\""
        );
    }
}
