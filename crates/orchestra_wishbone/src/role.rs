//! Canonical Wishbone signal roles and the raw-token alias table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The function a port plays inside its interface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Reset.
    Rst,
    /// Clock.
    Clk,
    /// Address bus.
    Adr,
    /// Data bus (read and/or write).
    Dat,
    /// Write enable.
    We,
    /// Byte-lane select.
    Sel,
    /// Acknowledge.
    Ack,
    /// Bus cycle.
    Cyc,
    /// Strobe.
    Stb,
    /// A plain signal exported to the top level.
    #[serde(rename = "export")]
    Export,
}

impl Role {
    /// Every Wishbone role, in table order.
    pub const WISHBONE: [Role; 9] = [
        Role::Rst,
        Role::Clk,
        Role::Adr,
        Role::Dat,
        Role::We,
        Role::Sel,
        Role::Ack,
        Role::Cyc,
        Role::Stb,
    ];

    /// Returns the canonical name (`ADR`, `DAT`, … or `export`).
    pub fn name(self) -> &'static str {
        match self {
            Role::Rst => "RST",
            Role::Clk => "CLK",
            Role::Adr => "ADR",
            Role::Dat => "DAT",
            Role::We => "WE",
            Role::Sel => "SEL",
            Role::Ack => "ACK",
            Role::Cyc => "CYC",
            Role::Stb => "STB",
            Role::Export => "export",
        }
    }

    /// Returns `true` for the clock and reset roles.
    pub fn is_clock_or_reset(self) -> bool {
        matches!(self, Role::Clk | Role::Rst)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string is not a role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("export") {
            return Ok(Role::Export);
        }
        Role::WISHBONE
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// Raw upper-case name tokens and the role each one stands for.
pub const SIGNAL_ALIASES: &[(&str, Role)] = &[
    ("RST", Role::Rst),
    ("RESET", Role::Rst),
    ("CLK", Role::Clk),
    ("CLOCK", Role::Clk),
    ("ADR", Role::Adr),
    ("ADDR", Role::Adr),
    ("ADDRESS", Role::Adr),
    ("DAT", Role::Dat),
    ("DATA", Role::Dat),
    ("READDATA", Role::Dat),
    ("WRITEDATA", Role::Dat),
    ("WE", Role::We),
    ("WRITE", Role::We),
    ("SEL", Role::Sel),
    ("SELECT", Role::Sel),
    ("ACK", Role::Ack),
    ("CYC", Role::Cyc),
    ("CYCLE", Role::Cyc),
    ("STB", Role::Stb),
    ("STROBE", Role::Stb),
];

/// Maps an upper-case name token to its role, if it is a known alias.
pub fn lookup_alias(token: &str) -> Option<Role> {
    SIGNAL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, role)| *role)
}
