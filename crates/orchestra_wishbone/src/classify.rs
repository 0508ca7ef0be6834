//! Port-name classifier.
//!
//! Names are split on `_` after upper-casing. A leading `GLS`, `WBM`, `WBS`
//! or `WBC` token selects the interface kind, the last alias token selects
//! the role, and the tokens in between name the interface:
//!
//! | Port name         | Kind       | Interface                | Role   |
//! |-------------------|------------|--------------------------|--------|
//! | `wbs_ctrl_adr_i`  | Slave      | `ctrl`                   | ADR    |
//! | `wbm_dat_o`       | Master     | `wbm_noname`             | DAT    |
//! | `wbs_ctrl_clk`    | ClockReset | `wbs_ctrl_clockandreset` | CLK    |
//! | `reset`           | ClockReset | `default`                | RST    |
//! | `tx`              | Export     | `export`                 | export |

use crate::kind::InterfaceKind;
use crate::role::{lookup_alias, Role};

/// The outcome of classifying one port name.
///
/// `name` and `role` are both `None` for an unclassifiable signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// The interface kind.
    pub kind: InterfaceKind,
    /// The lower-case interface name.
    pub name: Option<String>,
    /// The role of the port inside the interface.
    pub role: Option<Role>,
}

impl Classification {
    fn known(kind: InterfaceKind, name: impl Into<String>, role: Role) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            role: Some(role),
        }
    }

    fn export() -> Self {
        Self::known(InterfaceKind::Export, "export", Role::Export)
    }

    fn unknown(kind: InterfaceKind) -> Self {
        Self {
            kind,
            name: None,
            role: None,
        }
    }

    /// Returns `true` if the name mapped to an interface and a role.
    pub fn is_known(&self) -> bool {
        self.name.is_some() && self.role.is_some()
    }
}

/// Error for a port name that maps to no role of its interface kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown signal '{signal}' for {kind} interface")]
pub struct ClassifyError {
    /// The raw port name.
    pub signal: String,
    /// The kind selected by the name's prefix.
    pub kind: InterfaceKind,
}

/// Classifies a raw port name. Pure and total: unclassifiable names come
/// back with `name` and `role` set to `None`.
pub fn classify(raw: &str) -> Classification {
    let upper = raw.to_ascii_uppercase();
    let tokens: Vec<&str> = upper.split('_').filter(|t| !t.is_empty()).collect();

    let (first, rest) = match tokens.split_first() {
        Some(split) => split,
        None => return Classification::export(),
    };

    let Some(kind) = InterfaceKind::from_prefix(first) else {
        return match lookup_alias(first) {
            Some(role) if role.is_clock_or_reset() => {
                Classification::known(InterfaceKind::ClockReset, "default", role)
            }
            _ => Classification::export(),
        };
    };

    if rest.is_empty() {
        // A bare prefix names nothing.
        return Classification::unknown(kind);
    }

    if kind == InterfaceKind::Export {
        if rest.len() == 1 {
            return Classification::export();
        }
        let name = rest[..rest.len() - 1].join("_").to_ascii_lowercase();
        return Classification::known(InterfaceKind::Export, name, Role::Export);
    }

    let Some(pos) = rest.iter().rposition(|t| lookup_alias(t).is_some()) else {
        return Classification::unknown(kind);
    };
    let Some(role) = lookup_alias(rest[pos]) else {
        return Classification::unknown(kind);
    };

    let prefix = kind.prefix().to_ascii_lowercase();
    let name = if pos == 0 {
        format!("{prefix}_noname")
    } else {
        rest[..pos].join("_").to_ascii_lowercase()
    };

    if kind.spec(role).is_some() {
        Classification::known(kind, name, role)
    } else if role.is_clock_or_reset() {
        Classification::known(InterfaceKind::ClockReset, clock_interface_name(kind, &name), role)
    } else {
        Classification::unknown(kind)
    }
}

/// The clock/reset interface synthesized for the bus interface `name` of
/// `kind`, e.g. `wbs_ctrl_clockandreset` for slave `ctrl`.
pub fn clock_interface_name(kind: InterfaceKind, name: &str) -> String {
    let prefix = kind.prefix().to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    if name.starts_with(&prefix) {
        format!("{name}_clockandreset")
    } else {
        format!("{prefix}_{name}_clockandreset")
    }
}

/// Classifies a raw port name, turning an unclassifiable name into an error.
pub fn classify_strict(raw: &str) -> Result<(InterfaceKind, String, Role), ClassifyError> {
    match classify(raw) {
        Classification {
            kind,
            name: Some(name),
            role: Some(role),
        } => Ok((kind, name, role)),
        Classification { kind, .. } => Err(ClassifyError {
            signal: raw.to_string(),
            kind,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::SIGNAL_ALIASES;

    fn triple(raw: &str) -> (InterfaceKind, Option<String>, Option<Role>) {
        let c = classify(raw);
        (c.kind, c.name, c.role)
    }

    #[test]
    fn slave_with_interface_name() {
        assert_eq!(
            triple("WBS_CTRL_ADR"),
            (InterfaceKind::Slave, Some("ctrl".into()), Some(Role::Adr))
        );
    }

    #[test]
    fn single_token_reset_is_default_clock() {
        assert_eq!(
            triple("RESET"),
            (InterfaceKind::ClockReset, Some("default".into()), Some(Role::Rst))
        );
    }

    #[test]
    fn single_token_plain_is_export() {
        assert_eq!(
            triple("FOO"),
            (InterfaceKind::Export, Some("export".into()), Some(Role::Export))
        );
    }

    #[test]
    fn direction_suffix_is_ignored() {
        assert_eq!(
            triple("wbs_ctrl_dat_i"),
            (InterfaceKind::Slave, Some("ctrl".into()), Some(Role::Dat))
        );
        assert_eq!(
            triple("wbm_readdata_o"),
            (InterfaceKind::Master, Some("wbm_noname".into()), Some(Role::Dat))
        );
    }

    #[test]
    fn two_tokens_use_noname() {
        assert_eq!(
            triple("wbm_adr"),
            (InterfaceKind::Master, Some("wbm_noname".into()), Some(Role::Adr))
        );
    }

    #[test]
    fn last_alias_token_wins() {
        assert_eq!(
            triple("wbm_data_adr"),
            (InterfaceKind::Master, Some("data".into()), Some(Role::Adr))
        );
    }

    #[test]
    fn multi_token_interface_names_are_joined() {
        assert_eq!(
            triple("wbs_my_ctrl_stb_i"),
            (InterfaceKind::Slave, Some("my_ctrl".into()), Some(Role::Stb))
        );
    }

    #[test]
    fn clock_under_bus_prefix_is_promoted() {
        assert_eq!(
            triple("wbs_ctrl_clk"),
            (
                InterfaceKind::ClockReset,
                Some("wbs_ctrl_clockandreset".into()),
                Some(Role::Clk)
            )
        );
        assert_eq!(
            triple("wbs_rst"),
            (
                InterfaceKind::ClockReset,
                Some("wbs_noname_clockandreset".into()),
                Some(Role::Rst)
            )
        );
    }

    #[test]
    fn synthesized_clock_names() {
        assert_eq!(
            clock_interface_name(InterfaceKind::Slave, "CTRL"),
            "wbs_ctrl_clockandreset"
        );
        assert_eq!(
            clock_interface_name(InterfaceKind::Master, "wbm_noname"),
            "wbm_noname_clockandreset"
        );
    }

    #[test]
    fn wbc_prefix_keeps_its_name() {
        assert_eq!(
            triple("wbc_sys_clk_i"),
            (InterfaceKind::ClockReset, Some("sys".into()), Some(Role::Clk))
        );
    }

    #[test]
    fn two_token_gls_is_always_export() {
        assert_eq!(classify("gls_clk").kind, InterfaceKind::Export);
        assert_eq!(classify("gls_adr").role, Some(Role::Export));
        assert_eq!(classify("gls_tx").name.as_deref(), Some("export"));
    }

    #[test]
    fn longer_gls_names_group_by_middle_tokens() {
        assert_eq!(
            triple("gls_uart_tx"),
            (InterfaceKind::Export, Some("uart".into()), Some(Role::Export))
        );
    }

    #[test]
    fn unprefixed_clock_names() {
        assert_eq!(
            triple("clk_i"),
            (InterfaceKind::ClockReset, Some("default".into()), Some(Role::Clk))
        );
        assert_eq!(
            triple("data_in"),
            (InterfaceKind::Export, Some("export".into()), Some(Role::Export))
        );
    }

    #[test]
    fn unknown_roles() {
        assert_eq!(triple("wbs_ctrl_foo"), (InterfaceKind::Slave, None, None));
        assert_eq!(triple("wbc_adr"), (InterfaceKind::ClockReset, None, None));
        assert_eq!(triple("wbm"), (InterfaceKind::Master, None, None));
        assert!(!classify("wbs_irq").is_known());
    }

    #[test]
    fn strict_reports_unknown_signal() {
        let err = classify_strict("wbs_ctrl_irq").unwrap_err();
        assert_eq!(err.signal, "wbs_ctrl_irq");
        assert_eq!(err.to_string(), "Unknown signal 'wbs_ctrl_irq' for WBS interface");
        assert!(classify_strict("wbs_ctrl_ack_o").is_ok());
    }

    #[test]
    fn deterministic_and_total_over_alias_table() {
        for kind in [InterfaceKind::Master, InterfaceKind::Slave] {
            for (alias, role) in SIGNAL_ALIASES {
                let raw = format!("{}_bus_{}_x", kind.prefix(), alias);
                let first = classify(&raw);
                assert_eq!(first, classify(&raw));
                assert!(first.is_known(), "{raw} should classify");
                assert_eq!(first.role, Some(*role));
            }
        }
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("WbS_CtRl_AdR"), classify("wbs_ctrl_adr"));
    }
}
