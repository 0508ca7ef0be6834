//! Direction and completeness rules applied to a grouped interface.

use crate::kind::{Direction, InterfaceKind};
use crate::role::Role;

/// One port as seen by the role rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalUse {
    /// The port name.
    pub signal: String,
    /// The classified role.
    pub role: Role,
    /// The port direction.
    pub direction: Direction,
}

/// A broken role rule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoleViolation {
    /// A mandatory role has no port.
    #[error("missing mandatory signal {role}")]
    MissingRole {
        /// The absent role.
        role: Role,
    },
    /// A port's direction disagrees with the role table.
    #[error("signal '{signal}' ({role}) must be '{expected}', found '{found}'")]
    WrongDirection {
        /// The port name.
        signal: String,
        /// Its role.
        role: Role,
        /// The direction the table requires.
        expected: Direction,
        /// The direction the port has.
        found: Direction,
    },
    /// A role is carried by more than one port.
    #[error("signal '{signal}' duplicates role {role}")]
    DuplicateRole {
        /// The second port carrying the role.
        signal: String,
        /// The role.
        role: Role,
    },
    /// A role that the interface kind does not carry.
    #[error("signal '{signal}' has role {role}, not allowed in a {kind} interface")]
    UnexpectedRole {
        /// The port name.
        signal: String,
        /// Its role.
        role: Role,
        /// The interface kind.
        kind: InterfaceKind,
    },
    /// Clock and reset of one interface point in different directions.
    #[error("clock and reset signals must have the same direction")]
    MixedClockDirection,
}

/// Checks the ports of one interface against its kind's role table.
///
/// Export interfaces accept anything. Bus interfaces need every mandatory
/// role with the exact direction; `DAT` may appear once per direction.
/// Clock/reset interfaces need both roles pointing the same way.
pub fn check_signals(kind: InterfaceKind, signals: &[SignalUse]) -> Vec<RoleViolation> {
    let mut violations = Vec::new();
    if kind == InterfaceKind::Export {
        return violations;
    }

    let mut seen: Vec<(Role, Direction)> = Vec::new();
    for s in signals {
        let Some(spec) = kind.spec(s.role) else {
            violations.push(RoleViolation::UnexpectedRole {
                signal: s.signal.clone(),
                role: s.role,
                kind,
            });
            continue;
        };

        let duplicate = if kind.is_bus() && spec.direction == Direction::InOut {
            // A bidirectional port fills both data directions.
            seen.iter().any(|(r, d)| {
                *r == s.role
                    && (*d == s.direction || *d == Direction::InOut || s.direction == Direction::InOut)
            })
        } else {
            seen.iter().any(|(r, _)| *r == s.role)
        };
        if duplicate {
            violations.push(RoleViolation::DuplicateRole {
                signal: s.signal.clone(),
                role: s.role,
            });
            continue;
        }

        if spec.direction != Direction::InOut && s.direction != spec.direction {
            violations.push(RoleViolation::WrongDirection {
                signal: s.signal.clone(),
                role: s.role,
                expected: spec.direction,
                found: s.direction,
            });
        }
        seen.push((s.role, s.direction));
    }

    if kind == InterfaceKind::ClockReset {
        let mut directions = seen.iter().map(|(_, d)| *d);
        if let Some(first) = directions.next() {
            if directions.any(|d| d != first) {
                violations.push(RoleViolation::MixedClockDirection);
            }
        }
    }

    for spec in kind.roles().iter().filter(|s| s.required) {
        if !seen.iter().any(|(r, _)| *r == spec.role) {
            violations.push(RoleViolation::MissingRole { role: spec.role });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(signal: &str, role: Role, direction: Direction) -> SignalUse {
        SignalUse {
            signal: signal.to_string(),
            role,
            direction,
        }
    }

    fn full_slave() -> Vec<SignalUse> {
        vec![
            sig("wbs_adr_i", Role::Adr, Direction::In),
            sig("wbs_dat_i", Role::Dat, Direction::In),
            sig("wbs_dat_o", Role::Dat, Direction::Out),
            sig("wbs_we_i", Role::We, Direction::In),
            sig("wbs_ack_o", Role::Ack, Direction::Out),
            sig("wbs_cyc_i", Role::Cyc, Direction::In),
            sig("wbs_stb_i", Role::Stb, Direction::In),
        ]
    }

    #[test]
    fn complete_slave_passes() {
        assert!(check_signals(InterfaceKind::Slave, &full_slave()).is_empty());
    }

    #[test]
    fn read_only_slave_passes() {
        let mut signals = full_slave();
        signals.retain(|s| s.signal != "wbs_dat_i");
        assert!(check_signals(InterfaceKind::Slave, &signals).is_empty());
    }

    #[test]
    fn missing_ack_is_reported() {
        let mut signals = full_slave();
        signals.retain(|s| s.role != Role::Ack);
        assert_eq!(
            check_signals(InterfaceKind::Slave, &signals),
            vec![RoleViolation::MissingRole { role: Role::Ack }]
        );
    }

    #[test]
    fn wrong_direction_is_reported() {
        let mut signals = full_slave();
        signals[0].direction = Direction::Out;
        let v = check_signals(InterfaceKind::Slave, &signals);
        assert_eq!(v.len(), 1);
        assert!(matches!(
            v[0],
            RoleViolation::WrongDirection {
                role: Role::Adr,
                expected: Direction::In,
                found: Direction::Out,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_roles_are_reported() {
        let mut signals = full_slave();
        signals.push(sig("wbs_adr2_i", Role::Adr, Direction::In));
        signals.push(sig("wbs_dat2_o", Role::Dat, Direction::Out));
        let v = check_signals(InterfaceKind::Slave, &signals);
        assert_eq!(v.len(), 2);
        assert!(v
            .iter()
            .all(|x| matches!(x, RoleViolation::DuplicateRole { .. })));
    }

    #[test]
    fn clock_roles_on_a_bus_are_unexpected() {
        let mut signals = full_slave();
        signals.push(sig("wbs_irq", Role::Rst, Direction::In));
        let v = check_signals(InterfaceKind::Slave, &signals);
        assert!(matches!(v[0], RoleViolation::UnexpectedRole { .. }));
    }

    #[test]
    fn clock_pair_any_direction() {
        let inputs = vec![
            sig("clk", Role::Clk, Direction::In),
            sig("reset", Role::Rst, Direction::In),
        ];
        assert!(check_signals(InterfaceKind::ClockReset, &inputs).is_empty());

        let outputs = vec![
            sig("clk_o", Role::Clk, Direction::Out),
            sig("rst_o", Role::Rst, Direction::Out),
        ];
        assert!(check_signals(InterfaceKind::ClockReset, &outputs).is_empty());
    }

    #[test]
    fn clock_pair_mixed_direction() {
        let signals = vec![
            sig("clk", Role::Clk, Direction::In),
            sig("rst_o", Role::Rst, Direction::Out),
        ];
        assert_eq!(
            check_signals(InterfaceKind::ClockReset, &signals),
            vec![RoleViolation::MixedClockDirection]
        );
    }

    #[test]
    fn clock_without_reset() {
        let signals = vec![sig("clk", Role::Clk, Direction::In)];
        assert_eq!(
            check_signals(InterfaceKind::ClockReset, &signals),
            vec![RoleViolation::MissingRole { role: Role::Rst }]
        );
    }

    #[test]
    fn export_accepts_anything() {
        let signals = vec![sig("tx", Role::Export, Direction::Out)];
        assert!(check_signals(InterfaceKind::Export, &signals).is_empty());
    }

    #[test]
    fn violation_messages() {
        let v = RoleViolation::WrongDirection {
            signal: "wbm_ack".into(),
            role: Role::Ack,
            expected: Direction::In,
            found: Direction::Out,
        };
        assert_eq!(v.to_string(), "signal 'wbm_ack' (ACK) must be 'in', found 'out'");
    }
}
