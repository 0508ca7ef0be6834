//! Interfaces: ports of a top entity grouped by the classifier.

use orchestra_vhdl::{Entity, PortMode};
use orchestra_wishbone::{classify_strict, clock_interface_name, Direction, InterfaceKind, Role, SignalUse};

use crate::error::ComponentError;

/// A port as a member of an interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfacePort {
    /// The entity port name.
    pub port: String,
    /// Its role in the interface.
    pub role: Role,
    /// Its direction, from the entity port mode.
    pub direction: Direction,
}

/// A named group of ports of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    /// The interface name, lowercase.
    pub name: String,
    /// The interface kind.
    pub kind: InterfaceKind,
    /// For bus interfaces, the clock/reset interface that times it.
    pub clock: Option<String>,
    /// Member ports in entity order.
    pub ports: Vec<InterfacePort>,
}

impl Interface {
    /// The first port carrying `role`.
    pub fn port(&self, role: Role) -> Option<&InterfacePort> {
        self.ports.iter().find(|p| p.role == role)
    }

    /// The port carrying `role` in `direction`; a bidirectional port matches
    /// either direction.
    pub fn port_towards(&self, role: Role, direction: Direction) -> Option<&InterfacePort> {
        self.ports
            .iter()
            .filter(|p| p.role == role)
            .find(|p| p.direction == direction)
            .or_else(|| {
                self.ports
                    .iter()
                    .find(|p| p.role == role && p.direction == Direction::InOut)
            })
    }

    /// The ports as seen by the role rules.
    pub fn signal_uses(&self) -> Vec<SignalUse> {
        self.ports
            .iter()
            .map(|p| SignalUse {
                signal: p.port.clone(),
                role: p.role,
                direction: p.direction,
            })
            .collect()
    }
}

/// Maps an entity port mode onto an interface direction.
pub fn direction_of(mode: PortMode) -> Direction {
    match mode {
        PortMode::In => Direction::In,
        PortMode::Out | PortMode::Buffer => Direction::Out,
        PortMode::Inout | PortMode::Linkage => Direction::InOut,
    }
}

/// Classifies every port of `entity` and groups the ports into interfaces.
///
/// Interfaces come back in order of first appearance with their clock links
/// resolved. Unclassifiable ports and kind conflicts are returned as errors;
/// the offending ports are left out of the grouping.
pub fn group_ports(entity: &Entity) -> (Vec<Interface>, Vec<ComponentError>) {
    let mut interfaces: Vec<Interface> = Vec::new();
    let mut errors = Vec::new();

    for port in &entity.ports {
        let (kind, name, role) = match classify_strict(&port.name) {
            Ok(triple) => triple,
            Err(e) => {
                errors.push(ComponentError::Classify(e));
                continue;
            }
        };
        let member = InterfacePort {
            port: port.name.clone(),
            role,
            direction: direction_of(port.mode),
        };
        match interfaces.iter_mut().find(|i| i.name == name) {
            Some(existing) if existing.kind != kind => {
                errors.push(ComponentError::InterfaceKindConflict {
                    name,
                    first: existing.kind,
                    second: kind,
                });
            }
            Some(existing) => existing.ports.push(member),
            None => interfaces.push(Interface {
                name,
                kind,
                clock: None,
                ports: vec![member],
            }),
        }
    }

    link_clocks(&mut interfaces);
    (interfaces, errors)
}

/// Resolves the clock/reset interface of every bus interface.
///
/// A lone clock/reset interface times every bus; otherwise the one
/// synthesized from the bus interface's own name is used.
fn link_clocks(interfaces: &mut [Interface]) {
    let clocks: Vec<String> = interfaces
        .iter()
        .filter(|i| i.kind == InterfaceKind::ClockReset)
        .map(|i| i.name.clone())
        .collect();

    for iface in interfaces.iter_mut().filter(|i| i.kind.is_bus()) {
        iface.clock = match clocks.as_slice() {
            [only] => Some(only.clone()),
            _ => {
                let wanted = clock_interface_name(iface.kind, &iface.name);
                clocks.iter().find(|c| **c == wanted).cloned()
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestra_vhdl::parse_entity;

    fn entity(ports: &str) -> Entity {
        parse_entity(&format!("entity e is port ({ports}); end;")).unwrap()
    }

    #[test]
    fn groups_by_interface_name() {
        let e = entity(
            "clk_i, rst_i : in std_logic;
             wbs_ctrl_adr_i : in std_logic_vector(3 downto 0);
             wbs_ctrl_dat_o : out std_logic_vector(7 downto 0);
             wbs_ctrl_dat_i : in std_logic_vector(7 downto 0);
             tx : out std_logic",
        );
        let (ifaces, errors) = group_ports(&e);
        assert!(errors.is_empty());
        let names: Vec<_> = ifaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["default", "ctrl", "export"]);
        let ctrl = &ifaces[1];
        assert_eq!(ctrl.kind, InterfaceKind::Slave);
        assert_eq!(ctrl.clock.as_deref(), Some("default"));
        assert_eq!(ctrl.ports.len(), 3);
        assert_eq!(
            ctrl.port_towards(Role::Dat, Direction::Out).unwrap().port,
            "wbs_ctrl_dat_o"
        );
        assert_eq!(ifaces[2].clock, None);
    }

    #[test]
    fn several_clocks_link_by_name() {
        let e = entity(
            "wbs_a_clk, wbs_a_rst : in std_logic;
             wbs_a_adr : in std_logic_vector(1 downto 0);
             wbm_b_clk, wbm_b_rst : in std_logic;
             wbm_b_adr : out std_logic_vector(1 downto 0)",
        );
        let (ifaces, errors) = group_ports(&e);
        assert!(errors.is_empty());
        let a = ifaces.iter().find(|i| i.name == "a").unwrap();
        let b = ifaces.iter().find(|i| i.name == "b").unwrap();
        assert_eq!(a.clock.as_deref(), Some("wbs_a_clockandreset"));
        assert_eq!(b.clock.as_deref(), Some("wbm_b_clockandreset"));
    }

    #[test]
    fn unknown_signal_and_conflict_are_reported() {
        let e = entity(
            "wbs_x_irq : out std_logic;
             wbm_bus_adr : out std_logic_vector(1 downto 0);
             wbs_bus_ack : out std_logic",
        );
        let (ifaces, errors) = group_ports(&e);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ComponentError::Classify(_)));
        assert!(matches!(
            errors[1],
            ComponentError::InterfaceKindConflict { .. }
        ));
        assert_eq!(ifaces.len(), 1);
    }

    #[test]
    fn port_modes_map_to_directions() {
        assert_eq!(direction_of(PortMode::Buffer), Direction::Out);
        assert_eq!(direction_of(PortMode::Linkage), Direction::InOut);
        assert_eq!(direction_of(PortMode::In), Direction::In);
    }
}
