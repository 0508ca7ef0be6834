//! Evaluated interface ports and the names of the nets they connect to.

use crate::error::GenerationError;
use crate::vhdl::normalized;
use orchestra_common::InternalError;
use orchestra_component::Interface;
use orchestra_project::Instance;
use orchestra_vhdl::{PortMode, SubtypeIndication};
use orchestra_wishbone::{Direction, Role};

/// A component port with its width evaluated under the instance generics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortInfo {
    /// The component port name.
    pub port: String,
    /// The role inside its interface.
    pub role: Role,
    /// The direction seen from the component.
    pub direction: Direction,
    /// The declared mode.
    pub mode: PortMode,
    /// Number of bits.
    pub width: u64,
    /// `true` for a port declared without index constraint.
    pub scalar: bool,
    /// The declared subtype with a literal range.
    pub ty: SubtypeIndication,
    /// The top-level net connected to the port.
    pub net: String,
}

/// Name of the top-level net attached to `port` of `instance`.
pub fn net_name(instance: &str, port: &str) -> String {
    format!("{instance}_{port}")
}

/// Evaluates every port of `iface`.
pub fn interface_ports(
    instance: &Instance,
    iface: &Interface,
) -> Result<Vec<PortInfo>, GenerationError> {
    let entity = instance.entity().ok_or_else(|| {
        InternalError::new(format!("instance '{}' has no entity", instance.name()))
    })?;
    iface
        .ports
        .iter()
        .map(|p| -> Result<PortInfo, GenerationError> {
            let decl = entity.port(&p.port).ok_or_else(|| {
                InternalError::new(format!(
                    "port '{}' missing from entity '{}'",
                    p.port, entity.name
                ))
            })?;
            let width = instance.port_width(&decl.name)?;
            Ok(PortInfo {
                port: decl.name.clone(),
                role: p.role,
                direction: p.direction,
                mode: decl.mode,
                width,
                scalar: !decl.is_vector(),
                ty: normalized(&decl.ty, width),
                net: net_name(instance.name(), &decl.name),
            })
        })
        .collect()
}

/// The port carrying `role` in `direction`.
///
/// A bidirectional port is refused for the data role, which the
/// interconnect drives and reads through separate ports.
pub fn find_port<'a>(
    ports: &'a [PortInfo],
    role: Role,
    direction: Direction,
    owner: &str,
) -> Result<Option<&'a PortInfo>, GenerationError> {
    if let Some(p) = ports
        .iter()
        .find(|p| p.role == role && p.direction == Direction::InOut)
    {
        return Err(GenerationError::Bidirectional {
            interface: owner.to_string(),
            port: p.port.clone(),
        });
    }
    Ok(ports
        .iter()
        .find(|p| p.role == role && p.direction == direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(port: &str, role: Role, direction: Direction) -> PortInfo {
        PortInfo {
            port: port.into(),
            role,
            direction,
            mode: PortMode::In,
            width: 8,
            scalar: false,
            ty: SubtypeIndication::vector(8),
            net: net_name("u0", port),
        }
    }

    #[test]
    fn nets_are_prefixed_by_instance() {
        assert_eq!(net_name("ram0", "wbs_adr_i"), "ram0_wbs_adr_i");
    }

    #[test]
    fn find_by_direction() {
        let ports = vec![
            info("dat_i", Role::Dat, Direction::In),
            info("dat_o", Role::Dat, Direction::Out),
        ];
        let p = find_port(&ports, Role::Dat, Direction::Out, "u0.bus").unwrap();
        assert_eq!(p.unwrap().port, "dat_o");
        assert!(find_port(&ports, Role::Adr, Direction::In, "u0.bus")
            .unwrap()
            .is_none());
    }

    #[test]
    fn bidirectional_data_is_refused() {
        let ports = vec![info("dat", Role::Dat, Direction::InOut)];
        assert!(matches!(
            find_port(&ports, Role::Dat, Direction::In, "u0.bus"),
            Err(GenerationError::Bidirectional { .. })
        ));
    }
}
