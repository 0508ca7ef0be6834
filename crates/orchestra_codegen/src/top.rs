//! The top-level design unit tying instances, interconnects and reset
//! synchronizers together.

use crate::error::GenerationError;
use crate::intercon::Intercon;
use crate::net::{interface_ports, PortInfo};
use crate::syscon::{syscon_entity, SYSCON};
use crate::vhdl::{Expr, Instantiation, Module, Signal};
use orchestra_common::InternalError;
use orchestra_project::{InterfaceRef, Linkage};
use orchestra_vhdl::{Entity, Port, PortMode, SubtypeIndication};
use orchestra_wishbone::{InterfaceKind, Role};
use std::collections::{BTreeMap, HashSet};

/// Name of the top-level reset input.
pub const RESET: &str = orchestra_project::RESET_INPUT;

/// Name of the top-level port carrying an exported signal.
pub fn export_name(instance: &str, port: &str, mode: PortMode) -> String {
    let way = match mode {
        PortMode::In => "to",
        PortMode::Out | PortMode::Buffer => "from",
        _ => "fromandto",
    };
    format!("{port}_{way}_{instance}")
}

/// Builds the top-level entity: the reset input, one input per clock domain
/// and one port per exported signal.
pub fn top_entity(linkage: &Linkage) -> Result<Entity, GenerationError> {
    let mut entity = Entity::new(&linkage.name);
    entity
        .ports
        .push(Port::new(RESET, PortMode::In, SubtypeIndication::logic()));
    for clock in &linkage.clocks {
        entity
            .ports
            .push(Port::new(&clock.name, PortMode::In, SubtypeIndication::logic()));
    }
    for iref in &linkage.externals {
        for p in ports_of(linkage, iref)? {
            entity.ports.push(Port::new(
                &export_name(&iref.instance, &p.port, p.mode),
                p.mode,
                p.ty,
            ));
        }
    }
    Ok(entity)
}

fn ports_of(linkage: &Linkage, iref: &InterfaceRef) -> Result<Vec<PortInfo>, GenerationError> {
    let (instance, iface) = linkage
        .resolve(iref)
        .ok_or_else(|| InternalError::new(format!("dangling interface reference '{iref}'")))?;
    interface_ports(instance, iface)
}

/// Builds the top-level module.
pub fn make_top(linkage: &Linkage, intercons: &[Intercon]) -> Result<Module, GenerationError> {
    let entity = top_entity(linkage)?;
    let mut module = Module::new(
        &format!("Top level of system '{}'", linkage.name),
        entity,
    );

    // Bus nets, one per port of every linked bus interface.
    let mut bused = HashSet::new();
    for wire in &linkage.wires {
        for iref in wire.masters.iter().chain(&wire.slaves) {
            bused.insert(iref.clone());
            for p in ports_of(linkage, iref)? {
                module.signal(Signal::new(&p.net, p.ty));
            }
        }
    }
    for clock in &linkage.clocks {
        module.signal(Signal::new(clock.sync_reset(), SubtypeIndication::logic()));
    }

    let mut seen = HashSet::new();
    for instance in &linkage.instances {
        let entity = instance.entity().ok_or_else(|| {
            InternalError::new(format!("instance '{}' has no entity", instance.name()))
        })?;
        if seen.insert(entity.name.clone()) {
            module.components.push(entity.clone());
        }
    }
    for intercon in intercons {
        module.components.push(intercon.module.entity.clone());
    }
    if !linkage.clocks.is_empty() {
        module.components.push(syscon_entity()?);
    }

    if !linkage.clocks.is_empty() {
        module.comment("Reset synchronizers");
    }
    for clock in &linkage.clocks {
        module.instantiate(Instantiation {
            label: format!("syscon_{}_i", clock.name),
            component: SYSCON.to_string(),
            generics: Vec::new(),
            ports: vec![
                ("clk".into(), Some(Expr::name(&clock.name))),
                ("reset_sync".into(), Some(Expr::name(clock.sync_reset()))),
                ("reset_ext".into(), Some(Expr::name(RESET))),
            ],
        });
    }

    if !intercons.is_empty() {
        module.comment("Interconnects");
    }
    for intercon in intercons {
        module.instantiate(intercon.instance.clone());
    }

    if !linkage.instances.is_empty() {
        module.comment("Components");
    }
    let externals: HashSet<&InterfaceRef> = linkage.externals.iter().collect();
    for instance in &linkage.instances {
        let mut actuals: BTreeMap<String, Expr> = BTreeMap::new();
        for iface in instance.interfaces() {
            let iref = InterfaceRef::new(instance.name(), &iface.name);
            match iface.kind {
                InterfaceKind::ClockReset => {
                    let Some(clock) = linkage.clock_of(&iref) else {
                        continue;
                    };
                    for p in &iface.ports {
                        let net = match p.role {
                            Role::Clk => clock.name.clone(),
                            Role::Rst => clock.sync_reset(),
                            _ => continue,
                        };
                        actuals.insert(p.port.to_ascii_lowercase(), Expr::name(net));
                    }
                }
                InterfaceKind::Master | InterfaceKind::Slave if bused.contains(&iref) => {
                    for p in interface_ports(instance, iface)? {
                        actuals.insert(p.port.to_ascii_lowercase(), Expr::name(&p.net));
                    }
                }
                InterfaceKind::Export if externals.contains(&iref) => {
                    for p in interface_ports(instance, iface)? {
                        let top = export_name(instance.name(), &p.port, p.mode);
                        actuals.insert(p.port.to_ascii_lowercase(), Expr::name(top));
                    }
                }
                _ => {}
            }
        }

        let entity = instance.entity().ok_or_else(|| {
            InternalError::new(format!("instance '{}' has no entity", instance.name()))
        })?;
        let generics = instance
            .overrides()
            .iter()
            .filter_map(|(name, value)| {
                entity
                    .generic(name)
                    .map(|g| (g.name.clone(), value.clone()))
            })
            .collect();
        let ports = entity
            .ports
            .iter()
            .map(|p| (p.name.clone(), actuals.remove(&p.name.to_ascii_lowercase())))
            .collect();
        module.instantiate(Instantiation {
            label: format!("{}_i", instance.name()),
            component: entity.name.clone(),
            generics,
            ports,
        });
    }

    tracing::debug!(
        "top '{}': {} instance(s), {} interconnect(s), {} clock domain(s)",
        linkage.name,
        linkage.instances.len(),
        intercons.len(),
        linkage.clocks.len()
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names_carry_direction() {
        assert_eq!(export_name("ram0", "gls_led", PortMode::Out), "gls_led_from_ram0");
        assert_eq!(export_name("uart", "gls_rx", PortMode::In), "gls_rx_to_uart");
        assert_eq!(export_name("io", "gls_pad", PortMode::Inout), "gls_pad_fromandto_io");
    }
}
