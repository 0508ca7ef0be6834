//! Derived linkage of a checked project.
//!
//! A [`Linkage`] is rebuilt from scratch by every [`crate::Project::check`]
//! and is only handed out when the check reported no error. Code generation
//! reads everything it needs from it.

use crate::address::AddressMap;
use crate::instance::Instance;
use orchestra_common::Frequency;
use orchestra_component::Interface;
use orchestra_config::ClockGenerator;
use orchestra_wishbone::InterfaceKind;
use std::fmt;

/// Name of the top-level reset input.
pub const RESET_INPUT: &str = "reset";

/// Names a clock domain cannot take, since every domain becomes a top-level
/// input and a testbench signal: the reset input and the reset timing
/// constants of the testbench.
pub const RESERVED_CLOCK_NAMES: [&str; 3] = [RESET_INPUT, "reset_on", "reset_off"];

/// Names one interface of one instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceRef {
    /// The instance name.
    pub instance: String,
    /// The interface name.
    pub interface: String,
}

impl InterfaceRef {
    /// Creates a reference, lowercasing both names.
    pub fn new(instance: &str, interface: &str) -> Self {
        Self {
            instance: instance.to_ascii_lowercase(),
            interface: interface.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.instance, self.interface)
    }
}

/// A wire with its attached interfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireLink {
    /// The wire name.
    pub name: String,
    /// The bus type tag.
    pub kind: String,
    /// Master interfaces in instance order.
    pub masters: Vec<InterfaceRef>,
    /// Slave interfaces in instance order.
    pub slaves: Vec<InterfaceRef>,
    /// The slave windows, for single-master wires whose geometry evaluated.
    pub address_map: Option<AddressMap>,
}

impl WireLink {
    pub(crate) fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            masters: Vec::new(),
            slaves: Vec::new(),
            address_map: None,
        }
    }

    /// The only master, if the wire has exactly one.
    pub fn single_master(&self) -> Option<&InterfaceRef> {
        match self.masters.as_slice() {
            [master] => Some(master),
            _ => None,
        }
    }
}

/// A clock domain with the clock/reset interfaces it drives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockLink {
    /// The domain name, also the top-level clock input.
    pub name: String,
    /// The clock frequency.
    pub frequency: Frequency,
    /// How the clock is produced.
    pub generator: ClockGenerator,
    /// Clock/reset interfaces in instance order.
    pub interfaces: Vec<InterfaceRef>,
}

impl ClockLink {
    /// Name of the domain's synchronous reset net.
    pub fn sync_reset(&self) -> String {
        format!("{}_sync_reset", self.name)
    }
}

/// The resolved structure of a project.
#[derive(Clone, Debug)]
pub struct Linkage {
    /// The project name.
    pub name: String,
    /// Instances in project order.
    pub instances: Vec<Instance>,
    /// Wires in project order.
    pub wires: Vec<WireLink>,
    /// Clock domains in project order.
    pub clocks: Vec<ClockLink>,
    /// Export interfaces, routed to top-level ports.
    pub externals: Vec<InterfaceRef>,
}

impl Linkage {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            instances: Vec::new(),
            wires: Vec::new(),
            clocks: Vec::new(),
            externals: Vec::new(),
        }
    }

    /// Looks up an instance by name.
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances
            .iter()
            .find(|i| i.name().eq_ignore_ascii_case(name))
    }

    /// Looks up a wire by name.
    pub fn wire(&self, name: &str) -> Option<&WireLink> {
        self.wires.iter().find(|w| w.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a clock domain by name.
    pub fn clock(&self, name: &str) -> Option<&ClockLink> {
        self.clocks.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Resolves a reference to its instance and interface.
    pub fn resolve(&self, iref: &InterfaceRef) -> Option<(&Instance, &Interface)> {
        let instance = self.instance(&iref.instance)?;
        let interface = instance.interface(&iref.interface)?;
        Some((instance, interface))
    }

    /// The clock domain driving `iref`.
    ///
    /// For a clock/reset interface this is the domain it links to; for a bus
    /// interface it is the domain of its associated clock/reset interface.
    pub fn clock_of(&self, iref: &InterfaceRef) -> Option<&ClockLink> {
        let (instance, interface) = self.resolve(iref)?;
        let clock_iface = match interface.kind {
            InterfaceKind::ClockReset => interface.name.clone(),
            _ => interface.clock.clone()?,
        };
        let target = InterfaceRef::new(instance.name(), &clock_iface);
        self.clocks.iter().find(|c| c.interfaces.contains(&target))
    }

    /// The slowest clock frequency, used to size the testbench reset pulse.
    pub fn min_frequency(&self) -> Option<Frequency> {
        self.clocks.iter().map(|c| c.frequency).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_lowercase() {
        let r = InterfaceRef::new("CPU0", "Mem");
        assert_eq!(r.to_string(), "cpu0.mem");
    }

    #[test]
    fn single_master() {
        let mut wire = WireLink::new("main", "wishbone");
        assert!(wire.single_master().is_none());
        wire.masters.push(InterfaceRef::new("cpu0", "mem"));
        assert_eq!(wire.single_master().unwrap().instance, "cpu0");
        wire.masters.push(InterfaceRef::new("dma0", "mem"));
        assert!(wire.single_master().is_none());
    }

    #[test]
    fn sync_reset_net_name() {
        let clock = ClockLink {
            name: "sys".into(),
            frequency: Frequency::new(50_000_000),
            generator: ClockGenerator::Static,
            interfaces: Vec::new(),
        };
        assert_eq!(clock.sync_reset(), "sys_sync_reset");
    }

    #[test]
    fn min_frequency() {
        let mut linkage = Linkage::new("soc");
        assert!(linkage.min_frequency().is_none());
        for (name, hz) in [("fast", 100_000_000), ("slow", 25_000_000)] {
            linkage.clocks.push(ClockLink {
                name: name.into(),
                frequency: Frequency::new(hz),
                generator: ClockGenerator::Static,
                interfaces: Vec::new(),
            });
        }
        assert_eq!(linkage.min_frequency(), Some(Frequency::new(25_000_000)));
        assert_eq!(linkage.clock("FAST").unwrap().name, "fast");
    }
}
