//! Combinational interconnect between one master and the slaves of a wire.
//!
//! The interconnect decodes the master address into one select line per
//! slave, gates the control and write-data paths with it, OR-reduces the
//! acknowledges and multiplexes read data byte lane by byte lane. Byte lane
//! enables are derived per slave data width as `master_sel<bits>` signals:
//! a slave wider than the master combines the master byte selects with the
//! low address bits that pick the lane.

use crate::error::GenerationError;
use crate::net::{find_port, interface_ports, PortInfo};
use crate::vhdl::{logic_type, Expr, Instantiation, Module, Signal, Statement};
use orchestra_common::InternalError;
use orchestra_project::{AddressMap, InterfaceRef, Linkage, WireLink};
use orchestra_vhdl::{Entity, Port, PortMode};
use orchestra_wishbone::{Direction, Role};

/// A generated interconnect and its instantiation in the top level.
#[derive(Clone, Debug)]
pub struct Intercon {
    /// The interconnect design unit.
    pub module: Module,
    /// Its instantiation, mapping every port onto the top-level nets.
    pub instance: Instantiation,
}

/// Name of the interconnect unit of `wire`.
pub fn intercon_name(wire: &str) -> String {
    format!("intercon_{wire}")
}

const MASTER_PREFIX: &str = "wbs_master";

struct Side {
    label: String,
    ports: Vec<PortInfo>,
}

impl Side {
    fn port(&self, role: Role, direction: Direction) -> Result<Option<&PortInfo>, GenerationError> {
        find_port(&self.ports, role, direction, &self.label)
    }
}

fn resolve(linkage: &Linkage, iref: &InterfaceRef) -> Result<Side, GenerationError> {
    let (instance, iface) = linkage
        .resolve(iref)
        .ok_or_else(|| InternalError::new(format!("dangling interface reference '{iref}'")))?;
    Ok(Side {
        label: iref.to_string(),
        ports: interface_ports(instance, iface)?,
    })
}

/// The intercon-side name of a master port: `wbs_master_<role>_<i|o>`,
/// suffixed from the interconnect's point of view.
fn master_port_name(p: &PortInfo) -> String {
    let suffix = if p.direction == Direction::In { "o" } else { "i" };
    format!("{MASTER_PREFIX}_{}_{suffix}", p.role.name().to_ascii_lowercase())
}

fn flipped(mode: PortMode) -> PortMode {
    match mode {
        PortMode::In => PortMode::Out,
        PortMode::Out | PortMode::Buffer => PortMode::In,
        other => other,
    }
}

/// One bit of a port, whether it is declared as a vector or a scalar.
fn bit(name: &str, scalar: bool, index: u64) -> Expr {
    if scalar {
        Expr::name(name)
    } else {
        Expr::Index(name.to_string(), index)
    }
}

/// `master_sel<bits>` signals for every slave byte count up to `max_bytes`.
struct LaneSelects {
    master_bytes: u64,
}

impl LaneSelects {
    fn name(bytes: u64) -> String {
        format!("master_sel{}", bytes * 8)
    }

    fn lane(bytes: u64, index: u64) -> Expr {
        if bytes == 1 {
            Expr::name(Self::name(1))
        } else {
            Expr::Index(Self::name(bytes), index)
        }
    }

    /// The enable of master byte lane `lane`, `None` when always enabled.
    fn master_lane(&self, sel: Option<&PortInfo>, lane: u64) -> Option<Expr> {
        let sel = sel?;
        let name = master_port_name(sel);
        if sel.scalar {
            return Some(Expr::name(name));
        }
        let index = if sel.width >= self.master_bytes {
            lane
        } else {
            lane * sel.width / self.master_bytes
        };
        Some(Expr::Index(name, index))
    }
}

/// Generates the interconnect of a single-master wire.
pub fn make_intercon(linkage: &Linkage, wire: &WireLink) -> Result<Intercon, GenerationError> {
    let master_ref = wire.single_master().ok_or_else(|| GenerationError::MultiMaster {
        wire: wire.name.clone(),
        masters: wire.masters.len(),
    })?;
    let map = wire.address_map.as_ref().ok_or_else(|| {
        InternalError::new(format!("wire '{}' has no address map", wire.name))
    })?;
    let master = resolve(linkage, master_ref)?;
    let slaves = map
        .windows
        .iter()
        .map(|w| resolve(linkage, &InterfaceRef::new(&w.instance, &w.interface)))
        .collect::<Result<Vec<_>, _>>()?;

    let name = intercon_name(&wire.name);
    let mut entity = Entity::new(&name);
    let mut instance = Instantiation {
        label: format!("{name}_i"),
        component: name.clone(),
        generics: Vec::new(),
        ports: Vec::new(),
    };
    for p in &master.ports {
        let port = master_port_name(p);
        entity
            .ports
            .push(Port::new(&port, flipped(p.mode), p.ty.clone()));
        instance.ports.push((port, Some(Expr::name(&p.net))));
    }
    for p in slaves.iter().flat_map(|s| &s.ports) {
        entity
            .ports
            .push(Port::new(&p.net, flipped(p.mode), p.ty.clone()));
        instance.ports.push((p.net.clone(), Some(Expr::name(&p.net))));
    }

    let mut module = Module::new(
        &format!("Wishbone interconnect for wire '{}'", wire.name),
        entity,
    );
    let selects: Vec<Expr> = (0..slaves.len() as u64)
        .map(|i| bit("slave_sel", slaves.len() == 1, i))
        .collect();
    module.signal(Signal::new(
        "slave_sel",
        logic_type(slaves.len() as u64, true),
    ));

    byte_selects(&mut module, map, &master)?;
    decoders(&mut module, map, &master, &slaves, &selects)?;
    control(&mut module, &master, &slaves, &selects)?;
    datapath(&mut module, map, &master, &slaves, &selects)?;

    tracing::debug!(
        "intercon '{name}': {} slave(s), {} port(s)",
        slaves.len(),
        module.entity.ports.len()
    );
    Ok(Intercon { module, instance })
}

fn byte_selects(module: &mut Module, map: &AddressMap, master: &Side) -> Result<(), GenerationError> {
    let lanes = LaneSelects {
        master_bytes: map.master.bytes(),
    };
    let sel = master.port(Role::Sel, Direction::Out)?;
    let adr = master.port(Role::Adr, Direction::Out)?;
    let widest = map
        .windows
        .iter()
        .map(|w| w.geometry.bytes())
        .max()
        .unwrap_or(1);

    module.comment("Byte selection signals");
    let mut bytes = 1;
    while bytes <= widest {
        let name = LaneSelects::name(bytes);
        module.signal(Signal::new(&name, logic_type(bytes, true)));
        for index in 0..bytes {
            let value = if bytes > lanes.master_bytes {
                let lane = lanes.master_lane(sel, index % lanes.master_bytes);
                let word = index / lanes.master_bytes;
                let lane_bits = (bytes / lanes.master_bytes).trailing_zeros() as u64;
                let mut terms: Vec<Expr> = lane.into_iter().collect();
                for b in 0..lane_bits {
                    let a = match adr {
                        Some(a) => bit(&master_port_name(a), a.scalar, b),
                        None => {
                            return Err(InternalError::new(format!(
                                "master '{}' has no address bus",
                                master.label
                            ))
                            .into())
                        }
                    };
                    terms.push(if (word >> b) & 1 == 1 { a } else { a.negate() });
                }
                match terms.len() {
                    0 => Expr::Bit(true),
                    1 => terms.remove(0),
                    _ => Expr::And(terms),
                }
            } else {
                lanes
                    .master_lane(sel, index)
                    .unwrap_or(Expr::Bit(true))
            };
            module.push(Statement::assign(LaneSelects::lane(bytes, index), value));
        }
        bytes *= 2;
    }
    Ok(())
}

fn decoders(
    module: &mut Module,
    map: &AddressMap,
    master: &Side,
    slaves: &[Side],
    selects: &[Expr],
) -> Result<(), GenerationError> {
    let adr = master.port(Role::Adr, Direction::Out)?;
    let adr_name = adr.map(master_port_name).unwrap_or_default();
    let adr_scalar = adr.is_some_and(|a| a.scalar);

    module.comment("Address decoders");
    for (i, window) in map.windows.iter().enumerate() {
        let d = map.decode(i).ok_or_else(|| {
            InternalError::new(format!("slave '{window}' does not fit the master address bus"))
        })?;
        let select = selects[i].clone();
        if d.width == 0 {
            module.push(Statement::assign(select, Expr::Bit(true)));
            continue;
        }
        let compare = if adr_scalar {
            Expr::Eq(
                Box::new(Expr::name(&adr_name)),
                Box::new(Expr::Bit(d.value & 1 == 1)),
            )
        } else {
            let high = map.master.address_width - 1;
            Expr::Eq(
                Box::new(Expr::Slice(adr_name.clone(), high, u64::from(d.low))),
                Box::new(Expr::Bits(d.bits())),
            )
        };
        module.push(Statement::gated(select, Expr::Bit(true), compare, Expr::Bit(false)));
    }

    for ((window, slave), select) in map.windows.iter().zip(slaves).zip(selects) {
        let Some(slave_adr) = slave.port(Role::Adr, Direction::In)? else {
            continue;
        };
        let width = window.geometry.address_width;
        if width == 0 {
            continue;
        }
        let low = u64::from(window.lane_bits);
        let value = if adr_scalar {
            Expr::name(&adr_name)
        } else if slave_adr.scalar {
            Expr::Index(adr_name.clone(), low)
        } else {
            Expr::Slice(adr_name.clone(), low + width - 1, low)
        };
        module.push(Statement::gated(
            Expr::name(&slave_adr.net),
            value,
            select.clone().is_high(),
            Expr::zero_of(&slave_adr.ty),
        ));
    }
    Ok(())
}

fn control(
    module: &mut Module,
    master: &Side,
    slaves: &[Side],
    selects: &[Expr],
) -> Result<(), GenerationError> {
    module.comment("Control signals");
    if let Some(ack) = master.port(Role::Ack, Direction::In)? {
        let mut branches = Vec::new();
        for (slave, select) in slaves.iter().zip(selects) {
            let value = match slave.port(Role::Ack, Direction::Out)? {
                Some(a) => Expr::name(&a.net),
                None => Expr::Bit(true),
            };
            branches.push((value, select.clone().is_high()));
        }
        module.push(Statement::Conditional {
            target: Expr::name(master_port_name(ack)),
            branches,
            default: Expr::Bit(false),
        });
    }

    for (slave, select) in slaves.iter().zip(selects) {
        for role in [Role::Cyc, Role::We, Role::Stb] {
            let (Some(from), Some(to)) = (
                master.port(role, Direction::Out)?,
                slave.port(role, Direction::In)?,
            ) else {
                continue;
            };
            module.push(Statement::gated(
                Expr::name(&to.net),
                Expr::name(master_port_name(from)),
                select.clone().is_high(),
                Expr::Bit(false),
            ));
        }
    }
    Ok(())
}

fn datapath(
    module: &mut Module,
    map: &AddressMap,
    master: &Side,
    slaves: &[Side],
    selects: &[Expr],
) -> Result<(), GenerationError> {
    module.comment("Datapath");

    for ((window, slave), select) in map.windows.iter().zip(slaves).zip(selects) {
        let Some(sel) = slave.port(Role::Sel, Direction::In)? else {
            continue;
        };
        let bytes = window.geometry.bytes();
        let (target, value) = slave_byte_select(sel, bytes);
        module.push(Statement::gated(
            target,
            value,
            select.clone().is_high(),
            if sel.scalar || sel.width == 1 {
                Expr::Bit(false)
            } else {
                Expr::Zeros
            },
        ));
    }

    let write = master.port(Role::Dat, Direction::Out)?;
    for (slave, select) in slaves.iter().zip(selects) {
        let (Some(from), Some(to)) = (write, slave.port(Role::Dat, Direction::In)?) else {
            continue;
        };
        let source = master_port_name(from);
        let value = if to.width > from.width && from.width > 0 {
            if to.width % from.width != 0 {
                return Err(InternalError::new(format!(
                    "'{}' ({} bits) is not a multiple of the master data bus ({} bits)",
                    to.net, to.width, from.width
                ))
                .into());
            }
            let copies = to.width / from.width;
            Expr::Concat((0..copies).map(|_| Expr::name(&source)).collect())
        } else if to.width < from.width {
            if to.scalar {
                Expr::Index(source, 0)
            } else {
                Expr::Slice(source, to.width.saturating_sub(1), 0)
            }
        } else {
            Expr::name(source)
        };
        module.push(Statement::gated(
            Expr::name(&to.net),
            value,
            select.clone().is_high(),
            Expr::zero_of(&to.ty),
        ));
    }

    let Some(read) = master.port(Role::Dat, Direction::In)? else {
        return Ok(());
    };
    let target_name = master_port_name(read);
    let master_bytes = map.master.bytes();
    for lane in 0..master_bytes {
        let target = if master_bytes == 1 {
            Expr::name(&target_name)
        } else {
            Expr::Slice(target_name.clone(), lane * 8 + 7, lane * 8)
        };
        let mut branches = Vec::new();
        for ((window, slave), select) in map.windows.iter().zip(slaves).zip(selects) {
            let Some(data) = slave.port(Role::Dat, Direction::Out)? else {
                continue;
            };
            let bytes = window.geometry.bytes();
            let mut index = lane;
            while index < bytes {
                let value = if bytes == 1 {
                    Expr::name(&data.net)
                } else {
                    Expr::Slice(data.net.clone(), index * 8 + 7, index * 8)
                };
                let cond = Expr::And(vec![
                    select.clone().is_high(),
                    LaneSelects::lane(bytes, index).is_high(),
                ]);
                branches.push((value, cond));
                index += master_bytes;
            }
        }
        let default = if master_bytes == 1 {
            Expr::zero_of(&read.ty)
        } else {
            Expr::Zeros
        };
        module.push(Statement::Conditional {
            target,
            branches,
            default,
        });
    }
    Ok(())
}

/// The byte enables of a slave: its `master_sel<bits>` lanes, OR-ed
/// together when the slave has fewer select bits than byte lanes.
fn slave_byte_select(sel: &PortInfo, bytes: u64) -> (Expr, Expr) {
    let target = Expr::name(&sel.net);
    if sel.scalar || sel.width == 1 {
        let lanes: Vec<Expr> = (0..bytes).map(|i| LaneSelects::lane(bytes, i)).collect();
        let value = if lanes.len() == 1 {
            lanes.into_iter().next().unwrap_or(Expr::Bit(true))
        } else {
            Expr::Or(lanes)
        };
        let target = if sel.scalar {
            target
        } else {
            Expr::Index(sel.net.clone(), 0)
        };
        return (target, value);
    }
    if sel.width >= bytes {
        let lanes: Vec<Expr> = (0..sel.width.min(bytes))
            .rev()
            .map(|i| LaneSelects::lane(bytes, i))
            .collect();
        return (target, Expr::Concat(lanes));
    }
    let step = bytes / sel.width;
    let groups = (0..sel.width)
        .rev()
        .map(|g| Expr::Or((0..step).map(|j| LaneSelects::lane(bytes, g * step + j)).collect()))
        .collect();
    (target, Expr::Concat(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestra_vhdl::SubtypeIndication;

    fn sel_port(width: u64, scalar: bool) -> PortInfo {
        PortInfo {
            port: "wbs_sel_i".into(),
            role: Role::Sel,
            direction: Direction::In,
            mode: PortMode::In,
            width,
            scalar,
            ty: if scalar {
                SubtypeIndication::logic()
            } else {
                SubtypeIndication::vector(width)
            },
            net: "ram0_wbs_sel_i".into(),
        }
    }

    #[test]
    fn master_port_names_flip_direction() {
        let mut p = sel_port(1, true);
        p.role = Role::Dat;
        p.direction = Direction::In;
        assert_eq!(master_port_name(&p), "wbs_master_dat_o");
        p.direction = Direction::Out;
        assert_eq!(master_port_name(&p), "wbs_master_dat_i");
        assert_eq!(intercon_name("main"), "intercon_main");
    }

    #[test]
    fn byte_select_per_lane() {
        let (target, value) = slave_byte_select(&sel_port(4, false), 4);
        assert_eq!(target.to_string(), "ram0_wbs_sel_i");
        assert_eq!(
            value.to_string(),
            "master_sel32(3) & master_sel32(2) & master_sel32(1) & master_sel32(0)"
        );
    }

    #[test]
    fn byte_select_grouped() {
        let (_, value) = slave_byte_select(&sel_port(2, false), 4);
        assert_eq!(
            value.to_string(),
            "(master_sel32(2) or master_sel32(3)) & (master_sel32(0) or master_sel32(1))"
        );
    }

    #[test]
    fn byte_select_scalar() {
        let (target, value) = slave_byte_select(&sel_port(1, true), 1);
        assert_eq!(target.to_string(), "ram0_wbs_sel_i");
        assert_eq!(value.to_string(), "master_sel8");
    }

    #[test]
    fn master_lane_enables() {
        let lanes = LaneSelects { master_bytes: 4 };
        let mut sel = sel_port(4, false);
        sel.direction = Direction::Out;
        assert_eq!(
            lanes.master_lane(Some(&sel), 2).unwrap().to_string(),
            "wbs_master_sel_i(2)"
        );
        sel.width = 2;
        assert_eq!(
            lanes.master_lane(Some(&sel), 3).unwrap().to_string(),
            "wbs_master_sel_i(1)"
        );
        assert!(lanes.master_lane(None, 0).is_none());
    }
}
