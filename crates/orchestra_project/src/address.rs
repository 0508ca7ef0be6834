//! Address windows of the slaves on a single-master wire.
//!
//! Addresses are counted in master words. A slave with an `n`-bit address
//! bus occupies `2^n` master addresses when both data paths have the same
//! width; a slave `2^k` times wider than its master additionally consumes
//! `k` low address bits as lane selectors. The slave is selected when the
//! master address bits above its window equal the same bits of its offset.

use crate::error::ProjectError;
use crate::instance::Instance;
use orchestra_component::Interface;
use orchestra_wishbone::Role;
use std::fmt;

/// Widest supported master address bus.
pub const MAX_ADDRESS_WIDTH: u64 = 64;

/// Address and data widths of one bus interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusGeometry {
    /// Width of the ADR bus, 0 without one.
    pub address_width: u64,
    /// Widest DAT bus, 0 without one.
    pub data_width: u64,
}

impl BusGeometry {
    /// Evaluates the geometry of `iface` under `instance`'s generics.
    pub fn of(instance: &Instance, iface: &Interface) -> Result<Self, ProjectError> {
        let address_width = match iface.port(Role::Adr) {
            Some(p) => instance.port_width(&p.port)?,
            None => 0,
        };
        let mut data_width = 0;
        for p in iface.ports.iter().filter(|p| p.role == Role::Dat) {
            data_width = data_width.max(instance.port_width(&p.port)?);
        }
        Ok(Self {
            address_width,
            data_width,
        })
    }

    /// Number of byte lanes; a bus narrower than a byte counts as one lane.
    pub fn bytes(&self) -> u64 {
        (self.data_width / 8).max(1)
    }
}

/// One slave's place in the master's address space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlaveWindow {
    /// The slave instance.
    pub instance: String,
    /// The slave interface.
    pub interface: String,
    /// Base address, in master words.
    pub offset: u64,
    /// The slave's geometry.
    pub geometry: BusGeometry,
    /// Low master address bits used as lane selectors.
    pub lane_bits: u32,
}

impl SlaveWindow {
    /// Lowest master address bit compared by the decoder.
    pub fn decode_low(&self) -> u64 {
        self.geometry.address_width + u64::from(self.lane_bits)
    }

    /// Number of master addresses the window covers.
    pub fn span(&self) -> u128 {
        u32::try_from(self.decode_low())
            .ok()
            .and_then(|bits| 1u128.checked_shl(bits))
            .unwrap_or(0)
    }

    /// One past the last address of the window.
    pub fn end(&self) -> u128 {
        u128::from(self.offset) + self.span()
    }
}

impl fmt::Display for SlaveWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.instance, self.interface)
    }
}

/// The comparison that selects one slave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decode {
    /// Lowest compared master address bit.
    pub low: u32,
    /// Number of compared bits; 0 means the slave is always selected.
    pub width: u32,
    /// The value the compared bits must hold.
    pub value: u64,
}

impl Decode {
    /// The compare value as a VHDL binary literal body, MSB first.
    pub fn bits(&self) -> String {
        (0..self.width)
            .rev()
            .map(|i| if (self.value >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// The slave windows of one single-master wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressMap {
    /// The wire name.
    pub wire: String,
    /// The master's geometry.
    pub master: BusGeometry,
    /// Slave windows in link order.
    pub windows: Vec<SlaveWindow>,
}

impl AddressMap {
    /// Creates an empty map for a master of the given geometry.
    pub fn new(wire: &str, master: BusGeometry) -> Self {
        Self {
            wire: wire.to_string(),
            master,
            windows: Vec::new(),
        }
    }

    /// Adds a slave, returning an error message when its data path cannot
    /// be lane-matched with the master's.
    ///
    /// Data paths of different widths must both be whole bytes, so that one
    /// is a power-of-two multiple of the other.
    pub fn add_slave(
        &mut self,
        instance: &str,
        interface: &str,
        offset: u64,
        geometry: BusGeometry,
    ) -> Result<(), String> {
        let (slave, master) = (geometry.data_width, self.master.data_width);
        if slave != master && slave != 0 && master != 0 && (slave % 8 != 0 || master % 8 != 0) {
            return Err(format!(
                "Wire '{}': slave '{instance}.{interface}' data width {slave} cannot be matched with the master's {master}; differing widths must be whole bytes.",
                self.wire
            ));
        }
        let (wide, narrow) = if geometry.bytes() >= self.master.bytes() {
            (geometry.bytes(), self.master.bytes())
        } else {
            (self.master.bytes(), geometry.bytes())
        };
        let ratio = wide / narrow;
        if wide % narrow != 0 || !ratio.is_power_of_two() {
            return Err(format!(
                "Wire '{}': slave '{instance}.{interface}' data width {} cannot be matched with the master's {}.",
                self.wire, geometry.data_width, self.master.data_width
            ));
        }
        let lane_bits = if geometry.bytes() > self.master.bytes() {
            ratio.trailing_zeros()
        } else {
            0
        };
        self.windows.push(SlaveWindow {
            instance: instance.to_string(),
            interface: interface.to_string(),
            offset,
            geometry,
            lane_bits,
        });
        Ok(())
    }

    /// The decode comparison of window `index`, if it fits the master.
    pub fn decode(&self, index: usize) -> Option<Decode> {
        let window = self.windows.get(index)?;
        let low = window.decode_low();
        if low > self.master.address_width || self.master.address_width > 64 {
            return None;
        }
        let width = (self.master.address_width - low) as u32;
        let value = window.offset.checked_shr(low as u32).unwrap_or(0);
        Some(Decode {
            low: low as u32,
            width,
            value,
        })
    }

    /// Indices of the windows the decoder selects for a master address.
    ///
    /// This evaluates the same comparisons the interconnect implements.
    pub fn select(&self, address: u64) -> Vec<usize> {
        if self.master.address_width < 64 && address >> self.master.address_width != 0 {
            return Vec::new();
        }
        (0..self.windows.len())
            .filter(|&i| {
                self.decode(i).is_some_and(|d| {
                    let bits = address.checked_shr(d.low).unwrap_or(0);
                    let mask = 1u64.checked_shl(d.width).map_or(u64::MAX, |m| m - 1);
                    bits & mask == d.value & mask
                })
            })
            .collect()
    }

    /// Checks widths, alignment, bounds and overlap of every window.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.master.address_width > MAX_ADDRESS_WIDTH {
            errors.push(format!(
                "Wire '{}': master address bus ({} bits) is wider than {MAX_ADDRESS_WIDTH} bits.",
                self.wire, self.master.address_width
            ));
            return errors;
        }
        let limit = 1u128 << self.master.address_width;

        for w in &self.windows {
            if w.geometry.address_width > self.master.address_width {
                errors.push(format!(
                    "Wire '{}': slave '{w}' address bus ({} bits) is wider than the master's ({} bits).",
                    self.wire, w.geometry.address_width, self.master.address_width
                ));
                continue;
            }
            if w.decode_low() > self.master.address_width {
                errors.push(format!(
                    "Wire '{}': slave '{w}' needs {} address bits, the master has {}.",
                    self.wire,
                    w.decode_low(),
                    self.master.address_width
                ));
                continue;
            }
            if u128::from(w.offset) % w.span() != 0 {
                errors.push(format!(
                    "Wire '{}': slave '{w}' offset 0x{:x} is not aligned to its window size 0x{:x}.",
                    self.wire,
                    w.offset,
                    w.span()
                ));
            }
            if w.end() > limit {
                errors.push(format!(
                    "Wire '{}': slave '{w}' window 0x{:x}-0x{:x} exceeds the master address space.",
                    self.wire,
                    w.offset,
                    w.end() - 1
                ));
            }
        }

        for (i, a) in self.windows.iter().enumerate() {
            for b in &self.windows[i + 1..] {
                if u128::from(a.offset) < b.end() && u128::from(b.offset) < a.end() {
                    errors.push(format!(
                        "Wire '{}': slaves '{a}' and '{b}' overlap.",
                        self.wire
                    ));
                }
            }
        }
        errors
    }
}
