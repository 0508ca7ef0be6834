//! Round-robin arbiter for multi-master wires.
//!
//! Each cycle the arbiter masks out the previously granted requester and
//! every requester below it, then grants the lowest remaining request,
//! falling back to the lowest request overall when the mask leaves nothing.
//! Requesters are therefore served in rising order before wrapping around. The mask is re-armed on every
//! acknowledge and on idle cycles. [`RoundRobin`] models the same grant
//! sequence in software.

use crate::error::GenerationError;
use crate::vhdl::{header, LIBRARIES};

/// Largest supported number of masters.
pub const MAX_MASTERS: usize = 64;

/// Name of the arbiter entity for `masters` requesters.
pub fn arbiter_name(masters: usize) -> String {
    format!("arbiter_{masters}m")
}

fn check_size(masters: usize) -> Result<(), GenerationError> {
    if (2..=MAX_MASTERS).contains(&masters) {
        Ok(())
    } else {
        Err(GenerationError::ArbiterSize(masters))
    }
}

/// The complete design file of an arbiter for `masters` requesters.
pub fn arbiter_source(masters: usize) -> Result<String, GenerationError> {
    check_size(masters)?;
    let name = arbiter_name(masters);
    let high = masters - 1;
    let mut out = header(&format!("Round-robin arbiter, {masters} masters"), &name);
    out.push_str(LIBRARIES);
    out.push_str(&format!(
        "
entity {name} is
    port (
        clk : in std_logic;
        reset : in std_logic;
        req : in std_logic_vector({high} downto 0);
        ack : in std_logic;
        gnt : out std_logic_vector({high} downto 0)
    );
end entity {name};

architecture rtl of {name} is
    constant NONE : std_logic_vector({high} downto 0) := (others => '0');
    signal last : std_logic_vector({high} downto 0);
    signal masked : std_logic_vector({high} downto 0);
    signal grant : std_logic_vector({high} downto 0);

    function lowest(x : std_logic_vector) return std_logic_vector is
    begin
        return x and std_logic_vector(unsigned(not x) + 1);
    end function;
begin

    -- last is one-hot, so last - 1 sets every bit below it; NONE - 1 masks all
    masked <= req and not (last or std_logic_vector(unsigned(last) - 1));
    grant <= lowest(masked) when masked /= NONE else lowest(req);
    gnt <= grant;

    process (clk)
    begin
        if rising_edge(clk) then
            if reset = '1' then
                last <= NONE;
            elsif ack = '1' or req = NONE then
                last <= grant;
            end if;
        end if;
    end process;

end architecture rtl;
"
    ));
    Ok(out)
}

/// Bit-accurate model of the arbiter's grant sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundRobin {
    mask: u64,
    last: u64,
}

impl RoundRobin {
    /// An arbiter out of reset.
    pub fn new(masters: usize) -> Result<Self, GenerationError> {
        check_size(masters)?;
        let mask = if masters == 64 {
            u64::MAX
        } else {
            (1u64 << masters) - 1
        };
        Ok(Self { mask, last: 0 })
    }

    /// The one-hot grant for `requests` in the current cycle.
    pub fn grant(&self, requests: u64) -> u64 {
        let requests = requests & self.mask;
        let masked = requests & !(self.last | self.last.wrapping_sub(1));
        if masked != 0 {
            lowest(masked)
        } else {
            lowest(requests)
        }
    }

    /// Computes the grant, then applies the clock edge.
    pub fn step(&mut self, requests: u64, ack: bool) -> u64 {
        let grant = self.grant(requests);
        if ack || requests & self.mask == 0 {
            self.last = grant;
        }
        grant
    }

    /// Returns to the reset state.
    pub fn reset(&mut self) {
        self.last = 0;
    }
}

fn lowest(x: u64) -> u64 {
    x & x.wrapping_neg()
}
