//! The reset synchronizer instantiated once per clock domain.

use crate::error::GenerationError;
use crate::vhdl::{header, LIBRARIES};
use orchestra_common::InternalError;
use orchestra_vhdl::{parse_entity, Entity};

/// Entity name of the synchronizer.
pub const SYSCON: &str = "syscon";

/// File name of the synchronizer.
pub const SYSCON_FILE: &str = "syscon.vhd";

const BODY: &str = "
entity syscon is
    port (
        clk : in std_logic;
        reset_sync : out std_logic;
        reset_ext : in std_logic
    );
end entity syscon;

architecture rtl of syscon is
    signal sync : std_logic_vector(1 downto 0);
begin

    process (clk)
    begin
        if rising_edge(clk) then
            sync <= sync(0) & reset_ext;
        end if;
    end process;

    reset_sync <= sync(1);

end architecture rtl;
";

/// The complete design file text.
pub fn syscon_source() -> String {
    let mut out = header("Reset synchronizer: two-stage synchronous reset shift", SYSCON);
    out.push_str(LIBRARIES);
    out.push_str(BODY);
    out
}

/// The synchronizer entity, as instantiated by the top level.
pub fn syscon_entity() -> Result<Entity, GenerationError> {
    parse_entity(BODY)
        .map_err(|e| GenerationError::from(InternalError::new(format!("syscon template: {e}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestra_vhdl::PortMode;

    #[test]
    fn template_declares_three_ports() {
        let entity = syscon_entity().unwrap();
        assert_eq!(entity.name, SYSCON);
        let modes: Vec<_> = entity.ports.iter().map(|p| (p.name.as_str(), p.mode)).collect();
        assert_eq!(
            modes,
            [
                ("clk", PortMode::In),
                ("reset_sync", PortMode::Out),
                ("reset_ext", PortMode::In)
            ]
        );
    }

    #[test]
    fn source_has_header_and_libraries() {
        let text = syscon_source();
        assert!(text.starts_with("---"));
        assert!(text.contains("use ieee.std_logic_1164.all;"));
        assert!(text.contains("rising_edge(clk)"));
    }

    #[test]
    fn reset_is_sampled_only_on_the_clock() {
        let text = syscon_source();
        assert!(text.contains("process (clk)\n"));
        assert!(text.contains("sync <= sync(0) & reset_ext;"));
        assert!(!text.contains("process (clk, reset_ext)"));
    }
}
