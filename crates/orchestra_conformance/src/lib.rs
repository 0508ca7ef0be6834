//! Conformance test helpers for the orchestra linker.
//!
//! Provides VHDL fixtures of typical Wishbone components and a [`Workspace`]
//! that stores them as an on-disk component library inside a temporary
//! directory, so integration tests run the same load, check and compile path
//! as the command line.

#![warn(missing_docs)]

use orchestra_common::Frequency;
use orchestra_component::{Component, ComponentLibrary};
use orchestra_config::ClockGenerator;
use orchestra_project::Project;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An 8-bit master with an 8-bit address bus and no byte selects.
pub const CPU8: &str = "
library ieee;
use ieee.std_logic_1164.all;

entity cpu8 is
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbm_adr_o : out std_logic_vector(7 downto 0);
    wbm_dat_i : in  std_logic_vector(7 downto 0);
    wbm_dat_o : out std_logic_vector(7 downto 0);
    wbm_we_o  : out std_logic;
    wbm_ack_i : in  std_logic;
    wbm_cyc_o : out std_logic;
    wbm_stb_o : out std_logic
  );
end entity cpu8;

architecture rtl of cpu8 is
begin
end architecture rtl;
";

/// A 32-bit master with a 16-bit word address and four byte selects.
pub const CPU32: &str = "
entity cpu32 is
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbm_adr_o : out std_logic_vector(15 downto 0);
    wbm_dat_i : in  std_logic_vector(31 downto 0);
    wbm_dat_o : out std_logic_vector(31 downto 0);
    wbm_sel_o : out std_logic_vector(3 downto 0);
    wbm_we_o  : out std_logic;
    wbm_ack_i : in  std_logic;
    wbm_cyc_o : out std_logic;
    wbm_stb_o : out std_logic
  );
end entity cpu32;
";

/// An 8-bit slave whose address width is set by a generic, with one
/// exported output.
pub const RAM8: &str = "
entity ram8 is
  generic (addr_width : natural := 4);
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbs_adr_i : in  std_logic_vector(addr_width - 1 downto 0);
    wbs_dat_i : in  std_logic_vector(7 downto 0);
    wbs_dat_o : out std_logic_vector(7 downto 0);
    wbs_we_i  : in  std_logic;
    wbs_ack_o : out std_logic;
    wbs_cyc_i : in  std_logic;
    wbs_stb_i : in  std_logic;
    gls_led   : out std_logic
  );
end entity ram8;
";

/// A 32-bit slave with byte selects and a generic address width.
pub const MEM32: &str = "
entity mem32 is
  generic (addr_width : natural := 8);
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbs_adr_i : in  std_logic_vector(addr_width - 1 downto 0);
    wbs_dat_i : in  std_logic_vector(31 downto 0);
    wbs_dat_o : out std_logic_vector(31 downto 0);
    wbs_sel_i : in  std_logic_vector(3 downto 0);
    wbs_we_i  : in  std_logic;
    wbs_ack_o : out std_logic;
    wbs_cyc_i : in  std_logic;
    wbs_stb_i : in  std_logic
  );
end entity mem32;
";

/// An 8-bit peripheral with two registers and a serial pin pair.
pub const UART8: &str = "
entity uart8 is
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbs_adr_i : in  std_logic_vector(1 downto 0);
    wbs_dat_i : in  std_logic_vector(7 downto 0);
    wbs_dat_o : out std_logic_vector(7 downto 0);
    wbs_we_i  : in  std_logic;
    wbs_ack_o : out std_logic;
    wbs_cyc_i : in  std_logic;
    wbs_stb_i : in  std_logic;
    gls_tx    : out std_logic;
    gls_rx    : in  std_logic
  );
end entity uart8;
";

/// A master named `name` whose address width is a generic defaulting to 8.
pub const DMA: &str = "
entity dma is
  generic (width : natural := 8);
  port (
    clk            : in  std_logic;
    reset          : in  std_logic;
    wbm_name_adr   : out std_logic_vector(width - 1 downto 0);
    wbm_name_dat_i : in  std_logic_vector(7 downto 0);
    wbm_name_dat_o : out std_logic_vector(7 downto 0);
    wbm_name_we    : out std_logic;
    wbm_name_ack   : in  std_logic;
    wbm_name_cyc   : out std_logic;
    wbm_name_stb   : out std_logic
  );
end entity dma;
";

/// A temporary project directory with a component library.
pub struct Workspace {
    dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("components")).expect("create library");
        fs::create_dir_all(dir.path().join("src")).expect("create sources");
        Self { dir }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The component library directory.
    pub fn library_dir(&self) -> PathBuf {
        self.root().join("components")
    }

    /// The output directory used by [`Workspace::compile`].
    pub fn output_dir(&self) -> PathBuf {
        self.root().join("build")
    }

    /// The project file path.
    pub fn project_file(&self) -> PathBuf {
        self.root().join("project.toml")
    }

    /// Stores `vhdl` as the top file of a new library component `name`.
    pub fn add_component(&self, name: &str, vhdl: &str) {
        let source = self.root().join("src").join(format!("{name}.vhd"));
        fs::write(&source, vhdl).expect("write source");
        let mut component = Component::open_or_create(&self.library_dir().join(name), name)
            .expect("create component");
        component.add_hdl(&source, "all", 0, true).expect("add hdl");
        component.save().expect("save component");
    }

    /// Stores every fixture component.
    pub fn with_fixtures(self) -> Self {
        for (name, vhdl) in [
            ("cpu8", CPU8),
            ("cpu32", CPU32),
            ("ram8", RAM8),
            ("mem32", MEM32),
            ("uart8", UART8),
            ("dma", DMA),
        ] {
            self.add_component(name, vhdl);
        }
        self
    }

    /// A fresh library over the workspace's components.
    pub fn library(&self) -> ComponentLibrary {
        ComponentLibrary::new(self.library_dir())
    }
}

/// Adds the `sys` clock domain at 50 MHz.
pub fn add_sys_clock(project: &mut Project) {
    project
        .add_clock("sys", Frequency::new(50_000_000), ClockGenerator::Static)
        .expect("add clock");
}

/// Instantiates `base` as `name` and links its default clock interface to
/// `sys`.
pub fn add_clocked(project: &mut Project, library: &mut ComponentLibrary, name: &str, base: &str) {
    let component = library.find(base).expect("find component");
    project.add_instance(name, &component).expect("add instance");
    project
        .connect(name, "default", "sys", None)
        .expect("link clock");
}

/// `cpu8` driving `ram8` at offset 0x10 on wire `main`.
pub fn small_soc(library: &mut ComponentLibrary) -> Project {
    let mut p = Project::new("soc").expect("project");
    add_sys_clock(&mut p);
    p.add_wire("main", "wishbone").expect("add wire");
    add_clocked(&mut p, library, "cpu0", "cpu8");
    add_clocked(&mut p, library, "ram0", "ram8");
    p.connect("cpu0", "wbm_noname", "main", None).expect("link master");
    p.connect("ram0", "wbs_noname", "main", Some(0x10))
        .expect("link slave");
    p
}

/// `cpu32` driving a 32-bit memory at 0 and an 8-bit UART at 0x100.
pub fn mixed_soc(library: &mut ComponentLibrary) -> Project {
    let mut p = Project::new("mixed").expect("project");
    add_sys_clock(&mut p);
    p.add_wire("bus", "wishbone").expect("add wire");
    add_clocked(&mut p, library, "cpu", "cpu32");
    add_clocked(&mut p, library, "mem", "mem32");
    add_clocked(&mut p, library, "uart", "uart8");
    p.connect("cpu", "wbm_noname", "bus", None).expect("link master");
    p.connect("mem", "wbs_noname", "bus", Some(0)).expect("link memory");
    p.connect("uart", "wbs_noname", "bus", Some(0x100))
        .expect("link uart");
    p
}
