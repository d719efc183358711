//! Fabric token emission.
//!
//! Port fragments end every line with `;`; the fabric template closes its
//! port list with `irq_o`. A zero-width core field means a single slave
//! that is always selected, so no `core_adr` slice is emitted.

use busfab_core::hdl::{indent, or_chain, slv_literal, slv_type, zeros};
use busfab_core::{Token, TokenMap};

use crate::generate::{FabricSpec, SlavePort};

/// Build the full fabric token map.
pub fn fabric_tokens(spec: &FabricSpec) -> TokenMap {
    let mut map = TokenMap::new();
    let widths = spec.widths;
    let core_w = widths.core_address_width();
    let has_core_field = core_w > 0;

    map.insert(Token::EntityName, spec.entity.clone());
    map.insert_lines(
        Token::BusConstants,
        indent(
            &[
                format!("ADDR_W : natural := {};", widths.address_width()),
                format!("DATA_W : natural := {};", widths.data_width()),
                format!("CORE_W : natural := {core_w};"),
                format!("REG_W  : natural := {}", widths.register_address_width()),
            ],
            2,
        ),
    );

    // Architecture declarations
    let constants: Vec<String> = if has_core_field {
        spec.slaves
            .iter()
            .map(|s| {
                format!(
                    "constant {} : std_logic_vector(CORE_W-1 downto 0) := {};",
                    s.base_constant(),
                    slv_literal(s.base.value(), core_w)
                )
            })
            .collect()
    } else {
        Vec::new()
    };
    map.insert_lines(Token::SlaveAddressConstants, indent(&constants, 1));

    let mut selects = Vec::new();
    if has_core_field {
        selects.push("signal core_adr : std_logic_vector(CORE_W-1 downto 0);".to_string());
    }
    for s in &spec.slaves {
        selects.push(format!("signal {} : std_logic;", s.select_signal()));
    }
    map.insert_lines(Token::SelectSignalDeclarations, indent(&selects, 1));

    // Ports
    let mut ports = Vec::new();
    if spec.write_qualifier.has_we_line() {
        ports.push("wbm_we_i : in  std_logic;".to_string());
        ports.push("s_we_o : out std_logic;".to_string());
    }
    for s in &spec.slaves {
        ports.push(format!("{} : out std_logic;", s.strobe_port()));
        ports.push(format!("{} : in  std_logic;", s.ack_port()));
        ports.push(format!(
            "{} : in  std_logic_vector(DATA_W-1 downto 0);",
            s.data_port()
        ));
        if s.has_interrupt {
            ports.push(format!("{} : in  std_logic;", s.irq_port()));
        }
    }
    map.insert_lines(Token::SlaveSignalDeclarations, indent(&ports, 2));

    map.insert_lines(
        Token::IrqVectorDeclaration,
        indent(
            &[format!(
                "irq_vector_o : out {};",
                slv_type(spec.interrupts.vector_width)
            )],
            2,
        ),
    );

    // Concurrent statements
    let mut common = vec![
        "s_adr_o <= wbm_adr_i(REG_W-1 downto 0);".to_string(),
        "s_dat_o <= wbm_dat_i;".to_string(),
    ];
    if spec.write_qualifier.has_we_line() {
        common.push("s_we_o <= wbm_we_i;".to_string());
    }
    map.insert_lines(Token::CommonSignalConnections, indent(&common, 1));

    let mut comparator = Vec::new();
    if has_core_field {
        comparator.push("core_adr <= wbm_adr_i(ADDR_W-1 downto REG_W);".to_string());
    }
    for s in &spec.slaves {
        comparator.push(select_line(s, has_core_field));
    }
    map.insert_lines(Token::AddressComparator, indent(&comparator, 1));

    let strobes: Vec<String> = spec
        .slaves
        .iter()
        .map(|s| format!("{} <= wbm_stb_i and {};", s.strobe_port(), s.select_signal()))
        .collect();
    map.insert_lines(Token::StrobeAndGates, indent(&strobes, 1));

    let acks: Vec<String> = spec.slaves.iter().map(SlavePort::ack_port).collect();
    map.insert_lines(
        Token::AcknowledgeOrGate,
        indent(&[format!("wbm_ack_o <= {};", or_chain(&acks))], 1),
    );

    map.insert_lines(Token::ReadDataMultiplexer, indent(&read_mux(spec), 1));

    let irqs: Vec<String> = spec.interrupt_sources().map(SlavePort::irq_port).collect();
    map.insert_lines(
        Token::InterruptOrGate,
        indent(&[format!("irq_o <= {};", or_chain(&irqs))], 1),
    );

    map.insert_lines(
        Token::InterruptPriorityDecoder,
        indent(&priority_decoder(spec), 1),
    );

    map
}

fn select_line(slave: &SlavePort, has_core_field: bool) -> String {
    if has_core_field {
        format!(
            "{} <= '1' when core_adr = {} else '0';",
            slave.select_signal(),
            slave.base_constant()
        )
    } else {
        format!("{} <= '1';", slave.select_signal())
    }
}

fn read_mux(spec: &FabricSpec) -> Vec<String> {
    if spec.slaves.is_empty() {
        return vec![format!("wbm_dat_o <= {};", zeros())];
    }
    if spec.widths.core_address_width() == 0 {
        return vec![format!("wbm_dat_o <= {};", spec.slaves[0].data_port())];
    }
    let mut lines = vec!["with core_adr select wbm_dat_o <=".to_string()];
    for s in &spec.slaves {
        lines.push(format!("    {} when {},", s.data_port(), s.base_constant()));
    }
    lines.push(format!("    {} when others;", zeros()));
    lines
}

/// Conditional assignment, highest priority first, ending in the sentinel.
fn priority_decoder(spec: &FabricSpec) -> Vec<String> {
    let width = spec.interrupts.vector_width;
    let sentinel = slv_literal(spec.interrupts.no_interrupt, width);
    let sources: Vec<&SlavePort> = spec.interrupt_sources().collect();
    if sources.is_empty() {
        return vec![format!("irq_vector_o <= {sentinel};")];
    }
    let mut lines = Vec::new();
    for (i, s) in sources.iter().enumerate() {
        let lead = if i == 0 { "irq_vector_o <= " } else { "    " };
        lines.push(format!(
            "{lead}{} when {} = '1' else",
            slv_literal(s.index as u64, width),
            s.irq_port()
        ));
    }
    lines.push(format!("    {sentinel};"));
    lines
}
