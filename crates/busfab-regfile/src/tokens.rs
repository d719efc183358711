//! Register-file token emission.
//!
//! Turns a [`RegisterFileSpec`] into the fragments the register-file
//! template expects. Port fragments end every line with `;` because the
//! template closes the port list with `wb_ack_o`.

use busfab_core::hdl::{indent, slv_literal, slv_type, zero_extend, zeros};
use busfab_core::{Token, TokenMap};

use crate::generate::RegisterFileSpec;

/// Depth of statements inside the clocked process branches.
const PROCESS_DEPTH: usize = 4;

/// Build the full register-file token map.
pub fn register_file_tokens(spec: &RegisterFileSpec) -> TokenMap {
    let mut map = TokenMap::new();
    let reg_w = spec.widths.register_address_width();
    let data_w = spec.widths.data_width();

    map.insert(Token::EntityName, spec.entity.clone());
    map.insert_lines(
        Token::BusConstants,
        indent(
            &[
                format!("ADDR_W : natural := {reg_w};"),
                format!("DATA_W : natural := {data_w}"),
            ],
            2,
        ),
    );

    // Architecture declarations
    let constants: Vec<String> = spec
        .registers
        .iter()
        .map(|r| {
            format!(
                "constant {} : std_logic_vector(ADDR_W-1 downto 0) := {};",
                r.address_constant(),
                slv_literal(r.offset, reg_w)
            )
        })
        .collect();
    map.insert_lines(Token::RegisterAddressConstants, indent(&constants, 1));

    let mut signals = Vec::new();
    for r in &spec.registers {
        signals.push(format!(
            "signal {} : {};",
            r.storage_signal(),
            slv_type(r.width_bits)
        ));
        signals.push(format!("signal {} : std_logic;", r.select_signal()));
        if r.write_enable.is_some() {
            signals.push(format!("signal {} : std_logic;", r.enable_signal()));
        }
    }
    map.insert_lines(Token::SignalDefinitions, indent(&signals, 1));

    // Concurrent statements
    let comparators: Vec<String> = spec
        .registers
        .iter()
        .map(|r| {
            format!(
                "{} <= '1' when wb_adr_i = {} else '0';",
                r.select_signal(),
                r.address_constant()
            )
        })
        .collect();
    map.insert_lines(Token::AddressComparators, indent(&comparators, 1));

    let enables: Vec<String> = spec
        .writable_registers()
        .map(|r| {
            let we = r.write_enable.map(|w| w.requires_we).unwrap_or(false);
            if we {
                format!(
                    "{} <= wb_stb_i and wb_we_i and {};",
                    r.enable_signal(),
                    r.select_signal()
                )
            } else {
                format!("{} <= wb_stb_i and {};", r.enable_signal(), r.select_signal())
            }
        })
        .collect();
    map.insert_lines(Token::RegisterEnables, indent(&enables, 1));

    let mut demux: Vec<String> = Vec::new();
    let readable: Vec<_> = spec.readable_registers().collect();
    if readable.is_empty() {
        demux.push(format!("wb_dat_o <= {};", zeros()));
    } else {
        demux.push("with wb_adr_i select wb_dat_o <=".to_string());
        for r in &readable {
            demux.push(format!(
                "    {} when {},",
                zero_extend(&r.storage_signal(), r.width_bits, data_w),
                r.address_constant()
            ));
        }
        demux.push(format!("    {} when others;", zeros()));
    }
    map.insert_lines(Token::RegisterOutputDemultiplexer, indent(&demux, 1));

    // Ports
    let mut inputs = Vec::new();
    if spec.write_qualifier.has_we_line() {
        inputs.push("wb_we_i : in  std_logic;".to_string());
    }
    for r in spec.registers.iter().filter(|r| r.hardware_loaded()) {
        inputs.push(format!("{} : in  {};", r.input_port(), slv_type(r.width_bits)));
        inputs.push(format!("{} : in  std_logic;", r.load_port()));
    }
    map.insert_lines(Token::RegisterInputs, indent(&inputs, 2));

    let outputs: Vec<String> = spec
        .registers
        .iter()
        .filter(|r| r.drives_output())
        .map(|r| format!("{} : out {};", r.output_port(), slv_type(r.width_bits)))
        .collect();
    map.insert_lines(Token::RegisterOutputs, indent(&outputs, 2));

    let assignments: Vec<String> = spec
        .registers
        .iter()
        .filter(|r| r.drives_output())
        .map(|r| format!("{} <= {};", r.output_port(), r.storage_signal()))
        .collect();
    map.insert_lines(Token::OutputAssignments, indent(&assignments, 1));

    if spec.has_interrupt {
        map.insert_lines(
            Token::InterruptPorts,
            indent(
                &[
                    "irq_i : in  std_logic;".to_string(),
                    "irq_o : out std_logic;".to_string(),
                ],
                2,
            ),
        );
        map.insert_lines(
            Token::InterruptAssignment,
            indent(&["irq_o <= irq_i;".to_string()], 1),
        );
    } else {
        map.insert(Token::InterruptPorts, "");
        map.insert(Token::InterruptAssignment, "");
    }

    // Clocked process
    let resets: Vec<String> = spec
        .registers
        .iter()
        .map(|r| {
            format!(
                "{} <= {};",
                r.storage_signal(),
                slv_literal(r.reset_value.value(), r.width_bits)
            )
        })
        .collect();
    map.insert_lines(Token::ResetAssignments, indent(&resets, PROCESS_DEPTH));

    let mut stores = Vec::new();
    for r in &spec.registers {
        if r.write_enable.is_some() {
            stores.push(format!("if {} = '1' then", r.enable_signal()));
            stores.push(format!(
                "    {} <= wb_dat_i({} downto 0);",
                r.storage_signal(),
                r.width_bits - 1
            ));
            stores.push("end if;".to_string());
        } else if r.hardware_loaded() {
            stores.push(format!("if {} = '1' then", r.load_port()));
            stores.push(format!("    {} <= {};", r.storage_signal(), r.input_port()));
            stores.push("end if;".to_string());
        }
    }
    map.insert_lines(Token::StoreConditions, indent(&stores, PROCESS_DEPTH));

    map
}
