//! Structural checks over generated specs.
//!
//! These re-derive the guarantees generation is supposed to give (exclusive
//! comparators, in-range constants, a permutation of priorities, a complete
//! token set, unique declarations) and report any violation as a diagnostic
//! instead of failing.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use busfab_core::types::low_mask;
use busfab_core::{Token, TokenLevel, TokenMap, UnitKind};
use busfab_fabric::{fabric_tokens, FabricSpec, GenerationOutput};
use busfab_regfile::{register_file_tokens, RegisterFileSpec};

/// Ports the built-in register-file template declares around its tokens.
const REGISTER_FILE_TEMPLATE_PORTS: &[&str] = &[
    "clk_i", "rst_i", "wb_adr_i", "wb_dat_i", "wb_dat_o", "wb_stb_i", "wb_ack_o",
];

/// Ports the built-in fabric template declares around its tokens.
const FABRIC_TEMPLATE_PORTS: &[&str] = &[
    "wbm_adr_i", "wbm_dat_i", "wbm_dat_o", "wbm_stb_i", "wbm_ack_o", "s_adr_o", "s_dat_o", "irq_o",
];

const REGISTER_FILE_DECLARATIONS: &[Token] = &[
    Token::BusConstants,
    Token::RegisterInputs,
    Token::RegisterOutputs,
    Token::InterruptPorts,
    Token::RegisterAddressConstants,
    Token::SignalDefinitions,
];

const FABRIC_DECLARATIONS: &[Token] = &[
    Token::BusConstants,
    Token::SlaveSignalDeclarations,
    Token::IrqVectorDeclaration,
    Token::SlaveAddressConstants,
    Token::SelectSignalDeclarations,
];

/// Severity of a structural diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic produced by a structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Entity the diagnostic belongs to.
    pub unit: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    fn error(unit: &str, message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
            unit: Some(unit.to_string()),
            suggestion: None,
        }
    }

    fn warning(unit: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            unit: Some(unit.to_string()),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Check one generated register file.
pub fn check_register_file(spec: &RegisterFileSpec) -> Vec<Diagnostic> {
    let unit = spec.entity.as_str();
    let mut diagnostics = Vec::new();
    let capacity = spec.widths.register_capacity();

    // Comparators must be mutually exclusive
    let mut by_offset: BTreeMap<u64, &str> = BTreeMap::new();
    for reg in &spec.registers {
        if let Some(other) = by_offset.insert(reg.offset, &reg.name) {
            diagnostics.push(
                Diagnostic::error(
                    unit,
                    format!(
                        "registers '{other}' and '{}' both decode offset {}",
                        reg.name, reg.offset
                    ),
                )
                .suggest("Give every register a distinct offset"),
            );
        }
        if reg.offset >= capacity {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "register '{}' offset {} is outside the register space of {capacity}",
                    reg.name, reg.offset
                ),
            ));
        }
        if reg.address.value() != reg.offset & low_mask(reg.address.width()) {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "register '{}' comparator constant {} does not encode offset {}",
                    reg.name, reg.address, reg.offset
                ),
            ));
        }
        if reg.width_bits > spec.widths.data_width() {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "register '{}' is {} bits wide but the data bus has {}",
                    reg.name,
                    reg.width_bits,
                    spec.widths.data_width()
                ),
            ));
        }
        if reg.reset_value.width() != reg.width_bits {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "register '{}' reset value is {} bits wide, register is {}",
                    reg.name,
                    reg.reset_value.width(),
                    reg.width_bits
                ),
            ));
        }

        match (reg.direction.host_writable(), reg.write_enable) {
            (true, None) => diagnostics.push(Diagnostic::error(
                unit,
                format!("host-writable register '{}' has no write enable", reg.name),
            )),
            (false, Some(_)) => diagnostics.push(
                Diagnostic::error(
                    unit,
                    format!("host-read register '{}' has a bus write enable", reg.name),
                )
                .suggest("Host-read registers are loaded by the peripheral only"),
            ),
            (true, Some(we)) if we.requires_we != spec.write_qualifier.has_we_line() => {
                diagnostics.push(Diagnostic::error(
                    unit,
                    format!(
                        "register '{}' write enable disagrees with the '{}' write qualifier",
                        reg.name,
                        spec.write_qualifier.name()
                    ),
                ))
            }
            _ => {}
        }
    }

    if spec.registers.is_empty() {
        diagnostics.push(Diagnostic::warning(
            unit,
            "register file has no registers; every read returns zero".to_string(),
        ));
    }

    let tokens = register_file_tokens(spec);
    diagnostics.extend(missing_tokens(unit, &tokens.missing(TokenLevel::RegisterFile)));
    diagnostics.extend(duplicate_declarations(unit, &tokens, UnitKind::RegisterFile));

    debug!(unit, diagnostics = diagnostics.len(), "checked register file");
    diagnostics
}

/// Check the generated interconnect.
pub fn check_fabric(spec: &FabricSpec) -> Vec<Diagnostic> {
    let unit = spec.entity.as_str();
    let mut diagnostics = Vec::new();
    let capacity = spec.widths.slave_capacity();

    let mut by_base: BTreeMap<u64, &str> = BTreeMap::new();
    for (position, port) in spec.slaves.iter().enumerate() {
        if port.index != position {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "slave '{}' sits at position {position} but carries index {}",
                    port.id, port.index
                ),
            ));
        }
        if let Some(other) = by_base.insert(port.base.value(), port.id.as_str()) {
            diagnostics.push(
                Diagnostic::error(
                    unit,
                    format!(
                        "slaves '{other}' and '{}' share base address {}",
                        port.id,
                        port.base.value()
                    ),
                )
                .suggest("Pin the slaves to distinct base addresses"),
            );
        }
        if port.base.value() >= capacity {
            diagnostics.push(Diagnostic::error(
                unit,
                format!(
                    "slave '{}' base address {} is outside the core address space of {capacity}",
                    port.id,
                    port.base.value()
                ),
            ));
        }
    }

    let priorities: BTreeSet<u32> = spec.slaves.iter().map(|s| s.priority).collect();
    let expected: BTreeSet<u32> = (0..spec.slaves.len() as u32).collect();
    if priorities != expected {
        diagnostics.push(Diagnostic::error(
            unit,
            format!(
                "priorities are not a permutation of 0..{}",
                spec.slaves.len()
            ),
        ));
    }

    let decoder = &spec.interrupts;
    let ranked: Vec<u32> = decoder
        .sources
        .iter()
        .filter_map(|&i| spec.slaves.get(i).map(|s| s.priority))
        .collect();
    if ranked.windows(2).any(|w| w[0] >= w[1]) {
        diagnostics.push(Diagnostic::error(
            unit,
            "interrupt sources are not in priority order".to_string(),
        ));
    }
    for &index in &decoder.sources {
        match spec.slaves.get(index) {
            Some(port) if !port.has_interrupt => diagnostics.push(Diagnostic::error(
                unit,
                format!("slave '{}' is an interrupt source without an interrupt", port.id),
            )),
            None => diagnostics.push(Diagnostic::error(
                unit,
                format!("interrupt source {index} names no slave"),
            )),
            _ => {}
        }
    }
    let capable = spec.slaves.iter().filter(|s| s.has_interrupt).count();
    if capable != decoder.sources.len() {
        diagnostics.push(Diagnostic::error(
            unit,
            format!(
                "{capable} interrupt-capable slaves but {} decoder sources",
                decoder.sources.len()
            ),
        ));
    }
    if decoder.no_interrupt < spec.slaves.len() as u64 {
        diagnostics.push(Diagnostic::error(
            unit,
            format!(
                "no-interrupt vector {} collides with slave index {}",
                decoder.no_interrupt, decoder.no_interrupt
            ),
        ));
    }
    if decoder.no_interrupt > low_mask(decoder.vector_width) {
        diagnostics.push(Diagnostic::error(
            unit,
            format!(
                "no-interrupt vector {} does not fit in {} bits",
                decoder.no_interrupt, decoder.vector_width
            ),
        ));
    }

    if spec.slaves.is_empty() {
        diagnostics.push(Diagnostic::warning(
            unit,
            "fabric has no slaves; every access reads zero without acknowledge".to_string(),
        ));
    } else if capable == 0 {
        diagnostics.push(Diagnostic::warning(
            unit,
            "no slave is interrupt-capable; irq_o is tied low".to_string(),
        ));
    }
    let tokens = fabric_tokens(spec);
    diagnostics.extend(missing_tokens(unit, &tokens.missing(TokenLevel::Fabric)));
    diagnostics.extend(duplicate_declarations(unit, &tokens, UnitKind::Fabric));

    debug!(unit, diagnostics = diagnostics.len(), "checked fabric");
    diagnostics
}

/// Check every unit of a pipeline run, plus cross-unit consistency.
pub fn check_output(output: &GenerationOutput) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = output
        .register_files
        .iter()
        .flat_map(check_register_file)
        .collect();
    diagnostics.extend(check_fabric(&output.fabric));

    let fabric = output.fabric.entity.as_str();
    if output.register_files.len() != output.fabric.slaves.len() {
        diagnostics.push(Diagnostic::error(
            fabric,
            format!(
                "{} register files for {} fabric slaves",
                output.register_files.len(),
                output.fabric.slaves.len()
            ),
        ));
    }
    for (rf, port) in output.register_files.iter().zip(&output.fabric.slaves) {
        if rf.slave != port.id {
            diagnostics.push(Diagnostic::error(
                fabric,
                format!(
                    "register file for '{}' is out of topology order at slave '{}'",
                    rf.slave, port.id
                ),
            ));
        }
        if rf.has_interrupt != port.has_interrupt {
            diagnostics.push(Diagnostic::error(
                fabric,
                format!("slave '{}' interrupt capability differs between units", port.id),
            ));
        }
        if rf.widths != output.fabric.widths {
            diagnostics.push(Diagnostic::error(
                rf.entity.as_str(),
                format!("bus widths {} differ from the fabric's {}", rf.widths, output.fabric.widths),
            ));
        }
    }
    for unit in &output.units {
        let missing = unit.tokens.missing(unit.kind.level());
        diagnostics.extend(missing_tokens(&unit.name, &missing));
    }
    diagnostics
}

/// Names declared more than once by a unit's tokens together with its
/// template, compared case-insensitively. Each repeat is listed once per
/// extra declaration.
pub fn declared_twice(tokens: &TokenMap, kind: UnitKind) -> Vec<String> {
    let (template, declaring) = match kind {
        UnitKind::RegisterFile => (REGISTER_FILE_TEMPLATE_PORTS, REGISTER_FILE_DECLARATIONS),
        UnitKind::Fabric => (FABRIC_TEMPLATE_PORTS, FABRIC_DECLARATIONS),
    };
    let names = template.iter().copied().chain(
        declaring
            .iter()
            .filter_map(|&token| tokens.get(token))
            .flat_map(|text| declarations(text)),
    );
    let mut seen = BTreeSet::new();
    let mut twice = Vec::new();
    for name in names {
        if !seen.insert(name.to_ascii_lowercase()) {
            twice.push(name.to_string());
        }
    }
    twice
}

/// Identifiers declared by `name : ...` lines, `signal` and `constant`
/// declarations included.
fn declarations(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.lines().filter_map(|line| {
        let line = line.trim();
        let line = line
            .strip_prefix("signal ")
            .or_else(|| line.strip_prefix("constant "))
            .unwrap_or(line);
        let (name, _) = line.split_once(':')?;
        let name = name.trim();
        let identifier =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        identifier.then_some(name)
    })
}

fn duplicate_declarations(unit: &str, tokens: &TokenMap, kind: UnitKind) -> Vec<Diagnostic> {
    declared_twice(tokens, kind)
        .into_iter()
        .map(|name| {
            Diagnostic::error(unit, format!("'{name}' is declared more than once"))
                .suggest("Rename the register or slave whose derived port names collide")
        })
        .collect()
}

fn missing_tokens(unit: &str, missing: &[Token]) -> Vec<Diagnostic> {
    missing
        .iter()
        .map(|token| {
            Diagnostic::error(unit, format!("token '{}' was not produced", token.name()))
                .suggest("Every template placeholder needs a fragment, even an empty one")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfab_core::types::{BusWidths, Direction, SlaveDescriptor, SlaveId};
    use busfab_core::{GeneratorConfig, SlaveBuilder, WriteQualifier};
    use busfab_fabric::run;

    fn widths() -> BusWidths {
        BusWidths::new(16, 32, 4).unwrap()
    }

    fn output() -> GenerationOutput {
        let w = widths();
        let mut uart = SlaveBuilder::new("uart");
        uart.interrupt()
            .add_register("ctrl", 8, Direction::HostWrite)
            .add_register("status", 8, Direction::HostRead);
        let mut gpio = SlaveBuilder::new("gpio");
        gpio.add_register("out", 16, Direction::Both);
        let slaves: Vec<SlaveDescriptor> = vec![uart.build(&w).unwrap(), gpio.build(&w).unwrap()];
        run(&slaves, &GeneratorConfig::new("soc", w)).unwrap()
    }

    fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
        diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    #[test]
    fn generated_output_is_clean() {
        let diagnostics = check_output(&output());
        assert!(errors(&diagnostics).is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn overlapping_register_comparators() {
        let mut spec = output().register_files[0].clone();
        spec.registers[1].offset = spec.registers[0].offset;
        let diagnostics = check_register_file(&spec);
        assert!(diagnostics
            .iter()
            .any(|d| d.is_error() && d.message.contains("both decode offset")));
    }

    #[test]
    fn host_read_with_write_enable() {
        let mut spec = output().register_files[0].clone();
        let status = spec
            .registers
            .iter_mut()
            .find(|r| r.direction == Direction::HostRead)
            .unwrap();
        status.write_enable = Some(busfab_regfile::WriteEnable { requires_we: false });
        let diagnostics = check_register_file(&spec);
        let d = diagnostics
            .iter()
            .find(|d| d.message.contains("bus write enable"))
            .unwrap();
        assert_eq!(d.unit.as_deref(), Some("uart_regs"));
        assert!(d.suggestion.is_some());
    }

    #[test]
    fn write_qualifier_mismatch() {
        let mut spec = output().register_files[1].clone();
        spec.write_qualifier = WriteQualifier::WriteEnable;
        assert!(check_register_file(&spec)
            .iter()
            .any(|d| d.message.contains("write qualifier")));
    }

    #[test]
    fn empty_register_file_warns() {
        let spec = busfab_regfile::generate(&SlaveDescriptor::new("idle"), &widths()).unwrap();
        let diagnostics = check_register_file(&spec);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn shared_base_address() {
        let mut fabric = output().fabric;
        fabric.slaves[1].base = fabric.slaves[0].base;
        assert!(check_fabric(&fabric)
            .iter()
            .any(|d| d.message.contains("share base address")));
    }

    #[test]
    fn priorities_must_be_a_permutation() {
        let mut fabric = output().fabric;
        fabric.slaves[1].priority = 0;
        assert!(check_fabric(&fabric)
            .iter()
            .any(|d| d.message.contains("permutation")));
    }

    #[test]
    fn sentinel_must_not_collide() {
        let mut fabric = output().fabric;
        fabric.interrupts.no_interrupt = 1;
        assert!(check_fabric(&fabric)
            .iter()
            .any(|d| d.message.contains("collides")));
    }

    #[test]
    fn interrupt_source_without_interrupt() {
        let mut fabric = output().fabric;
        fabric.interrupts.sources.push(1);
        let diagnostics = check_fabric(&fabric);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("without an interrupt")));
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("decoder sources")));
    }

    #[test]
    fn register_port_shadowing_a_bus_port() {
        let mut spec = output().register_files[0].clone();
        // host-read, so it declares `wb_dat_i` next to the template's own
        spec.registers[1].name = "wb_dat".to_string();
        let diagnostics = check_register_file(&spec);
        let d = diagnostics
            .iter()
            .find(|d| d.message.contains("declared more than once"))
            .unwrap();
        assert!(d.message.contains("wb_dat_i"));
        assert!(d.is_error());
    }

    #[test]
    fn slave_port_shadowing_a_master_port() {
        let mut fabric = output().fabric;
        fabric.slaves[1].id = SlaveId::from("wbm");
        assert!(check_fabric(&fabric)
            .iter()
            .any(|d| d.is_error() && d.message == "'wbm_dat_i' is declared more than once"));
    }

    #[test]
    fn declarations_are_read_from_token_text() {
        let out = output();
        for unit in &out.units {
            assert!(declared_twice(&unit.tokens, unit.kind).is_empty(), "{}", unit.name);
        }
        let mut tokens = out.units[0].tokens.clone();
        tokens.insert(
            Token::SignalDefinitions,
            "    signal reg_ctrl : std_logic;\n    signal REG_CTRL : std_logic;",
        );
        assert_eq!(declared_twice(&tokens, UnitKind::RegisterFile), vec!["REG_CTRL"]);
    }

    #[test]
    fn out_of_order_register_files() {
        let mut out = output();
        out.register_files.swap(0, 1);
        assert!(check_output(&out)
            .iter()
            .any(|d| d.message.contains("out of topology order")));
    }

    #[test]
    fn dropped_token_is_reported() {
        let mut out = output();
        let unit = out.units.iter_mut().find(|u| u.name == "gpio_regs").unwrap();
        let mut tokens = TokenMap::new();
        for (t, s) in unit.tokens.iter().filter(|(t, _)| *t != Token::StoreConditions) {
            tokens.insert(t, s);
        }
        unit.tokens = tokens;
        let diagnostics = check_output(&out);
        let d = diagnostics
            .iter()
            .find(|d| d.message.contains("store-conditions"))
            .unwrap();
        assert_eq!(d.unit.as_deref(), Some("gpio_regs"));
    }
}
