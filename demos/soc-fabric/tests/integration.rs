//! Integration tests for the SoC fabric example.

use std::collections::BTreeSet;
use std::fs;

use busfab_core::{SlaveId, Token};
use busfab_fabric::run;
use busfab_render::{renderer_for, write_files, OutputFormat};
use busfab_sim::{check_output, FabricModel, MasterCycle, SlaveModel};
use soc_fabric::{config, slaves, TIMER_BASE};

fn model() -> FabricModel {
    let output = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let models = output.register_files.iter().map(SlaveModel::new).collect();
    FabricModel::new(&output.fabric, models).unwrap()
}

#[test]
fn topology() {
    let output = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let bases: Vec<u64> = output.fabric.slaves.iter().map(|s| s.base.value()).collect();
    assert_eq!(bases, vec![0, 1, TIMER_BASE]);
    assert_eq!(output.fabric.interrupts.sources, vec![0, 2]);
    assert_eq!(output.fabric.interrupts.vector_width, 2);
    assert!(check_output(&output).iter().all(|d| !d.is_error()));
}

#[test]
fn unit_names_and_order() {
    let output = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let names: Vec<&str> = output.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["uart_regs", "gpio_regs", "timer_regs", "soc_intercon"]);
    assert_eq!(output.report.units.len(), 4);
}

#[test]
fn fabric_carries_we_line() {
    let output = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let fabric = output.unit("soc_intercon").unwrap();
    let ports = fabric.tokens.get(Token::SlaveSignalDeclarations).unwrap();
    assert!(ports.contains("s_we_o"));
    assert!(ports.contains("timer_irq_i"));
}

#[test]
fn renders_vhdl_project() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let renderer = renderer_for(OutputFormat::Vhdl, None).unwrap();
    let paths = write_files(renderer.as_ref(), &output.units, dir.path()).unwrap();
    assert_eq!(paths.len(), 4);

    let uart = fs::read_to_string(dir.path().join("uart_regs.vhd")).unwrap();
    assert!(uart.contains("entity uart_regs is"));
    assert!(!uart.contains("%"));
    let fabric = fs::read_to_string(dir.path().join("soc_intercon.vhd")).unwrap();
    assert!(fabric.contains("SLAVE_TIMER_BASE"));
}

#[test]
fn generation_is_deterministic() {
    let a = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    let b = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    assert_eq!(a.report.digest, b.report.digest);
    assert_eq!(a.units, b.units);
}

#[test]
fn bus_cycles() {
    let widths = soc_fabric::widths().unwrap();
    let mut fabric = model();

    // Write-only register reads as zero
    let resp = fabric.clock(&MasterCycle::write(widths.join_address(0, 0), 0x7F));
    assert!(resp.ack);
    assert_eq!(fabric.slave("uart").unwrap().output("ctrl"), Some(0x7F));
    assert_eq!(fabric.clock(&MasterCycle::read(widths.join_address(0, 0))).read_data, 0);

    // Without we the strobe only reads
    let mut cycle = MasterCycle::read(widths.join_address(1, 2));
    cycle.write_data = 0xFFFF;
    fabric.clock(&cycle);
    assert_eq!(fabric.slave("gpio").unwrap().value("dir"), Some(0));

    // Hardware-loaded timer count
    fabric.clock(&MasterCycle::idle().with_load("timer", "count", 99));
    let resp = fabric.clock(&MasterCycle::read(widths.join_address(TIMER_BASE, 1)));
    assert_eq!(resp.read_data, 99);

    // Reset restores uart.ctrl
    fabric.clock(&MasterCycle::reset());
    assert_eq!(fabric.slave("uart").unwrap().value("ctrl"), Some(0x03));
}

#[test]
fn uart_outranks_timer() {
    let fabric = model();
    let both: BTreeSet<SlaveId> = [SlaveId::from("uart"), SlaveId::from("timer")].into();
    let state = fabric.interrupts(&both);
    assert!(state.irq);
    assert_eq!(state.vector, 0);

    let timer: BTreeSet<SlaveId> = [SlaveId::from("timer")].into();
    assert_eq!(fabric.interrupts(&timer).vector, 2);

    let none = fabric.interrupts(&BTreeSet::new());
    assert!(!none.irq);
    assert_eq!(none.vector, 3);
}

#[test]
fn matches_equivalent_description() {
    let toml = busfab_desc::description_to_toml(&busfab_desc::FabricDescription {
        fabric: busfab_desc::FabricSection {
            name: "soc".into(),
            write_qualifier: busfab_core::WriteQualifier::WriteEnable,
            parallel: true,
        },
        bus: busfab_desc::BusSection {
            address_width: 16,
            data_width: 32,
            core_address_width: 4,
        },
        output: busfab_desc::OutputSection::default(),
        slaves: slaves().unwrap(),
    })
    .unwrap();
    let (cfg, parsed) = busfab_desc::parse_description(&toml)
        .unwrap()
        .into_parts()
        .unwrap();
    let from_file = run(&parsed, &cfg).unwrap();
    let direct = run(&slaves().unwrap(), &config().unwrap()).unwrap();
    assert_eq!(from_file.report.digest, direct.report.digest);
}
