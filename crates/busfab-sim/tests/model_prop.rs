use std::collections::BTreeSet;

use busfab_core::types::{low_mask, BusWidths, Direction, RegisterDescriptor, SlaveDescriptor, SlaveId};
use busfab_core::{GenerationError, GeneratorConfig, WriteQualifier};
use busfab_fabric::run;
use busfab_regfile::generate_with_qualifier;
use busfab_sim::{check_output, declared_twice, BusCycle, FabricModel, MasterCycle, SlaveModel};
use proptest::prelude::*;

fn widths() -> BusWidths {
    BusWidths::new(12, 16, 3).unwrap()
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::HostRead),
        Just(Direction::HostWrite),
        Just(Direction::Both),
    ]
}

fn registers() -> impl Strategy<Value = Vec<RegisterDescriptor>> {
    prop::collection::btree_map(0u64..32, (1u32..=16, direction(), any::<u16>()), 1..6).prop_map(
        |regs| {
            regs.into_iter()
                .map(|(offset, (width, dir, reset))| {
                    RegisterDescriptor::new(format!("r{offset}"), offset, width, dir)
                        .with_reset(u64::from(reset) & low_mask(width))
                })
                .collect()
        },
    )
}

#[derive(Debug, Clone)]
struct Access {
    reset: bool,
    strobe: bool,
    we: bool,
    address: u64,
    data: u64,
}

fn access() -> impl Strategy<Value = Access> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0u64..40, any::<u16>()).prop_map(
        |(reset, strobe, we, address, data)| Access {
            reset,
            strobe,
            we,
            address,
            data: u64::from(data),
        },
    )
}

/// Register names biased towards stems whose derived ports overlap.
fn register_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,3}(_[a-z]{1,3})?",
        "(x|y|reg|sel|we|wb)(_(x|ld|i|o|dat|addr))?",
    ]
}

/// Slaves with random ids and register names, placed at consecutive offsets.
fn named_slaves() -> impl Strategy<Value = Vec<SlaveDescriptor>> {
    let body = (
        prop::collection::vec((register_name(), direction()), 0..5),
        any::<bool>(),
    );
    (
        prop::collection::btree_set("[a-z]{1,3}|wbm", 1..5),
        prop::collection::vec(body, 4),
    )
        .prop_map(|(ids, bodies)| {
            ids.into_iter()
                .zip(bodies)
                .map(|(id, (regs, irq))| {
                    let mut s = SlaveDescriptor::new(id);
                    s.has_interrupt = irq;
                    s.registers = regs
                        .into_iter()
                        .enumerate()
                        .map(|(offset, (name, dir))| RegisterDescriptor::new(name, offset as u64, 8, dir))
                        .collect();
                    s
                })
                .collect()
        })
}

fn slave(registers: Vec<RegisterDescriptor>) -> SlaveDescriptor {
    let mut s = SlaveDescriptor::new("dut");
    s.registers = registers;
    s
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn reset_dominates_any_cycle(regs in registers(), history in prop::collection::vec(access(), 0..16), last in access()) {
        let spec = generate_with_qualifier(&slave(regs), &widths(), WriteQualifier::WriteEnable).unwrap();
        let mut model = SlaveModel::new(&spec);
        for a in &history {
            model.clock(&BusCycle { reset: a.reset, strobe: a.strobe, we: a.we, address: a.address, write_data: a.data, ..BusCycle::default() });
        }
        let mut cycle = BusCycle { reset: true, strobe: last.strobe, we: last.we, address: last.address, write_data: last.data, ..BusCycle::default() };
        for r in &spec.registers {
            cycle.loads.insert(r.name.clone(), last.data);
        }
        model.clock(&cycle);
        for r in &spec.registers {
            prop_assert_eq!(model.value(&r.name), Some(r.reset_value.value()));
        }
    }

    #[test]
    fn only_the_addressed_register_changes(regs in registers(), a in access()) {
        let spec = generate_with_qualifier(&slave(regs), &widths(), WriteQualifier::StrobeOnly).unwrap();
        let mut model = SlaveModel::new(&spec);
        let before: Vec<Option<u64>> = spec.registers.iter().map(|r| model.value(&r.name)).collect();
        model.clock(&BusCycle { strobe: a.strobe, address: a.address, write_data: a.data, ..BusCycle::default() });
        for (r, old) in spec.registers.iter().zip(before) {
            let written = a.strobe && r.selected(a.address) && r.direction.host_writable();
            if written {
                prop_assert_eq!(model.value(&r.name), Some(a.data & low_mask(r.width_bits)));
            } else {
                prop_assert_eq!(model.value(&r.name), old);
            }
        }
        prop_assert_eq!(model.ack(a.strobe), a.strobe);
    }

    #[test]
    fn reads_return_zero_unless_readable(regs in registers(), address in 0u64..40) {
        let spec = generate_with_qualifier(&slave(regs), &widths(), WriteQualifier::StrobeOnly).unwrap();
        let model = SlaveModel::new(&spec);
        let expected = spec
            .register_at(address)
            .filter(|r| r.readable())
            .map(|r| r.reset_value.value())
            .unwrap_or(0);
        prop_assert_eq!(model.read_data(address), expected);
    }

    #[test]
    fn fabric_interrupt_vector_is_highest_priority(irqs in prop::collection::vec(any::<bool>(), 1..8), raised in prop::collection::vec(any::<bool>(), 8)) {
        let slaves: Vec<SlaveDescriptor> = irqs
            .iter()
            .enumerate()
            .map(|(i, &irq)| {
                let mut s = SlaveDescriptor::new(format!("s{i}"));
                s.has_interrupt = irq;
                s
            })
            .collect();
        let out = run(&slaves, &GeneratorConfig::new("soc", widths())).unwrap();
        prop_assert!(check_output(&out).iter().all(|d| !d.is_error()));

        let models = out.register_files.iter().map(SlaveModel::new).collect();
        let fabric = FabricModel::new(&out.fabric, models).unwrap();
        let asserting: BTreeSet<SlaveId> = slaves
            .iter()
            .zip(&raised)
            .filter(|(_, r)| **r)
            .map(|(s, _)| s.id.clone())
            .collect();
        let state = fabric.interrupts(&asserting);

        // Unpinned slaves take priority from input order.
        let winner = irqs
            .iter()
            .zip(&raised)
            .position(|(&irq, &r)| irq && r);
        prop_assert_eq!(state.irq, winner.is_some());
        match winner {
            Some(index) => prop_assert_eq!(state.vector, index as u64),
            None => prop_assert!(state.vector >= slaves.len() as u64),
        }
    }

    #[test]
    fn emitted_declarations_are_unique(slaves in named_slaves(), we_line in any::<bool>()) {
        let qualifier = if we_line { WriteQualifier::WriteEnable } else { WriteQualifier::StrobeOnly };
        let config = GeneratorConfig::new("soc", widths()).with_write_qualifier(qualifier);
        match run(&slaves, &config) {
            Ok(out) => {
                let diagnostics = check_output(&out);
                prop_assert!(diagnostics.iter().all(|d| !d.is_error()), "{:?}", diagnostics);
                for unit in &out.units {
                    let twice = declared_twice(&unit.tokens, unit.kind);
                    prop_assert!(twice.is_empty(), "{} declares {:?} twice", unit.name, twice);
                }
            }
            Err(e) => prop_assert!(
                matches!(
                    e,
                    GenerationError::NameCollision { .. }
                        | GenerationError::InvalidIdentifier { .. }
                        | GenerationError::DuplicateRegisterName { .. }
                ),
                "unexpected error: {}",
                e
            ),
        }
    }

    #[test]
    fn idle_master_leaves_every_slave_unchanged(data in any::<u16>(), core in 0u64..8) {
        let mut a = SlaveDescriptor::new("a");
        a.registers = vec![RegisterDescriptor::new("x", 0, 16, Direction::Both)];
        let mut b = SlaveDescriptor::new("b");
        b.registers = vec![RegisterDescriptor::new("x", 0, 16, Direction::Both)];
        let out = run(&[a, b], &GeneratorConfig::new("soc", widths())).unwrap();
        let models = out.register_files.iter().map(SlaveModel::new).collect();
        let mut fabric = FabricModel::new(&out.fabric, models).unwrap();

        let mut idle = MasterCycle::idle();
        idle.address = widths().join_address(core, 0);
        idle.write_data = u64::from(data);
        let resp = fabric.clock(&idle);
        prop_assert!(!resp.ack);
        prop_assert_eq!(fabric.slave("a").unwrap().value("x"), Some(0));
        prop_assert_eq!(fabric.slave("b").unwrap().value("x"), Some(0));
    }
}
