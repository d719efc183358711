//! VHDL fragment helpers shared by the register-file and fabric generators.

use std::collections::BTreeSet;

/// Indentation unit of emitted fragments.
pub const INDENT: &str = "    ";

/// `std_logic_vector(W-1 downto 0)`.
pub fn slv_type(width: u32) -> String {
    format!("std_logic_vector({} downto 0)", width.saturating_sub(1))
}

/// A vector literal of exactly `width` bits.
///
/// Hex (`x"0A"`) when the width is a multiple of four, binary otherwise.
pub fn slv_literal(value: u64, width: u32) -> String {
    if width % 4 == 0 {
        let digits = (width / 4) as usize;
        format!("x\"{value:0digits$X}\"")
    } else {
        let digits = width as usize;
        format!("\"{value:0digits$b}\"")
    }
}

/// Upper-case constant name from parts, e.g. `REG_CTRL_ADDR`.
pub fn constant_name(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// OR-reduce signals; `'0'` when there are none.
pub fn or_chain(signals: &[String]) -> String {
    if signals.is_empty() {
        "'0'".to_string()
    } else {
        signals.join(" or ")
    }
}

/// Zero-extend `signal` of `from` bits to `to` bits.
pub fn zero_extend(signal: &str, from: u32, to: u32) -> String {
    if from == to {
        signal.to_string()
    } else {
        format!("std_logic_vector(resize(unsigned({signal}), {to}))")
    }
}

/// All-zero aggregate.
pub fn zeros() -> &'static str {
    "(others => '0')"
}

/// First name that repeats an earlier one. VHDL identifiers are
/// case-insensitive, so `REG_A` and `reg_a` collide.
pub fn first_duplicate<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .map(|n| n.as_ref())
        .find(|n| !seen.insert(n.to_ascii_lowercase()))
}

/// Prefix every non-empty line with `depth` indentation units.
pub fn indent(lines: &[String], depth: usize) -> Vec<String> {
    let pad = INDENT.repeat(depth);
    lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{pad}{l}")
            }
        })
        .collect()
}
