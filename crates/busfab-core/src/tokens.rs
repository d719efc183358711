//! Output boundary: token to text-fragment maps.
//!
//! Generators express every structural decision as a finished fragment
//! keyed by a [`Token`]. The renderer only substitutes fragments into
//! templates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which template a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenLevel {
    Fabric,
    RegisterFile,
    Both,
}

/// A named fragment slot in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Token {
    // Shared layout
    EntityName,
    BusConstants,

    // Fabric level
    SlaveAddressConstants,
    SlaveSignalDeclarations,
    SelectSignalDeclarations,
    CommonSignalConnections,
    ReadDataMultiplexer,
    AddressComparator,
    AcknowledgeOrGate,
    StrobeAndGates,
    IrqVectorDeclaration,
    InterruptPriorityDecoder,
    InterruptOrGate,

    // Register-file level
    RegisterAddressConstants,
    SignalDefinitions,
    AddressComparators,
    RegisterEnables,
    RegisterInputs,
    RegisterOutputDemultiplexer,
    RegisterOutputs,
    OutputAssignments,
    InterruptPorts,
    InterruptAssignment,
    ResetAssignments,
    StoreConditions,
}

impl Token {
    /// Every token, in declaration order.
    pub const ALL: &'static [Token] = &[
        Token::EntityName,
        Token::BusConstants,
        Token::SlaveAddressConstants,
        Token::SlaveSignalDeclarations,
        Token::SelectSignalDeclarations,
        Token::CommonSignalConnections,
        Token::ReadDataMultiplexer,
        Token::AddressComparator,
        Token::AcknowledgeOrGate,
        Token::StrobeAndGates,
        Token::IrqVectorDeclaration,
        Token::InterruptPriorityDecoder,
        Token::InterruptOrGate,
        Token::RegisterAddressConstants,
        Token::SignalDefinitions,
        Token::AddressComparators,
        Token::RegisterEnables,
        Token::RegisterInputs,
        Token::RegisterOutputDemultiplexer,
        Token::RegisterOutputs,
        Token::OutputAssignments,
        Token::InterruptPorts,
        Token::InterruptAssignment,
        Token::ResetAssignments,
        Token::StoreConditions,
    ];

    /// Placeholder name as written in templates (`%name%`).
    pub fn name(&self) -> &'static str {
        match self {
            Token::EntityName => "entity-name",
            Token::BusConstants => "bus-constants",
            Token::SlaveAddressConstants => "slave-address-constants",
            Token::SlaveSignalDeclarations => "slave-signal-declarations",
            Token::SelectSignalDeclarations => "select-signal-declarations",
            Token::CommonSignalConnections => "common-signal-connections",
            Token::ReadDataMultiplexer => "read-data-multiplexer",
            Token::AddressComparator => "address-comparator",
            Token::AcknowledgeOrGate => "acknowledge-or-gate",
            Token::StrobeAndGates => "strobe-and-gates",
            Token::IrqVectorDeclaration => "irq-vector-declaration",
            Token::InterruptPriorityDecoder => "interrupt-priority-decoder",
            Token::InterruptOrGate => "interrupt-or-gate",
            Token::RegisterAddressConstants => "register-address-constants",
            Token::SignalDefinitions => "signal-definitions",
            Token::AddressComparators => "address-comparators",
            Token::RegisterEnables => "register-enables",
            Token::RegisterInputs => "register-inputs",
            Token::RegisterOutputDemultiplexer => "register-output-demultiplexer",
            Token::RegisterOutputs => "register-outputs",
            Token::OutputAssignments => "output-assignments",
            Token::InterruptPorts => "interrupt-ports",
            Token::InterruptAssignment => "interrupt-assignment",
            Token::ResetAssignments => "reset-assignments",
            Token::StoreConditions => "store-conditions",
        }
    }

    /// Parse a placeholder name.
    pub fn parse(name: &str) -> Option<Token> {
        Token::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn level(&self) -> TokenLevel {
        match self {
            Token::EntityName | Token::BusConstants => TokenLevel::Both,
            Token::SlaveAddressConstants
            | Token::SlaveSignalDeclarations
            | Token::SelectSignalDeclarations
            | Token::CommonSignalConnections
            | Token::ReadDataMultiplexer
            | Token::AddressComparator
            | Token::AcknowledgeOrGate
            | Token::StrobeAndGates
            | Token::IrqVectorDeclaration
            | Token::InterruptPriorityDecoder
            | Token::InterruptOrGate => TokenLevel::Fabric,
            _ => TokenLevel::RegisterFile,
        }
    }

    /// Tokens every fabric map carries.
    pub fn fabric_tokens() -> impl Iterator<Item = Token> {
        Token::ALL
            .iter()
            .copied()
            .filter(|t| matches!(t.level(), TokenLevel::Fabric | TokenLevel::Both))
    }

    /// Tokens every register-file map carries.
    pub fn register_file_tokens() -> impl Iterator<Item = Token> {
        Token::ALL
            .iter()
            .copied()
            .filter(|t| matches!(t.level(), TokenLevel::RegisterFile | TokenLevel::Both))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered token to fragment map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenMap {
    entries: BTreeMap<Token, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fragment, replacing any previous one.
    pub fn insert(&mut self, token: Token, text: impl Into<String>) {
        self.entries.insert(token, text.into());
    }

    /// Set a fragment from lines, joined with newlines.
    pub fn insert_lines(&mut self, token: Token, lines: Vec<String>) {
        self.entries.insert(token, lines.join("\n"));
    }

    pub fn get(&self, token: Token) -> Option<&str> {
        self.entries.get(&token).map(String::as_str)
    }

    pub fn contains(&self, token: Token) -> bool {
        self.entries.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Token, &str)> {
        self.entries.iter().map(|(t, s)| (*t, s.as_str()))
    }

    /// Required tokens of `level` that this map lacks.
    pub fn missing(&self, level: TokenLevel) -> Vec<Token> {
        let required: Vec<Token> = match level {
            TokenLevel::Fabric => Token::fabric_tokens().collect(),
            TokenLevel::RegisterFile => Token::register_file_tokens().collect(),
            TokenLevel::Both => Token::ALL.to_vec(),
        };
        required
            .into_iter()
            .filter(|t| !self.contains(*t))
            .collect()
    }
}

/// The kind of file a render unit becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    RegisterFile,
    Fabric,
}

impl UnitKind {
    /// Token level a unit of this kind must satisfy.
    pub fn level(&self) -> TokenLevel {
        match self {
            UnitKind::RegisterFile => TokenLevel::RegisterFile,
            UnitKind::Fabric => TokenLevel::Fabric,
        }
    }
}

/// One generated unit handed to the renderer: a name and its fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderUnit {
    /// Unit name, also the output file stem.
    pub name: String,
    pub kind: UnitKind,
    pub tokens: TokenMap,
}
