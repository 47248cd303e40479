// Fold errors and warnings

use std::fmt;

/// Errors that abort a single stanza's transformation outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    /// A thin row broke the object/value mutual-exclusion contract.
    InvariantViolation {
        stanza: String,
        row: usize,
        reason: &'static str,
    },
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::InvariantViolation { stanza, row, reason } => {
                write!(f, "row {} of stanza {}: {}", row, stanza, reason)
            }
        }
    }
}

impl std::error::Error for FoldError {}

pub type Result<T> = std::result::Result<T, FoldError>;

/// The four blank-node structures the resolver recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    List,
    Restriction,
    Axiom,
    Statement,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let term = match self {
            StructureKind::List => "rdf:List",
            StructureKind::Restriction => "owl:Restriction",
            StructureKind::Axiom => "owl:Axiom",
            StructureKind::Statement => "rdf:Statement",
        };
        write!(f, "{}", term)
    }
}

/// Non-fatal problems surfaced alongside a stanza's thick rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A blank node typed as one of the recognized structures was malformed
    /// and its rows were passed through unresolved.
    Structural {
        node: String,
        kind: StructureKind,
        reason: String,
    },
    /// A resolved axiom or statement had no candidate row matching its
    /// target key; its payload was dropped from the output.
    DanglingAnnotation { node: String, kind: StructureKind },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Structural { node, kind, reason } => {
                write!(f, "malformed {} node {}: {}", kind, node, reason)
            }
            Warning::DanglingAnnotation { node, kind } => {
                write!(f, "dangling {} node {}: no row matches its target triple", kind, node)
            }
        }
    }
}
