//! rowfold — folds flat "thin" RDF rows into nested "thick" rows.
//!
//! Thin rows are one-row-per-triple records grouped by top-level subject
//! ("stanza"). Blank-node subjects encoding the standard RDF/OWL idioms —
//! `rdf:List` chains, `owl:Restriction` nodes, `owl:Axiom` annotations and
//! reified `rdf:Statement` nodes — are folded into the triple that
//! references them instead of surfacing as independent rows.
//!
//! Quick start
//!
//! ```
//! use rowfold::{fold_store, FoldOptions, StanzaStore, ThinRow};
//!
//! let fields = [
//!     ["ex:foo", "ex:foo", "ex:items", "_:l1", "", "", ""],
//!     ["ex:foo", "_:l1", "rdf:type", "rdf:List", "", "", ""],
//!     ["ex:foo", "_:l1", "rdf:first", "", "A", "", ""],
//!     ["ex:foo", "_:l1", "rdf:rest", "rdf:nil", "", "", ""],
//! ];
//! let store = StanzaStore::from_rows(
//!     fields.map(|f| ThinRow::from_fields(f.map(String::from))),
//! );
//! let outcome = fold_store(&store, &FoldOptions::default());
//! let rows: Vec<_> = outcome.rows().collect();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].value, Some(serde_json::json!(["A"])));
//! ```

pub mod annotate;
pub mod api;
pub mod consts;
pub mod emit;
pub mod errors;
pub mod options;
pub mod resolve;
pub mod row;
pub mod stanza;

pub use api::{fold_stanza, fold_store, init_logging, BatchOutcome, StanzaFailure, StanzaFold};
pub use errors::{FoldError, Result, StructureKind, Warning};
pub use options::{FoldOptions, MatchPolicy};
pub use row::{Payload, PayloadTerm, ThickRow, ThinRow};
pub use stanza::StanzaStore;
