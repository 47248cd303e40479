//! Defines the fold drivers for transforming one stanza or every stanza in
//! a store, plus logging setup for binaries built on the library.

use crate::annotate::match_metadata;
use crate::emit::emit_rows;
use crate::errors::{FoldError, Result, Warning};
use crate::options::FoldOptions;
use crate::resolve::resolve_stanza;
use crate::row::{ThickRow, ThinRow};
use crate::stanza::StanzaStore;
use log::{debug, warn};

/// The transformed output of one stanza: its ordered thick rows plus any
/// non-fatal warnings collected along the way.
#[derive(Debug)]
pub struct StanzaFold {
    pub stanza: String,
    pub rows: Vec<ThickRow>,
    pub warnings: Vec<Warning>,
}

/// A stanza whose transformation failed outright.
#[derive(Debug)]
pub struct StanzaFailure {
    pub stanza: String,
    pub error: FoldError,
}

/// Per-stanza outcomes of folding a whole store. A fatal error aborts only
/// its own stanza; the rest of the batch still folds.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub folds: Vec<StanzaFold>,
    pub failures: Vec<StanzaFailure>,
}

impl BatchOutcome {
    /// All thick rows across successful stanzas, in store order.
    pub fn rows(&self) -> impl Iterator<Item = &ThickRow> + '_ {
        self.folds.iter().flat_map(|fold| fold.rows.iter())
    }

    pub fn has_warnings(&self) -> bool {
        self.folds.iter().any(|fold| !fold.warnings.is_empty())
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.has_warnings()
    }
}

/// Initializes logging for the rowfold library.
///
/// This function checks for the `ROWFOLD_LOG` environment variable. If it is
/// set, `RUST_LOG` is set to its value. `ROWFOLD_LOG` takes precedence over
/// `RUST_LOG`. The logger initialization (e.g., `env_logger::init()`) must be
/// called after this function for the log level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("ROWFOLD_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

/// Transforms one stanza's thin rows into thick rows.
///
/// Fails outright if any row breaks the object/value mutual-exclusion
/// contract; structural problems in blank-node idioms degrade to warnings on
/// the returned fold instead.
pub fn fold_stanza(stanza: &str, rows: &[ThinRow], options: &FoldOptions) -> Result<StanzaFold> {
    for (i, row) in rows.iter().enumerate() {
        if let Err(reason) = row.check_invariant() {
            return Err(FoldError::InvariantViolation {
                stanza: stanza.to_string(),
                row: i,
                reason,
            });
        }
    }

    debug!("folding stanza {} with {} rows", stanza, rows.len());
    let mut resolution = resolve_stanza(rows);
    let attachments = match_metadata(rows, &mut resolution, options.match_policy);
    let rows = emit_rows(rows, &resolution, attachments);
    for warning in &resolution.warnings {
        warn!("{}: {}", stanza, warning);
    }
    Ok(StanzaFold {
        stanza: stanza.to_string(),
        rows,
        warnings: resolution.warnings,
    })
}

/// Folds every stanza in the store, in first-appearance order. Stanzas are
/// independent; a fatal error lands in `failures` without stopping the
/// batch.
pub fn fold_store(store: &StanzaStore, options: &FoldOptions) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for (stanza, rows) in store.stanzas() {
        match fold_stanza(stanza, rows, options) {
            Ok(fold) => outcome.folds.push(fold),
            Err(error) => outcome.failures.push(StanzaFailure {
                stanza: stanza.to_string(),
                error,
            }),
        }
    }
    outcome
}
