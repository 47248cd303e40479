//! Routes resolved axiom and statement payloads to the candidate rows
//! matching their target keys.

use crate::errors::{StructureKind, Warning};
use crate::options::MatchPolicy;
use crate::resolve::Resolution;
use crate::row::{Payload, ThinRow};
use log::debug;
use std::collections::HashMap;

/// Payloads routed to candidate row indexes by the matcher.
#[derive(Debug, Default)]
pub struct Attachments {
    pub annotations: HashMap<usize, Vec<Payload>>,
    pub metadata: HashMap<usize, Vec<Payload>>,
}

/// Scans the candidate rows for each pending metadata node's target key and
/// routes the payload to the matching rows; payloads accumulate in arrival
/// order. A node with no matching row becomes a dangling-annotation warning
/// and its payload is dropped.
pub fn match_metadata(
    rows: &[ThinRow],
    resolution: &mut Resolution,
    policy: MatchPolicy,
) -> Attachments {
    let mut attachments = Attachments::default();
    let pending = std::mem::take(&mut resolution.pending);
    for node in &pending {
        let mut matched = false;
        for (i, row) in rows.iter().enumerate() {
            if resolution.absorbed.contains(&i) {
                continue;
            }
            if row.subject != node.key.subject
                || row.predicate != node.key.predicate
                || !node.key.target.matches_row(row)
            {
                continue;
            }
            debug!("attaching {} node {} to row {}", node.kind, node.node, i);
            let slot = match node.kind {
                StructureKind::Statement => &mut attachments.metadata,
                _ => &mut attachments.annotations,
            };
            slot.entry(i).or_default().push(node.payload.clone());
            matched = true;
            if policy.is_first() {
                break;
            }
        }
        if !matched {
            resolution.warnings.push(Warning::DanglingAnnotation {
                node: node.node.clone(),
                kind: node.kind,
            });
        }
    }
    attachments
}
