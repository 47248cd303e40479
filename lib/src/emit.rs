//! Emits the final thick rows from the rows that survived resolution.

use crate::annotate::Attachments;
use crate::resolve::Resolution;
use crate::row::{ThickRow, ThinRow};
use serde_json::Value;

/// Produces one thick row per unabsorbed thin row, in input order.
/// Blank-node objects with a resolution are substituted into the value
/// field; everything else is copied verbatim.
pub fn emit_rows(
    rows: &[ThinRow],
    resolution: &Resolution,
    mut attachments: Attachments,
) -> Vec<ThickRow> {
    let mut thick_rows = Vec::with_capacity(rows.len() - resolution.absorbed.len());
    for (i, row) in rows.iter().enumerate() {
        if resolution.absorbed.contains(&i) {
            continue;
        }
        let mut thick = ThickRow {
            subject: row.subject.clone(),
            predicate: row.predicate.clone(),
            ..Default::default()
        };
        if !row.object.is_empty() {
            match resolution.resolved.get(row.object.as_str()) {
                Some(value) => thick.value = Some(value.to_json()),
                None => thick.object = Some(row.object.clone()),
            }
        } else {
            thick.value = Some(Value::String(row.value.clone()));
            if !row.datatype.is_empty() {
                thick.datatype = Some(row.datatype.clone());
            }
            if !row.language.is_empty() {
                thick.language = Some(row.language.clone());
            }
        }
        thick.annotations = attachments.annotations.remove(&i).unwrap_or_default();
        thick.metadata = attachments.metadata.remove(&i).unwrap_or_default();
        thick_rows.push(thick);
    }
    thick_rows
}
