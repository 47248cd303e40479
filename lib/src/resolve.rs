//! Classifies blank-node subjects by their `rdf:type` and materializes the
//! four recognized idioms — collection lists, property restrictions,
//! annotation axioms, and reified statements — into nested values.

use crate::consts::*;
use crate::errors::{StructureKind, Warning};
use crate::row::{is_blank, Payload, PayloadTerm, ThinRow};
use log::debug;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Nested structures deeper than this fail closed with a structural error.
const MAX_RESOLVE_DEPTH: usize = 128;

/// Role assigned to a blank-node subject from its `rdf:type` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    List,
    Restriction,
    Axiom,
    Statement,
    /// No recognized type; the node passes through as an opaque reference.
    Opaque,
}

impl NodeRole {
    fn from_type(object: &str) -> Option<NodeRole> {
        match object {
            RDF_LIST => Some(NodeRole::List),
            OWL_RESTRICTION => Some(NodeRole::Restriction),
            OWL_AXIOM => Some(NodeRole::Axiom),
            RDF_STATEMENT => Some(NodeRole::Statement),
            _ => None,
        }
    }

    fn kind(self) -> Option<StructureKind> {
        match self {
            NodeRole::List => Some(StructureKind::List),
            NodeRole::Restriction => Some(StructureKind::Restriction),
            NodeRole::Axiom => Some(StructureKind::Axiom),
            NodeRole::Statement => Some(StructureKind::Statement),
            NodeRole::Opaque => None,
        }
    }
}

/// Materialized substitute for a blank-node reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// Ordered elements of an `rdf:List` chain.
    List(Vec<ResolvedValue>),
    /// An `owl:Restriction` collapsed to property + kind + filler.
    Restriction {
        property: String,
        kind: &'static str,
        filler: Box<ResolvedValue>,
    },
    /// IRI or unresolved blank-node identifier.
    Reference(String),
    /// Literal element with its optional datatype or language tag.
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl ResolvedValue {
    /// Renders the value as the JSON tree placed in a thick row's value
    /// field. Plain literals and references collapse to bare strings.
    pub fn to_json(&self) -> Value {
        match self {
            ResolvedValue::List(items) => {
                Value::Array(items.iter().map(|item| item.to_json()).collect())
            }
            ResolvedValue::Restriction {
                property,
                kind,
                filler,
            } => {
                let mut map = Map::new();
                map.insert("property".to_string(), Value::String(property.clone()));
                map.insert(
                    "restrictionKind".to_string(),
                    Value::String((*kind).to_string()),
                );
                map.insert("filler".to_string(), filler.to_json());
                Value::Object(map)
            }
            ResolvedValue::Reference(id) => Value::String(id.clone()),
            ResolvedValue::Literal {
                value,
                datatype,
                language,
            } => {
                if datatype.is_none() && language.is_none() {
                    Value::String(value.clone())
                } else {
                    let mut map = Map::new();
                    map.insert("value".to_string(), Value::String(value.clone()));
                    if let Some(datatype) = datatype {
                        map.insert("datatype".to_string(), Value::String(datatype.clone()));
                    }
                    if let Some(language) = language {
                        map.insert("language".to_string(), Value::String(language.clone()));
                    }
                    Value::Object(map)
                }
            }
        }
    }
}

/// The (subject, predicate, object-or-value) identity an axiom or statement
/// payload attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetKey {
    pub subject: String,
    pub predicate: String,
    pub target: PayloadTerm,
}

/// A resolved `owl:Axiom` or `rdf:Statement` node awaiting attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataNode {
    pub node: String,
    pub kind: StructureKind,
    pub key: TargetKey,
    pub payload: Payload,
}

/// Per-stanza output of blank-node resolution, handed on to the annotation
/// matcher and the emitter.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Inline-substitutable values (lists and restrictions) by blank id.
    pub resolved: HashMap<String, ResolvedValue>,
    /// Axiom/statement structures awaiting attachment.
    pub pending: Vec<MetadataNode>,
    /// Indexes of rows absorbed into resolved structures.
    pub absorbed: HashSet<usize>,
    pub warnings: Vec<Warning>,
}

/// Resolves every blank-node subject in one stanza's rows.
pub fn resolve_stanza(rows: &[ThinRow]) -> Resolution {
    Resolver::new(rows).run()
}

struct Resolver<'a> {
    rows: &'a [ThinRow],
    by_subject: HashMap<&'a str, Vec<usize>>,
    blank_order: Vec<&'a str>,
    roles: HashMap<&'a str, NodeRole>,
    in_progress: HashSet<&'a str>,
    failed: HashSet<&'a str>,
    out: Resolution,
}

impl<'a> Resolver<'a> {
    fn new(rows: &'a [ThinRow]) -> Self {
        let mut by_subject: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut blank_order: Vec<&str> = vec![];
        for (i, row) in rows.iter().enumerate() {
            let entry = by_subject.entry(row.subject.as_str()).or_default();
            if entry.is_empty() && is_blank(&row.subject) {
                blank_order.push(row.subject.as_str());
            }
            entry.push(i);
        }

        let mut roles: HashMap<&str, NodeRole> = HashMap::new();
        let mut out = Resolution::default();
        for &node in &blank_order {
            let mut found: Vec<NodeRole> = vec![];
            for &i in &by_subject[node] {
                let row = &rows[i];
                if row.predicate != RDF_TYPE || row.object.is_empty() {
                    continue;
                }
                if let Some(role) = NodeRole::from_type(&row.object) {
                    if !found.contains(&role) {
                        found.push(role);
                    }
                }
            }
            let role = match found.as_slice() {
                [] => NodeRole::Opaque,
                [role] => *role,
                [first, ..] => {
                    if let Some(kind) = first.kind() {
                        out.warnings.push(Warning::Structural {
                            node: node.to_string(),
                            kind,
                            reason: "more than one recognized rdf:type".to_string(),
                        });
                    }
                    NodeRole::Opaque
                }
            };
            roles.insert(node, role);
        }

        Resolver {
            rows,
            by_subject,
            blank_order,
            roles,
            in_progress: HashSet::new(),
            failed: HashSet::new(),
            out,
        }
    }

    fn run(mut self) -> Resolution {
        for i in 0..self.blank_order.len() {
            let node = self.blank_order[i];
            self.resolve_node(node, 0);
        }
        self.out
    }

    /// Records a structural error for the node and leaves it unresolved.
    fn fail(&mut self, node: &'a str, kind: StructureKind, reason: String) -> Option<ResolvedValue> {
        debug!("leaving {} node {} unresolved: {}", kind, node, reason);
        self.out.warnings.push(Warning::Structural {
            node: node.to_string(),
            kind,
            reason,
        });
        self.failed.insert(node);
        None
    }

    /// Commits a successful resolution unless a cycle through this node
    /// surfaced while it was being resolved.
    fn commit(
        &mut self,
        node: &'a str,
        value: ResolvedValue,
        to_absorb: Vec<usize>,
    ) -> Option<ResolvedValue> {
        if self.failed.contains(node) {
            return None;
        }
        self.out.absorbed.extend(to_absorb);
        self.out.resolved.insert(node.to_string(), value.clone());
        Some(value)
    }

    fn resolve_node(&mut self, node: &'a str, depth: usize) -> Option<ResolvedValue> {
        if let Some(value) = self.out.resolved.get(node) {
            return Some(value.clone());
        }
        if self.failed.contains(node) {
            return None;
        }
        let role = self.roles.get(node).copied().unwrap_or(NodeRole::Opaque);
        let kind = role.kind()?;
        if self.in_progress.contains(node) {
            return self.fail(node, kind, "cyclic reference".to_string());
        }
        if depth >= MAX_RESOLVE_DEPTH {
            return self.fail(
                node,
                kind,
                format!("nesting exceeds depth bound {}", MAX_RESOLVE_DEPTH),
            );
        }
        self.in_progress.insert(node);
        let result = match kind {
            StructureKind::List => self.resolve_list(node, depth),
            StructureKind::Restriction => self.resolve_restriction(node, depth),
            StructureKind::Axiom => self.resolve_metadata(
                node,
                kind,
                OWL_ANNOTATED_SOURCE,
                OWL_ANNOTATED_PROPERTY,
                OWL_ANNOTATED_TARGET,
            ),
            StructureKind::Statement => {
                self.resolve_metadata(node, kind, RDF_SUBJECT, RDF_PREDICATE, RDF_OBJECT)
            }
        };
        self.in_progress.remove(node);
        result
    }

    /// Resolves the element sitting in an object position: literals stay
    /// literal, resolvable blank nodes are materialized, everything else is
    /// kept as a reference.
    fn resolve_element(&mut self, row_index: usize, depth: usize) -> ResolvedValue {
        let rows = self.rows;
        let row = &rows[row_index];
        if row.object.is_empty() {
            return ResolvedValue::Literal {
                value: row.value.clone(),
                datatype: (!row.datatype.is_empty()).then(|| row.datatype.clone()),
                language: (!row.language.is_empty()).then(|| row.language.clone()),
            };
        }
        let object = row.object.as_str();
        if is_blank(object) {
            if let Some(value) = self.resolve_node(object, depth + 1) {
                return value;
            }
        }
        ResolvedValue::Reference(object.to_string())
    }

    fn resolve_list(&mut self, head: &'a str, depth: usize) -> Option<ResolvedValue> {
        let rows = self.rows;
        let mut elements: Vec<ResolvedValue> = vec![];
        let mut to_absorb: Vec<usize> = vec![];
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut cell = head;
        loop {
            if !seen.insert(cell) {
                return self.fail(
                    head,
                    StructureKind::List,
                    format!("cycle through list cell {}", cell),
                );
            }
            let idxs = match self.by_subject.get(cell) {
                Some(idxs) => idxs.clone(),
                None => {
                    return self.fail(
                        head,
                        StructureKind::List,
                        format!("list cell {} has no rows", cell),
                    )
                }
            };
            let firsts: Vec<usize> = idxs
                .iter()
                .copied()
                .filter(|&i| rows[i].predicate == RDF_FIRST)
                .collect();
            let rests: Vec<usize> = idxs
                .iter()
                .copied()
                .filter(|&i| rows[i].predicate == RDF_REST)
                .collect();
            if firsts.len() != 1 {
                return self.fail(
                    head,
                    StructureKind::List,
                    format!("list cell {} must have exactly one rdf:first", cell),
                );
            }
            if rests.len() != 1 {
                return self.fail(
                    head,
                    StructureKind::List,
                    format!("list cell {} must have exactly one rdf:rest", cell),
                );
            }
            elements.push(self.resolve_element(firsts[0], depth));
            to_absorb.extend(idxs);

            let rest = rows[rests[0]].object.as_str();
            if rest == RDF_NIL {
                break;
            }
            if is_blank(rest) && matches!(self.roles.get(rest), Some(NodeRole::List)) {
                cell = rest;
                continue;
            }
            return self.fail(
                head,
                StructureKind::List,
                format!(
                    "rdf:rest of {} must point to rdf:nil or another list node",
                    cell
                ),
            );
        }
        self.commit(head, ResolvedValue::List(elements), to_absorb)
    }

    fn resolve_restriction(&mut self, node: &'a str, depth: usize) -> Option<ResolvedValue> {
        let rows = self.rows;
        let idxs = self.by_subject.get(node).cloned().unwrap_or_default();
        let props: Vec<usize> = idxs
            .iter()
            .copied()
            .filter(|&i| rows[i].predicate == OWL_ON_PROPERTY)
            .collect();
        if props.len() != 1 {
            return self.fail(
                node,
                StructureKind::Restriction,
                "must have exactly one owl:onProperty".to_string(),
            );
        }
        if rows[props[0]].object.is_empty() {
            return self.fail(
                node,
                StructureKind::Restriction,
                "owl:onProperty must be an IRI".to_string(),
            );
        }

        // first present value-restriction predicate wins
        let mut found: Option<(&'static str, &'static str, Vec<usize>)> = None;
        for (predicate, kind) in RESTRICTION_KINDS {
            let hits: Vec<usize> = idxs
                .iter()
                .copied()
                .filter(|&i| rows[i].predicate == predicate)
                .collect();
            if !hits.is_empty() {
                found = Some((predicate, kind, hits));
                break;
            }
        }
        let (predicate, kind, hits) = match found {
            Some(found) => found,
            None => {
                return self.fail(
                    node,
                    StructureKind::Restriction,
                    "no value-restriction predicate found".to_string(),
                )
            }
        };
        if hits.len() != 1 {
            return self.fail(
                node,
                StructureKind::Restriction,
                format!("must have exactly one {}", predicate),
            );
        }

        let property = rows[props[0]].object.clone();
        let filler = self.resolve_element(hits[0], depth);
        self.commit(
            node,
            ResolvedValue::Restriction {
                property,
                kind,
                filler: Box::new(filler),
            },
            idxs,
        )
    }

    /// Resolves an axiom or statement node into a pending metadata record
    /// for the annotation matcher. Never substituted inline.
    fn resolve_metadata(
        &mut self,
        node: &'a str,
        kind: StructureKind,
        subject_pred: &str,
        predicate_pred: &str,
        object_pred: &str,
    ) -> Option<ResolvedValue> {
        let rows = self.rows;
        let idxs = self.by_subject.get(node).cloned().unwrap_or_default();
        let pick = |predicate: &str| -> Vec<usize> {
            idxs.iter()
                .copied()
                .filter(|&i| rows[i].predicate == predicate)
                .collect()
        };
        let subjects = pick(subject_pred);
        let predicates = pick(predicate_pred);
        let objects = pick(object_pred);
        for (predicate, found) in [
            (subject_pred, &subjects),
            (predicate_pred, &predicates),
            (object_pred, &objects),
        ] {
            if found.len() != 1 {
                return self.fail(node, kind, format!("must have exactly one {}", predicate));
            }
        }
        for (predicate, index) in [(subject_pred, subjects[0]), (predicate_pred, predicates[0])] {
            if rows[index].object.is_empty() {
                return self.fail(
                    node,
                    kind,
                    format!("{} must be an IRI or blank node", predicate),
                );
            }
        }

        let key_rows: HashSet<usize> = [subjects[0], predicates[0], objects[0]]
            .into_iter()
            .collect();
        let mut payload = Payload::new();
        for &i in &idxs {
            let row = &rows[i];
            if key_rows.contains(&i) || row.predicate == RDF_TYPE {
                continue;
            }
            payload
                .entry(row.predicate.clone())
                .or_default()
                .push(PayloadTerm::from_row(row));
        }
        if payload.is_empty() {
            return self.fail(node, kind, "carries no annotation payload".to_string());
        }

        if self.failed.contains(node) {
            return None;
        }
        self.out.absorbed.extend(idxs);
        self.out.pending.push(MetadataNode {
            node: node.to_string(),
            kind,
            key: TargetKey {
                subject: rows[subjects[0]].object.clone(),
                predicate: rows[predicates[0]].object.clone(),
                target: PayloadTerm::from_row(&rows[objects[0]]),
            },
            payload,
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(subject: &str, predicate: &str, object: &str) -> ThinRow {
        ThinRow {
            stanza: "ex:foo".to_string(),
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            value: String::new(),
            datatype: String::new(),
            language: String::new(),
        }
    }

    fn lit(subject: &str, predicate: &str, value: &str) -> ThinRow {
        ThinRow {
            stanza: "ex:foo".to_string(),
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: String::new(),
            value: value.to_string(),
            datatype: String::new(),
            language: String::new(),
        }
    }

    #[test]
    fn test_list_resolution_order() {
        let rows = vec![
            obj("ex:foo", "ex:items", "_:l1"),
            obj("_:l1", "rdf:type", "rdf:List"),
            lit("_:l1", "rdf:first", "A"),
            obj("_:l1", "rdf:rest", "_:l2"),
            obj("_:l2", "rdf:type", "rdf:List"),
            lit("_:l2", "rdf:first", "B"),
            obj("_:l2", "rdf:rest", "rdf:nil"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.warnings.is_empty());
        let value = resolution.resolved.get("_:l1").unwrap();
        assert_eq!(value.to_json(), json!(["A", "B"]));
        // cell rows absorbed, referencing row untouched
        assert_eq!(resolution.absorbed.len(), 6);
        assert!(!resolution.absorbed.contains(&0));
    }

    #[test]
    fn test_list_missing_rest() {
        let rows = vec![
            obj("ex:foo", "ex:items", "_:l1"),
            obj("_:l1", "rdf:type", "rdf:List"),
            lit("_:l1", "rdf:first", "A"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.resolved.is_empty());
        assert!(resolution.absorbed.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
        assert!(matches!(
            &resolution.warnings[0],
            Warning::Structural {
                node,
                kind: StructureKind::List,
                ..
            } if node == "_:l1"
        ));
    }

    #[test]
    fn test_list_cycle_fails_closed() {
        let rows = vec![
            obj("_:l1", "rdf:type", "rdf:List"),
            lit("_:l1", "rdf:first", "A"),
            obj("_:l1", "rdf:rest", "_:l2"),
            obj("_:l2", "rdf:type", "rdf:List"),
            lit("_:l2", "rdf:first", "B"),
            obj("_:l2", "rdf:rest", "_:l1"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.resolved.is_empty());
        assert!(resolution.absorbed.is_empty());
        assert_eq!(resolution.warnings.len(), 2);
    }

    #[test]
    fn test_restriction_resolution() {
        let rows = vec![
            obj("ex:foo", "rdfs:subClassOf", "_:r"),
            obj("_:r", "rdf:type", "owl:Restriction"),
            obj("_:r", "owl:onProperty", "ex:part-of"),
            obj("_:r", "owl:someValuesFrom", "ex:bar"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.warnings.is_empty());
        let value = resolution.resolved.get("_:r").unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "property": "ex:part-of",
                "restrictionKind": "someValuesFrom",
                "filler": "ex:bar",
            })
        );
        assert_eq!(resolution.absorbed.len(), 3);
    }

    #[test]
    fn test_restriction_missing_property() {
        let rows = vec![
            obj("_:r", "rdf:type", "owl:Restriction"),
            obj("_:r", "owl:someValuesFrom", "ex:bar"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_nested_restriction_filler() {
        let rows = vec![
            obj("_:r", "rdf:type", "owl:Restriction"),
            obj("_:r", "owl:onProperty", "ex:part-of"),
            obj("_:r", "owl:someValuesFrom", "_:l1"),
            obj("_:l1", "rdf:type", "rdf:List"),
            lit("_:l1", "rdf:first", "A"),
            obj("_:l1", "rdf:rest", "rdf:nil"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.warnings.is_empty());
        let value = resolution.resolved.get("_:r").unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "property": "ex:part-of",
                "restrictionKind": "someValuesFrom",
                "filler": ["A"],
            })
        );
    }

    #[test]
    fn test_axiom_resolution() {
        let rows = vec![
            obj("ex:foo", "ex:link", "<https://example.com/FOO>"),
            obj("_:a", "rdf:type", "owl:Axiom"),
            obj("_:a", "owl:annotatedSource", "ex:foo"),
            obj("_:a", "owl:annotatedProperty", "ex:link"),
            obj("_:a", "owl:annotatedTarget", "<https://example.com/FOO>"),
            lit("_:a", "rdfs:comment", "OWL axiom annotation"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.warnings.is_empty());
        assert_eq!(resolution.pending.len(), 1);
        let node = &resolution.pending[0];
        assert_eq!(node.kind, StructureKind::Axiom);
        assert_eq!(node.key.subject, "ex:foo");
        assert_eq!(node.key.predicate, "ex:link");
        assert_eq!(
            node.key.target.object.as_deref(),
            Some("<https://example.com/FOO>")
        );
        assert_eq!(node.payload.len(), 1);
        assert_eq!(resolution.absorbed.len(), 5);
    }

    #[test]
    fn test_axiom_without_payload() {
        let rows = vec![
            obj("_:a", "rdf:type", "owl:Axiom"),
            obj("_:a", "owl:annotatedSource", "ex:foo"),
            obj("_:a", "owl:annotatedProperty", "ex:link"),
            obj("_:a", "owl:annotatedTarget", "ex:bar"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.pending.is_empty());
        assert!(resolution.absorbed.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_untyped_blank_is_opaque() {
        let rows = vec![
            obj("ex:foo", "ex:p", "_:b"),
            lit("_:b", "rdfs:comment", "no type here"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.resolved.is_empty());
        assert!(resolution.warnings.is_empty());
        assert!(resolution.absorbed.is_empty());
    }

    #[test]
    fn test_ambiguous_types_warn() {
        let rows = vec![
            obj("_:b", "rdf:type", "rdf:List"),
            obj("_:b", "rdf:type", "owl:Axiom"),
            lit("_:b", "rdf:first", "A"),
        ];
        let resolution = resolve_stanza(&rows);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
    }
}
