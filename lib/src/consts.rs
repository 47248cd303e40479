//! Defines constants for the RDF and OWL terms that drive blank-node
//! classification, in their prefixed-name form as they appear in thin rows.

pub const RDF_TYPE: &str = "rdf:type";

// list idiom
pub const RDF_LIST: &str = "rdf:List";
pub const RDF_FIRST: &str = "rdf:first";
pub const RDF_REST: &str = "rdf:rest";
pub const RDF_NIL: &str = "rdf:nil";

// property restrictions
pub const OWL_RESTRICTION: &str = "owl:Restriction";
pub const OWL_ON_PROPERTY: &str = "owl:onProperty";
pub const OWL_SOME_VALUES_FROM: &str = "owl:someValuesFrom";
pub const OWL_ALL_VALUES_FROM: &str = "owl:allValuesFrom";
pub const OWL_HAS_VALUE: &str = "owl:hasValue";

// annotation axioms
pub const OWL_AXIOM: &str = "owl:Axiom";
pub const OWL_ANNOTATED_SOURCE: &str = "owl:annotatedSource";
pub const OWL_ANNOTATED_PROPERTY: &str = "owl:annotatedProperty";
pub const OWL_ANNOTATED_TARGET: &str = "owl:annotatedTarget";

// reified statements
pub const RDF_STATEMENT: &str = "rdf:Statement";
pub const RDF_SUBJECT: &str = "rdf:subject";
pub const RDF_PREDICATE: &str = "rdf:predicate";
pub const RDF_OBJECT: &str = "rdf:object";

/// Value-restriction predicates paired with the bare kind name recorded in
/// resolved restriction objects, in recognition order.
pub const RESTRICTION_KINDS: [(&str, &str); 3] = [
    (OWL_SOME_VALUES_FROM, "someValuesFrom"),
    (OWL_ALL_VALUES_FROM, "allValuesFrom"),
    (OWL_HAS_VALUE, "hasValue"),
];
