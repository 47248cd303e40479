//! Defines the core row value types: the flat `ThinRow` input record and the
//! nested `ThickRow` output record, plus the payload types carried by
//! annotations and metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix that syntactically distinguishes blank-node identifiers.
pub const BLANK_PREFIX: &str = "_:";

/// Returns true if the identifier names a stanza-local blank node.
pub fn is_blank(id: &str) -> bool {
    id.starts_with(BLANK_PREFIX)
}

/// One primitive triple record. All fields are strings; the empty string
/// marks an absent field. Exactly one of `object` and `value` is populated,
/// and `datatype`/`language` only accompany `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinRow {
    pub stanza: String,
    pub subject: String,
    pub predicate: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub language: String,
}

impl ThinRow {
    /// Builds a row from the 7-slot array form used by callers that ship
    /// rows as flat string tuples.
    pub fn from_fields(fields: [String; 7]) -> Self {
        let [stanza, subject, predicate, object, value, datatype, language] = fields;
        ThinRow {
            stanza,
            subject,
            predicate,
            object,
            value,
            datatype,
            language,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.object.is_empty()
    }

    /// Checks the object/value mutual-exclusion contract. Returns the first
    /// violated constraint; all other validation happens downstream.
    pub fn check_invariant(&self) -> std::result::Result<(), &'static str> {
        if !self.object.is_empty() {
            if !self.value.is_empty() {
                return Err("object and value are both populated");
            }
            if !self.datatype.is_empty() || !self.language.is_empty() {
                return Err("datatype or language set on an object row");
            }
        } else if self.value.is_empty() {
            return Err("neither object nor value is populated");
        }
        Ok(())
    }
}

/// One object position within an annotation or metadata payload: either an
/// IRI/blank reference or a literal with optional datatype/language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PayloadTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PayloadTerm {
    pub fn from_row(row: &ThinRow) -> Self {
        if !row.object.is_empty() {
            PayloadTerm {
                object: Some(row.object.clone()),
                ..Default::default()
            }
        } else {
            PayloadTerm {
                object: None,
                value: Some(row.value.clone()),
                datatype: (!row.datatype.is_empty()).then(|| row.datatype.clone()),
                language: (!row.language.is_empty()).then(|| row.language.clone()),
            }
        }
    }

    /// Compares this term against a candidate row's object-or-value slot.
    /// Literal terms compare value, datatype, and language; reference terms
    /// compare the identifier.
    pub fn matches_row(&self, row: &ThinRow) -> bool {
        match (&self.object, &self.value) {
            (Some(o), _) => row.object == *o,
            (None, Some(v)) => {
                row.object.is_empty()
                    && row.value == *v
                    && self.datatype.as_deref().unwrap_or("") == row.datatype
                    && self.language.as_deref().unwrap_or("") == row.language
            }
            (None, None) => false,
        }
    }
}

/// An annotation or metadata payload: predicate mapped to the ordered list
/// of its payload terms. Keys are sorted for deterministic serialization.
pub type Payload = BTreeMap<String, Vec<PayloadTerm>>;

/// A triple enriched with resolved nested values and attached payloads.
/// `value` holds a plain string for literals, a JSON array for resolved
/// lists, and a JSON object for resolved restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThickRow {
    pub subject: String,
    pub predicate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub annotations: Vec<Payload>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub metadata: Vec<Payload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(object: &str, value: &str, datatype: &str, language: &str) -> ThinRow {
        ThinRow {
            stanza: "ex:s".to_string(),
            subject: "ex:s".to_string(),
            predicate: "ex:p".to_string(),
            object: object.to_string(),
            value: value.to_string(),
            datatype: datatype.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_invariant() {
        assert!(row("ex:o", "", "", "").check_invariant().is_ok());
        assert!(row("", "v", "", "").check_invariant().is_ok());
        assert!(row("", "v", "xsd:string", "").check_invariant().is_ok());
        assert!(row("", "v", "", "en").check_invariant().is_ok());
        assert!(row("ex:o", "v", "", "").check_invariant().is_err());
        assert!(row("", "", "", "").check_invariant().is_err());
        assert!(row("ex:o", "", "xsd:string", "").check_invariant().is_err());
    }

    #[test]
    fn test_from_fields() {
        let fields = [
            "ex:s", "ex:s", "rdfs:label", "", "foo", "", "fr",
        ]
        .map(String::from);
        let row = ThinRow::from_fields(fields);
        assert_eq!(row.predicate, "rdfs:label");
        assert_eq!(row.value, "foo");
        assert_eq!(row.language, "fr");
        assert!(row.is_literal());
    }

    #[test]
    fn test_payload_term_matching() {
        let term = PayloadTerm::from_row(&row("", "foo", "", "en"));
        assert!(term.matches_row(&row("", "foo", "", "en")));
        assert!(!term.matches_row(&row("", "foo", "", "")));
        assert!(!term.matches_row(&row("", "foo", "xsd:string", "en")));

        let term = PayloadTerm::from_row(&row("ex:o", "", "", ""));
        assert!(term.matches_row(&row("ex:o", "", "", "")));
        assert!(!term.matches_row(&row("ex:other", "", "", "")));
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank("_:b1"));
        assert!(!is_blank("ex:foo"));
        assert!(!is_blank("<http://example.com/FOO>"));
    }
}
