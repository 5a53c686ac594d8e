//! Record-oriented parser for the OBO exchange format
//!
//! Extracts the stanza fields the tree builder consumes and nothing more.
//! Term order is preserved: the builder's ancestor tie-break depends on the
//! order in which terms appear in the file.

use tracing::{debug, instrument};

/// One `is_a:` or `disjoint_from:` reference: ancestor id plus display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorRef {
    pub id: String,
    /// Text after the `!` separator; empty when the file omits it
    pub label: String,
}

/// One `[Term]` stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermRecord {
    pub id: String,
    pub label: String,
    pub namespace: Option<String>,
    pub definition: Option<String>,
    pub comment: Option<String>,
    pub is_obsolete: bool,
    pub xrefs: Vec<String>,
    pub is_a: Vec<AncestorRef>,
    pub disjoint_from: Vec<AncestorRef>,
    pub synonyms: Vec<String>,
}

impl TermRecord {
    pub fn is_root(&self) -> bool {
        self.is_a.is_empty()
    }
}

/// Parse raw `.obo` text into term records, in file order.
///
/// The header block and `[Typedef]` stanzas are skipped. Terms without an
/// `id:` line are dropped.
#[instrument(level = "debug", skip(text))]
pub fn parse_terms(text: &str) -> Vec<TermRecord> {
    let mut terms: Vec<TermRecord> = Vec::new();
    let mut current: Option<TermRecord> = None;

    for line in text.lines() {
        let line = line.trim_end();
        if line == "[Term]" {
            commit(&mut current, &mut terms);
            current = Some(TermRecord::default());
            continue;
        }
        if line.starts_with('[') {
            // some other stanza type, e.g. [Typedef]
            commit(&mut current, &mut terms);
            continue;
        }
        let Some(term) = current.as_mut() else {
            continue;
        };
        if let Some(rest) = line.strip_prefix("id: ") {
            term.id = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("name: ") {
            term.label = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("namespace: ") {
            term.namespace = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("def: ") {
            term.definition = Some(parse_quoted_body(rest));
        } else if let Some(rest) = line.strip_prefix("comment: ") {
            term.comment = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("xref: ") {
            term.xrefs.push(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("is_a: ") {
            term.is_a.push(parse_ancestor(rest));
        } else if let Some(rest) = line.strip_prefix("disjoint_from: ") {
            term.disjoint_from.push(parse_ancestor(rest));
        } else if let Some(rest) = line.strip_prefix("synonym: ") {
            term.synonyms.push(parse_quoted_body(rest));
        } else if line == "is_obsolete: true" {
            term.is_obsolete = true;
        } else if line.is_empty() {
            commit(&mut current, &mut terms);
        }
    }
    commit(&mut current, &mut terms);

    debug!("parsed {} terms", terms.len());
    terms
}

fn commit(current: &mut Option<TermRecord>, terms: &mut Vec<TermRecord>) {
    if let Some(term) = current.take() {
        if !term.id.is_empty() {
            terms.push(term);
        }
    }
}

/// `GO:0008150 ! biological_process` -> id and label.
fn parse_ancestor(rest: &str) -> AncestorRef {
    match rest.split_once(" ! ") {
        Some((id, label)) => AncestorRef {
            id: id.to_string(),
            label: label.to_string(),
        },
        None => AncestorRef {
            id: rest.to_string(),
            label: String::new(),
        },
    }
}

/// Extract the quoted body of a `def:` or `synonym:` line, dropping the
/// trailing dbxref list or scope qualifier.
fn parse_quoted_body(rest: &str) -> String {
    let rest = rest.trim();
    let body = rest.strip_prefix('"').unwrap_or(rest);
    match body.find('"') {
        Some(pos) => body[..pos].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
format-version: 1.2
default-namespace: test_ontology

[Term]
id: T:0000001
name: root term
namespace: test_ontology
def: \"The top of everything.\" [curators:abc]
comment: Not a real term.
xref: EXT:123

[Term]
id: T:0000002
name: child term
is_a: T:0000001 ! root term
synonym: \"kid term\" EXACT []

[Term]
id: T:0000003
name: gone term
is_a: T:0000001 ! root term
is_obsolete: true

[Typedef]
id: part_of
name: part of
";

    #[test]
    fn given_obo_text_when_parsing_then_extracts_terms_in_file_order() {
        let terms = parse_terms(SAMPLE);

        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0].id, "T:0000001");
        assert_eq!(terms[1].id, "T:0000002");
        assert_eq!(terms[2].id, "T:0000003");
    }

    #[test]
    fn given_def_line_when_parsing_then_strips_quotes_and_dbxrefs() {
        let terms = parse_terms(SAMPLE);

        assert_eq!(
            terms[0].definition.as_deref(),
            Some("The top of everything.")
        );
        assert_eq!(terms[0].comment.as_deref(), Some("Not a real term."));
        assert_eq!(terms[0].xrefs, vec!["EXT:123".to_string()]);
    }

    #[test]
    fn given_is_a_line_when_parsing_then_splits_id_and_label() {
        let terms = parse_terms(SAMPLE);

        assert_eq!(terms[1].is_a.len(), 1);
        assert_eq!(terms[1].is_a[0].id, "T:0000001");
        assert_eq!(terms[1].is_a[0].label, "root term");
        assert_eq!(terms[1].synonyms, vec!["kid term".to_string()]);
    }

    #[test]
    fn given_obsolete_flag_when_parsing_then_record_is_marked() {
        let terms = parse_terms(SAMPLE);

        assert!(terms[2].is_obsolete);
        assert!(!terms[1].is_obsolete);
    }

    #[test]
    fn given_typedef_stanza_when_parsing_then_it_is_skipped() {
        let terms = parse_terms(SAMPLE);

        assert!(terms.iter().all(|t| t.id != "part_of"));
    }

    #[test]
    fn given_term_without_id_when_parsing_then_it_is_dropped() {
        let text = "[Term]\nname: nameless\n\n[Term]\nid: T:1\nname: ok\n";
        let terms = parse_terms(text);

        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id, "T:1");
    }
}
