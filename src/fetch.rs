//! Remote ontology retrieval and the known-ontology registry
//!
//! This is the fetch-with-progress collaborator of the core: it downloads
//! raw .obo text over HTTP, reports progress through [`StatusSink`], and
//! hands the text to the builder pipeline. Failures surface as hard errors;
//! there is no retry policy here.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::config::Settings;
use crate::errors::{OntologyError, OntologyResult};
use crate::model::Forest;
use crate::obo::{parse_terms, TermRecord};
use crate::status::StatusSink;
use crate::util::path::sanitize_filename;
use crate::{forest_from_terms, GraphBuildOptions};

/// Download chunk size (64 KiB).
const CHUNK_SIZE: usize = 128 * 512;

/// How a registry entry picks its tree roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSelector {
    /// Explicit term id
    Id(String),
    /// Scan ancestor-less terms for this label (GeneOntology namespaces
    /// share one file and differ only by root)
    Label(String),
    /// Every ancestor-less term seeds its own tree
    Auto,
}

/// One entry of the known-ontology registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologySource {
    pub key: String,
    pub url: String,
    pub descriptor: String,
    pub root: RootSelector,
    pub min_node_size: Option<usize>,
}

impl OntologySource {
    fn new(
        key: &str,
        url: &str,
        descriptor: &str,
        root: RootSelector,
        min_node_size: Option<usize>,
    ) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            descriptor: descriptor.to_string(),
            root,
            min_node_size,
        }
    }
}

const GO_URL: &str = "https://current.geneontology.org/ontology/go.obo";

/// All ontologies the `fetch` command knows about, including the
/// configuration-driven `custom` entry when a URL is configured.
pub fn known_ontologies(settings: &Settings) -> Vec<OntologySource> {
    let mut sources = vec![
        OntologySource::new(
            "hpo",
            "https://purl.obolibrary.org/obo/hp.obo",
            "Human phenotype ontology",
            RootSelector::Id("HP:0000118".to_string()),
            None,
        ),
        OntologySource::new(
            "go-mf",
            GO_URL,
            "GeneOntology",
            RootSelector::Label("molecular_function".to_string()),
            Some(2),
        ),
        OntologySource::new(
            "go-cc",
            GO_URL,
            "GeneOntology",
            RootSelector::Label("cellular_component".to_string()),
            Some(2),
        ),
        OntologySource::new(
            "go-bp",
            GO_URL,
            "GeneOntology",
            RootSelector::Label("biological_process".to_string()),
            Some(2),
        ),
        OntologySource::new(
            "po",
            "https://purl.obolibrary.org/obo/po.obo",
            "Plant Ontology",
            RootSelector::Id("PO:0009011".to_string()),
            Some(5),
        ),
        OntologySource::new(
            "cl",
            "https://purl.obolibrary.org/obo/cl/cl-basic.obo",
            "Cell Ontology",
            RootSelector::Auto,
            Some(2),
        ),
        OntologySource::new(
            "chebi",
            "https://purl.obolibrary.org/obo/chebi/chebi_lite.obo",
            "CHEBI Ontology",
            RootSelector::Id("CHEBI:23367".to_string()),
            None,
        ),
        OntologySource::new(
            "uberon",
            "https://purl.obolibrary.org/obo/uberon/basic.obo",
            "Uberon Anatomy Ontology",
            RootSelector::Id("UBERON:0000061".to_string()),
            Some(2),
        ),
        OntologySource::new(
            "doid",
            "https://purl.obolibrary.org/obo/doid.obo",
            "Human Disease Ontology",
            RootSelector::Id("DOID:4".to_string()),
            None,
        ),
    ];

    if let Some(url) = &settings.custom.url {
        let root = match &settings.custom.root_id {
            Some(id) => RootSelector::Id(id.clone()),
            None => RootSelector::Auto,
        };
        sources.push(OntologySource::new(
            "custom",
            url,
            &settings.custom.description,
            root,
            settings.custom.min_node_size,
        ));
    }

    sources
}

/// Look up a registry entry by key.
pub fn resolve(key: &str, settings: &Settings) -> OntologyResult<OntologySource> {
    known_ontologies(settings)
        .into_iter()
        .find(|source| source.key == key)
        .ok_or_else(|| OntologyError::UnknownOntology(key.to_string()))
}

/// Download a text resource in chunks, reporting accumulated size.
#[instrument(level = "debug", skip(sink))]
pub fn fetch_text(url: &str, descriptor: &str, sink: &dyn StatusSink) -> OntologyResult<String> {
    sink.notify(&format!("Downloading {descriptor} .."));

    let download_err = |reason: String| OntologyError::Download {
        url: url.to_string(),
        reason,
    };
    let response = reqwest::blocking::get(url).map_err(|e| download_err(e.to_string()))?;
    let mut response = response
        .error_for_status()
        .map_err(|e| download_err(e.to_string()))?;

    let mut raw: Vec<u8> = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| download_err(e.to_string()))?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        sink.notify(&format!(
            "Downloading {descriptor} .. {:.2} MB",
            raw.len() as f64 / 1_048_576.0
        ));
    }

    String::from_utf8(raw).map_err(|e| download_err(e.to_string()))
}

/// Save downloaded ontology text under its sanitized descriptor.
pub fn cache_ontology_text(
    settings: &Settings,
    descriptor: &str,
    text: &str,
) -> OntologyResult<PathBuf> {
    fs::create_dir_all(&settings.cache_dir)?;
    let path = settings
        .cache_dir
        .join(format!("{}.obo", sanitize_filename(descriptor)));
    fs::write(&path, text)?;
    debug!("cached {descriptor} at {}", path.display());
    Ok(path)
}

/// Download, cache, and build a known ontology end to end.
#[instrument(level = "debug", skip(settings, sink))]
pub fn build_remote_forest(
    key: &str,
    settings: &Settings,
    sink: &dyn StatusSink,
) -> OntologyResult<Forest> {
    let source = resolve(key, settings)?;
    let text = fetch_text(&source.url, &source.descriptor, sink)?;
    cache_ontology_text(settings, &source.descriptor, &text)?;

    let terms = parse_terms(&text);
    let root_id = match &source.root {
        RootSelector::Id(id) => Some(id.clone()),
        RootSelector::Label(label) => Some(root_id_by_label(&terms, label)?),
        RootSelector::Auto => None,
    };

    let options = GraphBuildOptions {
        root_id,
        min_node_size: source.min_node_size,
        exclude_obsolete: settings.exclude_obsolete,
    };
    let forest = forest_from_terms(&terms, &options, sink);
    sink.notify(&format!("Parsed {}", source.descriptor));
    Ok(forest)
}

/// Find the ancestor-less term carrying the given label.
fn root_id_by_label(terms: &[TermRecord], label: &str) -> OntologyResult<String> {
    terms
        .iter()
        .find(|term| term.is_root() && term.label == label)
        .map(|term| term.id.clone())
        .ok_or_else(|| OntologyError::RootNotFound(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_key_when_resolving_then_entry_is_returned() {
        let source = resolve("hpo", &Settings::default()).expect("hpo is registered");

        assert_eq!(source.root, RootSelector::Id("HP:0000118".to_string()));
        assert!(source.min_node_size.is_none());
    }

    #[test]
    fn given_unknown_key_when_resolving_then_error() {
        let result = resolve("nope", &Settings::default());

        assert!(matches!(result, Err(OntologyError::UnknownOntology(_))));
    }

    #[test]
    fn given_no_custom_url_when_listing_then_custom_is_absent() {
        let sources = known_ontologies(&Settings::default());

        assert!(sources.iter().all(|s| s.key != "custom"));
    }

    #[test]
    fn given_custom_url_when_listing_then_custom_entry_uses_settings() {
        let mut settings = Settings::default();
        settings.custom.url = Some("https://example.org/x.obo".to_string());
        settings.custom.root_id = Some("X:1".to_string());
        settings.custom.min_node_size = Some(3);

        let sources = known_ontologies(&settings);
        let custom = sources.iter().find(|s| s.key == "custom").unwrap();

        assert_eq!(custom.root, RootSelector::Id("X:1".to_string()));
        assert_eq!(custom.min_node_size, Some(3));
        assert_eq!(custom.descriptor, "Custom Ontology");
    }

    #[test]
    fn given_go_terms_when_resolving_root_by_label_then_finds_namespace_root() {
        let terms = parse_terms(
            "[Term]\nid: GO:0003674\nname: molecular_function\n\n\
             [Term]\nid: GO:0008150\nname: biological_process\n\n\
             [Term]\nid: GO:0003677\nname: DNA binding\nis_a: GO:0003674 ! molecular_function\n",
        );

        let id = root_id_by_label(&terms, "molecular_function").unwrap();

        assert_eq!(id, "GO:0003674");
    }

    #[test]
    fn given_missing_label_when_resolving_root_then_error() {
        let terms = parse_terms("[Term]\nid: A\nname: something\n");

        let result = root_id_by_label(&terms, "not_there");

        assert!(matches!(result, Err(OntologyError::RootNotFound(_))));
    }
}
