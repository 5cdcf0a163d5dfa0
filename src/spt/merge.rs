//! Per-request merged view of a volume or paper.
//!
//! Three sources are overlaid, each in its own namespace: the entity's own
//! fields (`spt`), its snapshot record (`cvb`) and, for papers, the
//! author-index record (`dblp`). Snapshot keys that already carry a `.` keep
//! their own prefix. Keys are stored as `(namespace, key)` pairs so sources
//! cannot collide with each other.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;

use crate::spt::paper::Paper;
use crate::spt::record::Record;
use crate::spt::volume::Volume;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// The entity's own structural fields.
    Spt,
    /// The snapshot record from the metadata endpoint.
    Cvb,
    /// The author-index record.
    Dblp,
    /// A prefix already present on an upstream key, e.g. `wd`.
    Upstream(String),
}

impl Namespace {
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "spt" => Self::Spt,
            "cvb" => Self::Cvb,
            "dblp" => Self::Dblp,
            other => Self::Upstream(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Spt => "spt",
            Self::Cvb => "cvb",
            Self::Dblp => "dblp",
            Self::Upstream(prefix) => prefix,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergedKey {
    pub namespace: Namespace,
    pub key: String,
}

impl MergedKey {
    pub fn new(namespace: Namespace, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }

    /// Parse a flat `namespace.key` name.
    pub fn parse(flat: &str) -> Option<Self> {
        let (prefix, key) = flat.split_once('.')?;
        if prefix.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(Namespace::from_prefix(prefix), key))
    }

    pub fn flat(&self) -> String {
        format!("{}.{}", self.namespace, self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedField<'a> {
    pub namespace: &'a Namespace,
    pub key: &'a str,
    pub value: &'a Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedRecord {
    fields: BTreeMap<MergedKey, Value>,
}

impl MergedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn insert(&mut self, namespace: Namespace, key: impl Into<String>, value: Value) {
        self.fields.insert(MergedKey::new(namespace, key), value);
    }

    /// Overlay a record under `namespace`. Keys that already contain `.` keep
    /// their own prefix unless it names a reserved namespace, in which case
    /// the whole key stays under `namespace`.
    pub fn overlay(&mut self, namespace: &Namespace, record: &Record) {
        for (key, value) in record {
            let merged_key = match MergedKey::parse(key) {
                Some(parsed) if matches!(parsed.namespace, Namespace::Upstream(_)) => parsed,
                Some(_) => {
                    tracing::debug!(namespace = %namespace, key = %key, "reserved prefix in overlay key");
                    MergedKey::new(namespace.clone(), key.clone())
                }
                None => MergedKey::new(namespace.clone(), key.clone()),
            };
            self.fields.insert(merged_key, value.clone());
        }
    }

    pub fn get_in(&self, namespace: &Namespace, key: &str) -> Option<&Value> {
        self.fields.get(&MergedKey::new(namespace.clone(), key))
    }

    /// Look up a flat `namespace.key` name.
    pub fn get(&self, flat: &str) -> Option<&Value> {
        self.fields.get(&MergedKey::parse(flat)?)
    }

    /// Flat lookup coerced to a non-empty string; `null` reads as missing.
    pub fn get_str(&self, flat: &str) -> Option<String> {
        match self.get(flat)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn contains(&self, flat: &str) -> bool {
        self.get(flat).is_some_and(|v| !v.is_null())
    }

    pub fn fields(&self) -> impl Iterator<Item = MergedField<'_>> {
        self.fields.iter().map(|(k, value)| MergedField {
            namespace: &k.namespace,
            key: &k.key,
            value,
        })
    }

    pub fn namespaces(&self) -> Vec<&Namespace> {
        let mut out: Vec<&Namespace> = self.fields.keys().map(|k| &k.namespace).collect();
        out.dedup();
        out
    }

    /// Flat `namespace.key → value` map for serialisation.
    pub fn to_flat_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.flat(), v.clone()))
            .collect()
    }
}

impl Serialize for MergedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_flat_map().serialize(serializer)
    }
}

fn opt(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.clone()))
}

fn volume_fields(volume: &Volume) -> Vec<(&'static str, Value)> {
    vec![
        ("number", json!(volume.number)),
        ("title", opt(volume.title.as_ref())),
        ("acronym", opt(volume.acronym.as_ref())),
        ("date", volume.date.map_or(Value::Null, |d| json!(d.to_string()))),
        ("url", json!(volume.canonical_url())),
        (
            "vol_dir",
            volume
                .vol_dir
                .as_ref()
                .map_or(Value::Null, |d| json!(d.display().to_string())),
        ),
        ("has_content", json!(volume.has_content())),
        ("dblp_id", opt(volume.dblp_id.as_ref())),
        ("ppn_id", opt(volume.ppn_id.as_ref())),
        ("wikidata_id", opt(volume.wikidata_id.as_ref())),
        ("description", opt(volume.description.as_ref())),
        ("paper_count", json!(volume.papers.len())),
    ]
}

fn volume_summary(volume: &Volume) -> Value {
    json!({
        "number": volume.number,
        "title": volume.title,
        "date": volume.date.map(|d| d.to_string()),
        "acronym": volume.acronym,
    })
}

/// Merge a volume with its proceedings-joined snapshot record.
pub fn volume_record(volume: &Volume, snapshot: Option<&Record>) -> MergedRecord {
    let mut merged = MergedRecord::new();
    for (key, value) in volume_fields(volume) {
        merged.insert(Namespace::Spt, key, value);
    }
    if let Some(record) = snapshot {
        merged.overlay(&Namespace::Cvb, record);
    }
    merged
}

/// Merge a paper with its snapshot and author-index records.
pub fn paper_record(
    paper: &Paper,
    volume: Option<&Volume>,
    snapshot: Option<&Record>,
    author_index: Option<&Record>,
) -> MergedRecord {
    let mut merged = MergedRecord::new();
    let own = [
        ("id", json!(paper.id)),
        ("title", opt(paper.title.as_ref())),
        ("authors", opt(paper.authors.as_ref())),
        ("pdfUrl", json!(paper.pdf_url)),
        ("base_path", json!(paper.base_path())),
        ("paper_index", paper.paper_index.map_or(Value::Null, |i| json!(i))),
        ("volume_number", json!(paper.volume_number)),
        ("volume", volume.map_or(Value::Null, volume_summary)),
        ("html_url", json!(paper.html_url())),
    ];
    for (key, value) in own {
        merged.insert(Namespace::Spt, key, value);
    }
    if let Some(record) = snapshot {
        merged.overlay(&Namespace::Cvb, record);
    }
    if let Some(record) = author_index {
        merged.overlay(&Namespace::Dblp, record);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn snapshot_keys_are_prefixed_unless_already_namespaced() {
        let mut volume = Volume::new(3262);
        volume.title = Some("Wikidata 2022".into());
        let snapshot = record(json!({"title": "Snapshot title", "wd.eventLabel": "Wikidata Workshop"}));

        let merged = volume_record(&volume, Some(&snapshot));

        assert_eq!(merged.get_str("spt.title").as_deref(), Some("Wikidata 2022"));
        assert_eq!(merged.get_str("cvb.title").as_deref(), Some("Snapshot title"));
        assert_eq!(merged.get_str("wd.eventLabel").as_deref(), Some("Wikidata Workshop"));
        assert!(merged.get("cvb.wd.eventLabel").is_none());
        assert_eq!(merged.get("spt.number"), Some(&json!(3262)));
    }

    #[test]
    fn namespaces_never_collide() {
        let paper = Paper {
            id: "Vol-1/p1".into(),
            volume_number: 1,
            stem: "p1".into(),
            title: Some("own".into()),
            authors: None,
            pdf_url: "https://ceur-ws.org/Vol-1/p1.pdf".into(),
            paper_index: Some(0),
        };
        let snapshot = record(json!({"title": "cvb", "id": "Vol-1/p1"}));
        let index = record(json!({"title": "dblp"}));

        let merged = paper_record(&paper, None, Some(&snapshot), Some(&index));

        assert_eq!(merged.get_str("spt.title").as_deref(), Some("own"));
        assert_eq!(merged.get_str("cvb.title").as_deref(), Some("cvb"));
        assert_eq!(merged.get_str("dblp.title").as_deref(), Some("dblp"));
        let flat = merged.to_flat_map();
        assert_eq!(flat.len(), merged.len());
        assert_eq!(merged.get("spt.volume"), Some(&Value::Null));
    }

    #[test]
    fn overlays_cannot_write_into_reserved_namespaces() {
        let paper = Paper {
            id: "Vol-1/p1".into(),
            volume_number: 1,
            stem: "p1".into(),
            title: Some("own title".into()),
            authors: Some("Alice Example".into()),
            pdf_url: "https://ceur-ws.org/Vol-1/p1.pdf".into(),
            paper_index: Some(0),
        };
        let snapshot = record(json!({"spt.title": "from snapshot", "authors": "Alice Example"}));
        let index = record(json!({"cvb.authors": "Eve Mallory", "wd.item": "Q1"}));

        let merged = paper_record(&paper, None, Some(&snapshot), Some(&index));

        assert_eq!(merged.get_str("spt.title").as_deref(), Some("own title"));
        assert_eq!(merged.get_str("cvb.authors").as_deref(), Some("Alice Example"));
        assert_eq!(merged.get_in(&Namespace::Cvb, "spt.title"), Some(&json!("from snapshot")));
        assert_eq!(merged.get_in(&Namespace::Dblp, "cvb.authors"), Some(&json!("Eve Mallory")));
        assert_eq!(merged.get_str("wd.item").as_deref(), Some("Q1"));
        let names: Vec<String> = crate::spt::authors::resolve(&merged)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alice Example".to_string()]);
    }

    #[test]
    fn merge_is_idempotent() {
        let volume = Volume::new(5);
        let snapshot = record(json!({"editors": "A, B"}));
        assert_eq!(
            volume_record(&volume, Some(&snapshot)),
            volume_record(&volume, Some(&snapshot))
        );
    }

    #[test]
    fn flat_keys_parse_back_into_namespaces() {
        let key = MergedKey::parse("wd.startDate").expect("parse");
        assert_eq!(key.namespace, Namespace::Upstream("wd".into()));
        assert_eq!(key.flat(), "wd.startDate");
        assert!(MergedKey::parse("plain").is_none());
        assert_eq!(MergedKey::parse("cvb.a.b").expect("parse").key, "a.b");
    }

    #[test]
    fn serializes_as_flat_object() {
        let merged = volume_record(&Volume::new(9), None);
        let json = serde_json::to_value(&merged).expect("json");
        assert_eq!(json["spt.number"], json!(9));
        assert_eq!(json["spt.url"], json!("https://ceur-ws.org/Vol-9/"));
    }
}
