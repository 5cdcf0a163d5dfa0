use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{SptError, SptResult};
use crate::spt::paths::{default_volume_url, volume_dir};
use crate::spt::record::{Record, parse_date, str_field, strip_any_prefix, u32_field};
use crate::spt::snapshot::{PROCEEDINGS, SnapshotCache, VOLUMES};

/// URI prefixes removed from proceedings identifiers.
const IDENTIFIER_PREFIXES: &[&str] = &[
    "http://www.wikidata.org/entity/",
    "https://www.wikidata.org/entity/",
    "https://www.wikidata.org/wiki/",
    "https://dblp.org/rec/",
    "https://dblp.org/db/",
    "https://opac.k10plus.de/DB=2.1/PPNSET?PPN=",
];

/// Proceedings fields lifted onto dedicated volume attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentifierField {
    Wikidata,
    Dblp,
    Ppn,
    Description,
    Url,
}

const IDENTIFIER_FIELDS: &[(&str, IdentifierField)] = &[
    ("item", IdentifierField::Wikidata),
    ("dblpProceedingsId", IdentifierField::Dblp),
    ("ppnId", IdentifierField::Ppn),
    ("itemDescription", IdentifierField::Description),
    ("url", IdentifierField::Url),
];

/// A proceedings issue identified by its sequential number.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub number: u32,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub acronym: Option<String>,
    /// Present only when `{root}/Vol-<number>/` exists.
    pub vol_dir: Option<PathBuf>,
    pub dblp_id: Option<String>,
    pub ppn_id: Option<String>,
    pub wikidata_id: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Keys of this volume's papers in source order; a paper's position here
    /// is its `paper_index`.
    pub papers: Vec<String>,
}

impl Volume {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            title: None,
            date: None,
            acronym: None,
            vol_dir: None,
            dblp_id: None,
            ppn_id: None,
            wikidata_id: None,
            description: None,
            url: None,
            papers: Vec::new(),
        }
    }

    pub fn has_content(&self) -> bool {
        self.vol_dir.is_some()
    }

    /// Canonical landing page, falling back to the CEUR-WS default.
    pub fn canonical_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| default_volume_url(self.number))
    }

    /// The mirrored `index.html`, optionally with links rewritten to local
    /// routes. `None` when the volume is metadata-only or the file is missing.
    pub fn index_html(&self, fix_links: bool) -> Option<String> {
        let dir = self.vol_dir.as_ref()?;
        let path = dir.join("index.html");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(volume = self.number, path = %path.display(), error = %err, "volume index unavailable");
                return None;
            }
        };
        if fix_links {
            Some(fix_index_links(&content, self.number))
        } else {
            Some(content)
        }
    }

    fn apply_identifier(&mut self, field: IdentifierField, value: String) {
        match field {
            IdentifierField::Wikidata => self.wikidata_id = Some(value),
            IdentifierField::Dblp => self.dblp_id = Some(value),
            IdentifierField::Ppn => self.ppn_id = Some(value),
            IdentifierField::Description => self.description = Some(value),
            IdentifierField::Url => self.url = Some(value),
        }
    }
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(href|src)\s*=\s*"([^"]*)""#).expect("valid regex")
    })
}

fn paper_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\./)?([A-Za-z][\w\-]*\.pdf)$").expect("valid regex")
    })
}

fn fix_link(href: &str, number: u32) -> String {
    let mut out = href.to_string();
    for prefix in crate::spt::paths::CEUR_WS_PREFIXES {
        if let Some(rest) = out.strip_prefix(prefix) {
            out = format!("/{rest}");
            break;
        }
    }
    if out == "../ceur-ws.css" {
        return "/static/ceur-ws.css".to_string();
    }
    if let Some(caps) = paper_link_regex().captures(&out) {
        return format!("/Vol-{number}/{}", &caps[1]);
    }
    out
}

/// Rewrite `href`/`src` attributes of a mirrored volume page to local routes.
pub fn fix_index_links(html: &str, number: u32) -> String {
    link_regex()
        .replace_all(html, |caps: &regex::Captures<'_>| {
            format!("{}=\"{}\"", &caps[1], fix_link(&caps[2], number))
        })
        .into_owned()
}

/// All volumes keyed by number, joined with their proceedings records.
#[derive(Debug, Clone, Default)]
pub struct VolumeRegistry {
    base_path: PathBuf,
    volumes: BTreeMap<u32, Volume>,
    records: BTreeMap<u32, Record>,
    loaded: bool,
    skipped: usize,
}

impl VolumeRegistry {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Records dropped as malformed during the last load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn load_all(&mut self, cache: &SnapshotCache, verbose: bool) -> SptResult<()> {
        let volume_records = cache.load(VOLUMES)?;
        let proceedings_records = cache.load(PROCEEDINGS)?;
        self.load_from_records(volume_records, &proceedings_records)?;
        if verbose {
            tracing::info!(
                volumes = self.volumes.len(),
                mirrored = self.volumes.values().filter(|v| v.has_content()).count(),
                proceedings = proceedings_records.len(),
                skipped = self.skipped,
                "volume registry loaded"
            );
        }
        Ok(())
    }

    /// Populate from already loaded collections, replacing previous state.
    pub fn load_from_records(
        &mut self,
        volume_records: Vec<Record>,
        proceedings_records: &[Record],
    ) -> SptResult<()> {
        let mut volumes = BTreeMap::new();
        let mut records = BTreeMap::new();
        let mut skipped = 0usize;

        for (index, record) in volume_records.into_iter().enumerate() {
            let Some(number) = u32_field(&record, "number") else {
                tracing::warn!(collection = VOLUMES, index, "volume record without a usable number; skipped");
                skipped += 1;
                continue;
            };
            let volume = self.volume_from_record(number, &record);
            if volumes.insert(number, volume).is_some() {
                tracing::warn!(collection = VOLUMES, volume = number, "duplicate volume number; later record wins");
            }
            records.insert(number, record);
        }

        for (index, proc_record) in proceedings_records.iter().enumerate() {
            let Some(number) = u32_field(proc_record, "sVolume") else {
                tracing::warn!(collection = PROCEEDINGS, index, "proceedings record without a usable volume number; skipped");
                skipped += 1;
                continue;
            };
            // strict consistency check: proceedings must point at a known volume
            let (Some(volume), Some(record)) = (volumes.get_mut(&number), records.get_mut(&number))
            else {
                return Err(SptError::ProceedingsWithoutVolume { number });
            };
            join_proceedings(volume, record, proc_record);
        }

        self.volumes = volumes;
        self.records = records;
        self.skipped = skipped;
        self.loaded = true;
        Ok(())
    }

    fn volume_from_record(&self, number: u32, record: &Record) -> Volume {
        let mut volume = Volume::new(number);
        volume.title = str_field(record, "title");
        volume.acronym = str_field(record, "acronym");
        volume.date = str_field(record, "pubDate").and_then(|raw| {
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                tracing::warn!(volume = number, pub_date = %raw, "unparseable publication date");
            }
            parsed
        });
        volume.url = str_field(record, "url");
        let dir = volume_dir(&self.base_path, number);
        if dir.is_dir() {
            volume.vol_dir = Some(dir);
        }
        volume
    }

    pub fn get(&self, number: u32) -> Option<&Volume> {
        self.volumes.get(&number)
    }

    pub(crate) fn get_mut(&mut self, number: u32) -> Option<&mut Volume> {
        self.volumes.get_mut(&number)
    }

    /// The volume's snapshot record with its proceedings fields joined in.
    pub fn record(&self, number: u32) -> Option<&Record> {
        self.records.get(&number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.values()
    }

    pub(crate) fn clear_papers(&mut self) {
        for volume in self.volumes.values_mut() {
            volume.papers.clear();
        }
    }
}

fn join_proceedings(volume: &mut Volume, record: &mut Record, proc_record: &Record) {
    for (key, value) in proc_record {
        let joined_key = if key.contains('.') {
            key.clone()
        } else {
            format!("wd.{key}")
        };
        record.insert(joined_key, value.clone());
    }
    for (key, field) in IDENTIFIER_FIELDS {
        match proc_record.get(*key) {
            Some(Value::String(_) | Value::Number(_)) => {
                if let Some(raw) = str_field(proc_record, key) {
                    volume.apply_identifier(*field, strip_any_prefix(&raw, IDENTIFIER_PREFIXES));
                }
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                tracing::debug!(volume = volume.number, field = *key, value = %other, "ignoring malformed identifier");
            }
        }
    }
}
