//! biblatex entries for volumes (`@proceedings`) and papers
//! (`@inproceedings`), built from merged records.

use biblatex::{Bibliography, Chunk, Entry, EntryType, Spanned};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::spt::authors::ResolvedAuthor;
use crate::spt::merge::MergedRecord;
use crate::spt::record::{parse_date, split_names};

pub const SERIES: &str = "CEUR Workshop Proceedings";
pub const LOCATION: &str = "Aachen";
pub const LANGUAGE: &str = "english";

/// Fields dropped from a paper entry that cross-references its proceedings.
pub const PROCEEDINGS_KEYS: &[&str] = &[
    "series",
    "location",
    "eventtitle",
    "venue",
    "volume",
    "editor",
    "eventdate",
];

pub type BibRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProceedingsEntry {
    pub number: u32,
    pub acronym: Option<String>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub editor: Option<String>,
    pub eventtitle: Option<String>,
    pub eventdate: Option<String>,
    pub venue: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InProceedingsEntry {
    pub paper_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub booktitle: Option<String>,
    pub date: Option<NaiveDate>,
    pub volume: Option<String>,
    pub pages: Option<String>,
    pub url: Option<String>,
    pub editor: Option<String>,
    pub eventtitle: Option<String>,
    pub eventdate: Option<String>,
    pub venue: Option<String>,
}

fn editors(record: &MergedRecord) -> Option<String> {
    let raw = record.get_str("cvb.editors")?;
    let names = split_names(&raw);
    if names.is_empty() {
        None
    } else {
        Some(names.join(" and "))
    }
}

fn venue(record: &MergedRecord) -> Option<String> {
    let parts: Vec<String> = ["wd.locationLabel", "wd.countryLabel"]
        .iter()
        .filter_map(|key| record.get_str(key))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Dates from upstream may be datetimes; keep the date part when parseable.
fn date_string(record: &MergedRecord, key: &str) -> Option<String> {
    let raw = record.get_str(key)?;
    Some(parse_date(&raw).map_or(raw, |d| d.to_string()))
}

fn insert_opt(out: &mut BibRecord, key: &str, value: Option<&String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            out.insert(key.to_string(), v.clone());
        }
    }
}

fn insert_date(out: &mut BibRecord, date: Option<NaiveDate>) {
    if let Some(date) = date {
        out.insert("date".to_string(), date.to_string());
        out.insert("year".to_string(), date.year().to_string());
    }
}

impl ProceedingsEntry {
    pub fn from_volume(record: &MergedRecord) -> Self {
        let number = record
            .get_str("spt.number")
            .and_then(|n| n.parse().ok())
            .unwrap_or_default();
        let date = record
            .get_str("wd.publication_date")
            .and_then(|raw| parse_date(&raw))
            .or_else(|| record.get_str("spt.date").and_then(|raw| parse_date(&raw)));
        Self {
            number,
            acronym: record.get_str("spt.acronym"),
            title: record
                .get_str("spt.title")
                .or_else(|| record.get_str("cvb.title")),
            date,
            editor: editors(record),
            eventtitle: record.get_str("wd.eventLabel"),
            eventdate: date_string(record, "wd.startDate"),
            venue: venue(record),
            url: record.get_str("spt.url"),
        }
    }

    /// `Foo 2020` → `Foo_2020`; without an acronym `ceur-ws:Vol-<n>`.
    pub fn id(&self) -> String {
        match self.acronym.as_deref().map(str::trim) {
            Some(acronym) if !acronym.is_empty() => acronym.replace(' ', "_"),
            _ => format!("ceur-ws:Vol-{}", self.number),
        }
    }

    pub fn to_record(&self) -> BibRecord {
        let mut out = BibRecord::new();
        out.insert("ENTRYTYPE".into(), "proceedings".into());
        out.insert("ID".into(), self.id());
        insert_opt(&mut out, "title", self.title.as_ref());
        insert_date(&mut out, self.date);
        insert_opt(&mut out, "editor", self.editor.as_ref());
        insert_opt(&mut out, "eventtitle", self.eventtitle.as_ref());
        insert_opt(&mut out, "eventdate", self.eventdate.as_ref());
        insert_opt(&mut out, "venue", self.venue.as_ref());
        insert_opt(&mut out, "url", self.url.as_ref());
        out.insert("volume".into(), self.number.to_string());
        out.insert("language".into(), LANGUAGE.into());
        out.insert("series".into(), SERIES.into());
        out.insert("location".into(), LOCATION.into());
        out
    }
}

impl InProceedingsEntry {
    /// Build from a paper's merged record; `volume` supplies event and
    /// editor fields when the owning volume is known.
    pub fn from_paper(
        record: &MergedRecord,
        volume: Option<&MergedRecord>,
        authors: &[ResolvedAuthor],
    ) -> Self {
        let summary = record.get("spt.volume").and_then(|v| v.as_object());
        let summary_str = |key: &str| {
            summary
                .and_then(|s| s.get(key))
                .and_then(|v| match v {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        };
        let author = if authors.is_empty() {
            None
        } else {
            Some(
                authors
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" and "),
            )
        };
        let mut entry = Self {
            paper_id: record.get_str("spt.id").unwrap_or_default(),
            title: record
                .get_str("spt.title")
                .or_else(|| record.get_str("cvb.title")),
            author,
            booktitle: summary_str("title"),
            date: summary_str("date").and_then(|raw| parse_date(&raw)),
            volume: record.get_str("spt.volume_number"),
            pages: record.get_str("cvb.pages"),
            url: record.get_str("spt.pdfUrl"),
            ..Self::default()
        };
        if let Some(volume) = volume {
            entry.editor = editors(volume);
            entry.eventtitle = volume.get_str("wd.eventLabel");
            entry.eventdate = date_string(volume, "wd.startDate");
            entry.venue = venue(volume);
            if entry.booktitle.is_none() {
                entry.booktitle = volume.get_str("spt.title");
            }
        }
        entry
    }

    /// `ceur-ws:` plus the paper id with `/` replaced by `:`.
    pub fn id(&self) -> String {
        format!("ceur-ws:{}", self.paper_id.replace('/', ":"))
    }

    /// With `crossref`, proceedings-level fields are left to the referenced
    /// entry.
    pub fn to_record(&self, crossref: Option<&str>) -> BibRecord {
        let mut out = BibRecord::new();
        out.insert("ENTRYTYPE".into(), "inproceedings".into());
        out.insert("ID".into(), self.id());
        insert_opt(&mut out, "title", self.title.as_ref());
        insert_opt(&mut out, "author", self.author.as_ref());
        insert_opt(&mut out, "booktitle", self.booktitle.as_ref());
        insert_date(&mut out, self.date);
        insert_opt(&mut out, "volume", self.volume.as_ref());
        insert_opt(&mut out, "pages", self.pages.as_ref());
        insert_opt(&mut out, "url", self.url.as_ref());
        insert_opt(&mut out, "editor", self.editor.as_ref());
        insert_opt(&mut out, "eventtitle", self.eventtitle.as_ref());
        insert_opt(&mut out, "eventdate", self.eventdate.as_ref());
        insert_opt(&mut out, "venue", self.venue.as_ref());
        out.insert("language".into(), LANGUAGE.into());
        out.insert("series".into(), SERIES.into());
        out.insert("location".into(), LOCATION.into());
        if let Some(crossref) = crossref {
            out.retain(|key, _| !PROCEEDINGS_KEYS.contains(&key.as_str()));
            out.insert("crossref".into(), crossref.to_string());
        }
        out
    }
}

/// Turn a field map into a biblatex entry; `ENTRYTYPE` and `ID` become the
/// entry type and citation key, every other field one text chunk.
pub fn to_entry(record: &BibRecord) -> Entry {
    let entry_type = EntryType::new(record.get("ENTRYTYPE").map_or("misc", String::as_str));
    let key = record.get("ID").map_or("", String::as_str);
    let mut entry = Entry::new(key.to_string(), entry_type);
    for (field, value) in record {
        if field == "ENTRYTYPE" || field == "ID" {
            continue;
        }
        entry.set(field, vec![Spanned::new(Chunk::Normal(value.clone()), 0..0)]);
    }
    entry
}

/// Render one record as biblatex text, fields in alphabetical order.
pub fn format_entry(record: &BibRecord) -> String {
    let mut text = to_entry(record).to_biblatex_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

pub fn format_entries(records: &[BibRecord]) -> String {
    let mut bibliography = Bibliography::new();
    for record in records {
        if let Some(replaced) = bibliography.insert(to_entry(record)) {
            tracing::warn!(key = %replaced.key, "duplicate citation key; earlier entry replaced");
        }
    }
    let mut text = bibliography.to_biblatex_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

pub fn proceedings_entry(volume: &MergedRecord) -> ProceedingsEntry {
    ProceedingsEntry::from_volume(volume)
}

pub fn inproceedings_entry(
    paper: &MergedRecord,
    volume: Option<&MergedRecord>,
    authors: &[ResolvedAuthor],
) -> InProceedingsEntry {
    InProceedingsEntry::from_paper(paper, volume, authors)
}

/// A volume's `@proceedings` entry followed by one cross-referencing
/// `@inproceedings` entry per paper.
pub fn convert_volume(
    volume: &MergedRecord,
    papers: &[(MergedRecord, Vec<ResolvedAuthor>)],
) -> String {
    let proceedings = proceedings_entry(volume);
    let crossref = proceedings.id();
    let mut records = vec![proceedings.to_record()];
    for (paper, authors) in papers {
        let entry = inproceedings_entry(paper, Some(volume), authors);
        records.push(entry.to_record(Some(&crossref)));
    }
    format_entries(&records)
}

pub fn convert_paper(
    paper: &MergedRecord,
    volume: Option<&MergedRecord>,
    authors: &[ResolvedAuthor],
) -> String {
    format_entry(&inproceedings_entry(paper, volume, authors).to_record(None))
}
