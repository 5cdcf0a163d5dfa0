//! Best-effort pairing of free-text author names with structured author-index
//! entries.
//!
//! Matching is a deliberate heuristic: a structured label matches the first
//! free-text name it is a case-insensitive prefix of. Name-order variants and
//! differing middle initials will not match; such entries sort after the
//! matched ones.

use serde::Serialize;
use serde_json::Value;

use crate::spt::merge::MergedRecord;
use crate::spt::record::{Record, split_names, str_field, strip_any_prefix};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAuthor {
    pub name: String,
    /// 1-based position in the resolved list.
    pub ordinal: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dblp_author_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnd_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_id: Option<String>,
}

impl ResolvedAuthor {
    pub fn has_identifiers(&self) -> bool {
        self.dblp_author_id.is_some()
            || self.orcid.is_some()
            || self.gnd_id.is_some()
            || self.wikidata_id.is_some()
    }
}

/// Locates a structured label in the free-text author list.
pub trait AuthorMatcher {
    fn match_author(&self, free_text: &[String], label: &str) -> Option<usize>;
}

/// Case-insensitive prefix match after light normalisation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixMatcher;

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| if c == '.' || c == ',' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop a trailing homonym number such as `0001` from an index label.
fn strip_homonym_suffix(label: &str) -> &str {
    let trimmed = label.trim_end();
    match trimmed.rsplit_once(' ') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => {
            head.trim_end()
        }
        _ => trimmed,
    }
}

impl AuthorMatcher for PrefixMatcher {
    fn match_author(&self, free_text: &[String], label: &str) -> Option<usize> {
        let needle = normalize(strip_homonym_suffix(label));
        if needle.is_empty() {
            return None;
        }
        free_text
            .iter()
            .position(|name| normalize(name).starts_with(&needle))
    }
}

fn author_entries(index: &Value) -> Option<Vec<Record>> {
    let items = index.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
    )
}

fn free_text_names(record: &MergedRecord) -> Vec<String> {
    record
        .get_str("cvb.authors")
        .or_else(|| record.get_str("spt.authors"))
        .map(|raw| split_names(&raw))
        .unwrap_or_default()
}

fn id_field(entry: &Record, keys: &[&str], prefixes: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| str_field(entry, key))
        .map(|raw| strip_any_prefix(&raw, prefixes))
}

/// Resolve a paper's authors from its merged record with the default matcher.
pub fn resolve(record: &MergedRecord) -> Vec<ResolvedAuthor> {
    resolve_with(record, &PrefixMatcher)
}

pub fn resolve_with(record: &MergedRecord, matcher: &dyn AuthorMatcher) -> Vec<ResolvedAuthor> {
    let names = free_text_names(record);
    let entries = record.get("dblp.authors").and_then(author_entries);

    let Some(entries) = entries else {
        return names
            .into_iter()
            .enumerate()
            .map(|(i, name)| ResolvedAuthor {
                name,
                ordinal: i + 1,
                dblp_author_id: None,
                orcid: None,
                gnd_id: None,
                wikidata_id: None,
            })
            .collect();
    };

    let unmatched = names.len() + 1;
    let mut positioned: Vec<(usize, ResolvedAuthor)> = entries
        .iter()
        .map(|entry| {
            let label = str_field(entry, "label").unwrap_or_default();
            let matched = matcher
                .match_author(&names, &label)
                .and_then(|pos| names.get(pos).map(|name| (pos, name)));
            let position = matched.map(|(pos, _)| pos);
            let name = match matched {
                Some((_, name)) => name.clone(),
                None => label,
            };
            let author = ResolvedAuthor {
                name,
                ordinal: 0,
                dblp_author_id: id_field(entry, &["dblp_author_id"], &["https://dblp.org/pid/"]),
                orcid: id_field(entry, &["orcid_id", "orcid"], &["https://orcid.org/", "http://orcid.org/"]),
                gnd_id: id_field(entry, &["gnd_id"], &["https://d-nb.info/gnd/"]),
                wikidata_id: id_field(
                    entry,
                    &["wikidata_id"],
                    &["http://www.wikidata.org/entity/", "https://www.wikidata.org/wiki/"],
                ),
            };
            (position.unwrap_or(unmatched), author)
        })
        .collect();

    // stable: equal positions keep their index order
    positioned.sort_by_key(|(position, _)| *position);
    positioned
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut author))| {
            author.ordinal = i + 1;
            author
        })
        .collect()
}
