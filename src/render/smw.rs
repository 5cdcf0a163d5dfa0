//! Semantic MediaWiki template markup.

use crate::spt::authors::ResolvedAuthor;
use crate::spt::merge::MergedRecord;

fn escape(value: &str) -> String {
    value.replace('|', "{{!}}").replace('\n', " ")
}

fn template(name: &str, fields: &[(&str, Option<String>)]) -> String {
    let mut out = format!("{{{{{name}\n");
    for (key, value) in fields {
        if let Some(value) = value {
            if !value.is_empty() {
                out.push_str(&format!("|{key}={}\n", escape(value)));
            }
        }
    }
    out.push_str("}}\n");
    out
}

pub fn volume_markup(volume: &MergedRecord) -> String {
    template(
        "Volume",
        &[
            ("number", volume.get_str("spt.number")),
            ("title", volume.get_str("spt.title")),
            ("acronym", volume.get_str("spt.acronym")),
            ("date", volume.get_str("spt.date")),
            ("url", volume.get_str("spt.url")),
            ("editors", volume.get_str("cvb.editors")),
            ("event", volume.get_str("wd.eventLabel")),
            ("wikidataid", volume.get_str("spt.wikidata_id")),
            ("dblp", volume.get_str("spt.dblp_id")),
            ("k10plus", volume.get_str("spt.ppn_id")),
        ],
    )
}

pub fn paper_markup(paper: &MergedRecord, authors: &[ResolvedAuthor]) -> String {
    let names = if authors.is_empty() {
        None
    } else {
        Some(
            authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    };
    template(
        "Paper",
        &[
            ("id", paper.get_str("spt.id")),
            ("title", paper.get_str("spt.title")),
            ("authors", names),
            ("volume", paper.get_str("spt.volume_number")),
            ("pdfUrl", paper.get_str("spt.pdfUrl")),
            ("pages", paper.get_str("cvb.pages")),
            ("dblp", paper.get_str("dblp.dblp_publication_id")),
        ],
    )
}
