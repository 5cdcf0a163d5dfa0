//! Linked-data statements for volumes and papers, as a JSON batch and as a
//! QuickStatements V1 script.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::spt::authors::ResolvedAuthor;
use crate::spt::merge::MergedRecord;
use crate::spt::record::parse_date;

pub const Q_PROCEEDINGS: &str = "Q1143604";
pub const Q_SCHOLARLY_ARTICLE: &str = "Q13442814";
pub const Q_CEUR_WS_SERIES: &str = "Q27230297";
pub const Q_ENGLISH: &str = "Q1860";

pub const P_INSTANCE_OF: &str = "P31";
pub const P_AUTHOR: &str = "P50";
pub const P_AUTHOR_NAME_STRING: &str = "P2093";
pub const P_SERIES_ORDINAL: &str = "P1545";
pub const P_PART_OF_SERIES: &str = "P179";
pub const P_VOLUME: &str = "P478";
pub const P_TITLE: &str = "P1476";
pub const P_SHORT_NAME: &str = "P1813";
pub const P_PUBLICATION_DATE: &str = "P577";
pub const P_PUBLISHED_IN: &str = "P1433";
pub const P_FULL_WORK_URL: &str = "P953";
pub const P_DESCRIBED_AT_URL: &str = "P973";
pub const P_LANGUAGE_OF_WORK: &str = "P407";
pub const P_DBLP_PUBLICATION_ID: &str = "P8978";
pub const P_K10PLUS_PPN_ID: &str = "P6721";
pub const P_PAGES: &str = "P304";

/// Day precision for time values.
const PRECISION_DAY: u8 = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimValue {
    Item { id: String },
    String { value: String },
    Monolingual { language: String, text: String },
    Time { time: String, precision: u8 },
    Url { value: String },
}

impl ClaimValue {
    pub fn item(id: impl Into<String>) -> Self {
        Self::Item { id: id.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            value: value.into(),
        }
    }

    pub fn english(text: impl Into<String>) -> Self {
        Self::Monolingual {
            language: "en".into(),
            text: text.into(),
        }
    }

    pub fn url(value: impl Into<String>) -> Self {
        Self::Url {
            value: value.into(),
        }
    }

    /// Day-precision time from an ISO date or datetime; `None` if unparseable.
    pub fn date(raw: &str) -> Option<Self> {
        let date = parse_date(raw)?;
        Some(Self::Time {
            time: format!("+{date}T00:00:00Z"),
            precision: PRECISION_DAY,
        })
    }

    fn to_quickstatements(&self) -> String {
        match self {
            Self::Item { id } => id.clone(),
            Self::String { value } | Self::Url { value } => quoted(value),
            Self::Monolingual { language, text } => format!("{language}:{}", quoted(text)),
            Self::Time { time, precision } => format!("{time}/{precision}"),
        }
    }
}

/// One command per line and tab-separated columns, so line breaks and tabs
/// inside a value become spaces. There is no escape for embedded `"`.
fn quoted(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            '"' => '\'',
            other => other,
        })
        .collect();
    format!("\"{flat}\"")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Qualifier {
    pub property: String,
    pub value: ClaimValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub property: String,
    pub value: ClaimValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,
}

impl Statement {
    pub fn new(property: &str, value: ClaimValue) -> Self {
        Self {
            property: property.to_string(),
            value,
            qualifiers: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, property: &str, value: ClaimValue) -> Self {
        self.qualifiers.push(Qualifier {
            property: property.to_string(),
            value,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct StatementBatch {
    /// Existing item to extend; `None` creates a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub statements: Vec<Statement>,
}

impl StatementBatch {
    fn push(&mut self, property: &str, value: ClaimValue) {
        self.statements.push(Statement::new(property, value));
    }

    fn push_opt(&mut self, property: &str, value: Option<ClaimValue>) {
        if let Some(value) = value {
            self.push(property, value);
        }
    }

    pub fn statements_for(&self, property: &str) -> Vec<&Statement> {
        self.statements
            .iter()
            .filter(|s| s.property == property)
            .collect()
    }

    /// Tab-separated QuickStatements V1 commands.
    pub fn to_quickstatements(&self) -> String {
        let mut lines = Vec::new();
        let subject = match &self.item {
            Some(item) => item.clone(),
            None => {
                lines.push("CREATE".to_string());
                "LAST".to_string()
            }
        };
        for (lang, label) in &self.labels {
            lines.push(format!("{subject}\tL{lang}\t{}", quoted(label)));
        }
        for (lang, description) in &self.descriptions {
            lines.push(format!("{subject}\tD{lang}\t{}", quoted(description)));
        }
        for statement in &self.statements {
            let mut line = format!(
                "{subject}\t{}\t{}",
                statement.property,
                statement.value.to_quickstatements()
            );
            for qualifier in &statement.qualifiers {
                line.push_str(&format!(
                    "\t{}\t{}",
                    qualifier.property,
                    qualifier.value.to_quickstatements()
                ));
            }
            lines.push(line);
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Author claims: a linked-data item when the author has one, otherwise the
/// plain name string. Both carry the ordinal.
pub fn author_statements(authors: &[ResolvedAuthor]) -> Vec<Statement> {
    authors
        .iter()
        .map(|author| {
            let statement = match &author.wikidata_id {
                Some(qid) => Statement::new(P_AUTHOR, ClaimValue::item(qid)),
                None => Statement::new(P_AUTHOR_NAME_STRING, ClaimValue::string(&author.name)),
            };
            statement.with_qualifier(
                P_SERIES_ORDINAL,
                ClaimValue::string(author.ordinal.to_string()),
            )
        })
        .collect()
}

pub fn volume_statements(volume: &MergedRecord) -> StatementBatch {
    let number = volume.get_str("spt.number").unwrap_or_default();
    let title = volume.get_str("spt.title");
    let mut batch = StatementBatch {
        item: volume.get_str("spt.wikidata_id"),
        ..StatementBatch::default()
    };
    batch.labels.insert(
        "en".into(),
        volume
            .get_str("spt.acronym")
            .or_else(|| title.clone())
            .unwrap_or_else(|| format!("Vol-{number}")),
    );
    batch.descriptions.insert(
        "en".into(),
        volume
            .get_str("spt.description")
            .unwrap_or_else(|| format!("proceedings published as CEUR-WS Volume {number}")),
    );
    batch.push(P_INSTANCE_OF, ClaimValue::item(Q_PROCEEDINGS));
    batch.statements.push(
        Statement::new(P_PART_OF_SERIES, ClaimValue::item(Q_CEUR_WS_SERIES))
            .with_qualifier(P_VOLUME, ClaimValue::string(&number)),
    );
    batch.push_opt(P_TITLE, title.map(ClaimValue::english));
    batch.push_opt(P_SHORT_NAME, volume.get_str("spt.acronym").map(ClaimValue::english));
    batch.push_opt(
        P_PUBLICATION_DATE,
        volume
            .get_str("wd.publication_date")
            .or_else(|| volume.get_str("spt.date"))
            .and_then(|raw| ClaimValue::date(&raw)),
    );
    batch.push_opt(P_DESCRIBED_AT_URL, volume.get_str("spt.url").map(ClaimValue::url));
    batch.push_opt(P_DBLP_PUBLICATION_ID, volume.get_str("spt.dblp_id").map(ClaimValue::string));
    batch.push_opt(P_K10PLUS_PPN_ID, volume.get_str("spt.ppn_id").map(ClaimValue::string));
    batch
}

pub fn paper_statements(
    paper: &MergedRecord,
    volume: Option<&MergedRecord>,
    authors: &[ResolvedAuthor],
) -> StatementBatch {
    let volume_number = paper.get_str("spt.volume_number").unwrap_or_default();
    let title = paper
        .get_str("spt.title")
        .or_else(|| paper.get_str("cvb.title"));
    let mut batch = StatementBatch::default();
    if let Some(title) = &title {
        batch.labels.insert("en".into(), title.clone());
    }
    batch.descriptions.insert(
        "en".into(),
        format!("scholarly article published in CEUR-WS Volume {volume_number}"),
    );
    batch.push(P_INSTANCE_OF, ClaimValue::item(Q_SCHOLARLY_ARTICLE));
    batch.push_opt(P_TITLE, title.map(ClaimValue::english));
    batch.statements.extend(author_statements(authors));
    batch.push_opt(
        P_PUBLISHED_IN,
        volume
            .and_then(|v| v.get_str("spt.wikidata_id"))
            .map(ClaimValue::item),
    );
    let date = paper
        .get("spt.volume")
        .and_then(|v| v.get("date"))
        .and_then(|v| v.as_str())
        .and_then(ClaimValue::date);
    batch.push_opt(P_PUBLICATION_DATE, date);
    batch.push_opt(P_FULL_WORK_URL, paper.get_str("spt.pdfUrl").map(ClaimValue::url));
    batch.push(P_LANGUAGE_OF_WORK, ClaimValue::item(Q_ENGLISH));
    batch.push_opt(P_PAGES, paper.get_str("cvb.pages").map(ClaimValue::string));
    batch.push_opt(
        P_DBLP_PUBLICATION_ID,
        paper.get_str("dblp.dblp_publication_id").map(ClaimValue::string),
    );
    batch
}
