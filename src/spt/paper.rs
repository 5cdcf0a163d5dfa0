use std::collections::HashMap;

use crate::error::SptResult;
use crate::spt::paths::{
    base_path_from_location, default_pdf_url, paper_key, split_base_path, strip_pdf_extension,
    volume_key_prefix,
};
use crate::spt::record::{Record, str_field, u32_field};
use crate::spt::snapshot::{AUTHOR_INDEX, PAPERS, SnapshotCache};
use crate::spt::volume::VolumeRegistry;

/// A single article, addressed by `(volume, stem)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Stable identifier, e.g. `Vol-3262/paper7`.
    pub id: String,
    pub volume_number: u32,
    /// File stem of the PDF, e.g. `paper7`.
    pub stem: String,
    pub title: Option<String>,
    /// Free-text, comma-separated author names.
    pub authors: Option<String>,
    pub pdf_url: String,
    /// Position in the owning volume's paper list; `None` when the volume is
    /// not registered.
    pub paper_index: Option<usize>,
}

impl Paper {
    /// Registry key, `Vol-<n>/<stem>`.
    pub fn key(&self) -> String {
        paper_key(self.volume_number, &self.stem)
    }

    /// Content root relative to the mirror: the download location without the
    /// remote host and `.pdf` extension.
    pub fn base_path(&self) -> String {
        base_path_from_location(&self.pdf_url)
    }

    pub fn html_url(&self) -> String {
        format!("/{}.html", self.id)
    }

    /// Id usable as a citation key fragment, `Vol-3262:paper7`.
    pub fn citation_id(&self) -> String {
        self.id.replace('/', ":")
    }
}

fn paper_from_record(record: &Record) -> Result<Paper, String> {
    let volume_number =
        u32_field(record, "vol_number").ok_or_else(|| "missing or invalid vol_number".to_string())?;
    let pdf_name = str_field(record, "pdf_name").ok_or_else(|| "missing pdf_name".to_string())?;
    let file_name = pdf_name.rsplit('/').next().unwrap_or(&pdf_name);
    let stem = strip_pdf_extension(file_name).to_string();
    if stem.is_empty() {
        return Err(format!("pdf_name `{pdf_name}` has no file stem"));
    }
    let id = str_field(record, "id").unwrap_or_else(|| paper_key(volume_number, &stem));
    let pdf_url =
        str_field(record, "pdfUrl").unwrap_or_else(|| default_pdf_url(volume_number, &pdf_name));

    Ok(Paper {
        id,
        volume_number,
        stem,
        title: str_field(record, "title"),
        authors: str_field(record, "authors"),
        pdf_url,
        paper_index: None,
    })
}

fn author_index_key(record: &Record) -> Result<String, String> {
    let pdf_id = str_field(record, "pdf_id").ok_or_else(|| "missing pdf_id".to_string())?;
    let base_path = base_path_from_location(&pdf_id);
    let (volume, stem) = split_base_path(&base_path)
        .ok_or_else(|| format!("pdf_id `{pdf_id}` is not a Vol-<n>/<stem> path"))?;
    Ok(paper_key(volume, &stem))
}

/// All papers plus their snapshot and author-index records.
#[derive(Debug, Clone, Default)]
pub struct PaperRegistry {
    papers: Vec<Paper>,
    records: Vec<Record>,
    by_key: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    author_index: HashMap<String, Record>,
    loaded: bool,
    skipped: usize,
}

impl PaperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn author_index_len(&self) -> usize {
        self.author_index.len()
    }

    pub fn load_all(
        &mut self,
        cache: &SnapshotCache,
        volumes: &mut VolumeRegistry,
        verbose: bool,
    ) -> SptResult<()> {
        let paper_records = cache.load(PAPERS)?;
        let author_records = cache.load(AUTHOR_INDEX)?;
        self.load_from_records(paper_records, author_records, volumes);
        if verbose {
            tracing::info!(
                papers = self.papers.len(),
                author_index = self.author_index.len(),
                skipped = self.skipped,
                "paper registry loaded"
            );
        }
        Ok(())
    }

    /// Populate from already loaded collections, wiring each paper into its
    /// volume's paper list. Replaces previous state.
    pub fn load_from_records(
        &mut self,
        paper_records: Vec<Record>,
        author_records: Vec<Record>,
        volumes: &mut VolumeRegistry,
    ) {
        volumes.clear_papers();
        let mut registry = PaperRegistry::new();

        for (index, record) in paper_records.into_iter().enumerate() {
            let mut paper = match paper_from_record(&record) {
                Ok(paper) => paper,
                Err(reason) => {
                    tracing::warn!(collection = PAPERS, index, reason = %reason, "malformed paper record; skipped");
                    registry.skipped += 1;
                    continue;
                }
            };
            let key = paper.key();
            if registry.by_key.contains_key(&key) {
                tracing::warn!(collection = PAPERS, index, paper = %key, "duplicate paper key; skipped");
                registry.skipped += 1;
                continue;
            }
            match volumes.get_mut(paper.volume_number) {
                Some(volume) => {
                    paper.paper_index = Some(volume.papers.len());
                    volume.papers.push(key.clone());
                }
                None => {
                    tracing::debug!(paper = %key, volume = paper.volume_number, "paper without registered volume");
                }
            }
            let slot = registry.papers.len();
            registry.by_id.entry(paper.id.clone()).or_insert(slot);
            registry.by_key.insert(key, slot);
            registry.papers.push(paper);
            registry.records.push(record);
        }

        for (index, record) in author_records.into_iter().enumerate() {
            match author_index_key(&record) {
                Ok(key) => {
                    registry.author_index.insert(key, record);
                }
                Err(reason) => {
                    tracing::warn!(collection = AUTHOR_INDEX, index, reason = %reason, "malformed author-index record; skipped");
                    registry.skipped += 1;
                }
            }
        }

        registry.loaded = true;
        *self = registry;
    }

    pub fn get(&self, volume_number: u32, stem: &str) -> Option<&Paper> {
        self.get_by_key(&paper_key(volume_number, stem))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Paper> {
        self.by_key.get(key).map(|slot| &self.papers[*slot])
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Paper> {
        self.by_id.get(id).map(|slot| &self.papers[*slot])
    }

    /// Every registered paper of a volume in registration order, whether or
    /// not the volume itself is registered.
    pub fn get_volume_papers(&self, volume_number: u32) -> Vec<&Paper> {
        let prefix = volume_key_prefix(volume_number);
        self.papers
            .iter()
            .filter(|paper| paper.key().starts_with(&prefix))
            .collect()
    }

    /// The `papers` snapshot record a paper was built from.
    pub fn record_of(&self, paper: &Paper) -> Option<&Record> {
        self.by_key
            .get(&paper.key())
            .map(|slot| &self.records[*slot])
    }

    pub fn author_index_of(&self, paper: &Paper) -> Option<&Record> {
        self.author_index.get(&paper.key())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter()
    }
}
