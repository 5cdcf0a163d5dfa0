use std::path::PathBuf;

use crate::error::SptResult;
use crate::render::{bibtex, smw, wikidata};
use crate::spt::authors::{self, ResolvedAuthor};
use crate::spt::config::SptConfig;
use crate::spt::content::{self, ContentKind};
use crate::spt::merge::{self, MergedRecord};
use crate::spt::paper::{Paper, PaperRegistry};
use crate::spt::snapshot::SnapshotCache;
use crate::spt::volume::{Volume, VolumeRegistry};

/// Either kind of entity a merged record can be built for.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Volume(&'a Volume),
    Paper(&'a Paper),
}

/// Both registries plus the snapshot cache they load from.
///
/// Registries are written only by [`Catalog::reload`]; every other method
/// reads. Merged records and author lists are rebuilt on each call.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: SptConfig,
    cache: SnapshotCache,
    volumes: VolumeRegistry,
    papers: PaperRegistry,
}

impl Catalog {
    /// An unloaded catalog.
    pub fn new(config: SptConfig) -> Self {
        let cache = SnapshotCache::new(config.cache_dir.clone(), config.base_url.clone());
        let volumes = VolumeRegistry::new(config.base_path.clone());
        Self {
            config,
            cache,
            volumes,
            papers: PaperRegistry::new(),
        }
    }

    pub fn load(config: SptConfig, verbose: bool) -> SptResult<Self> {
        let mut catalog = Self::new(config);
        catalog.reload(verbose)?;
        Ok(catalog)
    }

    /// Build fresh registries and swap them in. On error the previous
    /// registries stay in place.
    pub fn reload(&mut self, verbose: bool) -> SptResult<()> {
        let mut volumes = VolumeRegistry::new(self.config.base_path.clone());
        volumes.load_all(&self.cache, verbose)?;
        let mut papers = PaperRegistry::new();
        papers.load_all(&self.cache, &mut volumes, verbose)?;
        self.volumes = volumes;
        self.papers = papers;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.volumes.is_loaded() && self.papers.is_loaded()
    }

    pub fn config(&self) -> &SptConfig {
        &self.config
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn volumes(&self) -> &VolumeRegistry {
        &self.volumes
    }

    pub fn papers(&self) -> &PaperRegistry {
        &self.papers
    }

    pub fn get_volume(&self, number: u32) -> Option<&Volume> {
        self.volumes.get(number)
    }

    pub fn get_paper(&self, volume_number: u32, stem: &str) -> Option<&Paper> {
        self.papers.get(volume_number, stem)
    }

    pub fn get_volume_papers(&self, volume_number: u32) -> Vec<&Paper> {
        self.papers.get_volume_papers(volume_number)
    }

    /// The volume's own paper list, in `paper_index` order.
    pub fn volume_papers(&self, volume: &Volume) -> Vec<&Paper> {
        volume
            .papers
            .iter()
            .filter_map(|key| self.papers.get_by_key(key))
            .collect()
    }

    fn sibling(&self, paper: &Paper, offset: isize) -> Option<&Paper> {
        let index = paper.paper_index?;
        let volume = self.volumes.get(paper.volume_number)?;
        let target = index.checked_add_signed(offset)?;
        let key = volume.papers.get(target)?;
        self.papers.get_by_key(key)
    }

    pub fn prev_paper(&self, paper: &Paper) -> Option<&Paper> {
        self.sibling(paper, -1)
    }

    pub fn next_paper(&self, paper: &Paper) -> Option<&Paper> {
        self.sibling(paper, 1)
    }

    pub fn volume_record(&self, volume: &Volume) -> MergedRecord {
        merge::volume_record(volume, self.volumes.record(volume.number))
    }

    pub fn paper_record(&self, paper: &Paper) -> MergedRecord {
        merge::paper_record(
            paper,
            self.volumes.get(paper.volume_number),
            self.papers.record_of(paper),
            self.papers.author_index_of(paper),
        )
    }

    pub fn merged_record_of(&self, entity: Entity<'_>) -> MergedRecord {
        match entity {
            Entity::Volume(volume) => self.volume_record(volume),
            Entity::Paper(paper) => self.paper_record(paper),
        }
    }

    pub fn resolve_authors(&self, paper: &Paper) -> Vec<ResolvedAuthor> {
        authors::resolve(&self.paper_record(paper))
    }

    pub fn paper_content(&self, paper: &Paper, kind: ContentKind) -> Option<Vec<u8>> {
        content::read_bytes(&self.config.base_path, paper, kind)
    }

    pub fn paper_text(&self, paper: &Paper) -> Option<String> {
        content::read_text(&self.config.base_path, paper, ContentKind::Text)
    }

    pub fn paper_pdf_path(&self, paper: &Paper) -> Option<PathBuf> {
        content::locate(&self.config.base_path, paper, ContentKind::Pdf)
    }

    fn owning_volume_record(&self, paper: &Paper) -> Option<MergedRecord> {
        self.volumes
            .get(paper.volume_number)
            .map(|volume| self.volume_record(volume))
    }

    pub fn volume_bibtex(&self, volume: &Volume) -> String {
        let papers: Vec<(MergedRecord, Vec<ResolvedAuthor>)> = self
            .volume_papers(volume)
            .into_iter()
            .map(|paper| {
                let record = self.paper_record(paper);
                let authors = authors::resolve(&record);
                (record, authors)
            })
            .collect();
        bibtex::convert_volume(&self.volume_record(volume), &papers)
    }

    pub fn paper_bibtex(&self, paper: &Paper) -> String {
        let record = self.paper_record(paper);
        let authors = authors::resolve(&record);
        bibtex::convert_paper(&record, self.owning_volume_record(paper).as_ref(), &authors)
    }

    pub fn volume_statements(&self, volume: &Volume) -> wikidata::StatementBatch {
        wikidata::volume_statements(&self.volume_record(volume))
    }

    pub fn paper_statements(&self, paper: &Paper) -> wikidata::StatementBatch {
        let record = self.paper_record(paper);
        let authors = authors::resolve(&record);
        wikidata::paper_statements(&record, self.owning_volume_record(paper).as_ref(), &authors)
    }

    pub fn volume_markup(&self, volume: &Volume) -> String {
        smw::volume_markup(&self.volume_record(volume))
    }

    pub fn paper_markup(&self, paper: &Paper) -> String {
        let record = self.paper_record(paper);
        let authors = authors::resolve(&record);
        smw::paper_markup(&record, &authors)
    }
}
