use anyhow::Result;
use clap::ValueEnum;

use ceurspt::SptConfig;

use crate::commands::{CommandReport, load_catalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PaperFormat {
    #[default]
    Json,
    Bibtex,
    Wikidata,
    Qs,
    Smw,
    /// Resolved author list as JSON.
    Authors,
    /// Extracted full text from the mirror.
    Text,
}

#[derive(Debug, Clone)]
pub struct PaperOptions {
    pub volume: u32,
    pub stem: String,
    pub format: PaperFormat,
    pub verbose: bool,
}

pub fn run(config: &SptConfig, opts: &PaperOptions) -> Result<CommandReport> {
    let catalog = load_catalog(config, opts.verbose)?;
    let mut report = CommandReport::new("paper");

    let Some(paper) = catalog.get_paper(opts.volume, &opts.stem) else {
        report.issue(format!("paper Vol-{}/{} not found", opts.volume, opts.stem));
        return Ok(report);
    };

    let rendered = match opts.format {
        PaperFormat::Json => serde_json::to_string_pretty(&catalog.paper_record(paper))?,
        PaperFormat::Bibtex => catalog.paper_bibtex(paper),
        PaperFormat::Wikidata => serde_json::to_string_pretty(&catalog.paper_statements(paper))?,
        PaperFormat::Qs => catalog.paper_statements(paper).to_quickstatements(),
        PaperFormat::Smw => catalog.paper_markup(paper),
        PaperFormat::Authors => serde_json::to_string_pretty(&catalog.resolve_authors(paper))?,
        PaperFormat::Text => match catalog.paper_text(paper) {
            Some(text) => text,
            None => {
                report.issue(format!("{} has no mirrored text content", paper.id));
                return Ok(report);
            }
        },
    };
    report.output(rendered);
    Ok(report)
}
