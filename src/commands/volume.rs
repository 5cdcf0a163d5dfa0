use anyhow::Result;
use clap::ValueEnum;

use ceurspt::SptConfig;

use crate::commands::{CommandReport, load_catalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VolumeFormat {
    /// Merged record as a flat JSON object.
    #[default]
    Json,
    Bibtex,
    /// Linked-data statement batch as JSON.
    Wikidata,
    /// QuickStatements V1 script.
    Qs,
    Smw,
    /// Mirrored index.html with links rewritten.
    Html,
}

#[derive(Debug, Clone)]
pub struct VolumeOptions {
    pub number: u32,
    pub format: VolumeFormat,
    pub verbose: bool,
}

pub fn run(config: &SptConfig, opts: &VolumeOptions) -> Result<CommandReport> {
    let catalog = load_catalog(config, opts.verbose)?;
    let mut report = CommandReport::new("volume");

    let Some(volume) = catalog.get_volume(opts.number) else {
        report.issue(format!("volume {} not found", opts.number));
        return Ok(report);
    };

    let rendered = match opts.format {
        VolumeFormat::Json => serde_json::to_string_pretty(&catalog.volume_record(volume))?,
        VolumeFormat::Bibtex => catalog.volume_bibtex(volume),
        VolumeFormat::Wikidata => serde_json::to_string_pretty(&catalog.volume_statements(volume))?,
        VolumeFormat::Qs => catalog.volume_statements(volume).to_quickstatements(),
        VolumeFormat::Smw => catalog.volume_markup(volume),
        VolumeFormat::Html => match volume.index_html(true) {
            Some(html) => html,
            None => {
                report.issue(format!("Vol-{} has no mirrored index.html", volume.number));
                return Ok(report);
            }
        },
    };
    report.output(rendered);
    Ok(report)
}
