use anyhow::Result;
use serde_json::json;

use ceurspt::SptConfig;

use crate::commands::{CommandReport, load_catalog};

#[derive(Debug, Clone)]
pub struct PapersOptions {
    pub volume: u32,
    pub json: bool,
    pub verbose: bool,
}

/// One line per paper: `<index>\t<id>\t<title>`, in volume order.
pub fn run(config: &SptConfig, opts: &PapersOptions) -> Result<CommandReport> {
    let catalog = load_catalog(config, opts.verbose)?;
    let mut report = CommandReport::new("papers");

    if catalog.get_volume(opts.volume).is_none() {
        report.issue(format!("volume {} not found", opts.volume));
        return Ok(report);
    }

    let papers = catalog.get_volume_papers(opts.volume);
    let rendered = if opts.json {
        let rows: Vec<_> = papers
            .iter()
            .map(|paper| {
                json!({
                    "index": paper.paper_index,
                    "id": paper.id,
                    "title": paper.title,
                    "pdfUrl": paper.pdf_url,
                })
            })
            .collect();
        serde_json::to_string_pretty(&rows)?
    } else {
        let mut out = String::new();
        for paper in &papers {
            let index = paper
                .paper_index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{index}\t{}\t{}\n",
                paper.id,
                paper.title.as_deref().unwrap_or("")
            ));
        }
        out
    };
    report.output(rendered);
    Ok(report)
}
