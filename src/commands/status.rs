use anyhow::Result;

use ceurspt::SptConfig;
use ceurspt::spt::snapshot::{COLLECTIONS, SnapshotCache};

use crate::commands::CommandReport;

pub fn run(config: &SptConfig) -> Result<CommandReport> {
    let cache = SnapshotCache::new(config.cache_dir.clone(), config.base_url.clone());
    let mut report = CommandReport::new("status");

    report.detail(format!("base_path={}", config.base_path.display()));
    report.detail(format!("base_url={}", config.base_url));
    report.detail(format!("cache_dir={}", config.cache_dir.display()));

    for name in COLLECTIONS {
        let path = cache.cache_path(name);
        if cache.is_cached(name) {
            report.detail(format!("{name}={}", path.display()));
        } else {
            report.issue(format!(
                "missing {name} snapshot ({}); run `ceurspt recreate`",
                path.display()
            ));
        }
    }
    if !config.base_path.is_dir() {
        report.issue(format!(
            "missing proceedings mirror ({})",
            config.base_path.display()
        ));
    }

    Ok(report)
}
