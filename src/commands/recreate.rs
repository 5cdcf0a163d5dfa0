use anyhow::Result;

use ceurspt::SptConfig;
use ceurspt::spt::snapshot::{COLLECTIONS, SnapshotCache};

use crate::commands::CommandReport;

/// Refetch every collection from the remote endpoint and overwrite the
/// cache. A failing collection is reported and the rest still refresh.
pub fn run(config: &SptConfig) -> Result<CommandReport> {
    let cache = SnapshotCache::new(config.cache_dir.clone(), config.base_url.clone());
    let mut report = CommandReport::new("recreate");
    report.detail(format!("base_url={}", cache.base_url()));
    report.detail(format!("cache_dir={}", cache.cache_dir().display()));

    for name in COLLECTIONS {
        let records = match cache.fetch(name) {
            Ok(records) => records,
            Err(err) => {
                report.issue(format!("{name}: {:#}", anyhow::Error::from(err)));
                continue;
            }
        };
        match cache.store(name, &records) {
            Ok(path) => {
                tracing::info!(collection = name, records = records.len(), "snapshot stored");
                report.detail(format!("{name}: {} records -> {}", records.len(), path.display()));
            }
            Err(err) => report.issue(format!("{name}: {:#}", anyhow::Error::from(err))),
        }
    }

    Ok(report)
}
