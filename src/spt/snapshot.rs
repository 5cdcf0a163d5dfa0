use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{SptError, SptResult};
use crate::spt::record::Record;

pub const VOLUMES: &str = "volumes";
pub const PAPERS: &str = "papers";
pub const PROCEEDINGS: &str = "proceedings";
pub const AUTHOR_INDEX: &str = "papers_dblp";

/// Every collection the registries load, in load order.
pub const COLLECTIONS: &[&str] = &[VOLUMES, PAPERS, PROCEEDINGS, AUTHOR_INDEX];

/// Named record collections read from `{cache_dir}/{name}.json`, falling back
/// to `{base_url}/{name}.json`.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    cache_dir: PathBuf,
    base_url: String,
}

impl SnapshotCache {
    pub fn new(cache_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{name}.json"))
    }

    pub fn remote_url(&self, name: &str) -> String {
        format!("{}/{name}.json", self.base_url)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache_path(name).is_file()
    }

    /// Load a collection from the cache file, or from the remote endpoint on a
    /// miss. Nothing is written back; see [`SnapshotCache::store`].
    pub fn load(&self, name: &str) -> SptResult<Vec<Record>> {
        let path = self.cache_path(name);
        let local_err = if path.is_file() {
            match read_collection(&path) {
                Ok(records) => {
                    tracing::debug!(collection = name, path = %path.display(), count = records.len(), "snapshot read from cache");
                    return Ok(records);
                }
                Err(err) => {
                    tracing::warn!(collection = name, path = %path.display(), error = %format!("{err:#}"), "cache file unreadable; falling back to remote");
                    Some(err)
                }
            }
        } else {
            None
        };

        self.fetch_remote(name).map_err(|remote_err| {
            let source = match local_err {
                Some(local) => remote_err.context(format!("cache read also failed: {local:#}")),
                None => remote_err,
            };
            SptError::SnapshotUnavailable {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Fetch a collection from the remote endpoint, ignoring the cache.
    pub fn fetch(&self, name: &str) -> SptResult<Vec<Record>> {
        self.fetch_remote(name)
            .map_err(|source| SptError::SnapshotUnavailable {
                name: name.to_string(),
                source,
            })
    }

    fn fetch_remote(&self, name: &str) -> Result<Vec<Record>> {
        let url = self.remote_url(name);
        tracing::info!(collection = name, url = %url, "fetching snapshot");
        let client = Client::builder().build()?;
        let response = client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url} failed"))?;
        if !response.status().is_success() {
            anyhow::bail!("GET {url} returned status {}", response.status());
        }
        let body = response
            .text()
            .with_context(|| format!("failed to read body of {url}"))?;
        parse_collection(&body).with_context(|| format!("invalid collection from {url}"))
    }

    /// Persist a collection as the cache file for `name`.
    pub fn store(&self, name: &str, records: &[Record]) -> SptResult<PathBuf> {
        let path = self.cache_path(name);
        write_collection(&self.cache_dir, &path, records).map_err(|source| SptError::Cache {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(collection = name, path = %path.display(), count = records.len(), "snapshot stored");
        Ok(path)
    }
}

fn read_collection(path: &Path) -> Result<Vec<Record>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_collection(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse a JSON array of objects. Non-object entries are dropped with a
/// warning.
pub fn parse_collection(raw: &str) -> Result<Vec<Record>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            serde_json::Value::Object(map) => out.push(map),
            other => {
                tracing::warn!(index, kind = json_kind(&other), "skipping non-object snapshot entry");
            }
        }
    }
    Ok(out)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn write_collection(dir: &Path, path: &Path, records: &[Record]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let data = serde_json::to_vec(records)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).expect("records")
    }

    #[test]
    fn store_then_load_reads_the_cache_file() {
        let tmp = tempdir().expect("tempdir");
        let cache = SnapshotCache::new(tmp.path().join("cache"), "http://127.0.0.1:9");
        let volumes = records(json!([{"number": 3262, "title": "Wikidata 2022"}]));

        let path = cache.store(VOLUMES, &volumes).expect("store");
        assert_eq!(path, tmp.path().join("cache/volumes.json"));
        assert!(cache.is_cached(VOLUMES));

        let loaded = cache.load(VOLUMES).expect("load");
        assert_eq!(loaded, volumes);
    }

    #[test]
    fn load_without_cache_or_remote_names_the_collection() {
        let tmp = tempdir().expect("tempdir");
        // port 9 (discard) is closed on test hosts, so the fetch fails fast
        let cache = SnapshotCache::new(tmp.path(), "http://127.0.0.1:9/");
        let err = cache.load(PROCEEDINGS).expect_err("must fail");
        match &err {
            SptError::SnapshotUnavailable { name, .. } => assert_eq!(name, PROCEEDINGS),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("proceedings"));
    }

    #[test]
    fn corrupt_cache_falls_back_and_reports_both_causes() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("papers.json"), "{not json").expect("write");
        let cache = SnapshotCache::new(tmp.path(), "http://127.0.0.1:9");
        let err = cache.load(PAPERS).expect_err("must fail");
        assert!(format!("{err}").contains("cache read also failed"));
    }

    /// Answer exactly one HTTP request with `body` as JSON.
    fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            loop {
                let mut header = String::new();
                let read = reader.read_line(&mut header).expect("header");
                if read == 0 || header == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write response");
            request_line
        });
        (base_url, handle)
    }

    #[test]
    fn remote_load_returns_records_without_writing_cache() {
        let (base_url, server) = serve_once(r#"[{"number": 3262, "title": "Wikidata 2022"}, 7]"#);
        let tmp = tempdir().expect("tempdir");
        let cache = SnapshotCache::new(tmp.path().join("cache"), base_url);

        let loaded = cache.load(VOLUMES).expect("remote load");

        assert_eq!(loaded, records(json!([{"number": 3262, "title": "Wikidata 2022"}])));
        assert!(!cache.is_cached(VOLUMES));
        assert!(!tmp.path().join("cache").exists());
        let request_line = server.join().expect("server thread");
        assert!(request_line.starts_with("GET /volumes.json "));
    }

    #[test]
    fn parse_collection_drops_non_objects() {
        let parsed = parse_collection(r#"[{"id": "a"}, 3, null, {"id": "b"}]"#).expect("parse");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn remote_url_joins_base_and_name() {
        let cache = SnapshotCache::new("/tmp", "https://cvb.example/");
        assert_eq!(cache.remote_url(VOLUMES), "https://cvb.example/volumes.json");
    }
}
