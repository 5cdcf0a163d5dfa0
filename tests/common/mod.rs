#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

/// A seeded cache directory plus a small proceedings mirror.
pub struct Fixture {
    pub tmp: TempDir,
    pub cache_dir: PathBuf,
    pub base_path: PathBuf,
}

impl Fixture {
    pub fn config_path(&self) -> PathBuf {
        self.tmp.path().join("no-such-ceurspt.toml")
    }
}

fn write_json(dir: &Path, name: &str, value: &Value) {
    let body = serde_json::to_string_pretty(value).expect("serialize fixture");
    fs::write(dir.join(format!("{name}.json")), body).expect("write fixture");
}

fn volumes() -> Value {
    json!([
        {
            "number": 3262,
            "title": "Proceedings of the 3rd Wikidata Workshop 2022",
            "acronym": "Wikidata 2022",
            "pubDate": "2022-11-03T00:00:00",
            "editors": "Lucie-Aimée Kaffee, Simon Razniewski",
            "url": "https://ceur-ws.org/Vol-3262/"
        },
        {
            "number": "1500",
            "title": "Joint Proceedings of Workshops 2015",
            "pubDate": "2015-10-01"
        },
        {
            "number": 42,
            "title": "A volume without papers"
        }
    ])
}

fn proceedings() -> Value {
    json!([
        {
            "sVolume": 3262,
            "item": "http://www.wikidata.org/entity/Q115053286",
            "itemDescription": "proceedings of Wikidata 2022",
            "dblpProceedingsId": "https://dblp.org/db/conf/semweb/wikidata2022",
            "ppnId": "1822568120",
            "eventLabel": "3rd Wikidata Workshop",
            "startDate": "2022-10-24T00:00:00Z",
            "locationLabel": "Hangzhou",
            "countryLabel": "China",
            "publication_date": "2022-11-03"
        }
    ])
}

fn paper(volume: u32, n: usize, authors: &str) -> Value {
    json!({
        "id": format!("Vol-{volume}/paper{n}"),
        "vol_number": volume,
        "pdf_name": format!("paper{n}.pdf"),
        "title": format!("Paper {n} of volume {volume}"),
        "authors": authors,
        "pages": format!("{}-{}", n * 10, n * 10 + 9)
    })
}

/// 17 papers in 3262 and 8 in 1500.
fn papers() -> Value {
    let mut rows = Vec::new();
    for n in 1..=17 {
        let authors = if n == 7 {
            "A. Smith, B. Jones"
        } else {
            "Wolfgang Fahl, Tim Holzheim"
        };
        rows.push(paper(3262, n, authors));
    }
    for n in 1..=8 {
        rows.push(paper(1500, n, "Jane Doe"));
    }
    Value::Array(rows)
}

fn author_index() -> Value {
    json!([
        {
            "pdf_id": "Vol-3262/paper7.pdf",
            "dblp_publication_id": "conf/semweb/SmithJ22",
            "authors": [
                {
                    "label": "B Jones",
                    "dblp_author_id": "https://dblp.org/pid/11/2222",
                    "wikidata_id": "http://www.wikidata.org/entity/Q42"
                },
                {
                    "label": "A Smith 0001",
                    "orcid_id": "https://orcid.org/0000-0002-1825-0097"
                }
            ]
        }
    ])
}

pub fn seed() -> Fixture {
    let tmp = tempdir().expect("tempdir");
    let cache_dir = tmp.path().join("cache");
    let base_path = tmp.path().join("ceur-ws");
    fs::create_dir_all(&cache_dir).expect("mkdir cache");

    write_json(&cache_dir, "volumes", &volumes());
    write_json(&cache_dir, "proceedings", &proceedings());
    write_json(&cache_dir, "papers", &papers());
    write_json(&cache_dir, "papers_dblp", &author_index());

    let vol_dir = base_path.join("Vol-3262");
    fs::create_dir_all(&vol_dir).expect("mkdir mirror");
    fs::write(
        vol_dir.join("index.html"),
        concat!(
            "<html><head><link rel=\"stylesheet\" href=\"../ceur-ws.css\"></head>\n",
            "<body><a href=\"paper1.pdf\">Paper 1</a>\n",
            "<a href=\"http://ceur-ws.org/Vol-3262/paper2.pdf\">Paper 2</a></body></html>\n"
        ),
    )
    .expect("write index");
    fs::write(vol_dir.join("paper1.pdf"), b"%PDF-1.4 fixture").expect("write pdf");
    fs::write(vol_dir.join("paper1-content.txt"), "Extracted text of paper 1.\n")
        .expect("write text");

    Fixture {
        tmp,
        cache_dir,
        base_path,
    }
}

/// Configuration pointing at the fixture, with an endpoint nothing listens on.
pub fn config(fixture: &Fixture) -> ceurspt::SptConfig {
    ceurspt::SptConfig::new(&fixture.base_path, "http://127.0.0.1:9", &fixture.cache_dir)
}
