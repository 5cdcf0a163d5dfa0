mod common;

use std::fs;

use ceurspt::render::wikidata::{ClaimValue, P_AUTHOR, P_AUTHOR_NAME_STRING};
use ceurspt::spt::merge::Namespace;
use ceurspt::{Catalog, Entity, SptError};

fn loaded() -> (common::Fixture, Catalog) {
    let fixture = common::seed();
    let catalog = Catalog::load(common::config(&fixture), false).expect("load catalog");
    (fixture, catalog)
}

#[test]
fn fixture_counts_match_source_collections() {
    let (_fixture, catalog) = loaded();
    assert!(catalog.is_loaded());
    assert_eq!(catalog.volumes().len(), 3);
    assert_eq!(catalog.papers().len(), 25);
    assert_eq!(catalog.get_volume_papers(3262).len(), 17);
    assert_eq!(catalog.get_volume_papers(1500).len(), 8);
    assert_eq!(catalog.papers().author_index_len(), 1);
}

#[test]
fn volumes_are_keyed_by_their_number() {
    let (_fixture, catalog) = loaded();
    for volume in catalog.volumes().iter() {
        let found = catalog.get_volume(volume.number).expect("volume by number");
        assert_eq!(found.number, volume.number);
    }
    assert!(catalog.get_volume(1500).is_some());
    assert!(catalog.get_volume(9999).is_none());
}

#[test]
fn unknown_or_empty_volume_has_no_papers() {
    let (_fixture, catalog) = loaded();
    assert!(catalog.get_volume_papers(9999).is_empty());
    assert!(catalog.get_volume_papers(42).is_empty());
}

#[test]
fn paper_indexes_are_contiguous_in_source_order() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(3262).expect("volume");
    let papers = catalog.volume_papers(volume);
    assert_eq!(papers.len(), 17);
    for (expected, paper) in papers.iter().enumerate() {
        assert_eq!(paper.paper_index, Some(expected));
        assert_eq!(paper.stem, format!("paper{}", expected + 1));
    }
}

#[test]
fn prev_and_next_follow_paper_index() {
    let (_fixture, catalog) = loaded();
    let first = catalog.get_paper(3262, "paper1").expect("first");
    let second = catalog.get_paper(3262, "paper2").expect("second");
    let last = catalog.get_paper(3262, "paper17").expect("last");

    assert!(catalog.prev_paper(first).is_none());
    assert_eq!(catalog.next_paper(first).map(|p| p.id.as_str()), Some("Vol-3262/paper2"));
    assert_eq!(catalog.prev_paper(second).map(|p| p.id.as_str()), Some("Vol-3262/paper1"));
    assert!(catalog.next_paper(last).is_none());
}

#[test]
fn proceedings_identifiers_are_joined_onto_volume() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(3262).expect("volume");
    assert_eq!(volume.wikidata_id.as_deref(), Some("Q115053286"));
    assert_eq!(volume.dblp_id.as_deref(), Some("conf/semweb/wikidata2022"));
    assert_eq!(volume.ppn_id.as_deref(), Some("1822568120"));
    assert!(volume.has_content());
    assert!(!catalog.get_volume(1500).expect("volume").has_content());

    let record = catalog.volume_record(volume);
    assert_eq!(record.get_str("wd.eventLabel").as_deref(), Some("3rd Wikidata Workshop"));
    assert_eq!(
        record.get_str("cvb.editors").as_deref(),
        Some("Lucie-Aimée Kaffee, Simon Razniewski")
    );
    assert_eq!(record.get_str("spt.paper_count").as_deref(), Some("17"));
}

#[test]
fn merged_records_are_idempotent_and_disjoint() {
    let (_fixture, catalog) = loaded();
    let paper = catalog.get_paper(3262, "paper7").expect("paper");

    let first = catalog.merged_record_of(Entity::Paper(paper));
    let second = catalog.merged_record_of(Entity::Paper(paper));
    assert_eq!(first, second);

    assert_eq!(first.to_flat_map().len(), first.len());
    let namespaces = first.namespaces();
    assert!(namespaces.contains(&&Namespace::Spt));
    assert!(namespaces.contains(&&Namespace::Cvb));
    assert!(namespaces.contains(&&Namespace::Dblp));
    assert_eq!(first.get_str("dblp.dblp_publication_id").as_deref(), Some("conf/semweb/SmithJ22"));
}

#[test]
fn authors_follow_free_text_order_with_identifiers() {
    let (_fixture, catalog) = loaded();
    let paper = catalog.get_paper(3262, "paper7").expect("paper");
    let authors = catalog.resolve_authors(paper);

    let names: Vec<&str> = authors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["A. Smith", "B. Jones"]);
    assert_eq!(authors[0].ordinal, 1);
    assert_eq!(authors[0].orcid.as_deref(), Some("0000-0002-1825-0097"));
    assert_eq!(authors[1].ordinal, 2);
    assert_eq!(authors[1].dblp_author_id.as_deref(), Some("11/2222"));
    assert_eq!(authors[1].wikidata_id.as_deref(), Some("Q42"));
}

#[test]
fn authors_without_index_come_from_free_text() {
    let (_fixture, catalog) = loaded();
    let paper = catalog.get_paper(1500, "paper3").expect("paper");
    let authors = catalog.resolve_authors(paper);
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].name, "Jane Doe");
    assert!(!authors[0].has_identifiers());
}

#[test]
fn volume_bibtex_crossrefs_every_paper() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(3262).expect("volume");
    let bibtex = catalog.volume_bibtex(volume);

    assert!(bibtex.starts_with("@proceedings{Wikidata_2022,"));
    assert_eq!(bibtex.matches("@inproceedings{").count(), 17);
    assert_eq!(bibtex.matches("crossref = {").count(), 17);
    assert_eq!(bibtex.matches("series = {CEUR Workshop Proceedings}").count(), 1);
    assert!(bibtex.contains("@inproceedings{ceur-ws:Vol-3262:paper7,"));
    assert!(bibtex.contains("venue = {Hangzhou, China}"));
    assert!(bibtex.contains("editor = {Lucie-Aimée Kaffee and Simon Razniewski}"));
}

#[test]
fn volume_without_acronym_uses_number_id() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(1500).expect("volume");
    let bibtex = catalog.volume_bibtex(volume);
    assert!(bibtex.starts_with("@proceedings{ceur-ws:Vol-1500,"));
    assert_eq!(bibtex.matches("crossref = {ceur-ws:Vol-1500}").count(), 8);
}

#[test]
fn standalone_paper_bibtex_carries_proceedings_fields() {
    let (_fixture, catalog) = loaded();
    let paper = catalog.get_paper(3262, "paper7").expect("paper");
    let bibtex = catalog.paper_bibtex(paper);

    assert!(bibtex.starts_with("@inproceedings{ceur-ws:Vol-3262:paper7,"));
    assert!(bibtex.contains("author = {A. Smith and B. Jones}"));
    assert!(bibtex.contains("series = {CEUR Workshop Proceedings}"));
    assert!(bibtex.contains("eventtitle = {3rd Wikidata Workshop}"));
    assert!(bibtex.contains("pages = {70-79}"));
    assert!(!bibtex.contains("crossref"));
}

#[test]
fn paper_statements_link_known_authors() {
    let (_fixture, catalog) = loaded();
    let paper = catalog.get_paper(3262, "paper7").expect("paper");
    let batch = catalog.paper_statements(paper);

    let linked = batch.statements_for(P_AUTHOR);
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].value, ClaimValue::item("Q42"));
    let named = batch.statements_for(P_AUTHOR_NAME_STRING);
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].value, ClaimValue::string("A. Smith"));

    let script = batch.to_quickstatements();
    assert!(script.starts_with("CREATE\n"));
    assert!(script.contains("LAST\tP1433\tQ115053286"));
}

#[test]
fn volume_statements_extend_existing_item() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(3262).expect("volume");
    let script = catalog.volume_statements(volume).to_quickstatements();
    assert!(!script.contains("CREATE"));
    assert!(script.contains("Q115053286\tLen\t\"Wikidata 2022\""));
    assert!(script.contains("Q115053286\tP577\t+2022-11-03T00:00:00Z/11"));
}

#[test]
fn markup_renders_volume_template() {
    let (_fixture, catalog) = loaded();
    let volume = catalog.get_volume(3262).expect("volume");
    let markup = catalog.volume_markup(volume);
    assert!(markup.starts_with("{{Volume\n|number=3262\n"));
    assert!(markup.contains("|event=3rd Wikidata Workshop\n"));
}

#[test]
fn mirrored_content_is_found_by_postfix() {
    let (_fixture, catalog) = loaded();
    let paper1 = catalog.get_paper(3262, "paper1").expect("paper1");
    let paper2 = catalog.get_paper(3262, "paper2").expect("paper2");

    assert_eq!(catalog.paper_text(paper1).as_deref(), Some("Extracted text of paper 1.\n"));
    assert!(catalog.paper_pdf_path(paper1).is_some());
    assert!(catalog.paper_text(paper2).is_none());
    assert!(catalog.paper_pdf_path(paper2).is_none());
}

#[test]
fn volume_index_links_are_rewritten() {
    let (_fixture, catalog) = loaded();
    let html = catalog
        .get_volume(3262)
        .and_then(|v| v.index_html(true))
        .expect("index html");
    assert!(html.contains("href=\"/static/ceur-ws.css\""));
    assert!(html.contains("href=\"/Vol-3262/paper1.pdf\""));
    assert!(html.contains("href=\"/Vol-3262/paper2.pdf\""));
    assert!(catalog.get_volume(1500).and_then(|v| v.index_html(true)).is_none());
}

#[test]
fn proceedings_for_unknown_volume_abort_loading() {
    let fixture = common::seed();
    fs::write(
        fixture.cache_dir.join("proceedings.json"),
        r#"[{"sVolume": 9999, "eventLabel": "Orphan"}]"#,
    )
    .expect("write proceedings");

    let err = Catalog::load(common::config(&fixture), false).expect_err("must fail");
    assert!(matches!(err, SptError::ProceedingsWithoutVolume { number: 9999 }));
}

#[test]
fn missing_snapshot_without_remote_is_reported() {
    let fixture = common::seed();
    fs::remove_file(fixture.cache_dir.join("papers_dblp.json")).expect("remove");

    let err = Catalog::load(common::config(&fixture), false).expect_err("must fail");
    match err {
        SptError::SnapshotUnavailable { name, .. } => assert_eq!(name, "papers_dblp"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_reload_keeps_previous_registries() {
    let (fixture, mut catalog) = loaded();
    fs::write(fixture.cache_dir.join("papers.json"), "not json").expect("corrupt");

    assert!(catalog.reload(false).is_err());
    assert_eq!(catalog.papers().len(), 25);
    assert_eq!(catalog.get_volume_papers(3262).len(), 17);
}
