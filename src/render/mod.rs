pub mod bibtex;
pub mod smw;
pub mod wikidata;
