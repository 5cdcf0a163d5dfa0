pub mod authors;
pub mod catalog;
pub mod config;
pub mod content;
pub mod merge;
pub mod paper;
pub mod paths;
pub mod record;
pub mod snapshot;
pub mod volume;
