pub mod paper;
pub mod papers;
pub mod recreate;
pub mod status;
pub mod volume;

use anyhow::{Context, Result};
use serde::Serialize;

use ceurspt::{Catalog, SptConfig};

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    /// Rendered document printed verbatim instead of the report.
    #[serde(skip)]
    pub output: Option<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            output: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn output(&mut self, text: impl Into<String>) {
        self.output = Some(text.into());
    }

}

pub fn load_catalog(config: &SptConfig, verbose: bool) -> Result<Catalog> {
    Catalog::load(config.clone(), verbose).context("failed to load volume and paper registries")
}
