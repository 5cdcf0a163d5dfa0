use std::fs;
use std::path::{Path, PathBuf};

use crate::spt::paper::Paper;

/// File groups mirrored per paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Text,
    Tei,
    Cermine,
}

impl ContentKind {
    /// Postfixes tried in order, appended to the paper's base path.
    pub fn postfixes(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &[".pdf"],
            Self::Text => &["-content.txt", ".txt"],
            Self::Tei => &[".tei.xml"],
            Self::Cermine => &[".cermine.xml"],
        }
    }
}

/// First existing file of `kind` for the paper under the mirror root.
pub fn locate(root: &Path, paper: &Paper, kind: ContentKind) -> Option<PathBuf> {
    let base = root.join(paper.base_path());
    let base = base.to_string_lossy();
    kind.postfixes()
        .iter()
        .map(|postfix| PathBuf::from(format!("{base}{postfix}")))
        .find(|path| path.is_file())
}

/// Raw bytes of the first existing file of `kind`; `None` when absent or
/// unreadable.
pub fn read_bytes(root: &Path, paper: &Paper, kind: ContentKind) -> Option<Vec<u8>> {
    let path = locate(root, paper, kind)?;
    match fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::debug!(paper = %paper.id, path = %path.display(), error = %err, "content unreadable");
            None
        }
    }
}

/// Text content; invalid UTF-8 is replaced rather than rejected.
pub fn read_text(root: &Path, paper: &Paper, kind: ContentKind) -> Option<String> {
    read_bytes(root, paper, kind).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
