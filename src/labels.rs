use anyhow::{Context, Result};
use std::{path::Path, sync::OnceLock};

static IMAGENET_LABELS: &str = include_str!("../assets/imagenet_labels.txt");
static IMAGENET: OnceLock<LabelTable> = OnceLock::new();

/// Index-to-name lookup for classifier outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// The 1000 ImageNet classes, parsed on first use.
    pub fn imagenet() -> &'static LabelTable {
        IMAGENET.get_or_init(|| Self::parse(IMAGENET_LABELS))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label file {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// One label per line. Trailing blank lines are dropped, inner ones kept
    /// so indices stay aligned with the model's output.
    pub fn parse(text: &str) -> Self {
        let mut labels: Vec<String> = text.lines().map(|line| line.trim().to_string()).collect();
        while labels.last().is_some_and(|label| label.is_empty()) {
            labels.pop();
        }
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn label_for(&self, index: usize) -> String {
        match self.get(index) {
            Some(label) => label.to_string(),
            None => format!("Class {index}"),
        }
    }
}
