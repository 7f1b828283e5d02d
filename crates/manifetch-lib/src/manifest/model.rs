use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One downloadable unit of a manifest topic. Keys other than these are ignored.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Dataset {
    pub url: String,
    /// Display name, defaults to the output filename.
    #[serde(default)]
    pub title: Option<String>,
    /// Hex encoded SHA-256 of the downloaded file.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Shell commands run after the download when post install is enabled.
    #[serde(default)]
    pub post_install: Vec<String>,
}

impl Dataset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            sha256: None,
            post_install: Vec::new(),
        }
    }

    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(fallback)
    }
}

/// Topics in declaration order.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    pub topics: IndexMap<String, Vec<Dataset>>,
}

impl Manifest {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Dataset])> {
        self.topics
            .iter()
            .map(|(topic, datasets)| (topic.as_str(), datasets.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl FromIterator<(String, Vec<Dataset>)> for Manifest {
    fn from_iter<T: IntoIterator<Item = (String, Vec<Dataset>)>>(iter: T) -> Self {
        Self {
            topics: iter.into_iter().collect(),
        }
    }
}
