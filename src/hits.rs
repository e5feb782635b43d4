use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;

/// One matched file and the display lines found in it.
///
/// Lines are keyed by their own text, so two identical lines in the same
/// file collapse into a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub repo: String,
    pub path: String,
    pub lines: BTreeMap<String, String>,
}

impl Hit {
    fn new(repo: &str, path: &str) -> Self {
        Hit {
            repo: repo.to_string(),
            path: path.to_string(),
            lines: BTreeMap::new(),
        }
    }
}

/// Hits accumulated across pages, at most one per (repo, path), in the
/// order the pairs were first seen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    hits: Vec<Hit>,
    #[serde(skip)]
    index: HashMap<(String, String), usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `(repo, path)` if it is new, then store `line_text` under
    /// `line_key`. An empty key only registers the file.
    pub fn add_hit(&mut self, repo: &str, path: &str, line_key: &str, line_text: &str) {
        let hit = self.entry(repo, path);
        if !line_key.is_empty() {
            hit.lines.insert(line_key.to_string(), line_text.to_string());
        }
    }

    /// Union `other` into `self`. Files keep their first-seen position; lines
    /// from both sides survive.
    pub fn merge(&mut self, other: ResultSet) {
        for hit in other.hits {
            let target = self.entry(&hit.repo, &hit.path);
            target.lines.extend(hit.lines);
        }
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn get(&self, repo: &str, path: &str) -> Option<&Hit> {
        self.index
            .get(&(repo.to_string(), path.to_string()))
            .map(|&i| &self.hits[i])
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Total number of stored lines over all files.
    pub fn line_count(&self) -> usize {
        self.hits.iter().map(|h| h.lines.len()).sum()
    }

    /// Encode as `{"hits":[{"repo":..,"path":..,"lines":{..}}]}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn entry(&mut self, repo: &str, path: &str) -> &mut Hit {
        let key = (repo.to_string(), path.to_string());
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.hits.push(Hit::new(repo, path));
                let i = self.hits.len() - 1;
                self.index.insert(key, i);
                i
            }
        };
        &mut self.hits[i]
    }
}
