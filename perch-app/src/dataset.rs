//! The static list of candidate bird pages.
//!
//! Loaded once at startup from a CSV resource and immutable for the
//! process lifetime. The file format is a plain header row plus one URL
//! per line; only the `BIRD URLs` column is consumed.

use anyhow::{Context, Result, bail};
use rand::seq::SliceRandom;
use std::path::Path;

/// Header of the column holding the page URLs.
pub const URL_COLUMN: &str = "BIRD URLs";

#[derive(Debug)]
pub struct SourceDataset {
    urls: Vec<String>,
}

impl SourceDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let dataset = Self::parse(&raw)?;
        tracing::info!(rows = dataset.len(), path = %path.display(), "dataset loaded");
        Ok(dataset)
    }

    pub(crate) fn parse(raw: &str) -> Result<Self> {
        let mut lines = raw.lines();
        let header = lines.next().context("dataset is empty")?;
        let column = header
            .split(',')
            .position(|h| h.trim() == URL_COLUMN)
            .with_context(|| format!("dataset header has no `{URL_COLUMN}` column"))?;

        let mut urls = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let Some(field) = line.split(',').nth(column) else {
                continue;
            };
            let field = field.trim();
            if !field.is_empty() {
                urls.push(field.to_string());
            }
        }
        if urls.is_empty() {
            bail!("dataset has no URL rows");
        }
        Ok(Self { urls })
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Uniform draw over existing rows only. `parse` rejects empty
    /// datasets, so a row always exists.
    pub fn pick_random(&self) -> &str {
        self.urls
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .expect("dataset is never empty")
    }
}
