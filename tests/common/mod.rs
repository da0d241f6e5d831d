#![allow(dead_code)]
use async_trait::async_trait;
use normas_importer::error::{ImporterError, Result};
use normas_importer::runtime::fetcher::Fetcher;
use std::collections::HashMap;
use std::path::Path;

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

pub struct MockFetcher {
    pub fixtures: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
        }
    }

    pub fn add_fixture(&mut self, url: &str, content: &str) {
        self.fixtures.insert(url.to_string(), content.to_string());
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fixtures
            .get(url)
            .cloned()
            .ok_or_else(|| ImporterError::Http {
                status: 404,
                url: url.to_string(),
            })
    }
}
