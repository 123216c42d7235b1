//! File-based catalog loading
//!
//! Loads the endpoint catalog extracted from the target API's interface description

use crate::models::catalog::EndpointCandidate;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Endpoint catalog loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Human-readable API title (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Operations exposed by the target API
    #[serde(default)]
    pub endpoints: Vec<EndpointCandidate>,
}

impl CatalogFile {
    /// Load catalog from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading endpoint catalog from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;

        let catalog: CatalogFile = serde_json::from_str(&content)
            .with_context(|| "Failed to parse catalog JSON")?;

        catalog.validate()?;

        debug!("Loaded {} endpoints", catalog.endpoints.len());
        Ok(catalog)
    }

    /// Load catalog from default locations
    /// Searches in order:
    /// 1. $CATALOG_PATH
    /// 2. ~/.config/aiapiagent/catalog.json
    /// 3. ./catalog.json
    ///
    /// Returns an empty catalog when no file is found; the agent then falls back
    /// to REST conventions.
    pub fn load_default() -> Result<Self> {
        match Self::find_default_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No endpoint catalog found, using REST conventions only");
                Ok(Self::default())
            }
        }
    }

    fn find_default_path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var("CATALOG_PATH") {
            return Some(PathBuf::from(explicit));
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("aiapiagent").join("catalog.json");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        let local_path = PathBuf::from("catalog.json");
        if local_path.exists() {
            return Some(local_path);
        }

        None
    }

    /// Validate catalog
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for endpoint in &self.endpoints {
            if !endpoint.path_template.starts_with('/') {
                anyhow::bail!("Endpoint path must start with '/': {}", endpoint.path_template);
            }

            if endpoint.path_template.matches('{').count() != endpoint.path_template.matches('}').count() {
                anyhow::bail!("Unbalanced placeholder in endpoint path: {}", endpoint.path_template);
            }

            if !seen.insert((endpoint.method, endpoint.path_template.clone())) {
                anyhow::bail!(
                    "Duplicate endpoint: {} {}",
                    endpoint.method,
                    endpoint.path_template
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::HttpMethod;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_catalog() -> String {
        r#"{
            "title": "Clickone Shop API",
            "endpoints": [
                {
                    "method": "POST",
                    "path": "/api/categories",
                    "summary": "Create a category (Admin only)",
                    "requiredParams": ["name", "slug"],
                    "optionalParams": ["description", "isActive", "sortOrder"],
                    "authRequired": true
                },
                {
                    "method": "GET",
                    "path": "/api/categories/{id}",
                    "summary": "Get a category by ID"
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn test_load_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", create_test_catalog()).unwrap();

        let catalog = CatalogFile::load(file.path()).unwrap();
        assert_eq!(catalog.title.as_deref(), Some("Clickone Shop API"));
        assert_eq!(catalog.endpoints.len(), 2);
        assert_eq!(catalog.endpoints[0].method, HttpMethod::Post);
        assert!(catalog.endpoints[0].auth_required);
        assert_eq!(catalog.endpoints[1].path_params(), vec!["id".to_string()]);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"endpoints": [{{"method": "GET", "path": "api/categories"}}]}}"#).unwrap();

        assert!(CatalogFile::load(file.path()).is_err());
    }

    #[test]
    fn test_duplicate_endpoint_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"endpoints": [{{"method": "GET", "path": "/api/orders"}}, {{"method": "GET", "path": "/api/orders"}}]}}"#
        )
        .unwrap();

        assert!(CatalogFile::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(CatalogFile::load(Path::new("/nonexistent/catalog.json")).is_err());
    }
}
