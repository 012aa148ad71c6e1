use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CacheError {
    /// One or more assets could not be fetched during install; the previous
    /// generation stays active.
    #[error("cache seed failed: {0}")]
    SeedFailed(String),

    #[error("asset not cached and not in manifest: {0}")]
    Missing(String),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One entry of the asset manifest: a cache-relative name and the URL it is
/// seeded from.
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub url: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Versioned offline cache of static assets. Each generation is a directory
/// under `root` named by its generation tag; bumping the tag is the only
/// invalidation mechanism. Requests are served cache-first: a cached file
/// wins, otherwise the network is consulted without refreshing the cache.
pub struct AssetCache {
    root: PathBuf,
    generation: String,
    manifest: Vec<Asset>,
    client: reqwest::Client,
}

impl AssetCache {
    pub fn new(root: PathBuf, generation: impl Into<String>, manifest: Vec<Asset>) -> Self {
        Self {
            root,
            generation: generation.into(),
            manifest,
            client: reqwest::Client::new(),
        }
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(&self.generation)
    }

    fn asset_path(&self, name: &str) -> PathBuf {
        self.generation_dir().join(name.trim_start_matches('/'))
    }

    pub fn installed(&self) -> bool {
        self.generation_dir().is_dir()
    }

    /// Seed the current generation: fetch every manifest asset, then commit
    /// them all in one step. Any single failed fetch fails the whole install
    /// and leaves the previous generation untouched.
    pub async fn install(&self) -> Result<(), CacheError> {
        let fetches = self.manifest.iter().map(|asset| {
            let client = self.client.clone();
            async move {
                let resp = client
                    .get(&asset.url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| CacheError::SeedFailed(format!("{}: {}", asset.name, e)))?;
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| CacheError::SeedFailed(format!("{}: {}", asset.name, e)))?;
                Ok::<_, CacheError>((asset.name.clone(), bytes.to_vec()))
            }
        });
        let assets = futures::future::try_join_all(fetches).await?;
        self.seed_from(assets)
    }

    /// Write a fully fetched asset set into the generation directory via a
    /// staging directory, so a partial seed is never observable. Every
    /// manifest entry must be present.
    pub fn seed_from(&self, assets: Vec<(String, Vec<u8>)>) -> Result<(), CacheError> {
        for wanted in &self.manifest {
            if !assets.iter().any(|(name, _)| name == &wanted.name) {
                return Err(CacheError::SeedFailed(format!(
                    "missing asset: {}",
                    wanted.name
                )));
            }
        }

        let staging = self.root.join(format!(".staging-{}", self.generation));
        let result = (|| -> std::io::Result<()> {
            std::fs::create_dir_all(&staging)?;
            for (name, bytes) in &assets {
                let path = staging.join(name.trim_start_matches('/'));
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, bytes)?;
            }
            let target = self.generation_dir();
            if target.exists() {
                std::fs::remove_dir_all(&target)?;
            }
            std::fs::rename(&staging, &target)
        })();

        if result.is_err() {
            if let Err(e) = std::fs::remove_dir_all(&staging) {
                debug!(error = %e, "staging cleanup failed");
            }
        }
        result?;
        info!(generation = %self.generation, assets = assets.len(), "cache generation seeded");
        Ok(())
    }

    /// Delete every generation other than the current one. The current
    /// generation serves requests from this point on, no reload needed.
    /// Returns the names of the generations removed.
    pub fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut removed = Vec::new();
        if !self.root.is_dir() {
            return Ok(removed);
        }
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name != self.generation {
                std::fs::remove_dir_all(entry.path())?;
                info!(generation = %name, "removed stale cache generation");
                removed.push(name);
            }
        }
        Ok(removed)
    }

    /// Serve an asset cache-first: the cached copy if present, otherwise a
    /// network fetch of the manifest URL. A miss does not update the cache.
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.asset_path(name);
        if path.is_file() {
            debug!(asset = name, "cache hit");
            return Ok(std::fs::read(path)?);
        }
        let asset = self
            .manifest
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| CacheError::Missing(name.to_string()))?;
        warn!(asset = name, "cache miss, fetching from network");
        let resp = self
            .client
            .get(&asset.url)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest() -> Vec<Asset> {
        vec![
            Asset::new("index.html", "https://example.invalid/index.html"),
            Asset::new("style.css", "https://example.invalid/style.css"),
        ]
    }

    fn seeded(cache: &AssetCache) {
        cache
            .seed_from(vec![
                ("index.html".to_string(), b"<html>".to_vec()),
                ("style.css".to_string(), b"body{}".to_vec()),
            ])
            .unwrap();
    }

    #[test]
    fn test_seed_commits_generation_atomically() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf(), "v1", manifest());
        assert!(!cache.installed());
        seeded(&cache);
        assert!(cache.installed());
        assert!(dir.path().join("v1/index.html").is_file());
        assert!(dir.path().join("v1/style.css").is_file());
    }

    #[test]
    fn test_seed_fails_on_missing_asset() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf(), "v1", manifest());
        let err = cache.seed_from(vec![("index.html".to_string(), b"<html>".to_vec())]);
        assert!(matches!(err, Err(CacheError::SeedFailed(_))));
        // No partial generation left behind
        assert!(!cache.installed());
    }

    #[test]
    fn test_failed_seed_keeps_previous_generation() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf(), "v1", manifest());
        seeded(&cache);
        let err = cache.seed_from(vec![]);
        assert!(err.is_err());
        assert!(dir.path().join("v1/index.html").is_file());
    }

    #[test]
    fn test_activate_removes_other_generations() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("v1")).unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf(), "v2", manifest());
        seeded(&cache);
        let removed = cache.activate().unwrap();
        assert_eq!(removed, vec!["v1".to_string()]);
        assert!(!dir.path().join("v1").exists());
        assert!(dir.path().join("v2/index.html").is_file());
    }

    #[test]
    fn test_activate_on_empty_root_is_noop() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().join("nothing"), "v1", manifest());
        assert!(cache.activate().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_serves_cached_copy_first() {
        let dir = TempDir::new().unwrap();
        // URLs are unresolvable: a cache hit must never touch the network
        let cache = AssetCache::new(dir.path().to_path_buf(), "v1", manifest());
        seeded(&cache);
        let bytes = cache.fetch("index.html").await.unwrap();
        assert_eq!(bytes, b"<html>");
    }

    #[tokio::test]
    async fn test_fetch_unknown_asset_is_missing() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf(), "v1", manifest());
        seeded(&cache);
        let err = cache.fetch("logo.png").await;
        assert!(matches!(err, Err(CacheError::Missing(_))));
    }
}
