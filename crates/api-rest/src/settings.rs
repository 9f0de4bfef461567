//! Server settings read from the process environment.

use anyhow::Context;
use ldp_core::config::{
    flag_from_env_value, index_file_names_from_env_value, override_types_from_env_value,
};
use ldp_core::{StoreConfig, StoreDecorator};
use std::path::PathBuf;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ROOT_URL: &str = "http://localhost:3000/";
pub const DEFAULT_DATA_DIR: &str = "ldp_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Filesystem,
    Memory,
}

impl StorageKind {
    fn from_env_value(value: Option<String>) -> anyhow::Result<Self> {
        match value.as_deref().map(str::trim) {
            None | Some("") | Some("fs") | Some("filesystem") => Ok(Self::Filesystem),
            Some("memory") => Ok(Self::Memory),
            Some(other) => anyhow::bail!("LDP_STORAGE must be fs or memory, got {other:?}"),
        }
    }
}

/// Everything a server binary needs to build its store and bind.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: String,
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub config: StoreConfig,
}

impl ServerSettings {
    /// Read settings from `LDP_*` environment variables.
    ///
    /// # Environment Variables
    /// - `LDP_REST_ADDR`: server address (default: "0.0.0.0:3000")
    /// - `LDP_ROOT_URL`: public root URL of the store (default: "http://localhost:3000/")
    /// - `LDP_DATA_DIR`: data directory for the filesystem store (default: "ldp_data")
    /// - `LDP_STORAGE`: `fs` or `memory` (default: "fs")
    /// - `LDP_INCLUDE_HOST`, `LDP_LIVE`: boolean flags
    /// - `LDP_DEFAULT_CONTENT_TYPE`, `LDP_OVERRIDE_TYPES`, `LDP_INDEX_FILE_NAMES`,
    ///   `LDP_META_EXTENSION`, `LDP_ACL_EXTENSION`: content-type and sidecar settings
    ///
    /// # Errors
    /// Returns an error if any value is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerSettings::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("LDP_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let data_dir = PathBuf::from(lookup("LDP_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
        let storage = StorageKind::from_env_value(lookup("LDP_STORAGE"))?;
        let root_url = lookup("LDP_ROOT_URL").unwrap_or_else(|| DEFAULT_ROOT_URL.into());

        let mut config = StoreConfig::new(&root_url)?
            .with_include_host(flag_from_env_value("LDP_INCLUDE_HOST", lookup("LDP_INCLUDE_HOST"))?)
            .with_live(flag_from_env_value("LDP_LIVE", lookup("LDP_LIVE"))?)
            .with_override_types(override_types_from_env_value(lookup("LDP_OVERRIDE_TYPES"))?)
            .with_index_file_names(index_file_names_from_env_value(lookup("LDP_INDEX_FILE_NAMES")));
        if let Some(content_type) = lookup("LDP_DEFAULT_CONTENT_TYPE") {
            config = config.with_default_content_type(content_type);
        }
        if let Some(extension) = lookup("LDP_META_EXTENSION") {
            config = config.with_meta_extension(extension);
        }
        if let Some(extension) = lookup("LDP_ACL_EXTENSION") {
            config = config.with_acl_extension(extension);
        }

        Ok(Self {
            addr,
            data_dir,
            storage,
            config,
        })
    }

    /// Build the configured store.
    ///
    /// # Errors
    /// Returns an error if the filesystem data directory does not exist.
    pub fn build_store(&self) -> anyhow::Result<StoreDecorator> {
        match self.storage {
            StorageKind::Memory => Ok(StoreDecorator::in_memory(self.config.clone())),
            StorageKind::Filesystem => {
                if !self.data_dir.exists() {
                    anyhow::bail!("Data directory does not exist: {}", self.data_dir.display());
                }
                StoreDecorator::on_filesystem(&self.data_dir, self.config.clone())
                    .with_context(|| format!("opening {}", self.data_dir.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = ServerSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.addr, "0.0.0.0:3000");
        assert_eq!(settings.data_dir, PathBuf::from("ldp_data"));
        assert_eq!(settings.storage, StorageKind::Filesystem);
        assert_eq!(settings.config.root_url().as_str(), "http://localhost:3000/");
        assert!(!settings.config.live());
    }

    #[test]
    fn reads_every_variable() {
        let settings = ServerSettings::from_lookup(lookup_from(&[
            ("LDP_REST_ADDR", "127.0.0.1:8080"),
            ("LDP_ROOT_URL", "https://pod.example/"),
            ("LDP_STORAGE", "memory"),
            ("LDP_INCLUDE_HOST", "true"),
            ("LDP_LIVE", "1"),
            ("LDP_DEFAULT_CONTENT_TYPE", "text/plain"),
            ("LDP_OVERRIDE_TYPES", "md=text/markdown"),
            ("LDP_INDEX_FILE_NAMES", "index.html,index.ttl"),
            ("LDP_META_EXTENSION", ".m"),
            ("LDP_ACL_EXTENSION", ".a"),
        ]))
        .unwrap();

        assert_eq!(settings.addr, "127.0.0.1:8080");
        assert_eq!(settings.storage, StorageKind::Memory);
        assert!(settings.config.include_host());
        assert!(settings.config.live());
        assert_eq!(settings.config.default_content_type(), "text/plain");
        assert_eq!(settings.config.override_types()["md"], "text/markdown");
        assert_eq!(settings.config.index_file_names(), ["index.html", "index.ttl"]);
        assert_eq!(settings.config.meta_extension(), ".m");
        assert_eq!(settings.config.acl_extension(), ".a");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerSettings::from_lookup(lookup_from(&[("LDP_STORAGE", "s3")])).is_err());
        assert!(ServerSettings::from_lookup(lookup_from(&[("LDP_LIVE", "sometimes")])).is_err());
        assert!(ServerSettings::from_lookup(lookup_from(&[("LDP_ROOT_URL", "/relative")])).is_err());
    }

    #[test]
    fn filesystem_store_requires_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let settings = ServerSettings::from_lookup(lookup_from(&[(
            "LDP_DATA_DIR",
            missing.to_str().unwrap(),
        )]))
        .unwrap();
        assert!(settings.build_store().is_err());

        let present = ServerSettings::from_lookup(lookup_from(&[(
            "LDP_DATA_DIR",
            dir.path().to_str().unwrap(),
        )]))
        .unwrap();
        assert!(present.build_store().is_ok());
    }
}
