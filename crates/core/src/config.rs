//! Store configuration.
//!
//! [`StoreConfig`] is resolved once at process startup and then shared, read-only, by every
//! layer of a store chain. Nothing in this module reads process-wide environment variables;
//! the `*_from_env_value` helpers only parse values the binary has already read.

use crate::constants::{
    DEFAULT_ACL_EXTENSION, DEFAULT_CONTENT_TYPE, DEFAULT_META_EXTENSION, DEFAULT_OVERRIDE_TYPES,
};
use crate::{StoreError, StoreResult};
use std::collections::HashMap;
use url::Url;

/// Immutable store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    root_url: Url,
    include_host: bool,
    default_content_type: String,
    override_types: HashMap<String, String>,
    index_file_names: Vec<String>,
    live: bool,
    meta_extension: String,
    acl_extension: String,
}

impl StoreConfig {
    /// Create a new `StoreConfig` with default settings for everything but the root URL.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidRootUrl` if `root_url` is not an absolute URL.
    pub fn new(root_url: &str) -> StoreResult<Self> {
        let root_url = Url::parse(root_url.trim())
            .map_err(|e| StoreError::InvalidRootUrl(format!("{root_url}: {e}")))?;
        if root_url.cannot_be_a_base() {
            return Err(StoreError::InvalidRootUrl(format!(
                "{root_url} cannot be used as a base"
            )));
        }

        Ok(Self {
            root_url,
            include_host: false,
            default_content_type: DEFAULT_CONTENT_TYPE.into(),
            override_types: default_override_types(),
            index_file_names: Vec::new(),
            live: false,
            meta_extension: DEFAULT_META_EXTENSION.into(),
            acl_extension: DEFAULT_ACL_EXTENSION.into(),
        })
    }

    pub fn with_include_host(mut self, include_host: bool) -> Self {
        self.include_host = include_host;
        self
    }

    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Merge extension → content type overrides over the defaults (`acl`, `meta`).
    ///
    /// Extensions are matched case-insensitively and without their leading dot.
    pub fn with_override_types<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (extension, content_type) in overrides {
            let extension = extension.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !extension.is_empty() {
                self.override_types.insert(extension, content_type.into());
            }
        }
        self
    }

    /// Replace the index file names. Empty entries are dropped.
    pub fn with_index_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_file_names = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| !name.trim().is_empty())
            .collect();
        self
    }

    /// Append a single index file name.
    pub fn with_index_file_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.index_file_names.push(name);
        }
        self
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn with_meta_extension(mut self, extension: impl Into<String>) -> Self {
        self.meta_extension = extension.into();
        self
    }

    pub fn with_acl_extension(mut self, extension: impl Into<String>) -> Self {
        self.acl_extension = extension.into();
        self
    }

    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    pub fn include_host(&self) -> bool {
        self.include_host
    }

    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    pub fn override_types(&self) -> &HashMap<String, String> {
        &self.override_types
    }

    /// Candidate default-document names for a directory. Advisory; retrieval does not use them.
    pub fn index_file_names(&self) -> &[String] {
        &self.index_file_names
    }

    pub fn live(&self) -> bool {
        self.live
    }

    pub fn meta_extension(&self) -> &str {
        &self.meta_extension
    }

    pub fn acl_extension(&self) -> &str {
        &self.acl_extension
    }
}

fn default_override_types() -> HashMap<String, String> {
    DEFAULT_OVERRIDE_TYPES
        .iter()
        .map(|(extension, content_type)| (extension.to_string(), content_type.to_string()))
        .collect()
}

/// Parse a boolean flag from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `false`.
pub fn flag_from_env_value(name: &str, value: Option<String>) -> StoreResult<bool> {
    let value = value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(StoreError::InvalidConfig(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}

/// Parse `ext=type` pairs separated by commas, e.g. `md=text/markdown,jsonld=application/ld+json`.
pub fn override_types_from_env_value(value: Option<String>) -> StoreResult<Vec<(String, String)>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((extension, content_type))
                if !extension.trim().is_empty() && content_type.contains('/') =>
            {
                Ok((extension.trim().to_string(), content_type.trim().to_string()))
            }
            _ => Err(StoreError::InvalidConfig(format!(
                "override type {pair:?} must look like ext=type/subtype"
            ))),
        })
        .collect()
}

/// Parse comma-separated index file names, dropping empty entries.
pub fn index_file_names_from_env_value(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
