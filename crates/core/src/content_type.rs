//! Content-type resolution from names.
//!
//! Directories are always Turtle. Files resolve through their extension: configured overrides
//! win, then the `mime_guess` registry, then the configured default.

use crate::config::StoreConfig;
use crate::constants::{CONTAINER_CONTENT_TYPE, RDF_MIME_TYPES};
use crate::uri;
use ldp_types::Descriptor;
use url::Url;

/// Lowercased text after the last `.` of `name`, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, extension) = name.rsplit_once('.')?;
    (!extension.is_empty()).then(|| extension.to_lowercase())
}

/// Content type for a file name, or `None` when nothing is registered for its extension.
pub fn lookup(config: &StoreConfig, name: &str) -> Option<String> {
    let extension = extension_of(name)?;
    config
        .override_types()
        .get(&extension)
        .cloned()
        .or_else(|| mime_guess::from_ext(&extension).first_raw().map(str::to_string))
}

/// Content type for any described resource.
pub fn resolve(config: &StoreConfig, descriptor: &Descriptor) -> String {
    if descriptor.is_directory() {
        return CONTAINER_CONTENT_TYPE.to_string();
    }
    lookup(config, &name_of(&descriptor.uri))
        .unwrap_or_else(|| config.default_content_type().to_string())
}

/// Whether `name` is a metadata or access-control sidecar.
pub fn is_sidecar(config: &StoreConfig, name: &str) -> bool {
    [config.meta_extension(), config.acl_extension()]
        .iter()
        .any(|extension| !extension.is_empty() && name.ends_with(extension))
}

/// Media type without parameters, lowercased.
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn is_rdf(media_type: &str) -> bool {
    let essence = essence(media_type);
    RDF_MIME_TYPES.contains(&essence.as_str())
}

/// Decoded last segment of a resource URI.
pub fn name_of(resource_uri: &str) -> String {
    Url::parse(resource_uri)
        .ok()
        .and_then(|url| uri::file_name(&url))
        .unwrap_or_else(|| {
            resource_uri
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}
