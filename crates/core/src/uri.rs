//! URI resolution and path safety.
//!
//! Every identifier is checked for a `/..` segment on its raw text before anything else happens
//! to it. That check is the only traversal defence the store layer relies on, so it must run
//! before a URL is handed to a backend.

use crate::store::UriLike;
use crate::{StoreError, StoreResult};
use url::Url;

/// Rejects any identifier containing a `/..` segment.
pub fn check_traversal(raw: &str) -> StoreResult<()> {
    if raw.contains("/..") {
        return Err(StoreError::InvalidIdentifier(format!(
            "disallowed /.. segment in {raw}"
        )));
    }
    Ok(())
}

/// Resolves an identifier to a URL.
///
/// - a descriptor resolves to its own URI
/// - a string starting with `/` resolves against `root`
/// - anything else must be an absolute URI with its own scheme
pub fn resolve(root: &Url, uri: &UriLike) -> StoreResult<Url> {
    let raw = uri.as_str();
    check_traversal(raw)?;

    if let UriLike::Url(url) = uri {
        return Ok(url.clone());
    }

    if raw.starts_with('/') {
        return Ok(root.join(raw)?);
    }

    Url::parse(raw).map_err(|e| StoreError::InvalidIdentifier(format!("{raw}: {e}")))
}

/// Appends a child token to a base URL.
///
/// The child must start with `./`; the token after the dot is appended to the base path with
/// any trailing slash of the base removed, so `join_child("/a/", "./.meta")` is `/a/.meta`.
pub fn join_child(base: &Url, child: &str) -> StoreResult<Url> {
    if !child.starts_with("./") || child.contains("/..") {
        return Err(StoreError::InvalidChild(child.to_owned()));
    }

    let mut url = base.clone();
    let path = format!("{}{}", base.path().trim_end_matches('/'), &child[1..]);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// URL of the directory holding `url`, ending with `/`.
pub fn container_url(url: &Url) -> Url {
    let mut container = url.clone();
    let trimmed = url.path().trim_end_matches('/');
    let parent = match trimmed.rfind('/') {
        Some(index) => &trimmed[..=index],
        None => "/",
    };
    container.set_path(parent);
    container.set_query(None);
    container.set_fragment(None);
    container
}

/// Last non-empty path segment, percent-decoded.
pub fn file_name(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(
        urlencoding::decode(segment)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| segment.to_owned()),
    )
}
