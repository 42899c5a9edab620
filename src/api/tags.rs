//! Plugin tag endpoints.

use std::collections::HashSet;

use serde::de::IgnoredAny;
use serde_json::json;
use tracing::info;

use super::types::Plugin;
use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody, RequestOptions, segment};

const PLUGINS: &str = "/platform/plugins";

/// Trim, drop empties and duplicates, keeping first-seen order.
#[must_use]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_owned())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Every tag in use across installed plugins.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn all_tags(client: &ApiClient) -> Result<Vec<String>, ApiError> {
    client.get(&format!("{PLUGINS}/tags"), RequestOptions::new()).await
}

/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn plugin_tags(client: &ApiClient, id: &str) -> Result<Vec<String>, ApiError> {
    client.get(&format!("{PLUGINS}/{}/tags", segment(id)), RequestOptions::new()).await
}

/// Attach one tag. Blank tags are rejected locally.
///
/// # Errors
///
/// [`ApiError::Business`] for a blank tag, otherwise any [`ApiError`] from
/// the request.
pub async fn add_tag(client: &ApiClient, id: &str, tag: &str) -> Result<(), ApiError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(blank_tag());
    }
    let body = RequestBody::Json(json!({ "tag": tag }));
    client
        .post::<IgnoredAny>(&format!("{PLUGINS}/{}/tags", segment(id)), body, RequestOptions::new())
        .await?;
    info!(plugin = id, tag, "tag added");
    Ok(())
}

/// Replace a plugin's tags with the normalized set. An empty set clears them.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn set_tags<S: AsRef<str>>(client: &ApiClient, id: &str, tags: &[S]) -> Result<Vec<String>, ApiError> {
    let tags = normalize_tags(tags);
    let body = RequestBody::Json(json!({ "tags": tags }));
    client
        .put::<IgnoredAny>(&format!("{PLUGINS}/{}/tags", segment(id)), body, RequestOptions::new())
        .await?;
    info!(plugin = id, count = tags.len(), "tags replaced");
    Ok(tags)
}

/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn remove_tag(client: &ApiClient, id: &str, tag: &str) -> Result<(), ApiError> {
    let path = format!("{PLUGINS}/{}/tags/{}", segment(id), segment(tag.trim()));
    client.delete::<IgnoredAny>(&path, RequestOptions::new()).await?;
    info!(plugin = id, tag, "tag removed");
    Ok(())
}

/// Plugins carrying `tag`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn search_by_tag(client: &ApiClient, tag: &str) -> Result<Vec<Plugin>, ApiError> {
    let options = RequestOptions::new().query("tag", tag.trim());
    client.get(&format!("{PLUGINS}/tags/search"), options).await
}

/// Plugins carrying every one of `tags`. An empty set matches nothing and
/// skips the request.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn search_by_tags<S: AsRef<str>>(client: &ApiClient, tags: &[S]) -> Result<Vec<Plugin>, ApiError> {
    let tags = normalize_tags(tags);
    if tags.is_empty() {
        return Ok(Vec::new());
    }
    let options = RequestOptions::new().query("tags", tags.join(","));
    client.get(&format!("{PLUGINS}/tags/search-all"), options).await
}

fn blank_tag() -> ApiError {
    ApiError::Business { code: 400, message: "tag must not be blank".to_owned() }
}

#[cfg(test)]
#[path = "tags_test.rs"]
mod tests;
