//! Plugin lifecycle, installation and packaging endpoints.

use serde::de::IgnoredAny;
use tracing::info;

use super::types::{FrontendPack, Plugin};
use crate::error::ApiError;
use crate::http::{ApiClient, Download, FormField, RequestBody, RequestOptions, segment};

const PLUGINS: &str = "/platform/plugins";
const JSON_MIME: &str = "application/json";
const METADATA_FILE_NAME: &str = "metadata.json";

/// Lifecycle transitions exposed as `POST /platform/plugins/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginAction {
    Enable,
    Disable,
    Reload,
}

impl PluginAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Reload => "reload",
        }
    }
}

/// `GET /platform/plugins`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn list(client: &ApiClient) -> Result<Vec<Plugin>, ApiError> {
    client.get(PLUGINS, RequestOptions::new()).await
}

/// `POST /platform/plugins/{id}/enable|disable|reload`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn transition(client: &ApiClient, id: &str, action: PluginAction) -> Result<(), ApiError> {
    let path = format!("{PLUGINS}/{}/{}", segment(id), action.as_str());
    client.post::<IgnoredAny>(&path, RequestBody::Empty, RequestOptions::new()).await?;
    info!(plugin = id, action = action.as_str(), "plugin transition accepted");
    Ok(())
}

/// Enable a plugin.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn enable(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    transition(client, id, PluginAction::Enable).await
}

/// Disable a plugin.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn disable(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    transition(client, id, PluginAction::Disable).await
}

/// Reload a plugin from its installed artifact.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn reload(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    transition(client, id, PluginAction::Reload).await
}

/// `DELETE /platform/plugins/{id}`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn uninstall(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    let path = format!("{PLUGINS}/{}", segment(id));
    client.delete::<IgnoredAny>(&path, RequestOptions::new()).await?;
    info!(plugin = id, "plugin uninstalled");
    Ok(())
}

/// `POST /platform/plugins/install` with the artifact as multipart `file`.
/// Returns the server's install summary.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn install(client: &ApiClient, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
    let size = bytes.len();
    let body = RequestBody::Multipart(vec![FormField::file("file", file_name, bytes)]);
    let result: String = client.post(&format!("{PLUGINS}/install"), body, RequestOptions::new()).await?;
    info!(file = file_name, size, "plugin installed");
    Ok(result)
}

/// `POST /platform/plugins/pack/frontend?import=…` with the metadata as a
/// JSON blob and one `files`/`paths` pair per bundle file.
///
/// # Errors
///
/// Any [`ApiError`] from the request, or [`ApiError::Decode`] if the
/// metadata cannot be encoded.
pub async fn pack_frontend(client: &ApiClient, pack: FrontendPack) -> Result<serde_json::Value, ApiError> {
    let metadata = serde_json::to_vec(&pack.metadata).map_err(|e| ApiError::Decode(e.to_string()))?;
    let file_count = pack.files.len();
    let mut fields = vec![FormField::file("metadata", METADATA_FILE_NAME, metadata).with_content_type(JSON_MIME)];
    for file in pack.files {
        fields.push(FormField::file("files", file.file_name, file.bytes));
        fields.push(FormField::text("paths", file.path));
    }
    let options = RequestOptions::new().query("import", pack.import);
    let result = client
        .post(&format!("{PLUGINS}/pack/frontend"), RequestBody::Multipart(fields), options)
        .await?;
    info!(files = file_count, import = pack.import, "frontend bundle packed");
    Ok(result)
}

/// `GET /platform/plugins/pack/download/{fileName}`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn download_pack(client: &ApiClient, file_name: &str) -> Result<Download, ApiError> {
    let path = format!("{PLUGINS}/pack/download/{}", segment(file_name));
    client.download(&path, RequestOptions::new()).await
}

/// `POST /platform/plugins/pack/import?fileName=…&enable=…`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn import_pack(client: &ApiClient, file_name: &str, enable: bool) -> Result<serde_json::Value, ApiError> {
    let options = RequestOptions::new().query("fileName", file_name).query("enable", enable);
    client
        .post(&format!("{PLUGINS}/pack/import"), RequestBody::Empty, options)
        .await
}

/// `GET /platform/plugins/download?pluginId=…[&ext=…]`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn download(client: &ApiClient, plugin_id: &str, ext: Option<&str>) -> Result<Download, ApiError> {
    let mut options = RequestOptions::new().query("pluginId", plugin_id);
    if let Some(ext) = ext.filter(|e| !e.is_empty()) {
        options = options.query("ext", ext);
    }
    client.download(&format!("{PLUGINS}/download"), options).await
}

/// Absolute URL of a plugin's frontend entry, resolved against the backend
/// origin. `None` when the plugin has no frontend.
#[must_use]
pub fn frontend_entry_url(backend_base: &str, plugin: &Plugin) -> Option<String> {
    let entry = plugin.frontend_entry.as_deref()?.trim();
    if entry.is_empty() {
        return None;
    }
    if entry.starts_with("http://") || entry.starts_with("https://") {
        return Some(entry.to_owned());
    }
    let base = backend_base.trim_end_matches('/');
    if entry.starts_with('/') {
        Some(format!("{base}{entry}"))
    } else {
        Some(format!("{base}/{entry}"))
    }
}

#[cfg(test)]
#[path = "plugins_test.rs"]
mod tests;
