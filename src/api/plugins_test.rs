use super::*;
use crate::api::types::{PackFile, PluginStatus};
use crate::http::{FormValue, HttpResponse};
use crate::test_helpers::{MockTransport, harness, ok_data, status_response};
use reqwest::Method;
use serde_json::json;

fn plugin_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Demo",
        "version": "1.0.0",
        "status": "ENABLED",
        "frontendEntry": "/plugins/demo/index.js",
        "tags": ["ops"],
    })
}

fn query_value<'a>(request: &'a crate::http::HttpRequest, key: &str) -> Option<&'a str> {
    request.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

// =============================================================================
// lifecycle
// =============================================================================

#[tokio::test]
async fn list_decodes_plugins() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!([plugin_json("demo")])))]));
    let plugins = list(&h.client).await.unwrap();

    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].id, "demo");
    assert_eq!(plugins[0].status, PluginStatus::Enabled);
    assert_eq!(h.transport.requests()[0].url, "http://platform.test/api/platform/plugins");
}

#[tokio::test]
async fn transitions_post_to_action_paths() {
    let h = harness(MockTransport::queue(vec![
        Ok(ok_data(serde_json::Value::Null)),
        Ok(ok_data(serde_json::Value::Null)),
        Ok(ok_data(json!("reloaded"))),
    ]));
    enable(&h.client, "demo").await.unwrap();
    disable(&h.client, "demo").await.unwrap();
    reload(&h.client, "demo").await.unwrap();

    let urls: Vec<String> = h.transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "http://platform.test/api/platform/plugins/demo/enable",
            "http://platform.test/api/platform/plugins/demo/disable",
            "http://platform.test/api/platform/plugins/demo/reload",
        ]
    );
    assert!(h.transport.requests().iter().all(|r| r.method == Method::POST));
}

#[tokio::test]
async fn plugin_ids_are_percent_encoded() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(serde_json::Value::Null))]));
    uninstall(&h.client, "acme/demo plugin").await.unwrap();

    let request = &h.transport.requests()[0];
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.url, "http://platform.test/api/platform/plugins/acme%2Fdemo%20plugin");
}

#[tokio::test]
async fn transition_failure_surfaces_business_message() {
    let body = json!({ "code": 500, "message": "plugin demo failed to start", "data": null });
    let h = harness(MockTransport::queue(vec![Ok(crate::test_helpers::envelope_response(200, &body))]));
    let err = enable(&h.client, "demo").await.unwrap_err();
    assert_eq!(err.to_string(), "plugin demo failed to start");
}

// =============================================================================
// install & packaging
// =============================================================================

#[tokio::test]
async fn install_uploads_file_field() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!("installed demo 1.0.0")))]));
    let summary = install(&h.client, "demo.jar", b"PK\x03\x04".to_vec()).await.unwrap();
    assert_eq!(summary, "installed demo 1.0.0");

    let request = &h.transport.requests()[0];
    assert!(request.url.ends_with("/platform/plugins/install"));
    let RequestBody::Multipart(fields) = &request.body else {
        panic!("expected multipart body, got {:?}", request.body);
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "file");
    assert!(matches!(&fields[0].value, FormValue::File { file_name, .. } if file_name == "demo.jar"));
}

#[tokio::test]
async fn pack_frontend_sends_metadata_files_and_paths() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!({ "fileName": "demo-1.0.0.zip" })))]));
    let pack = FrontendPack {
        metadata: json!({ "id": "demo", "version": "1.0.0" }),
        files: vec![
            PackFile { path: "index.js".into(), file_name: "index.js".into(), bytes: b"export {}".to_vec() },
            PackFile { path: "assets/app.css".into(), file_name: "app.css".into(), bytes: b"body{}".to_vec() },
        ],
        import: true,
    };
    let result = pack_frontend(&h.client, pack).await.unwrap();
    assert_eq!(result["fileName"], "demo-1.0.0.zip");

    let request = &h.transport.requests()[0];
    assert_eq!(query_value(request, "import"), Some("true"));
    let RequestBody::Multipart(fields) = &request.body else {
        panic!("expected multipart body, got {:?}", request.body);
    };
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["metadata", "files", "paths", "files", "paths"]);
    match &fields[0].value {
        FormValue::File { file_name, content_type, bytes } => {
            assert_eq!(file_name, "metadata.json");
            assert_eq!(content_type.as_deref(), Some("application/json"));
            let metadata: serde_json::Value = serde_json::from_slice(bytes).unwrap();
            assert_eq!(metadata["id"], "demo");
        }
        other => panic!("metadata should be a file part, got {other:?}"),
    }
    assert_eq!(fields[4].value, FormValue::Text("assets/app.css".into()));
}

#[tokio::test]
async fn import_pack_passes_query() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!({ "pluginId": "demo" })))]));
    import_pack(&h.client, "demo-1.0.0.zip", false).await.unwrap();

    let request = &h.transport.requests()[0];
    assert!(request.url.ends_with("/platform/plugins/pack/import"));
    assert_eq!(query_value(request, "fileName"), Some("demo-1.0.0.zip"));
    assert_eq!(query_value(request, "enable"), Some("false"));
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let response = HttpResponse {
        status: 200,
        headers: vec![
            ("content-type".into(), "application/java-archive".into()),
            ("content-disposition".into(), "attachment; filename=\"demo.jar\"".into()),
        ],
        body: b"not an envelope".to_vec(),
    };
    let h = harness(MockTransport::queue(vec![Ok(response)]));
    let file = download(&h.client, "demo", Some("jar")).await.unwrap();

    assert_eq!(file.bytes, b"not an envelope");
    assert_eq!(file.file_name.as_deref(), Some("demo.jar"));
    let request = &h.transport.requests()[0];
    assert_eq!(query_value(request, "pluginId"), Some("demo"));
    assert_eq!(query_value(request, "ext"), Some("jar"));
}

#[tokio::test]
async fn download_without_ext_omits_query() {
    let h = harness(MockTransport::queue(vec![Ok(HttpResponse { status: 200, headers: vec![], body: vec![1, 2] })]));
    download(&h.client, "demo", None).await.unwrap();
    assert_eq!(query_value(&h.transport.requests()[0], "ext"), None);
}

#[tokio::test]
async fn download_pack_encodes_file_name() {
    let h = harness(MockTransport::queue(vec![Ok(HttpResponse { status: 200, headers: vec![], body: vec![0] })]));
    download_pack(&h.client, "demo 1.zip").await.unwrap();
    assert!(h.transport.requests()[0].url.ends_with("/platform/plugins/pack/download/demo%201.zip"));
}

#[tokio::test]
async fn missing_pack_is_not_found() {
    let h = harness(MockTransport::queue(vec![Ok(status_response(404))]));
    let err = download_pack(&h.client, "gone.zip").await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

// =============================================================================
// frontend_entry_url
// =============================================================================

fn plugin_with_entry(entry: Option<&str>) -> Plugin {
    let mut plugin: Plugin = serde_json::from_value(plugin_json("demo")).unwrap();
    plugin.frontend_entry = entry.map(ToOwned::to_owned);
    plugin
}

#[test]
fn entry_url_joins_backend_base() {
    let plugin = plugin_with_entry(Some("/plugins/demo/index.js"));
    assert_eq!(
        frontend_entry_url("http://backend:9000/", &plugin).as_deref(),
        Some("http://backend:9000/plugins/demo/index.js")
    );
    assert_eq!(frontend_entry_url("", &plugin).as_deref(), Some("/plugins/demo/index.js"));
}

#[test]
fn entry_url_keeps_absolute_entries() {
    let plugin = plugin_with_entry(Some("https://cdn.example/demo.js"));
    assert_eq!(frontend_entry_url("http://backend:9000", &plugin).as_deref(), Some("https://cdn.example/demo.js"));
}

#[test]
fn entry_url_none_without_frontend() {
    assert_eq!(frontend_entry_url("http://backend:9000", &plugin_with_entry(None)), None);
    assert_eq!(frontend_entry_url("http://backend:9000", &plugin_with_entry(Some("  "))), None);
}
