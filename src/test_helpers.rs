//! Shared fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{ApiClient, HttpRequest, HttpResponse, Transport, TransportFailure};
use crate::router::AuthStatusCheck;
use crate::session::{AuthExpiryHandler, MemoryStorage, Navigator, Notice, Notifier, SessionTracker};

pub const TEST_BASE_URL: &str = "http://platform.test/api";
pub const TEST_REDIRECT_DELAY: Duration = Duration::from_millis(20);

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportFailure> + Send + Sync>;

/// Transport that answers from a closure and records every request.
pub struct MockTransport {
    responder: Responder,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportFailure> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) }
    }

    /// Answer requests in order; an exhausted queue answers 404.
    pub fn queue(responses: Vec<Result<HttpResponse, TransportFailure>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::from_fn(move |_| {
            queue
                .lock()
                .expect("queue mutex should lock")
                .pop_front()
                .unwrap_or_else(|| Ok(status_response(404)))
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests mutex should lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests mutex should lock").len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let result = (self.responder)(&request);
        self.requests.lock().expect("requests mutex should lock").push(request);
        // Let concurrently issued requests interleave like real I/O would.
        tokio::task::yield_now().await;
        result
    }
}

pub fn envelope_response(status: u16, envelope: &serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".into(), "application/json".into())],
        body: serde_json::to_vec(envelope).expect("envelope should encode"),
    }
}

pub fn ok_data(data: serde_json::Value) -> HttpResponse {
    envelope_response(200, &serde_json::json!({ "code": 200, "message": "success", "data": data }))
}

pub fn status_response(status: u16) -> HttpResponse {
    HttpResponse { status, headers: vec![], body: vec![] }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notices mutex should lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().expect("notices mutex should lock").push(notice.clone());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().expect("paths mutex should lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.paths.lock().expect("paths mutex should lock").push(path.to_owned());
    }
}

/// Everything a client test may want to inspect.
pub struct Harness {
    pub client: ApiClient,
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStorage>,
    pub session: SessionTracker,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn harness(transport: MockTransport) -> Harness {
    let transport = Arc::new(transport);
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionTracker::new(storage.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let expiry = Arc::new(AuthExpiryHandler::new(
        session.clone(),
        notifier.clone(),
        navigator.clone(),
        TEST_REDIRECT_DELAY,
    ));
    let client = ApiClient::new(TEST_BASE_URL, transport.clone(), session.clone(), expiry);
    Harness { client, transport, storage, session, notifier, navigator }
}

/// Status check answering a fixed result and counting calls.
pub struct FixedStatus {
    result: Result<bool, ApiError>,
    calls: AtomicUsize,
}

impl FixedStatus {
    pub fn new(result: Result<bool, ApiError>) -> Arc<Self> {
        Arc::new(Self { result, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthStatusCheck for FixedStatus {
    async fn check_auth_status(&self) -> Result<bool, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
