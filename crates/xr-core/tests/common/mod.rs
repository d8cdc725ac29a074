#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use xr_types::ports::http::{HttpClient, HttpFuture, HttpMethod, HttpRequest, HttpResponse};
use xr_types::CoreError;

/// In-memory `HttpClient` that replays canned answers and records every
/// request it sees.
#[derive(Clone, Default)]
pub struct FakeHttp {
    answers: Arc<Mutex<VecDeque<Result<HttpResponse, CoreError>>>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.answers.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }));
        self
    }

    pub fn fail(self, err: CoreError) -> Self {
        self.answers.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn shared(&self) -> Arc<dyn HttpClient> {
        Arc::new(self.clone())
    }
}

impl HttpClient for FakeHttp {
    fn execute(&self, req: HttpRequest) -> HttpFuture<'_> {
        self.seen.lock().unwrap().push(req);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::io("no canned answer left")));
        Box::pin(async move { answer })
    }
}
