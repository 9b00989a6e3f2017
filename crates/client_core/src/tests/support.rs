//! Scripted collaborators shared by the session and orchestrator tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Assessment, AssessmentId, AssessmentResult},
    protocol::{AccountSummary, AssessmentMeta},
};
use storage::KeyValueStore;
use tokio::sync::{oneshot, Mutex};

use crate::{
    api::AssessmentApi,
    error::{ClientError, ClientResult},
    upload::UploadFile,
};

pub fn assessment(id: i64, business_name: &str) -> Assessment {
    Assessment {
        id: AssessmentId(id),
        business_name: Some(business_name.to_string()),
        industry: Some("Retail".to_string()),
        locale: Some("en".to_string()),
        created_at: "2024-05-01T09:30:00".to_string(),
        summary: Some(AssessmentResult {
            overall_score: 64.0,
            risk_level: "moderate".to_string(),
            metrics: Vec::new(),
            narrative: "Steady.".to_string(),
            benchmarks: Vec::new(),
        }),
    }
}

pub fn ids(items: &[Assessment]) -> Vec<i64> {
    items.iter().map(|a| a.id.0).collect()
}

/// Fake service. Responses are queued per operation; an empty queue for
/// `list_assessments` yields an empty list, for the others an error.
#[derive(Default)]
pub struct FakeApi {
    bearer: StdMutex<Option<String>>,
    login_results: Mutex<VecDeque<ClientResult<String>>>,
    register_results: Mutex<VecDeque<ClientResult<AccountSummary>>>,
    list_results: Mutex<VecDeque<ClientResult<Vec<Assessment>>>>,
    create_results: Mutex<VecDeque<ClientResult<Assessment>>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    list_started: Mutex<Option<oneshot::Sender<()>>>,
    register_calls: AtomicUsize,
    login_calls: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    pub list_bearers: Mutex<Vec<Option<String>>>,
    pub created_with: Mutex<Vec<(AssessmentMeta, String)>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn push_login(&self, result: ClientResult<String>) {
        self.login_results.lock().await.push_back(result);
    }

    pub async fn push_register(&self, result: ClientResult<AccountSummary>) {
        self.register_results.lock().await.push_back(result);
    }

    pub async fn push_list(&self, result: ClientResult<Vec<Assessment>>) {
        self.list_results.lock().await.push_back(result);
    }

    pub async fn push_create(&self, result: ClientResult<Assessment>) {
        self.create_results.lock().await.push_back(result);
    }

    /// Holds the next `list_assessments` call until the returned sender
    /// fires. The second value resolves once the call has started.
    pub async fn gate_next_list(&self) -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
        let (release_tx, release_rx) = oneshot::channel();
        let (started_tx, started_rx) = oneshot::channel();
        *self.list_gate.lock().await = Some(release_rx);
        *self.list_started.lock().await = Some(started_tx);
        (release_tx, started_rx)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn login_count(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn register_count(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentApi for FakeApi {
    fn set_auth_token(&self, token: Option<&str>) {
        *self.bearer.lock().unwrap_or_else(PoisonError::into_inner) = token.map(str::to_string);
    }

    fn auth_token(&self) -> Option<String> {
        self.bearer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn register(
        &self,
        _email: &str,
        _password: &str,
        _full_name: Option<&str>,
    ) -> ClientResult<AccountSummary> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.register_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(AccountSummary::default()))
    }

    async fn login(&self, _email: &str, _password: &str) -> ClientResult<String> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted login".into())))
    }

    async fn list_assessments(&self) -> ClientResult<Vec<Assessment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_bearers.lock().await.push(self.auth_token());

        if let Some(started) = self.list_started.lock().await.take() {
            let _ = started.send(());
        }
        let gate = self.list_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.list_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_assessment(
        &self,
        meta: &AssessmentMeta,
        file: &UploadFile,
    ) -> ClientResult<Assessment> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.created_with
            .lock()
            .await
            .push((meta.clone(), file.file_name.clone()));
        self.create_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted create".into())))
    }
}

/// Persistence that fails every operation.
pub struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("disk unavailable"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("disk unavailable"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("disk unavailable"))
    }
}
