//! Batch anchoring workflow
//!
//! Create a batch from a CSV, upload the file, then poll the factory until the
//! backend reports `completed`, `failed` or `anchor_failed`. Polling is owned
//! by a [`CancellationToken`]; cancelling it (or dropping the workflow) stops
//! the loop at the next await point.

use crate::csv::{columns, parse_csv};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use voketag_config::PollingSettings;
use voketag_core::{
    BatchCreateRequest, BatchCreateResponse, BatchStatus, BatchStatusResponse, Error, Result,
};
use voketag_utils::tracing::batch_span;

/// Factory calls the workflow needs. Implemented by the HTTP client and by
/// in-memory fakes in tests.
#[async_trait]
pub trait BatchBackend: Send + Sync {
    async fn create_batch(&self, request: &BatchCreateRequest) -> Result<BatchCreateResponse>;

    async fn upload_csv(&self, batch_id: &str, file_name: &str, content: Vec<u8>) -> Result<()>;

    async fn batch_status(&self, batch_id: &str) -> Result<BatchStatusResponse>;

    async fn retry_batch(&self, batch_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Uploading,
    Processing {
        batch_id: String,
    },
    Success {
        batch_id: String,
        merkle_root: Option<String>,
        blockchain_tx: Option<String>,
    },
    /// Backend reported `failed` or `anchor_failed`; a retry is possible
    Failed {
        batch_id: String,
        error: String,
    },
    Error {
        message: String,
    },
}

impl WorkflowState {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowState::Success { .. })
    }
}

/// How a polling run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(BatchStatusResponse),
    Failed(BatchStatusResponse),
    TimedOut { attempts: u32 },
    Cancelled,
    /// A status read failed in a way another read will not fix
    Aborted { status: Option<u16>, message: String },
}

impl PollOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }

    /// Turn anything but `Completed` into an error
    pub fn into_result(self, batch_id: &str, settings: &PollingSettings) -> Result<BatchStatusResponse> {
        match self {
            PollOutcome::Completed(status) => Ok(status),
            PollOutcome::Failed(status) => Err(Error::batch_failed(
                batch_id,
                status.error.unwrap_or_else(|| "Desconhecido".to_string()),
            )),
            PollOutcome::TimedOut { .. } => Err(Error::timeout("batch status polling", settings.budget())),
            PollOutcome::Cancelled => Err(Error::cancelled("batch status polling")),
            PollOutcome::Aborted { status: Some(401), .. } => Err(Error::SessionExpired),
            PollOutcome::Aborted {
                status: Some(status),
                message,
            } => Err(Error::api(status, message)),
            PollOutcome::Aborted { status: None, message } => Err(Error::batch_failed(batch_id, message)),
        }
    }
}

/// Timestamped status log line, rendered as `HH:MM:SS - message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Live notifications for front ends that render the run as it happens
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Log(StatusLine),
    Progress(u8),
    State(WorkflowState),
}

pub struct AnchorWorkflow<B: ?Sized> {
    backend: Arc<B>,
    settings: PollingSettings,
    cancel: CancellationToken,
    state: WorkflowState,
    progress: u8,
    log: Vec<StatusLine>,
    events: Option<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl<B: BatchBackend + ?Sized> AnchorWorkflow<B> {
    pub fn new(backend: Arc<B>, settings: PollingSettings) -> Self {
        Self {
            backend,
            settings,
            cancel: CancellationToken::new(),
            state: WorkflowState::Idle,
            progress: 0,
            log: Vec::new(),
            events: None,
        }
    }

    /// Forward every log line, progress change and transition to `sender`
    #[must_use]
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Token that stops polling when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// 0..=100
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn status_log(&self) -> &[StatusLine] {
        &self.log
    }

    /// Create the batch and upload the CSV without waiting for processing.
    ///
    /// Upload failures are logged and do not abort the run; the backend may
    /// still process the batch from its metadata.
    pub async fn submit(&mut self, file_name: &str, content: &str) -> Result<BatchCreateResponse> {
        let rows = parse_csv(content);
        if rows.is_empty() {
            return Err(Error::validation("csv", "arquivo sem linhas de dados"));
        }

        self.set_state(WorkflowState::Uploading);
        self.push_log("Iniciando registro...");

        let request = BatchCreateRequest {
            product_count: rows.len() as u64,
            product_name: Some(file_name.to_string()),
            category: None,
            metadata: Some(json!({
                "source": "csv",
                "columns": columns(&rows),
                "metadata": "anchor",
            })),
        };

        let created = match self.backend.create_batch(&request).await {
            Ok(created) => created,
            Err(e) => {
                self.push_log(format!("Erro: {e}"));
                self.set_state(WorkflowState::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.push_log(format!("Lote criado: {}", created.batch_id));
        self.push_log(format!("Job: {}", created.job_id));
        self.push_log("Rede de validação: principal");

        self.push_log("Enviando CSV...");
        match self
            .backend
            .upload_csv(&created.batch_id, file_name, content.as_bytes().to_vec())
            .await
        {
            Ok(()) => self.push_log("CSV enviado. Processando..."),
            Err(e) => {
                tracing::warn!(batch_id = %created.batch_id, error = %e, "CSV upload failed");
                self.push_log(format!("Erro no upload: {e}"));
            }
        }

        self.set_state(WorkflowState::Processing {
            batch_id: created.batch_id.clone(),
        });
        Ok(created)
    }

    /// Submit, then poll until the batch settles
    pub async fn anchor(&mut self, file_name: &str, content: &str) -> Result<(BatchCreateResponse, PollOutcome)> {
        let created = self.submit(file_name, content).await?;
        let outcome = self.poll(&created.batch_id).await;
        Ok((created, outcome))
    }

    /// Ask the backend to reprocess a failed batch, then poll again
    pub async fn retry(&mut self, batch_id: &str) -> Result<PollOutcome> {
        self.push_log(format!("Reprocessando lote {batch_id}"));
        if let Err(e) = self.backend.retry_batch(batch_id).await {
            self.push_log(format!("Erro: {e}"));
            self.set_state(WorkflowState::Error {
                message: e.to_string(),
            });
            return Err(e);
        }
        self.set_state(WorkflowState::Processing {
            batch_id: batch_id.to_string(),
        });
        Ok(self.poll(batch_id).await)
    }

    /// Poll the batch status until it is terminal, the attempt cap is hit, or
    /// the workflow is cancelled.
    ///
    /// Only successful non-terminal reads count as attempts. A transient read
    /// failure waits `error_backoff` and tries again; any other failure ends
    /// polling with [`PollOutcome::Aborted`].
    pub async fn poll(&mut self, batch_id: &str) -> PollOutcome {
        let span = batch_span(batch_id);
        self.poll_loop(batch_id).instrument(span).await
    }

    async fn poll_loop(&mut self, batch_id: &str) -> PollOutcome {
        let cancel = self.cancel.clone();
        let backend = Arc::clone(&self.backend);
        let mut attempts: u32 = 0;
        self.set_progress(10);

        loop {
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => return self.cancelled(),
                read = backend.batch_status(batch_id) => read,
            };

            let delay = match read {
                Ok(status) => {
                    self.push_log(format!("Status: {}", status.status));
                    self.set_progress((10 + attempts.saturating_mul(5)).min(90) as u8);

                    if status.status == BatchStatus::Completed {
                        return self.completed(batch_id, status);
                    }
                    if status.status.is_failure() {
                        return self.failed(batch_id, status);
                    }

                    attempts += 1;
                    if attempts >= self.settings.max_attempts {
                        tracing::warn!(attempts, "batch still not settled, giving up");
                        self.push_log("Tempo esgotado aguardando processamento");
                        self.set_state(WorkflowState::Error {
                            message: "timed out".to_string(),
                        });
                        return PollOutcome::TimedOut { attempts };
                    }
                    tracing::debug!(attempts, status = %status.status, "batch not settled yet");
                    self.settings.interval
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(error = %e, "batch status read failed");
                    self.push_log(format!("Erro ao consultar status: {e}"));
                    self.settings.error_backoff
                }
                Err(e) => return self.aborted(e),
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => return self.cancelled(),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn aborted(&mut self, error: Error) -> PollOutcome {
        let message = error.to_string();
        tracing::error!(error = %message, "batch status unavailable, stopping");
        self.push_log(format!("Erro ao consultar status: {message}"));
        self.set_state(WorkflowState::Error {
            message: message.clone(),
        });
        PollOutcome::Aborted {
            status: error.status(),
            message,
        }
    }

    fn completed(&mut self, batch_id: &str, status: BatchStatusResponse) -> PollOutcome {
        self.set_progress(100);
        self.push_log(format!(
            "Registro concluído. Chave de integridade: {}",
            status.merkle_root.as_deref().unwrap_or("N/A")
        ));
        self.push_log(format!("Timestamp UTC: {}", Utc::now().to_rfc3339()));
        tracing::info!(merkle_root = ?status.merkle_root, "batch anchored");
        self.set_state(WorkflowState::Success {
            batch_id: batch_id.to_string(),
            merkle_root: status.merkle_root.clone(),
            blockchain_tx: status.blockchain_tx.clone(),
        });
        PollOutcome::Completed(status)
    }

    fn failed(&mut self, batch_id: &str, status: BatchStatusResponse) -> PollOutcome {
        let error = status
            .error
            .clone()
            .unwrap_or_else(|| "Desconhecido".to_string());
        self.push_log(format!("Falha: {error}"));
        tracing::warn!(status = %status.status, %error, "batch failed");
        self.set_state(WorkflowState::Failed {
            batch_id: batch_id.to_string(),
            error,
        });
        PollOutcome::Failed(status)
    }

    fn cancelled(&mut self) -> PollOutcome {
        self.push_log("Acompanhamento cancelado");
        self.set_state(WorkflowState::Error {
            message: "cancelled".to_string(),
        });
        PollOutcome::Cancelled
    }

    fn push_log(&mut self, message: impl Into<String>) {
        let line = StatusLine {
            at: Local::now(),
            message: message.into(),
        };
        tracing::debug!("{}", line.message);
        self.emit(WorkflowEvent::Log(line.clone()));
        self.log.push(line);
    }

    fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
        self.emit(WorkflowEvent::Progress(progress));
    }

    fn set_state(&mut self, state: WorkflowState) {
        self.emit(WorkflowEvent::State(state.clone()));
        self.state = state;
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(events) = &self.events {
            // receiver gone means nobody is watching
            let _ = events.send(event);
        }
    }
}

impl<B: ?Sized> Drop for AnchorWorkflow<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays scripted status reads; the last entry repeats forever
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<BatchStatus>>>,
        status_calls: AtomicU32,
        retry_calls: AtomicU32,
        fail_upload: bool,
        created: Mutex<Option<BatchCreateRequest>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<BatchStatus>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                status_calls: AtomicU32::new(0),
                retry_calls: AtomicU32::new(0),
                fail_upload: false,
                created: Mutex::new(None),
            })
        }

        fn calls(&self) -> u32 {
            self.status_calls.load(Ordering::SeqCst)
        }
    }

    fn status_response(status: BatchStatus) -> BatchStatusResponse {
        BatchStatusResponse {
            batch_id: "b-1".into(),
            status,
            product_count: 2,
            created_at: None,
            processing_completed_at: None,
            anchored_at: None,
            blockchain_tx: (status == BatchStatus::Completed).then(|| "0xabc".to_string()),
            merkle_root: (status == BatchStatus::Completed).then(|| "root123".to_string()),
            error: status.is_failure().then(|| "rpc down".to_string()),
            celery_task_id: None,
        }
    }

    #[async_trait]
    impl BatchBackend for ScriptedBackend {
        async fn create_batch(&self, request: &BatchCreateRequest) -> Result<BatchCreateResponse> {
            *self.created.lock().unwrap() = Some(request.clone());
            Ok(BatchCreateResponse {
                batch_id: "b-1".into(),
                job_id: "j-1".into(),
                status: BatchStatus::Pending,
                product_count: request.product_count,
                estimated_completion: None,
                message: None,
            })
        }

        async fn upload_csv(&self, _batch_id: &str, _file_name: &str, _content: Vec<u8>) -> Result<()> {
            if self.fail_upload {
                Err(Error::api(500, "upload broke"))
            } else {
                Ok(())
            }
        }

        async fn batch_status(&self, _batch_id: &str) -> Result<BatchStatusResponse> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                match script.front().unwrap() {
                    Ok(s) => Ok(*s),
                    Err(_) => Err(Error::network("status", "down")),
                }
            };
            next.map(status_response)
        }

        async fn retry_batch(&self, _batch_id: &str) -> Result<()> {
            self.retry_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings(max_attempts: u32) -> PollingSettings {
        PollingSettings {
            max_attempts,
            ..PollingSettings::default()
        }
    }

    const CSV: &str = "serial_number,product_code\nSN1,P1\nSN2,P2\n";

    #[tokio::test(start_paused = true)]
    async fn test_completed_stops_polling_with_success() {
        let backend = ScriptedBackend::new(vec![
            Ok(BatchStatus::Pending),
            Ok(BatchStatus::Processing),
            Ok(BatchStatus::Completed),
        ]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let start = Instant::now();
        let outcome = workflow.poll("b-1").await;

        assert!(outcome.is_success());
        assert_eq!(backend.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert_eq!(workflow.progress(), 100);
        assert_eq!(
            workflow.state(),
            &WorkflowState::Success {
                batch_id: "b-1".into(),
                merkle_root: Some("root123".into()),
                blockchain_tx: Some("0xabc".into()),
            }
        );
        assert!(workflow
            .status_log()
            .iter()
            .any(|l| l.message == "Registro concluído. Chave de integridade: root123"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_stops_polling_without_success() {
        for terminal in [BatchStatus::Failed, BatchStatus::AnchorFailed] {
            let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Processing), Ok(terminal)]);
            let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

            let outcome = workflow.poll("b-1").await;

            assert!(!outcome.is_success());
            assert!(matches!(outcome, PollOutcome::Failed(_)));
            assert_eq!(backend.calls(), 2);
            assert!(!workflow.state().is_success());
            assert_eq!(
                workflow.state(),
                &WorkflowState::Failed {
                    batch_id: "b-1".into(),
                    error: "rpc down".into()
                }
            );
            assert!(matches!(
                outcome.into_result("b-1", &settings(120)),
                Err(Error::BatchFailed { .. })
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_cap_times_out() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Processing)]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(4));

        let outcome = workflow.poll("b-1").await;

        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 4 });
        assert_eq!(backend.calls(), 4);
        // 10, 15, 20, 25
        assert_eq!(workflow.progress(), 25);
        assert_eq!(
            workflow.state(),
            &WorkflowState::Error {
                message: "timed out".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_capped_at_ninety() {
        let mut script: Vec<_> = (0..20).map(|_| Ok(BatchStatus::Processing)).collect();
        script.push(Ok(BatchStatus::Failed));
        let backend = ScriptedBackend::new(script);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workflow = AnchorWorkflow::new(backend, settings(120)).with_events(tx);

        workflow.poll("b-1").await;
        drop(workflow);

        let mut max_progress = 0;
        while let Some(event) = rx.recv().await {
            if let WorkflowEvent::Progress(p) = event {
                max_progress = max_progress.max(p);
            }
        }
        assert_eq!(max_progress, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_backs_off_without_counting() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::network("status", "down")),
            Ok(BatchStatus::Completed),
        ]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(1));

        let start = Instant::now();
        let outcome = workflow.poll("b-1").await;

        assert!(outcome.is_success());
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert!(workflow.status_log()[0]
            .message
            .starts_with("Erro ao consultar status:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_stops_polling_after_one_read() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::SessionExpired),
            Ok(BatchStatus::Pending),
        ]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let outcome = tokio::time::timeout(Duration::from_secs(60), workflow.poll("b-1"))
            .await
            .expect("polling should end on an expired session");

        assert_eq!(backend.calls(), 1);
        assert!(matches!(outcome, PollOutcome::Aborted { status: Some(401), .. }));
        assert!(matches!(workflow.state(), WorkflowState::Error { .. }));
        assert!(matches!(
            outcome.into_result("b-1", &settings(120)),
            Err(Error::SessionExpired)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_batch_stops_polling_after_one_read() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::api(404, "Batch not found")),
            Ok(BatchStatus::Pending),
        ]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let start = Instant::now();
        let outcome = workflow.poll("missing").await;

        assert_eq!(backend.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(
            outcome,
            PollOutcome::Aborted {
                status: Some(404),
                message: "Batch not found".to_string(),
            }
        );
        match outcome.into_result("missing", &settings(120)) {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Batch not found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_still_backs_off() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::api(503, "unavailable")),
            Ok(BatchStatus::Completed),
        ]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let outcome = workflow.poll("b-1").await;

        assert!(outcome.is_success());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_ends_polling() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Processing)]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));
        let token = workflow.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            token.cancel();
        });

        let outcome = workflow.poll("b-1").await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        // reads at 0, 3, 6, 9
        assert_eq!(backend.calls(), 4);
        assert!(matches!(
            outcome.into_result("b-1", &settings(120)),
            Err(Error::Cancelled { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropping_workflow_cancels_token() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Processing)]);
        let workflow = AnchorWorkflow::new(backend, settings(1));
        let token = workflow.cancellation_token();
        assert!(!token.is_cancelled());
        drop(workflow);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchor_creates_uploads_and_polls() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Completed)]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let (created, outcome) = workflow.anchor("lote.csv", CSV).await.unwrap();

        assert_eq!(created.batch_id, "b-1");
        assert!(outcome.is_success());
        let request = backend.created.lock().unwrap().clone().unwrap();
        assert_eq!(request.product_count, 2);
        assert_eq!(request.product_name.as_deref(), Some("lote.csv"));
        assert_eq!(
            request.metadata,
            Some(json!({
                "source": "csv",
                "columns": ["serial_number", "product_code"],
                "metadata": "anchor"
            }))
        );
        let messages: Vec<_> = workflow.status_log().iter().map(|l| l.message.as_str()).collect();
        assert_eq!(&messages[..3], ["Iniciando registro...", "Lote criado: b-1", "Job: j-1"]);
        assert!(messages.contains(&"CSV enviado. Processando..."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_failure_is_not_fatal() {
        let backend = Arc::new(ScriptedBackend {
            script: Mutex::new(vec![Ok(BatchStatus::Completed)].into()),
            status_calls: AtomicU32::new(0),
            retry_calls: AtomicU32::new(0),
            fail_upload: true,
            created: Mutex::new(None),
        });
        let mut workflow = AnchorWorkflow::new(backend, settings(120));

        let (_, outcome) = workflow.anchor("lote.csv", CSV).await.unwrap();

        assert!(outcome.is_success());
        assert!(workflow
            .status_log()
            .iter()
            .any(|l| l.message == "Erro no upload: upload broke"));
    }

    #[tokio::test]
    async fn test_empty_csv_is_rejected_before_any_call() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Completed)]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let err = workflow.submit("vazio.csv", "serial_number\n").await.unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert!(backend.created.lock().unwrap().is_none());
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_reenters_processing_and_polls() {
        let backend = ScriptedBackend::new(vec![Ok(BatchStatus::Processing), Ok(BatchStatus::Completed)]);
        let mut workflow = AnchorWorkflow::new(backend.clone(), settings(120));

        let outcome = workflow.retry("b-1").await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(backend.retry_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_status_line_format() {
        let line = StatusLine {
            at: Local::now(),
            message: "Status: pending".into(),
        };
        let text = line.to_string();
        assert_eq!(text.len(), "HH:MM:SS - Status: pending".len());
        assert!(text.ends_with(" - Status: pending"));
    }
}
