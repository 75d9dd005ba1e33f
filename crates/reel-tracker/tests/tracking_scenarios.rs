//! End-to-end tracking scenarios against a scripted render service.
//!
//! Time is paused, so backoff sleeps complete instantly while `Instant`
//! arithmetic still reflects the scheduled delays.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reel_client::ClientError;
use reel_config::{PollingConfig, RenderConfig};
use reel_core::enums::{TaskStatus, TerminalOutcome};
use reel_core::ids::{SessionId, TaskId};
use reel_core::wire::{
    CancelAck, HistoryMessage, HistoryPage, SessionSummary, StatusPayload, SubmitRequest,
    SubmitResponse, TaskResult,
};
use reel_tracker::{
    BackoffPolicy, HistoryListing, PollingScheduler, RenderOptions, TaskApi, TaskEngine, Tracker,
    TrackerError, notices,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One scripted answer to a status check.
enum Step {
    Status(StatusPayload),
    /// Answer only after the delay, e.g. to let a cancel race the request.
    Slow(Duration, StatusPayload),
    Fail,
}

#[derive(Default)]
struct ScriptedApi {
    steps: Mutex<VecDeque<Step>>,
    submit_fails: bool,
    cancel_fails: bool,
    history: Vec<HistoryPage>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
    submitted: Mutex<Vec<SubmitRequest>>,
}

impl ScriptedApi {
    fn with_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }
}

fn unavailable() -> ClientError {
    ClientError::Api {
        status: 504,
        message: "gateway timeout".into(),
    }
}

#[async_trait]
impl TaskApi for ScriptedApi {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ClientError> {
        if self.submit_fails {
            return Err(ClientError::Api {
                status: 500,
                message: "worker offline".into(),
            });
        }
        self.submitted.lock().unwrap().push(request.clone());
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SubmitResponse {
            task_id: TaskId::from(format!("task-{n}").as_str()),
            session_id: None,
        })
    }

    async fn fetch_status(&self, _task_id: &TaskId) -> Result<StatusPayload, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Status(payload)) => Ok(payload),
            Some(Step::Slow(delay, payload)) => {
                tokio::time::sleep(delay).await;
                Ok(payload)
            }
            Some(Step::Fail) => Err(unavailable()),
            None => Ok(StatusPayload::new(TaskStatus::Running)),
        }
    }

    async fn cancel(&self, _task_id: &TaskId) -> Result<CancelAck, ClientError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.cancel_fails {
            Err(unavailable())
        } else {
            Ok(CancelAck::default())
        }
    }

    async fn fetch_history(&self, page: u32, _limit: u32) -> Result<HistoryPage, ClientError> {
        Ok(self
            .history
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_else(|| HistoryPage::empty(page)))
    }
}

fn polling() -> PollingConfig {
    PollingConfig {
        jitter_cap_ms: 0,
        ..PollingConfig::default()
    }
}

fn tracker_with(api: ScriptedApi, config: &PollingConfig) -> Tracker<ScriptedApi> {
    let backoff = BackoffPolicy::from_config(config).with_seed(1);
    let engine = TaskEngine::with_scheduler(PollingScheduler::with_backoff(config, backoff));
    Tracker::with_engine(api, engine, RenderOptions::from(&RenderConfig::default()), 5)
}

fn tracker(api: ScriptedApi) -> Tracker<ScriptedApi> {
    tracker_with(api, &polling())
}

fn running(progress: f64) -> Step {
    Step::Status(StatusPayload::new(TaskStatus::Running).with_progress(progress))
}

fn completed(link: &str) -> Step {
    let mut result = TaskResult::success(link);
    result.session_id = Some(SessionId::from("session-1"));
    Step::Status(StatusPayload::new(TaskStatus::Completed).with_result(result))
}

fn task() -> TaskId {
    TaskId::from("task-1")
}

/// Paused time advances to timer deadlines, which are rounded to the
/// millisecond.
fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn success_after_progress() {
    let api = ScriptedApi::with_steps([
        Step::Status(StatusPayload::new(TaskStatus::Queued)),
        running(40.0),
        completed("https://cdn.example.com/out.mp4"),
        running(99.0),
    ]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    tracker.submit("a square turning into a circle", &token).await.unwrap();
    let started = Instant::now();
    let mut seen = Vec::new();
    let outcome = tracker
        .run(&token, |entry| seen.push(entry.progress()))
        .await
        .unwrap();

    assert_eq!(outcome, TerminalOutcome::Succeeded);
    assert_eq!(seen, vec![None, Some(40), Some(100)]);
    // immediate first poll, then two base intervals
    assert_elapsed(started, Duration::from_secs(4));
    assert_eq!(tracker.api().status_calls(), 3);

    let entry = tracker.engine().linked_entry().unwrap();
    assert_eq!(entry.content(), notices::SUCCEEDED);
    assert_eq!(
        entry.terminal().unwrap().link.as_deref(),
        Some("https://cdn.example.com/out.mp4")
    );
    assert_eq!(
        tracker.engine().active_session(),
        Some(&SessionId::from("session-1"))
    );
}

#[tokio::test(start_paused = true)]
async fn finished_task_is_not_polled_again() {
    let api = ScriptedApi::with_steps([completed("https://cdn/a.mp4"), running(10.0)]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    tracker.submit("a dot", &token).await.unwrap();
    tracker.run(&token, |_| {}).await.unwrap();

    // a second run finds nothing to poll
    let again = tracker.run(&token, |_| {}).await.unwrap();
    assert_eq!(again, TerminalOutcome::Succeeded);
    assert_eq!(tracker.api().status_calls(), 1);
    assert_eq!(tracker.engine().status(), Some(TaskStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn three_timeouts_stop_tracking() {
    let api = ScriptedApi::with_steps([Step::Fail, Step::Fail, Step::Fail, running(10.0)]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    tracker.submit("a wave", &token).await.unwrap();
    let started = Instant::now();
    let mut updates = 0;
    let outcome = tracker.run(&token, |_| updates += 1).await.unwrap();

    assert_eq!(outcome, TerminalOutcome::ConnectionLost);
    assert_eq!(tracker.api().status_calls(), 3);
    assert_eq!(updates, 1);
    // backoff after the first two failures: 3s, then 4.5s
    assert_elapsed(started, Duration::from_millis(7_500));

    let entry = tracker.engine().linked_entry().unwrap();
    assert_eq!(entry.content(), notices::CONNECTION_LOST);
    assert_eq!(entry.revision(), 2);
}

#[tokio::test(start_paused = true)]
async fn recovery_resets_error_budget() {
    let api = ScriptedApi::with_steps([
        Step::Fail,
        Step::Fail,
        running(50.0),
        Step::Fail,
        Step::Fail,
        completed("https://cdn/b.mp4"),
    ]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    tracker.submit("two circles", &token).await.unwrap();
    let outcome = tracker.run(&token, |_| {}).await.unwrap();
    assert_eq!(outcome, TerminalOutcome::Succeeded);
    assert_eq!(tracker.api().status_calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn attempt_ceiling_reports_still_processing() {
    let config = PollingConfig {
        max_attempts: 4,
        ..polling()
    };
    let mut tracker = tracker_with(ScriptedApi::default(), &config);
    let token = CancellationToken::new();

    tracker.submit("a very long render", &token).await.unwrap();
    let outcome = tracker.run(&token, |_| {}).await.unwrap();

    assert_eq!(outcome, TerminalOutcome::TrackingStopped);
    assert_eq!(tracker.api().status_calls(), 4);
    assert_eq!(
        tracker.engine().linked_entry().unwrap().content(),
        notices::tracking_stopped(4)
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_during_request_wins_over_late_response() {
    let api = ScriptedApi::with_steps([Step::Slow(
        Duration::from_secs(5),
        StatusPayload::new(TaskStatus::Running).with_progress(70.0),
    )]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();
    tracker.submit("a spiral", &token).await.unwrap();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let outcome = tracker.run(&token, |_| {}).await.unwrap();
    assert_eq!(outcome, TerminalOutcome::Cancelled);
    assert_eq!(tracker.api().cancel_calls(), 1);

    let entry = tracker.engine().linked_entry().unwrap();
    assert_eq!(entry.content(), notices::CANCELLED);
    assert_eq!(entry.progress(), None);
    assert!(tracker.engine().is_cancelled(&task()));
    assert!(!tracker.engine().scheduler().is_active());
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_cancel_is_local_only() {
    let api = ScriptedApi {
        cancel_fails: true,
        ..ScriptedApi::default()
    };
    let mut tracker = tracker(api);
    let token = CancellationToken::new();
    tracker.submit("a triangle", &token).await.unwrap();

    let outcome = tracker.cancel().await.unwrap();
    assert_eq!(outcome, TerminalOutcome::CancelledLocally);
    assert_eq!(
        tracker.engine().linked_entry().unwrap().content(),
        notices::CANCELLED_LOCALLY
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent() {
    let mut tracker = tracker(ScriptedApi::default());
    let token = CancellationToken::new();
    tracker.submit("a hexagon", &token).await.unwrap();

    assert_eq!(tracker.cancel().await.unwrap(), TerminalOutcome::Cancelled);
    assert_eq!(tracker.cancel().await.unwrap(), TerminalOutcome::Cancelled);
    assert_eq!(tracker.api().cancel_calls(), 1);
    assert_eq!(tracker.engine().linked_entry().unwrap().revision(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_finished_task_is_noop() {
    let api = ScriptedApi::with_steps([completed("https://cdn/c.mp4")]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();
    tracker.submit("a star", &token).await.unwrap();
    tracker.run(&token, |_| {}).await.unwrap();

    assert_eq!(tracker.cancel().await.unwrap(), TerminalOutcome::Succeeded);
    assert_eq!(tracker.api().cancel_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn submit_failure_freezes_placeholder() {
    let api = ScriptedApi {
        submit_fails: true,
        ..ScriptedApi::default()
    };
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    let err = tracker.submit("a cube", &token).await.unwrap_err();
    assert!(matches!(err, TrackerError::Client(_)));

    let entry = tracker.log().last().unwrap();
    assert_eq!(
        entry.content(),
        "Could not start the generation: API error (500): worker offline"
    );
    assert_eq!(
        entry.terminal().unwrap().outcome,
        TerminalOutcome::SubmitFailed
    );
    assert!(matches!(
        tracker.run(&token, |_| {}).await,
        Err(TrackerError::NotTracking)
    ));
    assert_eq!(tracker.api().status_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn session_continues_across_submissions() {
    let api = ScriptedApi::with_steps([completed("https://cdn/1.mp4"), completed("https://cdn/2.mp4")]);
    let mut tracker = tracker(api);
    let token = CancellationToken::new();

    assert_eq!(tracker.submit("first", &token).await.unwrap(), task());
    tracker.run(&token, |_| {}).await.unwrap();
    let second = tracker.submit("second", &token).await.unwrap();
    assert_eq!(second, TaskId::from("task-2"));
    tracker.run(&token, |_| {}).await.unwrap();
    assert_eq!(tracker.log().len(), 4);

    let submitted = tracker.api().submitted.lock().unwrap().clone();
    assert_eq!(submitted[0].session_id, None);
    assert_eq!(submitted[1].session_id, Some(SessionId::from("session-1")));
}

#[tokio::test]
async fn history_empty_and_open_session() {
    let session = SessionSummary {
        id: SessionId::from("s-2"),
        chat_name: Some("Shapes".into()),
        messages: vec![HistoryMessage {
            user_query: "a circle".into(),
            link: Some("https://cdn/circle.mp4".into()),
            ..HistoryMessage::default()
        }],
        created_at: None,
    };
    let api = ScriptedApi {
        history: vec![
            HistoryPage {
                data: vec![],
                page: 1,
                pages: 2,
                total: 6,
                limit: Some(5),
            },
            HistoryPage {
                data: vec![session],
                page: 2,
                pages: 2,
                total: 6,
                limit: Some(5),
            },
        ],
        ..ScriptedApi::default()
    };
    let mut tracker = tracker(api);

    assert_eq!(tracker.load_history(9).await.unwrap(), HistoryListing::Empty);
    assert!(matches!(
        tracker.load_history(2).await.unwrap(),
        HistoryListing::Populated(_)
    ));

    let opened = tracker.open_session(&SessionId::from("s-2"), 1).await.unwrap();
    assert_eq!(opened.chat_name.as_deref(), Some("Shapes"));
    assert_eq!(tracker.log().len(), 2);
    assert!(tracker.log().entries()[1].is_terminal());
    assert_eq!(tracker.engine().active_session(), Some(&SessionId::from("s-2")));

    assert!(matches!(
        tracker.open_session(&SessionId::from("missing"), 1).await,
        Err(TrackerError::SessionNotFound(_))
    ));
}
