use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analytics::AnalyticsCounters;
use crate::clock::{Clock, SystemClock};
use crate::domain::{AnalysisResult, InputType, PersistenceWarning, Verdict};
use crate::error::{AppError, ErrorKind};
use crate::history::HistoryLog;
use crate::store::{KeyValueStore, KEY_ANALYTICS, KEY_HISTORY};

pub const MIN_INPUT_CHARS: usize = 20;

pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to generate analysis. The API returned an invalid response.";
pub const ANALYSIS_CANCELLED_MESSAGE: &str = "Analysis was cancelled.";

/// Produces an assessment for a piece of text. Implemented by the AI client; mocked in tests.
pub trait Analyzer {
    fn analyze(&self, text: &str, input_type: InputType) -> Result<AnalysisResult, AppError>;
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, text: &str, input_type: InputType) -> Result<AnalysisResult, AppError> {
        (**self).analyze(text, input_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Submitting,
    Success(AnalysisResult),
    Failed { code: String, message: String },
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Submitting => "submitting",
            AnalysisState::Success(_) => "success",
            AnalysisState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Keep only this many trailing days of analytics. `None` keeps every bucket.
    pub analytics_retention_days: Option<u32>,
}

/// Handle for the one pending submission. Not `Clone`: a ticket completes at most once.
#[derive(Debug)]
pub struct SubmitTicket {
    id: u64,
    text: String,
    input_type: InputType,
}

impl SubmitTicket {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }
}

/// Owns the analysis lifecycle, the history log and the analytics counters for one user
/// session, mirroring both structures into `store` after every mutation.
///
/// Lifecycle: `idle -> submitting -> {success, failed}`; `clear` returns to `idle` from any
/// state. At most one submission is pending at a time.
pub struct AnalysisSession<S, C = SystemClock> {
    store: S,
    clock: C,
    options: SessionOptions,
    state: AnalysisState,
    history: HistoryLog,
    analytics: AnalyticsCounters,
    pending: Option<u64>,
    next_ticket: u64,
    warnings: Vec<PersistenceWarning>,
}

impl<S: KeyValueStore> AnalysisSession<S, SystemClock> {
    pub fn open_with_system_clock(store: S) -> Self {
        Self::open(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> AnalysisSession<S, C> {
    pub fn open(store: S, clock: C) -> Self {
        Self::open_with_options(store, clock, SessionOptions::default())
    }

    /// Read persisted history and analytics once. A record that cannot be read or decoded is
    /// logged and replaced by an empty structure.
    pub fn open_with_options(store: S, clock: C, options: SessionOptions) -> Self {
        let history: HistoryLog = load_record(&store, KEY_HISTORY);
        let analytics: AnalyticsCounters = load_record(&store, KEY_ANALYTICS);
        tracing::debug!(
            history_len = history.len(),
            analytics_days = analytics.len(),
            "analysis session opened"
        );
        Self {
            store,
            clock,
            options,
            state: AnalysisState::Idle,
            history,
            analytics,
            pending: None,
            next_ticket: 1,
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn current_result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            AnalysisState::Success(r) => Some(r),
            _ => None,
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn analytics(&self) -> &AnalyticsCounters {
        &self.analytics
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Store write failures from the most recent successful submission.
    pub fn persistence_warnings(&self) -> &[PersistenceWarning] {
        &self.warnings
    }

    /// Run a full submission through `analyzer`.
    pub fn submit(
        &mut self,
        analyzer: &dyn Analyzer,
        text: &str,
        input_type: InputType,
    ) -> Result<AnalysisResult, AppError> {
        let ticket = self.begin_submit(text, input_type)?;
        let outcome = analyzer.analyze(ticket.text(), ticket.input_type());
        self.complete(ticket, outcome)
    }

    /// First half of a submission: validate input and enter `submitting`.
    ///
    /// Short input is rejected without touching the state.
    pub fn begin_submit(
        &mut self,
        text: &str,
        input_type: InputType,
    ) -> Result<SubmitTicket, AppError> {
        if self.pending.is_some() {
            return Err(AppError::new(
                "ANALYSIS_IN_FLIGHT",
                "An analysis is already in progress",
            ));
        }

        let chars = text.chars().count();
        if chars < MIN_INPUT_CHARS {
            return Err(AppError::new(
                "ANALYSIS_INPUT_TOO_SHORT",
                format!("Please enter a news article or headline (min {MIN_INPUT_CHARS} chars)."),
            )
            .with_details(format!("chars={chars}")));
        }

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(id);
        self.warnings.clear();
        self.state = AnalysisState::Submitting;
        tracing::debug!(ticket = id, input_type = input_type.label(), "analysis submitted");

        Ok(SubmitTicket {
            id,
            text: text.to_string(),
            input_type,
        })
    }

    /// Second half of a submission. History and analytics change only on a successful
    /// outcome for the currently pending ticket.
    pub fn complete(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<AnalysisResult, AppError>,
    ) -> Result<AnalysisResult, AppError> {
        self.take_pending(&ticket)?;

        let result = match outcome.and_then(check_result) {
            Ok(result) => result,
            Err(e) => {
                log_failure(&e);
                self.state = AnalysisState::Failed {
                    code: e.code.clone(),
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                };
                return Err(e);
            }
        };

        self.state = AnalysisState::Success(result.clone());
        self.history.push_front(result.clone());
        let today = self.clock.today();
        self.analytics.increment(today);
        if let Some(days) = self.options.analytics_retention_days {
            let pruned = self.analytics.prune_older_than(today, days);
            if pruned > 0 {
                tracing::debug!(pruned, "pruned analytics buckets");
            }
        }
        self.persist();

        tracing::info!(
            ticket = ticket.id,
            score = result.score,
            verdict = result.verdict.label(),
            "analysis completed"
        );
        Ok(result)
    }

    /// Abandon the pending submission; it ends as a distinct `failed` outcome.
    pub fn cancel(&mut self, ticket: SubmitTicket) -> Result<(), AppError> {
        self.take_pending(&ticket)?;
        self.state = AnalysisState::Failed {
            code: "ANALYSIS_CANCELLED".to_string(),
            message: ANALYSIS_CANCELLED_MESSAGE.to_string(),
        };
        tracing::info!(ticket = ticket.id, "analysis cancelled");
        Ok(())
    }

    /// Show a past result again. Pure read: no analyzer call, no history or analytics write.
    pub fn load_from_history(&mut self, id: &str) -> Result<AnalysisResult, AppError> {
        if self.pending.is_some() {
            return Err(AppError::new(
                "ANALYSIS_IN_FLIGHT",
                "An analysis is already in progress",
            ));
        }
        let entry = self.history.get(id).cloned().ok_or_else(|| {
            AppError::new("HISTORY_ENTRY_NOT_FOUND", "History entry not found")
                .with_details(format!("id={id}"))
        })?;
        self.state = AnalysisState::Success(entry.clone());
        Ok(entry)
    }

    /// Back to `idle`. Drops the current result and any pending submission; history stays.
    pub fn clear(&mut self) {
        if let Some(id) = self.pending.take() {
            tracing::debug!(ticket = id, "pending analysis discarded by clear");
        }
        self.state = AnalysisState::Idle;
    }

    fn take_pending(&mut self, ticket: &SubmitTicket) -> Result<(), AppError> {
        if self.pending != Some(ticket.id) {
            return Err(AppError::new(
                "ANALYSIS_STALE_SUBMISSION",
                "Submission is no longer pending",
            )
            .with_details(format!("ticket={}", ticket.id)));
        }
        self.pending = None;
        Ok(())
    }

    fn persist(&mut self) {
        // Keys are written independently; one failing does not stop the other.
        if let Err(w) = write_record(&self.store, KEY_HISTORY, &self.history) {
            self.warnings.push(w);
        }
        if let Err(w) = write_record(&self.store, KEY_ANALYTICS, &self.analytics) {
            self.warnings.push(w);
        }
    }
}

fn check_result(mut result: AnalysisResult) -> Result<AnalysisResult, AppError> {
    if result.score > 100 {
        return Err(
            AppError::new("AI_RESPONSE_INVALID", "Analysis score out of range")
                .with_details(format!("score={}", result.score)),
        );
    }
    if !result.confidence_in_range() {
        return Err(
            AppError::new("AI_RESPONSE_INVALID", "Analysis confidence out of range")
                .with_details(format!("confidence={}", result.confidence)),
        );
    }
    if !result.verdict_is_consistent() {
        let derived = Verdict::from_score(result.score);
        tracing::warn!(
            stated = result.verdict.label(),
            derived = derived.label(),
            "analysis verdict disagrees with score; using score"
        );
        result.verdict = derived;
    }
    Ok(result)
}

fn log_failure(e: &AppError) {
    let kind = e.kind();
    match kind {
        ErrorKind::Schema => tracing::warn!(
            code = %e.code,
            kind = kind.as_str(),
            details = e.details.as_deref().unwrap_or(""),
            "analysis response rejected"
        ),
        ErrorKind::Transport => tracing::warn!(
            code = %e.code,
            kind = kind.as_str(),
            retryable = e.retryable,
            details = e.details.as_deref().unwrap_or(""),
            "analysis provider call failed"
        ),
        _ => tracing::error!(
            code = %e.code,
            kind = kind.as_str(),
            details = e.details.as_deref().unwrap_or(""),
            "analysis failed"
        ),
    }
}

fn load_record<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, code = %e.code, "failed to read persisted record; starting empty");
            return T::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, err = %e, "failed to decode persisted record; starting empty");
        T::default()
    })
}

fn write_record<S, T>(store: &S, key: &str, value: &T) -> Result<(), PersistenceWarning>
where
    S: KeyValueStore,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|e| {
        tracing::warn!(key, err = %e, "failed to encode record for storage");
        PersistenceWarning::new("STORE_ENCODE_FAILED", "Failed to encode record for storage")
            .with_details(format!("key={key}; err={e}"))
    })?;
    store.set(key, &json).map_err(|e| {
        tracing::warn!(key, code = %e.code, "failed to persist record");
        let details = e.details.clone().unwrap_or_else(|| e.to_string());
        PersistenceWarning::new("STORE_WRITE_FAILED", "Failed to persist record")
            .with_details(format!("key={key}; {details}"))
    })
}
