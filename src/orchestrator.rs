//! Extraction orchestration.
//!
//! Sequences fetch → structural pass → (maybe) textual pass and applies the
//! terminal decision policy: structural results are authoritative whenever
//! they are non-empty; textual results replace, never supplement, an empty
//! structural result.

use std::fmt;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, ProxyChainFetcher};
use crate::result::{ContactRecord, Department, HarvestReport, Strategy};
use crate::structured::StructuredExtractor;
use crate::textual::{self, TextualExtractor};
use crate::Options;

/// Stages of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing started yet.
    Idle,
    /// Walking the proxy chain.
    Fetching,
    /// Tree-based extraction.
    StructuralPass,
    /// Pattern-based fallback.
    TextualPass,
    /// Records found.
    Succeeded,
    /// Run ended with an error.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::StructuralPass => "structural-pass",
            Self::TextualPass => "textual-pass",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// Tracks stage transitions of one run for logging.
struct RunState<'a> {
    department: &'a str,
    stage: Stage,
}

impl<'a> RunState<'a> {
    fn new(department: &'a str) -> Self {
        Self {
            department,
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(department = self.department, from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        self.advance(Stage::Failed);
        info!(department = self.department, error = %err, "harvest failed");
        err
    }
}

/// Runs the full pipeline for one department at a time.
///
/// Holds no per-run state, so one orchestrator can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct ExtractionOrchestrator<F = ProxyChainFetcher> {
    fetcher: F,
    structured: StructuredExtractor,
    textual: TextualExtractor,
    options: Options,
}

impl ExtractionOrchestrator<ProxyChainFetcher> {
    /// Orchestrator backed by the real proxy chain from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the options are unusable.
    pub fn new(options: Options) -> Result<Self> {
        let fetcher = ProxyChainFetcher::new(&options)?;
        Self::with_fetcher(fetcher, options)
    }
}

impl<F: PageFetcher> ExtractionOrchestrator<F> {
    /// Orchestrator backed by any fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the options are unusable.
    pub fn with_fetcher(fetcher: F, options: Options) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            fetcher,
            structured: StructuredExtractor::new(&options),
            textual: TextualExtractor::new(&options)?,
            options,
        })
    }

    /// Options this orchestrator was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Harvest records for `department`.
    ///
    /// # Errors
    ///
    /// [`Error::FetchExhausted`] if no relay served the page,
    /// [`Error::NoRecordsFound`] if neither strategy produced a record.
    pub async fn run(&self, department: &Department) -> Result<Vec<ContactRecord>> {
        self.harvest(department).await.map(|report| report.records)
    }

    /// [`run`](Self::run) with an external cancellation signal.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`Error::Cancelled`].
    pub async fn run_with_cancel(
        &self,
        department: &Department,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContactRecord>> {
        self.harvest_with_cancel(department, cancel)
            .await
            .map(|report| report.records)
    }

    /// Harvest and return the full report.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run).
    pub async fn harvest(&self, department: &Department) -> Result<HarvestReport> {
        self.harvest_with_cancel(department, &CancellationToken::new()).await
    }

    /// [`harvest`](Self::harvest) with an external cancellation signal.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`Error::Cancelled`].
    pub async fn harvest_with_cancel(
        &self,
        department: &Department,
        cancel: &CancellationToken,
    ) -> Result<HarvestReport> {
        let mut state = RunState::new(&department.name);

        state.advance(Stage::Fetching);
        let content = match self.fetcher.fetch(&department.url, cancel).await {
            Ok(content) => content,
            Err(err) => return Err(state.fail(err)),
        };
        let fetched_at = Utc::now();

        state.advance(Stage::StructuralPass);
        let mut strategy = Strategy::Structural;
        let mut records = self.structured.extract(&content);

        if records.is_empty()
            && textual::permits_textual_pass(self.options.textual_fallback, &content)
        {
            state.advance(Stage::TextualPass);
            strategy = Strategy::Textual;
            records = self.textual.extract(&content);
        }

        if records.is_empty() {
            return Err(state.fail(Error::NoRecordsFound));
        }

        state.advance(Stage::Succeeded);
        info!(
            department = %department.name,
            endpoint = %content.endpoint,
            strategy = ?strategy,
            records = records.len(),
            "harvest succeeded"
        );

        Ok(HarvestReport {
            department: department.clone(),
            endpoint: content.endpoint,
            strategy,
            records,
            fetched_at,
        })
    }
}
