//! The session state machine: Input → Analyzing → Result ⇄ Optimizing.
//!
//! `next_step` is the transition table; `Session::apply` enforces the data
//! guards, stores results and hands back the inference call to run, if any.
//! Nothing here performs I/O.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::document::DocumentError;
use crate::models::resume::{AnalysisResult, JobData, OptimizedResume};
use crate::workflow::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppStep {
    Input,
    Analyzing,
    Result,
    Optimizing,
}

impl fmt::Display for AppStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppStep::Input => "input",
            AppStep::Analyzing => "analyzing",
            AppStep::Result => "result",
            AppStep::Optimizing => "optimizing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    StartAnalysis,
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(String),
    StartOptimization { confirmed: bool },
    OptimizationSucceeded(OptimizedResume),
    OptimizationFailed(String),
    NewAnalysis,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::StartAnalysis => "start analysis",
            Event::AnalysisSucceeded(_) => "complete analysis",
            Event::AnalysisFailed(_) => "fail analysis",
            Event::StartOptimization { .. } => "start optimization",
            Event::OptimizationSucceeded(_) => "complete optimization",
            Event::OptimizationFailed(_) => "fail optimization",
            Event::NewAnalysis => "start a new analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("Ensure Job Description and Resume are provided.")]
    MissingInputs,

    #[error("Optimization must be confirmed before it starts.")]
    NotConfirmed,

    #[error("Wait for the resume upload to finish.")]
    UploadInProgress,

    #[error("Cannot {event} while the session is in the {step} step.")]
    InvalidStep { step: AppStep, event: &'static str },
}

/// The transition table. Only step-level legality is checked here.
pub fn next_step(step: AppStep, event: &Event) -> Result<AppStep, TransitionError> {
    let to = match (step, event) {
        (AppStep::Input, Event::StartAnalysis) => AppStep::Analyzing,
        (AppStep::Analyzing, Event::AnalysisSucceeded(_)) => AppStep::Result,
        (AppStep::Analyzing, Event::AnalysisFailed(_)) => AppStep::Input,
        (AppStep::Result, Event::StartOptimization { .. }) => AppStep::Optimizing,
        (AppStep::Optimizing, Event::OptimizationSucceeded(_)) => AppStep::Result,
        (AppStep::Optimizing, Event::OptimizationFailed(_)) => AppStep::Result,
        (AppStep::Result, Event::NewAnalysis) => AppStep::Input,
        (step, event) => {
            return Err(TransitionError::InvalidStep {
                step,
                event: event.name(),
            })
        }
    };
    Ok(to)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceKind {
    Analysis,
    Optimization,
}

/// The inference call a transition asks the caller to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceJob {
    pub kind: InferenceKind,
    pub model: String,
    pub resume_text: String,
    pub job_description: String,
}

/// Partial update of the user-entered inputs. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputsUpdate {
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub resume_text: Option<String>,
    pub model: Option<String>,
}

/// Serializable view of the session for clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub step: AppStep,
    pub model: String,
    pub job: JobData,
    pub resume_text: String,
    pub analysis: Option<AnalysisResult>,
    pub optimized: Option<OptimizedResume>,
    pub error: Option<String>,
    pub uploading: bool,
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct Session {
    step: AppStep,
    model: String,
    job: JobData,
    resume_text: String,
    analysis: Option<AnalysisResult>,
    optimized: Option<OptimizedResume>,
    error: Option<String>,
    uploading: bool,
    progress: Progress,
}

impl Session {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            step: AppStep::Input,
            model: model.into(),
            job: JobData::default(),
            resume_text: String::new(),
            analysis: None,
            optimized: None,
            error: None,
            uploading: false,
            progress: Progress::Idle,
        }
    }

    pub fn optimized(&self) -> Option<&OptimizedResume> {
        self.optimized.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Applies an event. On success returns the inference call to run next, if any.
    pub fn apply(&mut self, event: Event) -> Result<Option<InferenceJob>, TransitionError> {
        let to = next_step(self.step, &event)?;

        let job = match event {
            Event::StartAnalysis => {
                if self.uploading {
                    return Err(TransitionError::UploadInProgress);
                }
                if self.job.description.trim().is_empty() || self.resume_text.trim().is_empty() {
                    let err = TransitionError::MissingInputs;
                    self.record_error(err.to_string());
                    return Err(err);
                }
                self.error = None;
                self.analysis = None;
                self.optimized = None;
                self.progress = Progress::waiting();
                Some(self.inference_job(InferenceKind::Analysis))
            }
            Event::AnalysisSucceeded(result) => {
                self.analysis = Some(result);
                self.progress = Progress::Fixed(100.0);
                None
            }
            Event::AnalysisFailed(message) => {
                self.analysis = None;
                self.optimized = None;
                self.record_error(message);
                self.progress = Progress::Idle;
                None
            }
            Event::StartOptimization { confirmed } => {
                if !confirmed {
                    return Err(TransitionError::NotConfirmed);
                }
                self.error = None;
                self.progress = Progress::waiting();
                Some(self.inference_job(InferenceKind::Optimization))
            }
            Event::OptimizationSucceeded(resume) => {
                self.optimized = Some(resume);
                self.progress = Progress::Fixed(100.0);
                None
            }
            Event::OptimizationFailed(message) => {
                self.record_error(message);
                self.progress = Progress::Idle;
                None
            }
            Event::NewAnalysis => {
                self.analysis = None;
                self.optimized = None;
                self.progress = Progress::Idle;
                None
            }
        };

        self.step = to;
        Ok(job)
    }

    fn inference_job(&self, kind: InferenceKind) -> InferenceJob {
        InferenceJob {
            kind,
            model: self.model.clone(),
            resume_text: self.resume_text.clone(),
            job_description: self.job.description.clone(),
        }
    }

    /// Inputs are editable only on the input screen.
    pub fn update_inputs(&mut self, update: InputsUpdate) -> Result<(), TransitionError> {
        self.require_input_step("edit inputs")?;

        if let Some(title) = update.job_title {
            self.job.title = title;
        }
        if let Some(description) = update.job_description {
            self.job.description = description;
        }
        if let Some(resume_text) = update.resume_text {
            self.resume_text = resume_text;
        }
        if let Some(model) = update.model.filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        Ok(())
    }

    pub fn begin_upload(&mut self) -> Result<(), TransitionError> {
        self.require_input_step("upload a resume")?;
        if self.uploading {
            return Err(TransitionError::UploadInProgress);
        }
        self.uploading = true;
        self.error = None;
        self.progress = Progress::Fixed(10.0);
        Ok(())
    }

    pub fn upload_progress(&mut self, done: usize, total: usize) {
        if self.uploading {
            self.progress = Progress::upload_page(done, total);
        }
    }

    /// Ends an upload. Only a successful extraction touches the résumé text.
    pub fn finish_upload(&mut self, outcome: Result<String, &DocumentError>) {
        self.uploading = false;
        match outcome {
            Ok(text) => {
                self.resume_text = text;
                self.progress = Progress::Fixed(100.0);
            }
            Err(err) => {
                self.record_error(err.to_string());
                self.progress = Progress::Idle;
            }
        }
    }

    fn require_input_step(&self, event: &'static str) -> Result<(), TransitionError> {
        if self.step == AppStep::Input {
            Ok(())
        } else {
            Err(TransitionError::InvalidStep {
                step: self.step,
                event,
            })
        }
    }

    pub fn view(&self, now: Instant) -> SessionView {
        SessionView {
            step: self.step,
            model: self.model.clone(),
            job: self.job.clone(),
            resume_text: self.resume_text.clone(),
            analysis: self.analysis.clone(),
            optimized: self.optimized.clone(),
            error: self.error.clone(),
            uploading: self.uploading,
            progress: self.progress.percent_at(now),
        }
    }
}
