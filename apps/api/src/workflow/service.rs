//! Drives the session state machine around the slow parts: inference calls and
//! PDF extraction.
//!
//! The session lock is held only to apply transitions, never across an await on
//! the inference server. The step guards are what keep a second call out while
//! one is in flight. Work runs on a spawned task so a client that disconnects
//! mid-call still leaves the session in a stable step once the call returns.

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::document::{append_page, ensure_pdf, extract_pages, DocumentError, Upload};
use crate::errors::AppError;
use crate::llm_client::prompts::{analysis_prompt, optimization_prompt};
use crate::llm_client::{generate_json, Inference, InferenceError};
use crate::models::resume::{AnalysisResult, OptimizedResume};
use crate::state::AppState;
use crate::workflow::machine::{Event, InferenceJob, InferenceKind, SessionView};

pub async fn analyze_resume(
    llm: &dyn Inference,
    model: &str,
    resume_text: &str,
    job_description: &str,
) -> Result<AnalysisResult, InferenceError> {
    generate_json(llm, model, &analysis_prompt(resume_text, job_description)).await
}

pub async fn optimize_resume(
    llm: &dyn Inference,
    model: &str,
    resume_text: &str,
    job_description: &str,
) -> Result<OptimizedResume, InferenceError> {
    generate_json(llm, model, &optimization_prompt(resume_text, job_description)).await
}

/// Input → Analyzing → Result (or back to Input on failure).
pub async fn start_analysis(state: &AppState) -> Result<SessionView, AppError> {
    run_transition(state, Event::StartAnalysis).await
}

/// Result → Optimizing → Result. `confirmed` is the user's answer to the interstitial.
pub async fn start_optimization(state: &AppState, confirmed: bool) -> Result<SessionView, AppError> {
    run_transition(state, Event::StartOptimization { confirmed }).await
}

async fn run_transition(state: &AppState, event: Event) -> Result<SessionView, AppError> {
    let job = {
        let mut session = state.session.lock().await;
        session.apply(event)?
    };
    let job = job.ok_or_else(|| AppError::Internal(anyhow!("transition produced no inference call")))?;
    let kind = job.kind;

    info!("Inference started: {:?} with model {}", kind, job.model);

    let task = tokio::spawn(run_inference(state.clone(), job));
    match task.await {
        Ok(Ok(())) => Ok(snapshot(state).await),
        Ok(Err(e)) => Err(e.into()),
        Err(join_error) => {
            error!("Inference task aborted: {join_error}");
            let mut session = state.session.lock().await;
            let message = "Inference task aborted unexpectedly.".to_string();
            let failed = match kind {
                InferenceKind::Analysis => Event::AnalysisFailed(message),
                InferenceKind::Optimization => Event::OptimizationFailed(message),
            };
            if let Err(e) = session.apply(failed) {
                error!("Could not recover session after aborted task: {e}");
            }
            Err(AppError::Internal(anyhow!(join_error)))
        }
    }
}

/// Calls the model and applies the outcome to the session.
async fn run_inference(state: AppState, job: InferenceJob) -> Result<(), InferenceError> {
    let llm = state.llm.as_ref();
    let (model, resume, jd) = (&job.model, &job.resume_text, &job.job_description);

    let (completion, outcome) = match job.kind {
        InferenceKind::Analysis => match analyze_resume(llm, model, resume, jd).await {
            Ok(result) => (Event::AnalysisSucceeded(result), Ok(())),
            Err(e) => (Event::AnalysisFailed(e.to_string()), Err(e)),
        },
        InferenceKind::Optimization => match optimize_resume(llm, model, resume, jd).await {
            Ok(resume) => (Event::OptimizationSucceeded(resume), Ok(())),
            Err(e) => (Event::OptimizationFailed(e.to_string()), Err(e)),
        },
    };

    match &outcome {
        Ok(()) => info!("Inference finished: {:?} with model {}", job.kind, model),
        Err(e) => warn!(
            "Inference failed: {:?} with model {}: {} ({})",
            job.kind,
            model,
            e,
            e.detail().unwrap_or("no detail")
        ),
    }

    let mut session = state.session.lock().await;
    if let Err(e) = session.apply(completion) {
        error!("Inference result arrived in an unexpected step: {e}");
    }
    outcome
}

/// Result → Input, clearing both results.
pub async fn new_analysis(state: &AppState) -> Result<SessionView, AppError> {
    let mut session = state.session.lock().await;
    session.apply(Event::NewAnalysis)?;
    Ok(session.view(tokio::time::Instant::now()))
}

/// Replaces the résumé text with the text of an uploaded PDF.
pub async fn upload_resume(state: &AppState, upload: Upload) -> Result<SessionView, AppError> {
    state.session.lock().await.begin_upload()?;

    info!(
        "Resume upload: {} ({} bytes)",
        upload.file_name.as_deref().unwrap_or("unnamed"),
        upload.data.len()
    );

    let task = tokio::spawn(read_upload(state.clone(), upload));
    let outcome = task.await.unwrap_or_else(|join_error| {
        Err(DocumentError::Extraction {
            detail: join_error.to_string(),
        })
    });

    let mut session = state.session.lock().await;
    match outcome {
        Ok(text) => {
            session.finish_upload(Ok(text));
            Ok(session.view(tokio::time::Instant::now()))
        }
        Err(e) => {
            match &e {
                DocumentError::Format { content_type } => {
                    warn!("Resume upload rejected: content type {:?}", content_type)
                }
                DocumentError::Extraction { detail } => warn!("Resume extraction failed: {detail}"),
            }
            session.finish_upload(Err(&e));
            Err(e.into())
        }
    }
}

// Pages are folded in order so progress advances one page at a time.
async fn read_upload(state: AppState, upload: Upload) -> Result<String, DocumentError> {
    ensure_pdf(&upload)?;
    let pages = extract_pages(state.extractor.clone(), upload.data).await?;

    let total = pages.len();
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        append_page(&mut text, page);
        state.session.lock().await.upload_progress(index + 1, total);
    }
    Ok(text)
}

pub async fn snapshot(state: &AppState) -> SessionView {
    state.session.lock().await.view(tokio::time::Instant::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{analysis_json, state_with, StubInference};
    use crate::workflow::machine::{AppStep, InputsUpdate};
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn fill_inputs(state: &AppState, resume: &str, jd: &str) {
        state
            .session
            .lock()
            .await
            .update_inputs(InputsUpdate {
                job_title: Some("Platform Engineer".to_string()),
                job_description: Some(jd.to_string()),
                resume_text: Some(resume.to_string()),
                model: None,
            })
            .unwrap();
    }

    fn pdf_upload(content_type: &str) -> Upload {
        Upload {
            file_name: Some("resume.pdf".to_string()),
            content_type: Some(content_type.to_string()),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn test_empty_inputs_make_no_network_call() {
        let llm = StubInference::new(|_| Ok(analysis_json()));
        let state = state_with(llm.clone(), vec![]);
        fill_inputs(&state, "", "Build APIs").await;

        let err = start_analysis(&state).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot(&state).await.step, AppStep::Input);
    }

    #[tokio::test]
    async fn test_analysis_stores_scores_unmodified() {
        let llm = StubInference::new(|_| Ok(analysis_json()));
        let state = state_with(llm.clone(), vec![]);
        fill_inputs(&state, "Jane Doe, SRE", "Platform role").await;

        let view = start_analysis(&state).await.unwrap();
        assert_eq!(view.step, AppStep::Result);
        let analysis = view.analysis.unwrap();
        assert_eq!(analysis.overall_score, 83.0);
        assert_eq!(analysis.skills_match, 91.5);
        assert_eq!(analysis.education_alignment, 100.0);
        assert_eq!(analysis.missing_skills, vec!["Kafka".to_string()]);
        assert_eq!(view.progress, 100.0);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_reverts_to_input() {
        let llm = StubInference::new(|model| {
            Err(InferenceError::MalformedResponse {
                model: model.to_string(),
                detail: "expected value at line 1 column 1".to_string(),
            })
        });
        let state = state_with(llm, vec![]);
        fill_inputs(&state, "Jane Doe", "Platform role").await;

        let err = start_analysis(&state).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Inference(InferenceError::MalformedResponse { .. })
        ));

        let view = snapshot(&state).await;
        assert_eq!(view.step, AppStep::Input);
        assert!(view.analysis.is_none());
        assert!(view.error.unwrap().contains("different model"));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_malformed() {
        let llm = StubInference::new(|_| Ok(json!({"overallScore": "high"})));
        let state = state_with(llm, vec![]);
        fill_inputs(&state, "Jane Doe", "Platform role").await;

        let err = start_analysis(&state).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Inference(InferenceError::MalformedResponse { .. })
        ));
        assert_eq!(snapshot(&state).await.step, AppStep::Input);
    }

    #[tokio::test]
    async fn test_missing_model_message_names_model() {
        let llm = StubInference::new(|model| {
            if model == "llama3" {
                Ok(analysis_json())
            } else {
                Err(InferenceError::ModelNotFound {
                    model: model.to_string(),
                })
            }
        });
        let state = state_with(llm, vec![]);
        fill_inputs(&state, "Jane Doe", "Platform role").await;
        start_analysis(&state).await.unwrap();

        // Rerun with a model the stub does not know.
        {
            let mut session = state.session.lock().await;
            session.apply(Event::NewAnalysis).unwrap();
            session
                .update_inputs(InputsUpdate {
                    model: Some("mistral".to_string()),
                    ..Default::default()
                })
                .unwrap();
        }
        let err = start_analysis(&state).await.unwrap_err();
        assert!(matches!(err, AppError::Inference(InferenceError::ModelNotFound { .. })));
        assert!(snapshot(&state).await.error.unwrap().contains("mistral"));
    }

    #[tokio::test]
    async fn test_full_flow_analysis_then_optimization() {
        let replies = Arc::new(AtomicUsize::new(0));
        let counter = replies.clone();
        let llm = StubInference::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(analysis_json())
            } else {
                Ok(json!({
                    "header": "Jane Doe",
                    "summary": "Platform engineer",
                    "experience": ["Cut deploy time 40% by ..."],
                    "skills": ["Rust", "Kubernetes"]
                }))
            }
        });
        let state = state_with(llm, vec![]);
        fill_inputs(&state, "Jane Doe", "Platform role").await;

        start_analysis(&state).await.unwrap();
        let view = start_optimization(&state, true).await.unwrap();

        assert_eq!(view.step, AppStep::Result);
        assert!(view.analysis.is_some());
        assert_eq!(view.optimized.unwrap().skills, vec!["Rust", "Kubernetes"]);
    }

    #[tokio::test]
    async fn test_optimization_error_stays_on_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let llm = StubInference::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(analysis_json())
            } else {
                Err(InferenceError::Protocol {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                })
            }
        });
        let state = state_with(llm, vec![]);
        fill_inputs(&state, "Jane Doe", "Platform role").await;
        start_analysis(&state).await.unwrap();

        let err = start_optimization(&state, true).await.unwrap_err();
        assert!(matches!(err, AppError::Inference(InferenceError::Protocol { .. })));

        let view = snapshot(&state).await;
        assert_eq!(view.step, AppStep::Result);
        assert!(view.analysis.is_some());
        assert!(view.optimized.is_none());
        assert_eq!(view.error.as_deref(), Some("Ollama Error: Internal Server Error (HTTP 500)"));
    }

    #[tokio::test]
    async fn test_new_analysis_requires_result_step() {
        let state = state_with(StubInference::new(|_| Ok(analysis_json())), vec![]);
        let err = new_analysis(&state).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upload_concatenates_pages() {
        let state = state_with(
            StubInference::new(|_| Ok(analysis_json())),
            vec!["Jane Doe  jane@example.com", "Experience  Acme Corp"],
        );

        let view = upload_resume(&state, pdf_upload("application/pdf"))
            .await
            .unwrap();
        assert_eq!(
            view.resume_text,
            "Jane Doe  jane@example.com\nExperience  Acme Corp\n"
        );
        assert!(!view.uploading);
        assert_eq!(view.progress, 100.0);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_keeps_resume_text() {
        let state = state_with(StubInference::new(|_| Ok(analysis_json())), vec!["ignored"]);
        fill_inputs(&state, "Pasted resume", "Platform role").await;

        let err = upload_resume(&state, pdf_upload("image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Document(DocumentError::Format { .. })));

        let view = snapshot(&state).await;
        assert_eq!(view.resume_text, "Pasted resume");
        assert_eq!(view.error.as_deref(), Some("Invalid format. Please upload a PDF."));
        assert!(!view.uploading);
    }
}
