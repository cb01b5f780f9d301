// Session workflow: the Input → Analyzing → Result → Optimizing state machine,
// the service that runs inference around it, and the export artifact.
// All inference goes through llm_client::Inference, never raw HTTP.

pub mod export;
pub mod handlers;
pub mod machine;
pub mod progress;
pub mod service;
