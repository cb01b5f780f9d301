use serde::Serialize;

/// Model selected when nothing else is configured.
pub const DEFAULT_MODEL: &str = "llama3";

/// A suggested model: display name plus the tag passed to the inference server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelOption {
    pub name: &'static str,
    pub value: &'static str,
}

pub const MODEL_CATALOG: &[ModelOption] = &[
    ModelOption {
        name: "Llama 3 (Balanced)",
        value: DEFAULT_MODEL,
    },
    ModelOption {
        name: "Mistral (Fast)",
        value: "mistral",
    },
    ModelOption {
        name: "DeepSeek Coder (Technical)",
        value: "deepseek-coder",
    },
];
