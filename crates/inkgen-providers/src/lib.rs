//! Local LLM backends (Ollama, llamafile, OpenAI-compatible servers).

mod chat;
mod ollama;

pub mod backend;
pub mod client;
pub mod shared;

pub use backend::BackendKind;
pub use client::{ClientConfig, ModelClient, TextGenerator};
pub use shared::{
    GENERATE_TIMEOUT, PROBE_TIMEOUT, ProviderError, ProviderErrorKind, ProviderResult,
    SYSTEM_INSTRUCTION, SamplingParams, USER_AGENT,
};
