//! Dummy provider — echoes the prompt back prefixed with `[echo]`.
//! Used for running the relay end to end without a real API key.

use crate::llm::{GenerationRequest, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        Ok(format!("[echo] {}", request.prompt()))
    }
}
