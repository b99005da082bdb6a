//! Context formatting and grounded answer generation.

use std::sync::Arc;

use crate::providers::ChatModel;
use crate::query::retrieve::RetrievedChunk;
use crate::types::RagError;

/// Returned as the context block when retrieval produced nothing.
pub const EMPTY_CONTEXT: &str = "No relevant property information found.";

const SYSTEM_PROMPT: &str = "You are a real estate assistant. Answer ONLY using the properties provided in the context below. DO NOT make up information.

CRITICAL RULES:
1. If context has matching properties → List them with details
2. If context has NO matching properties → Say \"No properties found with those criteria\" and show what IS available
3. ALWAYS use actual prices, locations, and amenities from the context
4. Format each property as ONE bullet point:
   • **[Type]** in [Location] - ₹[Price] | [BHK] | [Area] | [Amenities] [SOURCE:N]";

pub struct AnswerGenerator {
    chat: Arc<dyn ChatModel>,
}

impl AnswerGenerator {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Renders retrieved chunks into numbered `Property N:` blocks, in the
    /// given order, blank-line separated.
    pub fn format_context(chunks: &[RetrievedChunk]) -> String {
        if chunks.is_empty() {
            return EMPTY_CONTEXT.to_string();
        }
        let mut parts = Vec::with_capacity(chunks.len() * 3);
        for (idx, chunk) in chunks.iter().enumerate() {
            parts.push(format!("Property {}:", idx + 1));
            parts.push(chunk.text.clone());
            parts.push(String::new());
        }
        parts.join("\n")
    }

    /// One completion request with the fixed grounding instruction.
    /// Failures propagate; the orchestrator owns retry and degrade.
    pub async fn generate(&self, query: &str, context: &str) -> Result<String, RagError> {
        let user_prompt = format!(
            "Available Properties in Database:\n{context}\n\nUser Query: {query}\n\n\
             INSTRUCTIONS:\n\
             1. Check if any properties match the user's query\n\
             2. List matching properties with ALL details (price, location, BHK, amenities)\n\
             3. Add [SOURCE:N] at the end of each property line\n\
             4. If NO match found, say so clearly and show what properties ARE available\n\n\
             Answer:"
        );
        self.chat.complete(Some(SYSTEM_PROMPT), &user_prompt).await
    }
}
