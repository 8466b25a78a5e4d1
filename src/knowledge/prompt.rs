//! Prompt assembly for grounded answer generation.

use crate::knowledge::types::RetrievedChunk;

/// Fixed answer returned when retrieval yields no usable context. Returned as
/// a success so the caller still gets a well-formed answer body.
pub const NO_CONTEXT_FALLBACK: &str =
    "I couldn't find relevant information in the knowledge base to answer your query.";

/// Join retrieved chunks into a context block, dropping chunks whose text is
/// absent or blank. Returns `None` when nothing usable remains, which covers
/// both an empty result list and results that all lack text.
pub fn join_context(chunks: &[RetrievedChunk]) -> Option<String> {
    let texts: Vec<&str> = chunks
        .iter()
        .filter_map(RetrievedChunk::text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

/// Build the grounded generation prompt: answer from the supplied context
/// only, with "I don't know" explicitly permitted.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question.\n\
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Answer:"
    )
}
