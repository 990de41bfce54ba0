// LLM-backed document generation: résumé and cover-letter prompts, fail-closed
// parsing of the model's reply, and keyword coverage for the editing client.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod generator;
pub mod handlers;
pub mod keywords;
pub mod prompts;
