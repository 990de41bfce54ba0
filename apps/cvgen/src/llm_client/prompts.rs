// Cross-cutting prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to the system instruction of every `call_json` request.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every generation prompt.
pub const PLAUSIBILITY_INSTRUCTION: &str = "\
    Keep every date in MM/YYYY form. \
    Leave optional fields out entirely rather than inventing placeholder values. \
    The name and email fields are mandatory.";
