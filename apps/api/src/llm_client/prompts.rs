// Shared prompt fragments.
// Each module that calls the LLM keeps its own prompts.rs alongside it;
// this file only holds cross-cutting pieces.

/// Appended to system prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
