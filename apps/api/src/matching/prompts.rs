// Prompt constants for the matching module.

/// Keyword extraction prompt. Replace `{vocabulary}` and `{resume}` before sending.
pub const KEYWORD_EXTRACTION_PROMPT: &str = "Extract the most relevant keywords from this resume, \
separated by commas. Only output the keywords, nothing else. \
You must only use keywords from the following list:\n{vocabulary}\n\nResume:\n{resume}";
