// LLM prompt constants for the résumé module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for résumé summaries.
pub const SUMMARY_SYSTEM: &str = "You are a professional resume analyzer. \
    Create a concise 3-4 sentence summary highlighting key skills, experience, and qualifications. \
    Focus on the most relevant information for job applications.";

/// Summary prompt. Replace `{resume}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Please summarize this resume:\n\n{resume}";

/// System prompt for application emails. Followed by the JSON-only fragment.
pub const EMAIL_SYSTEM: &str = "You are a professional job application writer. \
    Always respond with a JSON object containing \"subject\" and \"body\" fields.";

/// Application email prompt. Replace `{job_details}` and `{resume}` before sending.
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"You are an expert job application writer. Generate a professional and personalized application email for the following job:

Job Details:
{job_details}

Resume Information:
{resume}

Please create:
1. A compelling subject line (max 60 characters)
2. A professional email body that:
   - Shows enthusiasm for the specific role and company
   - Highlights relevant skills from the resume
   - Explains why the candidate is a good fit
   - Includes a clear call to action
   - Is concise but comprehensive (200-300 words)
   - Uses a professional but friendly tone

Format the response as JSON with "subject" and "body" fields."#;
