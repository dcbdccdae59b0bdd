//! Résumé text utilities: upload extraction, cleanup, and section splitting.

use axum::body::Bytes;
use serde::Serialize;

use crate::errors::AppError;

/// Résumé lines grouped under the header that precedes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeSections {
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Skills,
    Experience,
    Education,
}

/// Turns an uploaded file into text. Plain text and PDF are supported;
/// Word documents and everything else are rejected.
pub fn extract_upload_text(content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
    let content_type = content_type.to_lowercase();

    if content_type.starts_with("text/plain") {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))
    } else if content_type == "application/pdf" {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))
    } else if content_type.contains("word") || content_type.contains("document") {
        Err(AppError::Validation(
            "Word documents are not supported. Please paste the text instead.".to_string(),
        ))
    } else {
        Err(AppError::Validation(format!(
            "Unsupported file type: {content_type}"
        )))
    }
}

/// `extract_upload_text` on the blocking pool. PDF parsing is CPU-bound and
/// must not stall the async executor; a panic inside the parser surfaces as
/// an internal error.
pub async fn read_upload(content_type: String, bytes: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_upload_text(&content_type, &bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in upload extraction: {e}"))
        })?
}

/// Normalizes line endings, collapses runs of blank lines to one, and trims.
pub fn clean_resume_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }

    out.trim().to_string()
}

/// Groups lines under skills / experience / education headers.
/// A line naming a section starts it; lines before any header are dropped.
pub fn extract_sections(text: &str) -> ResumeSections {
    let mut sections = ResumeSections::default();
    let mut current: Option<Section> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(section) = header_section(&line.to_lowercase()) {
            current = Some(section);
            continue;
        }

        let bucket = match current {
            Some(Section::Skills) => &mut sections.skills,
            Some(Section::Experience) => &mut sections.experience,
            Some(Section::Education) => &mut sections.education,
            None => continue,
        };
        bucket.push(line.to_string());
    }

    sections
}

fn header_section(line: &str) -> Option<Section> {
    let has_any = |words: &[&str]| words.iter().any(|w| line.contains(w));

    if has_any(&["skills", "technologies", "tools"]) {
        Some(Section::Skills)
    } else if has_any(&["experience", "work", "employment"]) {
        Some(Section::Experience)
    } else if has_any(&["education", "degree", "university"]) {
        Some(Section::Education)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_normalizes_line_endings_and_blank_runs() {
        let raw = "  Jane Doe\r\nEngineer\r\r\n\n   \n\nSkills\n";
        assert_eq!(clean_resume_text(raw), "Jane Doe\nEngineer\n\nSkills");
    }

    #[test]
    fn test_clean_keeps_single_blank_line() {
        assert_eq!(clean_resume_text("a\n\nb"), "a\n\nb");
        assert_eq!(clean_resume_text("a\nb"), "a\nb");
    }

    #[test]
    fn test_extract_sections_groups_lines() {
        let text = "Jane Doe\nSkills\nRust, Python\nDocker\nWork History\nAcme 2020-2023\nEducation\nBSc Computer Science\n";
        let sections = extract_sections(text);
        assert_eq!(sections.skills, vec!["Rust, Python", "Docker"]);
        assert_eq!(sections.experience, vec!["Acme 2020-2023"]);
        assert_eq!(sections.education, vec!["BSc Computer Science"]);
    }

    #[test]
    fn test_extract_sections_without_headers_is_empty() {
        assert_eq!(extract_sections("just a line\nanother"), ResumeSections::default());
    }

    #[test]
    fn test_plain_text_upload() {
        let text = extract_upload_text("text/plain; charset=utf-8", b"Rust engineer").unwrap();
        assert_eq!(text, "Rust engineer");
    }

    #[test]
    fn test_word_upload_is_rejected() {
        let err = extract_upload_text(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            b"PK",
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unknown_upload_is_rejected() {
        assert!(extract_upload_text("image/png", &[0x89, 0x50]).is_err());
    }

    #[tokio::test]
    async fn test_read_upload_runs_extraction_off_the_executor() {
        let text = read_upload("text/plain".to_string(), Bytes::from_static(b"Rust engineer"))
            .await
            .unwrap();
        assert_eq!(text, "Rust engineer");

        let err = read_upload("image/png".to_string(), Bytes::from_static(&[0x89, 0x50]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_read_upload_rejects_malformed_pdf() {
        let err = read_upload(
            "application/pdf".to_string(),
            Bytes::from_static(b"%PDF-1.4\nnot really a pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::UnprocessableEntity(_) | AppError::Internal(_)
        ));
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        assert!(extract_upload_text("text/plain", &[0xff, 0xfe, 0xfd]).is_err());
    }
}
