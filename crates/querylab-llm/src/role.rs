//! Job-post assistant: role summary, grounded insights, resume fit.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::provider::{complete_first, Completion, CompletionOptions, LlmProvider};

const SECTION_KEYS: [&str; 4] = ["responsibilities", "product areas", "skills", "metrics"];

/// A job post broken into the sections the summary prompt asks for.
/// Sections the model did not produce are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoleSummary {
    pub responsibilities: String,
    pub product_areas: String,
    pub skills: String,
    pub metrics: String,
}

pub struct RoleAssistant {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl RoleAssistant {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    pub fn summarize(&self, job_post: &str) -> Result<RoleSummary> {
        let reply = complete_first(&self.providers, &summary_prompt(job_post), &CompletionOptions::new(600, 0.3))?;
        Ok(parse_role_summary(&reply.text))
    }

    /// Strategic answer to `prompt` with the whole post as context.
    pub fn insight(&self, prompt: &str, job_chunks: &[String]) -> Result<Completion> {
        complete_first(&self.providers, &insight_prompt(prompt, job_chunks), &CompletionOptions::new(400, 0.5))
    }

    pub fn fit_summary(&self, resume: &str, job_post: &str) -> Result<Completion> {
        complete_first(&self.providers, &fit_prompt(resume, job_post), &CompletionOptions::new(400, 0.4))
    }
}

pub fn summary_prompt(job_post: &str) -> String {
    format!(
        "Summarize the following job posting into:\n\
- Responsibilities\n\
- Key product areas\n\
- Skills and requirements\n\
- Metrics or KPIs (if mentioned)\n\
Format each as a Markdown bullet list.\n\nJob Posting:\n{job_post}\n"
    )
}

pub fn insight_prompt(prompt: &str, job_chunks: &[String]) -> String {
    format!(
        "Job context:\n{}\n\nPrompt: {}\n\nGive a high-level, strategic answer that connects to the job post.",
        job_chunks.join("\n\n"),
        prompt
    )
}

pub fn fit_prompt(resume: &str, job_post: &str) -> String {
    format!(
        "You are an expert career coach and product leader. Given the following job posting and resume, \
write a concise, personalized summary (in 5-8 bullet points) of why this candidate is a strong fit for the role. \
Highlight alignment in skills, experience, and impact. Use a confident, professional tone.\n\n\
Job Posting:\n{job_post}\n\nResume:\n{resume}\n"
    )
}

/// Answer template showing the retrieved context a model would be grounded in.
pub fn grounded_answer(question: &str, chunks: &[String]) -> String {
    format!(
        "You asked: {}\n\nBased on the job description and relevant context:\n\n{}\n\n(Answer would be generated here by the LLM)",
        question,
        chunks.join("\n\n")
    )
}

/// Split a model reply into sections by locating each heading keyword.
///
/// A section runs from its heading to the line holding the next heading.
/// Text on the heading line after a ':' belongs to the section.
pub fn parse_role_summary(text: &str) -> RoleSummary {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let mut found: Vec<(usize, usize)> = SECTION_KEYS
        .iter()
        .enumerate()
        .filter_map(|(i, key)| lower.find(key).map(|pos| (pos, i)))
        .collect();
    found.sort_unstable();

    let mut sections: [String; 4] = Default::default();
    for (n, &(pos, i)) in found.iter().enumerate() {
        let after_key = pos + SECTION_KEYS[i].len();
        let end = match found.get(n + 1) {
            Some(&(next, _)) => {
                let line_start = text[..next].rfind('\n').map_or(next, |nl| nl + 1);
                if line_start >= after_key { line_start } else { next }
            }
            None => text.len(),
        };
        let eol = text[after_key..end].find('\n').map_or(end, |off| after_key + off);
        let body_start = match text[after_key..eol].find(':') {
            Some(colon) => after_key + colon + 1,
            None => eol,
        };
        sections[i] = text[body_start..end].trim_start_matches(|c: char| c == '*' || c.is_whitespace()).trim_end().to_string();
    }
    let [responsibilities, product_areas, skills, metrics] = sections;
    RoleSummary { responsibilities, product_areas, skills, metrics }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_markdown_headings() {
        let reply = "**Responsibilities:**\n- Own search roadmap\n- Ship features\n\n\
**Key Product Areas:**\n- Hybrid search\n\n\
### Skills and Requirements\n- 5+ years PM\n\n\
**Metrics or KPIs (if mentioned):** adoption, ARR";
        let summary = parse_role_summary(reply);
        assert_eq!(summary.responsibilities, "- Own search roadmap\n- Ship features");
        assert_eq!(summary.product_areas, "- Hybrid search");
        assert_eq!(summary.skills, "- 5+ years PM");
        assert_eq!(summary.metrics, "adoption, ARR");
    }

    #[test]
    fn missing_sections_stay_empty() {
        let summary = parse_role_summary("Responsibilities: lead the team");
        assert_eq!(summary.responsibilities, "lead the team");
        assert!(summary.metrics.is_empty() && summary.skills.is_empty());
    }

    #[test]
    fn grounded_answer_lists_context() {
        let text = grounded_answer("What is the role?", &["chunk one".into(), "chunk two".into()]);
        assert!(text.starts_with("You asked: What is the role?"));
        assert!(text.contains("chunk one\n\nchunk two"));
    }
}
