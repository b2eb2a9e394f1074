//! Prompt construction.
//!
//! The model is the only component that judges importance, so everything it
//! needs to know about ranking, language and credibility lives here. The two
//! variants share the candidate listing and the response schema; only the
//! instruction block differs.

use crate::config::{Category, PromptVariant};
use crate::models::Candidate;
use std::fmt::Write;

/// Render the full prompt for one category.
pub fn build_prompt(
    category: &Category,
    candidates: &[Candidate],
    top_k: usize,
    language: &str,
) -> String {
    let mut prompt = String::new();

    writeln!(
        prompt,
        "Below is a list of news articles from the '{}' category.",
        category.name
    )
    .unwrap();
    writeln!(
        prompt,
        "Select the {top_k} most important articles from this list and summarize each one.\n"
    )
    .unwrap();

    prompt.push_str("[Instructions]\n");
    prompt.push_str(&focus_instructions(category.variant, language));
    prompt.push_str(&common_rules(language));
    prompt.push('\n');

    prompt.push_str("[Articles]\n");
    prompt.push_str(&render_candidates(candidates));
    prompt.push('\n');

    prompt.push_str(&response_schema(top_k, language));
    prompt
}

fn focus_instructions(variant: PromptVariant, language: &str) -> String {
    match variant {
        PromptVariant::GlobalTech => format!(
            "This category tracks the global AI and deep-tech trend. The articles are in English.\n\
             1. Translate everything you output into {language}. Titles must read naturally in {language} while keeping the original meaning exactly.\n\
             2. Prefer technical news (new models, algorithms, research papers, open-source releases) over business news such as stock prices, funding or revenue.\n\
             3. Be strict about sources: prefer articles from or about recognized research labs, universities, standards bodies and established companies. Skip rumours, press-release rewrites and low-credibility blogs.\n\
             4. In the points, explain what is new about the technology and how it works.\n\
             5. Write for a general audience. Avoid jargon; when a technical term is unavoidable, add a short explanation.\n"
        ),
        PromptVariant::Regional => format!(
            "Pick the news with the broadest impact in this category. Output language is {language}.\n\
             1. Judge significance across outlets: a story covered by several outlets usually matters more than a single-outlet exclusive.\n\
             2. Many entries are near-duplicates of the same story from different outlets. Treat them as one story and select it at most once.\n\
             3. Skip opinion pieces, advertorials and minor local items unless nothing more significant is available.\n"
        ),
    }
}

fn common_rules(language: &str) -> String {
    format!(
        "- Rank the selected articles by importance, most important first.\n\
         - Each article gets 2 to 3 short points in {language}.\n\
         - Copy the link of each selected article exactly as given. Never modify, shorten or invent a link.\n\
         - Only select articles from the list below.\n"
    )
}

/// Serialize candidates as numbered blocks separated by blank lines.
pub fn render_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("ID: {}\nTitle: {}\nLink: {}\n", c.index, c.title, c.link))
        .collect::<Vec<_>>()
        .join("\n")
}

fn response_schema(top_k: usize, language: &str) -> String {
    format!(
        "[Output format (JSON only)]\n\
         Respond with a JSON array of exactly {top_k} objects and nothing else:\n\
         [\n\
         \x20   {{\n\
         \x20       \"title\": \"article title ({language})\",\n\
         \x20       \"points\": [\"key point 1 ({language})\", \"key point 2 ({language})\"],\n\
         \x20       \"link\": \"original link (unchanged)\"\n\
         \x20   }}\n\
         ]\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(variant: PromptVariant) -> Category {
        Category::new("AI_Tech", "AI", "https://example.com/rss", variant)
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                index: 0,
                title: "New reasoning model tops benchmark".to_string(),
                link: "https://news.example.com/a".to_string(),
            },
            Candidate {
                index: 1,
                title: "Chipmaker shares rally".to_string(),
                link: "https://news.example.com/b".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_candidates() {
        let text = render_candidates(&candidates());
        assert_eq!(
            text,
            "ID: 0\nTitle: New reasoning model tops benchmark\nLink: https://news.example.com/a\n\n\
             ID: 1\nTitle: Chipmaker shares rally\nLink: https://news.example.com/b\n"
        );
        assert_eq!(render_candidates(&[]), "");
    }

    #[test]
    fn test_prompt_contains_candidates_and_schema() {
        let prompt = build_prompt(&cat(PromptVariant::Regional), &candidates(), 5, "Korean");
        assert!(prompt.contains("'AI_Tech' category"));
        assert!(prompt.contains("Select the 5 most important"));
        assert!(prompt.contains("https://news.example.com/a"));
        assert!(prompt.contains("https://news.example.com/b"));
        assert!(prompt.contains("JSON array of exactly 5 objects"));
        assert!(prompt.contains("\"title\""));
        assert!(prompt.contains("\"points\""));
        assert!(prompt.contains("\"link\""));
    }

    #[test]
    fn test_global_tech_variant() {
        let prompt = build_prompt(&cat(PromptVariant::GlobalTech), &candidates(), 3, "Korean");
        assert!(prompt.contains("Translate everything you output into Korean"));
        assert!(prompt.contains("over business news"));
        assert!(prompt.contains("recognized research labs"));
        assert!(!prompt.contains("near-duplicates"));
    }

    #[test]
    fn test_regional_variant() {
        let prompt = build_prompt(&cat(PromptVariant::Regional), &candidates(), 3, "Japanese");
        assert!(prompt.contains("across outlets"));
        assert!(prompt.contains("near-duplicates"));
        assert!(prompt.contains("Output language is Japanese"));
        assert!(!prompt.contains("Translate everything"));
    }

    #[test]
    fn test_link_preservation_rule_in_every_variant() {
        for variant in [PromptVariant::GlobalTech, PromptVariant::Regional] {
            let prompt = build_prompt(&cat(variant), &candidates(), 5, "Korean");
            assert!(prompt.contains("Copy the link of each selected article exactly"));
        }
    }
}
