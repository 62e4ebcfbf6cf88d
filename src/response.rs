//! Best-effort recovery of structured fields from free-form model replies.
//!
//! The prompts ask the model to emit literal markers (`CAN_FIX=Yes`,
//! `FILES_TO_MODIFY=[...]`, fenced code blocks, "Suggested Labels:" headings)
//! and this module is the single place those markers are parsed back out.
//! Every function degrades instead of failing: a missing marker yields its
//! documented default, never an error.

use regex::Regex;
use std::sync::OnceLock;

/// Default fix classification when the model names none.
pub const DEFAULT_FIX_TYPE: &str = "complex";

fn code_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```[a-zA-Z]*\n([\s\S]*?)\n```").expect("code block regex compiles")
    })
}

fn files_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"FILES_TO_MODIFY=\[(.*?)\]").expect("files regex compiles"))
}

fn fix_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"FIX_TYPE=(\w+)").expect("fix type regex compiles"))
}

fn labels_section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)(?:Suggested|Recommended) Labels:(.+?)(?:\n\n|\n#|\z)")
            .expect("labels section regex compiles")
    })
}

fn label_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"`([^`]+)`|\*\*([^*]+)\*\*|"([^"]+)"|'([^']+)'|(\w+)"#)
            .expect("label token regex compiles")
    })
}

fn actions_section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)(?:Recommended|Next) Actions:(.+?)(?:\n\n|\n#|\z)")
            .expect("actions section regex compiles")
    })
}

/// Extract the first fenced code block (optional language tag) with the fence
/// markers stripped; a reply with no fence passes through trimmed.
pub fn extract_code_block(reply: &str) -> String {
    match code_block_re().captures(reply) {
        Some(caps) => caps[1].to_string(),
        None => reply.trim().to_string(),
    }
}

/// Strip a fence that wraps the entire reply (the model quoting its whole
/// answer as one block), leaving inner fences intact.
pub fn strip_outer_fence(reply: &str, lang: &str) -> String {
    let trimmed = reply.trim();
    let opened = trimmed
        .strip_prefix(&format!("```{lang}\n"))
        .or_else(|| trimmed.strip_prefix("```\n"));
    match opened.and_then(|rest| rest.strip_suffix("\n```").or_else(|| rest.strip_suffix("```"))) {
        Some(inner) => inner.to_string(),
        None => trimmed.to_string(),
    }
}

/// Structured verdict recovered from a fix-analysis reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixAssessment {
    pub can_fix: bool,
    pub files_to_modify: Vec<String>,
    pub fix_type: String,
}

impl Default for FixAssessment {
    fn default() -> Self {
        Self {
            can_fix: false,
            files_to_modify: Vec::new(),
            fix_type: DEFAULT_FIX_TYPE.to_string(),
        }
    }
}

/// Parse `CAN_FIX=Yes`, `FILES_TO_MODIFY=[a, b]`, and `FIX_TYPE=word` out of
/// an analysis reply. The file list and fix type are only read when the reply
/// affirms fixability; anything missing keeps its default
/// (not fixable / empty list / "complex").
pub fn parse_fix_assessment(reply: &str) -> FixAssessment {
    if !reply.contains("CAN_FIX=Yes") {
        return FixAssessment::default();
    }

    let files_to_modify = files_re()
        .captures(reply)
        .map(|caps| split_path_list(&caps[1]))
        .unwrap_or_default();

    let fix_type = fix_type_re()
        .captures(reply)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_FIX_TYPE.to_string());

    FixAssessment {
        can_fix: true,
        files_to_modify,
        fix_type,
    }
}

/// Clean up a comma-separated file list reply: quotes removed, entries
/// trimmed, empties dropped.
pub fn file_list_from_reply(reply: &str) -> Vec<String> {
    let cleaned: String = reply.chars().filter(|c| *c != '"' && *c != '\'').collect();
    split_path_list(cleaned.trim())
}

fn split_path_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|entry| entry.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Label names from a "Suggested Labels:"/"Recommended Labels:" block,
/// captured up to the next blank line or heading. Tokens may be backticked,
/// bolded, quoted, or bare; `none`/`n/a` placeholders are dropped.
pub fn suggested_labels(reply: &str) -> Vec<String> {
    let Some(caps) = labels_section_re().captures(reply) else {
        return Vec::new();
    };
    let section = caps[1].trim();

    let mut labels = Vec::new();
    for token in label_token_re().captures_iter(section) {
        let label = (1..=5).find_map(|i| token.get(i)).map(|m| m.as_str().trim());
        let Some(label) = label else { continue };
        if label.is_empty() {
            continue;
        }
        let lowered = label.to_lowercase();
        if lowered == "none" || lowered == "n/a" {
            continue;
        }
        labels.push(label.to_string());
    }
    labels
}

/// The free-text "Recommended Actions:"/"Next Actions:" block, if present.
pub fn recommended_actions(reply: &str) -> Option<String> {
    actions_section_re()
        .captures(reply)
        .map(|caps| caps[1].trim().to_string())
        .filter(|section| !section.is_empty())
}

/// Fallback heuristic when the model is unreachable: scrape `src/...*.java`
/// path tokens out of issue text.
pub fn java_paths_from_text(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for line in text.lines() {
        if !line.contains(".java") {
            continue;
        }
        for word in line.split_whitespace() {
            let cleaned = word.trim_matches(|c: char| ",():;\"'".contains(c));
            if !cleaned.ends_with(".java") {
                continue;
            }
            if cleaned.starts_with("src/") && !paths.contains(&cleaned.to_string()) {
                paths.push(cleaned.to_string());
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_block_with_language_tag() {
        let reply = "Here is the fix:\n```java\npublic class A {}\n```\nDone.";
        assert_eq!(extract_code_block(reply), "public class A {}");
    }

    #[test]
    fn test_extract_code_block_without_language_tag() {
        let reply = "```\nline one\nline two\n```";
        assert_eq!(extract_code_block(reply), "line one\nline two");
    }

    #[test]
    fn test_extract_code_block_no_fence_passes_through() {
        let reply = "  just plain text  ";
        assert_eq!(extract_code_block(reply), "just plain text");
    }

    #[test]
    fn test_extract_code_block_takes_first_block() {
        let reply = "```java\nfirst\n```\ntext\n```java\nsecond\n```";
        assert_eq!(extract_code_block(reply), "first");
    }

    #[test]
    fn test_strip_outer_fence() {
        let reply = "```markdown\n# Title\n\nBody\n```";
        assert_eq!(strip_outer_fence(reply, "markdown"), "# Title\n\nBody");
    }

    #[test]
    fn test_strip_outer_fence_untagged() {
        assert_eq!(strip_outer_fence("```\ncode\n```", "java"), "code");
    }

    #[test]
    fn test_strip_outer_fence_absent() {
        assert_eq!(strip_outer_fence("plain text", "markdown"), "plain text");
    }

    #[test]
    fn test_parse_fix_assessment_full_markers() {
        let reply = "Analysis...\nCAN_FIX=Yes FILES_TO_MODIFY=[a.java, b.java] FIX_TYPE=simple";
        let assessment = parse_fix_assessment(reply);
        assert!(assessment.can_fix);
        assert_eq!(
            assessment.files_to_modify,
            vec!["a.java".to_string(), "b.java".to_string()]
        );
        assert_eq!(assessment.fix_type, "simple");
    }

    #[test]
    fn test_parse_fix_assessment_no_markers_yields_defaults() {
        let assessment = parse_fix_assessment("I am not sure about this one.");
        assert!(!assessment.can_fix);
        assert!(assessment.files_to_modify.is_empty());
        assert_eq!(assessment.fix_type, "complex");
    }

    #[test]
    fn test_parse_fix_assessment_negative_verdict() {
        let assessment = parse_fix_assessment("CAN_FIX=No FIX_TYPE=simple");
        assert!(!assessment.can_fix);
        assert_eq!(assessment.fix_type, "complex");
    }

    #[test]
    fn test_parse_fix_assessment_yes_without_details() {
        let assessment = parse_fix_assessment("CAN_FIX=Yes");
        assert!(assessment.can_fix);
        assert!(assessment.files_to_modify.is_empty());
        assert_eq!(assessment.fix_type, "complex");
    }

    #[test]
    fn test_parse_fix_assessment_quoted_files() {
        let reply = r#"CAN_FIX=Yes FILES_TO_MODIFY=["src/A.java", "src/B.java"]"#;
        let assessment = parse_fix_assessment(reply);
        assert_eq!(
            assessment.files_to_modify,
            vec!["src/A.java".to_string(), "src/B.java".to_string()]
        );
    }

    #[test]
    fn test_file_list_from_reply() {
        let reply = "\"src/main/java/baubles/common/Baubles.java\", 'src/main/java/baubles/api/BaubleType.java'";
        assert_eq!(
            file_list_from_reply(reply),
            vec![
                "src/main/java/baubles/common/Baubles.java".to_string(),
                "src/main/java/baubles/api/BaubleType.java".to_string(),
            ]
        );
    }

    #[test]
    fn test_file_list_from_reply_empty() {
        assert!(file_list_from_reply("").is_empty());
        assert!(file_list_from_reply(" , , ").is_empty());
    }

    #[test]
    fn test_suggested_labels_backticks_and_bold() {
        let reply = "Some analysis.\n\nSuggested Labels: `bug`, **performance**\n\nMore text.";
        assert_eq!(
            suggested_labels(reply),
            vec!["bug".to_string(), "performance".to_string()]
        );
    }

    #[test]
    fn test_suggested_labels_bare_words() {
        let reply = "Recommended Labels: bug enhancement\n\nNext section";
        assert_eq!(
            suggested_labels(reply),
            vec!["bug".to_string(), "enhancement".to_string()]
        );
    }

    #[test]
    fn test_suggested_labels_filters_placeholders() {
        let reply = "Suggested Labels: none\n\n";
        assert!(suggested_labels(reply).is_empty());
    }

    #[test]
    fn test_suggested_labels_absent() {
        assert!(suggested_labels("no label section here").is_empty());
    }

    #[test]
    fn test_suggested_labels_stops_at_heading() {
        let reply = "Suggested Labels: `bug`\n# Next Heading\n`not-a-label`";
        assert_eq!(suggested_labels(reply), vec!["bug".to_string()]);
    }

    #[test]
    fn test_recommended_actions_block() {
        let reply = "Recommended Actions: triage and assign\nto a maintainer\n\nRest.";
        assert_eq!(
            recommended_actions(reply),
            Some("triage and assign\nto a maintainer".to_string())
        );
    }

    #[test]
    fn test_recommended_actions_absent() {
        assert_eq!(recommended_actions("nothing here"), None);
    }

    #[test]
    fn test_java_paths_from_text() {
        let text = "Crash in src/main/java/baubles/common/Baubles.java, see log.\n\
                    Also (src/main/java/baubles/api/BaubleType.java) looks wrong.\n\
                    NotAPath.java and docs/readme.md are unrelated.";
        assert_eq!(
            java_paths_from_text(text),
            vec![
                "src/main/java/baubles/common/Baubles.java".to_string(),
                "src/main/java/baubles/api/BaubleType.java".to_string(),
            ]
        );
    }

    #[test]
    fn test_java_paths_from_text_deduplicates() {
        let text = "src/A.java src/A.java";
        assert_eq!(java_paths_from_text(text), vec!["src/A.java".to_string()]);
    }

    #[test]
    fn test_java_paths_from_text_empty() {
        assert!(java_paths_from_text("no java here").is_empty());
    }
}
