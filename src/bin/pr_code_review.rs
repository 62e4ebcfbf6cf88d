//! Review the changed files of a pull request through the model and post the
//! result as a timestamped comment.

use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use tracing::warn;

use baubles_bot::config::{Config, Credentials};
use baubles_bot::github::{GitHubClient, PullRequestDetails};
use baubles_bot::llm::{complete_or, ChatRequest, OpenAiClient};

/// Cap on the number of diffs handed to the model in one prompt.
const MAX_REVIEWED_FILES: usize = 10;

/// Diffs longer than this are reduced to their first and last kilobyte.
const MAX_PATCH_CHARS: usize = 2000;

const REVIEW_SYSTEM_PROMPT: &str = "You are an expert Java and Minecraft modding code \
    reviewer who specializes in performance optimization and maintaining backward \
    compatibility. You provide thorough but constructive feedback, with specific code \
    suggestions where appropriate.";

const REVIEW_FALLBACK: &str = "## Automated Code Review\n\n\
    I attempted to analyze this PR but encountered an error.\n\n\
    Please review these changes manually, paying special attention to:\n\
    - Performance impacts\n\
    - Backward compatibility\n\
    - Code quality and best practices";

/// One changed file prepared for the review prompt.
struct ReviewFile {
    path: String,
    status: String,
    diff: String,
}

/// PR code review — reviews a pull request's diffs and posts the review as a
/// comment.
#[derive(Parser, Debug)]
#[command(name = "pr-code-review", version, about)]
struct Cli {
    /// Repository in format owner/repo
    #[arg(long)]
    repo: String,

    /// Pull request number to analyze
    #[arg(long)]
    pr: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;
    let config = Config::load()?;

    let github = GitHubClient::new(&credentials.github_token, &config.github.api_base);
    let model = OpenAiClient::new(&credentials.openai_api_key, &config.openai);

    let details = github.pull_request(&cli.repo, cli.pr).await?;
    let changed = github.pull_request_files(&cli.repo, cli.pr).await?;
    println!("Found {} files changed in PR #{}", changed.len(), cli.pr);

    let mut files = Vec::new();
    for file in changed {
        println!("Processing {} ({})", file.filename, file.status);

        // Listing entries without an inline patch (oversized diffs) get a
        // second chance through the compare endpoint; binaries have neither.
        let diff = match file.patch {
            Some(patch) => patch,
            None => {
                let compared = github
                    .compare_patch(&cli.repo, &details.base.sha, &details.head.sha, &file.filename)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(file = %file.filename, error = %e, "could not fetch compare diff");
                        None
                    });
                match compared {
                    Some(patch) => patch,
                    None => {
                        println!("Skipping file without a diff: {}", file.filename);
                        continue;
                    }
                }
            }
        };

        files.push(ReviewFile {
            path: file.filename,
            status: file.status,
            diff,
        });
    }

    let selected = select_files(files, MAX_REVIEWED_FILES);
    let prompt = review_prompt(&details, &selected);
    let request = ChatRequest::new(REVIEW_SYSTEM_PROMPT, prompt, 2500);
    let review = complete_or(&model, &request, REVIEW_FALLBACK).await;

    let comment = format_review(&review);
    match github.post_comment(&cli.repo, cli.pr, &comment).await {
        Ok(()) => println!("{}", "Successfully posted code review".green()),
        Err(e) => {
            warn!(error = %e, "could not post review comment");
            println!("{}", "Failed to post code review".red());
        }
    }

    Ok(())
}

/// Keep at most `max_files` files, preferring API files since compatibility
/// of the public surface is what reviews here care about most.
fn select_files(files: Vec<ReviewFile>, max_files: usize) -> Vec<ReviewFile> {
    if files.len() <= max_files {
        return files;
    }
    println!("Limiting analysis to {max_files} files out of {}", files.len());

    let (api_files, other_files): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| f.path.to_lowercase().contains("api"));

    api_files
        .into_iter()
        .chain(other_files)
        .take(max_files)
        .collect()
}

/// Reduce an oversized diff to its head and tail, keeping the prompt within
/// token limits while preserving both ends of the change.
fn truncate_patch(patch: &str) -> String {
    let chars: Vec<char> = patch.chars().collect();
    if chars.len() <= MAX_PATCH_CHARS {
        return patch.to_string();
    }
    let head: String = chars[..MAX_PATCH_CHARS / 2].iter().collect();
    let tail: String = chars[chars.len() - MAX_PATCH_CHARS / 2..].iter().collect();
    format!("{head}\n... [diff truncated] ...\n{tail}")
}

fn review_prompt(details: &PullRequestDetails, files: &[ReviewFile]) -> String {
    let mut file_context = String::new();
    for file in files {
        file_context.push_str(&format!("File: {} ({})\n", file.path, file.status));
        file_context.push_str(&format!("Diff:\n{}\n\n", truncate_patch(&file.diff)));
    }

    format!(
        "You are an expert code reviewer for the Baubles LTS Minecraft mod, which is a \
         performance-optimized fork of the Baubles mod for Minecraft Forge 1.12.2.\n\n\
         Please review this pull request:\n\n\
         PR Title: {title}\n\
         PR Author: {author}\n\
         PR Description:\n{body}\n\n\
         Changed files:\n{file_context}\n\
         Please provide a detailed code review focusing on:\n\n\
         1. Code quality and best practices\n\
         2. Performance implications\n\
         3. Backward compatibility (crucial for this project)\n\
         4. Potential bugs or edge cases\n\
         5. Security concerns if applicable\n\n\
         For each issue found, please suggest specific improvements. Be thorough but \
         constructive, and highlight positive aspects of the changes as well.\n\n\
         If you notice any potential improvements to performance, please specifically \
         mention them as this is a performance-optimized fork.\n\n\
         Format your review with Markdown using sections, code blocks, and bullet points \
         for clarity.",
        title = details.title,
        author = details.user.login,
        body = details.body_text(),
    )
}

fn format_review(review: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    format!(
        "# Automated Code Review\n\n\
         *Generated at: {timestamp}*\n\n\
         {review}\n\n\
         ---\n\
         This review was automatically generated by the Baubles LTS PR review system.\n\
         If you have questions or need clarification on any points, please reply to this \
         comment."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> ReviewFile {
        ReviewFile {
            path: path.to_string(),
            status: "modified".to_string(),
            diff: "@@ -1 +1 @@".to_string(),
        }
    }

    #[test]
    fn test_select_files_under_cap_keeps_all() {
        let selected = select_files(vec![file("a.java"), file("b.java")], 10);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_files_prioritizes_api_paths() {
        let mut files: Vec<ReviewFile> = (0..5)
            .map(|i| file(&format!("src/main/java/baubles/common/File{i}.java")))
            .collect();
        files.push(file("src/main/java/baubles/api/BaubleType.java"));
        files.push(file("src/main/java/baubles/api/IBauble.java"));

        let selected = select_files(files, 3);
        assert_eq!(selected.len(), 3);
        assert!(selected[0].path.contains("api"));
        assert!(selected[1].path.contains("api"));
    }

    #[test]
    fn test_truncate_patch_short_diff_untouched() {
        assert_eq!(truncate_patch("@@ -1 +1 @@"), "@@ -1 +1 @@");
    }

    #[test]
    fn test_truncate_patch_keeps_head_and_tail() {
        let patch = "a".repeat(1500) + &"z".repeat(1500);
        let truncated = truncate_patch(&patch);
        assert!(truncated.contains("... [diff truncated] ..."));
        assert!(truncated.starts_with('a'));
        assert!(truncated.ends_with('z'));
        assert!(truncated.chars().count() < patch.chars().count());
    }

    #[test]
    fn test_format_review_structure() {
        let body = format_review("Looks good overall.");
        assert!(body.starts_with("# Automated Code Review"));
        assert!(body.contains("Looks good overall."));
        assert!(body.contains("PR review system"));
    }
}
