//! Analyze one issue for automatic fixability and publish the verdict as
//! workflow outputs plus an explanatory comment.

use clap::Parser;
use tracing::warn;

use baubles_bot::actions;
use baubles_bot::config::{Config, Credentials};
use baubles_bot::github::{Comment, GitHubClient, Issue, RepoEntry};
use baubles_bot::llm::{complete_or, ChatRequest, OpenAiClient};
use baubles_bot::response::{parse_fix_assessment, FixAssessment};

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that specializes in \
    Minecraft mod development, particularly for the Baubles API. You analyze GitHub issues \
    to determine if they can be automatically fixed.";

/// Auto-fix analyzer — decides whether one issue can be fixed automatically
/// and exposes the verdict to the rest of the workflow.
#[derive(Parser, Debug)]
#[command(name = "auto-fix-analyzer", version, about)]
struct Cli {
    /// Repository in format owner/repo
    #[arg(long)]
    repo: String,

    /// Issue number to analyze
    #[arg(long)]
    issue_number: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;
    let config = Config::load()?;

    let github = GitHubClient::new(&credentials.github_token, &config.github.api_base);
    let model = OpenAiClient::new(&credentials.openai_api_key, &config.openai);

    // Issue and comments are the analysis subject; without them there is
    // nothing to do. The tree listing is flavor and degrades to empty.
    let issue = github.issue(&cli.repo, cli.issue_number).await?;
    let comments = github.issue_comments(&cli.repo, cli.issue_number).await?;
    let entries = github.repo_entries(&cli.repo, "").await.unwrap_or_else(|e| {
        warn!(error = %e, "could not list repository contents");
        Vec::new()
    });

    let prompt = analysis_prompt(&issue, &comments, &entries);
    let request = ChatRequest::new(ANALYSIS_SYSTEM_PROMPT, prompt, 1500);
    let analysis = complete_or(&model, &request, "").await;
    let assessment = parse_fix_assessment(&analysis);

    println!("Analysis result: {analysis}");
    println!("Can fix: {}", assessment.can_fix);
    println!("Files to modify: {}", assessment.files_to_modify.join(", "));
    println!("Fix type: {}", assessment.fix_type);

    publish_outputs(&cli, &assessment);

    let body = verdict_comment(&analysis, assessment.can_fix);
    if let Err(e) = github.post_comment(&cli.repo, cli.issue_number, &body).await {
        warn!(error = %e, "could not post analysis comment");
    }

    Ok(())
}

/// Write the four step outputs the downstream workflow jobs branch on. Output
/// failures are logged; the verdict already exists in the comment.
fn publish_outputs(cli: &Cli, assessment: &FixAssessment) {
    let outputs = [
        ("can_fix", assessment.can_fix.to_string()),
        ("issue_number", cli.issue_number.to_string()),
        ("files_to_modify", assessment.files_to_modify.join(",")),
        ("fix_type", assessment.fix_type.clone()),
    ];
    for (name, value) in outputs {
        if let Err(e) = actions::set_output(name, &value) {
            warn!(name, error = %e, "could not write workflow output");
        }
    }
}

fn analysis_prompt(issue: &Issue, comments: &[Comment], entries: &[RepoEntry]) -> String {
    let mut comments_text = String::new();
    for comment in comments {
        comments_text.push_str(&format!(
            "\nComment by {}:\n{}\n",
            comment.user.login, comment.body
        ));
    }

    let files_text = entries
        .iter()
        .filter(|entry| entry.kind == "file")
        .take(50)
        .map(|entry| entry.path.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an AI assistant for the Baubles LTS Minecraft mod. Analyze this GitHub \
         issue to determine if it can be automatically fixed.\n\n\
         ISSUE #{number}: {title}\n\
         LABELS: {labels}\n\n\
         ISSUE DESCRIPTION:\n{body}\n\n\
         COMMENTS:\n{comments_text}\n\n\
         REPOSITORY FILE STRUCTURE (partial):\n{files_text}\n\n\
         Based on this information, please determine:\n\n\
         1. Is this issue a bug that can be automatically fixed? Consider:\n\
            - Simple syntax errors\n\
            - Performance optimizations\n\
            - Memory leaks\n\
            - Configuration issues\n\
            - Compatibility issues with clear solutions\n\
            - Typo fixes\n\n\
         2. What specific files would need to be modified to fix this issue?\n\n\
         3. What would the fix involve at a high level?\n\n\
         Answer these questions and then provide a final assessment: CAN_FIX=Yes or CAN_FIX=No.\n\
         If Yes, also provide FILES_TO_MODIFY=[comma-separated list of file paths] and \
         FIX_TYPE=[simple|complex].",
        number = issue.number,
        title = issue.title,
        labels = issue.label_names().join(", "),
        body = issue.body_text(),
    )
}

fn verdict_comment(analysis: &str, can_fix: bool) -> String {
    let status = if can_fix {
        "I'll attempt to fix this issue automatically."
    } else {
        "This issue cannot be automatically fixed and will require manual intervention."
    };
    format!(
        "## Automated Fix Analysis\n\n\
         I've analyzed this issue to determine if it can be automatically fixed.\n\n\
         {analysis}\n\n\
         **Automated Fix Status:** {status}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_comment_fixable() {
        let body = verdict_comment("CAN_FIX=Yes", true);
        assert!(body.contains("I'll attempt to fix this issue automatically."));
        assert!(body.contains("CAN_FIX=Yes"));
    }

    #[test]
    fn test_verdict_comment_not_fixable() {
        let body = verdict_comment("CAN_FIX=No", false);
        assert!(body.contains("manual intervention"));
    }
}
