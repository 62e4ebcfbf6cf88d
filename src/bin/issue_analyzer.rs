//! Respond to issue activity with a model-generated analysis comment, apply
//! the labels it suggests, and surface its recommended maintainer actions.

use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing::warn;

use baubles_bot::config::{Config, Credentials};
use baubles_bot::github::{filter_known_labels, Comment, GitHubClient, Issue, RepoOverview};
use baubles_bot::llm::{complete_or, ChatRequest, OpenAiClient};
use baubles_bot::response::{recommended_actions, suggested_labels};

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a helpful assistant specializing in Minecraft \
    modding, especially the Baubles API and its performance-optimized fork, Baubles LTS. You \
    have deep knowledge of Java, Minecraft Forge 1.12.2, and common modding patterns.";

const ANALYSIS_FALLBACK: &str = "I was unable to analyze this issue automatically. \
    A maintainer will take a look as soon as possible.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum TriggerEvent {
    Issues,
    IssueComment,
    WorkflowDispatch,
    Schedule,
}

/// Issue analyzer — posts a model-generated triage comment on an issue and
/// applies the labels it suggests.
#[derive(Parser, Debug)]
#[command(name = "issue-analyzer", version, about)]
struct Cli {
    /// Repository in format owner/repo
    #[arg(long)]
    repo: String,

    /// Issue number to analyze
    #[arg(long)]
    issue_number: u64,

    /// Event that triggered this workflow
    #[arg(long, value_enum)]
    trigger_event: TriggerEvent,

    /// Action of the event (opened, edited, etc.)
    #[arg(long)]
    event_action: String,

    /// ID of the comment to respond to (for issue_comment event)
    #[arg(long)]
    comment_id: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;
    let config = Config::load()?;

    let github = GitHubClient::new(&credentials.github_token, &config.github.api_base);
    let model = OpenAiClient::new(&credentials.openai_api_key, &config.openai);

    let issue = github.issue(&cli.repo, cli.issue_number).await?;
    let comments = github.issue_comments(&cli.repo, cli.issue_number).await?;
    let overview = github.repo_overview(&cli.repo).await?;

    if !should_respond(&cli, &comments, &config.bot.login) {
        println!("Criteria for responding not met, skipping");
        return Ok(());
    }

    let prompt = analysis_prompt(&issue, &comments, &overview);
    let request = ChatRequest::new(ANALYSIS_SYSTEM_PROMPT, prompt, 2000);
    let analysis = complete_or(&model, &request, ANALYSIS_FALLBACK).await;

    let comment = format_analysis_comment(&analysis);
    match github
        .post_comment(&cli.repo, cli.issue_number, &comment)
        .await
    {
        Ok(()) => println!("{}", "Successfully posted analysis comment".green()),
        Err(e) => {
            warn!(error = %e, "could not post analysis comment");
            println!("{}", "Failed to post analysis comment".red());
            return Ok(());
        }
    }

    apply_suggested_labels(&github, &cli, &analysis).await;

    if let Some(actions) = recommended_actions(&analysis) {
        println!("Recommended actions:\n{actions}");
    }

    Ok(())
}

/// Decide whether this invocation warrants a response. Opened issues, manual
/// dispatches, stale-schedule sweeps, and addressed comments always do;
/// reopened issues only until the bot has commented once.
fn should_respond(cli: &Cli, comments: &[Comment], bot_login: &str) -> bool {
    match cli.trigger_event {
        TriggerEvent::Issues if cli.event_action == "opened" => true,
        TriggerEvent::Issues if cli.event_action == "reopened" => {
            !comments.iter().any(|c| c.user.login == bot_login)
        }
        TriggerEvent::WorkflowDispatch => true,
        TriggerEvent::Schedule => cli.event_action == "stale",
        TriggerEvent::IssueComment => cli.comment_id.is_some(),
        _ => false,
    }
}

fn analysis_prompt(issue: &Issue, comments: &[Comment], overview: &RepoOverview) -> String {
    let mut comments_text = String::new();
    for comment in comments {
        comments_text.push_str(&format!(
            "\nComment by {} on {}:\n{}\n",
            comment.user.login, comment.created_at, comment.body
        ));
    }

    let latest_version = overview
        .latest_release
        .as_ref()
        .map(|r| r.tag_name.as_str())
        .unwrap_or("unknown");

    let contributors = overview
        .contributors
        .iter()
        .map(|u| u.login.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let recent_commits = overview
        .recent_commits
        .iter()
        .map(|c| format!("- {}", c.commit.message.lines().next().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an assistant for the Baubles LTS project, which is a performance-optimized \
         fork of the Baubles mod for Minecraft Forge 1.12.2.\n\n\
         REPOSITORY: {repo_name}\n\
         DESCRIPTION: {description}\n\
         LATEST VERSION: {latest_version}\n\
         TOP CONTRIBUTORS: {contributors}\n\
         RECENT COMMITS:\n{recent_commits}\n\n\
         ISSUE #{number}: {title}\n\
         AUTHOR: {author}\n\
         CREATED: {created}\n\
         STATE: {state}\n\
         LABELS: {labels}\n\n\
         ISSUE DESCRIPTION:\n{body}\n\n\
         COMMENTS:\n{comments_text}\n\n\
         Please analyze this issue and provide:\n\n\
         1. A summary of the issue in 1-2 sentences\n\
         2. Categorization of the issue type (bug, feature request, question, etc.)\n\
         3. An assessment of the priority (critical, high, medium, low)\n\
         4. A detailed response addressing the issue\n\
         5. Suggested labels that should be applied\n\
         6. Recommended next actions for maintainers\n\n\
         Your response should be formatted in Markdown and be helpful, informative, and \
         constructive.\n\n\
         For bug reports, try to identify potential causes and solutions.\n\
         For feature requests, assess compatibility with the project goals.\n\
         For questions, provide clear and accurate answers based on your knowledge of the \
         project.",
        repo_name = overview.repository.full_name,
        description = overview.repository.description.as_deref().unwrap_or(""),
        number = issue.number,
        title = issue.title,
        author = issue.user.login,
        created = issue.created_at,
        state = issue.state,
        labels = issue.label_names().join(", "),
        body = issue.body_text(),
    )
}

fn format_analysis_comment(analysis: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    format!(
        "# AI Assistant Analysis\n\n\
         *Generated at: {timestamp}*\n\n\
         {analysis}\n\n\
         ---\n\
         This response was automatically generated by the Baubles LTS issue management \
         system.\nIf you have further questions, please let us know."
    )
}

/// Apply the labels the analysis suggested, restricted to labels the
/// repository already defines. Every failure here is logged and skipped.
async fn apply_suggested_labels(github: &GitHubClient, cli: &Cli, analysis: &str) {
    let suggested = suggested_labels(analysis);
    if suggested.is_empty() {
        return;
    }
    println!("Suggested labels: {suggested:?}");

    let existing = match github.list_labels(&cli.repo).await {
        Ok(labels) => labels,
        Err(e) => {
            warn!(error = %e, "could not fetch existing labels");
            return;
        }
    };

    let valid = filter_known_labels(&suggested, &existing);
    if valid.is_empty() {
        println!("No valid labels found to add");
        return;
    }
    if let Err(e) = github.add_labels(&cli.repo, cli.issue_number, &valid).await {
        warn!(error = %e, "could not add labels");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cli(trigger_event: TriggerEvent, event_action: &str, comment_id: Option<u64>) -> Cli {
        Cli {
            repo: "owner/repo".to_string(),
            issue_number: 1,
            trigger_event,
            event_action: event_action.to_string(),
            comment_id,
        }
    }

    fn comment_by(login: &str) -> Comment {
        Comment {
            user: baubles_bot::github::User {
                login: login.to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            body: "earlier reply".to_string(),
        }
    }

    const BOT: &str = "github-actions[bot]";

    #[test]
    fn test_responds_to_opened_issues() {
        assert!(should_respond(
            &cli(TriggerEvent::Issues, "opened", None),
            &[],
            BOT
        ));
    }

    #[test]
    fn test_ignores_edited_issues() {
        assert!(!should_respond(
            &cli(TriggerEvent::Issues, "edited", None),
            &[],
            BOT
        ));
    }

    #[test]
    fn test_responds_to_manual_dispatch() {
        assert!(should_respond(
            &cli(TriggerEvent::WorkflowDispatch, "", None),
            &[],
            BOT
        ));
    }

    #[test]
    fn test_schedule_only_for_stale_sweeps() {
        assert!(should_respond(
            &cli(TriggerEvent::Schedule, "stale", None),
            &[],
            BOT
        ));
        assert!(!should_respond(
            &cli(TriggerEvent::Schedule, "fresh", None),
            &[],
            BOT
        ));
    }

    #[test]
    fn test_reopened_only_without_prior_bot_comment() {
        let reopened = cli(TriggerEvent::Issues, "reopened", None);
        assert!(should_respond(&reopened, &[comment_by("alice")], BOT));
        assert!(!should_respond(&reopened, &[comment_by(BOT)], BOT));
    }

    #[test]
    fn test_issue_comment_requires_comment_id() {
        assert!(should_respond(
            &cli(TriggerEvent::IssueComment, "created", Some(12345)),
            &[],
            BOT
        ));
        assert!(!should_respond(
            &cli(TriggerEvent::IssueComment, "created", None),
            &[],
            BOT
        ));
    }

    #[test]
    fn test_analysis_prompt_includes_repo_context() {
        use baubles_bot::github::types::{CommitInfo, CommitMessage, Release, Repository, User};

        let issue: Issue = serde_json::from_value(serde_json::json!({
            "number": 12,
            "title": "Ring slot ignores canEquip",
            "body": "Steps to reproduce...",
            "user": {"login": "alice"},
            "state": "open",
            "created_at": "2024-03-01T12:00:00Z"
        }))
        .unwrap();
        let overview = RepoOverview {
            repository: Repository {
                full_name: "owner/baubles-lts".to_string(),
                description: Some("Performance-optimized Baubles fork".to_string()),
            },
            latest_release: Some(Release {
                tag_name: "1.5.2-LTS".to_string(),
            }),
            contributors: vec![
                User {
                    login: "alice".to_string(),
                },
                User {
                    login: "bob".to_string(),
                },
            ],
            recent_commits: vec![CommitInfo {
                commit: CommitMessage {
                    message: "Fix slot desync\n\nLonger explanation.".to_string(),
                },
            }],
        };

        let prompt = analysis_prompt(&issue, &[], &overview);
        assert!(prompt.contains("LATEST VERSION: 1.5.2-LTS"));
        assert!(prompt.contains("TOP CONTRIBUTORS: alice, bob"));
        assert!(prompt.contains("- Fix slot desync"));
        assert!(!prompt.contains("Longer explanation."));
    }

    #[test]
    fn test_format_analysis_comment_structure() {
        let body = format_analysis_comment("The crash is a slot desync.");
        assert!(body.starts_with("# AI Assistant Analysis"));
        assert!(body.contains("The crash is a slot desync."));
        assert!(body.contains("automatically generated"));
    }
}
