//! Scan recent open issues, ask the model which ones look automatically
//! fixable, and hand the eligible ones to the auto-fix workflow.

use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing::{info, warn};

use baubles_bot::config::{Config, Credentials};
use baubles_bot::github::{GitHubClient, Issue};
use baubles_bot::llm::{complete_or, ChatModel, ChatRequest, OpenAiClient};

/// Labels that mark an issue as already routed, by this tool or by a human.
const SETTLED_LABELS: [&str; 2] = ["auto-fix", "needs-human-review"];

const EVAL_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that specializes in \
    Minecraft mod development. You evaluate if issues can be automatically fixed.";

/// Find fixable issues — scans recent open issues and triggers the auto-fix
/// workflow for the ones that look automatically fixable.
#[derive(Parser, Debug)]
#[command(name = "find-fixable-issues", version, about)]
struct Cli {
    /// Repository in format owner/repo
    #[arg(long)]
    repo: String,

    /// Maximum number of issues to process
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Consider issues from the last N days
    #[arg(long, default_value_t = 30)]
    days: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;
    let config = Config::load()?;

    let github = GitHubClient::new(&credentials.github_token, &config.github.api_base);
    let model = OpenAiClient::new(&credentials.openai_api_key, &config.openai);

    let issues = github.open_issues(&cli.repo, cli.days, cli.limit).await?;
    println!("Found {} open issues to evaluate", issues.len());

    for issue in &issues {
        println!("Evaluating issue #{}: {}", issue.number, issue.title);

        if is_settled(issue) {
            info!(number = issue.number, "issue already routed, skipping");
            continue;
        }

        // Rate-limit pacing between the fetch and the model call.
        tokio::time::sleep(Duration::from_secs(1)).await;

        let fixable = evaluate_fixability(&model, issue).await;
        let verdict = if fixable {
            "fixable".green()
        } else {
            "needs human review".yellow()
        };
        println!("Issue #{}: {verdict}", issue.number);

        if fixable {
            route_fixable(&github, &config, &cli.repo, issue.number).await;
        } else {
            route_unfixable(&github, &cli.repo, issue.number).await;
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Ok(())
}

fn is_settled(issue: &Issue) -> bool {
    issue
        .label_names()
        .iter()
        .any(|name| SETTLED_LABELS.contains(name))
}

/// Ask the model for a one-word fixability verdict. A model failure counts as
/// "No": an issue is never routed to auto-fix on a guess.
async fn evaluate_fixability<M: ChatModel>(model: &M, issue: &Issue) -> bool {
    let prompt = format!(
        "You are an AI assistant for the Baubles LTS Minecraft mod. Analyze this GitHub \
         issue to determine if it can be automatically fixed.\n\n\
         ISSUE #{number}: {title}\n\
         ISSUE DESCRIPTION:\n{body}\n\n\
         Based on this information, determine if this issue meets these criteria:\n\
         1. Is it a clear bug report or performance issue?\n\
         2. Is the issue well-described with enough detail to understand the problem?\n\
         3. Does it seem like a simple fix that could be implemented with just a few lines of code change?\n\
         4. Is it a specific technical issue rather than a feature request or user confusion?\n\
         5. Has the issue been reproduced or verified by multiple users?\n\n\
         Answer ONLY YES or NO, with no additional explanation.",
        number = issue.number,
        title = issue.title,
        body = issue.body_text(),
    );

    let request = ChatRequest::new(EVAL_SYSTEM_PROMPT, prompt, 5);
    let reply = complete_or(model, &request, "No").await;
    reply.trim().eq_ignore_ascii_case("yes")
}

/// Label, comment, and dispatch the follow-up workflow. Each side effect is
/// attempted independently; a failure is logged and the rest proceed.
async fn route_fixable(github: &GitHubClient, config: &Config, repo: &str, number: u64) {
    if let Err(e) = github
        .add_labels(repo, number, &["auto-fix".to_string()])
        .await
    {
        warn!(number, error = %e, "could not add auto-fix label");
    } else {
        println!("Added auto-fix label to issue #{number}");
    }

    let body = "## Automated Fix Eligibility\n\n\
        I've analyzed this issue and determined that it may be eligible for an automated fix.\n\
        I'm adding the `auto-fix` label to this issue, and our automation system will attempt \
        to generate a fix.\n\n\
        If a fix can be generated, it will be submitted as a pull request for review.";
    if let Err(e) = github.post_comment(repo, number, body).await {
        warn!(number, error = %e, "could not post eligibility comment");
    } else {
        println!("Posted fixability comment to issue #{number}");
    }

    let inputs = serde_json::json!({ "issue_number": number.to_string() });
    if let Err(e) = github
        .dispatch_workflow(repo, "auto-fix.yml", &config.bot.workflow_ref, inputs)
        .await
    {
        warn!(number, error = %e, "could not dispatch auto-fix workflow");
    } else {
        println!("Triggered auto-fix workflow for issue #{number}");
    }
}

async fn route_unfixable(github: &GitHubClient, repo: &str, number: u64) {
    if let Err(e) = github
        .add_labels(repo, number, &["needs-human-review".to_string()])
        .await
    {
        warn!(number, error = %e, "could not add needs-human-review label");
    }

    let body = "## Automated Fix Eligibility\n\n\
        I've analyzed this issue and determined that it likely requires manual intervention.\n\
        The issue appears to be too complex or lacks sufficient details for an automated fix.\n\n\
        A human developer will need to review this issue. Thank you for your patience.";
    if let Err(e) = github.post_comment(repo, number, body).await {
        warn!(number, error = %e, "could not post review comment");
    } else {
        println!("Posted not fixable comment to issue #{number}");
    }
}
