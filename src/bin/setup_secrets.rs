//! Interactive one-time setup of the repository secrets the automation
//! workflows need, driven through the GitHub CLI.

use colored::Colorize;
use dialoguer::{Confirm, Input, Password};
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
enum SetupError {
    #[error("GitHub CLI (gh) not found. Please install it:\n\
             - macOS: brew install gh\n\
             - Windows: winget install -e --id GitHub.cli\n\
             - Linux: https://github.com/cli/cli/blob/trunk/docs/install_linux.md")]
    GhMissing,

    #[error("Not authenticated with GitHub CLI. Please run:\ngh auth login")]
    NotAuthenticated,

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Failed to run command: {0}")]
    Command(#[from] std::io::Error),
}

struct SecretSpec {
    name: &'static str,
    description: &'static str,
    sensitive: bool,
}

const REQUIRED_SECRETS: [SecretSpec; 1] = [SecretSpec {
    name: "OPENAI_API_KEY",
    description: "OpenAI API key for AI-assisted automation",
    sensitive: true,
}];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    println!("=== GitHub Actions Secrets Setup ===");

    if !gh_available() {
        return Err(SetupError::GhMissing.into());
    }
    if !gh_authenticated() {
        return Err(SetupError::NotAuthenticated.into());
    }

    let (owner, repo) = repo_info()?;
    println!("\nRepository: {owner}/{repo}");

    let existing = list_existing_secrets(&owner, &repo);

    for spec in &REQUIRED_SECRETS {
        if existing.iter().any(|name| name == spec.name) {
            let update = Confirm::new()
                .with_prompt(format!("Secret '{}' already exists. Update it?", spec.name))
                .default(false)
                .interact()
                .map_err(SetupError::Prompt)?;
            if !update {
                continue;
            }
        }

        println!("\n{}", spec.description);
        let value = if spec.sensitive {
            Password::new()
                .with_prompt(format!("Enter value for {}", spec.name))
                .interact()
                .map_err(SetupError::Prompt)?
        } else {
            Input::new()
                .with_prompt(format!("Enter value for {}", spec.name))
                .interact_text()
                .map_err(SetupError::Prompt)?
        };

        set_secret(&owner, &repo, spec.name, &value)?;
    }

    println!("\n{}", "Secrets setup complete!".green());
    println!("The GitHub Actions workflows should now be able to run properly.");

    Ok(())
}

fn gh_available() -> bool {
    Command::new("gh")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn gh_authenticated() -> bool {
    Command::new("gh")
        .args(["auth", "status"])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Owner and repo name from the origin remote, falling back to interactive
/// prompts when there is no usable remote.
fn repo_info() -> Result<(String, String), SetupError> {
    let remote = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string());

    if let Some(url) = remote {
        if let Some(parsed) = parse_remote(&url) {
            return Ok(parsed);
        }
        println!("Unsupported remote URL format: {url}");
    }

    let owner: String = Input::new()
        .with_prompt("Enter repository owner")
        .interact_text()?;
    let repo: String = Input::new()
        .with_prompt("Enter repository name")
        .interact_text()?;
    Ok((owner, repo))
}

/// Parse `https://github.com/owner/repo.git` and `git@github.com:owner/repo.git`
/// remote forms.
fn parse_remote(url: &str) -> Option<(String, String)> {
    let owner_repo = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("git@github.com:"))?;
    let owner_repo = owner_repo.trim_end_matches(".git");
    let (owner, repo) = owner_repo.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

fn list_existing_secrets(owner: &str, repo: &str) -> Vec<String> {
    let output = Command::new("gh")
        .args(["secret", "list", "-R", &format!("{owner}/{repo}")])
        .output();
    match output {
        Ok(output) if output.status.success() => {
            let listing = String::from_utf8_lossy(&output.stdout).into_owned();
            println!("\nExisting secrets:");
            println!("{listing}");
            parse_secret_names(&listing)
        }
        _ => Vec::new(),
    }
}

/// First column of each listing row, header skipped.
fn parse_secret_names(listing: &str) -> Vec<String> {
    listing
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Pipe the value to `gh secret set` on stdin so it never appears in the
/// process arguments.
fn set_secret(owner: &str, repo: &str, name: &str, value: &str) -> Result<(), SetupError> {
    let mut child = Command::new("gh")
        .args(["secret", "set", name, "-R", &format!("{owner}/{repo}")])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(value.as_bytes())?;
    }
    let output = child.wait_with_output()?;

    if output.status.success() {
        println!("{} {name}", "Successfully set secret:".green());
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        println!("{} {name}: {stderr}", "Failed to set secret".red());
    }
    Ok(())
}
