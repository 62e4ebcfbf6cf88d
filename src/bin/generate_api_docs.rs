//! Generate Markdown documentation for the mod's public API from its Java
//! sources, with optional model-written usage examples.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

use baubles_bot::config::Config;
use baubles_bot::javadoc::render::{class_markdown, index_markdown};
use baubles_bot::javadoc::{clean_doc, parse_java_file, JavaClass};
use baubles_bot::llm::{ChatModel, ChatRequest, OpenAiClient};
use baubles_bot::response::strip_outer_fence;

const EXAMPLE_FALLBACK: &str = "// Example could not be generated automatically\n\
    // Please refer to the method documentation above";

const EXAMPLE_SYSTEM_PROMPT: &str = "You are an expert Java programmer with extensive \
    knowledge of Minecraft modding, particularly for Baubles API. You create concise, \
    practical code examples.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Html,
}

/// Generate API docs — renders one Markdown page per API class plus a
/// package-grouped index.
#[derive(Parser, Debug)]
#[command(name = "generate-api-docs", version, about)]
struct Cli {
    /// Output directory for documentation files
    #[arg(long)]
    output_dir: PathBuf,

    /// Paths to API source directories, comma-separated
    #[arg(long)]
    api_paths: String,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    baubles_bot::init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    if cli.format == OutputFormat::Html {
        warn!("HTML output is not implemented, generating Markdown instead");
    }

    // Documentation works without a model; examples are the only AI part.
    let model = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => Some(OpenAiClient::new(key, &config.openai)),
        Err(_) => {
            warn!("OPENAI_API_KEY not set, skipping example generation");
            None
        }
    };

    std::fs::create_dir_all(&cli.output_dir)?;

    let java_files = collect_java_files(&cli.api_paths);
    println!("Found {} Java files to process", java_files.len());

    let mut classes = Vec::new();
    for java_file in &java_files {
        let class = match parse_java_file(java_file) {
            Ok(class) => class,
            Err(e) => {
                println!(
                    "Skipping {} - could not extract class information ({e})",
                    java_file.display()
                );
                continue;
            }
        };

        let example = match &model {
            Some(model) => Some(generate_example(model, &class).await),
            None => None,
        };

        let page = class_markdown(&class, example.as_deref());
        let output_file = cli.output_dir.join(format!("{}.md", class.name));
        std::fs::write(&output_file, page)?;
        println!(
            "Generated documentation for {} in {}",
            class.name,
            output_file.display()
        );

        classes.push(class);
    }

    let index_file = cli.output_dir.join("README.md");
    std::fs::write(&index_file, index_markdown(&classes))?;
    println!("Generated API index at {}", index_file.display());

    println!("Documentation generation complete");
    Ok(())
}

/// All .java files under the comma-separated source roots.
fn collect_java_files(api_paths: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for api_path in api_paths.split(',') {
        let api_path = api_path.trim();
        if api_path.is_empty() {
            continue;
        }
        for entry in WalkDir::new(api_path).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "java")
            {
                files.push(entry.into_path());
            }
        }
    }
    files
}

/// Ask the model for a short usage example. A model failure yields a fixed
/// placeholder comment so the page structure stays intact.
async fn generate_example<M: ChatModel>(model: &M, class: &JavaClass) -> String {
    let methods_info = serde_json::to_string_pretty(
        &class
            .public_methods()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "return_type": m.return_type,
                    "parameters": m.parameters,
                    "description": m.doc,
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap_or_default();
    let fields_info = serde_json::to_string_pretty(
        &class
            .public_fields()
            .map(|f| {
                serde_json::json!({
                    "name": f.name,
                    "type": f.field_type,
                    "description": f.doc,
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap_or_default();

    let prompt = format!(
        "Generate a simple, clear example of how to use the following Java class from the \
         Baubles LTS mod API:\n\n\
         Class: {name}\n\
         Package: {package}\n\
         Type: {kind}\n\n\
         Description:\n{description}\n\n\
         Public Methods:\n{methods_info}\n\n\
         Public Fields:\n{fields_info}\n\n\
         Please create a concise, practical example that demonstrates the primary purpose \
         of this class.\n\
         Return ONLY the Java code example with proper imports, no explanation or markdown \
         formatting.\n\
         The example should be 10-20 lines of code that would actually work in a Minecraft \
         mod.",
        name = class.name,
        package = class.package.as_deref().unwrap_or(""),
        kind = class.kind.as_str(),
        description = clean_doc(&class.doc),
    );
    let request = ChatRequest::new(EXAMPLE_SYSTEM_PROMPT, prompt, 500);

    match model.complete(&request).await {
        Ok(reply) => strip_outer_fence(&reply, "java"),
        Err(e) => {
            warn!(class = %class.name, error = %e, "could not generate example");
            EXAMPLE_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_java_files_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let api = dir.path().join("api/deeper");
        fs::create_dir_all(&api).unwrap();
        fs::write(api.join("IBauble.java"), "interface IBauble {}").unwrap();
        fs::write(api.join("notes.md"), "notes").unwrap();
        fs::write(dir.path().join("api/BaubleType.java"), "enum BaubleType {}").unwrap();

        let files = collect_java_files(&dir.path().join("api").display().to_string());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "java"));
    }

    #[test]
    fn test_collect_java_files_multiple_paths() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["one", "two"] {
            let path = dir.path().join(sub);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("A.java"), "class A {}").unwrap();
        }

        let arg = format!(
            "{}, {}",
            dir.path().join("one").display(),
            dir.path().join("two").display()
        );
        assert_eq!(collect_java_files(&arg).len(), 2);
    }

    #[test]
    fn test_collect_java_files_missing_path_is_empty() {
        assert!(collect_java_files("/definitely/not/a/path").is_empty());
    }
}
