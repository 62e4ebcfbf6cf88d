//! Working-tree introspection used by the README updater: mod version,
//! recent history, and source-tree statistics.

use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::warn;
use walkdir::WalkDir;

/// Relative path of the file carrying the mod version constant.
const VERSION_SOURCE: &str = "src/main/java/baubles/common/Baubles.java";

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"VERSION = "(.*?)""#).expect("version regex compiles"))
}

/// Extract the current mod version from Baubles.java, degrading to
/// "unknown" when the file or the constant is missing.
pub fn current_version(root: &Path) -> String {
    let path = root.join(VERSION_SOURCE);
    match std::fs::read_to_string(&path) {
        Ok(content) => version_re()
            .captures(&content)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read version source");
            "unknown".to_string()
        }
    }
}

/// Subjects of the last `count` commits, one per line; empty when git is
/// unavailable or the directory is not a repository.
pub fn recent_commits(root: &Path, count: usize) -> String {
    let result = Command::new("git")
        .args(["log", "-n", &count.to_string(), "--pretty=format:%s"])
        .current_dir(root)
        .output();
    match result {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(output) => {
            warn!(status = ?output.status.code(), "git log failed");
            String::new()
        }
        Err(e) => {
            warn!(error = %e, "could not run git log");
            String::new()
        }
    }
}

/// Source-tree counts interpolated into the README prompt.
#[derive(Debug, Clone, Default)]
pub struct ProjectStats {
    pub java_files: usize,
    pub api_files: usize,
    pub resource_files: usize,
    pub total_lines: usize,
}

/// Walk the source tree once and count Java files, API files, resource
/// files, and total Java line count.
pub fn collect_stats(root: &Path) -> ProjectStats {
    let mut stats = ProjectStats::default();
    let source_root = root.join("src");

    for entry in WalkDir::new(&source_root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);

        if relative.starts_with("src/main/resources") {
            stats.resource_files += 1;
            continue;
        }
        if path.extension().is_some_and(|ext| ext == "java") {
            stats.java_files += 1;
            if relative.starts_with("src/main/java/baubles/api") {
                stats.api_files += 1;
            }
            if let Ok(content) = std::fs::read_to_string(path) {
                stats.total_lines += content.lines().count();
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_current_version_from_source() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            VERSION_SOURCE,
            "public class Baubles {\n    public static final String VERSION = \"1.5.2-LTS\";\n}\n",
        );
        assert_eq!(current_version(dir.path()), "1.5.2-LTS");
    }

    #[test]
    fn test_current_version_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(current_version(dir.path()), "unknown");
    }

    #[test]
    fn test_current_version_missing_constant() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), VERSION_SOURCE, "public class Baubles {}\n");
        assert_eq!(current_version(dir.path()), "unknown");
    }

    #[test]
    fn test_collect_stats_counts_by_category() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/main/java/baubles/api/IBauble.java",
            "interface IBauble {\n}\n",
        );
        write(
            dir.path(),
            "src/main/java/baubles/common/Baubles.java",
            "class Baubles {\n    int x;\n}\n",
        );
        write(dir.path(), "src/main/resources/mcmod.info", "{}\n");

        let stats = collect_stats(dir.path());
        assert_eq!(stats.java_files, 2);
        assert_eq!(stats.api_files, 1);
        assert_eq!(stats.resource_files, 1);
        assert_eq!(stats.total_lines, 5);
    }

    #[test]
    fn test_collect_stats_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let stats = collect_stats(dir.path());
        assert_eq!(stats.java_files, 0);
        assert_eq!(stats.total_lines, 0);
    }

    #[test]
    fn test_recent_commits_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(recent_commits(dir.path(), 10), "");
    }
}
