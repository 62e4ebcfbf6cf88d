//! Regex-based extraction of API documentation from Java source files.
//!
//! Recovers the package declaration, the first class/interface/enum
//! declaration with its documentation block, and every method and field
//! signature with its own documentation block. The documentation lookup is
//! re-anchored per member: the pattern is rebuilt from that member's literal
//! (escaped) signature, so a block is only attributed to the member it
//! directly precedes.

pub mod render;
pub mod types;

pub use types::{ClassKind, JavaClass, JavaField, JavaMethod, Visibility};

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JavadocError {
    #[error("Failed to read source file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("No class, interface, or enum declaration found")]
    NoClassDeclaration,
}

fn package_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"package\s+([\w.]+);").expect("package regex compiles"))
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:(public|private|protected)\s+)?(class|interface|enum)\s+(\w+)")
            .expect("class regex compiles")
    })
}

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(public|private|protected)\s+(?:static\s+)?(?:final\s+)?(?:<.*?>)?\s*(\w+(?:<.*?>)?(?:\[\])?)\s+(\w+)\s*\((.*?)\)(?:\s+throws\s+[\w,\s.]+)?(?:\s*\{|\s*;)",
        )
        .expect("method regex compiles")
    })
}

fn field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(public|private|protected)\s+(?:static\s+)?(?:final\s+)?(\w+(?:<.*?>)?(?:\[\])?)\s+(\w+)\s*(?:=\s*[^;]+)?;",
        )
        .expect("field regex compiles")
    })
}

pub fn parse_java_file(path: &Path) -> Result<JavaClass, JavadocError> {
    let content = std::fs::read_to_string(path)?;
    parse_java_source(&content)
}

/// Parse one Java source file into a transient class record.
pub fn parse_java_source(content: &str) -> Result<JavaClass, JavadocError> {
    let package = package_re()
        .captures(content)
        .map(|caps| caps[1].to_string());

    let class_caps = class_re()
        .captures(content)
        .ok_or(JavadocError::NoClassDeclaration)?;
    let kind = ClassKind::from_token(&class_caps[2]);
    let name = class_caps[3].to_string();

    // The comment body is matched with ((?:[^*]|\*+[^*/])*) so a lookup can
    // never span from an earlier block across code to this declaration.
    let class_doc_pattern = format!(
        r"/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*(?:public|private|protected)?\s*(?:class|interface|enum)\s+{}",
        regex::escape(&name)
    );
    let doc = doc_capture(content, &class_doc_pattern);

    let mut methods = Vec::new();
    for caps in method_re().captures_iter(content) {
        let visibility_token = &caps[1];
        let return_type = caps[2].to_string();
        let method_name = caps[3].to_string();
        let parameters = caps[4].trim().to_string();

        // Re-anchor the doc lookup on this member's own signature.
        let doc_pattern = format!(
            r"/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*{}\s+(?:static\s+)?(?:final\s+)?(?:<.*?>)?\s*{}\s+{}\s*\(",
            regex::escape(visibility_token),
            regex::escape(&return_type),
            regex::escape(&method_name)
        );

        methods.push(JavaMethod {
            visibility: Visibility::from_token(visibility_token),
            return_type,
            name: method_name,
            parameters,
            doc: doc_capture(content, &doc_pattern),
        });
    }

    let mut fields = Vec::new();
    for caps in field_re().captures_iter(content) {
        let visibility_token = &caps[1];
        let field_type = caps[2].to_string();
        let field_name = caps[3].to_string();

        let doc_pattern = format!(
            r"/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*{}\s+(?:static\s+)?(?:final\s+)?{}\s+{}",
            regex::escape(visibility_token),
            regex::escape(&field_type),
            regex::escape(&field_name)
        );

        fields.push(JavaField {
            visibility: Visibility::from_token(visibility_token),
            field_type,
            name: field_name,
            doc: doc_capture(content, &doc_pattern),
        });
    }

    Ok(JavaClass {
        package,
        kind,
        name,
        doc,
        methods,
        fields,
    })
}

/// Run a freshly built doc-lookup pattern, degrading to empty text when the
/// pattern doesn't match (a member with no documentation block).
fn doc_capture(content: &str, pattern: &str) -> String {
    Regex::new(pattern)
        .ok()
        .and_then(|re| re.captures(content).map(|caps| caps[1].trim().to_string()))
        .unwrap_or_default()
}

fn tag_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+\s+[^\n]*").expect("tag line regex compiles"))
}

fn star_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\*\s*").expect("star prefix regex compiles"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex compiles"))
}

fn param_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@param\s+(\w+)\s+([^\n]*)").expect("param regex compiles"))
}

fn return_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@return\s+([^\n]*)").expect("return regex compiles"))
}

fn throws_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@throws\s+(\w+)\s+([^\n]*)").expect("throws regex compiles"))
}

/// Strip tag lines and comment decoration from a Javadoc block, collapsing it
/// to one line of prose.
pub fn clean_doc(doc: &str) -> String {
    let without_tags = tag_line_re().replace_all(doc, "");
    let without_stars = star_prefix_re().replace_all(&without_tags, "\n");
    let collapsed = whitespace_re().replace_all(&without_stars, " ");
    collapsed.trim().trim_start_matches('*').trim_start().to_string()
}

/// A documented name/description pair from `@param` or `@throws`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDoc {
    pub name: String,
    pub description: String,
}

pub fn param_docs(doc: &str) -> Vec<TagDoc> {
    param_tag_re()
        .captures_iter(doc)
        .map(|caps| TagDoc {
            name: caps[1].to_string(),
            description: caps[2].trim().to_string(),
        })
        .collect()
}

pub fn return_doc(doc: &str) -> Option<String> {
    return_tag_re()
        .captures(doc)
        .map(|caps| caps[1].trim().to_string())
}

pub fn throws_docs(doc: &str) -> Vec<TagDoc> {
    throws_tag_re()
        .captures_iter(doc)
        .map(|caps| TagDoc {
            name: caps[1].to_string(),
            description: caps[2].trim().to_string(),
        })
        .collect()
}
