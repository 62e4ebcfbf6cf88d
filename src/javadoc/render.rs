//! Markdown rendering for parsed API classes: one document per class plus a
//! package-grouped index.

use std::collections::BTreeMap;

use super::{clean_doc, param_docs, return_doc, throws_docs, JavaClass};

/// Render the documentation page for one class. Only public members appear;
/// parsed non-public members are discarded here.
pub fn class_markdown(class: &JavaClass, example: Option<&str>) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", class.name));
    if let Some(package) = &class.package {
        md.push_str(&format!("**Package:** `{package}`\n\n"));
    }
    md.push_str(&format!("**Type:** {}\n\n", class.kind.as_str()));

    let description = clean_doc(&class.doc);
    if !description.is_empty() {
        md.push_str(&format!("## Description\n\n{description}\n\n"));
    }

    if let Some(example) = example {
        md.push_str(&format!("## Example Usage\n\n```java\n{example}\n```\n\n"));
    }

    let fields: Vec<_> = class.public_fields().collect();
    if !fields.is_empty() {
        md.push_str("## Fields\n\n");
        for field in fields {
            md.push_str(&format!("### {}\n\n", field.name));
            md.push_str(&format!("**Type:** `{}`\n\n", field.field_type));
            let doc = clean_doc(&field.doc);
            if !doc.is_empty() {
                md.push_str(&format!("{doc}\n\n"));
            }
        }
    }

    let methods: Vec<_> = class.public_methods().collect();
    if !methods.is_empty() {
        md.push_str("## Methods\n\n");
        for method in methods {
            md.push_str(&format!("### {}\n\n", method.name));
            md.push_str(&format!(
                "```java\n{} {} {}({})\n```\n\n",
                method.visibility.as_str(),
                method.return_type,
                method.name,
                method.parameters
            ));

            let main_doc = clean_doc(&method.doc);
            if !main_doc.is_empty() {
                md.push_str(&format!("{main_doc}\n\n"));
            }

            let params = param_docs(&method.doc);
            if !params.is_empty() {
                md.push_str("**Parameters:**\n\n");
                for param in params {
                    md.push_str(&format!("- `{}`: {}\n", param.name, param.description));
                }
                md.push('\n');
            }

            if let Some(returns) = return_doc(&method.doc) {
                if !method.return_type.eq_ignore_ascii_case("void") {
                    md.push_str(&format!("**Returns:** {returns}\n\n"));
                }
            }

            let throws = throws_docs(&method.doc);
            if !throws.is_empty() {
                md.push_str("**Throws:**\n\n");
                for exc in throws {
                    md.push_str(&format!("- `{}`: {}\n", exc.name, exc.description));
                }
                md.push('\n');
            }
        }
    }

    md
}

/// Render the index document linking every generated class page, grouped by
/// package, from the already-parsed class records.
pub fn index_markdown(classes: &[JavaClass]) -> String {
    let mut by_package: BTreeMap<&str, Vec<&JavaClass>> = BTreeMap::new();
    for class in classes {
        by_package
            .entry(class.package.as_deref().unwrap_or("(default package)"))
            .or_default()
            .push(class);
    }

    let mut md = String::new();
    md.push_str("# Baubles LTS API Documentation\n\n");
    md.push_str(
        "This is the API documentation for Baubles LTS, a performance-optimized fork of the \
         Baubles mod for Minecraft Forge 1.12.2.\n\n",
    );
    md.push_str("## API Classes\n\n");

    for (package, mut package_classes) in by_package {
        md.push_str(&format!("### {package}\n\n"));
        package_classes.sort_by(|a, b| a.name.cmp(&b.name));
        for class in package_classes {
            md.push_str(&format!("- [{name}]({name}.md)\n", name = class.name));
        }
        md.push('\n');
    }

    md.push_str("\n## Integration Guide\n\n");
    md.push_str(
        "Baubles LTS is designed to be a drop-in replacement for the original Baubles mod. \
         It maintains complete API compatibility while offering significantly improved \
         performance.\n\n",
    );
    md.push_str(
        "To integrate with Baubles LTS, follow the same API patterns as with the original \
         Baubles, but benefit from enhanced performance and memory usage.\n\n",
    );
    md.push_str("Refer to the class documentation above for detailed API usage examples.\n");

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::javadoc::parse_java_source;
    use crate::javadoc::types::{ClassKind, JavaClass};

    const SAMPLE: &str = include_str!("../../tests/fixtures/SampleBauble.java");

    #[test]
    fn test_class_markdown_renders_public_members_only() {
        let class = parse_java_source(SAMPLE).unwrap();
        let md = class_markdown(&class, None);

        assert!(md.contains("# SampleBauble"));
        assert!(md.contains("**Package:** `baubles.api`"));
        assert!(md.contains("**Type:** class"));
        assert!(md.contains("### onEquipped"));
        assert!(md.contains("### getSlot"));
        assert!(md.contains("### TYPE_NAME"));
        // Non-public members parsed but never rendered.
        assert!(!md.contains("slotId\n"));
        assert!(!md.contains("### resetSlot"));
    }

    #[test]
    fn test_minimal_class_renders_method_and_omits_private_field() {
        let source = "package a.b;\npublic class Tiny {\n\
                      private int counter;\n\
                      public int count() { return counter; }\n}\n";
        let class = parse_java_source(source).unwrap();
        let md = class_markdown(&class, None);
        assert!(md.contains("### count"));
        assert!(!md.contains("## Fields"));
        assert!(!md.contains("counter\n"));
    }

    #[test]
    fn test_class_markdown_with_example() {
        let class = parse_java_source(SAMPLE).unwrap();
        let md = class_markdown(&class, Some("SampleBauble b = new SampleBauble(0);"));
        assert!(md.contains("## Example Usage"));
        assert!(md.contains("```java\nSampleBauble b = new SampleBauble(0);\n```"));
    }

    #[test]
    fn test_class_markdown_param_and_return_sections() {
        let class = parse_java_source(SAMPLE).unwrap();
        let md = class_markdown(&class, None);
        assert!(md.contains("- `player`: the wearer"));
        assert!(md.contains("**Returns:** the zero-based slot index"));
    }

    #[test]
    fn test_void_method_has_no_returns_section() {
        let source = "public class V {\n\
                      /**\n * Runs.\n * @return nothing useful\n */\n\
                      public void run() { }\n}\n";
        let class = parse_java_source(source).unwrap();
        let md = class_markdown(&class, None);
        assert!(!md.contains("**Returns:**"));
    }

    #[test]
    fn test_index_groups_by_package_and_sorts() {
        let mk = |package: Option<&str>, name: &str| JavaClass {
            package: package.map(str::to_string),
            kind: ClassKind::Class,
            name: name.to_string(),
            doc: String::new(),
            methods: vec![],
            fields: vec![],
        };
        let classes = vec![
            mk(Some("baubles.common"), "Baubles"),
            mk(Some("baubles.api"), "IBauble"),
            mk(Some("baubles.api"), "BaubleType"),
            mk(None, "Loose"),
        ];
        let md = index_markdown(&classes);

        assert!(md.contains("### baubles.api"));
        assert!(md.contains("### baubles.common"));
        assert!(md.contains("### (default package)"));
        assert!(md.contains("- [BaubleType](BaubleType.md)"));

        let api_pos = md.find("### baubles.api").unwrap();
        let common_pos = md.find("### baubles.common").unwrap();
        assert!(api_pos < common_pos);

        let bauble_type = md.find("[BaubleType]").unwrap();
        let ibauble = md.find("[IBauble]").unwrap();
        assert!(bauble_type < ibauble);
    }

    #[test]
    fn test_index_contains_integration_guide() {
        let md = index_markdown(&[]);
        assert!(md.contains("## Integration Guide"));
        assert!(md.contains("drop-in replacement"));
    }
}
