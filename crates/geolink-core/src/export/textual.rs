//! Notation text generation

use crate::component::{Component, ComponentTree};
use crate::constants::{
    CHILDREN_FEATURE, COMPONENT_DEFINITION, CONTEXT_DEFINITION, POSE_ATTRIBUTES,
    SOURCE_URL_ATTRIBUTE, TYPE_ID_ATTRIBUTE,
};

use super::ExportOptions;

const KEYWORDS: [&str; 13] = [
    "package",
    "import",
    "part",
    "def",
    "attribute",
    "subsets",
    "redefines",
    "specializes",
    "public",
    "private",
    "protected",
    "abstract",
    "connection",
];

/// Caller guarantees `root_name` is in the tree
pub(super) fn generate_notation_string(
    tree: &ComponentTree,
    root_name: &str,
    options: &ExportOptions,
) -> String {
    let pad = |level: usize| " ".repeat(level * options.indent);
    let mut text = String::new();

    text.push_str(&format!("package {} {{\n", quote_name(&options.package_name)));

    // Type definitions for the recognized attribute set
    text.push_str(&format!("{}part def {COMPONENT_DEFINITION} {{\n", pad(1)));
    for attribute in POSE_ATTRIBUTES
        .into_iter()
        .chain([TYPE_ID_ATTRIBUTE, SOURCE_URL_ATTRIBUTE])
    {
        text.push_str(&format!("{}attribute {attribute};\n", pad(2)));
    }
    text.push_str(&format!(
        "{}part {CHILDREN_FEATURE}: {COMPONENT_DEFINITION}[0..*];\n",
        pad(2)
    ));
    text.push_str(&format!("{}}}\n\n", pad(1)));

    text.push_str(&format!("{}part def {CONTEXT_DEFINITION} {{\n", pad(1)));
    if let Some(root) = tree.get(root_name) {
        text.push_str(&format!(
            "{}part {} : {COMPONENT_DEFINITION} {{\n",
            pad(2),
            quote_name(&root.name)
        ));
        write_component_recursive(&mut text, tree, root, 3, options);
        text.push_str(&format!("{}}}\n", pad(2)));
    }
    text.push_str(&format!("{}}}\n", pad(1)));

    text.push_str("}\n");
    text
}

/// Write a component's attributes and nested children at `level`
fn write_component_recursive(
    text: &mut String,
    tree: &ComponentTree,
    component: &Component,
    level: usize,
    options: &ExportOptions,
) {
    let indent = " ".repeat(level * options.indent);

    let [tx, ty, tz] = component.translation.to_array();
    let [rx, ry, rz] = component.rotation.to_array();
    for (name, value) in POSE_ATTRIBUTES.iter().zip([tx, ty, tz, rx, ry, rz]) {
        text.push_str(&format!("{indent}attribute :>> {name} = {value:?};\n"));
    }
    text.push_str(&format!(
        "{indent}attribute :>> {TYPE_ID_ATTRIBUTE} = {};\n",
        component.type_id
    ));
    if let Some(source) = &component.source {
        text.push_str(&format!(
            "{indent}attribute :>> {SOURCE_URL_ATTRIBUTE} = {};\n",
            quote_text(source)
        ));
    }

    for child_name in tree.children(&component.name) {
        let Some(child) = tree.get(child_name) else {
            continue;
        };
        text.push_str(&format!(
            "\n{indent}part {} subsets {CHILDREN_FEATURE} {{\n",
            quote_name(&child.name)
        ));
        write_component_recursive(text, tree, child, level + 1, options);
        text.push_str(&format!("{indent}}}\n"));
    }
}

/// Render a name, quoting it when it is not a plain identifier
pub fn quote_name(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name);
    if plain {
        name.to_string()
    } else {
        format!("'{}'", escape(name, '\''))
    }
}

/// Render text as a double-quoted string literal
pub fn quote_text(text: &str) -> String {
    format!("\"{}\"", escape(text, '"'))
}

/// Backslash-escape `quote` and backslash itself
fn escape(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == quote || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    #[test]
    fn test_quote_name() {
        assert_eq!(quote_name("nx00001"), "nx00001");
        assert_eq!(quote_name("left wheel"), "'left wheel'");
        assert_eq!(quote_name("1st"), "'1st'");
        assert_eq!(quote_name("part"), "'part'");
        assert_eq!(quote_name("driver's seat"), r"'driver\'s seat'");
        assert_eq!(quote_name(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_source_url_is_escaped() {
        let mut tree = ComponentTree::new();
        tree.insert(
            Component::new("r", 1).with_source(r#"https://example.com/?n="q""#),
            None,
        )
        .unwrap();
        let text = generate_notation_string(&tree, "r", &ExportOptions::default());
        assert!(text.contains(r#"attribute :>> onshape_url = "https://example.com/?n=\"q\"";"#));
    }

    #[test]
    fn test_layout() {
        let mut tree = ComponentTree::new();
        tree.create("root", 0, DVec3::ZERO, DVec3::ZERO, None).unwrap();
        tree.insert(
            Component::new("child", 2)
                .with_pose(DVec3::new(1.5, 0.0, -2.0), DVec3::new(0.0, 0.25, 0.0))
                .with_source("https://cad.onshape.com/documents/a/w/b/e/c"),
            Some("root"),
        )
        .unwrap();

        let text = generate_notation_string(&tree, "root", &ExportOptions::default());
        let expected = r#"package MyStructure {
    part def Component {
        attribute tx;
        attribute ty;
        attribute tz;
        attribute rx;
        attribute ry;
        attribute rz;
        attribute typeID;
        attribute onshape_url;
        part children: Component[0..*];
    }

    part def Context {
        part root : Component {
            attribute :>> tx = 0.0;
            attribute :>> ty = 0.0;
            attribute :>> tz = 0.0;
            attribute :>> rx = 0.0;
            attribute :>> ry = 0.0;
            attribute :>> rz = 0.0;
            attribute :>> typeID = 0;

            part child subsets children {
                attribute :>> tx = 1.5;
                attribute :>> ty = 0.0;
                attribute :>> tz = -2.0;
                attribute :>> rx = 0.0;
                attribute :>> ry = 0.25;
                attribute :>> rz = 0.0;
                attribute :>> typeID = 2;
                attribute :>> onshape_url = "https://cad.onshape.com/documents/a/w/b/e/c";
            }
        }
    }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_full_precision_floats() {
        let mut tree = ComponentTree::new();
        tree.create("r", 1, DVec3::new(0.1 + 0.2, 1e-300, 0.0), DVec3::ZERO, None)
            .unwrap();
        let text = generate_notation_string(&tree, "r", &ExportOptions::default());
        assert!(text.contains("attribute :>> tx = 0.30000000000000004;"));
        assert!(text.contains("attribute :>> ty = 1e-300;"));
    }
}
