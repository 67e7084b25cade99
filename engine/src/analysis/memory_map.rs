//! Mermaid rendering of a file's dependencies

/// Render `graph TD` with one edge from `root` to each dependency
pub fn render_mermaid(root: &str, dependencies: &[String]) -> String {
    let mut diagram = String::from("graph TD\n");
    diagram.push_str(&format!("    N0[\"{}\"]\n", escape_label(root)));
    for (idx, dep) in dependencies.iter().enumerate() {
        diagram.push_str(&format!(
            "    N0 --> N{}[\"{}\"]\n",
            idx + 1,
            escape_label(dep)
        ));
    }
    diagram
}

/// Markdown document persisted as technical/dependency-map.md
pub fn render_document(root: &str, diagram: &str, generated_at: &str) -> String {
    format!(
        "# Dependency Map\n\nEntry: `{}`\nGenerated: {}\n\n```mermaid\n{}```\n",
        root, generated_at, diagram
    )
}

// Mermaid labels cannot hold raw double quotes
fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}
