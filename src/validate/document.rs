//! Markdown section parsing for structural checks.

/// A heading-delimited section of a document.
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text as written, without the leading hashes.
    pub name: String,
    /// Zero-based line index of the heading.
    pub line: usize,
    /// Body text between this heading and the next heading of any level.
    pub body: String,
}

/// Parse a document into its heading-delimited sections.
#[must_use]
pub fn parse_sections(content: &str) -> Vec<Section> {
    let lines: Vec<&str> = content.lines().collect();
    let mut sections = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(name) = heading_text(line) else {
            continue;
        };
        let body_end = lines[idx + 1..]
            .iter()
            .position(|l| heading_text(l).is_some())
            .map_or(lines.len(), |offset| idx + 1 + offset);
        sections.push(Section {
            name: name.to_string(),
            line: idx,
            body: lines[idx + 1..body_end].join("\n"),
        });
    }

    sections
}

/// Find a section whose heading matches `name` under the tolerance rules.
#[must_use]
pub fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    let wanted = normalize_heading(name);
    sections
        .iter()
        .find(|s| normalize_heading(&s.name) == wanted)
}

/// Heading comparison key: case-insensitive, trailing punctuation stripped,
/// internal whitespace collapsed.
#[must_use]
pub fn normalize_heading(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches([':', '.', '!', '?']);
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn heading_text(line: &str) -> Option<&str> {
    let stripped = line.trim_start();
    let hashes = stripped.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &stripped[hashes..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some(rest.trim())
}
