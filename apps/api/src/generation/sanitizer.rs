//! Output sanitizing. Strips self-check lines and trailing evaluation sections.

/// Headings after which everything is internal commentary.
const SECTION_DELIMITERS: &[&str] = &[
    "### Evaluation Summary",
    "### Self-Evaluation",
    "### Rubric Score",
];

/// Self-check marker labels (after the leading `>>`).
const MARKER_LABELS: &[&str] = &[
    "user summary:",
    "model comparison:",
    "model judgement:",
    "model judgment:",
];

/// Drops self-check marker lines, truncates at the first section delimiter or
/// horizontal rule, then trims. Idempotent; returns trimmed input when nothing matches.
pub fn sanitize(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in text.lines() {
        // `lines()` strips only one `\r` before each `\n`.
        let line = line.trim_end_matches('\r');
        if is_marker_line(line) {
            continue;
        }
        if is_horizontal_rule(line) {
            break;
        }
        if let Some(pos) = SECTION_DELIMITERS
            .iter()
            .filter_map(|d| line.find(d))
            .min()
        {
            let prefix = &line[..pos];
            if !is_horizontal_rule(prefix) {
                kept.push(prefix);
            }
            break;
        }
        kept.push(line);
    }

    kept.join("\n").trim().to_string()
}

fn is_marker_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(">>")
        .map(|rest| {
            let rest = rest.trim_start().to_ascii_lowercase();
            MARKER_LABELS.iter().any(|label| rest.starts_with(label))
        })
        .unwrap_or(false)
}

/// A line of three or more `-`, `*` or `_` and nothing else.
fn is_horizontal_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|c| trimmed.chars().all(|ch| ch == *c))
}
