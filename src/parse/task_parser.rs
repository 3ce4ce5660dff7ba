use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::{CheckItem, INDENT_WIDTH, Task};

/// Line that opens and closes the description block
pub const DELIMITER: &str = "---";

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^status\s*=\s*"(.*)"\s*$"#).expect("valid status pattern"));

/// Why a task file could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("file is empty")]
    EmptyFile,
    #[error("line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },
    #[error("line {line}: expected `---` delimiter")]
    MissingDelimiter { line: usize },
}

/// Which part of the file the scanner is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Status,
    Opening,
    Description,
    Checklist,
}

/// Decode a task file. The returned task has no identity or location; the
/// store attaches those from the file name.
///
/// Layout, in order: `# <title>`, `status = "<value>"`, `---`, description,
/// `---`, checklist lines. Blank lines between the header lines are allowed.
pub fn parse_task(text: &str) -> Result<Task, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut task = Task::new(String::new(), String::new(), String::new());
    let mut section = Section::Title;
    let mut description: Vec<&str> = Vec::new();
    let mut last_line = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let blank = line.trim().is_empty();

        match section {
            Section::Title => {
                if blank {
                    continue;
                }
                task.title = parse_title(line).ok_or_else(|| ParseError::MalformedHeader {
                    line: line_no,
                    reason: "expected `# <title>` heading".to_string(),
                })?;
                section = Section::Status;
            }
            Section::Status => {
                if blank {
                    continue;
                }
                task.status = parse_status(line).ok_or_else(|| ParseError::MalformedHeader {
                    line: line_no,
                    reason: "expected `status = \"<value>\"`".to_string(),
                })?;
                section = Section::Opening;
            }
            Section::Opening => {
                if blank {
                    continue;
                }
                if !is_delimiter(line) {
                    return Err(ParseError::MissingDelimiter { line: line_no });
                }
                section = Section::Description;
            }
            Section::Description => {
                if is_delimiter(line) {
                    section = Section::Checklist;
                } else {
                    description.push(line);
                }
            }
            Section::Checklist => {
                if let Some(item) = parse_check_item(line) {
                    task.checklist.push(item);
                }
            }
        }
    }

    match section {
        Section::Title | Section::Status => Err(ParseError::MalformedHeader {
            line: last_line + 1,
            reason: "unexpected end of file in header".to_string(),
        }),
        Section::Opening | Section::Description => {
            Err(ParseError::MissingDelimiter { line: last_line + 1 })
        }
        Section::Checklist => {
            task.description = trim_blank_lines(&description);
            Ok(task)
        }
    }
}

/// `# Title` → `Title`. A `##` heading is not a task title.
fn parse_title(line: &str) -> Option<String> {
    let rest = line.strip_prefix('#')?;
    if rest.starts_with('#') {
        return None;
    }
    Some(rest.trim().to_string())
}

/// `status = "DOING"` → `DOING`
fn parse_status(line: &str) -> Option<String> {
    STATUS_RE
        .captures(line.trim_start())
        .map(|caps| caps[1].to_string())
}

/// A `---` line, ignoring trailing whitespace
pub fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Join description lines, dropping leading and trailing blank lines
pub fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Parse a checklist line. Anything without a `[ ]` / `[x]` box is skipped,
/// as are boxes with no text after them.
fn parse_check_item(line: &str) -> Option<CheckItem> {
    let unchecked = line.find("[ ]");
    let checked = [line.find("[x]"), line.find("[X]")].into_iter().flatten().min();
    let (marker_pos, is_checked) = match (unchecked, checked) {
        (Some(u), Some(c)) if c < u => (c, true),
        (Some(u), _) => (u, false),
        (None, Some(c)) => (c, true),
        (None, None) => return None,
    };

    let leading = count_indent(line);
    let content = &line[leading..];
    let text = ["- [ ] ", "- [x] ", "- [X] "]
        .iter()
        .find_map(|prefix| content.strip_prefix(prefix))
        .unwrap_or_else(|| line[marker_pos + 3..].trim_start());

    if text.trim().is_empty() {
        return None;
    }

    Some(CheckItem {
        text: text.to_string(),
        checked: is_checked,
        indent: leading / INDENT_WIDTH,
    })
}

/// Count leading spaces
fn count_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_task() {
        let task = parse_task("# Ship it\nstatus = \"TODO\"\n---\n---\n").unwrap();
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.status, "TODO");
        assert_eq!(task.description, "");
        assert!(task.checklist.is_empty());
    }

    #[test]
    fn test_parse_full_task() {
        let input = "\
# Write release notes
status = \"DOING\"
---
Collect the changes since 0.3.

Ask for review.
---
- [x] Read the changelog
    - [ ] Group by area
        - [x] Fixes
- [ ] Publish
";
        let task = parse_task(input).unwrap();
        assert_eq!(task.title, "Write release notes");
        assert_eq!(task.status, "DOING");
        assert_eq!(task.description, "Collect the changes since 0.3.\n\nAsk for review.");
        assert_eq!(
            task.checklist,
            vec![
                CheckItem { text: "Read the changelog".into(), checked: true, indent: 0 },
                CheckItem { text: "Group by area".into(), checked: false, indent: 1 },
                CheckItem { text: "Fixes".into(), checked: true, indent: 2 },
                CheckItem { text: "Publish".into(), checked: false, indent: 0 },
            ]
        );
    }

    #[test]
    fn test_blank_lines_around_header_are_allowed() {
        let task = parse_task("\n\n# Title\n\nstatus = \"TODO\"\n\n---\n\n  body\n\n---\n").unwrap();
        assert_eq!(task.title, "Title");
        assert_eq!(task.description, "  body");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_task(""), Err(ParseError::EmptyFile));
        assert_eq!(parse_task("  \n\n\t\n"), Err(ParseError::EmptyFile));
    }

    #[test]
    fn test_missing_heading() {
        let err = parse_task("status = \"TODO\"\n---\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { line: 1, .. }));
    }

    #[test]
    fn test_subheading_is_not_a_title() {
        let err = parse_task("## Title\nstatus = \"TODO\"\n---\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { line: 1, .. }));
    }

    #[test]
    fn test_missing_status() {
        let err = parse_task("# Title\n---\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { line: 2, .. }));

        let err = parse_task("# Title\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
    }

    #[test]
    fn test_unquoted_status_is_rejected() {
        let err = parse_task("# Title\nstatus = TODO\n---\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_status_spacing_is_flexible() {
        let task = parse_task("# T\nstatus=\"DONE\"\n---\n---\n").unwrap();
        assert_eq!(task.status, "DONE");
    }

    #[test]
    fn test_delimiters_are_required() {
        assert_eq!(
            parse_task("# Title\nstatus = \"TODO\"\n"),
            Err(ParseError::MissingDelimiter { line: 3 })
        );
        assert_eq!(
            parse_task("# Title\nstatus = \"TODO\"\nsome text\n---\n"),
            Err(ParseError::MissingDelimiter { line: 3 })
        );
        assert_eq!(
            parse_task("# Title\nstatus = \"TODO\"\n---\nnever closed\n"),
            Err(ParseError::MissingDelimiter { line: 5 })
        );
    }

    #[test]
    fn test_checklist_skips_noise() {
        let input = "\
# T
status = \"TODO\"
---
---

random note
- [ ] first

* not a box
- [x] second
- []
- [ ]
";
        let task = parse_task(input).unwrap();
        let texts: Vec<&str> = task.checklist.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_checked_state_comes_from_first_box() {
        let input = "# T\nstatus = \"TODO\"\n---\n---\n- [ ] mention [x] inline\n";
        let task = parse_task(input).unwrap();
        assert!(!task.checklist[0].checked);
        assert_eq!(task.checklist[0].text, "mention [x] inline");
    }

    #[test]
    fn test_box_without_dash_prefix() {
        let input = "# T\nstatus = \"TODO\"\n---\n---\n  * [X] starred\n";
        let task = parse_task(input).unwrap();
        assert_eq!(task.checklist[0].text, "starred");
        assert!(task.checklist[0].checked);
        assert_eq!(task.checklist[0].indent, 0);
    }

    #[test]
    fn test_indent_rounds_down() {
        let input = "# T\nstatus = \"TODO\"\n---\n---\n      - [ ] six spaces\n";
        let task = parse_task(input).unwrap();
        assert_eq!(task.checklist[0].indent, 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let task = parse_task("# T\r\nstatus = \"TODO\"\r\n---\r\nbody\r\n---\r\n- [ ] a\r\n").unwrap();
        assert_eq!(task.description, "body");
        assert_eq!(task.checklist[0].text, "a");
    }

    #[test]
    fn test_arbitrary_input_never_panics() {
        let samples = [
            "#",
            "# \u{00e9}\u{0301}\nstatus = \"\u{1F600}\"\n---\n---\n- [ ] \u{4e2d}",
            "# a\nstatus = \"\n---",
            "[ ][x][X]",
            "# a\nstatus = \"x\"\n---\n---\n[x]",
            "\u{feff}# bom",
            "# a\nstatus = \"b\"\n---\n---\n    - [ ]    \n",
        ];
        for sample in samples {
            let _ = parse_task(sample);
        }
    }
}
