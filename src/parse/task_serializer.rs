use crate::model::task::{INDENT_WIDTH, Task};
use crate::parse::task_parser::DELIMITER;

/// Serialize a task to its on-disk text. Output always ends with a newline.
pub fn serialize_task(task: &Task) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n", task.title));
    out.push_str(&format!("status = \"{}\"\n", task.status));

    out.push_str(DELIMITER);
    out.push('\n');
    if !task.description.is_empty() {
        out.push_str(&task.description);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');

    for item in &task.checklist {
        out.push_str(&" ".repeat(item.indent * INDENT_WIDTH));
        out.push_str(&format!("- {} {}\n", item.checkbox(), item.text));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::CheckItem;

    #[test]
    fn test_serialize_minimal_task() {
        let task = Task::new("1-ship-it", "Ship it", "TODO");
        let text = serialize_task(&task);
        insta::assert_snapshot!(text.trim_end(), @r#"
        # Ship it
        status = "TODO"
        ---
        ---
        "#);
    }

    #[test]
    fn test_serialize_description_and_checklist() {
        let mut task = Task::new("1-notes", "Release notes", "DOING");
        task.description = "First paragraph.\n\nSecond paragraph.".to_string();
        task.checklist = vec![
            CheckItem::new("Read changelog", 0),
            CheckItem { text: "Group by area".into(), checked: true, indent: 1 },
            CheckItem::new("Fixes", 2),
        ];
        let text = serialize_task(&task);
        insta::assert_snapshot!(text.trim_end(), @r#"
        # Release notes
        status = "DOING"
        ---
        First paragraph.

        Second paragraph.
        ---
        - [ ] Read changelog
            - [x] Group by area
                - [ ] Fixes
        "#);
    }

    #[test]
    fn test_serialize_ends_with_newline() {
        let mut task = Task::new("1-a", "A", "TODO");
        task.checklist.push(CheckItem::new("x", 0));
        let text = serialize_task(&task);
        assert!(text.ends_with("- [ ] x\n"));
        assert_eq!(text.matches(DELIMITER).count(), 2);
    }
}
