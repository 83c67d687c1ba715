use std::collections::HashMap;

use chrono::DateTime;
use chrono_tz::Tz;

/// Build the system instruction for one turn.
///
/// `spaces` is the cache snapshot. It is listed sorted by name and marked as
/// possibly stale.
pub fn build_system_prompt(now: DateTime<Tz>, spaces: &HashMap<String, String>) -> String {
    let mut parts = vec![
        "You are Oopsie, a personal assistant that manages the user's task list.".to_string(),
        "Tasks live in spaces. Use the tools to read and change them, never invent ids or results."
            .to_string(),
        String::new(),
        format!(
            "Today is {} and the time is {} ({}).",
            now.format("%Y-%m-%d (%A)"),
            now.format("%H:%M"),
            now.timezone().name()
        ),
        "Convert relative dates such as \"tomorrow\" or \"next Monday\" to YYYY-MM-DD before calling a tool."
            .to_string(),
    ];

    if !spaces.is_empty() {
        let mut names: Vec<(&String, &String)> = spaces.iter().collect();
        names.sort();

        parts.push(String::new());
        parts.push("Known spaces (may be out of date, call list_spaces when unsure):".to_string());
        for (name, id) in names {
            parts.push(format!("- {} (id: {})", name, id));
        }
    }

    parts.push(String::new());
    parts.push("RULES:".to_string());
    parts.push("1. Ask for confirmation before deleting a task.".to_string());
    parts.push(
        "2. If a tool returns an error, explain it briefly or retry with corrected arguments."
            .to_string(),
    );
    parts.push("3. Reply in the user's language, short and friendly.".to_string());

    parts.join("\n")
}
