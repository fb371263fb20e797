/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Create { key: &'a str, json: &'a str },
    Read { key: &'a str },
    Update { key: &'a str, json: &'a str },
    Delete { key: &'a str },
    List,
    Save,
    Clear,
    Help,
    Exit,
    /// Blank line.
    Empty,
    /// Known command with missing arguments; carries the usage text.
    Usage(&'static str),
    Unknown,
}

pub const HELP: &str = "Available commands:
  create <key> <json>   - Create a new JSON object.
  read <key>            - Read a JSON object.
  update <key> <json>   - Update an existing JSON object.
  delete <key>          - Delete a JSON object.
  list                  - List all keys.
  save                  - Write the store to disk.
  clear                 - Remove every key.
  exit                  - Exit the CLI.";

/// First whitespace-delimited word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Parse a line. Everything after the key is taken as the JSON text, so
/// values may contain spaces.
pub fn parse(line: &str) -> Command<'_> {
    let (word, rest) = split_word(line);
    if word.is_empty() {
        return Command::Empty;
    }
    match word.to_ascii_lowercase().as_str() {
        "create" => match split_word(rest) {
            (key, json) if !key.is_empty() && !json.is_empty() => Command::Create { key, json },
            _ => Command::Usage("Usage: create <key> <json>"),
        },
        "update" => match split_word(rest) {
            (key, json) if !key.is_empty() && !json.is_empty() => Command::Update { key, json },
            _ => Command::Usage("Usage: update <key> <json>"),
        },
        "read" => match split_word(rest).0 {
            "" => Command::Usage("Usage: read <key>"),
            key => Command::Read { key },
        },
        "delete" => match split_word(rest).0 {
            "" => Command::Usage("Usage: delete <key>"),
            key => Command::Delete { key },
        },
        "list" => Command::List,
        "save" => Command::Save,
        "clear" => Command::Clear,
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        _ => Command::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_inner_spacing() {
        assert_eq!(
            parse(r#"create user1 {"name": "Alice",  "age": 30}"#),
            Command::Create { key: "user1", json: r#"{"name": "Alice",  "age": 30}"# }
        );
        assert_eq!(
            parse("  update\tuser1   [1, 2]  "),
            Command::Update { key: "user1", json: "[1, 2]" }
        );
    }

    #[test]
    fn missing_arguments_yield_usage() {
        assert_eq!(parse("create"), Command::Usage("Usage: create <key> <json>"));
        assert_eq!(parse("create user1"), Command::Usage("Usage: create <key> <json>"));
        assert_eq!(parse("update k"), Command::Usage("Usage: update <key> <json>"));
        assert_eq!(parse("read"), Command::Usage("Usage: read <key>"));
        assert_eq!(parse("delete   "), Command::Usage("Usage: delete <key>"));
    }

    #[test]
    fn single_key_commands_take_first_word() {
        assert_eq!(parse("read user1 extra"), Command::Read { key: "user1" });
        assert_eq!(parse("delete user1"), Command::Delete { key: "user1" });
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse("EXIT"), Command::Exit);
        assert_eq!(parse("Help"), Command::Help);
        assert_eq!(parse("LIST"), Command::List);
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse(""), Command::Empty);
        assert_eq!(parse("   \t"), Command::Empty);
        assert_eq!(parse("frobnicate x"), Command::Unknown);
    }
}
