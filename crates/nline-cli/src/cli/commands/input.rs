/// One line typed by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Move { row: usize, col: usize },
    Surrender,
    Reset,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse `row col` (space or comma separated) or a keyword.
pub fn parse(line: &str) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Input::Empty,
        "surrender" | "resign" => return Input::Surrender,
        "reset" | "new" => return Input::Reset,
        "q" | "quit" | "exit" => return Input::Quit,
        _ => {}
    }

    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(r), Some(c), None) => match (r.parse(), c.parse()) {
            (Ok(row), Ok(col)) => Input::Move { row, col },
            _ => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves() {
        assert_eq!(parse("1 2"), Input::Move { row: 1, col: 2 });
        assert_eq!(parse(" 0,3 \n"), Input::Move { row: 0, col: 3 });
        assert_eq!(parse("1 2 3"), Input::Unknown("1 2 3".into()));
        assert_eq!(parse("a b"), Input::Unknown("a b".into()));
        assert_eq!(parse("-1 0"), Input::Unknown("-1 0".into()));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse("Surrender"), Input::Surrender);
        assert_eq!(parse("q"), Input::Quit);
        assert_eq!(parse("reset"), Input::Reset);
        assert_eq!(parse("   "), Input::Empty);
    }
}
