use once_cell::sync::Lazy;
use regex::Regex;

static LINE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?:.*?|.*?):([0-9]+):([0-9]+)").expect("line column pattern is valid")
});
static FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?:.*?|.*?):").expect("file pattern is valid"));

/// Error location recovered from a compiler `formattedMessage`, e.g.
///
/// ```text
/// ParserError: Expected ';' but got '}'
///  --> contracts/A.sol:3:5:
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPosition {
    pub file: String,
    /// 0-based line.
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ErrorPosition {
    pub fn parse(message: &str) -> Self {
        // Warnings such as the missing SPDX license have no location at all.
        if !message.contains(':') {
            return Self::default();
        }
        let msg = match message.split_once("-->") {
            Some((_, rest)) => rest.trim(),
            None => message,
        };
        let (line, column) = match LINE_COLUMN.captures(msg) {
            Some(caps) => (
                caps.get(2)
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .map(|line| line.saturating_sub(1)),
                caps.get(3).and_then(|m| m.as_str().parse::<usize>().ok()),
            ),
            None => (None, None),
        };
        let file = match FILE.captures(msg).and_then(|caps| caps.get(1)) {
            Some(file) => file.as_str().to_string(),
            None => msg.to_string(),
        };
        Self { file, line, column }
    }
}
