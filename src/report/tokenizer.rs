/// A whitespace-delimited group of a report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Index in the token stream.
    pub position: usize,
}

/// Splits a report body on runs of whitespace, keeping order.
///
/// ```
/// use metar_weather::tokenize;
///
/// let tokens = tokenize("KJFK  121851Z\t19005KT");
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[2].text, "19005KT");
/// assert_eq!(tokens[2].position, 2);
/// ```
pub fn tokenize(body: &str) -> Vec<Token<'_>> {
    body.split_whitespace()
        .enumerate()
        .map(|(position, text)| Token { text, position })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_has_no_tokens() {
        assert!(tokenize("   \n ").is_empty());
    }

    #[test]
    fn line_breaks_are_separators() {
        let texts: Vec<&str> = tokenize("TAF KJFK\n  121730Z").iter().map(|t| t.text).collect();
        assert_eq!(texts, ["TAF", "KJFK", "121730Z"]);
    }
}
