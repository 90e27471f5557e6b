//! Command parser - Recognizes a command token in raw message text

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::ParseError;

/// Token grammar: `/name`, optional `@botname`, optional whitespace-separated
/// free-form remainder. Anchored at both ends; a token anywhere past position
/// zero never matches.
static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z0-9_]+)(?:@([A-Za-z0-9_]+))?(?:\s+(?s:(.*)))?$")
        .expect("command token regex is valid")
});

/// Structured outcome of a successful command match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    /// `@botname` qualifier, empty when absent
    pub target_bot: String,
    /// Remainder after the token, verbatim; empty when absent
    pub args: String,
}

/// Parse raw message text into a command, if it is one.
///
/// Returns `Ok(None)` when the text does not begin with a command token.
/// The literal token is extracted as written; case policy is the bus's
/// concern, not the parser's. Empty text is a caller error.
pub fn parse_command(text: &str) -> Result<Option<ParsedCommand>, ParseError> {
    if text.is_empty() {
        return Err(ParseError::EmptyText);
    }

    let Some(caps) = COMMAND_RE.captures(text) else {
        return Ok(None);
    };

    Ok(Some(ParsedCommand {
        name: caps[1].to_string(),
        target_bot: caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
        args: caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_no_match() {
        assert_eq!(parse_command("hello there").unwrap(), None);
    }

    #[test]
    fn embedded_token_is_no_match() {
        // A command token must start at position 0
        assert_eq!(
            parse_command("sometext first /userCommand arg1 arg2").unwrap(),
            None
        );
    }

    #[test]
    fn parses_name_target_bot_and_args() {
        let parsed = parse_command("/userCommand@botname arg1 arg2")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.name, "userCommand");
        assert_eq!(parsed.target_bot, "botname");
        assert_eq!(parsed.args, "arg1 arg2");
    }

    #[test]
    fn target_bot_is_empty_when_absent() {
        let parsed = parse_command("/userCommand arg1 arg2").unwrap().unwrap();
        assert_eq!(parsed.name, "userCommand");
        assert_eq!(parsed.target_bot, "");
        assert_eq!(parsed.args, "arg1 arg2");
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(parse_command(""), Err(ParseError::EmptyText));
    }

    #[test]
    fn bare_command_has_empty_args() {
        let parsed = parse_command("/ping").unwrap().unwrap();
        assert_eq!(parsed.name, "ping");
        assert_eq!(parsed.target_bot, "");
        assert_eq!(parsed.args, "");
    }

    #[test]
    fn args_keep_internal_whitespace() {
        let parsed = parse_command("/note remember  this\nand that").unwrap().unwrap();
        assert_eq!(parsed.args, "remember  this\nand that");
    }

    #[test]
    fn trailing_whitespace_yields_empty_args() {
        let parsed = parse_command("/ping   ").unwrap().unwrap();
        assert_eq!(parsed.args, "");
    }

    #[test]
    fn lone_slash_is_no_match() {
        assert_eq!(parse_command("/").unwrap(), None);
    }

    #[test]
    fn name_allows_digits_and_underscore() {
        let parsed = parse_command("/cmd_2 x").unwrap().unwrap();
        assert_eq!(parsed.name, "cmd_2");
    }

    #[test]
    fn punctuation_after_name_is_no_match() {
        assert_eq!(parse_command("/cmd!now").unwrap(), None);
    }

    #[test]
    fn case_is_preserved_verbatim() {
        let parsed = parse_command("/UserCommand@BotName X").unwrap().unwrap();
        assert_eq!(parsed.name, "UserCommand");
        assert_eq!(parsed.target_bot, "BotName");
    }
}
