//! Command line tokenizer
//!
//! Splits a line at spaces and tabs. Single or double quotes group text
//! (including whitespace) into one token; text directly before an opening
//! quote or after a closing quote forms its own token. A backslash makes
//! the following character literal, both inside and outside quotes. An
//! unterminated quote runs to the end of the line. Empty tokens are dropped.

/// Split `line` into tokens
///
/// ```
/// use playctl::console::tokenizer::tokenize_line;
///
/// assert_eq!(tokenize_line("play 'my song.ogg' no"), vec!["play", "my song.ogg", "no"]);
/// assert_eq!(tokenize_line(r#"a\ b "c\"d""#), vec!["a b", "c\"d"]);
/// ```
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ' ' | '\t' => flush(&mut tokens, &mut current),
            '"' | '\'' => {
                flush(&mut tokens, &mut current);
                let mut quoted = String::new();
                while let Some(q) = chars.next() {
                    match q {
                        '\\' => quoted.push(chars.next().unwrap_or('\\')),
                        _ if q == c => break,
                        _ => quoted.push(q),
                    }
                }
                flush(&mut tokens, &mut quoted);
            }
            _ => current.push(c),
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_splitting() {
        assert_eq!(tokenize_line("  seek \t 1500  "), vec!["seek", "1500"]);
        assert!(tokenize_line("").is_empty());
        assert!(tokenize_line(" \t ").is_empty());
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            tokenize_line(r#"play "file:///music/a b.flac" yes"#),
            vec!["play", "file:///music/a b.flac", "yes"]
        );
        assert_eq!(tokenize_line("'single quoted' x"), vec!["single quoted", "x"]);
    }

    #[test]
    fn test_text_adjacent_to_quotes_is_separate() {
        assert_eq!(tokenize_line(r#"abc"def"ghi"#), vec!["abc", "def", "ghi"]);
    }

    #[test]
    fn test_other_quote_kind_is_literal_inside_quotes() {
        assert_eq!(tokenize_line(r#""it's""#), vec!["it's"]);
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(tokenize_line(r"a\ b"), vec!["a b"]);
        assert_eq!(tokenize_line(r#"Hello\"World\\Abc"#), vec![r#"Hello"World\Abc"#]);
        assert_eq!(tokenize_line(r"a\bc"), vec!["abc"]);
    }

    #[test]
    fn test_trailing_backslash_kept() {
        assert_eq!(tokenize_line(r"abc\"), vec![r"abc\"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize_line(r#"play "open ended"#), vec!["play", "open ended"]);
    }

    #[test]
    fn test_empty_quotes_dropped() {
        assert_eq!(tokenize_line(r#"a "" b"#), vec!["a", "b"]);
    }
}
