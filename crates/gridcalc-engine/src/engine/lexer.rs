//! Formula tokenizer.

use super::CellRef;
use super::parser::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Cell(CellRef),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Comma,
    Colon,
    Eof,
}

/// A token and the byte offset it starts at.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Split formula text into tokens, ending with [`Token::Eof`].
///
/// Words that name a grid cell become [`Token::Cell`] unless a `(` follows
/// them, in which case they are function names.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        let start = i;

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let single = match b {
            b'+' => Some(Token::Plus),
            b'-' => Some(Token::Minus),
            b'*' => Some(Token::Star),
            b'/' => Some(Token::Slash),
            b'(' => Some(Token::LeftParen),
            b')' => Some(Token::RightParen),
            b',' => Some(Token::Comma),
            b':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(Spanned { token, pos: start });
            i += 1;
            continue;
        }

        if b.is_ascii_digit() || b == b'.' {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            // Malformed literals such as `1.2.3` evaluate to NaN.
            let n = input[start..i].parse::<f64>().unwrap_or(f64::NAN);
            tokens.push(Spanned {
                token: Token::Number(n),
                pos: start,
            });
            continue;
        }

        if b.is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let word = &input[start..i];
            let is_call = input[i..].trim_start().starts_with('(');
            let token = match CellRef::from_str(word) {
                Some(cell) if !is_call => Token::Cell(cell),
                _ => Token::Ident(word.to_string()),
            };
            tokens.push(Spanned { token, pos: start });
            continue;
        }

        let ch = input[start..].chars().next().unwrap_or('?');
        return Err(ParseError::new(format!("unexpected character '{}'", ch), start));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_tokenize_arithmetic() {
        assert_eq!(
            kinds("2 + 3*4"),
            vec![
                Token::Number(2.0),
                Token::Plus,
                Token::Number(3.0),
                Token::Star,
                Token::Number(4.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_cells_and_calls() {
        assert_eq!(
            kinds("sum(a1:B2)"),
            vec![
                Token::Ident("sum".into()),
                Token::LeftParen,
                Token::Cell(CellRef::new(0, 0)),
                Token::Colon,
                Token::Cell(CellRef::new(1, 1)),
                Token::RightParen,
                Token::Eof,
            ]
        );
        // A cell-like word followed by `(` is a function name.
        assert_eq!(kinds("a1(2)")[0], Token::Ident("a1".into()));
        // Off-grid words stay identifiers.
        assert_eq!(kinds("K1")[0], Token::Ident("K1".into()));
    }

    #[test]
    fn test_tokenize_malformed_number_is_nan() {
        let tokens = kinds("1.2.3");
        assert!(matches!(tokens[0], Token::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_tokenize_rejects_unknown_characters() {
        let err = tokenize("1 + $").unwrap_err();
        assert_eq!(err.pos, 4);
    }
}
