use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::shell::error::LexError;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Word(String),
    Pipe,
    Redirect(RedirectOp),
    Background,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectOp {
    Input,  // <
    Output, // >
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectOp::Input => write!(f, "<"),
            RedirectOp::Output => write!(f, ">"),
        }
    }
}

const OPERATORS: &str = "<>|&";

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    /// Splits the whole line. An unterminated quote discards every token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.skip_whitespace();

            let Some(c) = self.peek_char() else {
                return Ok(None);
            };
            let token = match c {
                '|' => {
                    self.read_char();
                    Token::Pipe
                }
                '&' => {
                    self.read_char();
                    Token::Background
                }
                '<' => {
                    self.read_char();
                    Token::Redirect(RedirectOp::Input)
                }
                '>' => {
                    self.read_char();
                    Token::Redirect(RedirectOp::Output)
                }
                _ => match self.read_word()? {
                    // only a bare `""` can leave a word empty; it yields nothing
                    Some(word) => word,
                    None => continue,
                },
            };
            return Ok(Some(token));
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.read_char();
        }
    }

    // A word runs until unquoted whitespace or an unquoted operator. Quotes
    // toggle literal mode and may appear anywhere inside the word.
    fn read_word(&mut self) -> Result<Option<Token>, LexError> {
        let mut word = String::new();
        let mut in_quote = false;

        while let Some(c) = self.peek_char() {
            if c == '"' {
                in_quote = !in_quote;
                self.read_char();
                continue;
            }
            if !in_quote && (c.is_whitespace() || OPERATORS.contains(c)) {
                break;
            }
            word.push(c);
            self.read_char();
        }

        if in_quote {
            return Err(LexError::UnterminatedQuote);
        }
        if word.is_empty() {
            return Ok(None);
        }
        Ok(Some(Token::Word(word)))
    }
}

pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(line).tokenize()
}
