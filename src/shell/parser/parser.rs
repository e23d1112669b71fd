use log::debug;

use super::ast::{Command, ExecutionRequest, Pipeline};
use super::lexer::{self, RedirectOp, Token};
use super::validator;
use crate::shell::error::{ParseError, SyntaxError};

pub struct Parser<'a> {
    line: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(line: &'a str) -> Self {
        Parser { line }
    }

    /// `Ok(None)` means there is nothing to run, e.g. a blank line or a lone `&`.
    pub fn parse_request(&self) -> Result<Option<ExecutionRequest>, ParseError> {
        let mut tokens = lexer::tokenize(self.line)?;
        if tokens.is_empty() {
            return Ok(None);
        }

        let background = strip_background(&mut tokens);
        if tokens.is_empty() {
            return Ok(None);
        }

        validator::validate(&tokens)?;
        let pipeline = split_pipeline(&tokens)?;
        debug!("parsed {:?} background={}", pipeline, background);

        Ok(Some(ExecutionRequest {
            pipeline,
            background,
        }))
    }
}

fn strip_background(tokens: &mut Vec<Token>) -> bool {
    if tokens.last() == Some(&Token::Background) {
        tokens.pop();
        true
    } else {
        false
    }
}

fn split_pipeline(tokens: &[Token]) -> Result<Pipeline, SyntaxError> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pipe_seen = false;

    for token in tokens {
        if *token == Token::Pipe {
            if pipe_seen {
                return Err(SyntaxError::MultiplePipes);
            }
            pipe_seen = true;
            continue;
        }

        if pipe_seen {
            right.push(token.clone());
        } else {
            left.push(token.clone());
        }
    }

    if !pipe_seen {
        let left = resolve_command(&left)?.ok_or(SyntaxError::MissingCommand)?;
        return Ok(Pipeline { left, right: None });
    }

    if left.is_empty() || right.is_empty() {
        return Err(SyntaxError::EmptyPipeSide);
    }
    match (resolve_command(&left)?, resolve_command(&right)?) {
        (Some(left), Some(right)) => Ok(Pipeline {
            left,
            right: Some(right),
        }),
        _ => Err(SyntaxError::EmptyPipeCommand),
    }
}

/// Pulls `< path` and `> path` out of one side; `None` when no argument is left.
fn resolve_command(tokens: &[Token]) -> Result<Option<Command>, SyntaxError> {
    let mut command = Command::default();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Redirect(op) => {
                let path = match iter.next() {
                    Some(Token::Word(path)) => path.into(),
                    Some(_) => return Err(SyntaxError::OperatorAfterOperator(*op)),
                    None => return Err(SyntaxError::MissingFilename(*op)),
                };
                match op {
                    RedirectOp::Input => command.input_path = Some(path),
                    RedirectOp::Output => command.output_path = Some(path),
                }
            }
            Token::Word(word) => command.argv.push(word.clone()),
            Token::Pipe => return Err(SyntaxError::MultiplePipes),
            Token::Background => return Err(SyntaxError::MisplacedBackground),
        }
    }

    Ok(if command.argv.is_empty() {
        None
    } else {
        Some(command)
    })
}
