use super::lexer::{RedirectOp, Token};
use crate::shell::error::SyntaxError;

/// Checks redirection placement over the whole line, before any pipe split.
/// Expects the trailing background marker to be stripped already.
pub fn validate(tokens: &[Token]) -> Result<(), SyntaxError> {
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Redirect(op) => {
                match tokens.get(i + 1) {
                    None => return Err(SyntaxError::MissingFilename(*op)),
                    Some(Token::Word(_)) => {}
                    Some(_) => return Err(SyntaxError::OperatorAfterOperator(*op)),
                }

                let repeated = tokens[i + 2..]
                    .iter()
                    .any(|later| *later == Token::Redirect(*op));
                if repeated {
                    return Err(match op {
                        RedirectOp::Input => SyntaxError::MultipleInputRedirections,
                        RedirectOp::Output => SyntaxError::MultipleOutputRedirections,
                    });
                }
            }
            Token::Background => return Err(SyntaxError::MisplacedBackground),
            Token::Word(_) | Token::Pipe => {}
        }
    }
    Ok(())
}
