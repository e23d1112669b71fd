use std::ffi::NulError;
use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use rustyline::error::ReadlineError;

use super::parser::lexer::RedirectOp;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("Error: Unterminated quote")]
    UnterminatedQuote,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Error: {0} operator missing filename")]
    MissingFilename(RedirectOp),
    #[error("Error: {0} operator followed by another operator")]
    OperatorAfterOperator(RedirectOp),
    #[error("Error: Multiple input redirections not supported")]
    MultipleInputRedirections,
    #[error("Error: Multiple output redirections not supported")]
    MultipleOutputRedirections,
    #[error("Error: & is only allowed at the end of a command")]
    MisplacedBackground,
    #[error("Error: Multiple pipes not supported")]
    MultiplePipes,
    #[error("Error: Pipe syntax requires two commands")]
    EmptyPipeSide,
    #[error("Error: Pipe commands cannot be empty")]
    EmptyPipeCommand,
    #[error("Error: Missing command")]
    MissingCommand,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Parent-side failures: nothing was started for the line, or at most a left
/// pipeline stage that the reaper collects.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("fork: {0}")]
    Fork(#[source] Errno),
    #[error("pipe: {0}")]
    Pipe(#[source] Errno),
    #[error("sigprocmask: {0}")]
    SignalMask(#[source] Errno),
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] NulError),
}

/// Failures between fork and image replacement. Only ever reported from
/// inside the child, which then exits nonzero.
#[derive(Debug, Error)]
pub enum ChildError {
    #[error("signal setup: {0}")]
    Signal(#[source] Errno),
    #[error("input redirection: {0}")]
    InputRedirection(#[source] Errno),
    #[error("output redirection: {0}")]
    OutputRedirection(#[source] Errno),
    #[error("dup2: {0}")]
    Dup(#[source] Errno),
    #[error("execvp: {0}")]
    Exec(#[source] Errno),
}

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("exit: numeric argument required: {0}")]
    InvalidExitCode(String),
    #[error("cd: HOME not set")]
    HomeNotSet,
    #[error("cd: {}: {source}", .path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("line editor: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
