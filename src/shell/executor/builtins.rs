use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::shell::error::BuiltinError;

/// Commands that must run inside the shell process itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
}

impl Builtin {
    pub fn lookup(program: &str) -> Option<Self> {
        match program {
            "exit" => Some(Builtin::Exit),
            "cd" => Some(Builtin::Cd),
            _ => None,
        }
    }
}

/// `exit [code]`. Extra arguments are ignored.
pub fn exit_code(args: &[String]) -> Result<i32, BuiltinError> {
    match args.first() {
        None => Ok(0),
        Some(code) => code
            .parse::<i32>()
            .map_err(|_| BuiltinError::InvalidExitCode(code.clone())),
    }
}

/// `cd [path]`, falling back to `home` without an argument. On failure the
/// working directory is untouched.
pub fn change_dir(args: &[String], home: Option<&Path>) -> Result<PathBuf, BuiltinError> {
    let target = match args.first() {
        Some(path) => PathBuf::from(path),
        None => home.ok_or(BuiltinError::HomeNotSet)?.to_path_buf(),
    };

    env::set_current_dir(&target).map_err(|source| BuiltinError::ChangeDir {
        path: target.clone(),
        source,
    })?;
    debug!("changed directory to {}", target.display());
    Ok(target)
}
