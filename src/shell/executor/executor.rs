use std::path::PathBuf;

use log::{debug, warn};
use nix::unistd::Pid;

use super::builtins::{self, Builtin};
use super::launcher;
use super::wait::wait_foreground;
use crate::shell::error::ExecuteError;
use crate::shell::parser::ExecutionRequest;
use crate::utils::config::{BuiltinScope, Config};

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Built-in handled or foreground job finished.
    Done,
    /// Children left running; the reaper collects them.
    Background(Vec<Pid>),
    Exit(i32),
}

pub struct Executor {
    builtin_scope: BuiltinScope,
    home_dir: Option<PathBuf>,
}

impl Executor {
    pub fn new(config: &Config) -> Self {
        Self {
            builtin_scope: config.builtin_scope,
            home_dir: config.home_dir.clone(),
        }
    }

    pub fn execute(&mut self, request: ExecutionRequest) -> Result<Outcome, ExecuteError> {
        if let Some(builtin) = self.find_builtin(&request) {
            return self.run_builtin(builtin, &request);
        }

        let spawned = launcher::spawn(&request.pipeline)?;
        if request.background {
            return Ok(Outcome::Background(spawned.pids.clone()));
        }

        wait_foreground(&spawned.pids);
        debug!("foreground job {:?} finished", spawned.pids);
        Ok(Outcome::Done)
    }

    fn find_builtin(&self, request: &ExecutionRequest) -> Option<Builtin> {
        let pipeline = &request.pipeline;
        if pipeline.has_pipe() && self.builtin_scope == BuiltinScope::SingleCommand {
            return None;
        }
        Builtin::lookup(pipeline.left.program())
    }

    // Runs in this process: no fork, and any redirection or pipe on the line
    // is not applied.
    fn run_builtin(
        &mut self,
        builtin: Builtin,
        request: &ExecutionRequest,
    ) -> Result<Outcome, ExecuteError> {
        let command = &request.pipeline.left;
        if request.pipeline.has_pipe() {
            warn!("{} runs in the shell; the rest of the pipeline is ignored", command.program());
        }
        if command.input_path.is_some() || command.output_path.is_some() {
            warn!("redirections on {} are ignored", command.program());
        }

        debug!("builtin {:?} {:?}", builtin, command.arguments());
        match builtin {
            Builtin::Exit => Ok(Outcome::Exit(builtins::exit_code(command.arguments())?)),
            Builtin::Cd => {
                builtins::change_dir(command.arguments(), self.home_dir.as_deref())?;
                Ok(Outcome::Done)
            }
        }
    }
}
