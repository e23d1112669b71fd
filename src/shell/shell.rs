use log::{debug, error, info, warn};
use std::io::{self, Write};

use crate::shell::error::ShellError;
use crate::shell::executor::{Executor, Outcome};
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::shell::signals;
use crate::utils::config::Config;
use crate::utils::theme::Theme;

pub struct Shell {
    theme: Theme,
    readline: ReadlineManager,
    executor: Executor,
}

impl Shell {
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        Ok(Self {
            theme: Theme::load_theme(&config.theme),
            readline: ReadlineManager::new(config)?,
            executor: Executor::new(config),
        })
    }

    /// Runs until `exit` or end of input and returns the process exit code.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        debug!("initialising mysh...");

        signals::ignore_interrupt().map_err(io::Error::from)?;
        signals::setup_sigchld_handler().map_err(io::Error::from)?;

        let code = self.run_loop()?;
        info!("leaving mysh with status {}", code);
        Ok(code)
    }

    fn run_loop(&mut self) -> Result<i32, ShellError> {
        loop {
            io::stdout().flush()?;

            match self.readline.readline(&self.theme.prompt) {
                Ok(line) => {
                    if let Some(code) = self.handle_input(&line) {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    println!();
                    return Ok(0);
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("interrupt at the prompt");
                }
                Err(err) => {
                    error!("line editor error: {}", err);
                    self.report(&err);
                }
            }
        }
    }

    /// Returns the exit code once the line asked the shell to stop.
    fn handle_input(&mut self, line: &str) -> Option<i32> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let request = match Parser::new(line).parse_request() {
            Ok(Some(request)) => request,
            Ok(None) => return None,
            Err(err) => {
                warn!("rejected {:?}: {}", line, err);
                self.report(&err);
                return None;
            }
        };

        match self.executor.execute(request) {
            Ok(Outcome::Done) => None,
            Ok(Outcome::Background(pids)) => {
                let pids: Vec<String> = pids.iter().map(|pid| pid.to_string()).collect();
                let notice = match pids.as_slice() {
                    [pid] => format!("[background pid {}]", pid),
                    pids => format!("[background pipe pids {}]", pids.join(" ")),
                };
                println!("{}", (self.theme.notice_style)(notice));
                None
            }
            Ok(Outcome::Exit(code)) => Some(code),
            Err(err) => {
                error!("{:?} failed: {}", line, err);
                self.report(&err);
                None
            }
        }
    }

    fn report(&self, err: &dyn std::fmt::Display) {
        eprintln!("{}", (self.theme.error_style)(err.to_string()));
    }
}
