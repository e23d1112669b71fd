use std::convert::Infallible;
use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc::{STDIN_FILENO, STDOUT_FILENO};
use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, close, dup2, execvp, fork, ForkResult, Pid};

use crate::shell::error::{ChildError, LaunchError};
use crate::shell::parser::{Command, Pipeline};
use crate::shell::signals::{self, SigchldBlock};

/// Children that were forked for one line. SIGCHLD stays blocked for as long
/// as this value lives, so the caller can wait on `pids` without racing the
/// reaper.
pub struct Spawned {
    pub pids: Vec<Pid>,
    _mask: SigchldBlock,
}

/// Everything a child needs, converted before fork so the child allocates nothing.
struct ChildPlan {
    program: CString,
    argv: Vec<CString>,
    input_path: Option<CString>,
    output_path: Option<CString>,
}

impl ChildPlan {
    fn new(command: &Command) -> Result<Self, LaunchError> {
        let argv = command
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            program: argv.first().cloned().unwrap_or_default(),
            argv,
            input_path: command.input_path.as_deref().map(c_path).transpose()?,
            output_path: command.output_path.as_deref().map(c_path).transpose()?,
        })
    }
}

fn c_path(path: &Path) -> Result<CString, std::ffi::NulError> {
    CString::new(path.as_os_str().as_bytes())
}

#[derive(Debug, Clone, Copy)]
struct PipeFds {
    read: RawFd,
    write: RawFd,
}

#[derive(Debug, Clone, Copy)]
enum Wiring {
    Inherit,
    StdoutToPipe(PipeFds),
    StdinFromPipe(PipeFds),
}

pub fn spawn(pipeline: &Pipeline) -> Result<Spawned, LaunchError> {
    match &pipeline.right {
        None => {
            let plan = ChildPlan::new(&pipeline.left)?;
            let mask = block_sigchld()?;
            let pid = fork_child(&plan, Wiring::Inherit)?;
            debug!("started {} as pid {}", pipeline.left.program(), pid);
            Ok(Spawned {
                pids: vec![pid],
                _mask: mask,
            })
        }
        Some(right) => spawn_pair(&pipeline.left, right),
    }
}

fn spawn_pair(left: &Command, right: &Command) -> Result<Spawned, LaunchError> {
    if let Some(path) = &left.output_path {
        warn!(
            "ignoring > {} on {}: its output goes to the pipe",
            path.display(),
            left.program()
        );
    }
    if let Some(path) = &right.input_path {
        warn!(
            "ignoring < {} on {}: its input comes from the pipe",
            path.display(),
            right.program()
        );
    }

    let mut left_plan = ChildPlan::new(left)?;
    left_plan.output_path = None;
    let mut right_plan = ChildPlan::new(right)?;
    right_plan.input_path = None;

    let mask = block_sigchld()?;
    let (read_end, write_end) = unistd::pipe().map_err(LaunchError::Pipe)?;
    let fds = PipeFds {
        read: read_end.as_raw_fd(),
        write: write_end.as_raw_fd(),
    };

    let left_pid = fork_child(&left_plan, Wiring::StdoutToPipe(fds))?;
    let right_pid = match fork_child(&right_plan, Wiring::StdinFromPipe(fds)) {
        Ok(pid) => pid,
        Err(e) => {
            warn!("left stage {} is left to the reaper", left_pid);
            return Err(e);
        }
    };

    // The reader only sees end-of-stream once no copy of the write end is
    // left open in this process.
    drop(read_end);
    drop(write_end);

    debug!(
        "started {} | {} as pids {} {}",
        left.program(),
        right.program(),
        left_pid,
        right_pid
    );
    Ok(Spawned {
        pids: vec![left_pid, right_pid],
        _mask: mask,
    })
}

fn block_sigchld() -> Result<SigchldBlock, LaunchError> {
    // buffered output would otherwise be flushed twice, once by each child
    if let Err(e) = io::stdout().flush() {
        warn!("flushing stdout before fork failed: {}", e);
    }
    SigchldBlock::new().map_err(LaunchError::SignalMask)
}

fn fork_child(plan: &ChildPlan, wiring: Wiring) -> Result<Pid, LaunchError> {
    match unsafe { fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => run_child(plan, wiring),
    }
}

/// Never returns: the process either becomes the program or exits with 1.
fn run_child(plan: &ChildPlan, wiring: Wiring) -> ! {
    let err = match prepare_and_exec(plan, wiring) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    eprintln!("{}", err);
    // no atexit handlers or buffer flushing in a forked copy of the shell
    unsafe { libc::_exit(1) }
}

fn prepare_and_exec(plan: &ChildPlan, wiring: Wiring) -> Result<Infallible, ChildError> {
    signals::restore_child_defaults().map_err(ChildError::Signal)?;

    match wiring {
        Wiring::Inherit => {}
        Wiring::StdoutToPipe(fds) => {
            dup2(fds.write, STDOUT_FILENO).map_err(ChildError::Dup)?;
            close_pipe(fds);
        }
        Wiring::StdinFromPipe(fds) => {
            dup2(fds.read, STDIN_FILENO).map_err(ChildError::Dup)?;
            close_pipe(fds);
        }
    }

    if let Some(path) = &plan.input_path {
        redirect(path, OFlag::O_RDONLY, STDIN_FILENO).map_err(ChildError::InputRedirection)?;
    }
    if let Some(path) = &plan.output_path {
        redirect(
            path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            STDOUT_FILENO,
        )
        .map_err(ChildError::OutputRedirection)?;
    }

    execvp(&plan.program, &plan.argv).map_err(ChildError::Exec)
}

fn close_pipe(fds: PipeFds) {
    let _ = close(fds.read);
    let _ = close(fds.write);
}

fn redirect(path: &CStr, flags: OFlag, target: RawFd) -> Result<(), Errno> {
    let fd = open(path, flags, Mode::from_bits_truncate(0o644))?;
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}
