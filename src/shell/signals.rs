use libc::c_int;
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// The shell never dies from Ctrl-C; children get the default back before exec.
pub fn ignore_interrupt() -> Result<(), Errno> {
    unsafe { signal::signal(Signal::SIGINT, SigHandler::SigIgn) }?;
    Ok(())
}

/// Installs the SIGCHLD reaper so background children never linger as zombies.
pub fn setup_sigchld_handler() -> Result<(), Errno> {
    let action = SigAction::new(
        SigHandler::Handler(reap_children),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGCHLD, &action) }?;
    Ok(())
}

// Runs in signal context: waitpid only, no allocation, no locks, no logging.
extern "C" fn reap_children(_: c_int) {
    let saved = errno::errno();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => continue,
        }
    }
    errno::set_errno(saved);
}

/// Called in a freshly forked child. Undoes what the shell changed for itself.
/// SIGPIPE is ignored by the Rust runtime and an ignored signal stays ignored
/// across exec, so it is reset here too.
pub fn restore_child_defaults() -> Result<(), Errno> {
    unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) }?;
    unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
    let mut chld = SigSet::empty();
    chld.add(Signal::SIGCHLD);
    signal::sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&chld), None)
}

/// Holds SIGCHLD blocked while the loop forks and waits on its own pids, so
/// the reaper can't collect them first. The previous mask comes back on drop
/// and any pending SIGCHLD is delivered then.
pub struct SigchldBlock {
    previous: SigSet,
}

impl SigchldBlock {
    pub fn new() -> Result<Self, Errno> {
        let mut chld = SigSet::empty();
        chld.add(Signal::SIGCHLD);
        let mut previous = SigSet::empty();
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&chld), Some(&mut previous))?;
        Ok(Self { previous })
    }
}

impl Drop for SigchldBlock {
    fn drop(&mut self) {
        if let Err(e) = signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None) {
            log::error!("restoring signal mask failed: {}", e);
        }
    }
}
