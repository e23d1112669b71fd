use log::{debug, error};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

/// Blocks until every pid in `pids` has terminated, in whatever order they
/// finish. SIGCHLD must be blocked by the caller, so background children that
/// exit meanwhile are collected here and their status discarded.
pub fn wait_foreground(pids: &[Pid]) {
    let mut pending = pids.to_vec();

    while !pending.is_empty() {
        let pid = match waitpid(Pid::from_raw(-1), None) {
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!("pid {} exited with status {}", pid, code);
                pid
            }
            Ok(WaitStatus::Signaled(pid, sig, core_dumped)) => {
                debug!("pid {} killed by {} (core dumped: {})", pid, sig, core_dumped);
                pid
            }
            Ok(other) => {
                debug!("ignoring wait status {:?}", other);
                continue;
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                // someone else already collected them
                debug!("no children left while waiting for {:?}", pending);
                break;
            }
            Err(e) => {
                error!("waitpid failed: {}", e);
                break;
            }
        };

        if let Some(pos) = pending.iter().position(|p| *p == pid) {
            pending.swap_remove(pos);
        } else {
            debug!("reaped background child {}", pid);
        }
    }
}
