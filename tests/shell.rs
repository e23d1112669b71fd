#![cfg(unix)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use predicates::prelude::*;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MYSH: &str = env!("CARGO_BIN_EXE_mysh");

fn mysh_command(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(MYSH);
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("MYSH_LOG_DIR", dir.join("logs"))
        .env("MYSH_THEME", "plain")
        .env("NO_COLOR", "1")
        .env_remove("MYSH_LOG_STDERR")
        .env_remove("MYSH_BUILTIN_SCOPE")
        .timeout(Duration::from_secs(20));
    cmd
}

fn read(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[test]
fn redirects_input_and_output() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("in.txt"), "hello world\n")?;

    mysh_command(dir.path())
        .write_stdin("tr < in.txt > out.txt a-z A-Z\n")
        .assert()
        .success();

    assert_eq!(read(dir.path().join("out.txt"))?, "HELLO WORLD\n");
    let mode = fs::metadata(dir.path().join("out.txt"))?.permissions().mode();
    assert_eq!(mode & !0o644 & 0o777, 0, "mode {:o}", mode);
    Ok(())
}

#[test]
fn output_redirection_truncates() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("out.txt"), "a much longer previous content\n")?;

    mysh_command(dir.path())
        .write_stdin("echo hi > out.txt\n")
        .assert()
        .success();

    assert_eq!(read(dir.path().join("out.txt"))?, "hi\n");
    Ok(())
}

#[test]
fn operators_glued_to_words_still_redirect() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("echo glued>glued.txt\necho \"a > b\" > quoted.txt\n")
        .assert()
        .success();

    assert_eq!(read(dir.path().join("glued.txt"))?, "glued\n");
    assert_eq!(read(dir.path().join("quoted.txt"))?, "a > b\n");
    Ok(())
}

#[test]
fn empty_quotes_add_no_argument() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("\"\"\nprintf \"[%s]\" \"\" x > empty.txt\n")
        .assert()
        .success()
        .stderr(contains("Error").not());

    assert_eq!(read(dir.path().join("empty.txt"))?, "[x]");
    Ok(())
}

#[test]
fn foreground_pipeline_waits_for_both_stages() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("echo hi | cat\n")
        .assert()
        .success()
        .stdout(contains("hi"));
    Ok(())
}

#[test]
fn pipeline_honours_outer_redirections() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("unsorted.txt"), "b\na\nb\n")?;

    mysh_command(dir.path())
        .write_stdin("sort < unsorted.txt | uniq > uniq.txt\n")
        .assert()
        .success();

    assert_eq!(read(dir.path().join("uniq.txt"))?, "a\nb\n");
    Ok(())
}

#[test]
fn pipe_wins_over_left_output_redirection() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("echo hi > ignored.txt | cat\n")
        .assert()
        .success()
        .stdout(contains("hi"));

    assert!(!dir.path().join("ignored.txt").exists());
    Ok(())
}

#[test]
fn pipe_wins_over_right_input_redirection() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("other.txt"), "from the file\n")?;

    mysh_command(dir.path())
        .write_stdin("echo hi | cat < other.txt > got.txt\n")
        .assert()
        .success();

    assert_eq!(read(dir.path().join("got.txt"))?, "hi\n");
    Ok(())
}

#[test]
fn pipeline_writer_dies_when_reader_exits() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("yes | head -n 1\nsh -c \"while :; do echo y; done\" | head -n 1\necho done\n")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(contains("done"))
        .stderr(contains("Broken pipe").not())
        .stderr(contains("I/O error").not());
    Ok(())
}

#[test]
fn syntax_errors_are_reported_and_nothing_runs() -> Result<()> {
    let dir = TempDir::new()?;
    let input = [
        "echo one > a.txt > b.txt",
        "echo two | cat | cat > piped.txt",
        "ls >",
        "ls > > out.txt",
        "echo \"abc",
        "echo three | > side.txt",
        "echo still here",
    ]
    .join("\n")
        + "\n";

    let assert = mysh_command(dir.path()).write_stdin(input).assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();

    for message in [
        "Error: Multiple output redirections not supported",
        "Error: Multiple pipes not supported",
        "Error: > operator missing filename",
        "Error: > operator followed by another operator",
        "Error: Unterminated quote",
        "Error: Pipe commands cannot be empty",
    ] {
        assert!(stderr.contains(message), "missing {:?} in {:?}", message, stderr);
    }
    assert!(String::from_utf8_lossy(&assert.get_output().stdout).contains("still here"));

    for file in ["a.txt", "b.txt", "piped.txt", "out.txt", "side.txt"] {
        assert!(!dir.path().join(file).exists(), "{} was created", file);
    }
    Ok(())
}

#[test]
fn exit_uses_the_given_code() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("exit 3\necho never > never.txt\n")
        .assert()
        .code(3);

    assert!(!dir.path().join("never.txt").exists());
    Ok(())
}

#[test]
fn bad_exit_argument_is_recoverable() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("exit soon\necho alive\n")
        .assert()
        .code(0)
        .stderr(contains("exit: numeric argument required: soon"))
        .stdout(contains("alive"));
    Ok(())
}

#[test]
fn end_of_input_exits_cleanly() -> Result<()> {
    let dir = TempDir::new()?;
    mysh_command(dir.path()).write_stdin("").assert().code(0);
    Ok(())
}

#[test]
fn cd_changes_directory_and_survives_failures() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir(root.join("sub"))?;

    let input = "cd /nonexistent/mysh-test\n\
                 pwd > first.txt\n\
                 cd sub\n\
                 pwd > ../second.txt\n\
                 cd\n\
                 pwd > third.txt\n";
    mysh_command(&root)
        .write_stdin(input)
        .assert()
        .success()
        .stderr(contains("cd: /nonexistent/mysh-test"));

    assert_eq!(read(root.join("first.txt"))?.trim(), root.display().to_string());
    assert_eq!(
        read(root.join("second.txt"))?.trim(),
        root.join("sub").display().to_string()
    );
    assert_eq!(read(root.join("third.txt"))?.trim(), root.display().to_string());
    Ok(())
}

#[test]
fn child_failures_do_not_stop_the_shell() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("no-such-command-for-mysh\ncat < missing.txt\necho alive\n")
        .assert()
        .success()
        .stderr(contains("execvp"))
        .stderr(contains("input redirection"))
        .stdout(contains("alive"));
    Ok(())
}

#[test]
fn builtins_in_a_pipeline_follow_the_configured_scope() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("exit 4 | cat\n")
        .assert()
        .code(4);

    mysh_command(dir.path())
        .env("MYSH_BUILTIN_SCOPE", "single")
        .write_stdin("exit 4 | cat\necho after\n")
        .assert()
        .code(0)
        .stderr(contains("execvp"))
        .stdout(contains("after"));
    Ok(())
}

#[test]
fn background_pipeline_reports_both_pids() -> Result<()> {
    let dir = TempDir::new()?;

    mysh_command(dir.path())
        .write_stdin("echo bg | cat > bg.txt &\nsleep 0.3\n")
        .assert()
        .success()
        .stdout(contains("[background pipe pids "));

    let output = dir.path().join("bg.txt");
    let deadline = Instant::now() + Duration::from_secs(5);
    while read(&output).unwrap_or_default() != "bg\n" && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }
    assert_eq!(read(&output)?, "bg\n");
    Ok(())
}

#[test]
fn background_job_does_not_block_the_prompt() -> Result<()> {
    let dir = TempDir::new()?;
    let started = Instant::now();

    let mut child = StdCommand::new(MYSH)
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("MYSH_LOG_DIR", dir.path().join("logs"))
        .env("MYSH_THEME", "plain")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;
    child
        .stdin
        .take()
        .context("stdin")?
        .write_all(b"sleep 5 > /dev/null &\necho next\n")?;
    let output = child.wait_with_output()?;

    assert!(output.status.success());
    assert!(started.elapsed() < Duration::from_secs(4));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[background pid "), "{}", stdout);
    assert!(stdout.contains("next"), "{}", stdout);
    Ok(())
}

#[cfg(target_os = "linux")]
fn process_state(pid: u32) -> Option<char> {
    let stat = fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    let after_name = &stat[stat.rfind(')')? + 1..];
    after_name.trim_start().chars().next()
}

#[cfg(target_os = "linux")]
#[test]
fn finished_background_child_is_reaped() -> Result<()> {
    let dir = TempDir::new()?;

    let mut child = StdCommand::new(MYSH)
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("MYSH_LOG_DIR", dir.path().join("logs"))
        .env("MYSH_THEME", "plain")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;
    let mut stdin = child.stdin.take().context("stdin")?;
    let mut stdout = BufReader::new(child.stdout.take().context("stdout")?);

    stdin.write_all(b"sleep 0.2 > /dev/null &\n")?;
    stdin.flush()?;

    let marker = "[background pid ";
    let mut line = String::new();
    while !line.contains(marker) {
        line.clear();
        if stdout.read_line(&mut line)? == 0 {
            anyhow::bail!("shell closed stdout before reporting a pid");
        }
    }
    let start = line.find(marker).context("marker")? + marker.len();
    let end = line[start..].find(']').context("closing bracket")? + start;
    let pid: u32 = line[start..end].trim().parse()?;

    thread::sleep(Duration::from_millis(1000));
    assert_ne!(process_state(pid), Some('Z'), "pid {} is a zombie", pid);

    stdin.write_all(b"exit\n")?;
    drop(stdin);
    assert!(child.wait()?.success());
    Ok(())
}
