//! Interactive database shell
//!
//! Starts an external shell program (`sqlite3` by default) on the bare path
//! of a resolved location, attached to the invoking terminal. While the shell
//! runs, an interrupt delivered to this process is forwarded to the shell as
//! `SIGTERM` instead of killing this process and leaving the shell orphaned.
//! A shell still running after a short grace period, or after a second
//! interrupt, is killed with `SIGKILL`.

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{BobDbConfig, DEFAULT_SHELL_PROGRAM};
use crate::database::ResolvedLocation;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long an interrupted shell gets to exit after SIGTERM
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Program and leading arguments used to start the shell
///
/// The database path is always appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProgram {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ShellProgram {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL_PROGRAM)
    }
}

impl ShellProgram {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &BobDbConfig) -> Self {
        Self::new(config.shell_program.as_str()).with_args(config.shell_args.iter().cloned())
    }

    /// Full command line for `location`, for display
    pub fn command_line(&self, location: &ResolvedLocation) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(location.path().display().to_string());
        parts.join(" ")
    }
}

/// How a shell session ended
///
/// `LaunchFailure` means the shell never ran. `TerminatedBySignal` covers both
/// an interrupted session and a shell killed from elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    LaunchFailure {
        command: String,
        code: i32,
        message: String,
    },
    ExitedNormally(i32),
    TerminatedBySignal(i32),
}

impl ShellOutcome {
    /// Exit status for the invoking command
    ///
    /// Launch failures exit with the OS error number, normal exits with the
    /// shell's own code, and signal terminations with `128 + signal`.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellOutcome::LaunchFailure { code, .. } => *code,
            ShellOutcome::ExitedNormally(code) => *code,
            ShellOutcome::TerminatedBySignal(signal) => 128 + signal,
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match (status.code(), status.signal()) {
            (Some(code), _) => ShellOutcome::ExitedNormally(code),
            (None, Some(signal)) => ShellOutcome::TerminatedBySignal(signal),
            (None, None) => ShellOutcome::ExitedNormally(1),
        }
    }
}

/// Run the shell on `location` and wait for it to finish
///
/// Errors are only returned when waiting on a started shell fails; failing
/// to start it is reported as [`ShellOutcome::LaunchFailure`].
pub fn run_shell(location: &ResolvedLocation, shell: &ShellProgram) -> io::Result<ShellOutcome> {
    let command_line = shell.command_line(location);
    let interrupts = InterruptGuard::install()?;

    let mut child = match Command::new(&shell.program)
        .args(&shell.args)
        .arg(location.path())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return Ok(ShellOutcome::LaunchFailure {
                command: command_line,
                code: e.raw_os_error().unwrap_or(1),
                message: e.to_string(),
            })
        }
    };
    let pid = child.id();
    info!("started '{}' (pid {})", command_line, pid);

    loop {
        if interrupts.interrupted() {
            warn!("interrupted, terminating shell (pid {})", pid);
            return terminate(&mut child, &interrupts);
        }

        match child.try_wait()? {
            Some(status) => {
                let outcome = ShellOutcome::from_status(status);
                info!("shell (pid {}) finished: {:?}", pid, outcome);
                return Ok(outcome);
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

/// Stop an interrupted shell: SIGTERM first, SIGKILL once the grace period
/// runs out or another interrupt arrives.
///
/// Only the shell itself is signalled. Processes it spawned are not.
fn terminate(child: &mut Child, interrupts: &InterruptGuard) -> io::Result<ShellOutcome> {
    let pid = child.id();
    // Signals the shell's pid only, not its process group or children.
    // SAFETY: `pid` is our own unreaped child, so it cannot have been recycled
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGTERM);
    }
    interrupts.reset();

    let deadline = Instant::now() + TERMINATE_GRACE;
    while Instant::now() < deadline && !interrupts.interrupted() {
        if child.try_wait()?.is_some() {
            return Ok(ShellOutcome::TerminatedBySignal(libc::SIGTERM));
        }
        thread::sleep(POLL_INTERVAL);
    }

    warn!("shell (pid {}) still running after SIGTERM, killing it", pid);
    child.kill()?;
    child.wait()?;
    Ok(ShellOutcome::TerminatedBySignal(libc::SIGKILL))
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Records `SIGINT` instead of terminating; restores the previous handler on drop
struct InterruptGuard {
    previous: libc::sigaction,
}

impl InterruptGuard {
    fn install() -> io::Result<Self> {
        INTERRUPTED.store(false, Ordering::SeqCst);

        // SAFETY: both sigaction structs are fully initialized before use and the
        // handler only touches an atomic
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&mut action.sa_mask);

            let mut previous: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(libc::SIGINT, &action, &mut previous) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { previous })
        }
    }

    fn reset(&self) {
        INTERRUPTED.store(false, Ordering::SeqCst);
    }

    fn interrupted(&self) -> bool {
        INTERRUPTED.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: restores the disposition saved by `install`
        unsafe {
            libc::sigaction(libc::SIGINT, &self.previous, std::ptr::null_mut());
        }
    }
}
