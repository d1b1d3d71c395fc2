use anyhow::Result;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;

// Cross-platform signal handling
#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, iterator::Signals};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Global stop flag: once set, the feeder stops accepting new lines and the
/// pipeline drains what is already queued.
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);

/// The signal that requested termination (0 = none). Only the first signal
/// is recorded so the exit code reflects what actually interrupted the run.
static TERMINATION_SIGNAL: AtomicI32 = AtomicI32::new(0);

fn record_termination(sig: i32) {
    let _ = TERMINATION_SIGNAL.compare_exchange(0, sig, Ordering::Relaxed, Ordering::Relaxed);
    SHOULD_TERMINATE.store(true, Ordering::Relaxed);
}

/// Signal handler for graceful shutdown
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    /// Install the handler. First SIGINT/SIGTERM requests a graceful
    /// stop-and-drain; a second SIGINT exits immediately.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        let signals_to_handle = vec![SIGINT, SIGPIPE, SIGTERM];

        #[cfg(windows)]
        let signals_to_handle = vec![SIGINT]; // Windows only supports SIGINT reliably

        let mut signals = Signals::new(&signals_to_handle)?;

        let handle = thread::spawn(move || {
            let mut interrupt_count = 0;
            for sig in signals.forever() {
                match sig {
                    SIGINT => {
                        record_termination(SIGINT);
                        interrupt_count += 1;
                        if interrupt_count > 1 {
                            ExitCode::SignalInt.exit();
                        }
                    }
                    #[cfg(unix)]
                    SIGPIPE => {
                        // Broken pipe - exit quietly (normal for Unix pipes)
                        record_termination(SIGPIPE);
                        ExitCode::SignalPipe.exit();
                    }
                    #[cfg(unix)]
                    SIGTERM => {
                        eprintln!("Received SIGTERM, draining and shutting down...");
                        record_termination(SIGTERM);
                    }
                    _ => {}
                }
            }
        });

        Ok(SignalHandler { _handle: handle })
    }

    /// Whether a shutdown signal has been received.
    pub fn should_terminate() -> bool {
        SHOULD_TERMINATE.load(Ordering::Relaxed)
    }

    /// Exit code matching the signal that requested termination, if any.
    /// SIGTERM maps to 143, SIGINT to 130.
    pub fn termination_code() -> Option<ExitCode> {
        match TERMINATION_SIGNAL.load(Ordering::Relaxed) {
            0 => None,
            #[cfg(unix)]
            sig if sig == SIGTERM => Some(ExitCode::SignalTerm),
            #[cfg(unix)]
            sig if sig == SIGPIPE => Some(ExitCode::SignalPipe),
            _ => Some(ExitCode::SignalInt),
        }
    }
}
