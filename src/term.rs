//! Host I/O boundary: raw-mode terminal setup and non-blocking keyboard
//! polling. The core never talks to stdin/stdout directly — it goes
//! through the `HostIo` trait, which lets the trap dispatcher and the
//! memory-mapped keyboard read path be exercised against a fake in tests.

use libc::STDIN_FILENO;
use nix::sys::select::{select, FdSet};
use nix::sys::termios::{self, LocalFlags, SetArg, Termios};
use nix::sys::time::{TimeVal, TimeValLike};
use std::io::{self, Read, Write};

/// The capability the trap dispatcher and `Memory::read` need from the
/// host: read one byte (blocking), peek for one without consuming it,
/// and write bytes to the console.
pub trait HostIo {
    /// Non-blocking: `Some(byte)` if a key is already waiting, `None`
    /// otherwise. Must not block.
    fn poll_key(&mut self) -> Option<u8>;
    /// Blocking read of a single byte.
    fn read_byte(&mut self) -> io::Result<u8>;
    /// Write a single byte to the console (no flush).
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Puts stdin into raw mode (no line buffering, no echo) on construction
/// and restores the original mode when dropped. Restoration runs on every
/// exit path reachable through ordinary unwinding — normal return, `?`
/// propagation, or panic. It does *not* run on a default-disposition signal
/// (e.g. SIGINT), which never unwinds; `main` additionally installs a
/// handler that calls `restore_terminal_mode` directly from outside the
/// guard's own `Drop` for that path (see `original_mode`).
pub struct TerminalGuard {
    original: Termios,
}

impl TerminalGuard {
    pub fn new() -> nix::Result<Self> {
        let original = termios::tcgetattr(STDIN_FILENO)?;

        let mut raw = original.clone();
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        termios::tcsetattr(STDIN_FILENO, SetArg::TCSANOW, &raw)?;

        Ok(TerminalGuard { original })
    }

    /// A copy of the terminal mode captured at construction, for restoring
    /// from a context that can't rely on this guard's `Drop` running — a
    /// signal handler installed after construction, notably.
    pub fn original_mode(&self) -> Termios {
        self.original.clone()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_mode(&self.original);
    }
}

/// Sets stdin back to `mode` immediately. Used both by `TerminalGuard`'s
/// `Drop` and by the SIGINT handler in `main`, which restores the terminal
/// itself before exiting rather than going through `Drop`.
pub fn restore_terminal_mode(mode: &Termios) {
    let _ = termios::tcsetattr(STDIN_FILENO, SetArg::TCSANOW, mode);
}

/// The real host adapter: stdin/stdout of the process running the
/// emulator.
pub struct TerminalIo;

impl HostIo for TerminalIo {
    fn poll_key(&mut self) -> Option<u8> {
        let mut readfds = FdSet::new();
        readfds.insert(STDIN_FILENO);

        match select(None, &mut readfds, None, None, &mut TimeVal::zero()) {
            Ok(n) if n > 0 => {
                let mut buffer = [0u8; 1];
                match io::stdin().read_exact(&mut buffer) {
                    Ok(()) => Some(buffer[0]),
                    Err(_) => None,
                }
            }
            _ => None,
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buffer = [0u8; 1];
        io::stdin().read_exact(&mut buffer)?;
        Ok(buffer[0])
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        io::stdout().write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// A host adapter with no keyboard and a discarding console, for running
/// programs that never touch TRAP I/O (e.g. pure arithmetic test images)
/// without needing a real TTY.
pub struct NullHostIo;

impl HostIo for NullHostIo {
    fn poll_key(&mut self) -> Option<u8> {
        None
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        Ok(0)
    }

    fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
