use lc3::{restore_terminal_mode, Config, TerminalGuard, TerminalIo};
use log::error;
use std::env;
use std::io::{self, Write};
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = Config::with(&args).unwrap_or_else(|message| {
        eprintln!("{}", message);
        process::exit(2);
    });

    let guard = TerminalGuard::new().unwrap_or_else(|err| {
        error!("failed to put terminal into raw mode: {}", err);
        process::exit(1);
    });

    // A blocking GETC/IN read can sit inside libc's read(2) indefinitely; a
    // default-disposition SIGINT there never unwinds back to `guard`'s
    // `Drop`, so the terminal restoration has to happen from the signal
    // handler itself, not from this function's own exit path.
    let original_mode = guard.original_mode();
    if let Err(err) = ctrlc::set_handler(move || {
        restore_terminal_mode(&original_mode);
        let _ = io::stdout().flush();
        process::exit(-2);
    }) {
        error!("failed to install SIGINT handler: {}", err);
    }

    let result = lc3::run(config, TerminalIo);
    drop(guard);

    if let Err(e) = result {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
