mod config;
mod cpu;
mod error;
mod flags;
mod instruction;
mod loader;
mod machine;
mod memory;
mod registers;
mod sign_extend;
mod term;
mod trap;
mod trap_vector;

pub use crate::config::Config;
pub use crate::error::LcError;
pub use crate::machine::Machine;
pub use crate::term::{restore_terminal_mode, HostIo, NullHostIo, TerminalGuard, TerminalIo};

use log::info;

/// Boots a `Machine` on `host`, loads every configured image file onto it
/// in order, and runs it to HALT (or a fatal error).
pub fn run<H: HostIo>(config: Config, host: H) -> Result<Machine<H>, LcError> {
    let mut machine = Machine::new(host);

    for path in &config.image_files {
        info!("loading image {}", path);
        let image = loader::load_image_checked(path)?;
        machine.load_image(image.origin, &image.words);
    }

    machine.run()
}
