use std::fmt;
use std::io;

/// Everything that can go wrong between loading an image and running it to
/// HALT. Kept as named variants (rather than `Box<dyn Error>`) because the
/// CLI needs to tell these apart to pick an exit code.
#[derive(Debug)]
pub enum LcError {
    /// The image file couldn't be opened or read.
    ImageLoad(io::Error),
    /// The image file contained no words at all, not even an origin.
    EmptyImage,
    /// EOF hit while reading the two-byte origin.
    TruncatedOrigin,
    /// The guest executed RTI (0x8) or RES (0xD). Carries the raw
    /// instruction word for diagnostics.
    IllegalInstruction(u16),
    /// The guest executed a TRAP with a vector outside 0x20..=0x25.
    UnknownTrapVector(u8),
    /// stdout could not be written to.
    HostIo(io::Error),
}

impl LcError {
    /// The process exit code for the CLI driver. Usage errors (missing
    /// arguments) never produce an `LcError` at all — they're caught by
    /// `Config::with` before a `Machine` exists, and exit 2 directly.
    /// Every `LcError` variant is a runtime failure, so all of them exit 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for LcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcError::ImageLoad(e) => write!(f, "failed to load image: {}", e),
            LcError::EmptyImage => write!(f, "image file is empty"),
            LcError::TruncatedOrigin => write!(f, "image file is too short to contain an origin"),
            LcError::IllegalInstruction(word) => {
                write!(f, "illegal instruction: {:#06x}", word)
            }
            LcError::UnknownTrapVector(vector) => {
                write!(f, "unknown trap vector: {:#04x}", vector)
            }
            LcError::HostIo(e) => write!(f, "host I/O error: {}", e),
        }
    }
}

impl std::error::Error for LcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LcError::ImageLoad(e) | LcError::HostIo(e) => Some(e),
            _ => None,
        }
    }
}
