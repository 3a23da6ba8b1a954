//! Image loading: turns an on-disk program image into an origin and a
//! stream of words ready for `Machine::load_image`.

use crate::error::LcError;
use byteorder::{BigEndian, ReadBytesExt};
use std::fs;
use std::io::{BufReader, ErrorKind};

/// An image file's contents: the address its first word should land at,
/// and the words that follow it.
pub struct Image {
    pub origin: u16,
    pub words: Vec<u16>,
}

/// Reads `path` as a stream of big-endian 16-bit words. The first word is
/// the origin; everything after it is the program/data to copy there.
pub fn load_image(path: &str) -> Result<Image, LcError> {
    let mut reader = BufReader::new(fs::File::open(path).map_err(LcError::ImageLoad)?);

    let origin = match reader.read_u16::<BigEndian>() {
        Ok(origin) => origin,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(LcError::EmptyImage),
        Err(e) => return Err(LcError::ImageLoad(e)),
    };

    let mut words = Vec::new();
    loop {
        match reader.read_u16::<BigEndian>() {
            Ok(word) => words.push(word),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(LcError::ImageLoad(e)),
        }
    }

    Ok(Image { origin, words })
}

/// Like [`load_image`], but a file containing only an origin with no
/// payload words is reported as [`LcError::TruncatedOrigin`] rather than
/// silently producing an empty program — distinguishing "no file at all"
/// from "a file that can't possibly do anything".
pub fn load_image_checked(path: &str) -> Result<Image, LcError> {
    let image = load_image(path)?;
    if image.words.is_empty() {
        return Err(LcError::TruncatedOrigin);
    }
    Ok(image)
}
