//! Buffered byte copying helpers

use crate::error::Result;
use std::io::{ErrorKind, Read, Write};

/// Size of the copy buffer used by every helper in this module
pub const BUFFER_SIZE: usize = 1 << 14;

/// Copy every byte from `input` to `output` without transformation.
///
/// Returns the number of bytes copied. `output` is not flushed.
pub fn copy_stream<R, W>(input: &mut R, output: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buf[..read])?;
        total += read as u64;
    }
    Ok(total)
}

/// Read `input` to its end into a new buffer.
pub fn read_fully<R: Read>(mut input: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    copy_stream(&mut input, &mut out)?;
    Ok(out)
}
