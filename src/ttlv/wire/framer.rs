use std::io::{ErrorKind, Read, Write};

use crate::ttlv::error::TtlvError;

use super::view::padded_length;

/// Default cap on a single top-level TTLV item, 1 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Extracts one complete top-level TTLV item at a time from a byte
/// stream, and writes one back. Stateless between messages; transports
/// deliver items back-to-back with no framing beyond TTLV's own.
#[derive(Debug, Clone, Copy)]
pub struct MessageFramer {
    max_message_size: usize,
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl MessageFramer {
    #[must_use]
    pub const fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    /// Read one complete item into a fresh buffer.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly before the first
    /// header byte. An item whose full length exceeds the configured
    /// maximum fails with `MessageTooLarge` without consuming the body.
    /// An end-of-file or read timeout inside an item is `Truncated`;
    /// I/O errors before the first byte pass through untouched so the
    /// caller can tell an idle timeout from a broken stream.
    pub fn read_message<R: Read>(&self, reader: &mut R) -> Result<Option<Vec<u8>>, TtlvError> {
        let mut header = [0_u8; 8];
        let mut filled = 0_usize;
        while filled < header.len() {
            match reader.read(&mut header[filled..]) {
                Ok(0) => {
                    if filled == 0 {
                        return Ok(None);
                    }
                    return Err(TtlvError::Truncated(format!(
                        "stream ended after {filled} header bytes"
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e)
                    if filled > 0
                        && matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Err(TtlvError::Truncated(format!(
                        "read timed out after {filled} header bytes"
                    )));
                }
                Err(e) => return Err(TtlvError::Io(e)),
            }
        }

        let length = usize::try_from(u32::from_be_bytes([
            header[4], header[5], header[6], header[7],
        ]))?;
        let full_len = 8_usize
            .checked_add(padded_length(length))
            .ok_or_else(|| TtlvError::Overflow("TTLV item length".to_owned()))?;
        if full_len > self.max_message_size {
            return Err(TtlvError::MessageTooLarge {
                size: full_len,
                max: self.max_message_size,
            });
        }

        let mut message = vec![0_u8; full_len];
        message[..8].copy_from_slice(&header);
        reader.read_exact(&mut message[8..]).map_err(|e| {
            if matches!(
                e.kind(),
                ErrorKind::UnexpectedEof | ErrorKind::WouldBlock | ErrorKind::TimedOut
            ) {
                TtlvError::Truncated(format!(
                    "stream ended inside a {full_len}-byte TTLV item"
                ))
            } else {
                TtlvError::Io(e)
            }
        })?;
        Ok(Some(message))
    }

    /// Write one fully encoded item; short writes are fatal.
    pub fn write_message<W: Write>(&self, writer: &mut W, message: &[u8]) -> Result<(), TtlvError> {
        writer.write_all(message)?;
        writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub const fn max_message_size(&self) -> usize {
        self.max_message_size
    }
}
