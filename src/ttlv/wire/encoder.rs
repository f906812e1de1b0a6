use crate::ttlv::{big_int::KmipBigInt, error::TtlvError, ttlv_struct::TtlvType};

const TAG_MAX: u32 = 0x00FF_FFFF;

/// Append-only TTLV encoder over a growable buffer.
///
/// Scalar encoders write the header, the big-endian value and the zero
/// padding in one step. [`TtlvEncoder::structure`] reserves the header,
/// lets the caller append the children and back-patches the length; no
/// trailing padding is emitted because every child is already aligned.
#[derive(Default)]
pub struct TtlvEncoder {
    buf: Vec<u8>,
}

impl TtlvEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn header(&mut self, tag: u32, item_type: TtlvType, length: usize) -> Result<(), TtlvError> {
        if tag > TAG_MAX {
            return Err(TtlvError::Overflow(format!(
                "tag {tag:#X} does not fit in 24 bits"
            )));
        }
        let length = u32::try_from(length)
            .map_err(|_e| TtlvError::Overflow(format!("value length {length}")))?;
        let tag_bytes = tag.to_be_bytes();
        self.buf.extend_from_slice(&tag_bytes[1..]);
        self.buf.push(item_type.to_byte());
        self.buf.extend_from_slice(&length.to_be_bytes());
        Ok(())
    }

    fn pad(&mut self, value_len: usize) {
        let rem = value_len % 8;
        if rem != 0 {
            self.buf.resize(self.buf.len() + (8 - rem), 0);
        }
    }

    pub fn integer(&mut self, tag: u32, value: i32) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::Integer, 4)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        self.pad(4);
        Ok(())
    }

    pub fn long_integer(&mut self, tag: u32, value: i64) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::LongInteger, 8)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn big_integer(&mut self, tag: u32, value: &KmipBigInt) -> Result<(), TtlvError> {
        let bytes = value.to_bytes_be();
        self.header(tag, TtlvType::BigInteger, bytes.len())?;
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    pub fn enumeration(&mut self, tag: u32, value: u32) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::Enumeration, 4)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        self.pad(4);
        Ok(())
    }

    pub fn boolean(&mut self, tag: u32, value: bool) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::Boolean, 8)?;
        let mut bytes = [0_u8; 8];
        bytes[7] = u8::from(value);
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    pub fn text_string(&mut self, tag: u32, value: &str) -> Result<(), TtlvError> {
        let bytes = value.as_bytes();
        self.header(tag, TtlvType::TextString, bytes.len())?;
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len());
        Ok(())
    }

    pub fn byte_string(&mut self, tag: u32, value: &[u8]) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::ByteString, value.len())?;
        self.buf.extend_from_slice(value);
        self.pad(value.len());
        Ok(())
    }

    /// POSIX seconds.
    pub fn date_time(&mut self, tag: u32, seconds: i64) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::DateTime, 8)?;
        self.buf.extend_from_slice(&seconds.to_be_bytes());
        Ok(())
    }

    pub fn interval(&mut self, tag: u32, seconds: u32) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::Interval, 4)?;
        self.buf.extend_from_slice(&seconds.to_be_bytes());
        self.pad(4);
        Ok(())
    }

    /// POSIX microseconds.
    pub fn date_time_extended(&mut self, tag: u32, micros: i64) -> Result<(), TtlvError> {
        self.header(tag, TtlvType::DateTimeExtended, 8)?;
        self.buf.extend_from_slice(&micros.to_be_bytes());
        Ok(())
    }

    /// Encode a Structure: `f` appends the children, after which the
    /// reserved length field is patched to the bytes they produced.
    pub fn structure<F>(&mut self, tag: u32, f: F) -> Result<(), TtlvError>
    where
        F: FnOnce(&mut Self) -> Result<(), TtlvError>,
    {
        self.header(tag, TtlvType::Structure, 0)?;
        let value_start = self.buf.len();
        f(self)?;
        let length = u32::try_from(self.buf.len() - value_start)
            .map_err(|_e| TtlvError::Overflow("structure length".to_owned()))?;
        self.buf[value_start - 4..value_start].copy_from_slice(&length.to_be_bytes());
        Ok(())
    }
}
