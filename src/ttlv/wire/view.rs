use crate::ttlv::{big_int::KmipBigInt, error::TtlvError, ttlv_struct::TtlvType};

/// Serialized size of a value of `len` bytes once padded to the 8-byte
/// alignment boundary.
#[must_use]
pub const fn padded_length(len: usize) -> usize {
    (len + 7) & !7
}

/// A read-only view over a byte slice holding exactly one TTLV item.
///
/// The header is `tag(3) type(1) length(4)`, all big-endian; the value
/// is padded with zero bytes to a multiple of eight. `parse` trims the
/// input to the item, so a view never extends past its own item.
#[derive(Debug, Clone, Copy)]
pub struct TtlvView<'a> {
    buf: &'a [u8],
}

impl<'a> TtlvView<'a> {
    /// Bind a view to the item starting at the head of `buf`.
    ///
    /// Fails with `Truncated` when the header or the padded value
    /// extends past the end of the input.
    pub fn parse(buf: &'a [u8]) -> Result<Self, TtlvError> {
        if buf.len() < 8 {
            return Err(TtlvError::Truncated(format!(
                "{} bytes left, 8 needed for a TTLV header",
                buf.len()
            )));
        }
        let length = usize::try_from(u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]))?;
        let full_len = 8_usize
            .checked_add(padded_length(length))
            .ok_or_else(|| TtlvError::Overflow("TTLV item length".to_owned()))?;
        if buf.len() < full_len {
            return Err(TtlvError::Truncated(format!(
                "{} bytes left, {full_len} needed for the TTLV item",
                buf.len()
            )));
        }
        Ok(Self {
            buf: &buf[..full_len],
        })
    }

    /// The 24-bit tag.
    #[must_use]
    pub fn tag(&self) -> u32 {
        u32::from(self.buf[0]) << 16 | u32::from(self.buf[1]) << 8 | u32::from(self.buf[2])
    }

    #[must_use]
    pub fn type_byte(&self) -> u8 {
        self.buf[3]
    }

    pub fn item_type(&self) -> Result<TtlvType, TtlvError> {
        TtlvType::try_from(self.type_byte())
    }

    /// The value length from the header, excluding padding.
    #[must_use]
    pub fn length(&self) -> usize {
        let length = u32::from_be_bytes([self.buf[4], self.buf[5], self.buf[6], self.buf[7]]);
        // parse() proved the padded value fits the buffer
        usize::try_from(length).unwrap_or_default().min(self.buf.len() - 8)
    }

    /// The serialized size of the item: header plus padded value.
    #[must_use]
    pub const fn full_len(&self) -> usize {
        self.buf.len()
    }

    /// The raw item bytes (header, value and padding).
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// The value bytes, without padding.
    #[must_use]
    pub fn value_bytes(&self) -> &'a [u8] {
        &self.buf[8..8 + self.length()]
    }

    fn padding_bytes(&self) -> &'a [u8] {
        &self.buf[8 + self.length()..]
    }

    fn expect_type(&self, expected: TtlvType) -> Result<(), TtlvError> {
        let got = self.item_type()?;
        if got == expected {
            Ok(())
        } else {
            Err(TtlvError::UnexpectedType {
                expected: expected.name(),
                got: got.name(),
            })
        }
    }

    fn fixed_value(&self, expected: TtlvType, len: usize) -> Result<&'a [u8], TtlvError> {
        self.expect_type(expected)?;
        if self.length() != len {
            return Err(TtlvError::InvalidLength {
                type_name: expected.name(),
                length: self.length(),
            });
        }
        Ok(self.value_bytes())
    }

    pub fn value_integer(&self) -> Result<i32, TtlvError> {
        let v = self.fixed_value(TtlvType::Integer, 4)?;
        Ok(i32::from_be_bytes([v[0], v[1], v[2], v[3]]))
    }

    pub fn value_long_integer(&self) -> Result<i64, TtlvError> {
        let v = self.fixed_value(TtlvType::LongInteger, 8)?;
        Ok(i64::from_be_bytes([
            v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7],
        ]))
    }

    pub fn value_big_integer(&self) -> Result<KmipBigInt, TtlvError> {
        self.expect_type(TtlvType::BigInteger)?;
        if self.length() % 8 != 0 {
            return Err(TtlvError::InvalidLength {
                type_name: TtlvType::BigInteger.name(),
                length: self.length(),
            });
        }
        Ok(KmipBigInt::from_bytes_be(self.value_bytes()))
    }

    pub fn value_enumeration(&self) -> Result<u32, TtlvError> {
        let v = self.fixed_value(TtlvType::Enumeration, 4)?;
        Ok(u32::from_be_bytes([v[0], v[1], v[2], v[3]]))
    }

    pub fn value_boolean(&self) -> Result<bool, TtlvError> {
        let v = self.fixed_value(TtlvType::Boolean, 8)?;
        if v[..7].iter().any(|b| *b != 0) || v[7] > 1 {
            return Err(TtlvError::InvalidBoolean);
        }
        Ok(v[7] == 1)
    }

    pub fn value_text_string(&self) -> Result<&'a str, TtlvError> {
        self.expect_type(TtlvType::TextString)?;
        std::str::from_utf8(self.value_bytes())
            .map_err(|e| TtlvError::InvalidUtf8(e.to_string()))
    }

    pub fn value_byte_string(&self) -> Result<&'a [u8], TtlvError> {
        self.expect_type(TtlvType::ByteString)?;
        Ok(self.value_bytes())
    }

    /// POSIX seconds.
    pub fn value_date_time(&self) -> Result<i64, TtlvError> {
        let v = self.fixed_value(TtlvType::DateTime, 8)?;
        Ok(i64::from_be_bytes([
            v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7],
        ]))
    }

    pub fn value_interval(&self) -> Result<u32, TtlvError> {
        let v = self.fixed_value(TtlvType::Interval, 4)?;
        Ok(u32::from_be_bytes([v[0], v[1], v[2], v[3]]))
    }

    /// POSIX microseconds.
    pub fn value_date_time_extended(&self) -> Result<i64, TtlvError> {
        let v = self.fixed_value(TtlvType::DateTimeExtended, 8)?;
        Ok(i64::from_be_bytes([
            v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7],
        ]))
    }

    /// Iterate the children of a Structure item.
    pub fn children(&self) -> Result<StructureIter<'a>, TtlvError> {
        self.expect_type(TtlvType::Structure)?;
        Ok(StructureIter {
            remaining: self.value_bytes(),
        })
    }

    /// Check the item against the TTLV grammar. Base validity covers the
    /// header, the length rules per type and the Boolean bit pattern;
    /// `strict` additionally requires zero padding and well-formed UTF-8.
    /// Structures are validated recursively.
    pub fn validate(&self, strict: bool) -> Result<(), TtlvError> {
        let item_type = self.item_type()?;
        match item_type {
            TtlvType::Structure => {
                // children are self-padded, so the value is their exact tiling
                if self.length() % 8 != 0 {
                    return Err(TtlvError::InvalidLength {
                        type_name: item_type.name(),
                        length: self.length(),
                    });
                }
                for child in self.children()? {
                    child?.validate(strict)?;
                }
            }
            TtlvType::Integer | TtlvType::Enumeration | TtlvType::Interval => {
                self.fixed_value(item_type, 4)?;
            }
            TtlvType::LongInteger | TtlvType::DateTime | TtlvType::DateTimeExtended => {
                self.fixed_value(item_type, 8)?;
            }
            TtlvType::Boolean => {
                self.value_boolean()?;
            }
            TtlvType::BigInteger => {
                self.value_big_integer()?;
            }
            TtlvType::TextString => {
                if strict {
                    self.value_text_string()?;
                }
            }
            TtlvType::ByteString => {}
        }
        if strict && self.padding_bytes().iter().any(|b| *b != 0) {
            return Err(TtlvError::InvalidPadding);
        }
        Ok(())
    }
}

/// Child iterator over a Structure's value; yields an error item if a
/// child header is inconsistent with the remaining bytes.
pub struct StructureIter<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for StructureIter<'a> {
    type Item = Result<TtlvView<'a>, TtlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        match TtlvView::parse(self.remaining) {
            Ok(child) => {
                self.remaining = &self.remaining[child.full_len()..];
                Some(Ok(child))
            }
            Err(e) => {
                // stop after reporting the malformed child
                self.remaining = &[];
                Some(Err(e))
            }
        }
    }
}
