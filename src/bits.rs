//! # Bit Unpacking
//!
//! AIS payloads are armored six bits per character. [`BitSequence`] holds the
//! de-armored bits of a complete payload and supports random access extraction,
//! [`BitReader`] walks it sequentially for the message decoders.
//!
//! Integers are big-endian (most significant bit first). Signed values use two's
//! complement. Text uses the six bit ASCII subset:
//!
//! ```text
//! @ABCDEFGHIJKLMNOPQRSTUVWXYZ[\]^_ !"#$%&'()*+,-./0123456789:;<=>?
//! ```

use bitvec::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BitError, DecodeError, InvalidMessage, NmeaParseError};

const SIX_BIT_ASCII: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

/// Payload bits, numbered from the most significant bit of the first character.
type Bits = BitSlice<u8, Msb0>;

/// Immutable, fixed-length sequence of payload bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSequence {
    /// Every armored bit, fill bits included past `len`.
    bits: BitVec<u8, Msb0>,
    len: usize,
}

impl BitSequence {
    /// De-armors `armored`, dropping the last `fill_bits` bits.
    ///
    /// ```rust
    /// use aivdm_parser::BitSequence;
    ///
    /// let bits = BitSequence::from_payload("13AkSB0000PhAmJPoTMoiQFT0D1:", 0).unwrap();
    /// assert_eq!(bits.len(), 168);
    /// assert_eq!(bits.get_unsigned(0, 6), Ok(1));
    /// assert_eq!(bits.get_unsigned(8, 30), Ok(219997000));
    /// ```
    pub fn from_payload(armored: &str, fill_bits: u8) -> Result<Self, NmeaParseError> {
        if fill_bits > 5 {
            return Err(NmeaParseError::InvalidField {
                field: "fill_bits",
                value: fill_bits.to_string(),
            });
        }

        let mut bits = BitVec::<u8, Msb0>::with_capacity(armored.len() * 6);
        for c in armored.chars() {
            let code = dearmor(c)?;
            bits.extend_from_bitslice(&code.view_bits::<Msb0>()[2..]);
        }

        Ok(Self {
            len: bits.len().saturating_sub(fill_bits as usize),
            bits,
        })
    }

    /// Number of payload bits, fill bits excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A cursor at the start of the sequence.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader {
            bits: self,
            position: 0,
        }
    }

    /// Unsigned integer from bits `[start, start + width)`.
    pub fn get_unsigned(&self, start: usize, width: usize) -> Result<u64, BitError> {
        if width > 64 {
            return Err(BitError::InvalidWidth { width, max: 64 });
        }

        let field = self.field(start, width)?;
        Ok(if field.is_empty() { 0 } else { field.load_be() })
    }

    /// Two's complement integer from bits `[start, start + width)`.
    ///
    /// ```rust
    /// use aivdm_parser::BitSequence;
    ///
    /// let bits = BitSequence::from_payload("w0", 0).unwrap();
    /// assert_eq!(bits.get_signed(0, 6), Ok(-1));
    /// assert_eq!(bits.get_signed(0, 12), Ok(-64));
    /// assert_eq!(bits.get_signed(6, 6), Ok(0));
    /// ```
    pub fn get_signed(&self, start: usize, width: usize) -> Result<i64, BitError> {
        let raw = self.get_unsigned(start, width)?;
        if width == 0 {
            return Ok(0);
        }

        let shift = 64 - width;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Six bit text from bits `[start, start + width)`.
    ///
    /// Trailing `@` padding and trailing spaces are removed.
    pub fn get_string(&self, start: usize, width: usize) -> Result<String, BitError> {
        if width % 6 != 0 {
            return Err(BitError::UnalignedText { width });
        }

        let text: String = self
            .field(start, width)?
            .chunks_exact(6)
            .map(|code| SIX_BIT_ASCII[code.load_be::<usize>()] as char)
            .collect();

        Ok(text.trim_end_matches(['@', ' ']).to_string())
    }

    /// Bits `[start, start + width)` packed into bytes, the last one padded with zeros.
    pub fn get_binary(&self, start: usize, width: usize) -> Result<BinaryData, BitError> {
        let bytes = self
            .field(start, width)?
            .chunks(8)
            .map(|byte| byte.load_be::<u8>() << (8 - byte.len()))
            .collect();

        Ok(BinaryData { bytes, len: width })
    }

    /// Re-armors the sequence, returning the payload and its fill bits.
    ///
    /// The fill bits keep whatever value they had in the original payload.
    ///
    /// ```rust
    /// use aivdm_parser::BitSequence;
    ///
    /// let bits = BitSequence::from_payload("00", 4).unwrap();
    /// assert_eq!(bits.len(), 8);
    /// assert_eq!(bits.armor(), ("00".to_string(), 4));
    /// ```
    pub fn armor(&self) -> (String, u8) {
        let padded = self.len.div_ceil(6) * 6;
        let payload = self.bits[..padded]
            .chunks_exact(6)
            .map(|code| armor(code.load_be()))
            .collect();

        (payload, (padded - self.len) as u8)
    }

    fn field(&self, start: usize, width: usize) -> Result<&Bits, BitError> {
        match start.checked_add(width) {
            Some(end) if end <= self.len => Ok(&self.bits[start..end]),
            _ => Err(BitError::OutOfRange {
                start,
                width,
                len: self.len,
            }),
        }
    }
}

fn dearmor(c: char) -> Result<u8, NmeaParseError> {
    match c {
        '0'..='W' | '`'..='w' => {
            let value = c as u8 - 48;
            Ok(if value > 40 { value - 8 } else { value })
        }
        _ => Err(NmeaParseError::InvalidPayloadCharacter(c)),
    }
}

fn armor(value: u8) -> char {
    (if value < 40 { value + 48 } else { value + 56 }) as char
}

/// Raw binary application data, packed most significant bit first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BinaryData {
    bytes: Vec<u8>,
    len: usize,
}

impl BinaryData {
    /// The data bytes. Bits past [`len`](Self::len) in the last byte are zero.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of data bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Sequential cursor over a [`BitSequence`].
///
/// Every `read_*` method advances the cursor by the number of bits read and leaves it
/// unchanged on error.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSequence,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitSequence) -> Self {
        bits.reader()
    }

    /// Offset of the next bit to read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bits left after the cursor.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }

    /// Total length of the underlying sequence.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn read_unsigned(&mut self, width: usize) -> Result<u64, BitError> {
        let value = self.bits.get_unsigned(self.position, width)?;
        self.position += width;
        Ok(value)
    }

    pub fn read_signed(&mut self, width: usize) -> Result<i64, BitError> {
        let value = self.bits.get_signed(self.position, width)?;
        self.position += width;
        Ok(value)
    }

    pub fn read_string(&mut self, width: usize) -> Result<String, BitError> {
        let value = self.bits.get_string(self.position, width)?;
        self.position += width;
        Ok(value)
    }

    pub fn read_binary(&mut self, width: usize) -> Result<BinaryData, BitError> {
        let value = self.bits.get_binary(self.position, width)?;
        self.position += width;
        Ok(value)
    }

    /// Reads as many whole characters as remain. Leftover bits are left unread.
    pub fn read_text_to_end(&mut self) -> Result<String, BitError> {
        self.read_string(self.remaining() / 6 * 6)
    }

    pub fn read_binary_to_end(&mut self) -> Result<BinaryData, BitError> {
        self.read_binary(self.remaining())
    }

    /// Skips `width` spare bits.
    pub fn skip(&mut self, width: usize) -> Result<(), BitError> {
        if width > self.remaining() {
            return Err(BitError::OutOfRange {
                start: self.position,
                width,
                len: self.bits.len(),
            });
        }

        self.position += width;
        Ok(())
    }

    /// Reads an unsigned integer at an absolute offset without moving the cursor.
    pub fn peek_unsigned(&self, start: usize, width: usize) -> Result<u64, BitError> {
        self.bits.get_unsigned(start, width)
    }

    /// The message type code in the first six bits, `0` when there are fewer.
    pub fn message_type(&self) -> u8 {
        self.peek_unsigned(0, 6).unwrap_or_default() as u8
    }

    /// Fails with [`InvalidMessage::Truncated`] unless the sequence holds at least `len` bits.
    pub fn require(&self, len: usize) -> Result<(), DecodeError> {
        if self.bits.len() < len {
            return Err(InvalidMessage::Truncated {
                message_type: self.message_type(),
                len: self.bits.len(),
                required: len,
            }
            .into());
        }

        Ok(())
    }

    /// Error for a field holding a value its layout does not define.
    pub fn unexpected_value(&self, field: &'static str, value: impl Into<u64>) -> DecodeError {
        InvalidMessage::UnexpectedValue {
            message_type: self.message_type(),
            field,
            value: value.into(),
        }
        .into()
    }
}

/// Types read from a fixed number of bits.
pub trait FromBits: Sized {
    fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError>;
}

/// Types that decode themselves from the current reader position.
///
/// Usually implemented with `#[derive(BitParse)]`.
pub trait BitParse: Sized {
    fn parse(bits: &mut BitReader<'_>) -> Result<Self, DecodeError>;
}

macro_rules! from_bits_unsigned {
    ($($ty:ty),+) => {
        $(
            impl FromBits for $ty {
                fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
                    check_width(width, <$ty>::BITS)?;
                    bits.read_unsigned(width).map(|value| value as $ty)
                }
            }
        )+
    };
}

macro_rules! from_bits_signed {
    ($($ty:ty),+) => {
        $(
            impl FromBits for $ty {
                fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
                    check_width(width, <$ty>::BITS)?;
                    bits.read_signed(width).map(|value| value as $ty)
                }
            }
        )+
    };
}

from_bits_unsigned!(u8, u16, u32, u64);
from_bits_signed!(i8, i16, i32, i64);

fn check_width(width: usize, max: u32) -> Result<(), BitError> {
    if width > max as usize {
        return Err(BitError::InvalidWidth {
            width,
            max: max as usize,
        });
    }
    Ok(())
}

impl FromBits for bool {
    fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
        bits.read_unsigned(width).map(|value| value != 0)
    }
}

impl FromBits for String {
    fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
        bits.read_string(width)
    }
}

impl FromBits for BinaryData {
    fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
        bits.read_binary(width)
    }
}
