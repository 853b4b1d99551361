use std::io::{BufReader, Read};

use crate::error::{Error, Result};

/// Mask selecting the top `n` bits of a byte (`n` in `0..=8`).
#[inline]
pub(crate) fn top_mask(n: u8) -> u8 {
    (0xFF00u16 >> n) as u8
}

/// Reads a byte source one bit, one byte, or up to 8 bits at a time.
///
/// Bits are consumed MSB-first. Leftover bits of a partially consumed byte
/// are kept left-justified in `cache`, with `cache_len` in `0..8` and every
/// bit below the valid ones zero.
pub struct BitReader<R> {
    inner: BufReader<R>,
    cache: u8,
    cache_len: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        BitReader {
            inner: BufReader::new(inner),
            cache: 0,
            cache_len: 0,
        }
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        BitReader {
            inner: BufReader::with_capacity(capacity, inner),
            cache: 0,
            cache_len: 0,
        }
    }

    fn next_source_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.inner.read_exact(&mut byte).map_err(Error::from_read)?;
        Ok(byte[0])
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.cache_len > 0 {
            let bit = self.cache & 0x80 != 0;
            self.cache <<= 1;
            self.cache_len -= 1;
            return Ok(bit);
        }

        let byte = self.next_source_byte()?;
        self.cache = byte << 1;
        self.cache_len = 7;
        Ok(byte & 0x80 != 0)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.next_source_byte()?;
        if self.cache_len == 0 {
            return Ok(byte);
        }

        // cache_len stays the same: we hand out 8 bits and take in 8 bits
        let result = self.cache | (byte >> self.cache_len);
        self.cache = byte << (8 - self.cache_len);
        Ok(result)
    }

    /// Fill `buffer` completely.
    pub fn read_bulk(&mut self, buffer: &mut [u8]) -> Result<()> {
        if self.cache_len == 0 {
            return self.inner.read_exact(buffer).map_err(Error::from_read);
        }

        for slot in buffer.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Read the next `n` bits, returned left-justified in a byte.
    ///
    /// Reading 3 bits from `0b1011_0000` yields `0b1010_0000`.
    pub fn read_bits(&mut self, n: u8) -> Result<u8> {
        if n > 8 {
            return Err(Error::InvalidWidth(n));
        }
        if n == 0 {
            return Ok(0);
        }

        if n <= self.cache_len {
            let result = self.cache & top_mask(n);
            self.cache = ((self.cache as u16) << n) as u8;
            self.cache_len -= n;
            return Ok(result);
        }

        let byte = self.next_source_byte()?;
        // cache bits followed by the fresh byte, all left-justified in 16 bits
        let combined = ((self.cache as u16) << 8) | ((byte as u16) << (8 - self.cache_len));
        let result = (combined >> 8) as u8 & top_mask(n);
        self.cache = ((combined << n) >> 8) as u8;
        self.cache_len = self.cache_len + 8 - n;
        Ok(result)
    }

    /// Drop whatever is left of the current byte. Returns the number of
    /// bits discarded.
    pub fn align(&mut self) -> u8 {
        let dropped = self.cache_len;
        self.cache = 0;
        self.cache_len = 0;
        dropped
    }

    /// Bits of an already-fetched byte that have not been handed out yet.
    pub fn pending_bits(&self) -> u8 {
        self.cache_len
    }

    pub fn is_aligned(&self) -> bool {
        self.cache_len == 0
    }

    /// Unwrap the source. Bytes already pulled into the read buffer are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}
