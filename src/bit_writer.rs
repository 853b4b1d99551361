use std::io::{BufWriter, Write};

use crate::bit_reader::top_mask;
use crate::error::{Error, Result};

/// Writes a byte sink one bit, one byte, or up to 8 bits at a time.
///
/// Bits are packed MSB-first. A partial trailing byte stays in `cache`
/// until it fills up or [`align`](Self::align) pads it out.
///
/// [`flush`](Self::flush) only pushes the underlying `BufWriter`; it never
/// emits the partial byte. Call `align()` first if those bits must survive.
pub struct BitWriter<W: Write> {
    inner: BufWriter<W>,
    cache: u8,
    cache_len: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner: BufWriter::new(inner),
            cache: 0,
            cache_len: 0,
        }
    }

    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        BitWriter {
            inner: BufWriter::with_capacity(capacity, inner),
            cache: 0,
            cache_len: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(if bit { 0x80 } else { 0 }, 1)
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.cache_len == 0 {
            self.inner.write_all(&[byte])?;
            return Ok(());
        }

        let out = self.cache | (byte >> self.cache_len);
        self.inner.write_all(&[out])?;
        self.cache = byte << (8 - self.cache_len);
        Ok(())
    }

    pub fn write_bulk(&mut self, buffer: &[u8]) -> Result<()> {
        if self.cache_len == 0 {
            self.inner.write_all(buffer)?;
            return Ok(());
        }

        for &byte in buffer {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Write the top `n` bits of `bits`; the low `8 - n` bits are ignored.
    pub fn write_bits(&mut self, bits: u8, n: u8) -> Result<()> {
        if n > 8 {
            return Err(Error::InvalidWidth(n));
        }
        let bits = bits & top_mask(n);

        if self.cache_len + n < 8 {
            self.cache |= bits >> self.cache_len;
            self.cache_len += n;
            return Ok(());
        }

        let out = self.cache | (bits >> self.cache_len);
        self.inner.write_all(&[out])?;
        self.cache = ((bits as u16) << (8 - self.cache_len)) as u8;
        self.cache_len = self.cache_len + n - 8;
        Ok(())
    }

    /// Zero-pad the partial byte and emit it. Returns the number of padding
    /// bits written.
    pub fn align(&mut self) -> Result<u8> {
        if self.cache_len == 0 {
            return Ok(0);
        }
        let padding = 8 - self.cache_len;
        self.write_bits(0, padding)?;
        Ok(padding)
    }

    /// Flush buffered whole bytes to the sink. A pending partial byte is
    /// left in the cursor.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Bits waiting in the partial byte.
    pub fn pending_bits(&self) -> u8 {
        self.cache_len
    }

    pub fn is_aligned(&self) -> bool {
        self.cache_len == 0
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Flush whole bytes and unwrap the sink. The partial byte, if any, is
    /// dropped.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    fn finish(writer: BitWriter<Vec<u8>>) -> Vec<u8> {
        writer.into_inner().unwrap()
    }

    #[test]
    fn packs_bits_msb_first() {
        let mut w = BitWriter::new(Vec::new());
        for bit in [true, false, true, true, false, false, false, true] {
            w.write_bit(bit).unwrap();
        }
        assert!(w.is_aligned());
        assert_eq!(finish(w), vec![0b1011_0001]);
    }

    #[test]
    fn write_bits_masks_and_spills() {
        let mut w = BitWriter::new(Vec::new());
        // only the top 3 bits (101) count
        w.write_bits(0b1011_1111, 3).unwrap();
        w.write_bits(0b1111_0000, 7).unwrap();
        assert_eq!(w.pending_bits(), 2);
        w.align().unwrap();
        assert_eq!(finish(w), vec![0b1011_1110, 0b0000_0000]);
    }

    #[test]
    fn byte_write_straddles_cursor() {
        let mut w = BitWriter::new(Vec::new());
        w.write_bits(0b1100_0000, 2).unwrap();
        w.write_byte(0xFF).unwrap();
        w.write_bulk(&[0x00]).unwrap();
        assert_eq!(w.pending_bits(), 2);
        assert_eq!(w.align().unwrap(), 6);
        assert_eq!(finish(w), vec![0b1111_1111, 0b1100_0000, 0b0000_0000]);
    }

    #[test]
    fn rejects_wide_writes() {
        let mut w = BitWriter::new(Vec::new());
        assert!(matches!(w.write_bits(0, 9), Err(Error::InvalidWidth(9))));
        w.write_bits(0xAA, 0).unwrap();
        assert!(w.is_aligned());
    }

    #[test]
    fn flush_does_not_emit_partial_byte() {
        let mut w = BitWriter::new(Vec::new());
        w.write_byte(0x42).unwrap();
        w.write_bit(true).unwrap();
        w.flush().unwrap();
        assert_eq!(w.get_ref(), &vec![0x42]);

        w.align().unwrap();
        w.flush().unwrap();
        assert_eq!(w.get_ref(), &vec![0x42, 0x80]);
    }

    #[test]
    fn align_is_noop_on_boundary() {
        let mut w = BitWriter::new(Vec::new());
        assert_eq!(w.align().unwrap(), 0);
        assert!(finish(w).is_empty());
    }

    struct FullSink;

    impl Write for FullSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failures_surface_on_flush() {
        let mut w = BitWriter::with_capacity(4, FullSink);
        // fits in the buffer, so the sink is not touched yet
        w.write_byte(1).unwrap();
        w.write_bits(0b1010_0000, 3).unwrap();
        let err = w.flush().unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::Other));
    }

    #[test]
    fn sink_failures_surface_on_oversized_write() {
        let mut w = BitWriter::with_capacity(1, FullSink);
        let err = w.write_byte(1).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::Other));
    }
}
