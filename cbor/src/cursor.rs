use super::decode::ErrorKind;
use core::ops::Range;

/// A read position and exclusive end bound over an input buffer.
///
/// [`take`](Cursor::take) is the only bounds check in the decoder.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], range: Range<usize>) -> Result<Self, ErrorKind> {
        if range.start > range.end || range.end > data.len() {
            return Err(ErrorKind::InvalidParameter);
        }
        Ok(Self {
            data,
            pos: range.start,
            end: range.end,
        })
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ErrorKind> {
        if n > self.end - self.pos {
            return Err(ErrorKind::OutOfData);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ErrorKind> {
        self.take(N)?
            .try_into()
            .map_err(|_| ErrorKind::OutOfData)
    }

    pub fn take_u8(&mut self) -> Result<u8, ErrorKind> {
        self.take_array::<1>().map(|b| b[0])
    }

    pub fn take_u16(&mut self) -> Result<u16, ErrorKind> {
        self.take_array().map(u16::from_be_bytes)
    }

    pub fn take_u32(&mut self) -> Result<u32, ErrorKind> {
        self.take_array().map(u32::from_be_bytes)
    }

    pub fn take_u64(&mut self) -> Result<u64, ErrorKind> {
        self.take_array().map(u64::from_be_bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn big_endian() {
        let data = hex!("01020304050607080910111213141516");
        let mut c = Cursor::new(&data, 0..data.len()).unwrap();
        assert_eq!(c.take_u8().unwrap(), 0x01);
        assert_eq!(c.take_u16().unwrap(), 0x0203);
        assert_eq!(c.take_u32().unwrap(), 0x04050607);
        assert_eq!(c.take_u64().unwrap(), 0x0809101112131415);
        assert_eq!(c.offset(), 15);
        assert!(!c.is_empty());
        assert_eq!(c.take(1).unwrap(), &[0x16u8]);
        assert!(c.is_empty());
    }

    #[test]
    fn short_take_does_not_advance() {
        let data = hex!("000102");
        let mut c = Cursor::new(&data, 1..3).unwrap();
        assert_eq!(c.take_u32(), Err(ErrorKind::OutOfData));
        assert_eq!(c.offset(), 1);
        assert_eq!(c.take(2).unwrap(), &hex!("0102"));
        assert!(c.take(0).unwrap().is_empty());
        assert_eq!(c.take(1), Err(ErrorKind::OutOfData));
    }

    #[test]
    fn bad_range() {
        let data = hex!("0001");
        assert_eq!(
            Cursor::new(&data, 0..3).unwrap_err(),
            ErrorKind::InvalidParameter
        );
        #[allow(clippy::reversed_empty_ranges)]
        let r = Cursor::new(&data, 2..1);
        assert_eq!(r.unwrap_err(), ErrorKind::InvalidParameter);
    }
}
