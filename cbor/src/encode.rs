/*!
Bounded encoding of decoded trees.

Heads are always written at their shortest width. Floats are always written
as 8-byte doubles: the decoder keeps no record of the width a float was
originally encoded with.
*/

use super::node::{Kind, Node, Value};
use super::store::NodeStore;
use super::tree::Item;
use thiserror::Error;
use tracing::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    #[error("Destination buffer is too small")]
    BufferOverflow,

    #[error("{0:?} items cannot be encoded")]
    Unencodable(Kind),
}

const BREAK: u8 = 0xFF;

/// Something heads and payloads can be written to
trait Sink {
    fn emit(&mut self, data: &[u8]) -> Result<(), Error>;

    fn emit_byte(&mut self, b: u8) -> Result<(), Error> {
        self.emit(&[b])
    }

    fn emit_uint_minor(&mut self, major: u8, val: u64) -> Result<(), Error> {
        if val < 24 {
            self.emit_byte((major << 5) | (val as u8))
        } else if val <= u8::MAX as u64 {
            self.emit(&[(major << 5) | 24, val as u8])
        } else if val <= u16::MAX as u64 {
            let mut b = [(major << 5) | 25, 0, 0];
            b[1..].copy_from_slice(&(val as u16).to_be_bytes());
            self.emit(&b)
        } else if val <= u32::MAX as u64 {
            let mut b = [(major << 5) | 26, 0, 0, 0, 0];
            b[1..].copy_from_slice(&(val as u32).to_be_bytes());
            self.emit(&b)
        } else {
            let mut b = [(major << 5) | 27, 0, 0, 0, 0, 0, 0, 0, 0];
            b[1..].copy_from_slice(&val.to_be_bytes());
            self.emit(&b)
        }
    }

    fn emit_double(&mut self, val: f64) -> Result<(), Error> {
        let mut b = [(7 << 5) | 27, 0, 0, 0, 0, 0, 0, 0, 0];
        b[1..].copy_from_slice(&val.to_bits().to_be_bytes());
        self.emit(&b)
    }

    /// Everything up to the first child, or the whole item if it has none
    fn emit_head(&mut self, node: &Node) -> Result<(), Error> {
        match node.value {
            Value::Unsigned(v) => self.emit_uint_minor(0, v),
            Value::Signed(v) => self.emit_uint_minor(1, (!v) as u64),
            Value::Bytes(v) => {
                self.emit_uint_minor(2, v.len() as u64)?;
                self.emit(v)
            }
            Value::Text(v) => {
                self.emit_uint_minor(3, v.len() as u64)?;
                self.emit(v)
            }
            Value::BytesChunked => self.emit_byte((2 << 5) | 31),
            Value::TextChunked => self.emit_byte((3 << 5) | 31),
            Value::Array { indefinite: true } => self.emit_byte((4 << 5) | 31),
            Value::Array { indefinite: false } => self.emit_uint_minor(4, node.length as u64),
            Value::Map { indefinite: true } => self.emit_byte((5 << 5) | 31),
            Value::Map { indefinite: false } => {
                self.emit_uint_minor(5, (node.length / 2) as u64)
            }
            Value::Tag(t) => self.emit_uint_minor(6, t),
            Value::Simple(v) => self.emit_uint_minor(7, v as u64),
            Value::False => self.emit_byte((7 << 5) | 20),
            Value::True => self.emit_byte((7 << 5) | 21),
            Value::Null => self.emit_byte((7 << 5) | 22),
            Value::Undefined => self.emit_byte((7 << 5) | 23),
            Value::Double(v) => self.emit_double(v),
            Value::Invalid => Err(Error::Unencodable(Kind::Invalid)),
        }
    }

    /// The break marker closing an indefinite-length item, if any
    fn emit_tail(&mut self, node: &Node) -> Result<(), Error> {
        match node.value {
            Value::BytesChunked
            | Value::TextChunked
            | Value::Array { indefinite: true }
            | Value::Map { indefinite: true } => self.emit_byte(BREAK),
            _ => Ok(()),
        }
    }
}

/// A bounds-checked writer over caller-provided storage.
///
/// Every write checks the remaining space first, so an overflowing write
/// leaves the buffer beyond the current offset untouched.
pub struct Writer<'b> {
    data: &'b mut [u8],
    start: usize,
    offset: usize,
}

impl<'b> Writer<'b> {
    /// A writer starting at `offset` within `data`
    pub fn new(data: &'b mut [u8], offset: usize) -> Result<Self, Error> {
        if offset > data.len() {
            return Err(Error::BufferOverflow);
        }
        Ok(Self {
            data,
            start: offset,
            offset,
        })
    }

    /// The current absolute offset into the buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes written since the writer was created
    pub fn written(&self) -> usize {
        self.offset - self.start
    }

    /// Write a head of major type `major` with argument `val`
    pub fn emit_uint_minor(&mut self, major: u8, val: u64) -> Result<(), Error> {
        Sink::emit_uint_minor(self, major, val)
    }

    /// Write a negative integer
    pub fn emit_negative(&mut self, val: i64) -> Result<(), Error> {
        Sink::emit_uint_minor(self, 1, (!val) as u64)
    }

    pub fn emit_double(&mut self, val: f64) -> Result<(), Error> {
        Sink::emit_double(self, val)
    }

    /// Write an indefinite-length head for `major`
    pub fn emit_indefinite(&mut self, major: u8) -> Result<(), Error> {
        self.emit_byte((major << 5) | 31)
    }

    pub fn emit_break(&mut self) -> Result<(), Error> {
        self.emit_byte(BREAK)
    }

    pub fn emit_raw_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.emit(data)
    }
}

impl Sink for Writer<'_> {
    fn emit(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.offset + data.len();
        if end > self.data.len() {
            trace!(
                "Encoder overflow writing {} bytes at offset {} of {}",
                data.len(),
                self.offset,
                self.data.len()
            );
            return Err(Error::BufferOverflow);
        }
        self.data[self.offset..end].copy_from_slice(data);
        self.offset = end;
        Ok(())
    }
}

/// Counts bytes instead of writing them
struct Measure(usize);

impl Sink for Measure {
    fn emit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.0 += data.len();
        Ok(())
    }
}

/// Walk `item` depth first through its child, sibling and parent links,
/// emitting every node.
fn walk<'a, S, K>(sink: &mut K, item: Item<'_, 'a, S>) -> Result<(), Error>
where
    S: NodeStore<'a> + ?Sized,
    K: Sink,
{
    let store = item.store();
    let root = item.id();
    let mut cur = root;
    loop {
        let node = store.get(cur);
        sink.emit_head(node)?;
        if let Some(child) = node.first_child {
            cur = child;
            continue;
        }

        loop {
            let node = store.get(cur);
            sink.emit_tail(node)?;
            if cur == root {
                return Ok(());
            }
            match (node.next, node.parent) {
                (Some(next), _) => {
                    cur = next;
                    break;
                }
                (None, Some(parent)) => cur = parent,
                (None, None) => return Ok(()),
            }
        }
    }
}

/// Encode `item` into `data` starting at `offset`, returning the number of
/// bytes written.
pub fn encode<'a, S>(data: &mut [u8], offset: usize, item: Item<'_, 'a, S>) -> Result<usize, Error>
where
    S: NodeStore<'a> + ?Sized,
{
    let mut writer = Writer::new(data, offset)?;
    walk(&mut writer, item)?;
    Ok(writer.written())
}

/// The number of bytes [`encode`] would write for `item`.
pub fn encoded_len<'a, S>(item: Item<'_, 'a, S>) -> Result<usize, Error>
where
    S: NodeStore<'a> + ?Sized,
{
    let mut m = Measure(0);
    walk(&mut m, item)?;
    Ok(m.0)
}
