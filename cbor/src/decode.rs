/*!
The decode engine.

Decoding is a single pass over the input that builds the tree without
recursion: the node currently being filled is the implicit stack, and
finishing a node moves back up through its parent link. Nesting depth is
therefore bounded only by the node store, never by the call stack.
*/

use super::cursor::Cursor;
use super::node::{Fill, Kind, Node, NodeId, Value};
use super::store::{Arena, NodeStore};
use super::teardown;
use super::tree::Document;
use core::ops::Range;
use thiserror::Error;
use tracing::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[error("Not enough data for encoded value")]
    OutOfData,

    #[error("Additional data after the encoded value")]
    NotAllDataConsumed,

    #[error("Indefinite-length map with an odd number of items")]
    OddSizeIndefMap,

    #[error("Break marker outside an indefinite-length item")]
    BreakOutsideIndef,

    #[error("Indefinite length is not defined for this major type")]
    MtUndefForIndef,

    #[error("Reserved additional information value")]
    ReservedAI,

    #[error("Chunk of the wrong type in an indefinite-length string")]
    WrongNestingInIndefString,

    #[error("Invalid parameter")]
    InvalidParameter,

    #[error("Out of memory")]
    OutOfMemory,
}

impl ErrorKind {
    /// A stable identifier for the error kind
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::OutOfData => "OUT_OF_DATA",
            ErrorKind::NotAllDataConsumed => "NOT_ALL_DATA_CONSUMED",
            ErrorKind::OddSizeIndefMap => "ODD_SIZE_INDEF_MAP",
            ErrorKind::BreakOutsideIndef => "BREAK_OUTSIDE_INDEF",
            ErrorKind::MtUndefForIndef => "MT_UNDEF_FOR_INDEF",
            ErrorKind::ReservedAI => "RESERVED_AI",
            ErrorKind::WrongNestingInIndefString => "WRONG_NESTING_IN_INDEF_STRING",
            ErrorKind::InvalidParameter => "INVALID_PARAMETER",
            ErrorKind::OutOfMemory => "OUT_OF_MEMORY",
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{kind} at offset {offset}")]
pub struct Error {
    pub kind: ErrorKind,
    /// Byte offset into the input at which the error was detected
    pub offset: usize,
}

const BREAK: u8 = 0xFF;

const MT_UNSIGNED: u8 = 0;
const MT_NEGATIVE: u8 = 1;
const MT_BYTES: u8 = 2;
const MT_TEXT: u8 = 3;
const MT_ARRAY: u8 = 4;
const MT_MAP: u8 = 5;
const MT_TAG: u8 = 6;

const AI_FALSE: u8 = 20;
const AI_TRUE: u8 = 21;
const AI_NULL: u8 = 22;
const AI_UNDEFINED: u8 = 23;
const AI_1: u8 = 24;
const AI_2: u8 = 25;
const AI_4: u8 = 26;
const AI_8: u8 = 27;
const AI_INDEF: u8 = 31;

#[derive(Clone, Copy)]
enum State {
    /// Read the next head byte under the current parent
    ReadHead,
    /// A child of the current parent has just been completed
    Fill(Kind),
    /// The current parent is complete, move up to its parent
    Ascend,
}

/// The value a node starts life with, before its argument is resolved
fn initial_value<'a>(major: u8) -> Value<'a> {
    match major {
        MT_UNSIGNED => Value::Unsigned(0),
        MT_NEGATIVE => Value::Signed(-1),
        MT_BYTES => Value::Bytes(&[]),
        MT_TEXT => Value::Text(&[]),
        MT_ARRAY => Value::Array { indefinite: false },
        MT_MAP => Value::Map { indefinite: false },
        MT_TAG => Value::Tag(0),
        _ => Value::Simple(0),
    }
}

fn allocate_child<'a, S>(store: &mut S, parent: NodeId, value: Value<'a>) -> Result<NodeId, ErrorKind>
where
    S: NodeStore<'a>,
{
    let id = store
        .allocate(Node::new(value, Some(parent)))
        .ok_or(ErrorKind::OutOfMemory)?;

    let p = store.get_mut(parent);
    let prev = p.last_child.replace(id);
    p.length += 1;
    match prev {
        Some(prev) => store.get_mut(prev).next = Some(id),
        None => store.get_mut(parent).first_child = Some(id),
    }
    Ok(id)
}

fn decode_float(ai: u8, bits: u64) -> f64 {
    match ai {
        AI_2 => half::f16::from_bits(bits as u16).to_f64(),
        AI_4 => f32::from_bits(bits as u32) as f64,
        _ => f64::from_bits(bits),
    }
}

/// Decode items under `sentinel` until it is complete.
fn decode_items<'a, S>(
    cursor: &mut Cursor<'a>,
    store: &mut S,
    sentinel: NodeId,
) -> Result<NodeId, ErrorKind>
where
    S: NodeStore<'a>,
{
    let mut parent = sentinel;
    let mut state = State::ReadHead;
    loop {
        state = match state {
            State::ReadHead => {
                let ib = cursor.take_u8()?;
                if ib == BREAK {
                    let p = store.get_mut(parent);
                    if p.fill != Fill::Indefinite {
                        return Err(ErrorKind::BreakOutsideIndef);
                    }
                    match p.value {
                        Value::Bytes(_) => p.value = Value::BytesChunked,
                        Value::Text(_) => p.value = Value::TextChunked,
                        Value::Map { .. } if p.length % 2 == 1 => {
                            return Err(ErrorKind::OddSizeIndefMap);
                        }
                        _ => {}
                    }
                    p.fill = Fill::Complete;
                    State::Ascend
                } else {
                    let (major, ai) = (ib >> 5, ib & 0x1F);
                    let id = allocate_child(store, parent, initial_value(major))?;

                    let arg = match ai {
                        AI_1 => cursor.take_u8()? as u64,
                        AI_2 => cursor.take_u16()? as u64,
                        AI_4 => cursor.take_u32()? as u64,
                        AI_8 => cursor.take_u64()?,
                        28..=30 => return Err(ErrorKind::ReservedAI),
                        AI_INDEF => {
                            let node = store.get_mut(id);
                            match &mut node.value {
                                Value::Array { indefinite } | Value::Map { indefinite } => {
                                    *indefinite = true
                                }
                                Value::Bytes(_) | Value::Text(_) => {}
                                _ => return Err(ErrorKind::MtUndefForIndef),
                            }
                            node.fill = Fill::Indefinite;
                            parent = id;
                            continue;
                        }
                        ai => ai as u64,
                    };

                    let node = store.get_mut(id);
                    match major {
                        MT_UNSIGNED => node.value = Value::Unsigned(arg),
                        MT_NEGATIVE => node.value = Value::Signed((!arg) as i64),
                        MT_BYTES | MT_TEXT => {
                            let len = usize::try_from(arg).map_err(|_| ErrorKind::OutOfData)?;
                            let data = cursor.take(len)?;
                            node.value = if major == MT_BYTES {
                                Value::Bytes(data)
                            } else {
                                Value::Text(data)
                            };
                        }
                        MT_ARRAY | MT_MAP => {
                            let count = if major == MT_MAP {
                                arg.saturating_mul(2)
                            } else {
                                arg
                            };
                            if count != 0 {
                                node.fill = Fill::Remaining(count);
                                parent = id;
                                continue;
                            }
                        }
                        MT_TAG => {
                            node.value = Value::Tag(arg);
                            node.fill = Fill::Remaining(1);
                            parent = id;
                            continue;
                        }
                        _ => {
                            node.value = match ai {
                                AI_FALSE => Value::False,
                                AI_TRUE => Value::True,
                                AI_NULL => Value::Null,
                                AI_UNDEFINED => Value::Undefined,
                                AI_2 | AI_4 | AI_8 => Value::Double(decode_float(ai, arg)),
                                _ => Value::Simple(arg as u8),
                            }
                        }
                    }
                    State::Fill(node.value.kind())
                }
            }
            State::Fill(child) => {
                let p = store.get_mut(parent);
                match p.fill {
                    Fill::Indefinite => {
                        let in_string = matches!(p.value, Value::Bytes(_) | Value::Text(_));
                        if in_string && child != p.value.kind() {
                            return Err(ErrorKind::WrongNestingInIndefString);
                        }
                        State::ReadHead
                    }
                    Fill::Remaining(n) if n > 1 => {
                        p.fill = Fill::Remaining(n - 1);
                        State::ReadHead
                    }
                    Fill::Remaining(_) => {
                        p.fill = Fill::Complete;
                        State::Ascend
                    }
                    Fill::Complete => State::Ascend,
                }
            }
            State::Ascend => {
                if parent == sentinel {
                    if !cursor.is_empty() {
                        return Err(ErrorKind::NotAllDataConsumed);
                    }
                    return store
                        .get(sentinel)
                        .first_child
                        .ok_or(ErrorKind::OutOfData);
                }
                let done = store.get(parent);
                let kind = done.value.kind();
                parent = done.parent.ok_or(ErrorKind::InvalidParameter)?;
                State::Fill(kind)
            }
        }
    }
}

/// Decode `range` of `data` into `store`.
///
/// Offsets reported in errors are relative to the start of `data`, not of
/// `range`. On failure every node allocated so far has been released.
pub fn decode_range<'a, S>(data: &'a [u8], range: Range<usize>, mut store: S) -> Result<Document<'a, S>, Error>
where
    S: NodeStore<'a>,
{
    let mut cursor = Cursor::new(data, range.clone()).map_err(|kind| Error {
        kind,
        offset: range.start,
    })?;

    let sentinel = store
        .allocate(Node::new(Value::Invalid, None))
        .ok_or(Error {
            kind: ErrorKind::OutOfMemory,
            offset: cursor.offset(),
        })?;

    let r = decode_items(&mut cursor, &mut store, sentinel);

    let first = store.get(sentinel).first_child;
    store.release(sentinel);
    match r {
        Ok(root) => {
            store.get_mut(root).parent = None;
            trace!("Decoded {} bytes of CBOR", cursor.offset() - range.start);
            Ok(Document::new(store, root))
        }
        Err(kind) => {
            if let Some(first) = first {
                store.get_mut(first).parent = None;
                teardown::free(&mut store, first);
            }
            let offset = cursor.offset();
            debug!("Failed to decode CBOR at offset {offset}: {kind}");
            Err(Error { kind, offset })
        }
    }
}

/// Decode all of `data` into `store`.
pub fn decode_with<'a, S>(data: &'a [u8], store: S) -> Result<Document<'a, S>, Error>
where
    S: NodeStore<'a>,
{
    decode_range(data, 0..data.len(), store)
}

/// Decode all of `data` into a fresh [`Arena`].
pub fn decode(data: &[u8]) -> Result<Document<'_, Arena<'_>>, Error> {
    decode_with(data, Arena::new())
}
