/*!
The in-memory data model: one [`Node`] per decoded CBOR item, linked to its
parent, first/last child and next sibling by [`NodeId`].
*/

/// Handle to a node held by a [`NodeStore`](crate::store::NodeStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The concrete kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Unsigned,
    Signed,
    Bytes,
    Text,
    BytesChunked,
    TextChunked,
    Array,
    Map,
    Tag,
    Simple,
    Double,
    False,
    True,
    Null,
    Undefined,
    Invalid,
}

/// A decoded CBOR value.
///
/// Byte and text payloads borrow the input buffer; nothing is copied.
/// Text is not validated as UTF-8 by the decoder, see [`Value::as_str`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Unsigned(u64),
    /// A negative integer, `-1 - argument`, wrapping at 64 bits
    Signed(i64),
    Bytes(&'a [u8]),
    Text(&'a [u8]),
    /// An indefinite-length byte string, its chunks are the children
    BytesChunked,
    /// An indefinite-length text string, its chunks are the children
    TextChunked,
    Array {
        indefinite: bool,
    },
    Map {
        indefinite: bool,
    },
    /// A tag number, the tagged item is the single child
    Tag(u64),
    Simple(u8),
    Double(f64),
    False,
    True,
    Null,
    Undefined,
    Invalid,
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Unsigned(_) => Kind::Unsigned,
            Value::Signed(_) => Kind::Signed,
            Value::Bytes(_) => Kind::Bytes,
            Value::Text(_) => Kind::Text,
            Value::BytesChunked => Kind::BytesChunked,
            Value::TextChunked => Kind::TextChunked,
            Value::Array { .. } => Kind::Array,
            Value::Map { .. } => Kind::Map,
            Value::Tag(_) => Kind::Tag,
            Value::Simple(_) => Kind::Simple,
            Value::Double(_) => Kind::Double,
            Value::False => Kind::False,
            Value::True => Kind::True,
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Invalid => Kind::Invalid,
        }
    }

    /// The text payload, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(t) => core::str::from_utf8(t).ok(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "Unsigned Integer",
            Value::Signed(_) => "Negative Integer",
            Value::Bytes(_) => "Definite-length Byte String",
            Value::Text(_) => "Definite-length Text String",
            Value::BytesChunked => "Indefinite-length Byte String",
            Value::TextChunked => "Indefinite-length Text String",
            Value::Array { indefinite: false } => "Definite-length Array",
            Value::Array { indefinite: true } => "Indefinite-length Array",
            Value::Map { indefinite: false } => "Definite-length Map",
            Value::Map { indefinite: true } => "Indefinite-length Map",
            Value::Tag(_) => "Tag",
            Value::Simple(_) => "Simple Value",
            Value::Double(_) => "Float",
            Value::False => "False",
            Value::True => "True",
            Value::Null => "Null",
            Value::Undefined => "Undefined",
            Value::Invalid => "Invalid",
        }
    }
}

/// Construction state, only meaningful while the decoder is filling a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fill {
    Complete,
    /// Consuming children until a break marker
    Indefinite,
    /// Consuming exactly this many more children
    Remaining(u64),
}

/// A single tree node, as held by a node store.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub(crate) value: Value<'a>,
    pub(crate) fill: Fill,
    pub(crate) length: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(value: Value<'a>, parent: Option<NodeId>) -> Self {
        Self {
            value,
            fill: Fill::Complete,
            length: 0,
            parent,
            first_child: None,
            last_child: None,
            next: None,
        }
    }

    pub fn value(&self) -> &Value<'a> {
        &self.value
    }

    /// Number of direct children; twice the pair count for a map
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }
}
