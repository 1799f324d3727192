/*!
Owned decode results and read-only navigation.
*/

use super::encode;
use super::node::{Kind, Node, NodeId, Value};
use super::store::{Arena, NodeStore};
use super::teardown;
use alloc::vec::Vec;
use core::marker::PhantomData;

/// A decoded tree, owning its root node and the store holding it.
///
/// Byte and text payloads borrow the input buffer, so a document cannot
/// outlive it. Dropping the document releases every node back to the store.
pub struct Document<'a, S = Arena<'a>>
where
    S: NodeStore<'a>,
{
    store: S,
    root: NodeId,
    _data: PhantomData<&'a [u8]>,
}

impl<'a, S> Document<'a, S>
where
    S: NodeStore<'a>,
{
    pub(crate) fn new(store: S, root: NodeId) -> Self {
        Self {
            store,
            root,
            _data: PhantomData,
        }
    }

    pub fn root(&self) -> Item<'_, 'a, S> {
        Item {
            store: &self.store,
            id: self.root,
            _data: PhantomData,
        }
    }

    /// Release the tree; equivalent to dropping it.
    pub fn free(self) {}
}

impl<'a, S> Drop for Document<'a, S>
where
    S: NodeStore<'a>,
{
    fn drop(&mut self) {
        teardown::free(&mut self.store, self.root)
    }
}

impl<'a, S> core::fmt::Debug for Document<'a, S>
where
    S: NodeStore<'a>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .finish()
    }
}

/// A read-only handle to one node of a [`Document`].
pub struct Item<'t, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    store: &'t S,
    id: NodeId,
    _data: PhantomData<&'a [u8]>,
}

impl<'a, S> Clone for Item<'_, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S> Copy for Item<'_, 'a, S> where S: NodeStore<'a> + ?Sized {}

impl<'a, S> core::fmt::Debug for Item<'_, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("value", self.value())
            .field("len", &self.len())
            .finish()
    }
}

impl<'t, 'a, S> Item<'t, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    fn at(&self, id: NodeId) -> Self {
        Self {
            store: self.store,
            id,
            _data: PhantomData,
        }
    }

    fn node(&self) -> &'t Node<'a> {
        self.store.get(self.id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn store(&self) -> &'t S {
        self.store
    }

    pub fn value(&self) -> &'t Value<'a> {
        &self.node().value
    }

    pub fn kind(&self) -> Kind {
        self.node().value.kind()
    }

    /// Number of direct children; for a map this is twice the pair count
    pub fn len(&self) -> usize {
        self.node().length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| self.at(id))
    }

    pub fn children(&self) -> Children<'t, 'a, S> {
        Children {
            next: self.node().first_child.map(|id| self.at(id)),
        }
    }

    /// Look up the value paired with integer `key` in a map.
    ///
    /// Keys match on their concrete kind: an unsigned key matches a
    /// non-negative `key` of equal magnitude, a negative key matches an equal
    /// negative `key`.
    pub fn map_get_int(&self, key: i64) -> Option<Self> {
        self.map_find(|k| match k {
            Value::Unsigned(v) => u64::try_from(key).is_ok_and(|key| key == *v),
            Value::Signed(v) => *v == key,
            _ => false,
        })
    }

    /// Look up the value paired with a text or byte string `key` in a map.
    pub fn map_get_text<K>(&self, key: K) -> Option<Self>
    where
        K: AsRef<[u8]>,
    {
        let key = key.as_ref();
        self.map_find(|k| match k {
            Value::Text(v) | Value::Bytes(v) => *v == key,
            _ => false,
        })
    }

    fn map_find<F>(&self, f: F) -> Option<Self>
    where
        F: Fn(&Value<'a>) -> bool,
    {
        if self.kind() != Kind::Map {
            return None;
        }
        let mut children = self.children();
        while let (Some(key), Some(value)) = (children.next(), children.next()) {
            if f(key.value()) {
                return Some(value);
            }
        }
        None
    }

    /// The child at position `idx`, if any.
    ///
    /// Indices that do not convert to `usize`, such as negative ones, find
    /// nothing.
    pub fn index<I>(&self, idx: I) -> Option<Self>
    where
        I: TryInto<usize>,
    {
        let idx = idx.try_into().ok()?;
        self.children().nth(idx)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.value() {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value() {
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value() {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::False => Some(false),
            Value::True => Some(true),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.value() {
            Value::Bytes(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value().as_str()
    }

    /// The tag number and tagged item of a tag
    pub fn tag(&self) -> Option<(u64, Self)> {
        match self.value() {
            Value::Tag(t) => Some((*t, self.children().next()?)),
            _ => None,
        }
    }

    /// Concatenate the chunks of a chunked string, or copy a definite one.
    pub fn concat(&self) -> Option<Vec<u8>> {
        match self.value() {
            Value::Bytes(v) | Value::Text(v) => Some(v.to_vec()),
            Value::BytesChunked | Value::TextChunked => {
                let mut data = Vec::new();
                for chunk in self.children() {
                    if let Value::Bytes(v) | Value::Text(v) = chunk.value() {
                        data.extend_from_slice(v);
                    }
                }
                Some(data)
            }
            _ => None,
        }
    }

    /// The number of bytes [`encode`](encode::encode) would write
    pub fn encoded_len(&self) -> Result<usize, encode::Error> {
        encode::encoded_len(*self)
    }

    /// Encode this item and everything below it into a new vector
    pub fn to_vec(&self) -> Result<Vec<u8>, encode::Error> {
        let mut data = alloc::vec![0; self.encoded_len()?];
        encode::encode(&mut data, 0, *self)?;
        Ok(data)
    }
}

pub struct Children<'t, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    next: Option<Item<'t, 'a, S>>,
}

impl<'t, 'a, S> Iterator for Children<'t, 'a, S>
where
    S: NodeStore<'a> + ?Sized,
{
    type Item = Item<'t, 'a, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next.take()?;
        self.next = item.node().next.map(|id| item.at(id));
        Some(item)
    }
}
