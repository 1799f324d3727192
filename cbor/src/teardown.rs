use super::node::NodeId;
use super::store::NodeStore;

/// Release `root` and every node below it, without recursion.
///
/// Repeatedly descends to the deepest first child, releases it, and moves on
/// to its next sibling or, if it was the last, back to its parent (whose
/// first-child link is cleared so it is seen as a leaf next time round).
/// `root`'s own siblings and parent are never touched.
pub(crate) fn free<'a, S>(store: &mut S, root: NodeId)
where
    S: NodeStore<'a> + ?Sized,
{
    let mut cur = root;
    loop {
        while let Some(child) = store.get(cur).first_child {
            cur = child;
        }

        if cur == root {
            store.release(cur);
            return;
        }

        let node = store.get(cur);
        let up = match (node.next, node.parent) {
            (Some(next), _) => next,
            (None, Some(parent)) => {
                store.get_mut(parent).first_child = None;
                parent
            }
            (None, None) => {
                // Detached node below the root, nowhere left to go
                store.release(cur);
                return;
            }
        };
        store.release(cur);
        cur = up;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{Node, Value};
    use crate::store::Arena;

    fn link<'a>(arena: &mut Arena<'a>, parent: NodeId, value: Value<'a>) -> NodeId {
        let id = arena.allocate(Node::new(value, Some(parent))).unwrap();
        let p = arena.get_mut(parent);
        p.length += 1;
        match p.last_child.replace(id) {
            Some(prev) => arena.get_mut(prev).next = Some(id),
            None => arena.get_mut(parent).first_child = Some(id),
        }
        id
    }

    #[test]
    fn free_wide_and_deep() {
        let mut arena = Arena::new();
        let root = arena
            .allocate(Node::new(Value::Array { indefinite: false }, None))
            .unwrap();
        let a = link(&mut arena, root, Value::Array { indefinite: false });
        link(&mut arena, a, Value::Unsigned(1));
        link(&mut arena, a, Value::Unsigned(2));
        let b = link(&mut arena, root, Value::Map { indefinite: false });
        let k = link(&mut arena, b, Value::Tag(1));
        link(&mut arena, k, Value::Null);
        link(&mut arena, b, Value::True);
        link(&mut arena, root, Value::False);
        assert_eq!(arena.live(), 9);

        free(&mut arena, root);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn free_subtree_only() {
        let mut arena = Arena::new();
        let root = arena
            .allocate(Node::new(Value::Array { indefinite: false }, None))
            .unwrap();
        let a = link(&mut arena, root, Value::Array { indefinite: false });
        link(&mut arena, a, Value::Unsigned(1));
        let b = link(&mut arena, root, Value::Unsigned(2));

        // Detach `a` the way the decoder detaches a finished root
        arena.get_mut(root).first_child = Some(b);
        arena.get_mut(a).parent = None;
        arena.get_mut(a).next = None;

        free(&mut arena, a);
        assert_eq!(arena.live(), 2);
        assert_eq!(*arena.get(b).value(), Value::Unsigned(2));
    }

    #[test]
    fn free_very_deep() {
        let mut arena = Arena::new();
        let root = arena
            .allocate(Node::new(Value::Array { indefinite: false }, None))
            .unwrap();
        let mut cur = root;
        for _ in 0..100_000 {
            cur = link(&mut arena, cur, Value::Array { indefinite: false });
        }
        free(&mut arena, root);
        assert_eq!(arena.live(), 0);
    }
}
