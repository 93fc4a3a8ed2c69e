//! An intrusive AVL tree with balance-factor rebalancing.

// Conventions used in comments:
// - The balance factor of a node `x` is `height(right(x)) - height(left(x))`.
// - A node "leans" toward the side holding its taller subtree.
// - `s` is the sign of a direction: -1 for left, +1 for right.
//
// The fundamental invariants of an AVL tree are:
// 1. Every stored balance factor equals the actual height difference of the
//    node's subtrees.
// 2. Every balance factor is -1, 0 or 1.
//
// A mutation may drive one balance factor to +/-2 mid-rebalance; the fix-up
// walks restore invariant (2) before the operation returns.

use core::{
    cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};
use std::borrow::Borrow;

use cordyceps::Linked;

mod debug;
mod iter;
mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;
#[cfg(test)]
mod tests;

pub use iter::Iter;
pub use map::AvlMap;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// Each node carries a balance factor, the height difference between its
/// right and left subtrees. Insertion and removal restore the AVL shape by
/// propagating balance-factor updates along the ancestor chain and rotating
/// where an update would push a factor out of range, without ever recomputing
/// a height from scratch.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

impl Dir {
    /// The contribution of this side to a parent's balance factor.
    fn sign(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }

    fn from_sign(sign: i8) -> Dir {
        if sign < 0 {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    balance: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Some(root) = self.root {
            assert!(
                unsafe { T::links(root).as_ref().parent() }.is_none(),
                "root must not have a parent"
            );
            unsafe { self.assert_invariants_at(root) };
        }
    }

    // Returns the height of the subtree rooted at `node`.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn assert_invariants_at(&self, node: NonNull<T>) -> usize {
        unsafe {
            let mut heights = [0usize; 2];

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = T::links(node).as_ref().child(dir) {
                    // Ensure the search-order invariant holds locally.
                    match dir {
                        Dir::Left => assert!(child.as_ref().key() < node.as_ref().key()),
                        Dir::Right => assert!(child.as_ref().key() > node.as_ref().key()),
                    }

                    // Ensure the child's parent link points to this node.
                    let parent = T::links(child)
                        .as_ref()
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    heights[dir as usize] = self.assert_invariants_at(child);
                }
            }

            // Ensure the stored balance factor is the actual height
            // difference, and that it is within range.
            let balance = heights[Dir::Right as usize] as i8 - heights[Dir::Left as usize] as i8;
            assert_eq!(balance, T::links(node).as_ref().balance());
            assert!([-1, 0, 1].contains(&balance));

            1 + heights[0].max(heights[1])
        }
    }

    /// Returns `true` if the tree contains an item with key `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = T::links(cur).as_ref().left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = T::links(cur).as_ref().right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        let root = self.root?;
        let min = unsafe { self.min_in_subtree(root) };
        unsafe { Some(Pin::new_unchecked(min.as_ref())) }
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        let root = self.root?;
        let max = unsafe { self.max_in_subtree(root) };
        unsafe { Some(Pin::new_unchecked(max.as_ref())) }
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let root = self.root?;
        let min = unsafe { self.min_in_subtree(root) };
        Some(unsafe { self.remove_at(min) })
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let root = self.root?;
        let max = unsafe { self.max_in_subtree(root) };
        Some(unsafe { self.remove_at(max) })
    }

    /// Returns an iterator over the tree's elements, in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns `true` if every leaf of the tree lies at the same depth.
    ///
    /// An empty tree trivially passes.
    pub fn all_leaves_equal_depth(&self) -> bool {
        let mut expected = None;
        Self::equal_depth_at(self.root, 0, &mut expected)
    }

    // The first leaf visited fixes the expected depth; every later leaf must
    // match it.
    fn equal_depth_at(node: Link<T>, depth: usize, expected: &mut Option<usize>) -> bool {
        let Some(node) = node else {
            return true;
        };

        let links = unsafe { T::links(node).as_ref() };

        if links.is_leaf() {
            return match *expected {
                None => {
                    *expected = Some(depth);
                    true
                }
                Some(e) => e == depth,
            };
        }

        Self::equal_depth_at(links.left(), depth + 1, expected)
            && Self::equal_depth_at(links.right(), depth + 1, expected)
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with
    // `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`.
    #[inline]
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            if T::links(parent).as_ref().left() == Some(old_child) {
                T::links(parent).as_mut().set_child(Dir::Left, new_child);
            } else {
                debug_assert_eq!(
                    T::links(parent).as_ref().right(),
                    Some(old_child),
                    "`old_child` must be a child of `parent`"
                );

                T::links(parent).as_mut().set_child(Dir::Right, new_child);
            }
        }
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // The balance factors of affected nodes are not updated.
    fn rotate_at(&mut self, down: NonNull<T>, up: NonNull<T>) {
        unsafe {
            // - `down` becomes the `dir` child of `up`.
            // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let dir = if T::links(down).as_ref().right() == Some(up) {
                Dir::Left
            } else {
                Dir::Right
            };

            debug_assert!(self.root.is_some_and(|root| root != up));

            let across = T::links(up).as_ref().child(dir);
            T::links(down).as_mut().set_child(!dir, across);
            self.maybe_set_parent(across, Some(down));

            T::links(up).as_mut().set_child(dir, Some(down));
            let parent = T::links(down).as_mut().set_parent(Some(up));
            T::links(up).as_mut().set_parent(parent);

            match parent {
                Some(parent) => self.replace_child(parent, down, Some(up)),
                None => self.root = Some(up),
            }
        }
    }

    // Performs a double rotation, moving `up` above both `down_first` (its
    // parent) and `down_second` (its grandparent).
    //
    // The balance factors of affected nodes are not updated.
    fn rotate_twice_at(&mut self, down_second: NonNull<T>, down_first: NonNull<T>, up: NonNull<T>) {
        unsafe {
            let dir = if T::links(down_first).as_ref().right() == Some(up) {
                Dir::Right
            } else {
                Dir::Left
            };

            let across_first = T::links(up).as_ref().child(!dir);
            let across_second = T::links(up).as_ref().child(dir);

            self.maybe_set_parent(across_first, Some(down_first));

            T::links(down_first).as_mut().set_child(dir, across_first);
            T::links(down_first).as_mut().set_parent(Some(up));

            self.maybe_set_parent(across_second, Some(down_second));

            T::links(down_second)
                .as_mut()
                .set_child(!dir, across_second);
            let parent = T::links(down_second).as_mut().set_parent(Some(up));

            T::links(up).as_mut().set_parent(parent);
            T::links(up).as_mut().set_child(!dir, Some(down_first));
            T::links(up).as_mut().set_child(dir, Some(down_second));

            match parent {
                Some(parent) => self.replace_child(parent, down_second, Some(up)),
                None => self.root = Some(up),
            }
        }
    }

    /// Inserts an item into the tree.
    ///
    /// If an item with an equal key is already present, the new item replaces
    /// it in place: the tree structure and every balance factor are left
    /// exactly as they were, and the displaced item is returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        let Some(root) = self.root else {
            // Tree is empty. Set `item` as the root and return.
            unsafe {
                let links = T::links(ptr).as_mut();
                links.set_parent(None);
                links.set_left(None);
                links.set_right(None);
                links.set_balance(0);
            }

            self.root = Some(ptr);
            self.len += 1;
            return None;
        };

        // Descend the tree, looking for a suitable leaf.
        let mut cur = root;
        let (parent, dir) = loop {
            let ordering = unsafe { ptr.as_ref().key().cmp(cur.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Some(unsafe { self.replace_at(cur, ptr) }),
                Ordering::Greater => Dir::Right,
            };

            match unsafe { T::links(cur).as_ref().child(dir) } {
                Some(child) => cur = child,
                None => break (cur, dir),
            }
        };

        unsafe {
            T::links(parent).as_mut().set_child(dir, Some(ptr));

            let links = T::links(ptr).as_mut();
            links.set_parent(Some(parent));
            links.set_left(None);
            links.set_right(None);
            links.set_balance(0);

            if T::links(parent).as_ref().balance() != 0 {
                // The parent was leaning, so the new leaf filled in its
                // shorter side; the subtree height is unchanged.
                T::links(parent).as_mut().set_balance(0);
            } else {
                T::links(parent).as_mut().set_balance(dir.sign());
                self.rebalance_inserted(parent);
            }
        }

        self.len += 1;
        None
    }

    // Replaces the node at `old` with `new`, which must hold an equal key.
    //
    // `new` takes over `old`'s links and balance factor; the surrounding
    // structure is untouched.
    unsafe fn replace_at(&mut self, old: NonNull<T>, new: NonNull<T>) -> T::Handle {
        unsafe {
            let balance = T::links(old).as_ref().balance();
            let parent = T::links(old).as_ref().parent();
            let left = T::links(old).as_ref().left();
            let right = T::links(old).as_ref().right();

            self.replace_child_or_set_root(parent, old, Some(new));
            self.maybe_set_parent(left, Some(new));
            self.maybe_set_parent(right, Some(new));

            let links = T::links(new).as_mut();
            links.set_parent(parent);
            links.set_left(left);
            links.set_right(right);
            links.set_balance(balance);

            T::links(old).as_mut().clear();

            T::from_ptr(old)
        }
    }

    // Performs a bottom-up rebalance of the tree after an insertion.
    //
    // Invariant on entry: the subtree rooted at `parent` grew taller by one,
    // and `parent` leans toward the child that grew.
    //
    // At most one rotation (single or double) is performed. A rotation
    // restores the subtree's pre-insertion height, so no propagation
    // continues past it.
    fn rebalance_inserted(&mut self, mut parent: NonNull<T>) {
        unsafe {
            while let Some(grand) = T::links(parent).as_ref().parent() {
                let dir = self.which_child(grand, parent);
                let s = dir.sign();
                let balance = T::links(grand).as_ref().balance() + s;

                if balance == 0 {
                    // The grown subtree was the shorter side; total height is
                    // unchanged and the update is absorbed here.
                    T::links(grand).as_mut().set_balance(0);
                    return;
                }

                if balance == s {
                    // `grand` now leans toward the grown side and its own
                    // height grew; ascend one level.
                    T::links(grand).as_mut().set_balance(balance);
                    parent = grand;
                    continue;
                }

                debug_assert_eq!(balance, 2 * s);

                let p_balance = T::links(parent).as_ref().balance();

                if p_balance == s {
                    // Zig-zig: the heavy child leans with the imbalance; a
                    // single rotation levels both.
                    self.rotate_at(grand, parent);
                    T::links(parent).as_mut().set_balance(0);
                    T::links(grand).as_mut().set_balance(0);
                } else {
                    // Zig-zag: the heavy child leans against the imbalance;
                    // rotate its inner child `y` to the top. The new balance
                    // factors depend on which of `y`'s sides held the
                    // insertion.
                    let y = T::links(parent)
                        .as_ref()
                        .child(!dir)
                        .expect("a leaning node has a child on its taller side");
                    let y_balance = T::links(y).as_ref().balance();

                    self.rotate_twice_at(grand, parent, y);

                    T::links(parent)
                        .as_mut()
                        .set_balance(if y_balance == -s { s } else { 0 });
                    T::links(grand)
                        .as_mut()
                        .set_balance(if y_balance == s { -s } else { 0 });
                    T::links(y).as_mut().set_balance(0);
                }

                return;
            }
        }
    }

    /// Removes and returns the item with key `key`.
    ///
    /// Returns `None`, leaving the tree untouched, if no such item is
    /// present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node) })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element
    /// of `self`, and not any other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            // A node with two children first trades places with its in-order
            // predecessor, the rightmost node of its left subtree. The
            // predecessor has no right child, so the node to splice out then
            // has at most one child.
            if let (Some(left), Some(_)) = (
                T::links(node).as_ref().left(),
                T::links(node).as_ref().right(),
            ) {
                let pred = self.max_in_subtree(left);
                self.swap_nodes(node, pred);
            }

            let parent = T::links(node).as_ref().parent();
            let child = T::links(node)
                .as_ref()
                .left()
                .or(T::links(node).as_ref().right());

            // Removing a left child shortens the left side, tipping the
            // parent's balance toward the right, and vice versa. Recorded
            // before the splice detaches `node`.
            let diff = match parent {
                Some(parent) => -self.which_child(parent, node).sign(),
                None => 0,
            };

            self.replace_child_or_set_root(parent, node, child);
            self.maybe_set_parent(child, parent);

            if let Some(parent) = parent {
                self.rebalance_removed(parent, diff);
            }

            self.len -= 1;

            T::links(node).as_mut().clear();
            T::from_ptr(node)
        }
    }

    // Exchanges the tree positions of `n1` and `n2`, balance factors
    // included. All other nodes' links are preserved, so only the two keys
    // trade places in the structure.
    unsafe fn swap_nodes(&mut self, n1: NonNull<T>, n2: NonNull<T>) {
        debug_assert_ne!(n1, n2);

        // Normalize so that if the nodes are adjacent, `a` is the parent.
        let n1_parent = unsafe { T::links(n1).as_ref().parent() };
        let (a, b) = if n1_parent == Some(n2) {
            (n2, n1)
        } else {
            (n1, n2)
        };

        unsafe {
            let a_parent = T::links(a).as_ref().parent();
            let a_left = T::links(a).as_ref().left();
            let a_right = T::links(a).as_ref().right();
            let a_balance = T::links(a).as_ref().balance();

            let b_parent = T::links(b).as_ref().parent();
            let b_left = T::links(b).as_ref().left();
            let b_right = T::links(b).as_ref().right();
            let b_balance = T::links(b).as_ref().balance();

            if b_parent == Some(a) {
                let dir = self.which_child(a, b);

                // `b` steps into `a`'s place, with `a` as its `dir` child and
                // `a`'s other child carried across.
                self.replace_child_or_set_root(a_parent, a, Some(b));
                T::links(b).as_mut().set_parent(a_parent);

                T::links(b).as_mut().set_child(dir, Some(a));
                T::links(a).as_mut().set_parent(Some(b));

                let across = match dir {
                    Dir::Left => a_right,
                    Dir::Right => a_left,
                };
                T::links(b).as_mut().set_child(!dir, across);
                self.maybe_set_parent(across, Some(b));
            } else {
                self.replace_child_or_set_root(a_parent, a, Some(b));
                T::links(b).as_mut().set_parent(a_parent);

                self.replace_child_or_set_root(b_parent, b, Some(a));
                T::links(a).as_mut().set_parent(b_parent);

                T::links(b).as_mut().set_left(a_left);
                T::links(b).as_mut().set_right(a_right);
                self.maybe_set_parent(a_left, Some(b));
                self.maybe_set_parent(a_right, Some(b));
            }

            T::links(a).as_mut().set_left(b_left);
            T::links(a).as_mut().set_right(b_right);
            self.maybe_set_parent(b_left, Some(a));
            self.maybe_set_parent(b_right, Some(a));

            T::links(a).as_mut().set_balance(b_balance);
            T::links(b).as_mut().set_balance(a_balance);
        }
    }

    // Walks from `node` toward the root after a removal shortened one of
    // `node`'s subtrees, restoring the balance invariant.
    //
    // `diff` is the balance change at `node`: +1 if its left subtree shrank,
    // -1 if its right subtree shrank. Unlike insertion, a rotation here can
    // shorten the rebalanced subtree, so the walk may cascade past it.
    fn rebalance_removed(&mut self, node: NonNull<T>, diff: i8) {
        let mut opt_node = Some(node);
        let mut diff = diff;

        while let Some(node) = opt_node {
            let parent = unsafe { T::links(node).as_ref().parent() };

            // The change to propagate one level up, computed before any
            // rotation reshapes this subtree.
            let ndiff = match parent {
                Some(parent) => {
                    let dir = unsafe { self.which_child(parent, node) };
                    -dir.sign()
                }
                None => 0,
            };

            let balance = unsafe { T::links(node).as_ref().balance() } + diff;

            if balance == 0 {
                // Both sides are now level: this subtree shrank by one, and
                // the shortfall becomes the parent's problem.
                unsafe { T::links(node).as_mut().set_balance(0) };
            } else if balance == -1 || balance == 1 {
                // The taller side is untouched, so the subtree height is
                // unchanged and no ancestor can be affected.
                unsafe { T::links(node).as_mut().set_balance(balance) };
                return;
            } else {
                let dir = Dir::from_sign(balance);
                let s = dir.sign();

                let c = unsafe {
                    T::links(node)
                        .as_ref()
                        .child(dir)
                        .expect("an overweight node has a child on its heavy side")
                };
                let c_balance = unsafe { T::links(c).as_ref().balance() };

                if c_balance == -s {
                    // Zig-zag: the heavy child leans against the imbalance;
                    // its inner child `g` rotates to the top and the subtree
                    // shrinks.
                    let g = unsafe {
                        T::links(c)
                            .as_ref()
                            .child(!dir)
                            .expect("a leaning node has a child on its taller side")
                    };
                    let g_balance = unsafe { T::links(g).as_ref().balance() };

                    self.rotate_twice_at(node, c, g);

                    unsafe {
                        T::links(node)
                            .as_mut()
                            .set_balance(if g_balance == s { -s } else { 0 });
                        T::links(c)
                            .as_mut()
                            .set_balance(if g_balance == -s { s } else { 0 });
                        T::links(g).as_mut().set_balance(0);
                    }
                } else {
                    self.rotate_at(node, c);

                    if c_balance == 0 {
                        // Zig-zig with a level child: the rotation rearranges
                        // the subtree without changing its height, so nothing
                        // above can be affected.
                        unsafe {
                            T::links(node).as_mut().set_balance(s);
                            T::links(c).as_mut().set_balance(-s);
                        }
                        return;
                    }

                    // Zig-zig with a leaning child: both level out and the
                    // subtree shrinks.
                    unsafe {
                        T::links(node).as_mut().set_balance(0);
                        T::links(c).as_mut().set_balance(0);
                    }
                }
            }

            opt_node = parent;
            diff = ndiff;
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.min_in_subtree(cur);
                let parent = T::links(cur).as_ref().parent();
                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the
                // node had no parent, the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Support methods ========================================================

    // Returns the minimum node in the subtree rooted at `root`.
    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> NonNull<T> {
        let mut cur = root;

        while let Some(left) = unsafe { T::links(cur).as_ref().left() } {
            cur = left;
        }

        cur
    }

    // Returns the maximum node in the subtree rooted at `root`.
    #[inline]
    unsafe fn max_in_subtree(&self, root: NonNull<T>) -> NonNull<T> {
        let mut cur = root;

        while let Some(right) = unsafe { T::links(cur).as_ref().right() } {
            cur = right;
        }

        cur
    }

    // Returns the in-order successor of `node`, if any.
    unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe {
            if let Some(right) = T::links(node).as_ref().right() {
                return Some(self.min_in_subtree(right));
            }

            // Climb until the path comes up from a left child; that parent
            // holds the next-larger key.
            let mut cur = node;
            while let Some(parent) = T::links(cur).as_ref().parent() {
                if self.which_child(parent, cur) == Dir::Left {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if T::links(parent).as_ref().left() == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    fn balance(&self) -> i8 {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_balance(&mut self, balance: i8) {
        self.inner.get_mut().balance = balance;
    }

    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.balance = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("balance", &self.balance())
            .finish()
    }
}
