//! A copy-on-write AVL tree for Rust.
//!
//! This crate provides [`AvlTree`], an ordered set backed by a height-balanced binary search
//! tree. Search, insertion and removal are O(log n) because the heights of any node's two
//! subtrees differ by at most one.
//!
//! `AvlTree` is a value type. Cloning it is O(1) and shares every node; the first mutation of a
//! copy privately copies only the nodes on the path it walks, so no other copy can observe it.
//!
//! # Example
//!
//! ```
//! use cow_avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(1);
//! tree.insert(2);
//! tree.insert(3);
//!
//! // Ascending inserts trigger a left rotation: 2 becomes the root.
//! let mut pre_order = Vec::new();
//! tree.traverse_pre_order(|v| pre_order.push(*v));
//! assert_eq!(pre_order, [2, 1, 3]);
//!
//! // A snapshot is unaffected by later writes to the original.
//! let snapshot = tree.clone();
//! tree.remove(&2);
//! assert!(snapshot.contains(&2));
//! assert!(!tree.contains(&2));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Value semantics** - Copies never observe each other's writes
//! - **Structural sharing** - A write copies O(log n) nodes, never the whole tree
//!
//! # Implementation
//!
//! Nodes are linked by reference-counted pointers. A write reaches each node on its path through
//! [`Rc::make_mut`](alloc::rc::Rc::make_mut): a node owned only by the writing tree is mutated in
//! place, a shared one is copied first. Rebalancing uses the four classic single and double
//! rotations, and heights are recomputed bottom-up as the recursion unwinds.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod avl_tree;

pub use avl_tree::AvlTree;
