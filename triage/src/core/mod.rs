//! Core state and the from-scratch data structures behind it
//!
//! Every structure here is implemented from first principles; the triage
//! service coordinates them through `TriageState`.

pub mod avl_tree;
pub mod bounded_history;
pub mod hash_table;
pub mod min_heap;
pub mod state;
pub mod undo_stack;

pub use avl_tree::AvlTree;
pub use bounded_history::BoundedHistory;
pub use hash_table::HashTable;
pub use min_heap::MinHeap;
pub use state::{TriageState, UndoEntry, DEFAULT_HISTORY_CAPACITY};
pub use undo_stack::UndoStack;
