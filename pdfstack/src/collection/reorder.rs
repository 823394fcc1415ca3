//! Positional reordering as pure functions.
//!
//! A drag gesture is a stream of `(from, to)` steps: take the element at
//! `from` out, then insert it at `to`. Each step produces a new sequence and
//! never adds, drops or duplicates an element. Out-of-range steps leave the
//! sequence unchanged.

/// Move the element at `from` so that it ends up at index `to`.
///
/// ```
/// use pdfstack::collection::reorder::move_item;
///
/// assert_eq!(move_item(&["a", "b", "c"], 0, 2), vec!["b", "c", "a"]);
/// assert_eq!(move_item(&["a", "b", "c"], 2, 0), vec!["c", "a", "b"]);
/// assert_eq!(move_item(&["a", "b", "c"], 5, 0), vec!["a", "b", "c"]);
/// ```
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }

    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

/// Apply a sequence of `(from, to)` steps, left to right.
pub fn apply_moves<T: Clone>(items: &[T], moves: &[(usize, usize)]) -> Vec<T> {
    moves
        .iter()
        .fold(items.to_vec(), |acc, &(from, to)| move_item(&acc, from, to))
}

/// Check that `candidate` is a permutation of `current`.
pub fn is_permutation<T: Ord + Clone>(current: &[T], candidate: &[T]) -> bool {
    if current.len() != candidate.len() {
        return false;
    }

    let mut a = current.to_vec();
    let mut b = candidate.to_vec();
    a.sort();
    b.sort();
    a == b
}
