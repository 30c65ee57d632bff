//! Position arithmetic for ordered sibling collections
//!
//! Columns within a board and tasks within a column carry a zero-based
//! `position` that must stay dense (the set of positions is always
//! `{0, 1, ..., n-1}`) across inserts, moves, cross-parent moves, and
//! deletes. This module computes which sibling range shifts by what delta
//! for each mutation; the `Column` and `Task` models apply the result as a
//! single `UPDATE ... SET position = position + delta WHERE position
//! BETWEEN ...` inside the same transaction as the row write.
//!
//! Keeping the arithmetic here, out of the SQL, means both entity types
//! share one implementation and the density invariant can be tested
//! without a database.
//!
//! # Example
//!
//! ```
//! use corkboard_shared::models::ordering::{insertion_shift, move_shift};
//!
//! // Inserting at position 0 pushes every existing sibling up by one.
//! let shift = insertion_shift(0);
//! assert!(shift.applies_to(0) && shift.applies_to(5));
//! assert_eq!(shift.delta, 1);
//!
//! // Moving an item onto its own position is a no-op.
//! assert!(move_shift(2, 2).is_none());
//! ```

/// A bounded shift applied to sibling positions.
///
/// Describes the half-open or bounded position range `[from, to]` (upper
/// bound inclusive, `None` = unbounded) whose rows move by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionShift {
    /// Inclusive lower bound of the affected range
    pub from: i32,

    /// Inclusive upper bound of the affected range (None = unbounded)
    pub to: Option<i32>,

    /// Amount each affected position moves (+1 or -1)
    pub delta: i32,
}

impl PositionShift {
    /// Whether a sibling at `position` falls inside the affected range
    pub fn applies_to(&self, position: i32) -> bool {
        position >= self.from && self.to.map_or(true, |to| position <= to)
    }

    /// The position a sibling ends up at after the shift
    pub fn apply(&self, position: i32) -> i32 {
        if self.applies_to(position) {
            position + self.delta
        } else {
            position
        }
    }
}

/// Shift for inserting a new row at `position`.
///
/// Existing siblings at `position` and above move up by one, opening the
/// slot the new row is written into. Positions past the current count are
/// not clamped; the caller is responsible for sane values.
pub fn insertion_shift(position: i32) -> PositionShift {
    PositionShift {
        from: position,
        to: None,
        delta: 1,
    }
}

/// Shift for removing the row that sat at `position`.
///
/// Siblings strictly above the removed row move down by one, closing the
/// gap.
pub fn removal_shift(position: i32) -> PositionShift {
    PositionShift {
        from: position + 1,
        to: None,
        delta: -1,
    }
}

/// Shift for moving a row from `old` to `new` within the same parent.
///
/// Returns `None` when `old == new` (the move is a no-op). Moving down
/// pulls the skipped-over range `(old, new]` back by one; moving up pushes
/// the displaced range `[new, old)` forward by one. The moved row itself is
/// not part of the range; its position is written directly to `new`.
pub fn move_shift(old: i32, new: i32) -> Option<PositionShift> {
    use std::cmp::Ordering;

    match new.cmp(&old) {
        Ordering::Equal => None,
        Ordering::Greater => Some(PositionShift {
            from: old + 1,
            to: Some(new),
            delta: -1,
        }),
        Ordering::Less => Some(PositionShift {
            from: new,
            to: Some(old - 1),
            delta: 1,
        }),
    }
}

/// Shifts for moving a row from `old` in one parent to `new` in another.
///
/// Returns `(source, target)`: the source parent closes the gap the row
/// left behind, the target parent opens a slot at `new`.
pub fn cross_parent_shifts(old: i32, new: i32) -> (PositionShift, PositionShift) {
    (removal_shift(old), insertion_shift(new))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Applies a shift to every element of an in-memory position list,
    /// mirroring what the SQL bulk update does to sibling rows.
    fn apply_all(positions: &mut [i32], shift: PositionShift) {
        for p in positions.iter_mut() {
            *p = shift.apply(*p);
        }
    }

    fn assert_dense(positions: &mut Vec<i32>) {
        positions.sort_unstable();
        let expected: Vec<i32> = (0..positions.len() as i32).collect();
        assert_eq!(*positions, expected, "positions must be dense and zero-based");
    }

    #[test]
    fn test_insert_at_head_shifts_all_siblings() {
        // Board with columns at [0, 1, 2]; create a new column at position 0.
        let mut siblings = vec![0, 1, 2];
        let shift = insertion_shift(0);
        apply_all(&mut siblings, shift);

        assert_eq!(siblings, vec![1, 2, 3]);

        let mut all = siblings.clone();
        all.push(0); // the new column
        assert_dense(&mut all);
    }

    #[test]
    fn test_insert_in_middle_only_shifts_tail() {
        let mut siblings = vec![0, 1, 2, 3];
        apply_all(&mut siblings, insertion_shift(2));

        assert_eq!(siblings, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_move_up_within_parent() {
        // Five tasks; move the one at position 3 to position 1. Tasks
        // previously at 1 and 2 shift to 2 and 3; 0 and 4 are untouched.
        let shift = move_shift(3, 1).unwrap();

        assert_eq!(shift.apply(0), 0);
        assert_eq!(shift.apply(1), 2);
        assert_eq!(shift.apply(2), 3);
        assert_eq!(shift.apply(4), 4);

        let mut all: Vec<i32> = [0, 1, 2, 4].iter().map(|&p| shift.apply(p)).collect();
        all.push(1); // the moved task's written position
        assert_dense(&mut all);
    }

    #[test]
    fn test_move_down_within_parent() {
        // Move position 1 to position 3: (1, 3] decrements.
        let shift = move_shift(1, 3).unwrap();

        assert_eq!(shift.apply(0), 0);
        assert_eq!(shift.apply(2), 1);
        assert_eq!(shift.apply(3), 2);
        assert_eq!(shift.apply(4), 4);

        let mut all: Vec<i32> = [0, 2, 3, 4].iter().map(|&p| shift.apply(p)).collect();
        all.push(3);
        assert_dense(&mut all);
    }

    #[test]
    fn test_move_to_same_position_is_noop() {
        assert!(move_shift(0, 0).is_none());
        assert!(move_shift(7, 7).is_none());
    }

    #[test]
    fn test_cross_parent_move() {
        // Source column holds 4 tasks, moving the one at position 2;
        // target column holds 3 tasks, landing at position 1.
        let (source, target) = cross_parent_shifts(2, 1);

        let mut source_rest: Vec<i32> = [0, 1, 3].iter().map(|&p| source.apply(p)).collect();
        assert_eq!(source_rest, vec![0, 1, 2]);
        assert_dense(&mut source_rest);

        let mut target_all: Vec<i32> = [0, 1, 2].iter().map(|&p| target.apply(p)).collect();
        assert_eq!(target_all, vec![0, 2, 3]);
        target_all.push(1); // moved task
        assert_dense(&mut target_all);
    }

    #[test]
    fn test_delete_closes_gap() {
        // Delete the task at position 1 of [0, 1, 2, 3].
        let shift = removal_shift(1);
        let mut rest: Vec<i32> = [0, 2, 3].iter().map(|&p| shift.apply(p)).collect();

        assert_eq!(rest, vec![0, 1, 2]);
        assert_dense(&mut rest);
    }

    #[test]
    fn test_random_operation_sequence_keeps_density() {
        // Simulate a drag-and-drop session: appends, inserts, moves, and
        // deletes against an in-memory list, asserting density throughout.
        let mut items: Vec<i32> = Vec::new();

        let append = |items: &mut Vec<i32>| {
            let next = items.iter().max().map_or(0, |m| m + 1);
            items.push(next);
        };

        let insert_at = |items: &mut Vec<i32>, pos: i32| {
            let shift = insertion_shift(pos);
            for p in items.iter_mut() {
                *p = shift.apply(*p);
            }
            items.push(pos);
        };

        let move_item = |items: &mut Vec<i32>, old: i32, new: i32| {
            let idx = items.iter().position(|&p| p == old).unwrap();
            if let Some(shift) = move_shift(old, new) {
                for (i, p) in items.iter_mut().enumerate() {
                    if i != idx {
                        *p = shift.apply(*p);
                    }
                }
                items[idx] = new;
            }
        };

        let delete = |items: &mut Vec<i32>, pos: i32| {
            let idx = items.iter().position(|&p| p == pos).unwrap();
            items.remove(idx);
            let shift = removal_shift(pos);
            for p in items.iter_mut() {
                *p = shift.apply(*p);
            }
        };

        append(&mut items);
        append(&mut items);
        append(&mut items);
        assert_dense(&mut items.clone());

        insert_at(&mut items, 1);
        assert_dense(&mut items.clone());

        move_item(&mut items, 3, 0);
        assert_dense(&mut items.clone());

        move_item(&mut items, 0, 2);
        assert_dense(&mut items.clone());

        delete(&mut items, 1);
        assert_dense(&mut items.clone());

        move_item(&mut items, 2, 2); // no-op
        assert_dense(&mut items.clone());

        delete(&mut items, 0);
        delete(&mut items, 0);
        delete(&mut items, 0);
        assert!(items.is_empty());
    }
}
