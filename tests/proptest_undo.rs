use proptest::prelude::*;

use trailmark::session::UndoStack;

proptest! {
    #[test]
    fn stack_never_exceeds_capacity(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<u32>(), 0..64),
    ) {
        let mut stack = UndoStack::new(capacity);
        for v in values {
            stack.push(v);
            prop_assert!(stack.len() <= capacity);
        }
    }

    #[test]
    fn pop_order_is_reverse_of_push_order(
        values in prop::collection::vec(any::<u32>(), 0..16),
    ) {
        // Capacity covers every push, so nothing is evicted.
        let mut stack = UndoStack::new(16);
        for v in &values {
            prop_assert!(stack.push(*v).is_none());
        }

        let mut popped = Vec::new();
        while let Some(v) = stack.pop() {
            popped.push(v);
        }
        let mut expected = values;
        expected.reverse();
        prop_assert_eq!(popped, expected);
    }

    #[test]
    fn eviction_returns_oldest_records_in_order(
        capacity in 1usize..8,
        values in prop::collection::vec(any::<u32>(), 0..32),
    ) {
        let mut stack = UndoStack::new(capacity);
        let mut evicted = Vec::new();
        for v in &values {
            if let Some(old) = stack.push(*v) {
                evicted.push(old);
            }
        }

        let expected: Vec<u32> = values
            .iter()
            .copied()
            .take(values.len().saturating_sub(capacity))
            .collect();
        prop_assert_eq!(evicted, expected);
    }
}
