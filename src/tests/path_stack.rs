use crate::path_stack::{MAX_DEPTH, PathStack};

#[test]
fn empty_stack() {
    let stack: PathStack<u16> = PathStack::new();
    assert_eq!(stack.len(), 0);
    assert!(stack.is_empty());
    assert_eq!(stack.back(), None);
}

#[test]
fn push_back_pop_back() {
    let mut stack = PathStack::new();
    stack.push_back(1);
    stack.push_back(2);
    stack.push_back(3);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.back(), Some(&3));
    assert_eq!(stack.pop_back(), Some(3));
    assert_eq!(stack.pop_back(), Some(2));
    assert_eq!(stack.pop_back(), Some(1));
    assert_eq!(stack.pop_back(), None);
}

#[test]
fn push_front_shifts_deeper() {
    let mut stack = PathStack::new();
    stack.push_back(2);
    stack.push_back(3);
    stack.push_front(1);
    assert_eq!(stack.get(0), Some(&1));
    assert_eq!(stack.get(1), Some(&2));
    assert_eq!(stack.get(2), Some(&3));
    assert_eq!(stack.pop_front(), Some(1));
    assert_eq!(stack.pop_front(), Some(2));
    assert_eq!(stack.len(), 1);
}

#[test]
fn random_access_and_mutation() {
    let mut stack = PathStack::new();
    for depth in 0..5 {
        stack.push_back(depth);
    }
    *stack.get_mut(2).unwrap() = 99;
    assert_eq!(stack.get(2), Some(&99));
    assert_eq!(stack.get(5), None);
    *stack.back_mut().unwrap() = 42;
    assert_eq!(stack.back(), Some(&42));
}

#[test]
fn clear_resets() {
    let mut stack = PathStack::new();
    stack.push_back("a");
    stack.push_back("b");
    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.pop_back(), None);
}

#[test]
fn mixed_ends_preserve_order() {
    let mut stack = PathStack::new();
    stack.push_back(3);
    stack.push_front(2);
    stack.push_back(4);
    stack.push_front(1);
    let collected: Vec<i32> = stack.iter().copied().collect();
    assert_eq!(collected, vec![1, 2, 3, 4]);
}

#[test]
fn full_capacity_works() {
    let mut stack = PathStack::new();
    for depth in 0..MAX_DEPTH {
        stack.push_back(depth);
    }
    assert_eq!(stack.len(), MAX_DEPTH);
    assert_eq!(stack.back(), Some(&(MAX_DEPTH - 1)));
}

#[test]
#[should_panic(expected = "path depth exceeded")]
fn overflow_panics() {
    let mut stack = PathStack::new();
    for depth in 0..=MAX_DEPTH {
        stack.push_back(depth);
    }
}

#[test]
#[should_panic(expected = "path depth exceeded")]
fn push_front_overflow_panics() {
    let mut stack = PathStack::new();
    for depth in 0..=MAX_DEPTH {
        stack.push_front(depth);
    }
}
