//! Array primitives with the relative-index convention
//!
//! - `0` addresses the front (prepend / first element)
//! - a negative index addresses the end (append / last element)
//! - a positive index is an absolute position
//!
//! Callers validate indices before calling these; an invalid index is a
//! contract violation and panics.

/// Resolve a relative insertion index against a collection of `len` items.
///
/// Returns `None` when the index is past the end.
pub fn resolve_insert_index(len: usize, index: isize) -> Option<usize> {
    if index < 0 {
        Some(len)
    } else if index as usize <= len {
        Some(index as usize)
    } else {
        None
    }
}

/// Resolve a relative element index against a collection of `len` items.
///
/// Returns `None` for an empty collection or an index past the last element.
pub fn resolve_element_index(len: usize, index: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if index < 0 {
        Some(len - 1)
    } else if (index as usize) < len {
        Some(index as usize)
    } else {
        None
    }
}

/// Insert `items` at the relative `index`, keeping their order.
///
/// # Panics
///
/// Panics if `index` is positive and greater than `array.len()`.
pub fn add_array_elements<T>(array: &mut Vec<T>, index: isize, items: Vec<T>) {
    let at = match resolve_insert_index(array.len(), index) {
        Some(at) => at,
        None => panic!(
            "add_array_elements: index {} out of range for length {}",
            index,
            array.len()
        ),
    };
    array.splice(at..at, items);
}

/// Remove and return the element at the relative `index`.
///
/// # Panics
///
/// Panics if the array is empty or `index` is past the last element.
pub fn remove_array_element<T>(array: &mut Vec<T>, index: isize) -> T {
    match resolve_element_index(array.len(), index) {
        Some(at) => array.remove(at),
        None => panic!(
            "remove_array_element: index {} out of range for length {}",
            index,
            array.len()
        ),
    }
}

/// Move the element at `from` to the relative position `to`.
///
/// Defined as remove-then-insert: `to` is resolved against the array with the
/// element already removed. The moved value is the same value, never a copy.
///
/// # Panics
///
/// Panics if either index is out of range.
pub fn move_array_element<T>(array: &mut Vec<T>, from: isize, to: isize) {
    let from_at = match resolve_element_index(array.len(), from) {
        Some(at) => at,
        None => panic!(
            "move_array_element: source index {} out of range for length {}",
            from,
            array.len()
        ),
    };
    let remaining = array.len() - 1;
    let to_at = match resolve_insert_index(remaining, to) {
        Some(at) => at,
        None => panic!(
            "move_array_element: target index {} out of range for length {}",
            to, remaining
        ),
    };
    let element = array.remove(from_at);
    array.insert(to_at, element);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prepend_append_insert() {
        let mut v = vec![2, 3];
        add_array_elements(&mut v, 0, vec![0, 1]);
        assert_eq!(v, vec![0, 1, 2, 3]);

        add_array_elements(&mut v, -1, vec![5]);
        assert_eq!(v, vec![0, 1, 2, 3, 5]);

        add_array_elements(&mut v, 4, vec![4]);
        assert_eq!(v, vec![0, 1, 2, 3, 4, 5]);

        // index == len appends
        add_array_elements(&mut v, 6, vec![6]);
        assert_eq!(v, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_add_into_empty() {
        let mut v: Vec<u8> = Vec::new();
        add_array_elements(&mut v, -1, vec![1]);
        add_array_elements(&mut v, 0, vec![0]);
        assert_eq!(v, vec![0, 1]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_add_past_end_panics() {
        let mut v = vec![1, 2];
        add_array_elements(&mut v, 5, vec![3]);
    }

    #[test]
    fn test_remove() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        assert_eq!(remove_array_element(&mut v, 0), 'a');
        assert_eq!(remove_array_element(&mut v, -1), 'd');
        assert_eq!(remove_array_element(&mut v, 1), 'c');
        assert_eq!(v, vec!['b']);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_invalid_panics() {
        let mut v = vec![1];
        remove_array_element(&mut v, 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_from_empty_panics() {
        let mut v: Vec<i32> = vec![];
        remove_array_element(&mut v, -1);
    }

    #[test]
    fn test_move() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        move_array_element(&mut v, 0, -1);
        assert_eq!(v, vec!['b', 'c', 'd', 'a']);

        move_array_element(&mut v, -1, 0);
        assert_eq!(v, vec!['a', 'b', 'c', 'd']);

        move_array_element(&mut v, 1, 2);
        assert_eq!(v, vec!['a', 'c', 'b', 'd']);

        // to == len after removal appends
        move_array_element(&mut v, 0, 3);
        assert_eq!(v, vec!['c', 'b', 'd', 'a']);
    }

    #[test]
    fn test_move_preserves_identity() {
        let mut v = vec![String::from("x"), String::from("y")];
        let ptr = v[0].as_ptr();
        move_array_element(&mut v, 0, -1);
        assert_eq!(v[1].as_ptr(), ptr);
    }

    #[test]
    #[should_panic(expected = "target index")]
    fn test_move_target_out_of_range_panics() {
        let mut v = vec![1, 2, 3];
        move_array_element(&mut v, 0, 3);
    }

    #[test]
    fn test_sequence_keeps_all_elements() {
        let mut v: Vec<u32> = Vec::new();
        add_array_elements(&mut v, 0, vec![1, 2, 3]);
        add_array_elements(&mut v, -1, vec![4]);
        move_array_element(&mut v, 3, 0);
        let removed = remove_array_element(&mut v, 2);
        add_array_elements(&mut v, 1, vec![9]);

        let mut sorted = v.clone();
        sorted.push(removed);
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 9]);
        assert_eq!(v, vec![4, 9, 1, 3]);
    }
}
