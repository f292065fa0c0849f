use crate::HeldElement;

/// Sort `v` assuming `v[..offset]` is already sorted.
///
/// Each element of `v[offset..]` is held aside while the greater elements before it shift one slot
/// to the right. It then fills the slot left free.
pub(crate) fn insertion_sort_shift_left<T, F>(v: &mut [T], offset: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    // This would be a logic bug in other code.
    debug_assert!(offset != 0 && offset <= len);

    let v_base = v.as_mut_ptr();

    for i in offset..len {
        // SAFETY: `i < len` and the shift below only touches `v[..=i]`. While `held` lives, its
        // `dest` is the only slot without a live element: each shift copies `v[j - 1]` into that
        // slot and moves `dest` to `j - 1`. Dropping `held` fills the slot, also on panic.
        unsafe {
            let mut held = HeldElement::take(v_base.add(i));

            let mut j = i;
            while j > 0 && is_less(held.value(), &*v_base.add(j - 1)) {
                core::ptr::copy_nonoverlapping(v_base.add(j - 1), v_base.add(j), 1);
                j -= 1;
                held.dest = v_base.add(j);
            }
        }
    }
}

#[test]
fn insertion_sort_basic() {
    let mut is_less = |a: &i32, b: &i32| a < b;

    let mut v = [5, 2, 9, 1, 5, 6, 3, 8, 4, 7];
    insertion_sort_shift_left(&mut v, 1, &mut is_less);
    assert_eq!(v, [1, 2, 3, 4, 5, 5, 6, 7, 8, 9]);

    let mut v = [3, 2, 1];
    insertion_sort_shift_left(&mut v, 1, &mut is_less);
    assert_eq!(v, [1, 2, 3]);

    // Only the tail is unsorted.
    let mut v = [1, 4, 6, 0];
    insertion_sort_shift_left(&mut v, 3, &mut is_less);
    assert_eq!(v, [0, 1, 4, 6]);
}

#[test]
fn insertion_sort_panic_keeps_elements() {
    use std::panic::{self, AssertUnwindSafe};

    let mut v = ["d", "a", "c", "b", "e"]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();

    let mut comparisons = 0;
    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        insertion_sort_shift_left(&mut v, 1, &mut |a: &String, b: &String| {
            comparisons += 1;
            // Panics while "b" is held aside and "d" was already shifted right.
            if comparisons == 5 {
                panic!("explicit panic");
            }
            a < b
        });
    }));
    assert!(res.is_err());

    v.sort();
    assert_eq!(v, ["a", "b", "c", "d", "e"]);
}
