//! This module contains the logic for pivot selection.

/// Selects a pivot from `v`, the median of its first, middle and last element. Returns the
/// position of the chosen element.
#[inline]
pub(crate) fn choose_pivot<T, F>(v: &[T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    debug_assert!(len >= 2);

    let last = len - 1;
    median3(v, 0, last / 2, last, is_less)
}

/// Returns whichever of the positions `a`, `b` and `c` holds the median of the three values.
///
/// Uses at most 3 comparisons and does not move any element. Equal values are resolved by the
/// order of the branches, which always yields one of the three positions.
#[inline(always)]
fn median3<T, F>(v: &[T], a: usize, b: usize, c: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    if is_less(&v[a], &v[b]) {
        // a < b
        if is_less(&v[b], &v[c]) {
            b
        } else if is_less(&v[a], &v[c]) {
            c
        } else {
            a
        }
    } else {
        // b <= a
        if is_less(&v[a], &v[c]) {
            a
        } else if is_less(&v[b], &v[c]) {
            c
        } else {
            b
        }
    }
}

#[test]
fn median3_all_orders() {
    let mut is_less = |a: &i32, b: &i32| a < b;

    for v in [
        [1, 2, 3],
        [1, 3, 2],
        [2, 1, 3],
        [2, 3, 1],
        [3, 1, 2],
        [3, 2, 1],
    ] {
        let pos = median3(&v, 0, 1, 2, &mut is_less);
        assert_eq!(v[pos], 2, "{v:?}");
    }
}

#[test]
fn median3_ties() {
    let mut is_less = |a: &i32, b: &i32| a < b;

    for (v, expected) in [
        ([7, 7, 7], 7),
        ([1, 1, 5], 1),
        ([5, 1, 1], 1),
        ([1, 5, 1], 1),
        ([5, 5, 1], 5),
        ([1, 5, 5], 5),
        ([5, 1, 5], 5),
    ] {
        let pos = median3(&v, 0, 1, 2, &mut is_less);
        assert_eq!(v[pos], expected, "{v:?}");
    }
}

#[test]
fn median3_comparison_count() {
    let mut comparisons = 0;
    let mut is_less = |a: &i32, b: &i32| {
        comparisons += 1;
        a < b
    };

    let v = [3, 1, 2];
    median3(&v, 0, 1, 2, &mut is_less);
    assert!(comparisons <= 3);
}

#[test]
fn choose_pivot_samples_middle() {
    // First, middle and last of an even length slice are 0, 1 and 3.
    let v = [10, 20, 0, 30];
    let pos = choose_pivot(&v, &mut |a: &i32, b: &i32| a < b);
    assert_eq!(pos, 1);
}
