use crate::smallsort;
use crate::HeldElement;

/// Decides up to which length a sub-slice is insertion sorted instead of partitioned.
///
/// The driver is generic over this so that the default threshold is a compile-time constant,
/// while the tuned variant reads it at run-time. Both go through the same code.
pub(crate) trait Cutover: Copy {
    fn threshold(self) -> usize;
}

#[derive(Copy, Clone)]
pub(crate) struct FixedCutover<const THRESHOLD: usize>;

impl<const THRESHOLD: usize> Cutover for FixedCutover<THRESHOLD> {
    #[inline(always)]
    fn threshold(self) -> usize {
        THRESHOLD
    }
}

#[derive(Copy, Clone)]
pub(crate) struct TunedCutover(pub usize);

impl Cutover for TunedCutover {
    #[inline(always)]
    fn threshold(self) -> usize {
        self.0
    }
}

/// Sorts `v` recursively.
///
/// Only the shorter side of each partition is sorted with a recursive call, the longer side is
/// sorted by the next iteration of the loop. The recursive call sees at most half the elements,
/// which limits the recursion depth to log2(len) no matter how unbalanced the partitions are.
pub(crate) fn quicksort<T, F, C>(mut v: &mut [T], is_less: &mut F, cutover: C)
where
    F: FnMut(&T, &T) -> bool,
    C: Cutover,
{
    // Partitioning needs at least two elements.
    let threshold = cutover.threshold().max(1);

    while v.len() > threshold {
        let pivot_pos = crate::pivot::choose_pivot(v, is_less);
        let mid = partition(v, pivot_pos, is_less);

        // The pivot is in its final position and belongs to neither side.
        let (left, rest) = v.split_at_mut(mid);
        let right = &mut rest[1..];

        if left.len() < right.len() {
            quicksort(left, is_less, cutover);
            v = right;
        } else {
            quicksort(right, is_less, cutover);
            v = left;
        }
    }

    if v.len() >= 2 {
        smallsort::insertion_sort_shift_left(v, 1, is_less);
    }
}

/// Takes the input slice `v` and re-arranges elements around the value at `pivot_pos`, such that
/// when the call returns normally no element of `v[..mid]` compares greater than the pivot, the
/// pivot itself is at `v[mid]`, and no element of `v[mid + 1..]` compares less than the pivot.
/// Elements equal to the pivot can end up on either side.
///
/// Returns `mid`, which is always in `0..v.len()`.
///
/// If `is_less` does not implement a strict weak order the resulting order is unspecified, but
/// all original elements will remain in `v` and the returned `mid` is still in `0..v.len()`. Same
/// is true if `is_less` panics.
pub(crate) fn partition<T, F>(v: &mut [T], pivot_pos: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    // This would be a logic bug in other code.
    debug_assert!(pivot_pos < len);
    if pivot_pos >= len {
        return 0;
    }

    // Park the pivot at the front, the scan works on the rest.
    v.swap(0, pivot_pos);
    let (pivot_slot, rest) = v.split_at_mut(1);

    let num_le = {
        // SAFETY: `pivot_slot` is not accessed while `pivot` lives, `rest` does not overlap it.
        // Dropping `pivot` writes the held value back, including changes made through interior
        // mutability during the comparisons.
        let pivot = unsafe { HeldElement::take(pivot_slot.as_mut_ptr()) };
        hoare_scan(rest, pivot.value(), is_less)
    };

    // Place the pivot between the two sides. `v[num_le]` is either the pivot itself or the last
    // element of the left side.
    v.swap(0, num_le);

    num_le
}

/// Hoare scan of `v` around `pivot`. Returns `k` so that no element of `v[..k]` is greater than
/// `pivot` and no element of `v[k..]` is less. `k` is in `0..=v.len()` for any `is_less`.
fn hoare_scan<T, F>(v: &mut [T], pivot: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    // `v[..l]` is the left side, `v[r..]` the right side.
    let mut l = 0;
    let mut r = v.len();

    loop {
        while l < r && is_less(&v[l], pivot) {
            l += 1;
        }

        while l < r && is_less(pivot, &v[r - 1]) {
            r -= 1;
        }

        if l >= r {
            break;
        }

        // Both stopped: `v[l]` is not less than the pivot and `v[r - 1]` is not greater. Equal
        // elements stop both scans and get spread over both sides.
        r -= 1;
        v.swap(l, r);
        l += 1;
    }

    l
}

#[cfg(test)]
fn check_partition(v: &mut [i32], pivot_pos: usize) {
    let pivot_val = v[pivot_pos];
    let mut sorted_before = v.to_vec();
    sorted_before.sort();

    let mid = partition(v, pivot_pos, &mut |a: &i32, b: &i32| a < b);

    assert!(mid < v.len(), "mid: {mid} len: {}", v.len());
    assert_eq!(v[mid], pivot_val, "{v:?} mid: {mid}");
    assert!(v[..mid].iter().all(|x| *x <= pivot_val), "{v:?} mid: {mid}");
    assert!(v[mid + 1..].iter().all(|x| *x >= pivot_val), "{v:?} mid: {mid}");

    let mut sorted_after = v.to_vec();
    sorted_after.sort();
    assert_eq!(sorted_before, sorted_after);
}

#[test]
fn partition_split() {
    check_partition(&mut [5, 2, 9, 1, 5, 6, 3, 8, 4, 7], 4);
    check_partition(&mut [5, 3], 0);
    check_partition(&mut [3, 5], 0);
    check_partition(&mut [7], 0);
    check_partition(&mut [1, 2, 3, 4, 5, 6, 7, 8], 3);
    check_partition(&mut [8, 7, 6, 5, 4, 3, 2, 1], 3);
    check_partition(&mut [4, 4, 4, 4, 4, 4], 2);
    check_partition(&mut [0, 1, 0, 1, 1, 0, 0, 1], 0);
    check_partition(&mut [i32::MAX, 3, i32::MIN, 5, i32::MIN, -3, 60], 3);
}

#[test]
fn partition_pivot_median_of_three() {
    let mut is_less = |a: &i32, b: &i32| a < b;

    for len in 2..64 {
        let mut v = (0..len).rev().map(|x| (x * 7) % 13).collect::<Vec<i32>>();
        let pivot_pos = crate::pivot::choose_pivot(&v, &mut is_less);
        check_partition(&mut v, pivot_pos);
    }
}

#[test]
fn partition_equal_elements_split_evenly() {
    let mut v = [4; 101];
    let mid = partition(&mut v, 50, &mut |a: &i32, b: &i32| a < b);

    assert!((40..=60).contains(&mid), "mid: {mid}");
}

#[test]
fn partition_invalid_order_stays_in_bounds() {
    let mut v = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];

    let mid = partition(&mut v, 5, &mut |_: &i32, _: &i32| true);
    assert!(mid < v.len());

    let mid = partition(&mut v, 5, &mut |_: &i32, _: &i32| false);
    assert!(mid < v.len());

    let mut sorted = v.to_vec();
    sorted.sort();
    assert_eq!(sorted, [1, 1, 2, 3, 3, 4, 5, 5, 5, 6, 9]);
}

#[test]
fn partition_pivot_keeps_interior_changes() {
    use std::cell::Cell;

    // Every comparison bumps a counter inside the elements, the pivot's count must survive being
    // held outside of the slice.
    let mut v = (0..20).map(|x| (x, Cell::new(0u32))).collect::<Vec<_>>();
    let mid = partition(&mut v, 10, &mut |a: &(i32, Cell<u32>), b: &(i32, Cell<u32>)| {
        a.1.set(a.1.get() + 1);
        b.1.set(b.1.get() + 1);
        a.0 < b.0
    });

    assert_eq!(v[mid].0, 10);
    assert!(v[mid].1.get() > 0);
}
