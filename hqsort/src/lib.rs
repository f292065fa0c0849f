//! Hybrid median-of-three quicksort with an insertion sort cutover.

use core::cmp::Ordering;
use core::mem::{self, ManuallyDrop};
use core::ptr;

mod pivot;
mod quicksort;
mod smallsort;

use crate::quicksort::{Cutover, FixedCutover, TunedCutover};

/// Slices of this length or shorter are insertion sorted instead of partitioned, unless a different
/// threshold is passed to [`sort_with_threshold`].
pub const DEFAULT_THRESHOLD: usize = 16;

/// Sorts the slice, but might not preserve the order of equal elements.
///
/// This sort is unstable (i.e., may reorder equal elements), in-place (i.e., does not allocate),
/// and uses *O*(log(*n*)) stack space regardless of the input order.
///
/// # Current implementation
///
/// Quicksort with a median-of-three pivot taken from the first, middle and last element and a
/// Hoare partition. After each partition step the shorter side is sorted recursively and the
/// longer side is handled by the next loop iteration, which bounds the recursion depth to
/// log2(*n*). Slices of at most [`DEFAULT_THRESHOLD`] elements are insertion sorted.
///
/// # Examples
///
/// ```
/// let mut v = [5, 2, 9, 1, 5, 6, 3, 8, 4, 7];
///
/// hqsort::sort(&mut v);
/// assert_eq!(v, [1, 2, 3, 4, 5, 5, 6, 7, 8, 9]);
/// ```
#[inline(always)]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    hybrid_sort(v, |a, b| a.lt(b), FixedCutover::<DEFAULT_THRESHOLD>);
}

/// Sorts the slice with a comparator function, but might not preserve the order of equal
/// elements.
///
/// The comparator function must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified, but all original elements
/// will remain in `v`. The same is true if `compare` panics.
///
/// # Examples
///
/// ```
/// let mut v = [5, 2, 9, 1, 5, 6];
///
/// // reverse sorting
/// hqsort::sort_by(&mut v, |a, b| b.cmp(a));
/// assert_eq!(v, [9, 6, 5, 5, 2, 1]);
/// ```
#[inline(always)]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    hybrid_sort(
        v,
        |a, b| compare(a, b) == Ordering::Less,
        FixedCutover::<DEFAULT_THRESHOLD>,
    );
}

/// Sorts the slice with a key extraction function, but might not preserve the order of equal
/// elements.
///
/// The key function is called on every comparison, for expensive keys consider caching them.
///
/// ```
/// let mut v = ["banana", "apple", "cherry", "date", "blueberry"];
///
/// hqsort::sort_by_key(&mut v, |s| s.len());
/// assert!(v.windows(2).all(|w| w[0].len() <= w[1].len()));
/// ```
#[inline(always)]
pub fn sort_by_key<T, K, F>(v: &mut [T], mut f: F)
where
    F: FnMut(&T) -> K,
    K: Ord,
{
    hybrid_sort(
        v,
        |a, b| f(a).lt(&f(b)),
        FixedCutover::<DEFAULT_THRESHOLD>,
    );
}

/// Sorts the slice with a "less than" predicate, but might not preserve the order of equal
/// elements.
///
/// `is_less(a, b)` must return true if and only if `a` is ordered strictly before `b`. The
/// predicate has to be a strict weak ordering (irreflexive, transitive and with transitive
/// incomparability). Otherwise the resulting order is unspecified, but every original element is
/// still present exactly once, and the sort terminates.
#[inline(always)]
pub fn sort_by_less<T, F>(v: &mut [T], is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    hybrid_sort(v, is_less, FixedCutover::<DEFAULT_THRESHOLD>);
}

/// Same as [`sort_by_less`], but with an explicit cutover: sub-slices with at most `threshold`
/// elements are insertion sorted.
///
/// The resulting order is the same for every threshold, only the performance differs. A threshold
/// of `0` behaves like `1`.
///
/// ```
/// let mut v = [3, 1, 2];
///
/// hqsort::sort_with_threshold(&mut v, |a, b| a < b, 2);
/// assert_eq!(v, [1, 2, 3]);
/// ```
#[inline(always)]
pub fn sort_with_threshold<T, F>(v: &mut [T], is_less: F, threshold: usize)
where
    F: FnMut(&T, &T) -> bool,
{
    hybrid_sort(v, is_less, TunedCutover(threshold));
}

/// Sorts the slice with insertion sort only, *O*(*n*^2) worst-case.
///
/// This is the fallback used by the hybrid sort for short sub-slices, exposed to measure where
/// the cutover should be.
#[inline(always)]
pub fn insertion_sort<T>(v: &mut [T])
where
    T: Ord,
{
    insertion_sort_by(v, |a, b| a.lt(b));
}

/// Insertion sort with a "less than" predicate, see [`insertion_sort`] and [`sort_by_less`].
#[inline(always)]
pub fn insertion_sort_by<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    if mem::size_of::<T>() == 0 || v.len() < 2 {
        return;
    }

    smallsort::insertion_sort_shift_left(v, 1, &mut is_less);
}

// --- IMPL ---

#[inline(always)]
fn hybrid_sort<T, F, C>(v: &mut [T], mut is_less: F, cutover: C)
where
    F: FnMut(&T, &T) -> bool,
    C: Cutover,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if mem::size_of::<T>() == 0 {
        return;
    }

    if v.len() < 2 {
        return;
    }

    quicksort::quicksort(v, &mut is_less, cutover);
}

/// An element read out of a slice, which leaves `dest` without a live element. Dropping the guard
/// writes the element back into `dest`, so the slice again holds every element exactly once, also
/// when `is_less` panics while the element is held.
pub(crate) struct HeldElement<T> {
    value: ManuallyDrop<T>,
    pub(crate) dest: *mut T,
}

impl<T> HeldElement<T> {
    /// # Safety
    ///
    /// `src` must be valid for reads and writes, and nothing may read or drop `*src` as long as
    /// the returned guard lives, unless `dest` is moved elsewhere first.
    #[inline(always)]
    pub(crate) unsafe fn take(src: *mut T) -> Self {
        Self {
            value: ManuallyDrop::new(ptr::read(src)),
            dest: src,
        }
    }

    #[inline(always)]
    pub(crate) fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for HeldElement<T> {
    fn drop(&mut self) {
        // SAFETY: see `take`, the caller keeps `dest` pointing at the one empty slot.
        unsafe {
            ptr::copy_nonoverlapping(&*self.value, self.dest, 1);
        }
    }
}

#[test]
fn empty_and_single() {
    let mut empty: [i32; 0] = [];
    sort(&mut empty);
    sort_with_threshold(&mut empty, |a, b| a < b, 0);

    let mut single = [42];
    sort(&mut single);
    assert_eq!(single, [42]);

    let mut zst = [(), (), ()];
    sort(&mut zst);
}

#[test]
fn two_elements_one_comparison() {
    let mut v = [5, 3];
    let mut comparisons = 0;
    sort_by_less(&mut v, |a, b| {
        comparisons += 1;
        a < b
    });

    assert_eq!(v, [3, 5]);
    assert_eq!(comparisons, 1);
}
