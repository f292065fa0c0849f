#![no_main]

use libfuzzer_sys::fuzz_target;

// The first byte picks the cutover, the rest is the input.
fuzz_target!(|data: &[u8]| {
    let Some((&threshold, values)) = data.split_first() else {
        return;
    };

    let mut v = values.to_vec();
    hqsort::sort_with_threshold(&mut v, |a, b| a < b, threshold as usize);

    let mut expected = values.to_vec();
    expected.sort();
    assert_eq!(v, expected);
});
