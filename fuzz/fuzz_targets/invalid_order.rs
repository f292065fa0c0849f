#![no_main]

use libfuzzer_sys::fuzz_target;

// The comparison answers are taken from the input, so they follow no order at all. The sort may
// produce any order, but must terminate and keep every element.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let (answers, values) = data.split_at(data.len() / 2);
    let mut answer_idx = 0;

    let mut v = values.to_vec();
    hqsort::sort_with_threshold(
        &mut v,
        |_, _| {
            let answer = answers[answer_idx % answers.len()];
            answer_idx += 1;
            answer & 1 == 1
        },
        (answers[0] % 32) as usize,
    );

    let mut before = values.to_vec();
    before.sort();
    v.sort();
    assert_eq!(v, before);
});
