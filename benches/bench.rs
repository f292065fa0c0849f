use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use sort_comp::hybrid::{self, THRESHOLDS};
#[allow(unused_imports)]
use sort_comp::test_types::F128;
use sort_comp::{other, patterns, stable, unstable, Sort};

fn pin_thread_to_core() {
    use std::cell::Cell;
    let pin_core_id: usize = 2;

    thread_local! {static AFFINITY_ALREADY_SET: Cell<bool> = const { Cell::new(false) } }

    // Set affinity only once per thread.
    AFFINITY_ALREADY_SET.with(|affinity_already_set| {
        if !affinity_already_set.get() {
            if let Some(core_id_2) = core_affinity::get_core_ids()
                .as_ref()
                .and_then(|ids| ids.get(pin_core_id))
            {
                core_affinity::set_for_current(*core_id_2);
            }

            affinity_already_set.set(true);
        }
    });
}

/// Thresholds of the tuned variants to benchmark, `BENCH_THRESHOLDS=8,16,32` limits the sweep.
fn selected_thresholds() -> Vec<usize> {
    match env::var("BENCH_THRESHOLDS") {
        Ok(list) => list
            .split(',')
            .map(|val| {
                val.trim()
                    .parse::<usize>()
                    .expect("BENCH_THRESHOLDS must be a comma separated list of integers")
            })
            .collect(),
        Err(_) => THRESHOLDS.to_vec(),
    }
}

#[inline(never)]
fn bench_sort<T: Ord + std::fmt::Debug>(
    c: &mut Criterion,
    test_size: usize,
    transform_name: &str,
    transform: &fn(Vec<i32>) -> Vec<T>,
    pattern_name: &str,
    pattern_provider: &fn(usize) -> Vec<i32>,
    bench_name: &str,
    sort_func: impl Fn(&mut [T]),
) {
    // Pinning only the measuring thread leaves criterion free to use other threads for its
    // analysis.
    pin_thread_to_core();

    let batch_size = if test_size > 30 {
        BatchSize::LargeInput
    } else {
        BatchSize::SmallInput
    };

    c.bench_function(
        &format!("{bench_name}-hot-{transform_name}-{pattern_name}-{test_size}"),
        |b| {
            b.iter_batched(
                || transform(pattern_provider(test_size)),
                |mut test_data| sort_func(black_box(test_data.as_mut_slice())),
                batch_size,
            )
        },
    );
}

fn measure_comp_count(
    name: &str,
    test_size: usize,
    instrumented_sort_func: impl Fn(),
    comp_count: Rc<RefCell<u64>>,
) {
    let run_count: usize = if test_size <= 20 {
        100_000
    } else if test_size < 10_000 {
        3000
    } else {
        100
    };

    *comp_count.borrow_mut() = 0;
    for _ in 0..run_count {
        instrumented_sort_func();
    }

    // Truncates, below one comparison on average this reads 0.
    let total = *comp_count.borrow() / (run_count as u64);
    println!("{name}: mean comparisons: {total}");
}

#[inline(never)]
fn bench_impl<T: Ord + std::fmt::Debug, S: Sort>(
    c: &mut Criterion,
    test_size: usize,
    transform_name: &str,
    transform: &fn(Vec<i32>) -> Vec<T>,
    pattern_name: &str,
    pattern_provider: &fn(usize) -> Vec<i32>,
) {
    let bench_name = S::name();

    if env::var("MEASURE_COMP").is_ok() {
        if transform_name == "i32" {
            let name = format!("{bench_name}-comp-{transform_name}-{pattern_name}-{test_size}");

            // Counting goes through sort_by for every variant, so all of them see the same
            // comparison function.
            let comp_count = Rc::new(RefCell::new(0u64));
            let comp_count_copy = comp_count.clone();
            let instrumented_sort_func = || {
                let mut test_data = transform(pattern_provider(test_size));
                S::sort_by(black_box(test_data.as_mut_slice()), |a, b| {
                    *comp_count_copy.borrow_mut() += 1;
                    a.cmp(b)
                })
            };
            measure_comp_count(&name, test_size, instrumented_sort_func, comp_count);
        }
    } else {
        bench_sort(
            c,
            test_size,
            transform_name,
            transform,
            pattern_name,
            pattern_provider,
            &bench_name,
            S::sort,
        );
    }
}

macro_rules! bench_tuned {
    (@call ($c:expr, $test_size:expr, $transform_name:expr, $transform:expr, $pattern_name:expr, $pattern_provider:expr), $sort_impl:ty) => {
        bench_impl::<_, $sort_impl>(
            $c,
            $test_size,
            $transform_name,
            $transform,
            $pattern_name,
            $pattern_provider,
        )
    };
    ($thresholds:expr, $args:tt, $($threshold:literal),*) => {
        paste::paste! {
            $(
                if $thresholds.contains(&$threshold) {
                    bench_tuned!(@call $args, hybrid::[<hqsort_t $threshold>]::SortImpl);
                }
            )*
        }
    };
}

fn bench_patterns<T: Ord + std::fmt::Debug>(
    c: &mut Criterion,
    test_size: usize,
    transform_name: &str,
    transform: fn(Vec<i32>) -> Vec<T>,
    thresholds: &[usize],
) {
    let mut pattern_providers: Vec<(&'static str, fn(usize) -> Vec<i32>)> = vec![
        ("random", patterns::random),
        ("random_d20", |size| patterns::random_uniform(size, 0..20)),
        ("ascending", patterns::ascending),
        ("descending", patterns::descending),
        ("pipe_organ", patterns::pipe_organ),
        ("saw_mixed", |size| {
            patterns::saw_mixed(size, ((size as f64).log2().round()).max(1.0) as usize)
        }),
    ];

    // Patterns with many duplicates or long sorted runs.
    let mut extra_pattern_providers: Vec<(&'static str, fn(usize) -> Vec<i32>)> = vec![
        ("all_equal", patterns::all_equal),
        ("random_binary", |size| patterns::random_uniform(size, 0..=1)),
        ("random_s95", |size| patterns::random_sorted(size, 95.0)),
    ];

    if env::var("EXTRA_PATTERNS").is_ok() {
        pattern_providers.append(&mut extra_pattern_providers);
    }

    for (pattern_name, pattern_provider) in pattern_providers.iter() {
        if test_size < 3 && *pattern_name != "random" {
            continue;
        }

        bench_impl::<_, hybrid::hqsort::SortImpl>(
            c,
            test_size,
            transform_name,
            &transform,
            pattern_name,
            pattern_provider,
        );

        bench_tuned!(
            thresholds,
            (c, test_size, transform_name, &transform, pattern_name, pattern_provider),
            2, 4, 8, 16, 24, 32, 48, 64, 96, 128
        );

        if test_size <= 128 {
            bench_impl::<_, other::insertion::SortImpl>(
                c,
                test_size,
                transform_name,
                &transform,
                pattern_name,
                pattern_provider,
            );
        }

        bench_impl::<_, unstable::rust_std::SortImpl>(
            c,
            test_size,
            transform_name,
            &transform,
            pattern_name,
            pattern_provider,
        );

        bench_impl::<_, stable::rust_std::SortImpl>(
            c,
            test_size,
            transform_name,
            &transform,
            pattern_name,
            pattern_provider,
        );

        #[cfg(feature = "rust_dmsort")]
        bench_impl::<_, unstable::rust_dmsort::SortImpl>(
            c,
            test_size,
            transform_name,
            &transform,
            pattern_name,
            pattern_provider,
        );
    }
}

fn ensure_true_random() {
    // With the default fixed seed every random pattern would be identical between calls.
    let random_vec_a = patterns::random(5);
    let random_vec_b = patterns::random(5);

    assert_ne!(random_vec_a, random_vec_b);
}

fn criterion_benchmark(c: &mut Criterion) {
    let test_sizes = [
        0, 1, 2, 3, 4, 8, 16, 24, 32, 48, 64, 96, 128, 200, 500, 1_000, 2_048, 10_000, 100_000,
        1_000_000,
    ];

    patterns::use_random_seed_each_time();
    ensure_true_random();

    let thresholds = selected_thresholds();

    for test_size in test_sizes {
        // Basic type often used to test sorting algorithms.
        bench_patterns(c, test_size, "i32", |values| values, &thresholds);

        // Sorting indices is very common.
        #[cfg(feature = "bench_type_u64")]
        bench_patterns(
            c,
            test_size,
            "u64",
            |values| {
                values
                    .iter()
                    .map(|val| -> u64 {
                        // Shift into the upper part of the 64 bit range, the order of the inputs
                        // is kept.
                        let x = ((*val as i64) + (i32::MAX as i64) + 1) as u64;
                        x.checked_mul(i32::MAX as u64).unwrap()
                    })
                    .collect()
            },
            &thresholds,
        );

        // Not Copy and does heap access. Zero extended, so the lexicographic order matches the
        // numeric one.
        #[cfg(feature = "bench_type_string")]
        bench_patterns(
            c,
            test_size,
            "string",
            |values| {
                values
                    .iter()
                    .map(|val| format!("{:010}", val.saturating_abs()))
                    .collect()
            },
            &thresholds,
        );

        #[cfg(feature = "bench_type_f128")]
        bench_patterns(
            c,
            test_size,
            "f128",
            |values| values.iter().map(|val| F128::new(*val)).collect(),
            &thresholds,
        );
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
