//! Randomised histories built from a known chain of register states.
//!
//! A chain `0 -> 1 -> ... -> n` is dealt out to threads in chain order, with
//! failed attempts mixed in, so every generated history is linearizable.

use cascheck_core::history::{CasOperation, OperationHistory};
use cascheck_core::{check_restricted, check_unrestricted};
use rand::distr::{Distribution, Uniform};
use rand::RngExt;

const ROUNDS: usize = 200;

/// Deal the chain `0 -> 1 -> ... -> n_edges` across `n_threads` threads.
/// Failed attempts target values above the chain so targets stay unique.
fn random_linearizable(n_threads: usize, n_edges: u64) -> Vec<OperationHistory<u64>> {
    let mut rng = rand::rng();
    let thread_range = Uniform::new(0, n_threads).unwrap();
    let mut threads: Vec<OperationHistory<u64>> = vec![Vec::new(); n_threads];
    let mut next_failed_target = n_edges + 1;

    for from in 0..n_edges {
        let thread = thread_range.sample(&mut rng);
        if rng.random::<bool>() {
            threads[thread].push(CasOperation::failed(from + 1, next_failed_target));
            next_failed_target += 1;
        }
        threads[thread].push(CasOperation::succeeded(from, from + 1));
    }
    threads
}

#[test]
fn random_chains_pass_both_checkers() {
    let mut rng = rand::rng();
    let thread_count = Uniform::new(1, 6).unwrap();
    let edge_count = Uniform::new(1, 40).unwrap();

    for _ in 0..ROUNDS {
        let threads =
            random_linearizable(thread_count.sample(&mut rng), edge_count.sample(&mut rng));
        let flat: Vec<_> = threads.iter().flatten().cloned().collect();
        assert_eq!(check_restricted(&threads, &0), Ok(true), "{threads:?}");
        assert!(check_unrestricted(&flat, &0), "{threads:?}");
    }
}

#[test]
fn swapping_a_threads_transitions_fails() {
    let mut rng = rand::rng();
    let edge_count = Uniform::new(2, 40).unwrap();

    for _ in 0..ROUNDS {
        let mut threads = random_linearizable(1, edge_count.sample(&mut rng));
        let thread = &mut threads[0];
        let successful: Vec<usize> = (0..thread.len())
            .filter(|&i| thread[i].succeeded)
            .collect();
        let pick = Uniform::new(0, successful.len() - 1).unwrap().sample(&mut rng);
        thread.swap(successful[pick], successful[pick + 1]);
        assert_eq!(check_restricted(&threads, &0), Ok(false), "{threads:?}");
    }
}
