#![feature(test)]

extern crate test;

use std::time::Duration;

use test::Bencher;

use elimstack::{Config, ConfigBuilder, EliminationBackoffStack, EmptyPolicy, SeqStack};

#[bench]
fn push_pop_uncontended(b: &mut Bencher) {
    let stack = EliminationBackoffStack::new();

    b.iter(|| {
        stack.push(1);
        stack.pop().unwrap()
    })
}

#[bench]
fn push_pop_no_elimination(b: &mut Bencher) {
    let stack = EliminationBackoffStack::with_config(ConfigBuilder::new().capacity(0).build());

    b.iter(|| {
        stack.push(1);
        stack.pop().unwrap()
    })
}

#[bench]
fn push_pop_tiny_array(b: &mut Bencher) {
    let config = Config::with_params(1, Duration::from_millis(1), EmptyPolicy::FailFast);
    let stack = EliminationBackoffStack::with_config(config);

    b.iter(|| {
        stack.push(1);
        stack.pop().unwrap()
    })
}

#[bench]
fn push_pop_seq_baseline(b: &mut Bencher) {
    let mut stack = SeqStack::new();

    b.iter(|| {
        stack.push(1);
        stack.pop().unwrap()
    })
}
