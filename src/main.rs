// Benchmark harness for the elimination-backoff stack: every worker pushes a
// disjoint range of integers and pops the same number of values, the run is
// timed and the result appended to a CSV file.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use elimstack::EliminationBackoffStack;

const OPS_PER_THREAD: usize = 1_000;
const CSV_PATH: &str = "elim-bench.csv";

fn main() {
    let threads = thread_count();
    println!("benchmark: elimination-backoff stack, {} threads x {} ops", threads, OPS_PER_THREAD);

    let stack = Arc::new(EliminationBackoffStack::new());
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|id| {
            let stack = Arc::clone(&stack);
            thread::spawn(move || {
                let base = id * OPS_PER_THREAD;
                for value in base..base + OPS_PER_THREAD {
                    stack.push(value);
                }

                let mut popped = Vec::with_capacity(OPS_PER_THREAD);
                for _ in 0..OPS_PER_THREAD {
                    loop {
                        match stack.pop() {
                            Ok(value) => {
                                popped.push(value);
                                break;
                            }
                            Err(_) => thread::yield_now(),
                        }
                    }
                }
                popped
            })
        })
        .collect();

    let mut all = Vec::with_capacity(threads * OPS_PER_THREAD);
    for (id, handle) in handles.into_iter().enumerate() {
        let popped = handle.join().unwrap();
        println!("thread {:2} popped {:5} values", id, popped.len());
        all.extend(popped);
    }

    let millis = start.elapsed().as_secs_f64() * 1_000.0;

    all.sort_unstable();
    let total = all.len();
    all.dedup();
    assert_eq!(total, all.len(), "a value was popped twice");
    assert_eq!(total, threads * OPS_PER_THREAD, "a pushed value was lost");
    assert!(all.iter().all(|&value| value < threads * OPS_PER_THREAD));

    println!("all values accounted for, took {:.3} ms", millis);

    if let Err(err) = append_csv(threads, millis) {
        eprintln!("failed to write {}: {}", CSV_PATH, err);
    }
}

/// Reads the worker count from the first CLI argument or, failing that, from
/// an interactive prompt (default 10).
fn thread_count() -> usize {
    if let Some(arg) = env::args().nth(1) {
        return arg.parse().expect("invalid thread count argument");
    }

    print!("enter number of threads (default 10): ");
    io::stdout().flush().unwrap();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).unwrap();
    line.trim().parse().unwrap_or(10)
}

/// Appends a `threads,millis` row to the results file, writing the header
/// first if the file is new.
fn append_csv(threads: usize, millis: f64) -> io::Result<()> {
    let is_new = !Path::new(CSV_PATH).exists();
    let mut file = OpenOptions::new().create(true).append(true).open(CSV_PATH)?;
    if is_new {
        writeln!(file, "threads,millis")?;
    }
    writeln!(file, "{},{:.3}", threads, millis)
}
