use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use scopetrace::{begin_session, end_session, profile_scope, DEFAULT_TRACE_FILE};

#[derive(Parser, Debug)]
struct Opt {
    /// where to write the trace
    #[arg(long, default_value = DEFAULT_TRACE_FILE)]
    output: PathBuf,
    /// label of the profiling session
    #[arg(long, default_value = "demo")]
    session: String,
    /// number of worker threads
    #[arg(long, default_value_t = 4)]
    threads: usize,
    /// jobs run by every worker
    #[arg(long, default_value_t = 10)]
    iterations: usize,
    /// time spent in each leaf region (in microseconds)
    #[arg(long = "sleep-us", default_value_t = 100)]
    sleep_us: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::parse();

    begin_session!(&opt.session, &opt.output)?;

    {
        profile_scope!("main");
        let leaf = Duration::from_micros(opt.sleep_us);
        let iterations = opt.iterations;

        thread::scope(|s| {
            for worker in 0..opt.threads {
                s.spawn(move || run_worker(worker, iterations, leaf));
            }
        });
    }

    end_session!();

    println!(
        "wrote {} regions from {} threads to {}",
        opt.threads * (opt.iterations * 3 + 1) + 1,
        opt.threads,
        opt.output.display()
    );

    Ok(())
}

fn run_worker(worker: usize, iterations: usize, leaf: Duration) {
    profile_scope!(format!("worker-{}", worker));

    for _ in 0..iterations {
        job(leaf);
    }
}

fn job(leaf: Duration) {
    profile_scope!("job");
    load(leaf);
    store(leaf);
}

fn load(leaf: Duration) {
    profile_scope!("load");
    thread::sleep(leaf);
}

fn store(leaf: Duration) {
    profile_scope!("store");
    thread::sleep(leaf);
}
