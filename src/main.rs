//! Demo entry point: run one work day and print the harvested results.
//!
//! ```text
//! workday [num_workers] [unit_size] [p_fail]
//! ```
//!
//! Defaults: 5 workers, 10 points each, 0.1 failure probability. An
//! interrupt (Ctrl-C/SIGTERM) is treated as a request for best-effort
//! cleanup: remaining workers are stopped before exiting.

use std::sync::Arc;

use workvisor::{wait_for_shutdown_signal, Config, LogWriter, Subscribe, Supervisor};

fn parse_args() -> Result<(usize, u32, f64), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let num_workers = match args.next() {
        Some(s) => s.parse()?,
        None => 5,
    };
    let unit_size = match args.next() {
        Some(s) => s.parse()?,
        None => 10,
    };
    let p_fail = match args.next() {
        Some(s) => s.parse()?,
        None => 0.1,
    };
    Ok((num_workers, unit_size, p_fail))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (num_workers, unit_size, p_fail) = parse_args()?;

    let cfg = Config {
        fail_probability: p_fail,
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let mut sup = Supervisor::new(cfg, subs)?;

    sup.create_workers(num_workers)?;
    sup.start_work_day(unit_size).await?;

    let interrupted = tokio::select! {
        results = sup.run_to_completion() => {
            let mut ids: Vec<_> = results.keys().copied().collect();
            ids.sort_unstable();
            for id in ids {
                println!("{id}: {:?}", results[&id]);
            }
            false
        }
        _ = wait_for_shutdown_signal() => true,
    };

    sup.stop_work_day();
    if interrupted {
        eprintln!("interrupted; stopped {num_workers} worker(s) early");
    }
    Ok(())
}
