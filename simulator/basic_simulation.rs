//! Basic trust simulation example
//!
//! Run with: cargo run --example basic_simulation

use log::info;
use simple_logger::SimpleLogger;

mod trust_sim;
use cnt_sim::{SimConfig, SimEngine, SkipPolicy};
use trust_sim::{print_summary, render_report};

fn main() {
    SimpleLogger::new().init().unwrap();

    info!("Setting up simulation...");

    let config = SimConfig {
        node_count: 12,
        edge_probability: 0.4,
        step_count: 120,
        suspicion_threshold: 0.4,
        skip_policy: SkipPolicy::CountsTowardBudget,
        seed: None, // Will be auto-generated
        seed_phrase: None,
    };

    info!("Starting simulation...");

    let mut engine = match SimEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let result = engine.run();

    print_summary(&result);

    for page in render_report(&result.final_snapshot, 40) {
        for line in page.lines {
            info!("{}", line);
        }
    }
}
