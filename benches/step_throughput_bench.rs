use std::time::Instant;

use cnt_sim::{SimConfig, SimEngine};

/// Benchmark step throughput of the trust engine across network sizes
fn main() {
    std::env::set_var("RUST_LOG", "error");
    let _ = simple_logger::init_with_level(log::Level::Error);

    println!("\n=== Trust Engine Step Throughput ===\n");

    let configs = vec![
        ("Reference (10 nodes)", 10, 100_000),
        ("UI max (20 nodes)", 20, 100_000),
        ("Medium (256 nodes)", 256, 100_000),
        ("Large (2048 nodes)", 2048, 100_000),
    ];

    println!("{:<30} {:>12} {:>15} {:>12}", "Configuration", "Time (ms)", "Steps/s", "Flagged");
    println!("{}", "-".repeat(72));

    for (name, node_count, step_count) in configs {
        let config = SimConfig {
            node_count,
            step_count,
            seed: Some([7u8; 32]),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = match SimEngine::new(config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("{}: {}", name, e);
                continue;
            }
        };
        let result = engine.run();
        let elapsed = start.elapsed().as_secs_f64();

        println!(
            "{:<30} {:>12.1} {:>15.0} {:>12}",
            name,
            elapsed * 1000.0,
            step_count as f64 / elapsed,
            result.final_snapshot.suspicious.len()
        );
    }
}
