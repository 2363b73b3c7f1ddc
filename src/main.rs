// Reference run from the command line
//
// Usage:
//   cargo run --bin cnt-sim
//   cargo run --bin cnt-sim -- 15 200
//   cargo run --bin cnt-sim -- 15 200 --seed 0x1234...

use std::env;

use log::info;
use simple_logger::SimpleLogger;

use cnt_sim::{SimConfig, SimEngine};

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args[1..]) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: {} [node_count] [step_count] [--seed SEED_HEX]", args[0]);
            std::process::exit(1);
        }
    };

    info!("starting");

    let mut engine = match SimEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    while !engine.is_finished() {
        let step = engine.steps_run() + 1;
        if let Some(outcome) = engine.step() {
            info!("Step {}: {}", step, outcome);
            info!("{}", engine.snapshot().status_line());
        }
    }

    let result = engine.run();

    info!("Node | Role      | Trust | Energy | Sent | Received | Dropped");
    for row in &result.final_snapshot.nodes {
        info!(
            "{:<4} | {:<9} | {:.2}  | {:>5.1}% | {:>4} | {:>8} | {:>7}",
            row.node,
            row.role,
            row.trust,
            row.energy,
            row.packets_sent,
            row.packets_received,
            row.packets_dropped
        );
    }

    let totals = result.final_snapshot.totals;
    info!(
        "Packets: sent {} received {} dropped {}",
        totals.sent, totals.received, totals.dropped
    );
    info!("{}", result.final_snapshot.status_line());
    info!(
        "Detection: precision {:.2} recall {:.2} ({} outcomes, {} skipped)",
        result.detection.precision, result.detection.recall, result.outcomes, result.skipped
    );
    info!("let seed = {:?};", result.seed_used);
}

fn parse_args(args: &[String]) -> Result<SimConfig, String> {
    let mut config = SimConfig::default();
    let mut positional = 0;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--seed" {
            let hex = iter.next().ok_or("--seed needs a value")?;
            config.seed = Some(parse_seed_hex(hex)?);
            continue;
        }

        let value: usize = arg
            .parse()
            .map_err(|e| format!("invalid number '{}': {}", arg, e))?;
        match positional {
            0 => config.node_count = value,
            1 => config.step_count = value,
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
        positional += 1;
    }

    Ok(config)
}

fn parse_seed_hex(hex: &str) -> Result<[u8; 32], String> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte_str = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
        seed[i] = u8::from_str_radix(byte_str, 16)
            .map_err(|e| format!("Invalid hex seed: {}", e))?;
    }

    Ok(seed)
}
