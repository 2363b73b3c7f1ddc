// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/reference.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/reference.yaml --seed 0x1234...

mod trust_sim;

use std::env;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use cnt_sim::{SimConfig, SimEngine};
use log::{error, info};
use simple_logger::SimpleLogger;
use trust_sim::{print_summary, render_report, ConsoleEventSink, CsvEventSink, MultiEventSink};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Engine configuration (missing fields take defaults)
    #[serde(default)]
    config: SimConfig,

    /// Presentation settings
    #[serde(default)]
    display: DisplayConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
struct DisplayConfig {
    /// Pause between steps so a human can follow along
    step_delay_ms: u64,
    /// Print every event as it happens
    log_steps: bool,
    /// Node rows per report page
    rows_per_page: usize,
    /// Write the report here instead of stdout
    report_path: Option<String>,
    /// Export all events as CSV
    csv_path: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 0,
            log_steps: true,
            rows_per_page: 40,
            report_path: None,
            csv_path: None,
        }
    }
}

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/reference.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/reference.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    let outcome = if path.is_file() {
        run_scenario_file(path, seed)
    } else if path.is_dir() {
        run_scenario_directory(path, seed)
    } else {
        Err(format!("Path does not exist: {}", path.display()))
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) -> Result<(), String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;

    let mut scenarios: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    scenarios.sort();

    if scenarios.is_empty() {
        return Err(format!("No .yaml files found in {}", dir.display()));
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                  ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed)?;
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    Ok(())
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) -> Result<(), String> {
    println!("Loading scenario from: {}", path.display());

    let yaml_content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let mut scenario: ScenarioFile = serde_yaml::from_str(&yaml_content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    println!("\n╔════════════════════════════════════════════════════════╗");
    match scenario.meta.name {
        Some(ref name) => println!("║  {}", name),
        None => println!("║  Scenario: {}", path.display()),
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    if seed.is_some() {
        scenario.config.seed = seed;
    }

    println!("Configuration:");
    println!("  Nodes: {}", scenario.config.node_count);
    println!("  Edge probability: {}", scenario.config.edge_probability);
    println!("  Steps: {}", scenario.config.step_count);
    println!("  Threshold: {}", scenario.config.suspicion_threshold);
    println!("  Skip policy: {:?}", scenario.config.skip_policy);
    println!("\nStarting simulation...\n");

    let display = &scenario.display;

    let mut sinks = MultiEventSink::new();
    sinks.add_sink(Box::new(ConsoleEventSink::new(display.log_steps)));
    if let Some(ref csv_path) = display.csv_path {
        let csv = CsvEventSink::new(csv_path).map_err(|e| format!("{}: {}", csv_path, e))?;
        sinks.add_sink(Box::new(csv));
    }

    let mut engine =
        SimEngine::with_sink(scenario.config.clone(), Box::new(sinks)).map_err(|e| e.to_string())?;

    while !engine.is_finished() {
        let step = engine.steps_run() + 1;
        if let Some(outcome) = engine.step() {
            if display.log_steps {
                println!("Step {}: {}", step, outcome);
                println!("      {}", engine.snapshot().status_line());
            }
            if display.step_delay_ms > 0 {
                thread::sleep(Duration::from_millis(display.step_delay_ms));
            }
        }
    }

    let result = engine.run();
    // release the CSV sink so its buffer is flushed
    engine.set_sink(Box::new(cnt_sim::NoOpSink));

    print_summary(&result);

    let pages = render_report(&result.final_snapshot, display.rows_per_page);
    match display.report_path {
        Some(ref report_path) => {
            let text = pages
                .iter()
                .map(|page| page.lines.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\x0c\n");
            if let Err(e) = fs::write(report_path, text) {
                error!("Failed to write report {}: {}", report_path, e);
            } else {
                info!("Report written to {} ({} pages)", report_path, pages.len());
            }
        }
        None => {
            for page in &pages {
                println!("\n--- Page {} ---", page.number);
                for line in &page.lines {
                    println!("{}", line);
                }
            }
        }
    }

    println!("\n✓ Scenario complete!\n");
    Ok(())
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        seed[i] = byte.unwrap_or_else(|| {
            eprintln!("Invalid hex seed: {}", hex);
            std::process::exit(1);
        });
    }

    seed
}
