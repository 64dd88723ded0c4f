//! Sweep entry point — CLI wiring, config loading, and case execution.

use std::process;

use tracing_subscriber::EnvFilter;

use hpp_opt::cases::{create_cases, run_cases};
use hpp_opt::cli;
use hpp_opt::config::StudyConfig;
use hpp_opt::reporting::SweepReport;
use hpp_opt::scenario::ScenarioContext;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut config = if let Some(ref path) = opts.scenario {
        match StudyConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = opts.preset {
        match StudyConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        StudyConfig::baseline()
    };

    if let Some(seed) = opts.seed_override {
        config.simulation.seed = seed;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let scenario = match ScenarioContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let cases = create_cases(&config.sweep);
    let results = match run_cases(&cases, &scenario, &config, &opts.out_dir) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    println!("{}", SweepReport::from_results(&results));
    eprintln!("Case results written to {}", opts.out_dir.display());
}
