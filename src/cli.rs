use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub out_dir: PathBuf,
    pub seed_override: Option<u64>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut out_dir = None;
    let mut seed_override = None;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.get(i).ok_or_else(|| {
                    "missing value for --scenario (expected a TOML file path)".to_string()
                })?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.get(i).ok_or_else(|| {
                    "missing value for --preset (expected a preset name)".to_string()
                })?;
                if preset.replace(name.clone()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--out-dir" => {
                i += 1;
                let path = args.get(i).ok_or_else(|| {
                    "missing value for --out-dir (expected a directory path)".to_string()
                })?;
                if out_dir.replace(PathBuf::from(path)).is_some() {
                    return Err("--out-dir provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "missing value for --seed (expected a u64)".to_string())?;
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{value}\" is not a valid u64"))?;
                if seed_override.replace(parsed).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some("baseline".to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        out_dir: out_dir.unwrap_or_else(|| PathBuf::from("results")),
        seed_override,
    })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run --release -- [--scenario <path> | --preset <name>] [--out-dir <path>] [--seed <u64>]"
    );
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(vec!["--scenario".to_string(), "study.toml".to_string()])
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("study.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn supports_preset_cli() {
        let opts = parse_args_from(vec!["--preset".to_string(), "baseline".to_string()])
            .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("baseline"));
        assert!(opts.scenario.is_none());
    }

    #[test]
    fn defaults_to_baseline_preset_and_results_dir() {
        let opts = parse_args_from(vec![]).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("baseline"));
        assert_eq!(opts.out_dir.to_str(), Some("results"));
    }

    #[test]
    fn scenario_and_preset_are_mutually_exclusive() {
        let err = parse_args_from(vec![
            "--scenario".to_string(),
            "a.toml".to_string(),
            "--preset".to_string(),
            "baseline".to_string(),
        ])
        .expect_err("must fail");
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn seed_override_parses() {
        let opts = parse_args_from(vec!["--seed".to_string(), "7".to_string()])
            .expect("parse should succeed");
        assert_eq!(opts.seed_override, Some(7));
    }

    #[test]
    fn bad_seed_is_rejected() {
        let err = parse_args_from(vec!["--seed".to_string(), "x".to_string()])
            .expect_err("must fail");
        assert!(err.contains("not a valid u64"));
    }
}
