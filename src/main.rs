mod report;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use formation_calc::sweep::{angle_sweep, aspect_ratio_sweep, AnalysisConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: formation [--config FILE.yaml] [--output DIR]";

struct Args {
    config: Option<PathBuf>,
    output: PathBuf,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = Args {
        config: None,
        output: PathBuf::from("output"),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => args.config = Some(iter.next().ok_or(USAGE)?.into()),
            "--output" | "-o" => args.output = iter.next().ok_or(USAGE)?.into(),
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE).into()),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let config: AnalysisConfig = serde_yaml::from_str(&contents)?;
            info!(path = %path.display(), "loaded analysis config");
            config
        }
        None => AnalysisConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;

    // Angle-of-attack sweep with the interference model
    let sweep = angle_sweep(&config.angle_sweep, &config.lifting_line, &config.relaxation)?;
    let mut angles = report::angle_sweep_frame(&sweep)?;
    println!("{}", angles);
    println!("{}", report::mean_gain_by_aircraft(&angles)?);
    report::print_summary(&sweep.summary_at(5.0)?);

    // Aspect-ratio sweep with the sequential formation model
    let rows = aspect_ratio_sweep(&config.aspect_ratio_sweep, &config.formation)?;
    let mut ratios = report::ratio_frame(&rows)?;
    println!("{}", report::mean_ratio_by_kind(&ratios)?);

    report::write_csv(&mut angles, &args.output, "angle_sweep.csv")?;
    report::write_csv(&mut ratios, &args.output, "aspect_ratio_sweep.csv")?;

    Ok(())
}
