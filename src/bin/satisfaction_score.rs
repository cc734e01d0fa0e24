use std::env;
use std::process;

use fuzzy_satisfaction::{EngineConfig, SatisfactionInputs, SatisfactionModel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: satisfaction-score --speed <0-10> --quality <0-10> [--json]";

struct Args {
    speed: f64,
    quality: f64,
    json: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args(env::args().skip(1)).unwrap_or_else(|msg| {
        eprintln!("satisfaction-score: {msg}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    if let Err(err) = run(&args) {
        eprintln!("satisfaction-score: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    let model = SatisfactionModel::from_config(&config)?;
    let evaluation = model.evaluate(SatisfactionInputs {
        service_speed: args.speed,
        food_quality: args.quality,
    })?;

    if args.json {
        let report = serde_json::json!({
            "service_speed": args.speed,
            "food_quality": args.quality,
            "customer_satisfaction": evaluation.output(),
            "defuzzification": config.defuzzification,
            "universe_step": config.universe_step,
            "term_activation": evaluation.term_activation(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:.4}", evaluation.output());
    }
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut speed = None;
    let mut quality = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--speed" => speed = Some(parse_number("--speed", args.next())?),
            "--quality" => quality = Some(parse_number("--quality", args.next())?),
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    Ok(Args {
        speed: speed.ok_or("missing --speed")?,
        quality: quality.ok_or("missing --quality")?,
        json,
    })
}

fn parse_number(flag: &str, value: Option<String>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse::<f64>()
        .map_err(|e| format!("{flag}: cannot parse '{value}': {e}"))
}
