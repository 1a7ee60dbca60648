//! `iwv` command-line entry point

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use iwv_harness::{HarnessConfig, LogFormat, Runner, TestProfile};
use iwv_scenario::{ScenarioGenerator, ScenarioType};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let mut cli = Command::new("iwv")
        .version(iwv_harness::VERSION)
        .about("Intelligence workflow validation and batch-testing harness")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .global(true)
                .help("Generation endpoint URL"),
        )
        .arg(
            Arg::new("report-dir")
                .long("report-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for failure reports"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Random seed for reproducible scenarios"),
        )
        .arg(
            Arg::new("local")
                .long("local")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Validate inputs only, never call the endpoint"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        );

    for profile in TestProfile::ALL {
        cli = cli.subcommand(Command::new(profile.as_str()).about(profile.about()));
    }

    cli.subcommand(
        Command::new("scenario")
            .about("Run a named scenario family")
            .arg(
                Arg::new("name")
                    .required(true)
                    .value_parser(ScenarioType::names())
                    .help("Scenario family"),
            )
            .arg(
                Arg::new("parallel")
                    .long("parallel")
                    .action(ArgAction::SetTrue)
                    .help("Run in parallel waves"),
            ),
    )
    .subcommand(Command::new("health").about("Run connectivity and sanity checks"))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<HarnessConfig> {
    let mut config = HarnessConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("loading configuration")?;

    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("report-dir") {
        config.report_dir.clone_from(dir);
    }
    if matches.get_flag("verbose") {
        config.log_level = "debug".to_owned();
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn init_tracing(config: &HarnessConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(matches: ArgMatches) -> anyhow::Result<bool> {
    let config = load_config(&matches)?;
    init_tracing(&config);

    let generator = match matches.get_one::<u64>("seed") {
        Some(seed) => ScenarioGenerator::with_seed(*seed),
        None => ScenarioGenerator::new(),
    };
    let mut runner = Runner::from_config(config)
        .context("initializing runner")?
        .with_generator(generator)
        .with_local(matches.get_flag("local"));

    match matches.subcommand() {
        Some(("health", _)) => {
            let report = runner.health_check().await;
            println!("{}", report.render_text());
            Ok(report.passed())
        }
        Some(("scenario", args)) => {
            let name = args
                .get_one::<String>("name")
                .context("missing scenario name")?;
            let scenario: ScenarioType = name.parse()?;
            let report = runner
                .run_scenario(scenario, args.get_flag("parallel"))
                .await;
            println!("{}", report.render_text());
            Ok(report.passed())
        }
        Some((name, _)) => {
            let profile: TestProfile = name.parse().map_err(anyhow::Error::msg)?;
            let report = runner.run_profile(profile).await;
            println!("{}", report.render_text());
            Ok(report.passed())
        }
        None => anyhow::bail!("no subcommand given"),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let code = match run(matches).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}
