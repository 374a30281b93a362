//! Agora CLI entry point.

use agora_engine::{Event, EventId, EventLog, Scheduler};
use agora_runtime::{Repl, Scenario, Session};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    scenario: Option<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    turns: Option<u64>,
    seed: u64,
    delay_ms: Option<u64>,
    timeout_ms: Option<u64>,
    events_json: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    *i += 1;
    let Some(raw) = args.get(*i) else {
        return Err(format!("{flag} requires a value").into());
    };
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}").into())
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--events-json" => config.events_json = true,
            "-s" | "--scenario" => {
                config.scenario = Some(parse_value(args, &mut i, "--scenario")?);
            }
            "-n" | "--turns" => config.turns = Some(parse_value(args, &mut i, "--turns")?),
            "--seed" => config.seed = parse_value(args, &mut i, "--seed")?,
            "--delay-ms" => config.delay_ms = Some(parse_value(args, &mut i, "--delay-ms")?),
            "--timeout-ms" => {
                config.timeout_ms = Some(parse_value(args, &mut i, "--timeout-ms")?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.scenario = Some(PathBuf::from(path)),
        }
        i += 1;
    }

    Ok(config)
}

fn init_logging(batch_mode: bool) {
    let default = if batch_mode { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("agora {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(config.batch_mode);

    let mut scenario = match &config.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo()?,
    };
    if let Some(ms) = config.delay_ms {
        scenario.scheduler = scenario
            .scheduler
            .with_turn_delay(Duration::from_millis(ms));
    }
    if let Some(ms) = config.timeout_ms {
        scenario.scheduler = scenario
            .scheduler
            .with_decision_timeout(Duration::from_millis(ms));
    }

    if config.batch_mode {
        let turns = config.turns.unwrap_or(20);
        scenario.scheduler = scenario.scheduler.with_max_turns(Some(turns));
        return run_batch(&scenario, config.seed, config.events_json);
    }

    if config.turns.is_some() {
        scenario.scheduler = scenario.scheduler.with_max_turns(config.turns);
    }
    let simulation = scenario.instantiate(config.seed, true)?;
    let session = Session::start(simulation)?;
    let mut repl = Repl::new(session)?;
    repl.run()?;
    repl.into_session().shutdown()?;
    Ok(())
}

/// Runs the scenario unattended, printing events as they are published.
fn run_batch(
    scenario: &Scenario,
    seed: u64,
    events_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let simulation = scenario.instantiate(seed, false)?;
    if simulation.scheduler.roster().is_empty() {
        return Err("the scenario declares no characters".into());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(follow(simulation.scheduler, events_json))
}

/// Spawns the scheduler and prints events until it stops on its own.
async fn follow(
    scheduler: Scheduler,
    events_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = scheduler.spawn();
    let log = handle.log();
    let mut latest = log.subscribe();
    let mut seen = 0;
    let finished = handle.join();
    tokio::pin!(finished);

    loop {
        tokio::select! {
            result = &mut finished => {
                print_events(&log, &mut seen, events_json)?;
                let scheduler = result?;
                eprintln!(
                    "\x1b[2m{} turns, {} events\x1b[0m",
                    scheduler.turns(),
                    scheduler.log().len()
                );
                return Ok(());
            }
            changed = latest.changed() => {
                if changed.is_ok() {
                    print_events(&log, &mut seen, events_json)?;
                }
            }
        }
    }
}

fn print_events(
    log: &EventLog,
    seen: &mut EventId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<Event> = log.events_since(*seen);
    for event in &events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{event}");
        }
        *seen = event.id;
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mAgora\x1b[0m - Turn-based text world for automated and human characters

\x1b[1mUSAGE:\x1b[0m
    agora [OPTIONS] [SCENARIO]

\x1b[1mARGUMENTS:\x1b[0m
    [SCENARIO]    Scenario file to load (default: the built-in demo)

\x1b[1mOPTIONS:\x1b[0m
    -h, --help            Print help information
    -V, --version         Print version information
    -s, --scenario PATH   Scenario file to load
    -b, --batch           Run without a terminal; the human character plays randomly
    -n, --turns N         Stop after N turns (batch default: 20)
    --seed N              Seed for random characters (default: 0)
    --delay-ms N          Pause between turns, overriding the scenario
    --timeout-ms N        Decision timeout, overriding the scenario
    --events-json         In batch mode, print events as JSON lines

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG              Log filter (default: info in batch mode, warn otherwise)

\x1b[1mEXAMPLES:\x1b[0m
    agora                              Play the demo as its human character
    agora cottage.toml                 Play cottage.toml
    agora -b -n 50 --seed 7            Run the demo for 50 turns
    agora -b --delay-ms 0 --events-json world.toml > events.jsonl

\x1b[1mREPL COMMANDS:\x1b[0m
    get apple, north, ...   Act as your character
    :look [NAME]            Show what you (or NAME) can see and do
    :events [ID]            Show events after ID
    :who                    List characters and where they are
    :reset                  Restore the initial world
    :quit                   Leave (or Ctrl+D)"
    );
}
