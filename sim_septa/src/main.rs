//! Driver binary: picks the policy from the command line, builds the tree,
//! places the phones, and feeds the shell from an event script or stdin.
//!
//! ```text
//! sim_septa <policy> [--config <file>] [--events <file>]
//! sim_septa 2 --config data/demo.yml --events data/demo_events.txt
//! ```
//!
//! The policy index is 0 basic pointer, 1 basic value, 2 replication,
//! 3 forwarding pointer. On a graceful quit the aggregate report lands in
//! the working directory and the exit code is 0; a malformed argument or a
//! geometry failure exits non-zero.

use log::error;
use septa::phone::PhoneDirectory;
use septa::{Policy, RaTreeBuilder, SeptaResult};
use sim_septa::config::SimConfig;
use sim_septa::shell::Shell;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

fn usage(program: &str) {
    eprintln!("usage: {} <policy> [--config <file>] [--events <file>]", program);
    eprintln!("  policy: 0 basic pointer, 1 basic value, 2 replication, 3 forwarding pointer");
}

fn main() {
    pretty_env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "sim_septa".to_string());

    let mut policy_index: Option<usize> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut events_path: Option<PathBuf> = None;
    let mut malformed = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => malformed = true,
            },
            "--events" => match args.next() {
                Some(path) => events_path = Some(PathBuf::from(path)),
                None => malformed = true,
            },
            _ => match (policy_index, arg.parse::<usize>()) {
                (None, Ok(index)) => policy_index = Some(index),
                _ => malformed = true,
            },
        }
        if malformed {
            break;
        }
    }

    let policy = match policy_index.and_then(Policy::from_index) {
        Some(policy) if !malformed => policy,
        _ => {
            usage(&program);
            process::exit(2);
        }
    };

    if let Err(e) = run(policy, config_path, events_path) {
        error!("{}", e);
        eprintln!("{}: {}", program, e);
        process::exit(1);
    }
}

fn run(
    policy: Policy,
    config_path: Option<PathBuf>,
    events_path: Option<PathBuf>,
) -> SeptaResult<()> {
    let mut builder = match &config_path {
        Some(path) => RaTreeBuilder::from_yaml(path),
        None => RaTreeBuilder::new(),
    };
    builder.set_policy(policy);
    let mut tree = builder.build()?;

    let config = match &config_path {
        Some(path) => SimConfig::from_yaml(path),
        None => SimConfig::default(),
    };
    let mut phones = PhoneDirectory::new();
    config.populate(&mut tree, &mut phones)?;
    let move_step = config.resolve_move_step(&tree);

    let mut shell = Shell::new(tree, phones, move_step);
    let report_dir = Path::new(".");
    let report = match events_path {
        Some(path) => {
            let file = File::open(&path)?;
            shell.run(BufReader::new(file), report_dir)?
        }
        None => {
            let stdin = io::stdin();
            let locked = stdin.lock();
            shell.run(locked, report_dir)?
        }
    };
    println!("{}", report.display());
    Ok(())
}
