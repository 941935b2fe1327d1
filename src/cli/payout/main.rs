use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod credential;

use commands::PayoutCommands;
use config::Config;
use credential::CredentialSource;

/// Exit code when the run finished but at least one validator failed
const EXIT_VALIDATOR_FAILURES: i32 = 2;

fn chain_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("node")
                .short('n')
                .long("node")
                .value_name("URL")
                .help("Node websocket URL"),
        )
        .arg(
            Arg::new("validator")
                .short('v')
                .long("validator")
                .value_name("ADDRESS")
                .help("Validator stash address, replaces the configured list (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("lookback")
                .short('l')
                .long("lookback")
                .value_name("ERAS")
                .help("Number of past eras to inspect")
                .value_parser(value_parser!(u32)),
        )
}

fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(node) = matches.get_one::<String>("node") {
        config.node_url = node.clone();
    }
    if let Some(validators) = matches.get_many::<String>("validator") {
        config.validators = validators.cloned().collect();
    }
    if let Some(lookback) = matches.get_one::<u32>("lookback") {
        config.lookback_eras = *lookback;
    }
    if let Some(account) = matches.try_get_one::<String>("account").ok().flatten() {
        config.account_json = PathBuf::from(account);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("PeoChain Auto Payout")
        .version("1.0")
        .author("PeoChain Team")
        .about("Claims unclaimed staking rewards for a set of validators")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to the configuration file")
                .global(true),
        )
        .subcommand(
            chain_args(Command::new("payout").about("Claim unclaimed rewards"))
                .arg(
                    Arg::new("account")
                        .short('a')
                        .long("account")
                        .value_name("FILE")
                        .help("Polkadot-JS account JSON of the signing account"),
                )
                .arg(
                    Arg::new("suri")
                        .long("suri")
                        .value_name("SECRET_URI")
                        .help("Secret URI of the signing account, e.g. //Alice")
                        .conflicts_with("account"),
                ),
        )
        .subcommand(
            chain_args(Command::new("plan"))
                .about("Show unclaimed eras per validator without submitting"),
        )
        .subcommand(
            Command::new("init-config")
                .about("Write a default configuration file")
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Overwrite an existing file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    // Process subcommands
    match matches.subcommand() {
        Some(("payout", sub_matches)) => {
            println!("\nPeoChain Auto Payout\n");
            let mut config = Config::load(config_path.as_deref())?;
            apply_overrides(&mut config, sub_matches);

            let source = match sub_matches.get_one::<String>("suri") {
                Some(suri) => CredentialSource::Suri(suri.clone()),
                None => CredentialSource::AccountJson(config.account_json.clone()),
            };

            let summary = PayoutCommands::payout(&config, &source).await?;
            if summary.has_failures() {
                std::process::exit(EXIT_VALIDATOR_FAILURES);
            }
        }
        Some(("plan", sub_matches)) => {
            let mut config = Config::load(config_path.as_deref())?;
            apply_overrides(&mut config, sub_matches);
            PayoutCommands::plan(&config).await?;
        }
        Some(("init-config", sub_matches)) => {
            let path = config_path.unwrap_or_else(Config::default_path);
            PayoutCommands::init_config(&path, sub_matches.get_flag("force"))?;
        }
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
        }
    }

    Ok(())
}
