//! TIR-Admin: Trusted Issuers Registry admin CLI
//!
//! Loads the registry from its snapshot file, applies one command as the
//! given caller, writes the snapshot back and prints any notifications the
//! command produced.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use issuer_registry::prelude::*;
use shared_bus::{EventFilter, EventSubscriber, InMemoryEventBus, RegistryEvent};
use shared_types::{format_address, parse_address, Address, ClaimTopic};

type Registry = IssuerRegistryService<OwnableAccess, InMemoryEventBus>;

/// TIR-Admin: Trusted Issuers Registry admin CLI
#[derive(Parser, Debug)]
#[command(name = "tir-admin")]
#[command(about = "Manage trusted claim issuers and their claim topics")]
struct Cli {
    /// Snapshot file (overrides TIR_SNAPSHOT_PATH)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Principal performing mutations
    #[arg(short, long, global = true, value_parser = address_arg)]
    caller: Option<Address>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty registry owned by OWNER
    Init {
        /// Initial owner
        #[arg(long, value_parser = address_arg)]
        owner: Address,

        /// Replace an existing snapshot
        #[arg(long)]
        force: bool,
    },
    /// Register an issuer for one or more claim topics
    Add {
        #[arg(value_parser = address_arg)]
        issuer: Address,
        #[arg(required = true)]
        topics: Vec<ClaimTopic>,
    },
    /// Deregister an issuer
    Remove {
        #[arg(value_parser = address_arg)]
        issuer: Address,
    },
    /// Replace an issuer's claim topics
    Update {
        #[arg(value_parser = address_arg)]
        issuer: Address,
        #[arg(required = true)]
        topics: Vec<ClaimTopic>,
    },
    /// List trusted issuers in registration order
    List,
    /// Show the claim topics of an issuer
    Topics {
        #[arg(value_parser = address_arg)]
        issuer: Address,
    },
    /// Check whether an issuer is trusted, optionally for one topic
    Check {
        #[arg(value_parser = address_arg)]
        issuer: Address,
        #[arg(long)]
        topic: Option<ClaimTopic>,
    },
    /// List issuers trusted for a claim topic
    IssuersForTopic { topic: ClaimTopic },
    /// Hand the owner capability to another principal
    TransferOwnership {
        #[arg(value_parser = address_arg)]
        new_owner: Address,
    },
    /// Show the current owner
    Owner,
}

impl Command {
    fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Remove { .. }
                | Command::Update { .. }
                | Command::TransferOwnership { .. }
        )
    }
}

#[derive(Serialize)]
struct IssuerView {
    issuer: String,
    claim_topics: Vec<ClaimTopic>,
}

fn address_arg(input: &str) -> Result<Address, String> {
    parse_address(input).map_err(|e| e.to_string())
}

fn init_logging(config: &RegistryConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);
    // A second init (tests) keeps the first subscriber
    let _ = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RegistryConfig::from_env().context("loading configuration")?;
    init_logging(&config);

    let stdout = io::stdout();
    run(&cli, &config, &mut stdout.lock())
}

fn run(cli: &Cli, config: &RegistryConfig, out: &mut impl Write) -> Result<()> {
    let path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.snapshot_path.clone());
    let store = JsonFileStore::new(path);
    debug!(store = %store.path().display(), command = ?cli.command, "Running command");

    // Held from load to persist so concurrent invocations apply in turn
    let _lock = store.lock()?;

    if let Command::Init { owner, force } = &cli.command {
        return init(&store, *owner, *force, config, out);
    }

    let registry = Registry::load(&store, InMemoryEventBus::new(), config.limits)?.with_context(
        || {
            format!(
                "no registry at {}; run `tir-admin init --owner <ADDRESS>` first",
                store.path().display()
            )
        },
    )?;

    if cli.command.is_mutation() {
        let Some(caller) = cli.caller else {
            bail!("--caller is required for {:?}", cli.command);
        };
        let mut subscription = registry.publisher().subscribe(EventFilter::all());
        mutate(&registry, &caller, &cli.command)?;
        registry.persist(&store)?;
        info!(store = %store.path().display(), "Snapshot written");
        return print_events(&subscription.drain(), cli.json, out);
    }

    query(&registry, &cli.command, cli.json, out)
}

fn init(
    store: &JsonFileStore,
    owner: Address,
    force: bool,
    config: &RegistryConfig,
    out: &mut impl Write,
) -> Result<()> {
    if !force && store.load()?.is_some() {
        bail!(
            "{} already holds a registry; pass --force to replace it",
            store.path().display()
        );
    }
    let registry = Registry::with_owner(owner, InMemoryEventBus::new(), config.limits)?;
    registry.persist(store)?;
    writeln!(
        out,
        "initialised {} owned by {}",
        store.path().display(),
        format_address(&owner)
    )?;
    Ok(())
}

fn mutate(registry: &Registry, caller: &Address, command: &Command) -> Result<()> {
    match command {
        Command::Add { issuer, topics } => registry.add_trusted_issuer(caller, *issuer, topics)?,
        Command::Remove { issuer } => registry.remove_trusted_issuer(caller, issuer)?,
        Command::Update { issuer, topics } => {
            registry.update_issuer_claim_topics(caller, issuer, topics)?
        }
        Command::TransferOwnership { new_owner } => {
            registry.transfer_ownership(caller, *new_owner)?
        }
        other => bail!("{other:?} is not a mutation"),
    }
    Ok(())
}

fn query(registry: &Registry, command: &Command, json: bool, out: &mut impl Write) -> Result<()> {
    match command {
        Command::List => {
            let views: Vec<IssuerView> = registry
                .snapshot()
                .entries
                .into_iter()
                .map(|entry| IssuerView {
                    issuer: format_address(&entry.issuer),
                    claim_topics: entry.claim_topics.to_vec(),
                })
                .collect();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&views)?)?;
            } else {
                for view in &views {
                    writeln!(out, "{}  {}", view.issuer, join_topics(&view.claim_topics))?;
                }
            }
        }
        Command::Topics { issuer } => {
            let topics = registry.get_trusted_issuer_claim_topics(issuer)?;
            if json {
                writeln!(out, "{}", serde_json::to_string(&topics)?)?;
            } else {
                writeln!(out, "{}", join_topics(&topics))?;
            }
        }
        Command::Check { issuer, topic } => {
            let trusted = match topic {
                Some(topic) => registry.has_claim_topic(issuer, *topic),
                None => registry.is_trusted_issuer(issuer),
            };
            writeln!(out, "{trusted}")?;
        }
        Command::IssuersForTopic { topic } => {
            let issuers: Vec<String> = registry
                .get_trusted_issuers_for_claim_topic(*topic)
                .iter()
                .map(format_address)
                .collect();
            if json {
                writeln!(out, "{}", serde_json::to_string(&issuers)?)?;
            } else {
                for issuer in issuers {
                    writeln!(out, "{issuer}")?;
                }
            }
        }
        Command::Owner => writeln!(out, "{}", format_address(&registry.owner()))?,
        other => bail!("{other:?} is not a query"),
    }
    Ok(())
}

fn print_events(events: &[RegistryEvent], json: bool, out: &mut impl Write) -> Result<()> {
    for event in events {
        if json {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        } else {
            writeln!(out, "{}", describe(event))?;
        }
    }
    Ok(())
}

fn describe(event: &RegistryEvent) -> String {
    match event {
        RegistryEvent::TrustedIssuerAdded {
            issuer,
            claim_topics,
        } => format!(
            "TrustedIssuerAdded {} [{}]",
            format_address(issuer),
            join_topics(claim_topics)
        ),
        RegistryEvent::TrustedIssuerRemoved { issuer } => {
            format!("TrustedIssuerRemoved {}", format_address(issuer))
        }
        RegistryEvent::ClaimTopicsUpdated {
            issuer,
            claim_topics,
        } => format!(
            "ClaimTopicsUpdated {} [{}]",
            format_address(issuer),
            join_topics(claim_topics)
        ),
        RegistryEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        } => format!(
            "OwnershipTransferred {} -> {}",
            format_address(previous_owner),
            format_address(new_owner)
        ),
    }
}

fn join_topics(topics: &[ClaimTopic]) -> String {
    topics
        .iter()
        .map(ClaimTopic::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";
    const ISSUER: &str = "0x00000000000000000000000000000000000000b1";
    const STRANGER: &str = "0x00000000000000000000000000000000000000cc";

    struct Workspace {
        _dir: tempfile::TempDir,
        store: PathBuf,
        config: RegistryConfig,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = dir.path().join("registry.json");
            Self {
                _dir: dir,
                store,
                config: RegistryConfig::default(),
            }
        }

        fn exec(&self, args: &[&str]) -> Result<String> {
            let store = self.store.to_string_lossy().into_owned();
            let mut argv = vec!["tir-admin", "--store", store.as_str()];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv)?;
            let mut out = Vec::new();
            run(&cli, &self.config, &mut out)?;
            Ok(String::from_utf8(out)?)
        }
    }

    fn initialised() -> Workspace {
        let ws = Workspace::new();
        ws.exec(&["init", "--owner", OWNER]).unwrap();
        ws
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let ws = initialised();
        assert!(ws.exec(&["init", "--owner", STRANGER]).is_err());
        ws.exec(&["init", "--owner", STRANGER, "--force"]).unwrap();
        assert_eq!(ws.exec(&["owner"]).unwrap().trim(), STRANGER);
    }

    #[test]
    fn test_add_prints_event_and_persists() {
        let ws = initialised();
        let output = ws.exec(&["--caller", OWNER, "add", ISSUER, "1", "2"]).unwrap();
        assert_eq!(output.trim(), format!("TrustedIssuerAdded {ISSUER} [1,2]"));

        assert_eq!(ws.exec(&["check", ISSUER]).unwrap().trim(), "true");
        assert_eq!(ws.exec(&["check", ISSUER, "--topic", "2"]).unwrap().trim(), "true");
        assert_eq!(ws.exec(&["check", ISSUER, "--topic", "3"]).unwrap().trim(), "false");
        assert_eq!(ws.exec(&["topics", ISSUER]).unwrap().trim(), "1,2");
        assert_eq!(ws.exec(&["issuers-for-topic", "1"]).unwrap().trim(), ISSUER);
    }

    #[test]
    fn test_mutation_requires_caller() {
        let ws = initialised();
        assert!(ws.exec(&["add", ISSUER, "1"]).is_err());
    }

    #[test]
    fn test_non_owner_rejected() {
        let ws = initialised();
        let err = ws
            .exec(&["--caller", STRANGER, "add", ISSUER, "1"])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Unauthorized { .. })
        ));
        assert_eq!(ws.exec(&["check", ISSUER]).unwrap().trim(), "false");
    }

    #[test]
    fn test_json_list() {
        let ws = initialised();
        ws.exec(&["--caller", OWNER, "add", ISSUER, "7"]).unwrap();
        let output = ws.exec(&["--json", "list"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["issuer"], ISSUER);
        assert_eq!(parsed[0]["claim_topics"], serde_json::json!([7]));
    }

    #[test]
    fn test_transfer_ownership() {
        let ws = initialised();
        ws.exec(&["--caller", OWNER, "transfer-ownership", STRANGER])
            .unwrap();
        assert_eq!(ws.exec(&["owner"]).unwrap().trim(), STRANGER);
        assert!(ws.exec(&["--caller", OWNER, "remove", ISSUER]).is_err());
    }

    #[test]
    fn test_parallel_adds_are_all_persisted() {
        let ws = initialised();
        let issuers: Vec<String> = (1..=20u8)
            .map(|n| format!("0x{}{n:02x}", "11".repeat(19)))
            .collect();

        let printed: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = issuers
                .iter()
                .map(|issuer| {
                    let ws = &ws;
                    scope.spawn(move || {
                        ws.exec(&["--caller", OWNER, "add", issuer.as_str(), "1"])
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(printed.len(), 20);
        let output = ws.exec(&["--json", "list"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let mut persisted: Vec<String> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|view| view["issuer"].as_str().unwrap().to_string())
            .collect();
        persisted.sort();
        let mut expected = issuers.clone();
        expected.sort();
        assert_eq!(persisted, expected);
    }

    #[test]
    fn test_missing_store_is_reported() {
        let ws = Workspace::new();
        let err = ws.exec(&["list"]).unwrap_err();
        assert!(err.to_string().contains("tir-admin init"));
    }

    #[test]
    fn test_bad_address_rejected_by_parser() {
        assert!(Cli::try_parse_from(["tir-admin", "remove", "0x1234"]).is_err());
    }
}
