//! SortKV CLI Client
//!
//! Command-line interface for interacting with SortKV.

use clap::{Parser, Subcommand};
use sortkv::network::Client;
use sortkv::protocol::IterateArgs;
use sortkv::{KvError, OpRecord, Result};

/// SortKV CLI
#[derive(Parser, Debug)]
#[command(name = "sortkv-cli")]
#[command(about = "CLI for the SortKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Get several keys (missing keys are skipped)
    Mget {
        keys: Vec<String>,
    },

    /// Scan a key range
    Iter {
        /// Start key (open if omitted)
        #[arg(long)]
        start: Option<String>,

        /// End key (open if omitted)
        #[arg(long)]
        end: Option<String>,

        /// Skip the start key itself
        #[arg(long)]
        exclude_start: bool,

        /// Include the end key itself
        #[arg(long)]
        include_end: bool,

        /// Scan in descending order
        #[arg(short, long)]
        reverse: bool,

        /// Maximum number of items (capped at 1000)
        #[arg(short = 'n', long)]
        max: Option<u64>,

        /// Print keys only
        #[arg(long)]
        keys_only: bool,
    },

    /// Apply operations atomically, e.g. `put:k1=v1 delete:k2`
    Batch {
        ops: Vec<String>,
    },

    /// Show an engine property
    Prop {
        name: String,
    },

    /// Export a snapshot to a new directory on the server
    Snapshot {
        destination: String,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.get(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },

        Commands::Set { key, value } => {
            client.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }

        Commands::Del { key } => {
            client.delete(key.as_bytes())?;
            println!("OK");
        }

        Commands::Mget { keys } => {
            let reply = client.multi_get(keys.into_iter().map(String::into_bytes).collect())?;
            for kv in reply.data {
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(&kv.key),
                    String::from_utf8_lossy(&kv.value)
                );
            }
        }

        Commands::Iter {
            start,
            end,
            exclude_start,
            include_end,
            reverse,
            max,
            keys_only,
        } => {
            let reply = client.iterate(IterateArgs {
                start: start.map(String::into_bytes),
                end: end.map(String::into_bytes),
                include_start: !exclude_start,
                include_end,
                forward: !reverse,
                max,
                include_values: !keys_only,
            })?;
            for item in &reply.data {
                match item.value() {
                    Some(value) => println!(
                        "{}\t{}",
                        String::from_utf8_lossy(item.key()),
                        String::from_utf8_lossy(value)
                    ),
                    None => println!("{}", String::from_utf8_lossy(item.key())),
                }
            }
            if reply.more {
                println!("(more)");
            }
        }

        Commands::Batch { ops } => {
            let records = ops.iter().map(|op| parse_op(op)).collect::<Result<Vec<_>>>()?;
            let applied = client.batch(records)?;
            println!("OK ({} operations)", applied);
        }

        Commands::Prop { name } => match client.property(&name)? {
            Some(value) => print!("{}", value),
            None => println!("(unknown property)"),
        },

        Commands::Snapshot { destination } => {
            client.set_timeout(None)?;
            let entries = client.snapshot(&destination)?;
            println!("OK ({} entries)", entries);
        }

        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

/// Parse `tag:key=value` or `tag:key`; the server validates the tag
fn parse_op(op: &str) -> Result<OpRecord> {
    let (tag, rest) = op
        .split_once(':')
        .ok_or_else(|| KvError::Config(format!("expected tag:key[=value], got {:?}", op)))?;
    let (key, value) = rest.split_once('=').unwrap_or((rest, ""));
    Ok(OpRecord {
        op: tag.to_string(),
        key: key.as_bytes().to_vec(),
        value: value.as_bytes().to_vec(),
    })
}
