use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kinship_core::{convert_to, scalar, Shape, Value};
use kinship_owners::{ClusterObject, GroupKind, Owners, OwnersConfig};
use kube::core::DynamicObject;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "kinshipctl", version, about = "Kinship CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ScalarKind { Text, Bool, Int32, Int64, Float32, Float64 }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a value into a target shape (both as JSON, or @file)
    Convert {
        #[arg(long)]
        value: String,
        #[arg(long)]
        shape: String,
    },
    /// Extract a plain scalar through any reference/named layers
    Scalar {
        #[arg(value_enum)]
        kind: ScalarKind,
        #[arg(long)]
        value: String,
    },
    /// Inspect or edit owner references on a manifest
    Owners {
        /// Annotation key for foreign owners
        #[arg(long = "annotation", env = "KINSHIP_OWNER_ANNOTATION", global = true)]
        annotation: Option<String>,
        #[command(subcommand)]
        action: OwnersAction,
    },
}

#[derive(Subcommand, Debug)]
enum OwnersAction {
    /// Record an owner on an object
    Add(Mutation),
    /// Drop an owner from an object
    Remove(Mutation),
    /// List owners of an object
    List {
        #[arg(long)]
        object: PathBuf,
        #[arg(long, env = "KINSHIP_CLUSTER")]
        cluster: String,
        /// Restrict to group kinds, e.g. "Deployment.apps" (repeatable)
        #[arg(long = "kind")]
        kinds: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct Mutation {
    /// Manifest of the owned object (YAML or JSON)
    #[arg(long)]
    object: PathBuf,
    /// Cluster id of the owned object
    #[arg(long, env = "KINSHIP_CLUSTER")]
    cluster: String,
    /// Manifest of the owner
    #[arg(long)]
    owner: PathBuf,
    /// Cluster id of the owner (default: --cluster)
    #[arg(long = "owner-cluster")]
    owner_cluster: Option<String>,
    /// Rewrite the object manifest instead of printing it
    #[arg(long = "in-place")]
    in_place: bool,
}

fn init_tracing() {
    let env = std::env::var("KINSHIP_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Inline JSON, or `@path` to read it from a file.
fn read_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path)),
        None => Ok(arg.to_string()),
    }
}

fn load_object(path: &Path, cluster: &str) -> Result<ClusterObject> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: DynamicObject = serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    ClusterObject::from_object(cluster, raw).with_context(|| format!("loading {}", path.display()))
}

fn print_value(output: Output, v: &Value) -> Result<()> {
    match output {
        Output::Human => println!("{}", v),
        Output::Json => println!("{}", serde_json::to_string_pretty(v)?),
    }
    Ok(())
}

fn mutate(output: Output, owners: &Owners, m: Mutation, add: bool) -> Result<()> {
    let mut obj = load_object(&m.object, &m.cluster)?;
    let owner_cluster = m.owner_cluster.as_deref().unwrap_or(&m.cluster);
    let owner = load_object(&m.owner, owner_cluster)?;
    let changed = if add { obj.add_owner(owners, &owner) } else { obj.remove_owner(owners, &owner) };
    info!(object = %m.object.display(), owner = %m.owner.display(), add, changed, "owners updated");

    if m.in_place {
        if changed {
            let yaml = serde_yaml::to_string(&obj.object)?;
            std::fs::write(&m.object, yaml).with_context(|| format!("writing {}", m.object.display()))?;
        }
        match output {
            Output::Human => println!("changed: {}", changed),
            Output::Json => println!("{}", serde_json::json!({ "changed": changed })),
        }
        return Ok(());
    }
    match output {
        Output::Human => {
            eprintln!("changed: {}", changed);
            print!("{}", serde_yaml::to_string(&obj.object)?);
        }
        Output::Json => {
            let doc = serde_json::json!({ "changed": changed, "object": obj.object });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { value, shape } => {
            let v: Value = serde_json::from_str(&read_arg(&value)?).context("parsing --value")?;
            let target: Shape = serde_json::from_str(&read_arg(&shape)?).context("parsing --shape")?;
            info!(target_shape = %target, "convert invoked");
            let out = convert_to(&v, &target)?;
            print_value(cli.output, &out)?;
        }
        Commands::Scalar { kind, value } => {
            let v: Value = serde_json::from_str(&read_arg(&value)?).context("parsing --value")?;
            let out = match kind {
                ScalarKind::Text => Value::Text(scalar::text(&v)?),
                ScalarKind::Bool => Value::Bool(scalar::boolean(&v)?),
                ScalarKind::Int32 => Value::Int32(scalar::int32(&v)?),
                ScalarKind::Int64 => Value::Int64(scalar::int64(&v)?),
                ScalarKind::Float32 => Value::Float32(scalar::float32(&v)?),
                ScalarKind::Float64 => Value::Float64(scalar::float64(&v)?),
            };
            print_value(cli.output, &out)?;
        }
        Commands::Owners { annotation, action } => {
            let config = match annotation {
                Some(k) if !k.trim().is_empty() => OwnersConfig { annotation_key: k.trim().to_string() },
                Some(_) => {
                    warn!("empty --annotation; using default key");
                    OwnersConfig::default()
                }
                None => OwnersConfig::from_env(),
            };
            let owners = Owners::new(config);
            match action {
                OwnersAction::Add(m) => mutate(cli.output, &owners, m, true)?,
                OwnersAction::Remove(m) => mutate(cli.output, &owners, m, false)?,
                OwnersAction::List { object, cluster, kinds } => {
                    let kinds = kinds
                        .iter()
                        .map(|k| GroupKind::from_str(k).with_context(|| format!("invalid --kind {}", k)))
                        .collect::<Result<Vec<_>>>()?;
                    let obj = load_object(&object, &cluster)?;
                    let found = obj.owners(&owners, &kinds);
                    match cli.output {
                        Output::Human => {
                            for k in &found {
                                println!("{}", k);
                            }
                        }
                        Output::Json => println!("{}", serde_json::to_string_pretty(&found)?),
                    }
                }
            }
        }
    }

    Ok(())
}
