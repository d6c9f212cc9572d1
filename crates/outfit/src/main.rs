#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use outfit_core::node::{NodeRegistry, OutfitNode};
use outfit_core::selection;
use outfit_core::types::SeedState;
use outfit_core::verify::{self, FileStatus};

/// Environment variable consulted when `--data-dir` is absent.
const DATA_DIR_ENV: &str = "OUTFIT_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(
    name = "outfit",
    version,
    about = "Reproducible outfit prompts for image generation. Unix-friendly."
)]
struct Cli {
    /// Data directory (default: $OUTFIT_DATA_DIR, then ./data).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a prompt for one category.
    Prompt {
        /// Category name or node class name.
        category: String,

        /// JSON object of field values (or "-" for stdin).
        file: Option<String>,

        /// Set one field (repeatable). Values parse as JSON, else as text.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Requested seed.
        #[arg(long)]
        seed: Option<u32>,

        /// fixed, random, increment or decrement.
        #[arg(long)]
        seed_mode: Option<String>,

        /// Seed used by the previous call (for increment/decrement).
        #[arg(long, default_value_t = 0)]
        last_seed: u32,

        /// Fill unset fields from a named preset.
        #[arg(long)]
        preset: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// List registered categories and their node names.
    Categories {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the option lists of a category.
    Options {
        /// Category name or node class name.
        category: String,

        /// Only this field.
        #[arg(long)]
        field: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the presets of a category.
    Presets {
        /// Category name or node class name.
        category: String,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check the data directory for missing or malformed files.
    Verify {
        /// Output structured JSON report.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    match cli.cmd {
        Cmd::Prompt {
            category,
            file,
            set,
            seed,
            seed_mode,
            last_seed,
            preset,
            json,
        } => {
            let overrides = PromptOverrides {
                set,
                seed,
                seed_mode,
                preset,
            };
            cmd_prompt(
                &data_dir,
                &category,
                file.as_deref(),
                overrides,
                last_seed,
                json,
            )
        }

        Cmd::Categories { json } => cmd_categories(&data_dir, json),

        Cmd::Options {
            category,
            field,
            json,
        } => cmd_options(&data_dir, &category, field.as_deref(), json),

        Cmd::Presets { category, json } => cmd_presets(&data_dir, &category, json),

        Cmd::Verify { json } => cmd_verify(&data_dir, json),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    let dir = flag
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    debug!(data_dir = %dir.display(), "using data directory");
    dir
}

fn load_registry(data_dir: &Path) -> Result<NodeRegistry> {
    if !data_dir.is_dir() {
        bail!("data directory {} not found", data_dir.display());
    }
    Ok(NodeRegistry::discover(data_dir))
}

fn find_node<'a>(registry: &'a NodeRegistry, name: &str) -> Result<&'a OutfitNode> {
    registry.resolve(name).ok_or_else(|| {
        anyhow!(
            "unknown category \"{name}\". available: {}",
            registry.categories().join(", ")
        )
    })
}

// ── prompt ──────────────────────────────────────────────────────

struct PromptOverrides {
    set: Vec<String>,
    seed: Option<u32>,
    seed_mode: Option<String>,
    preset: Option<String>,
}

fn read_fields(file: Option<&str>) -> Result<Map<String, Value>> {
    let content = match file {
        None => return Ok(Map::new()),
        Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => {
            std::fs::read_to_string(path).map_err(|e| anyhow!("cannot read {path}: {e}"))?
        }
    };
    let source = file.unwrap_or("-");
    let data: Value =
        serde_json::from_str(&content).map_err(|e| anyhow!("{source}: invalid JSON: {e}"))?;
    match data {
        Value::Object(map) => Ok(map),
        _ => bail!("{source}: expected a JSON object of fields"),
    }
}

/// `key=value`; the value is JSON when it parses as JSON, else plain text.
fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--set expects KEY=VALUE, got \"{raw}\""))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("--set expects KEY=VALUE, got \"{raw}\"");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

fn cmd_prompt(
    data_dir: &Path,
    category: &str,
    file: Option<&str>,
    overrides: PromptOverrides,
    last_seed: u32,
    json_out: bool,
) -> Result<()> {
    let registry = load_registry(data_dir)?;
    let node = find_node(&registry, category)?;

    let mut fields = read_fields(file)?;
    for raw in &overrides.set {
        let (key, value) = parse_assignment(raw)?;
        fields.insert(key, value);
    }
    if let Some(seed) = overrides.seed {
        fields.insert(selection::SEED.to_string(), Value::from(seed));
    }
    if let Some(mode) = overrides.seed_mode {
        fields.insert(selection::SEED_MODE.to_string(), Value::from(mode));
    }
    if let Some(preset) = overrides.preset {
        fields.insert(selection::PRESET.to_string(), Value::from(preset));
    }

    let mut state = SeedState::new(last_seed);
    let (prompt, seed) = node.invoke(&Value::Object(fields), &mut state)?;

    if json_out {
        let out = json!({
            "prompt": prompt,
            "seed": seed,
            "last_seed": state.last_seed,
            "fingerprint": node.table().fingerprint(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{prompt}");
        eprintln!("seed {seed}");
    }
    Ok(())
}

// ── categories / options / presets ──────────────────────────────

fn cmd_categories(data_dir: &Path, json_out: bool) -> Result<()> {
    let registry = load_registry(data_dir)?;
    if json_out {
        let rows: Vec<Value> = registry
            .iter()
            .map(|node| {
                json!({
                    "category": node.category(),
                    "class_name": node.class_name(),
                    "display_name": node.display_name(),
                    "menu_category": node.menu_category(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for node in registry.iter() {
            println!(
                "  {:<12} {:<24} {}",
                node.category(),
                node.class_name(),
                node.display_name()
            );
        }
    }
    Ok(())
}

fn cmd_options(
    data_dir: &Path,
    category: &str,
    field: Option<&str>,
    json_out: bool,
) -> Result<()> {
    let registry = load_registry(data_dir)?;
    let table = find_node(&registry, category)?.table();

    let fields: Vec<&str> = match field {
        Some(f) => {
            if table.options(f).is_none() {
                bail!(
                    "unknown field \"{f}\". available: {}",
                    table.field_names().join(", ")
                );
            }
            vec![f]
        }
        None => table.field_names(),
    };

    if json_out {
        let mut out = Map::new();
        for f in &fields {
            let opts = table.options(f).unwrap_or_default();
            out.insert(f.to_string(), json!(opts));
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
    } else {
        for f in &fields {
            let opts = table.options(f).unwrap_or_default();
            println!("  {f:<12} {}", opts.join(", "));
        }
    }
    Ok(())
}

fn cmd_presets(data_dir: &Path, category: &str, json_out: bool) -> Result<()> {
    let registry = load_registry(data_dir)?;
    let node = find_node(&registry, category)?;
    if json_out {
        println!("{}", serde_json::to_string_pretty(node.presets())?);
        return Ok(());
    }
    if node.presets().is_empty() {
        eprintln!("no presets for {}", node.category());
    }
    for (name, preset) in node.presets() {
        let summary: Vec<String> = preset.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("  {name:<20} {}", summary.join(" "));
    }
    Ok(())
}

// ── verify ──────────────────────────────────────────────────────

fn cmd_verify(data_dir: &Path, json_out: bool) -> Result<()> {
    let report = verify::verify(data_dir)?;

    if json_out {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for f in &report.files {
            match f.status {
                FileStatus::Ok => eprintln!("  ok      {}", f.path),
                FileStatus::Missing => eprintln!("  MISSING {}", f.path),
                FileStatus::Invalid => eprintln!(
                    "  FAIL    {}: {}",
                    f.path,
                    f.message.as_deref().unwrap_or("")
                ),
            }
        }
        for issue in &report.preset_issues {
            eprintln!(
                "  warn    preset {}/{}: {}=\"{}\" is not a known option",
                issue.category, issue.preset, issue.field, issue.value
            );
        }
        eprintln!(
            "\n{} categories: {}",
            report.categories.len(),
            report.categories.join(", ")
        );
    }

    if !report.pass {
        bail!("verification failed for {}", data_dir.display());
    }
    Ok(())
}
