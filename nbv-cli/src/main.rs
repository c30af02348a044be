//! Command-line interface for nbv
//! This binary maintains a local collection of notebook documents and
//! renders them to standalone HTML pages.
//!
//! Usage:
//!   nbv add <files...>          - Ingest .ipynb files into the collection
//!   nbv list                    - List stored notebooks, newest first
//!   nbv render <id> [-o <out>]  - Render a stored notebook to HTML
//!   nbv export <id> [-o <out>]  - Write a stored notebook back out as JSON
//!   nbv delete <id>             - Remove a notebook from the collection

use clap::{Arg, Command};
use nbv_cli::ingest::ingest_files;
use nbv_config::{Loader, NbvConfig};
use nbv_parser::export_notebook;
use nbv_render::{render_notebook_titled, wrap_page, EngineSlot, KatexEngine};
use nbv_store::{NotebookStore, StoredNotebookRecord};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let matches = Command::new("nbv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load notebook files, keep them in a local collection, and render them to HTML")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Path to a nbv.toml layered over the built-in defaults"),
        )
        .subcommand(
            Command::new("add")
                .about("Ingest one or more .ipynb files into the collection")
                .arg(
                    Arg::new("files")
                        .help("Notebook files to ingest")
                        .num_args(1..)
                        .required(true),
                ),
        )
        .subcommand(Command::new("list").about("List stored notebooks, newest first"))
        .subcommand(
            Command::new("render")
                .about("Render a stored notebook to a standalone HTML page")
                .arg(Arg::new("id").help("Record id (see 'nbv list')").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file (default: <name>.html)"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write a stored notebook back out as .ipynb JSON")
                .arg(Arg::new("id").help("Record id (see 'nbv list')").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file (default: the original name)"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove a notebook from the collection")
                .arg(Arg::new("id").help("Record id (see 'nbv list')").required(true)),
        )
        .get_matches();

    let config = load_config(matches.get_one::<String>("config"));
    let store = open_store(&config);

    match matches.subcommand() {
        Some(("add", sub)) => {
            let files: Vec<PathBuf> = sub
                .get_many::<String>("files")
                .expect("files are required")
                .map(PathBuf::from)
                .collect();
            handle_add(&store, &config, &files).await;
        }
        Some(("list", _)) => handle_list(&store).await,
        Some(("render", sub)) => {
            let id = sub.get_one::<String>("id").expect("id is required");
            handle_render(&store, &config, id, sub.get_one::<String>("output")).await;
        }
        Some(("export", sub)) => {
            let id = sub.get_one::<String>("id").expect("id is required");
            handle_export(&store, id, sub.get_one::<String>("output")).await;
        }
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").expect("id is required");
            handle_delete(&store, id).await;
        }
        _ => unreachable!("subcommand is required"),
    }
}

async fn handle_add(store: &NotebookStore, config: &NbvConfig, files: &[PathBuf]) {
    let outcome = ingest_files(store, files, config.ingest.max_file_bytes).await;

    for record in &outcome.stored {
        println!("Stored {} ({})", record.name, record.id);
    }
    for failure in &outcome.failures {
        eprintln!("Rejected {}: {}", failure.name, failure.error);
    }
    println!(
        "{} stored, {} rejected",
        outcome.stored.len(),
        outcome.failures.len()
    );

    if outcome.fully_failed() {
        process::exit(1);
    }
}

async fn handle_list(store: &NotebookStore) {
    let mut records = store.get_all().await.unwrap_or_else(|err| {
        eprintln!("Storage error: {err}");
        process::exit(1);
    });

    if records.is_empty() {
        println!("No notebooks stored. Add one with 'nbv add <file.ipynb>'.");
        return;
    }

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for record in records {
        println!(
            "{}  {:>9}  {}  {}",
            record.id,
            format_size(record.size_bytes),
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.name
        );
    }
}

async fn handle_render(
    store: &NotebookStore,
    config: &NbvConfig,
    id: &str,
    output: Option<&String>,
) {
    let record = match fetch(store, id).await {
        Some(record) => record,
        None => {
            println!("No notebook found with id {id}");
            return;
        }
    };

    let engine = math_engine_slot(config);
    let body = render_notebook_titled(&record.document, &record.name, &engine);
    let page = wrap_page(&record.name, &body);

    let path = output.map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(format!("{}.html", record.name.trim_end_matches(".ipynb")))
    });
    write_file(&path, &page);
    println!("Rendered {} to {}", record.name, path.display());
}

async fn handle_export(store: &NotebookStore, id: &str, output: Option<&String>) {
    let record = match fetch(store, id).await {
        Some(record) => record,
        None => {
            println!("No notebook found with id {id}");
            return;
        }
    };

    let json = export_notebook(&record.document).unwrap_or_else(|err| {
        eprintln!("Export failed: {err}");
        process::exit(1);
    });

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&record.name));
    write_file(&path, &json);
    println!("Exported {} to {}", record.name, path.display());
}

async fn handle_delete(store: &NotebookStore, id: &str) {
    match fetch(store, id).await {
        Some(record) => {
            store.delete(id).await.unwrap_or_else(|err| {
                eprintln!("Delete failed, record left unchanged: {err}");
                process::exit(1);
            });
            println!("Deleted {} ({})", record.name, record.id);
        }
        None => println!("No notebook found with id {id}"),
    }
}

async fn fetch(store: &NotebookStore, id: &str) -> Option<StoredNotebookRecord> {
    store.get(id).await.unwrap_or_else(|err| {
        eprintln!("Storage error: {err}");
        process::exit(1);
    })
}

fn load_config(path: Option<&String>) -> NbvConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}");
        process::exit(1);
    })
}

fn open_store(config: &NbvConfig) -> NotebookStore {
    let path = resolve_storage_path(&config.storage.path);
    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Could not create storage directory {}: {err}", parent.display());
            process::exit(1);
        }
    }
    NotebookStore::open(&path).unwrap_or_else(|err| {
        eprintln!("Could not open the notebook store at {}: {err}", path.display());
        process::exit(1);
    })
}

/// Relative storage paths land under `$NBV_DATA_DIR`, falling back to
/// `$HOME/.local/share`, falling back to the working directory.
fn resolve_storage_path(configured: &str) -> PathBuf {
    let configured = Path::new(configured);
    if configured.is_absolute() {
        return configured.to_path_buf();
    }
    let base = std::env::var_os("NBV_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share"))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(configured)
}

/// Math rendering is optional: when the engine cannot initialize the
/// pages still render, just without typeset math.
fn math_engine_slot(config: &NbvConfig) -> EngineSlot {
    let slot = EngineSlot::empty();
    if config.render.math_enabled {
        match KatexEngine::try_new() {
            Ok(engine) => slot.install(Box::new(engine)),
            Err(err) => eprintln!("Math engine unavailable, rendering without math: {err}"),
        }
    }
    slot
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap_or_else(|err| {
        eprintln!("Could not write {}: {err}", path.display());
        process::exit(1);
    });
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
