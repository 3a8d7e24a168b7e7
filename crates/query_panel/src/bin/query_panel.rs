//! query-panel: terminal front-end for the query backend.
//! Each stdin line is typed into the panel and submitted; the answer area is
//! printed to stdout whenever an exchange settles. `--tables` lists the
//! backend's tables instead.

use query_panel::{config, logging, PanelStatus, PanelView, QueryClient, QueryPanel, Renderer};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};

struct Args {
    config: Option<PathBuf>,
    url: Option<String>,
    tables: bool,
}

const USAGE: &str = "usage: query-panel [--config <path>] [--url <base>] [--tables]";

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", USAGE);
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        url: None,
        tables: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => args.config = Some(PathBuf::from(path)),
                None => usage_error("--config requires a path"),
            },
            "--url" => match iter.next() {
                Some(url) => args.url = Some(url),
                None => usage_error("--url requires a base URL"),
            },
            "--tables" => args.tables = true,
            other => usage_error(&format!("unknown argument {}", other)),
        }
    }
    args
}

fn load_config(explicit: Option<PathBuf>) -> config::Config {
    // 1. --config <path> flag, 2. QUERY_PANEL_CONFIG env var; both must load.
    let explicit = explicit.or_else(|| std::env::var_os("QUERY_PANEL_CONFIG").map(PathBuf::from));
    if let Some(path) = explicit {
        return config::load(&path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load config from {}: {}", path.display(), e);
            process::exit(1);
        });
    }
    // 3. Default path (~/.query-panel/config.yaml), optional.
    let Some(path) = config::default_config_path() else {
        return config::Config::default();
    };
    config::load_or_default(&path).unwrap_or_else(|e| {
        eprintln!("Error: failed to load config from {}: {}", path.display(), e);
        process::exit(1);
    })
}

/// Renderer that prints the answer area each time an exchange settles.
fn settled_printer() -> Renderer {
    let awaiting = Mutex::new(false);
    Arc::new(move |view: &PanelView| {
        let mut awaiting = awaiting.lock().unwrap_or_else(|p| p.into_inner());
        let was_awaiting = std::mem::replace(&mut *awaiting, view.status == PanelStatus::Awaiting);
        if was_awaiting && !*awaiting {
            print_line(&view.display_line());
        }
    })
}

fn print_line(line: &str) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "{}", line);
    let _ = out.flush();
}

async fn list_tables(client: &QueryClient) {
    let tables = match client.list_tables().await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: listing tables failed: {}", e);
            process::exit(1);
        }
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for table in &tables {
        match &table.table_description {
            Some(desc) => {
                let _ = writeln!(out, "{}\t{}", table.table_name, desc);
            }
            None => {
                let _ = writeln!(out, "{}", table.table_name);
            }
        }
    }
}

async fn run_panel(client: QueryClient) {
    let panel = QueryPanel::new(client, settled_printer());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: reading stdin failed: {}", e);
                process::exit(1);
            }
        };
        panel.on_query_change(line);
        // Failures are already shown in the answer area.
        let _ = panel.submit_query().await;
    }
}

fn main() {
    let args = parse_args();
    let cfg = load_config(args.config);
    logging::init(logging::resolve_level(cfg.logging.level.as_deref()));

    let base_url = args.url.as_deref().unwrap_or_else(|| cfg.base_url());
    let client = QueryClient::new(base_url).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    tracing::info!(base_url = %client.base_url(), "query panel ready");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(async {
        if args.tables {
            list_tables(&client).await;
        } else {
            run_panel(client).await;
        }
    });
}
