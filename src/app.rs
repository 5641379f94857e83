use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Local;
use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::render::ViewSettings;
use crate::server::{self, AppState, PageQuery};
use crate::source::RecordSource;

const DEFAULT_DATA_PATH: &str = "data.json";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

fn print_banner() {
    const BANNER: &str = r#"
   ___  ___  ___| |_ ___ _ ____   _(_) _____      __
  | '__|/ _ \/ __| __/ _ \ '__\ \ / / |/ _ \ \ /\ / /
  | |  | (_) \__ \ ||  __/ |   \ V /| |  __/\ V  V /
  |_|   \___/|___/\__\___|_|    \_/ |_|\___| \_/\_/
    "#;
    print!("{}", BANNER);
    println!(
        "       v{} - student roster viewer\n",
        env!("CARGO_PKG_VERSION")
    );
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: Option<&'a str>, default: &'a str) -> &'a str {
    match v {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

#[derive(Clone, Debug)]
struct RenderJob {
    output: PathBuf,
    query: PageQuery,
}

#[derive(Clone, Debug)]
struct RunConfig {
    data_path: PathBuf,
    bind: SocketAddr,
    settings: ViewSettings,
    stylesheet: Option<PathBuf>,
    no_color: bool,
    log_json: bool,
    verbose: u8,
    render: Option<RenderJob>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let log_json = args.log_json || cfg.log_json.unwrap_or(false);

    let data_raw = args
        .data
        .or(cfg.data)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let data_path = config::expand_tilde(data_raw.trim());

    let bind_raw = args
        .bind
        .or(cfg.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind = bind_raw
        .trim()
        .parse::<SocketAddr>()
        .map_err(|e| format!("invalid bind address '{bind_raw}': {e}"))?;

    let defaults = ViewSettings::default();
    let settings = ViewSettings {
        title: args.title.or(cfg.title).unwrap_or(defaults.title),
        subtitle: args.subtitle.or(cfg.subtitle).unwrap_or(defaults.subtitle),
        stylesheet_href: defaults.stylesheet_href,
    };

    let stylesheet = args
        .stylesheet
        .or(cfg.stylesheet)
        .filter(|s| !s.trim().is_empty())
        .map(|s| config::expand_tilde(s.trim()));

    let render = args.output.map(|output| RenderJob {
        output: config::expand_tilde(&output),
        query: PageQuery {
            search: args.search,
            export: args.export.then(|| "pdf".to_string()),
        },
    });

    Ok(RunConfig {
        data_path,
        bind,
        settings,
        stylesheet,
        no_color,
        log_json,
        verbose: args.verbose,
        render,
    })
}

fn init_tracing(verbose: u8, log_json: bool, no_color: bool) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rosterview={level}")));
    let installed = if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(!no_color))
            .try_init()
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

fn render_once(run: &RunConfig, job: &RenderJob) -> Result<(), String> {
    let source = RecordSource::FilePath(run.data_path.clone());
    let page = server::build_page(
        &source,
        &job.query,
        &run.settings,
        Local::now().naive_local(),
    )
    .map_err(|e| e.to_string())?;
    std::fs::write(&job.output, page.html.as_bytes())
        .map_err(|e| format!("failed to write output '{}': {e}", job.output.display()))?;

    format_kv_line("Data", &run.data_path.display().to_string());
    format_kv_line("Mode", &format!("{:?}", page.mode));
    format_kv_line(
        "Search",
        format_opt_value(job.query.search.as_deref(), "-"),
    );
    format_kv_line("Rows", &format!("{} of {}", page.shown, page.loaded));
    println!(
        "{} {}",
        "Wrote".bold().green(),
        job.output.display().to_string().bold()
    );
    Ok(())
}

async fn run_server(run: RunConfig) -> Result<(), String> {
    print_banner();
    format_kv_line("Data", &run.data_path.display().to_string());
    format_kv_line("Bind", &run.bind.to_string());
    format_kv_line("Title", &run.settings.title);
    let stylesheet_label = run
        .stylesheet
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    format_kv_line("Stylesheet", &stylesheet_label);
    println!();

    if !run.data_path.exists() {
        warn!(
            path = %run.data_path.display(),
            "data file does not exist yet; requests will fail until it does"
        );
    }

    let listener = TcpListener::bind(run.bind)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", run.bind))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("failed to read local address: {e}"))?;
    info!(%addr, "listening");
    println!(
        "{} {}",
        "Listening on".bold().white(),
        format!("http://{addr}/").bold().cyan()
    );

    let state = AppState::new(
        RecordSource::FilePath(run.data_path),
        run.settings,
        run.stylesheet,
    );
    server::serve(listener, state, server::shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))?;

    println!();
    println!(":: Stopped ::");
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print().map_err(|e| e.to_string())?;
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.as_deref().map(config::expand_tilde);
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "unable to determine a config path, use --config".to_string())?;
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("wrote {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    if run.no_color {
        colored::control::set_override(false);
    }
    init_tracing(run.verbose, run.log_json, run.no_color);

    if let Some(job) = run.render.as_ref() {
        return render_once(&run, job);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_server(run))
}
