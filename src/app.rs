use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{error::ErrorKind, Parser};
use colored::Colorize;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::filters::SHOW_ALL;
use crate::output::{self, OutputFormat, ViewSnapshot};
use crate::report::{BuildOptions, Report, ReportData};
use crate::utils;
use crate::view::{TableSurface, ViewController, ViewEvent};

const DEFAULT_TITLE: &str = "Reconciliation summary";

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    data: PathBuf,
    events: Option<PathBuf>,
    page_size: Option<usize>,
    group_by: Option<String>,
    key_column: Option<String>,
    problem_pattern: Option<String>,
    problem_filters: bool,
    list_filters: bool,
    filter: Option<String>,
    page: Option<i64>,
    open: Vec<String>,
    open_all: bool,
    title: String,
    output: Option<PathBuf>,
    output_format: OutputFormat,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let data = args
        .data
        .or(cfg.data)
        .map(|p| config::expand_tilde(&p))
        .ok_or_else(|| "no report data provided (use --data or set 'data' in the config)".to_string())?;
    let events = args.events.or(cfg.events).map(|p| config::expand_tilde(&p));

    let page_size = args.page_size.or(cfg.page_size);
    if page_size == Some(0) {
        return Err("invalid page_size 0, expected positive integer".to_string());
    }

    let problem_pattern = args.problem_pattern.or(cfg.problem_pattern);
    if let Some(raw) = problem_pattern.as_deref() {
        crate::render::ProblemPattern::new(raw)
            .map_err(|e| format!("invalid problem pattern '{raw}': {e}"))?;
    }

    let open = if args.open.is_empty() {
        cfg.open.unwrap_or_default()
    } else {
        args.open
            .iter()
            .flat_map(|raw| utils::parse_id_csv(raw))
            .collect()
    };

    let output_path = args.output.or(cfg.output);
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output_path
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        data,
        events,
        page_size,
        group_by: args.group_by.or(cfg.group_by),
        key_column: args.key_column.or(cfg.key_column),
        problem_pattern,
        problem_filters: args
            .problem_filters
            .or(cfg.problem_filters)
            .unwrap_or(false),
        list_filters: args.list_filters,
        filter: args.filter.or(cfg.filter),
        page: args.page.or(cfg.page),
        open,
        open_all: args.open_all,
        title: args
            .title
            .or(cfg.title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        output: output_path.map(|p| config::expand_tilde(&p)),
        output_format,
        no_color,
        verbose: args.verbose,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn load_report(run: &RunConfig) -> Result<Report, String> {
    let mut data = ReportData::load(&run.data).map_err(|e| e.to_string())?;
    if let Some(size) = run.page_size {
        data.args.page_size = size;
    }
    if let Some(group_by) = run.group_by.as_ref() {
        data.args.group_by = group_by.clone();
    }
    if let Some(key_column) = run.key_column.as_ref() {
        data.args.key_column = Some(key_column.clone());
    }
    if let Some(pattern) = run.problem_pattern.as_ref() {
        data.problem_pattern = Some(pattern.clone());
    }
    Report::build(
        data,
        BuildOptions {
            problem_filters: run.problem_filters,
        },
    )
    .map_err(|e| e.to_string())
}

fn load_events(path: &Path) -> Result<Vec<ViewEvent>, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read events '{}': {e}", path.display()))?;
    serde_yaml::from_str::<Vec<ViewEvent>>(&contents)
        .map_err(|e| format!("failed to parse events '{}': {e}", path.display()))
}

/// Initial view from the run config, expressed as events so it goes through
/// the same handlers as everything else.
fn initial_events(run: &RunConfig) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    if run.open_all {
        events.push(ViewEvent::ExpandAll);
    }
    for group_id in &run.open {
        events.push(ViewEvent::Open {
            group_id: group_id.clone(),
        });
    }
    if let Some(filter) = run.filter.as_ref() {
        events.push(ViewEvent::Filter {
            filter: filter.clone(),
        });
    }
    if let Some(page) = run.page {
        events.push(ViewEvent::Page { page });
    }
    events
}

fn print_summary(run: &RunConfig, controller: &ViewController<TableSurface>) {
    let state = controller.state();
    let report = controller.report();
    let filter = if run.no_color {
        state.cursor.filter.normal()
    } else {
        state.cursor.filter.bold().cyan()
    };
    format_kv_line("Data", &run.data.display().to_string());
    format_kv_line("Groups", &report.data.groups.len().to_string());
    format_kv_line("Page size", &report.pager.page_size().to_string());
    format_kv_line(
        "Problems",
        format_opt_value(report.renderer.problem_pattern(), "(none)"),
    );
    format_kv_line("Filter", &filter.to_string());
    format_kv_line(
        "Page",
        &format!("{} of {}", state.cursor.page, state.max_page),
    );
    format_kv_line("Open", &state.groups.open_ids().count().to_string());
    format_kv_line("Col. filt.", format_bool(run.problem_filters));
}

fn print_filters(report: &Report, no_color: bool) {
    for name in report.filters.names() {
        let count = report.filters.len_of(name);
        let label = if no_color || name != SHOW_ALL {
            name.normal()
        } else {
            name.bold()
        };
        println!("{:>8}  {}", count, label);
    }
}

fn write_output(run: &RunConfig, bytes: &[u8]) -> Result<(), String> {
    match run.output.as_ref() {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| format!("failed to write output '{}': {e}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write output: {e}"))
        }
    }
}

fn execute(run: &RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let report = load_report(run)?;
    if run.list_filters {
        print_filters(&report, run.no_color);
        return Ok(());
    }

    let mut controller =
        ViewController::mount(report, TableSurface::new()).map_err(|e| e.to_string())?;

    let mut events = initial_events(run);
    if let Some(path) = run.events.as_ref() {
        let replay = load_events(path)?;
        log::info!("replaying {} events from {}", replay.len(), path.display());
        events.extend(replay);
    }
    for event in events {
        controller.dispatch(event);
    }

    print_summary(run, &controller);

    let open_groups: Vec<&str> = controller.state().groups.open_ids().collect();
    let snapshot = ViewSnapshot {
        title: &run.title,
        columns: controller.report().renderer.columns(),
        open_groups,
        surface: controller.surface(),
    };
    let bytes = output::render(run.output_format, &snapshot);
    write_output(run, &bytes)?;

    if let Some(path) = run.output.as_ref() {
        let done = format!("wrote {}", path.display());
        if run.no_color {
            eprintln!(":: {done}");
        } else {
            eprintln!(":: {}", done.green());
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path, use --config".to_string())?;
        config::ensure_default_config_file(&path)?;
        eprintln!(":: config file at {}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run_config = build_run_config(args, cfg)?;
    log::debug!("run config: {run_config:?}");
    execute(&run_config)
}
