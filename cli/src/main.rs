//! html2pdf CLI - render PDFs from Lua recipes with wkhtmltopdf

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::LevelFilter;

use html2pdf::{App, RuntimeConfig};

#[derive(Parser)]
#[command(name = "html2pdf")]
#[command(disable_version_flag = true)]
#[command(about = "Generate PDF documents from HTML with Lua recipes", long_about = None)]
struct Cli {
    /// Recipe script
    #[arg(value_name = "SCRIPT_FILE")]
    script_file: Option<PathBuf>,

    /// Log level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Variables as a JSON object, exposed to the recipe as `var`
    #[arg(long, value_name = "JSON")]
    var: Option<String>,

    /// Variables loaded from a JSON file, applied before --var
    #[arg(long, value_name = "FILE")]
    var_file: Option<PathBuf>,

    /// Cache directory for the renderer binary and scratch files
    #[arg(long, value_name = "DIR", env = "HTML2PDF_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// wkhtmltopdf binary to run
    #[arg(long, value_name = "PATH", env = "HTML2PDF_WKHTMLTOPDF")]
    wkhtmltopdf: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long)]
    version: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    /// No output
    Quiet,
    /// Errors only
    Error,
    /// Warnings and errors
    Warning,
    /// Progress messages
    Info,
    /// Everything, including renderer arguments
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Quiet => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

fn init_logger(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let message = record.args().to_string();
            if message.starts_with("==> Processing") {
                writeln!(buf, "{}", message.bold())
            } else {
                writeln!(buf, "{}", message)
            }
        })
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.version {
        cmd_version();
        return;
    }

    init_logger(cli.log_level);

    let Some(script_file) = cli.script_file.clone() else {
        println!("{}", "Usage: html2pdf [OPTIONS] <SCRIPT_FILE>".yellow());
        println!("       html2pdf --help for more information");
        return;
    };

    let mut config = cli
        .cache_dir
        .clone()
        .map(RuntimeConfig::new)
        .unwrap_or_default();
    if let Some(binary) = cli.wkhtmltopdf.clone() {
        config = config.with_wkhtmltopdf(binary);
    }

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => abort(&e),
    };

    let result = cmd_run(&mut app, &cli, script_file);
    app.close();

    if let Err(e) = result {
        abort(&e);
    }
}

fn cmd_run(app: &mut App, cli: &Cli, script_file: PathBuf) -> html2pdf::Result<()> {
    if let Some(path) = &cli.var_file {
        app.load_variables_from_json_file(path)?;
    }
    if let Some(json) = &cli.var {
        app.load_variables_from_json(json)?;
    }
    app.load_script_file(script_file)?;
    app.run()
}

fn abort(error: &html2pdf::Error) -> ! {
    eprintln!("{}", "html2pdf aborted!".red().bold());
    eprintln!("{}", error.to_string().red());
    std::process::exit(1);
}

fn cmd_version() {
    println!(
        "html2pdf version {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("HTML2PDF_BUILD").unwrap_or("dev")
    );
}
