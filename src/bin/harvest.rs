//! Command-line front end: harvest one department and print its records.
//!
//! Records go to stdout (JSON or TSV), logs to stderr. Set `RUST_LOG` for
//! more detail, e.g. `RUST_LOG=staff_harvest=debug`.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use staff_harvest::{
    catalog, Department, ExtractionOrchestrator, HarvestReport, Options, ProxyChain,
    TextualFallback,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Tsv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Textual {
    Never,
    MarkupOnly,
    Always,
}

impl From<Textual> for TextualFallback {
    fn from(value: Textual) -> Self {
        match value {
            Textual::Never => Self::Never,
            Textual::MarkupOnly => Self::MarkupOnly,
            Textual::Always => Self::Always,
        }
    }
}

/// Harvest contact records from a staff-listing page.
#[derive(Debug, Parser)]
#[command(name = "harvest", version, about)]
struct Cli {
    /// List the built-in departments and exit
    #[arg(long, conflicts_with_all = ["department", "url"])]
    list: bool,

    /// Built-in department to harvest (case-insensitive)
    #[arg(short, long, conflicts_with = "url")]
    department: Option<String>,

    /// Staff-listing page URL to harvest
    #[arg(short, long)]
    url: Option<String>,

    /// Display name for --url
    #[arg(short, long, requires = "url")]
    name: Option<String>,

    /// Relay template with {url} or {raw_url}; repeat to build a chain
    #[arg(short, long = "proxy", value_name = "TEMPLATE")]
    proxies: Vec<String>,

    /// Per-relay deadline in seconds
    #[arg(short, long, default_value_t = 20)]
    timeout: u64,

    /// Characters before a textual match used to find the name
    #[arg(long, default_value_t = 300)]
    window: usize,

    /// When to fall back to textual scanning
    #[arg(long, value_enum, default_value_t = Textual::MarkupOnly)]
    textual: Textual,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

impl Cli {
    fn department(&self) -> Result<Department, String> {
        match (&self.department, &self.url) {
            (Some(name), _) => catalog::find(name).ok_or_else(|| {
                format!("unknown department `{name}`; run with --list to see the catalog")
            }),
            (None, Some(url)) => {
                let name = self
                    .name
                    .clone()
                    .or_else(|| catalog::find_by_url(url).map(|d| d.name))
                    .unwrap_or_else(|| url.clone());
                Ok(Department::new(name, url.clone()))
            }
            (None, None) => Err("pass --department, --url or --list".to_string()),
        }
    }

    fn options(&self) -> Result<Options, staff_harvest::Error> {
        let mut options = Options {
            attempt_timeout: Duration::from_secs(self.timeout),
            text_window: self.window,
            textual_fallback: self.textual.into(),
            ..Options::default()
        };
        if !self.proxies.is_empty() {
            options.proxy_chain = ProxyChain::from_templates(self.proxies.iter().cloned())?;
        }
        options.validate()?;
        Ok(options)
    }
}

fn write_report(report: &HarvestReport, format: Format) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
        Format::Tsv => {
            writeln!(out, "name\temail\tdepartment\tfetched_at")?;
            for record in &report.records {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    record.name,
                    record.email,
                    report.department.name,
                    report.fetched_at.to_rfc3339()
                )?;
            }
        }
    }
    out.flush()
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.list {
        for department in catalog::departments() {
            println!("{}\t{}", department.name, department.url);
        }
        return ExitCode::SUCCESS;
    }

    let department = match cli.department() {
        Ok(department) => department,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::from(2);
        }
    };

    let harvester = match cli.options().and_then(ExtractionOrchestrator::new) {
        Ok(harvester) => harvester,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match harvester.harvest_with_cancel(&department, &cancel).await {
        Ok(report) => {
            if let Err(err) = write_report(&report, cli.format) {
                eprintln!("error: writing output: {err}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Extraction failed: {err}");
            ExitCode::FAILURE
        }
    }
}
