//! CLI binary for transcript-gpa.
//!
//! A thin shim over the library crate that maps CLI flags to a `Curriculum`,
//! runs the evaluation, prints the averages and exports the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use transcript_gpa::{
    evaluate_file, interpret_choice, write_report, Curriculum, Evaluation, ExcludeTrack,
    ExtractOptions, ExtractionProgressCallback, KeepAllTracks, ProgressCallback, Report,
    ReportFormat, SkipReason, TrackCandidate, TrackChoice, TrackSelector,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Page-by-page extraction bar. Transcripts are short, so the bar mostly
/// matters for scanned multi-page exports with slow text layers.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Reading");
        bar.set_message("Opening transcript…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>2}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        self.bar.set_prefix("Extracting");
    }

    fn on_page_extracted(&self, page_num: usize, total_pages: usize, line_count: usize) {
        self.bar.println(format!(
            "  {} Page {:>2}/{:<2}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{line_count:>4} lines")),
        ));
        self.bar.inc(1);
    }

    fn on_page_empty(&self, page_num: usize, total_pages: usize) {
        self.bar.println(format!(
            "  {} Page {:>2}/{:<2}  {}",
            yellow("∅"),
            page_num,
            total_pages,
            dim("no text layer"),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, total_lines: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages, {} lines extracted",
            green("✔"),
            bold(&total_pages.to_string()),
            total_lines
        );
    }
}

// ── Console track selector ───────────────────────────────────────────────────

/// Asks on the terminal which elective track to leave out.
///
/// Ctrl-C, end of input and anything unrecognised keep every track.
struct ConsoleTrackSelector;

impl ConsoleTrackSelector {
    /// Read one line from stdin, or `None` on EOF / read error / Ctrl-C.
    ///
    /// The blocking read runs on its own thread. On Ctrl-C that thread is
    /// left parked in `read_line` and goes away with the process.
    fn read_line() -> Option<String> {
        let line = spawn_line_reader(|| {
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line),
            }
        })?;
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(first_line_or_interrupt(line, async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }))
        })
    }
}

/// Run `read` on a dedicated thread and hand its result back through a channel.
fn spawn_line_reader<F>(read: F) -> Option<oneshot::Receiver<Option<String>>>
where
    F: FnOnce() -> Option<String> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("track-prompt".into())
        .spawn(move || {
            let _ = tx.send(read());
        })
        .map_err(|e| tracing::warn!("Cannot read the track prompt: {e}"))
        .ok()?;
    Some(rx)
}

async fn first_line_or_interrupt(
    line: oneshot::Receiver<Option<String>>,
    interrupt: impl Future<Output = ()>,
) -> Option<String> {
    tokio::select! {
        line = line => line.ok().flatten(),
        _ = interrupt => {
            eprintln!();
            tracing::info!("Interrupted at track prompt, keeping all tracks");
            None
        }
    }
}

impl TrackSelector for ConsoleTrackSelector {
    fn select(&mut self, candidates: &[TrackCandidate]) -> TrackChoice {
        println!("{}", bold("Which elective track should be left out of the average?"));
        for c in candidates {
            let average = c
                .average
                .map(|a| format!("{a:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "Enter {}: {}: Total_LP: {} (of {} LP), Average_Grade of Area: {}",
                c.label, c.name, c.total_lp, c.ceiling, average
            );
        }
        println!("Enter E or exit to keep all tracks.");
        print!("> ");
        let _ = io::stdout().flush();

        match Self::read_line() {
            Some(input) => interpret_choice(&input, candidates),
            None => TrackChoice::Keep,
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Average of a PDF transcript, report next to it (transcript.csv)
  transcript-gpa transcript.pdf

  # Already extracted text, JSON report
  transcript-gpa transcript.txt -o ledger.json

  # Leave out elective track 3 without asking
  transcript-gpa --exclude-track 3 transcript.pdf

  # Project the average with a 1.7 thesis
  transcript-gpa --thesis-grade 1.7 transcript.pdf

  # Custom curriculum table
  transcript-gpa --curriculum msc.json transcript.pdf

  # Machine-readable output on stdout, no prompt
  transcript-gpa --json transcript.pdf > report.json

CURRICULUM FILE:
  {
    "areas": [{"name": "Informatik-Grundlagen", "lp": 46}, ...],
    "prefixes": ["INF", "MTH", "PHM"],
    "tracks": {"markers": ["2.", "3.", "4."], "candidates": 3},
    "thesis": {"lp": 12, "grade": 2.3}
  }
  `tracks` and `thesis` are optional.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory); otherwise the
                    system library search path is used
  RUST_LOG          Overrides the log level derived from --verbose/--quiet
"#;

/// Credit-weighted grade average from a university transcript.
#[derive(Parser, Debug)]
#[command(
    name = "transcript-gpa",
    version,
    about = "Compute a credit-weighted grade average from a transcript",
    long_about = "Read a transcript (PDF or extracted text), cap every curriculum area at its \
credit ceiling by discarding the worst grades first, and compute the weighted average. \
Optionally leave out one elective track and project the average with a thesis grade.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Transcript PDF or text file.
    input: PathBuf,

    /// Report file. Default: the input path with the format's extension.
    #[arg(short, long, env = "TRANSCRIPT_GPA_OUTPUT")]
    output: Option<PathBuf>,

    /// Report format. Default: from the --output extension, otherwise CSV.
    #[arg(long, env = "TRANSCRIPT_GPA_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// JSON curriculum table replacing the built-in one.
    #[arg(long, env = "TRANSCRIPT_GPA_CURRICULUM")]
    curriculum: Option<PathBuf>,

    /// Grade assumed for the thesis projection.
    #[arg(long, env = "TRANSCRIPT_GPA_THESIS_GRADE")]
    thesis_grade: Option<f64>,

    /// Credit of the thesis projection.
    #[arg(long, env = "TRANSCRIPT_GPA_THESIS_LP")]
    thesis_lp: Option<u32>,

    /// Leave out this elective track (e.g. 2, 3 or 4) without prompting.
    #[arg(long, env = "TRANSCRIPT_GPA_EXCLUDE_TRACK", conflicts_with = "no_prompt")]
    exclude_track: Option<String>,

    /// Never prompt; keep all elective tracks.
    #[arg(long, env = "TRANSCRIPT_GPA_NO_PROMPT")]
    no_prompt: bool,

    /// PDF user password for encrypted transcripts.
    #[arg(long, env = "TRANSCRIPT_GPA_PASSWORD")]
    password: Option<String>,

    /// Print the report as JSON on stdout instead of the summary lines.
    #[arg(long, env = "TRANSCRIPT_GPA_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TRANSCRIPT_GPA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRANSCRIPT_GPA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "TRANSCRIPT_GPA_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let curriculum = build_curriculum(&cli)?;

    let progress_callback: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let options = ExtractOptions {
        password: cli.password.clone(),
        progress_callback,
    };

    let mut selector: Box<dyn TrackSelector> = match cli.exclude_track {
        Some(ref label) => Box::new(ExcludeTrack(label.clone())),
        None if cli.no_prompt || cli.json || !io::stdin().is_terminal() => Box::new(KeepAllTracks),
        None => Box::new(ConsoleTrackSelector),
    };

    // ── Run evaluation ───────────────────────────────────────────────────
    let eval = evaluate_file(&cli.input, &curriculum, &options, selector.as_mut())
        .with_context(|| format!("Failed to evaluate {}", cli.input.display()))?;

    // ── Report ───────────────────────────────────────────────────────────
    let report = Report::from_evaluation(&eval);
    let format = resolve_format(&cli);

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_summary(&eval, cli.quiet);
    }

    let renderer = format.renderer();
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, renderer.extension()));
    write_report(&report, renderer.as_ref(), &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !cli.quiet {
        eprintln!("{}  report  →  {}", green("✔"), bold(&output_path.display().to_string()));
    }

    Ok(())
}

/// Load the curriculum table and apply the thesis overrides.
fn build_curriculum(cli: &Cli) -> Result<Curriculum> {
    let base = match cli.curriculum {
        Some(ref path) => Curriculum::from_json_file(path)
            .with_context(|| format!("Failed to load curriculum from {}", path.display()))?,
        None => Curriculum::default(),
    };

    let mut builder = base.into_builder();
    if let Some(grade) = cli.thesis_grade {
        builder = builder.thesis_grade(grade);
    }
    if let Some(lp) = cli.thesis_lp {
        builder = builder.thesis_lp(lp);
    }
    builder.build().context("Invalid configuration")
}

/// An explicit `--format` wins over the `--output` extension.
fn resolve_format(cli: &Cli) -> ReportFormat {
    match (cli.format, cli.output.as_deref()) {
        (Some(format), _) => format.into(),
        (None, Some(output)) => ReportFormat::from_path(output),
        (None, None) => ReportFormat::Csv,
    }
}

/// `transcript.pdf` → `transcript.csv`.
fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let candidate = input.with_extension(extension);
    if candidate == input {
        input.with_extension(format!("report.{extension}"))
    } else {
        candidate
    }
}

/// Averages on stdout, diagnostics on stderr.
fn print_summary(eval: &Evaluation, quiet: bool) {
    if !quiet {
        if let Some(ref name) = eval.excluded_track {
            eprintln!("{}  excluded track: {}", dim("·"), name);
        }
        let orphans = eval.skipped_count(SkipReason::OrphanSubject);
        if orphans > 0 {
            eprintln!(
                "{} {} subject line(s) appeared before any known area and were skipped",
                yellow("⚠"),
                orphans
            );
        }
    }

    match eval.totals {
        Ok(ref totals) => {
            println!("Average: {:.5}", totals.average());
            if let Some(ref p) = eval.projection {
                println!("Average with {} thesis: {:.5}", p.thesis.grade, p.average);
            }
            if !quiet {
                eprintln!(
                    "{}",
                    dim(&format!(
                        "   {} LP counted, weighted sum {:.2}",
                        totals.total_lp, totals.weighted_grade
                    ))
                );
            }
        }
        Err(ref e) => {
            eprintln!("{} average not available: {e}", yellow("⚠"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_replaces_extension() {
        assert_eq!(
            default_output_path(Path::new("dir/transcript.pdf"), "csv"),
            PathBuf::from("dir/transcript.csv")
        );
        assert_eq!(
            default_output_path(Path::new("ledger.csv"), "csv"),
            PathBuf::from("ledger.report.csv")
        );
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "transcript-gpa",
            "--thesis-grade",
            "1.7",
            "--exclude-track",
            "3",
            "--format",
            "json",
            "t.pdf",
        ])
        .unwrap();
        assert_eq!(cli.thesis_grade, Some(1.7));
        assert_eq!(cli.exclude_track.as_deref(), Some("3"));
        assert!(matches!(cli.format, Some(FormatArg::Json)));
        let c = build_curriculum(&cli).unwrap();
        assert_eq!(c.thesis.grade, 1.7);
    }

    #[test]
    fn format_follows_output_extension() {
        let cli = Cli::try_parse_from(["transcript-gpa", "-o", "ledger.json", "t.pdf"]).unwrap();
        assert_eq!(resolve_format(&cli), ReportFormat::Json);

        let cli = Cli::try_parse_from(["transcript-gpa", "-o", "LEDGER.JSON", "t.pdf"]).unwrap();
        assert_eq!(resolve_format(&cli), ReportFormat::Json);

        let cli = Cli::try_parse_from(["transcript-gpa", "-o", "ledger.txt", "t.pdf"]).unwrap();
        assert_eq!(resolve_format(&cli), ReportFormat::Csv);
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let cli = Cli::try_parse_from([
            "transcript-gpa",
            "--format",
            "csv",
            "-o",
            "ledger.json",
            "t.pdf",
        ])
        .unwrap();
        assert_eq!(resolve_format(&cli), ReportFormat::Csv);
    }

    #[test]
    fn format_defaults_to_csv() {
        let cli = Cli::try_parse_from(["transcript-gpa", "t.pdf"]).unwrap();
        assert_eq!(resolve_format(&cli), ReportFormat::Csv);
    }

    #[tokio::test]
    async fn interrupt_abandons_a_blocked_read() {
        let line = spawn_line_reader(|| loop {
            std::thread::park();
        })
        .unwrap();
        assert_eq!(first_line_or_interrupt(line, std::future::ready(())).await, None);
    }

    #[tokio::test]
    async fn typed_line_is_returned() {
        let line = spawn_line_reader(|| Some("3\n".to_string())).unwrap();
        let read = first_line_or_interrupt(line, std::future::pending()).await;
        assert_eq!(read.as_deref(), Some("3\n"));
    }

    #[tokio::test]
    async fn end_of_input_keeps_all_tracks() {
        let line = spawn_line_reader(|| None).unwrap();
        assert_eq!(first_line_or_interrupt(line, std::future::pending()).await, None);
    }

    #[test]
    fn exclude_track_conflicts_with_no_prompt() {
        assert!(Cli::try_parse_from([
            "transcript-gpa",
            "--exclude-track",
            "3",
            "--no-prompt",
            "t.pdf"
        ])
        .is_err());
    }
}
