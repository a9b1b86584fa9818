use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;

use tool_events::{
    ConfigError, EventSnapshot, EventSummary, ReplayError, ReplayReader, ScanConfig, ToolEvent,
    ToolEventScanner, ToolPayload, ToolResult,
};
use tracing::{info, warn};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// JSONL transcript, one history update per line.
    pub transcript: PathBuf,

    /// TOML scanner config (e.g. a custom `abort_sentinel`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Append per-status and per-type counts to the table output.
    #[arg(long)]
    pub summary: bool,

    /// Fail on the first malformed transcript line instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open transcript `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read transcript `{path}`: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: ReplayError,
    },
    #[error("failed to serialize event log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub fn run(args: Args) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => ScanConfig::from_path(path)?,
        None => ScanConfig::default(),
    };
    let reader = ReplayReader::open(&args.transcript).map_err(|source| Error::Open {
        path: args.transcript.clone(),
        source,
    })?;

    let mut scanner = ToolEventScanner::new(config);
    for record in reader {
        match record.outcome {
            Ok(update) => {
                scanner.apply(update);
            }
            Err(source @ ReplayError::Io { .. }) => {
                return Err(Error::Transcript {
                    path: args.transcript.clone(),
                    source,
                });
            }
            Err(source) if args.strict => {
                return Err(Error::Transcript {
                    path: args.transcript.clone(),
                    source,
                });
            }
            Err(err) => warn!(line = err.line_number(), "skipping transcript line: {err}"),
        }
    }

    let snapshot = scanner.snapshot();
    info!(
        events = snapshot.summary.total,
        conversation = ?scanner.conversation(),
        "replay finished"
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
        writeln!(stdout)?;
    } else {
        stdout.write_all(render_table(&snapshot, args.summary).as_bytes())?;
    }
    Ok(())
}

fn render_table(snapshot: &EventSnapshot, with_summary: bool) -> String {
    let mut out = String::new();
    for (idx, event) in snapshot.events.iter().enumerate() {
        let _ = writeln!(out, "{}", render_event(idx + 1, event));
    }
    if with_summary {
        out.push_str(&render_summary(&snapshot.summary));
    }
    out
}

fn render_event(position: usize, event: &ToolEvent) -> String {
    let duration = event
        .duration_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{position:>3}  {:<8} {:<22} {duration:>8}  {}",
        event.status.as_str(),
        event.payload.type_label(),
        payload_detail(&event.payload),
    );
    if let Some(result) = &event.result {
        let _ = write!(line, "  => {}", result_detail(result));
    }
    line.trim_end().to_string()
}

fn payload_detail(payload: &ToolPayload) -> String {
    match payload {
        ToolPayload::Computer(computer) => {
            let mut parts = Vec::new();
            if let Some(coordinate) = computer.coordinate {
                parts.push(format!("({}, {})", coordinate.0, coordinate.1));
            }
            if let Some(text) = &computer.text {
                parts.push(format!("{text:?}"));
            }
            if let Some(direction) = computer.scroll_direction {
                let amount = computer.scroll_amount.unwrap_or(1.0);
                parts.push(format!("{direction:?} x{amount}").to_lowercase());
            }
            if let Some(duration) = computer.duration {
                parts.push(format!("{duration}s"));
            }
            parts.join(" ")
        }
        ToolPayload::Bash(bash) => format!("$ {}", bash.command),
        ToolPayload::Unknown(unknown) => {
            let keys: Vec<_> = unknown.raw.keys().map(String::as_str).collect();
            format!("keys=[{}]", keys.join(","))
        }
    }
}

fn result_detail(result: &ToolResult) -> String {
    match result {
        ToolResult::Text { text } => shorten(text, 60),
        ToolResult::Image { data } => format!("<image {} bytes>", data.len()),
        ToolResult::Aborted { text } => format!("aborted: {text}"),
        ToolResult::Unknown { raw } => shorten(&raw.to_string(), 60),
    }
}

fn render_summary(summary: &EventSummary) -> String {
    let mut out = format!(
        "\n{} events: {} running, {} success, {} aborted, {} error\n",
        summary.total, summary.running, summary.success, summary.aborted, summary.error
    );
    for (label, count) in &summary.by_type {
        let _ = writeln!(out, "  {label:<24} {count}");
    }
    out
}

fn shorten(text: &str, max_chars: usize) -> String {
    let flat = text.trim().replace('\n', "\\n");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut short: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
