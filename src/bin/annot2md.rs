//! CLI binary for annot2md.
//!
//! A thin shim over the library crate that maps CLI flags to an
//! `ExportJob` + `ExportConfig` and prints results.

use annot2md::{
    export_json, load_config_file, ExportConfig, ExportJob, ExportProgressCallback, LinkStyle,
    ProgressCallback,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the annotation batch plus one log
/// line per rendered annotation and relocated image.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>3}/{len} annotations",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Exporting");
        Arc::new(Self { bar })
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, total_annotations: usize) {
        self.bar.set_length(total_annotations as u64);
    }

    fn on_annotation_rendered(&self, index: usize, total: usize, kind: &str, fragment_len: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<9} {}",
            green("✓"),
            index + 1,
            total,
            kind,
            dim(&format!("{fragment_len:>5} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_annotation_skipped(&self, index: usize, total: usize, kind: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<9} {}",
            dim("·"),
            index + 1,
            total,
            kind,
            dim("skipped"),
        ));
        self.bar.inc(1);
    }

    fn on_image_relocated(&self, from: &Path, to: &Path) {
        self.bar.println(format!(
            "    {} {} → {}",
            cyan("↪"),
            dim(&from.display().to_string()),
            to.display()
        ));
    }

    fn on_export_complete(&self, _output_path: &Path, _appended_bytes: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r####"EXAMPLES:
  # Append page 3's annotations to paper.md next to the PDF
  annot2md '[{"type":"highlight","annotatedText":"Key idea","comment":"###"}]' paper.pdf -p 3

  # Read annotations from a file, move images into the vault's assets folder
  annot2md @page3.json paper.pdf -p 3 -o vault/paper.md --image-dir vault/assets

  # Read annotations from stdin, Obsidian embeds
  extract-annots paper.pdf 3 | annot2md - paper.pdf -p 3 --link-style obsidian

  # Stage into a temp file but link images relative to the final note
  annot2md @a.json paper.pdf -p 3 -o /tmp/stage.md --final-output vault/paper.md

ANNOTATION FORMAT:
  A JSON array of objects with "type" (highlight | text | image),
  "annotatedText", "comment" and "imagePath". Unknown types are ignored.

  A highlight whose comment is only '#' characters becomes a heading.
  "[](lnk)" in text becomes a link to the annotated page of the PDF.

CONFIG FILE:
  link_style = obsidian      # or markdown
  image_captions = yes       # render image comments under the link
"####;

/// Append PDF annotations to a Markdown file.
#[derive(Parser, Debug)]
#[command(
    name = "annot2md",
    version,
    about = "Append PDF annotations (highlights, notes, images) to a Markdown file",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Annotation JSON array, `@path` to read it from a file, or `-` for stdin.
    annotations: String,

    /// Source PDF the annotations came from.
    pdf: PathBuf,

    /// Page number the annotations belong to (1-indexed).
    #[arg(short, long, env = "ANNOT2MD_PAGE")]
    page: u32,

    /// Markdown file to append to. Default: `<pdf dir>/<pdf stem>.md`.
    #[arg(short, long, env = "ANNOT2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory extracted images are moved into. Must exist.
    /// Default: the output file's directory.
    #[arg(long, env = "ANNOT2MD_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Markdown file image links are relative to, when --output is a staging file.
    #[arg(long, env = "ANNOT2MD_FINAL_OUTPUT")]
    final_output: Option<PathBuf>,

    /// Image link style.
    #[arg(long, env = "ANNOT2MD_LINK_STYLE", value_enum, default_value = "markdown")]
    link_style: LinkStyleArg,

    /// Config file; its `link_style` overrides --link-style.
    #[arg(short, long, env = "ANNOT2MD_CONFIG")]
    config: Option<PathBuf>,

    /// Render an image annotation's comment below the image.
    #[arg(long, env = "ANNOT2MD_IMAGE_CAPTIONS")]
    image_captions: bool,

    /// Print the export report as JSON.
    #[arg(long, env = "ANNOT2MD_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "ANNOT2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANNOT2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ANNOT2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum LinkStyleArg {
    Markdown,
    Obsidian,
}

impl From<LinkStyleArg> for LinkStyle {
    fn from(v: LinkStyleArg) -> Self {
        match v {
            LinkStyleArg::Markdown => LinkStyle::Markdown,
            LinkStyleArg::Obsidian => LinkStyle::Obsidian,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let mode = ConsoleMode::from_cli(&cli);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(mode.filter)),
        )
        .with_writer(io::stderr)
        .init();

    if mode.echo_milestones {
        eprintln!("Received page number: {}", cli.page);
    }

    let json = read_annotations(&cli.annotations)?;

    let progress_cb: Option<ProgressCallback> = if mode.show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let job = build_job(&cli);

    let report = export_json(&job, &json, &config).context("Export failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    if !report.appended {
        if mode.echo_milestones {
            let name = cli
                .pdf
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            eprintln!("No annotations found in '{name}'. Exiting...");
        }
        return Ok(());
    }

    let stats = &report.output.stats;
    eprintln!(
        "{}  {} highlights  {} notes  {} images  {}",
        green("✔"),
        stats.highlights,
        stats.notes,
        stats.images,
        dim(&format!("{} ignored", stats.ignored)),
    );
    if mode.echo_milestones {
        eprintln!(
            "Output saved to: {}",
            bold(&report.output_path.display().to_string())
        );
    }

    Ok(())
}

/// How console output is split between tracing and the CLI's own lines.
///
/// The library logs "Received page number" and "Output saved to" at INFO.
/// The CLI echoes them itself only while INFO is filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConsoleMode {
    filter: &'static str,
    show_progress: bool,
    echo_milestones: bool,
}

impl ConsoleMode {
    fn from_cli(cli: &Cli) -> Self {
        // The progress bar covers per-annotation feedback; keep library logs
        // quiet while it is active.
        let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
        let filter = if cli.verbose {
            "debug"
        } else if cli.quiet || show_progress {
            "error"
        } else {
            "warn"
        };
        Self {
            filter,
            show_progress,
            echo_milestones: !cli.quiet && !cli.json && !cli.verbose,
        }
    }
}

/// Resolve the annotations argument to JSON text.
fn read_annotations(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read annotations from stdin")?;
        return Ok(buf);
    }
    if let Some(path) = arg.strip_prefix('@') {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read annotations from {:?}", path));
    }
    Ok(arg.to_string())
}

/// Map CLI args to `ExportConfig`, applying config-file overrides last.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .link_style(cli.link_style.clone().into())
        .image_captions(cli.image_captions);

    if let Some(ref path) = cli.config {
        let overrides = load_config_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?;
        builder = builder.overrides(&overrides);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI path args to an `ExportJob`.
fn build_job(cli: &Cli) -> ExportJob {
    let mut job = ExportJob::new(&cli.pdf, cli.page);
    if let Some(ref output) = cli.output {
        job = job.with_output_path(output);
    }
    if let Some(ref dir) = cli.image_dir {
        job = job.with_image_dir(dir);
    }
    if let Some(ref final_output) = cli.final_output {
        job = job.with_final_output_path(final_output);
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["annot2md", "[]", "paper.pdf", "-p", "3"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn milestones_come_from_exactly_one_source() {
        for args in [
            &[][..],
            &["--no-progress"][..],
            &["-v"][..],
            &["-v", "--no-progress"][..],
        ] {
            let mode = ConsoleMode::from_cli(&parse(args));
            let library_logs_info = matches!(mode.filter, "info" | "debug" | "trace");
            assert_ne!(
                mode.echo_milestones, library_logs_info,
                "args {args:?} gave {mode:?}"
            );
        }
    }

    #[test]
    fn quiet_and_json_print_no_milestones() {
        for args in [&["-q"][..], &["--json"][..]] {
            let mode = ConsoleMode::from_cli(&parse(args));
            assert!(!mode.echo_milestones);
            assert!(!matches!(mode.filter, "info" | "debug"));
            assert!(!mode.show_progress);
        }
    }

    #[test]
    fn page_zero_is_accepted_by_the_parser() {
        let cli = Cli::try_parse_from(["annot2md", "[]", "paper.pdf", "-p", "0"]).unwrap();
        assert_eq!(cli.page, 0);
    }

    #[test]
    fn link_style_arg_maps_to_library_enum() {
        let cli = parse(&["--link-style", "obsidian"]);
        assert_eq!(LinkStyle::from(cli.link_style), LinkStyle::Obsidian);
    }
}
