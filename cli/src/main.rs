//! repage CLI - split tall PDF pages

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use repage::{
    to_json, ErrorMode, JsonFormat, PageSelection, PaginationReport, PdfSource, Repaginator,
    SplitOptions, TextGranularity,
};

#[derive(Parser)]
#[command(name = "repage")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Split tall PDF pages into A4-shaped pages", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split tall pages and write a new PDF
    Split {
        /// Input PDF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write the JSON report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the split plan as JSON without writing a PDF
    Plan {
        /// Input PDF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct TuningArgs {
    /// Target height / width ratio (default: A4, 297/210)
    #[arg(long, env = "REPAGE_ASPECT_RATIO")]
    aspect_ratio: Option<f32>,

    /// Fraction of the target height the cut may move to find whitespace
    #[arg(long, env = "REPAGE_TOLERANCE")]
    tolerance: Option<f32>,

    /// Sub-pages this short or shorter are dropped
    #[arg(long, value_name = "POINTS")]
    min_height: Option<f32>,

    /// Content unit for cut decisions
    #[arg(long, value_enum, default_value = "block")]
    granularity: Granularity,

    /// Ignore images when looking for whitespace
    #[arg(long)]
    no_images: bool,

    /// Page range to split (e.g., "1-10", "1,3,5"); other pages are copied
    #[arg(long)]
    pages: Option<String>,

    /// Abort on the first page that cannot be processed
    #[arg(long)]
    strict: bool,

    /// Plan pages one at a time
    #[arg(long)]
    sequential: bool,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
enum Granularity {
    /// Each text line is one content interval
    Line,
    /// Paragraph blocks are kept together
    #[default]
    Block,
}

impl From<Granularity> for TextGranularity {
    fn from(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Line => TextGranularity::Line,
            Granularity::Block => TextGranularity::Block,
        }
    }
}

impl TuningArgs {
    fn to_options(&self) -> Result<SplitOptions, Box<dyn std::error::Error>> {
        let mut options = SplitOptions::new()
            .with_granularity(self.granularity.into())
            .with_images(!self.no_images);

        if let Some(ratio) = self.aspect_ratio {
            options = options.with_aspect_ratio(ratio);
        }
        if let Some(tolerance) = self.tolerance {
            options = options.with_tolerance(tolerance);
        }
        if let Some(height) = self.min_height {
            options = options.with_min_subpage_height(height);
        }
        if let Some(p) = &self.pages {
            let selection =
                PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
            options = options.with_pages(selection);
        }
        if self.strict {
            options = options.with_error_mode(ErrorMode::Strict);
        }
        if self.sequential {
            options = options.sequential();
        }

        log::debug!("Split options: {:?}", options);
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Split {
            input,
            output,
            report,
            tuning,
        }) => cmd_split(&input, &output, report.as_deref(), &tuning),
        Some(Commands::Plan {
            input,
            compact,
            tuning,
        }) => cmd_plan(&input, compact, &tuning),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match (cli.input, cli.output) {
            (Some(input), Some(output)) => {
                cmd_split(&input, &output, None, &TuningArgs::default())
            }
            (Some(input), None) => {
                let output = default_output(&input);
                cmd_split(&input, &output, None, &TuningArgs::default())
            }
            _ => {
                println!("{}", "Usage: repage <INPUT> [OUTPUT]".yellow());
                println!("       repage --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `scroll.pdf` becomes `scroll_paged.pdf` next to it.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_paged.pdf", stem))
}

fn cmd_split(
    input: &Path,
    output: &Path,
    report_path: Option<&Path>,
    tuning: &TuningArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let repaginator = Repaginator::new(tuning.to_options()?)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Loading PDF...");
    let source = PdfSource::open(input)?;
    pb.inc(1);

    pb.set_message(format!("Splitting {} pages...", source.page_count()));
    let report = repaginator.split_source(source, output)?;
    pb.inc(1);

    if let Some(path) = report_path {
        pb.set_message("Writing report...");
        fs::write(path, to_json(&report, JsonFormat::Pretty)?)?;
    }
    pb.inc(1);
    pb.finish_with_message("Done!");

    print_summary(&report);
    println!("{} {}", "Saved to".green(), output.display());
    if let Some(path) = report_path {
        println!("{} {}", "Report".green(), path.display());
    }

    Ok(())
}

fn cmd_plan(
    input: &Path,
    compact: bool,
    tuning: &TuningArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let repaginator = Repaginator::new(tuning.to_options()?)?;
    let report = repaginator.plan_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", to_json(&report, format)?);

    Ok(())
}

fn print_summary(report: &PaginationReport) {
    let totals = &report.totals;

    println!("\n{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Source pages".bold(), totals.source_pages);
    println!("{}: {}", "Split".bold(), totals.split_pages);
    println!("{}: {}", "Unchanged".bold(), totals.pass_through_pages);
    println!("{}: {}", "Output pages".bold(), totals.output_pages);

    if totals.rejected_rects > 0 {
        println!(
            "{}: {}",
            "Dropped (too short)".yellow().bold(),
            totals.rejected_rects
        );
    }
    if totals.failed_rects > 0 {
        println!("{}: {}", "Failed".red().bold(), totals.failed_rects);
        for page in &report.pages {
            for rect in page.rects.iter().filter(|r| !r.is_ok()) {
                println!(
                    "  {} page {} {:.1}-{:.1}",
                    "└─".dimmed(),
                    page.page_number,
                    rect.rect.top,
                    rect.rect.bottom
                );
            }
        }
    }
}

fn cmd_version() {
    println!("{} {}", "repage".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Content-aware PDF page splitter");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/repage".dimmed());
    println!("License: MIT");
}
