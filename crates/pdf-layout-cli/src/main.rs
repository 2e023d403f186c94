mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_layout::{
    BookletOptions, LayoutJob, LayoutOperation, NupMode, NupOptions, PosterOptions,
    SectionSplitOptions, SplitMode,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfl", about = "PDF page layout CLI", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Arrange pages as a saddle-stitched booklet
    Booklet {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Edge carrying the spine
        #[arg(long, default_value = "left", value_enum)]
        spine: SpineArg,

        /// Gap between the two pages of a face, in points
        #[arg(long)]
        gutter: Option<f32>,

        /// Printer turns the sheet over the short edge
        #[arg(long)]
        short_edge: bool,

        /// Sheets are turned over by hand
        #[arg(long)]
        manual_duplex: bool,

        /// Which faces to emit
        #[arg(long, default_value = "both", value_enum)]
        pass: PassArg,

        /// Draw cell borders
        #[arg(long)]
        border: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Place several pages on each sheet
    Nup {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Pages per sheet: 2, 3 or a perfect square
        #[arg(short = 'n', long, default_value = "4")]
        pages_per_sheet: usize,

        /// Explicit grid rows (use with --cols)
        #[arg(long, requires = "cols")]
        rows: Option<usize>,

        /// Explicit grid columns (use with --rows)
        #[arg(long, requires = "rows")]
        cols: Option<usize>,

        /// Output paper size
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        /// Output orientation
        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,

        /// Order in which pages fill the grid
        #[arg(long, default_value = "lr-td", value_enum)]
        order: OrderArg,

        /// Draw cell borders
        #[arg(long)]
        border: bool,

        #[arg(long)]
        stats_only: bool,
    },

    /// Cut every page into sections
    Split {
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file; numbered per source page unless --merge
        #[arg(short, long)]
        output: PathBuf,

        /// Cuts across the page width
        #[arg(long, default_value = "0")]
        horizontal: usize,

        /// Cuts across the page height
        #[arg(long, default_value = "0")]
        vertical: usize,

        /// Write all sections to one document
        #[arg(long)]
        merge: bool,

        /// Pages to split [default: all, or custom when --pages is given]
        #[arg(long, value_enum)]
        mode: Option<SplitArg>,

        /// 1-based page list to split, e.g. "1,3,5-7"; implies --mode custom
        #[arg(long)]
        pages: Option<String>,

        #[arg(long)]
        stats_only: bool,
    },

    /// Enlarge every page across several sheets
    Poster {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Tiles across the page width
        #[arg(short = 'x', long, default_value = "2")]
        x_factor: usize,

        /// Tiles down the page height
        #[arg(short = 'y', long, default_value = "2")]
        y_factor: usize,

        /// Sheet size each tile is printed on
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,

        /// Emit tiles right to left
        #[arg(long)]
        rtl: bool,

        #[arg(long)]
        border: bool,

        #[arg(long)]
        stats_only: bool,
    },

    /// Run a job described by a JSON file
    Run {
        /// Job file
        job: PathBuf,

        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SpineArg {
    Left,
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum PassArg {
    Both,
    First,
    Second,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    LrTd,
    RlTd,
    TdLr,
    TdRl,
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    All,
    ExceptFirst,
    ExceptLast,
    ExceptFirstAndLast,
    Custom,
}

impl From<SpineArg> for pdf_layout::SpineLocation {
    fn from(arg: SpineArg) -> Self {
        match arg {
            SpineArg::Left => Self::Left,
            SpineArg::Right => Self::Right,
        }
    }
}

impl From<PassArg> for pdf_layout::DuplexPass {
    fn from(arg: PassArg) -> Self {
        match arg {
            PassArg::Both => Self::Both,
            PassArg::First => Self::First,
            PassArg::Second => Self::Second,
        }
    }
}

impl From<PaperArg> for pdf_layout::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for pdf_layout::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<OrderArg> for pdf_layout::PageOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::LrTd => Self::LrTd,
            OrderArg::RlTd => Self::RlTd,
            OrderArg::TdLr => Self::TdLr,
            OrderArg::TdRl => Self::TdRl,
        }
    }
}

/// A page list selects custom mode; combining it with another mode is an error
fn split_mode(arg: Option<SplitArg>, pages: Option<&str>) -> Result<SplitMode> {
    let mode = match (arg, pages) {
        (None, Some(_)) | (Some(SplitArg::Custom), _) => SplitMode::parse("CUSTOM", pages)?,
        (Some(_), Some(_)) => bail!("--pages can only be combined with --mode custom"),
        (None | Some(SplitArg::All), None) => SplitMode::All,
        (Some(SplitArg::ExceptFirst), None) => SplitMode::AllExceptFirst,
        (Some(SplitArg::ExceptLast), None) => SplitMode::AllExceptLast,
        (Some(SplitArg::ExceptFirstAndLast), None) => SplitMode::AllExceptFirstAndLast,
    };
    Ok(mode)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::StderrLogger::from_verbosity(cli.verbose).init()?;

    let (job, stats_only) = match cli.command {
        Commands::Booklet {
            input,
            output,
            spine,
            gutter,
            short_edge,
            manual_duplex,
            pass,
            border,
            stats_only,
        } => {
            let options = BookletOptions {
                add_border: border,
                spine_location: spine.into(),
                add_gutter: gutter.is_some(),
                gutter_size: gutter.unwrap_or_default(),
                double_sided: !manual_duplex,
                duplex_pass: pass.into(),
                flip_on_short_edge: short_edge,
                ..Default::default()
            };
            let job = LayoutJob {
                input,
                output,
                operation: LayoutOperation::Booklet(options),
            };
            (job, stats_only)
        }

        Commands::Nup {
            input,
            output,
            pages_per_sheet,
            rows,
            cols,
            paper,
            orientation,
            order,
            border,
            stats_only,
        } => {
            let mode = match (rows, cols) {
                (Some(rows), Some(cols)) => NupMode::Custom { rows, cols },
                _ => NupMode::PagesPerSheet(pages_per_sheet),
            };
            let options = NupOptions {
                mode,
                paper_size: paper.into(),
                orientation: orientation.into(),
                page_order: order.into(),
                add_border: border,
            };
            let job = LayoutJob {
                input,
                output,
                operation: LayoutOperation::MultiPage(options),
            };
            (job, stats_only)
        }

        Commands::Split {
            input,
            output,
            horizontal,
            vertical,
            merge,
            mode,
            pages,
            stats_only,
        } => {
            let options = SectionSplitOptions {
                horizontal_divisions: horizontal,
                vertical_divisions: vertical,
                merge,
                split_mode: split_mode(mode, pages.as_deref())?,
            };
            let job = LayoutJob {
                input,
                output,
                operation: LayoutOperation::SplitSections(options),
            };
            (job, stats_only)
        }

        Commands::Poster {
            input,
            output,
            x_factor,
            y_factor,
            paper,
            orientation,
            rtl,
            border,
            stats_only,
        } => {
            let options = PosterOptions {
                paper_size: paper.into(),
                orientation: orientation.into(),
                x_factor,
                y_factor,
                right_to_left: rtl,
                add_border: border,
            };
            let job = LayoutJob {
                input,
                output,
                operation: LayoutOperation::Poster(options),
            };
            (job, stats_only)
        }

        Commands::Run { job, stats_only } => {
            let loaded = LayoutJob::load(&job)
                .await
                .with_context(|| format!("loading job {}", job.display()))?;
            (loaded, stats_only)
        }
    };

    execute(job, stats_only).await
}

async fn execute(job: LayoutJob, stats_only: bool) -> Result<()> {
    job.operation.validate()?;

    let document = pdf_layout::load_pdf(&job.input)
        .await
        .with_context(|| format!("loading {}", job.input.display()))?;

    // Calculate and show statistics
    let source_pages = document.get_pages().len();
    let plans = pdf_layout::plan_layout(&document, &job.operation)?;
    println!("Layout Statistics:");
    println!("  Source pages: {}", source_pages);
    if let LayoutOperation::Booklet(options) = &job.operation {
        let stats = pdf_layout::booklet_statistics(source_pages, options)?;
        println!("  Sheets: {}", stats.sheets);
        println!("  Blank pages added: {}", stats.blank_pages_added);
    }
    println!("  Output documents: {}", plans.len());
    for (i, plan) in plans.iter().enumerate() {
        let stats = pdf_layout::plan_statistics(plan);
        println!(
            "  [{}] pages: {}, cells: {} ({} blank)",
            i + 1,
            stats.output_pages,
            stats.cells,
            stats.blank_cells
        );
    }

    if stats_only {
        return Ok(());
    }

    let documents = pdf_layout::run(&document, &job.operation).await?;
    for path in pdf_layout::save_all(documents, &job.output).await? {
        println!("Laid out → {}", path.display());
    }

    Ok(())
}
