//! pdfextractor CLI - export PDF pages to images, text layers, and JSON

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use md5::{Digest, Md5};

use pdfextractor::{
    load_file, ExtractOptions, Extractor, JsonFormat, LineBreakMode, PageRange, PdfDocument,
    PdfPage, PipelineEvent, ScalePolicy, TextLayerOptions,
};

#[derive(Parser)]
#[command(name = "pdfextractor")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Export PDF pages to PNG, SVG, HTML text layers, text, and JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    export: ExportArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ExportArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory (default: ./output/<md5 of the input>)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Process at most this many pages
    #[arg(short, long, value_name = "N")]
    limit: Option<u32>,

    /// Page range (e.g., "2-5", "3-", "all")
    #[arg(long)]
    pages: Option<String>,

    /// Canvas scale for PNG, HTML, and text output
    #[arg(long, default_value = "1.5")]
    zoom: f64,

    /// Scale for SVG output
    #[arg(long, default_value = "1.0")]
    svg_zoom: f64,

    /// Fit the long edge of each page to this many pixels (overrides --zoom)
    #[arg(long, value_name = "PX")]
    max_edge: Option<f64>,

    /// Render PNGs at this multiple of the canvas scale
    #[arg(long, value_name = "FACTOR")]
    hires: Option<f64>,

    /// Also write JPEG images
    #[arg(long)]
    jpeg: bool,

    /// Skip PNG output
    #[arg(long)]
    no_png: bool,

    /// Skip SVG output
    #[arg(long)]
    no_svg: bool,

    /// Skip HTML text layers
    #[arg(long)]
    no_html: bool,

    /// Skip plain text
    #[arg(long)]
    no_text: bool,

    /// Break plain text lines with newlines instead of spaces
    #[arg(long)]
    newlines: bool,

    /// Write HTML text layers without the wrapping element
    #[arg(long)]
    inner_html: bool,

    /// Pretty-print info.json
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.export.input.clone() {
            Some(input) => cmd_export(&input, &cli.export),
            None => {
                println!("{}", "Usage: pdfextractor <FILE> [OUTPUT]".yellow());
                println!("       pdfextractor --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output_dir(input: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let hash = Md5::digest(&data);
    Ok(PathBuf::from("output").join(format!("{:x}", hash)))
}

fn page_range(args: &ExportArgs) -> Result<PageRange, Box<dyn std::error::Error>> {
    let mut range = match args.pages.as_deref() {
        Some(pages) => PageRange::parse(pages)?,
        None => PageRange::all(),
    };
    if let Some(limit) = args.limit {
        let last = range.start.saturating_add(limit.max(1) - 1);
        range.end = Some(range.end.map_or(last, |end| end.min(last)));
    }
    Ok(range)
}

fn options(args: &ExportArgs) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new()
        .with_png(!args.no_png)
        .with_svg(!args.no_svg)
        .with_html(!args.no_html)
        .with_text(!args.no_text)
        .with_jpeg(args.jpeg)
        .with_canvas_zoom(args.zoom)
        .with_svg_zoom(args.svg_zoom)
        .with_pages(page_range(args)?)
        .with_html_options(TextLayerOptions {
            inner_html: args.inner_html,
            layer_dimensions: true,
        });

    if let Some(px) = args.max_edge {
        options = options.with_scale_policy(ScalePolicy::max_edge(px));
    }
    if let Some(factor) = args.hires {
        options = options.with_hi_res(factor);
    }
    if args.newlines {
        options = options.with_line_breaks(LineBreakMode::Newline);
    }
    if args.pretty {
        options = options.with_json_format(JsonFormat::Pretty);
    }
    Ok(options)
}

fn cmd_export(input: &Path, args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = match &args.output {
        Some(dir) => dir.clone(),
        None => default_output_dir(input)?,
    };
    fs::create_dir_all(&output_dir)?;
    log::debug!("Exporting {} into {}", input.display(), output_dir.display());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let mut extractor = Extractor::new(&output_dir, options(args)?).on_event(move |event| {
        match event {
            PipelineEvent::Started { selected, .. } => {
                bar.set_length(u64::from(*selected));
                bar.set_message("Rendering pages...");
            }
            PipelineEvent::PageStart { number } => bar.set_message(format!("Page {}", number)),
            PipelineEvent::PageEnd { .. } => bar.inc(1),
            PipelineEvent::Finalizing => bar.set_message("Writing summary..."),
            PipelineEvent::Finished => {}
        }
    });

    let summary = match extractor.extract_file(input) {
        Ok(summary) => summary,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done!");

    println!("\n{} {}", "Output:".green().bold(), output_dir.display());
    println!(
        "  {} {} of {} pages",
        "├─".dimmed(),
        pb.position(),
        summary.page_count
    );
    println!(
        "  {} canonical size {}x{}, {} exceptions",
        "├─".dimmed(),
        summary.dimensions.width,
        summary.dimensions.height,
        summary.dimensions.exceptions.len()
    );
    println!("  {} {} fonts", "├─".dimmed(), summary.fonts.len());
    println!("  {} info.json", "└─".dimmed());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;
    let metadata = doc.metadata()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), doc.format());
    println!("{}: {}", "Pages".bold(), doc.num_pages());

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if doc.num_pages() > 0 {
        let page = doc.get_page(1)?;
        let (width, height) = page.natural_size();
        println!("{}: {} x {} pt", "First page".bold(), width, height);
    }
    println!("{}: {}", "Bookmarks".bold(), doc.outline()?.total_items());

    let labels = doc.page_labels()?;
    if !labels.is_empty() {
        let preview: Vec<&str> = labels.iter().take(5).map(String::as_str).collect();
        println!("{}: {}", "Page labels".bold(), preview.join(", "));
    }
    println!("{}: {}", "Destinations".bold(), doc.destinations()?.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfextractor".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page export tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfextractor".dimmed());
    println!("License: MIT");
}
