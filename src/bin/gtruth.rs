use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use gtruth::{Rect, Settings};

#[derive(Parser, Debug)]
#[command(name = "gtruth", version, about = "Bar and staff boxes for scanned scores, exported as MEI")]
struct Cli {
    /// Settings file (JSON). Missing fields use the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the width, height and resolution of a TIFF scan.
    Info {
        image: PathBuf,
    },
    /// Number bar boxes against staff boxes and write an MEI file.
    Export(ExportArgs),
    /// Print the bar boxes stored in an MEI file.
    Load {
        mei: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Source TIFF scan.
    #[arg(long)]
    image: PathBuf,

    /// Bar box as x,y,width,height. Repeat for each bar.
    #[arg(long = "bar", value_parser = parse_rect)]
    bars: Vec<Rect>,

    /// Staff box as x,y,width,height. Repeat for each staff.
    #[arg(long = "staff", value_parser = parse_rect)]
    staves: Vec<Rect>,

    /// Output MEI path. Notes go to the same path with a .txt extension.
    #[arg(long)]
    out: PathBuf,

    /// Notes text saved next to the MEI file.
    #[arg(long, default_value = "")]
    notes: String,

    /// Export even if some bars lie outside every staff box.
    #[arg(long)]
    force: bool,
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid box '{s}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] if *w >= 0.0 && *h >= 0.0 => Ok(Rect::new(*x, *y, *w, *h)),
        [_, _, _, _] => Err(format!("invalid box '{s}': width and height must not be negative")),
        _ => Err(format!("invalid box '{s}': expected x,y,width,height")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("read settings '{}'", path.display()))?,
        None => Settings::default(),
    };

    match cli.cmd {
        Command::Info { image } => cmd_info(&image, &settings),
        Command::Export(args) => cmd_export(args, &settings),
        Command::Load { mei } => cmd_load(&mei),
    }
}

fn cmd_info(image: &Path, settings: &Settings) -> anyhow::Result<()> {
    let info = gtruth::read_image_info(image, settings.default_dpi)
        .with_context(|| format!("read image '{}'", image.display()))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_export(args: ExportArgs, settings: &Settings) -> anyhow::Result<()> {
    let report = gtruth::export_file(
        &args.image,
        &args.bars,
        &args.staves,
        &args.out,
        &args.notes,
        settings,
        args.force,
    )
    .with_context(|| format!("export '{}'", args.out.display()))?;
    println!(
        "MEI saved to: {} ({} measures). Text saved to: {}",
        report.mei_path.display(),
        report.measures,
        report.notes_path.display()
    );
    Ok(())
}

fn cmd_load(mei: &Path) -> anyhow::Result<()> {
    let rects = gtruth::parse_mei_file(mei)
        .with_context(|| format!("load boxes from '{}'", mei.display()))?;
    println!("{}", gtruth::rects_to_json(&rects)?);
    Ok(())
}
