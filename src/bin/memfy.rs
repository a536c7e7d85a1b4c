use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "memfy", version, about = "Edit animated GIF memes")]
struct Cli {
    /// Log at debug level instead of warn.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print canvas size, frame count and durations.
    Info(InfoArgs),
    /// Write one edited frame as a PNG.
    Frame(FrameArgs),
    /// Apply edits and write `edited.gif`.
    Edit(EditArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    edits: EditFlags,
}

#[derive(Parser, Debug)]
struct EditArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    edits: EditFlags,

    /// Compositing worker threads (overrides the script).
    #[arg(long)]
    workers: Option<usize>,

    /// Encoder quality, 1 (best) to 30 (fastest) (overrides the script).
    #[arg(long)]
    quality: Option<i32>,

    /// Directory to write `edited.gif` into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct EditFlags {
    /// JSON edit script; its ops run before any flag edits.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Crop rectangle as `LEFT,TOP,WIDTH,HEIGHT`.
    #[arg(long, value_parser = parse_crop)]
    crop: Option<memfy::CropRect>,

    /// Convert every frame to grayscale.
    #[arg(long, default_value_t = false)]
    grayscale: bool,

    /// Text to overlay.
    #[arg(long)]
    text: Option<String>,

    /// Text anchor as `X,Y`.
    #[arg(long, value_parser = parse_point, default_value = "100,100")]
    at: memfy::Point,

    /// Font size in pixels.
    #[arg(long, default_value_t = 20.0)]
    font_size: f32,

    /// Font family list.
    #[arg(long, default_value = memfy::DEFAULT_FONT_FAMILY)]
    font_family: String,

    /// Text color (`#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`).
    #[arg(long, default_value = "#fff")]
    color: memfy::Rgba8,

    /// Directory with extra font files.
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn parse_numbers<const N: usize>(s: &str, what: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {what}, got '{s}'"));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{part}' in '{s}': {e}"))?;
    }
    Ok(out)
}

fn parse_crop(s: &str) -> Result<memfy::CropRect, String> {
    let [left, top, width, height] = parse_numbers::<4>(s, "LEFT,TOP,WIDTH,HEIGHT")?;
    Ok(memfy::CropRect::new(left, top, width, height))
}

fn parse_point(s: &str) -> Result<memfy::Point, String> {
    let [x, y] = parse_numbers::<2>(s, "X,Y")?;
    Ok(memfy::Point::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Edit(args) => cmd_edit(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let mut session = memfy::EditorSession::new();
    session.load_file(&args.in_path)?;
    let store = session
        .store()
        .context("gif loaded but no frames available")?;

    let canvas = store.canvas();
    println!("canvas: {}x{}", canvas.width, canvas.height);
    println!("frames: {}", store.len());
    println!("total_ms: {}", store.total_duration_ms());
    let durations: Vec<String> = store.durations_ms().iter().map(u32::to_string).collect();
    println!("durations_ms: {}", durations.join(","));
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (session, _script) = load_and_edit(&args.in_path, &args.edits)?;
    let frame = session.preview(args.index)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_edit(args: EditArgs) -> anyhow::Result<()> {
    let (session, script) = load_and_edit(&args.in_path, &args.edits)?;

    let mut opts = script.map(|s| s.encode_options()).unwrap_or_default();
    if let Some(workers) = args.workers {
        opts.workers = workers;
    }
    if let Some(quality) = args.quality {
        opts.quality = quality;
    }
    opts.asset_path = session.asset_dir().to_path_buf();

    let gif = session.export_in_background(opts)?.wait()?;
    let path = gif.write_to_dir(&args.out_dir)?;
    eprintln!("wrote {} ({})", path.display(), gif.media_type());
    Ok(())
}

/// Load `in_path`, then apply the script ops followed by crop, grayscale and text flags.
fn load_and_edit(
    in_path: &Path,
    edits: &EditFlags,
) -> anyhow::Result<(memfy::EditorSession, Option<memfy::EditScript>)> {
    let script = edits
        .script
        .as_deref()
        .map(memfy::EditScript::from_path)
        .transpose()?;

    // `frame` and `edit` read fonts from the same place: `--assets`, then the script's
    // export settings, then the default.
    let font_dir = edits
        .assets
        .clone()
        .or_else(|| {
            script
                .as_ref()
                .and_then(|s| s.export.as_ref())
                .map(|e| e.asset_path.clone())
        })
        .unwrap_or_else(|| memfy::EncodeOptions::default().asset_path);
    let mut session = memfy::EditorSession::new().with_asset_dir(font_dir);
    session.load_file(in_path)?;

    if let Some(script) = &script {
        script.apply(&mut session)?;
    }

    if let Some(rect) = &edits.crop {
        session.crop(rect)?;
    }
    if edits.grayscale {
        session.apply_grayscale()?;
    }
    if let Some(content) = &edits.text {
        let text = memfy::TextOverlay::new(content.clone(), edits.at, edits.font_size)
            .with_font_family(edits.font_family.clone())
            .with_color(edits.color);
        session.add_text(text)?;
    }

    Ok((session, script))
}
