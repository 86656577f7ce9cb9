use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ogcard", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one card to PNG or JPEG.
    Render(RenderArgs),
    /// Print the default render spec as JSON.
    Spec,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render spec JSON; flags below override its fields.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Title text.
    #[arg(long)]
    title: Option<String>,

    /// Author text.
    #[arg(long)]
    author: Option<String>,

    /// Background: hex color, image URL or asset name.
    #[arg(long)]
    bg: Option<String>,

    /// Avatar URL or asset name.
    #[arg(long)]
    ava: Option<String>,

    /// Logo URL or asset name.
    #[arg(long)]
    logo: Option<String>,

    /// Footer label drawn left of the logo.
    #[arg(long)]
    label: Option<String>,

    /// Footer label drawn in the bottom-right corner.
    #[arg(long)]
    trailing_label: Option<String>,

    /// Overlay opacity in [0, 1].
    #[arg(long)]
    op: Option<f64>,

    /// Canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height.
    #[arg(long)]
    height: Option<u32>,

    /// JPEG quality, 1..=100.
    #[arg(long)]
    quality: Option<u8>,

    /// Directory holding local assets.
    #[arg(long, default_value = "assets/images")]
    assets: PathBuf,

    /// Directory holding DejaVuSans.ttf, DejaVuSans-Bold.ttf, DejaVuMathTeXGyre.ttf and
    /// NotoEmoji-Regular.ttf.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Overall deadline for the render.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Output path; `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Spec => cmd_spec(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn cmd_spec() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ogcard::RenderSpec::default())
        .context("serialize default spec")?;
    println!("{json}");
    Ok(())
}

fn read_spec(path: &Path) -> anyhow::Result<ogcard::RenderSpec> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read spec '{}'", path.display()))?;
    Ok(ogcard::RenderSpec::from_json(&json)?)
}

fn build_spec(args: &RenderArgs) -> anyhow::Result<ogcard::RenderSpec> {
    let mut spec = match &args.spec {
        Some(path) => read_spec(path)?,
        None => ogcard::RenderSpec::default(),
    };

    if let Some(v) = &args.title {
        spec.title = v.clone();
    }
    if let Some(v) = &args.author {
        spec.author = v.clone();
    }
    if let Some(v) = &args.bg {
        spec.background = v.clone();
    }
    if let Some(v) = &args.ava {
        spec.avatar = Some(v.clone());
    }
    if let Some(v) = &args.logo {
        spec.logo = Some(v.clone());
    }
    if let Some(v) = &args.label {
        spec.label = Some(v.clone());
    }
    if let Some(v) = &args.trailing_label {
        spec.trailing_label = Some(v.clone());
    }
    if let Some(v) = args.op {
        spec.opacity = v;
    }
    if let Some(v) = args.width {
        spec.width = v;
    }
    if let Some(v) = args.height {
        spec.height = v;
    }
    if let Some(v) = args.quality {
        spec.quality = v;
    }

    spec.validate()?;
    Ok(spec)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = build_spec(&args)?;
    let timeout = Duration::from_secs(args.timeout_secs);

    let fetcher = ogcard::DefaultFetcher::new(
        ogcard::HttpFetcher::new().with_timeout(timeout),
        ogcard::LocalAssets::new(&args.assets),
    );
    let fonts = match &args.fonts {
        Some(dir) => ogcard::FontSet::from_dir(dir),
        None => ogcard::FontSet::default(),
    };
    let composer = ogcard::Composer::new(
        Arc::new(fetcher),
        Arc::new(ogcard::FontCache::new(fonts)),
    );

    let cancel = ogcard::CancelToken::with_timeout(timeout);
    let img = composer
        .render(&spec, &cancel)
        .context("render card")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_image(&img, &args.out, spec.quality)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

fn write_image(img: &image::RgbaImage, path: &Path, quality: u8) -> anyhow::Result<()> {
    if is_jpeg(path) {
        let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
        let file = File::create(path)
            .with_context(|| format!("create '{}'", path.display()))?;
        image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), quality)
            .encode_image(&rgb)
            .with_context(|| format!("write jpeg '{}'", path.display()))?;
    } else {
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
    }
    Ok(())
}
