use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, ValueEnum};
use palette_clash::{
    AntiMode, Extraction, SamplerConfig, analyze, extract_palette_from_bytes, to_css_variables,
    to_json_export,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// {mainColors, antiColors, timestamp} JSON
    Json,
    /// :root { --palette-N } stylesheet block
    Css,
    /// One swatch per line
    Text,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Anti {
    Complement,
    LowContrast,
}

impl From<Anti> for AntiMode {
    fn from(a: Anti) -> Self {
        match a {
            Anti::Complement => AntiMode::Complement,
            Anti::LowContrast => AntiMode::LowContrast,
        }
    }
}

/// Extract color palettes from images, build clashing counter-palettes and
/// score how well two images' palettes go together.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors per palette
    #[arg(short = 'k', long, default_value_t = 5)]
    n_colors: usize,

    /// Counter-palette to derive from each palette
    #[arg(short, long, value_enum, default_value_t = Anti::Complement)]
    anti: Anti,

    /// Seed for reproducible clustering
    #[arg(long)]
    seed: Option<u64>,

    /// Longest side the image is downscaled to before sampling
    #[arg(long, default_value_t = 300)]
    max_side: u32,

    /// Minimum alpha for a pixel to be sampled
    #[arg(long, default_value_t = 200)]
    min_alpha: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Compare the palettes of exactly two inputs instead of listing them
    #[arg(short, long)]
    compare: bool,

    /// Output directory; print to stdout when omitted
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Log progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn extract(path: &Path, args: &Args, rng: &mut StdRng) -> Result<Extraction> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let config = SamplerConfig {
        max_side: args.max_side,
        min_alpha: args.min_alpha,
        ..SamplerConfig::default()
    };
    let extraction = extract_palette_from_bytes(&bytes, args.n_colors, &config, rng)
        .with_context(|| format!("extracting palette from {}", path.display()))?;
    if extraction.is_degraded() {
        log::warn!(
            "{}: only {} usable pixels, palette lists distinct colors",
            path.display(),
            extraction.sample_count
        );
    }
    Ok(extraction)
}

fn render(extraction: &Extraction, args: &Args) -> Result<String> {
    let main = &extraction.swatches;
    let anti = AntiMode::from(args.anti).apply(main);
    Ok(match args.format {
        Format::Json => {
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            to_json_export(main, &anti, &timestamp)? + "\n"
        }
        Format::Css => to_css_variables(main),
        Format::Text => {
            let mut out = String::new();
            for (m, a) in main.iter().zip(&anti) {
                out.push_str(&format!("{m}  {:<18} anti {a}\n", m.rgb_label()));
            }
            out
        }
    })
}

fn emit(input: &Path, text: &str, args: &Args) -> Result<()> {
    let Some(dir) = &args.out_dir else {
        print!("{text}");
        return Ok(());
    };
    let ext = match args.format {
        Format::Json => "json",
        Format::Css => "css",
        Format::Text => "txt",
    };
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let out_path = dir.join(format!("{stem}.{ext}"));
    fs::create_dir_all(dir)?;
    fs::write(&out_path, text)?;
    println!("Saved → {}", out_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    if args.compare {
        let [first, second] = args.inputs.as_slice() else {
            bail!("--compare needs exactly two images, got {}", args.inputs.len());
        };
        let a = extract(first, &args, &mut rng)?;
        let b = extract(second, &args, &mut rng)?;
        let analysis = analyze(&a.swatches, &b.swatches).context("comparing palettes")?;

        match args.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
            _ => {
                println!("{}/100  {}", analysis.score, analysis.label);
                println!("{}", analysis.description);
                let bridges: Vec<String> =
                    analysis.bridge_colors.iter().map(|s| s.to_string()).collect();
                println!("bridges: {}", bridges.join(" "));
            }
        }
        return Ok(());
    }

    for input in &args.inputs {
        let extraction = extract(input, &args, &mut rng)?;
        let text = render(&extraction, &args)?;
        emit(input, &text, &args)?;
    }

    Ok(())
}
