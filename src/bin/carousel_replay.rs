use std::env;
use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use planet_carousel::config::CarouselConfig;
use planet_carousel::replay::{load_fixture, run_fixture, ReplayOutput};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run_cli() {
        log::error!("[replay] error: {err:?}");
        std::process::exit(1);
    }
}

fn print_help() {
    eprintln!(
        "Usage: carousel_replay --fixture <path> [--config <path>] [--write-output <path>] [--check-golden <path>]\n\n\
         Options:\n  --fixture <path>        Timestamped input trace to replay (required)\n  \
         --config <path>         Carousel config JSON (defaults to built-in settings)\n  \
         --write-output <path>   Write the replay output JSON to a file\n  \
         --check-golden <path>   Compare the output against a golden JSON file\n  \
         -h, --help              Show this message"
    );
}

fn run_cli() -> Result<()> {
    let Some(opts) = parse_args()? else {
        return Ok(());
    };
    let config = match &opts.config {
        Some(path) => CarouselConfig::load(path)?,
        None => CarouselConfig::default(),
    };
    let fixture = load_fixture(&opts.fixture)?;
    let output = run_fixture(&fixture, &config)?;

    if let Some(path) = &opts.write_output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating output directory '{}'", parent.display()))?;
            }
        }
        let file =
            File::create(path).with_context(|| format!("writing replay output to '{}'", path.display()))?;
        serde_json::to_writer_pretty(file, &output).context("serializing replay output")?;
        println!("[replay] wrote {}", path.display());
    }

    if let Some(path) = &opts.check_golden {
        let file = File::open(path).with_context(|| format!("opening golden file '{}'", path.display()))?;
        let expected: ReplayOutput = serde_json::from_reader(file).context("parsing golden JSON")?;
        if expected != output {
            bail!(
                "golden mismatch for {} (use --write-output to refresh):\nexpected: {}\nactual:   {}",
                opts.fixture.display(),
                serde_json::to_string(&expected).unwrap_or_default(),
                serde_json::to_string(&output).unwrap_or_default(),
            );
        }
        println!("[replay] matched golden {}", path.display());
    } else if opts.write_output.is_none() {
        serde_json::to_writer_pretty(std::io::stdout(), &output)?;
        println!();
    }

    Ok(())
}

struct CliOptions {
    fixture: PathBuf,
    config: Option<PathBuf>,
    write_output: Option<PathBuf>,
    check_golden: Option<PathBuf>,
}

fn parse_args() -> Result<Option<CliOptions>> {
    let mut args = env::args().skip(1);
    let mut fixture = None;
    let mut config = None;
    let mut write_output = None;
    let mut check_golden = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fixture" => fixture = Some(PathBuf::from(args.next().context("--fixture requires a path")?)),
            "--config" => config = Some(PathBuf::from(args.next().context("--config requires a path")?)),
            "--write-output" => {
                write_output = Some(PathBuf::from(args.next().context("--write-output requires a path")?))
            }
            "--check-golden" => {
                check_golden = Some(PathBuf::from(args.next().context("--check-golden requires a path")?))
            }
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            other => return Err(anyhow!("Unknown argument '{other}'. Use --help for usage.")),
        }
    }
    let fixture = fixture.ok_or_else(|| anyhow!("--fixture is required"))?;
    Ok(Some(CliOptions { fixture, config, write_output, check_golden }))
}
