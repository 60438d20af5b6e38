use clap::{Parser, Subcommand};
use env_logger::Env;
use prediction_ledger::{config, generate, intake, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "prediction-ledger")]
#[command(about = "Static site generator for a ledger of public predictions")]
#[command(long_about = "\
Static site generator for a ledger of public predictions

Authors and their predictions are plain-text records on disk. Each build
scores every verified prediction, rates authors, and renders a complete
multi-locale site.

Project structure:

  project/
  ├── config.toml                  # Optional, overrides stock defaults
  ├── data/
  │   ├── authors/1000/7.md        # Author records, bucketed by id
  │   └── posts/1000/42.md         # Prediction records
  └── ssg/aux/
      ├── locales.json             # UI strings per locale
      ├── assets/                  # → public/assets/
      ├── favicon/                 # → merged into public/
      ├── about/about.en.md        # About page (or about.en.html)
      ├── robots.txt
      └── CNAME

Record format:

  ### id
  42
  ### author-id
  7
  ### status
  awaiting
  ### statement.en
  Inflation falls below 3% by 2026.

Run 'prediction-ledger gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding config.toml and the record trees
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory, overriding `paths.output` from the config
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log every file read and written
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the full site into the output directory
    Build,
    /// Parse records and compute statistics without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Save an issue submission as the next numbered record
    Intake {
        /// Issue title carrying [NEW-PREDICTION] or [NEW-AUTHOR]
        #[arg(long, env = "ISSUE_TITLE")]
        title: String,
        /// Issue body, written verbatim as the record
        #[arg(long, env = "ISSUE_BODY")]
        body: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build => {
            let mut site_config = config::load_config(&cli.root)?;
            if let Some(output_dir) = cli.output {
                site_config.paths.output = output_dir;
            }
            println!("==> Building {}", cli.root.display());
            let report = generate::build(&cli.root, &site_config)?;
            output::print_build_output(&report, &cli.root);
            println!("==> Build complete: {}", report.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let corpus = generate::check(&cli.root, &site_config)?;
            output::print_check_output(&corpus, &site_config.default_locale, &cli.root);
            println!("==> Records are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Intake { title, body } => {
            let site_config = config::load_config(&cli.root)?;
            let saved = intake::save_submission(&cli.root, &site_config, &title, &body)?;
            println!("{}", saved.path.display());
        }
    }

    Ok(())
}

/// Route `log` output to stderr. `RUST_LOG` still wins when set.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}
