use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tandem_tui::{
    app::{self, App},
    config::Config,
    session::Session,
    translate::{LANGUAGES, Language, default_language, language_by_code},
};

#[derive(Parser, Debug)]
#[command(name = "tandem", version, about = "Translate FTML and Markdown documents side by side")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a document in the two-pane viewer
    Open {
        file: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Translate the given selections without a terminal UI and save the result
    Apply {
        file: PathBuf,
        /// Text to translate, as shown in the viewer; repeat for more selections
        #[arg(short, long = "select", value_name = "TEXT", required = true)]
        selections: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List the supported target languages
    Languages,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Target language code, e.g. `vi` or `zh-CN`
    #[arg(short, long, value_name = "CODE")]
    target: Option<String>,
    /// Where to save the translation (default: `<name>.<code>.<ext>` next to the source)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Open { file, common } => open(&file, &common),
        Command::Apply {
            file,
            selections,
            common,
        } => apply(&file, &selections, &common),
        Command::Languages => {
            list_languages();
            Ok(())
        }
    }
}

fn open(file: &Path, common: &CommonArgs) -> Result<()> {
    let (config, target) = load_config(common)?;
    let _guard = init_file_logging(&config)?;

    let translator = config
        .translator()
        .context("failed to set up the translation service")?;
    let session = Session::open(file, translator, target)
        .with_context(|| format!("failed to open {}", file.display()))?;
    info!(path = %file.display(), language = target.code, "starting viewer");

    let mut viewer = App::new(session, common.output.clone());
    app::run(&mut viewer)
}

fn apply(file: &Path, selections: &[String], common: &CommonArgs) -> Result<()> {
    let (config, target) = load_config(common)?;
    init_stderr_logging(&config)?;

    let translator = config
        .translator()
        .context("failed to set up the translation service")?;
    let mut session = Session::open(file, translator, target)
        .with_context(|| format!("failed to open {}", file.display()))?;

    for selected in selections {
        match session.translate_selection(selected) {
            Ok(replacement) => {
                let paragraphs: Vec<String> = replacement
                    .paragraphs
                    .iter()
                    .map(|idx| idx.to_string())
                    .collect();
                println!(
                    "{:?}: {} (paragraphs {})",
                    selected.trim(),
                    replacement.strategy.label(),
                    paragraphs.join(", ")
                );
            }
            Err(err) if err.is_noop() => warn!("skipping blank selection"),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to translate {selected:?}"));
            }
        }
    }

    let output = common
        .output
        .clone()
        .unwrap_or_else(|| session.default_output_path());
    session
        .save_translation(&output)
        .context("failed to save the translation")?;
    println!("Saved {}", output.display());
    Ok(())
}

fn list_languages() {
    let default = default_language();
    for language in LANGUAGES {
        let marker = if language == default { " (default)" } else { "" };
        println!("{:<6} {}{marker}", language.code, language.name);
    }
}

fn load_config(common: &CommonArgs) -> Result<(Config, Language)> {
    let mut config = Config::load(common.config.as_deref()).context("failed to load config")?;
    config.apply_env(|name| std::env::var(name).ok());

    let target = match &common.target {
        Some(code) => language_by_code(code).ok_or_else(|| {
            anyhow!("unknown target language '{code}' (run `tandem languages` for the list)")
        })?,
        None => config.target().context("invalid target_language in config")?,
    };
    Ok((config, target))
}

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level))
}

/// The viewer owns the terminal, so logs go to a file.
fn init_file_logging(config: &Config) -> Result<WorkerGuard> {
    let log_path = config.log_file();
    let (Some(dir), Some(file_name)) = (log_path.parent(), log_path.file_name()) else {
        bail!("invalid log file path {}", log_path.display());
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install logger")?;
    Ok(guard)
}

fn init_stderr_logging(config: &Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install logger")
}
