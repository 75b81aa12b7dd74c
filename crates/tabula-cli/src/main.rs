//! Tabula CLI - inspect CSV files from the command line

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tabula::prelude::*;
use tabula::{column_letters, CharSource};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "CSV inspection tool")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print records as JSON lines
    Records {
        #[command(flatten)]
        read: ReadArgs,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the header's column names with their letters
    Header {
        #[command(flatten)]
        read: ReadArgs,
    },
}

#[derive(Args)]
struct ReadArgs {
    /// Input CSV file ("-" for stdin)
    input: PathBuf,

    /// Settings preset
    #[arg(short, long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Field separator (overrides the preset)
    #[arg(short, long)]
    separator: Option<char>,

    /// Where column names come from
    #[arg(long = "header", value_enum, default_value_t = HeaderMode::First)]
    header_mode: HeaderMode,

    /// Whitespace trimming for unquoted fields
    #[arg(short, long, value_enum, default_value_t = Trim::None)]
    trim: Trim,

    /// Field value to read as null
    #[arg(short, long)]
    null: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Comma separated, doubled quotes, terminator detected
    Default,
    /// Like default but only CRLF terminators
    Strict,
    /// Tab separated with backslash escapes
    Tab,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderMode {
    /// The first record holds the column names
    First,
    /// No header record; columns are named A, B, C, ...
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum Trim {
    None,
    Left,
    Right,
    Both,
}

impl From<Trim> for TrimMode {
    fn from(trim: Trim) -> Self {
        match trim {
            Trim::None => TrimMode::NONE,
            Trim::Left => TrimMode::LEFT,
            Trim::Right => TrimMode::RIGHT,
            Trim::Both => TrimMode::BOTH,
        }
    }
}

impl ReadArgs {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match self.preset {
            Preset::Default => Settings::default(),
            Preset::Strict => Settings::strict(),
            Preset::Tab => Settings::tab_escaped(),
        };
        if let Some(separator) = self.separator {
            settings = settings.with_separator(separator);
        }
        settings = settings.with_trim_mode(self.trim.into());
        if let Some(null) = &self.null {
            settings = settings.with_null_value(null.as_str());
        }

        settings.validate().context("Invalid settings")?;
        Ok(settings)
    }

    fn open(&self) -> Result<Box<dyn Read>> {
        if self.input == Path::new("-") {
            return Ok(Box::new(io::stdin().lock()));
        }
        let file = File::open(&self.input)
            .with_context(|| format!("Failed to open '{}'", self.input.display()))?;
        Ok(Box::new(file))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Records { read, limit } => records(&read, limit),
        Commands::Header { read } => header(&read),
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag
fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tabula={level},tabula_core={level},tabula_header={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose > 1)
                .with_level(true)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();

    tracing::debug!("logging initialized at level {level}");
}

fn records(args: &ReadArgs, limit: Option<usize>) -> Result<()> {
    let settings = args.settings()?;
    let input = args.open()?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let count = match args.header_mode {
        HeaderMode::First => {
            let mut reader = Reader::from_reader(input, &settings, &FirstRecord::new())
                .with_context(|| format!("Failed to read header of '{}'", args.input.display()))?;
            write_records(&mut reader, limit, &mut out)?
        }
        HeaderMode::None => {
            let mut reader = Reader::from_reader(input, &settings, &IndexPolicy)
                .with_context(|| format!("Failed to read '{}'", args.input.display()))?;
            write_records(&mut reader, limit, &mut out)?
        }
    };

    out.flush().context("Failed to write to stdout")?;
    tracing::info!("wrote {count} records from '{}'", args.input.display());
    Ok(())
}

fn write_records<S, H, W>(
    reader: &mut Reader<S, H>,
    limit: Option<usize>,
    out: &mut W,
) -> Result<usize>
where
    S: CharSource,
    H: Header,
    W: Write,
{
    let mut count = 0;
    for record in reader.records().take(limit.unwrap_or(usize::MAX)) {
        let record = record?;
        serde_json::to_writer(&mut *out, &record).context("Failed to write record")?;
        out.write_all(b"\n").context("Failed to write to stdout")?;
        count += 1;
    }
    Ok(count)
}

fn header(args: &ReadArgs) -> Result<()> {
    let settings = args.settings()?;
    let input = args.open()?;

    let names: Vec<String> = match args.header_mode {
        HeaderMode::First => Reader::from_reader(input, &settings, &FirstRecord::new())?
            .header()?
            .map(|h| h.names().to_vec())
            .unwrap_or_default(),
        HeaderMode::None => Reader::from_reader(input, &settings, &IndexPolicy)?
            .header()?
            .map(|h| h.names().to_vec())
            .unwrap_or_default(),
    };

    if names.is_empty() {
        eprintln!("Warning: '{}' has no records", args.input.display());
        return Ok(());
    }

    for (index, name) in names.iter().enumerate() {
        println!("{}\t{}", column_letters(index), name);
    }
    Ok(())
}
