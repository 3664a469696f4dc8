//! objmap CLI - Command-line tool for schema-driven JSON mapping
//!
//! This binary provides command-line interfaces for:
//! - parse: materialize a document against a schema type and print it back
//! - check: materialize a document and report only success or the error
//! - describe: list schema classes in the order the writer emits them

use clap::{Args, Parser, Subcommand};
use objmap_io::{
    Limits, Mapper, MapperError, MapperOptions, RecordPolicy, Schema, SchemaError, TypeDescriptor,
    Value,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "objmap")]
#[command(about = "Map JSON documents onto schema-described object graphs")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize a document and print its canonical rendering
    ///
    /// Examples:
    ///   objmap parse people.json --schema people.toml --type "[Person]"
    ///   cat doc.json | objmap parse - --type "[int]"
    Parse(DocumentArgs),
    /// Materialize a document and print only `ok` or the error
    Check(DocumentArgs),
    /// List schema classes and their emitted property order
    Describe {
        /// Schema file (.toml or .json)
        #[arg(long)]
        schema: PathBuf,
    },
}

#[derive(Args)]
struct DocumentArgs {
    /// Input document, or `-` for stdin
    input: PathBuf,
    /// Schema file (.toml or .json) declaring the classes in use
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Root type expression, e.g. `Person`, `[Person]`, `[[int]]`
    #[arg(long = "type")]
    ty: String,
    /// Fail when a record component is absent instead of using its zero value
    #[arg(long)]
    strict_records: bool,
    /// Maximum aggregate nesting depth
    #[arg(long, default_value_t = Limits::default().max_depth)]
    max_depth: usize,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Mapper(#[from] MapperError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Parse(args) => handle_parse(&args),
        Commands::Check(args) => handle_check(&args),
        Commands::Describe { schema } => handle_describe(&schema),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_schema(path: Option<&Path>) -> Result<Schema, CliError> {
    match path {
        Some(path) => {
            let schema = Schema::load(path)?;
            debug!(path = %path.display(), classes = schema.classes().count(), "loaded schema");
            Ok(schema)
        }
        None => Ok(Schema::default()),
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn materialize(args: &DocumentArgs) -> Result<(Mapper, Value), CliError> {
    let schema = load_schema(args.schema.as_deref())?;
    let root: TypeDescriptor = schema.type_of(&args.ty)?;
    let options = MapperOptions {
        limits: Limits {
            max_depth: args.max_depth,
        },
        record_policy: if args.strict_records {
            RecordPolicy::Strict
        } else {
            RecordPolicy::Lenient
        },
    };
    let mapper = Mapper::with_options(options)?;
    let text = read_input(&args.input)?;
    let value = mapper.parse(&text, &root)?;
    Ok((mapper, value))
}

fn handle_parse(args: &DocumentArgs) -> Result<ExitCode, CliError> {
    let (mapper, value) = materialize(args)?;
    let rendered = mapper.render(&value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_check(args: &DocumentArgs) -> Result<ExitCode, CliError> {
    match materialize(args) {
        Ok(_) => {
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(CliError::Mapper(err)) => {
            println!("{}", err);
            Ok(ExitCode::FAILURE)
        }
        Err(other) => Err(other),
    }
}

fn handle_describe(path: &Path) -> Result<ExitCode, CliError> {
    let schema = Schema::load(path)?;
    let mapper = Mapper::new();
    let mut stdout = io::stdout().lock();

    for (name, ty) in schema.classes() {
        let kind = match ty {
            TypeDescriptor::Bean(_) => "bean",
            _ => "record",
        };
        writeln!(stdout, "{} {}", kind, name)?;
        for generator in mapper.property_order(ty)?.iter() {
            writeln!(stdout, "  {}", generator.name())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
