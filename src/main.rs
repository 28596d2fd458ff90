use clap::{Args, Parser as ClapParser, Subcommand, builder::NonEmptyStringValueParser};
use filter_expr::cli::{
    self, Backend, CheckOptions, CliError, CompileOptions, EvalOptions, parse_key_mapping,
};
use std::{
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "filterc")]
#[command(
    about = "Compile filter expressions to SQL or Elasticsearch, or evaluate them against JSON"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct KeyOptions {
    /// Prepended to every field as `PREFIX.field`
    #[arg(long, default_value = "")]
    prefix: String,

    /// Appended to every field as `field.SUFFIX`
    #[arg(long, default_value = "")]
    suffix: String,

    /// Rename a field before decoration (repeatable)
    #[arg(long = "key-map", value_name = "FROM=TO", value_parser = parse_key_mapping)]
    key_map: Vec<(String, String)>,

    /// JSON object of field renames
    #[arg(long)]
    key_map_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an expression into a query
    Compile {
        /// The filter expression
        expression: String,

        #[arg(short, long, value_enum, default_value_t = Backend::Sql)]
        backend: Backend,

        /// JSON column addressed by the json-sql backend
        #[arg(
            long,
            required_if_eq("backend", "json-sql"),
            value_parser = NonEmptyStringValueParser::new()
        )]
        column: Option<String>,

        #[command(flatten)]
        keys: KeyOptions,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Evaluate an expression against a JSON record
    Eval {
        /// The filter expression
        expression: String,

        /// JSON record (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        #[command(flatten)]
        keys: KeyOptions,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate an expression and print its normalised form
    Check {
        /// The filter expression
        expression: String,
    },

    /// List operators and the literal kinds each backend accepts
    Operators,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FILTER_EXPR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (expression, result) = match cli.command {
        Commands::Compile {
            expression,
            backend,
            column,
            keys,
            pretty,
        } => {
            let result = run_compile(&expression, backend, column, keys, pretty);
            (expression, result)
        }
        Commands::Eval {
            expression,
            input,
            keys,
            pretty,
        } => {
            let result = run_eval(&expression, input, keys, pretty);
            (expression, result)
        }
        Commands::Check { expression } => {
            let result = cli::execute_check(&CheckOptions {
                expression: expression.clone(),
            })
            .map(|normalised| {
                println!("Syntax is valid");
                println!("{}", normalised);
            });
            (expression, result)
        }
        Commands::Operators => {
            print!("{}", cli::operators_reference());
            (String::new(), Ok(()))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        if let CliError::Parse(parse) = &e {
            eprintln!("{}", cli::caret(&expression, parse.offset()));
        }
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_compile(
    expression: &str,
    backend: Backend,
    column: Option<String>,
    keys: KeyOptions,
    pretty: bool,
) -> Result<(), CliError> {
    let options = CompileOptions {
        expression: expression.to_string(),
        backend,
        prefix: keys.prefix,
        suffix: keys.suffix,
        key_map: cli::load_key_map(keys.key_map_file.as_deref(), &keys.key_map)?,
        column: column.unwrap_or_default(),
    };
    print_json(&cli::execute_compile(&options)?, pretty)
}

fn run_eval(
    expression: &str,
    input: Option<String>,
    keys: KeyOptions,
    pretty: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = EvalOptions {
        expression: expression.to_string(),
        input,
        prefix: keys.prefix,
        suffix: keys.suffix,
        key_map: cli::load_key_map(keys.key_map_file.as_deref(), &keys.key_map)?,
    };
    print_json(&cli::execute_eval(&options)?, pretty)
}
