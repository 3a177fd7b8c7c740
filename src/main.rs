use clap::{Parser as ClapParser, Subcommand};
use gql_lang::cli::{self, CheckOptions, CheckResult, CliError, DEFAULT_MAX_LENGTH};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(ClapParser)]
#[command(name = "gql")]
#[command(about = "GQL - compile SQL-like datastore queries into query specifications")]
#[command(version)]
struct Cli {
    /// Log parsing and lowering at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// The GQL query (reads from stdin if not provided)
    query: Option<String>,

    /// Namespace the query runs in
    #[arg(short, long)]
    namespace: Option<String>,

    /// JSON file mapping kinds to property types
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Reject queries longer than this many characters
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate query syntax
    Check {
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Compile a query and print its specification as JSON
    Compile {
        #[command(flatten)]
        args: QueryArgs,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the normalized statement and its lowered form
    Explain {
        #[command(flatten)]
        args: QueryArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "gql_lang=debug"
    } else {
        "gql_lang=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let result = match cli.command {
        Commands::Check { args } => run(args, true).map(|_| println!("Syntax is valid")),
        Commands::Compile { args, pretty } => run(args, false).and_then(|result| {
            if let CheckResult::Compiled { query, .. } = result {
                let json = if pretty {
                    gql_lang::to_json_pretty(&query)?
                } else {
                    gql_lang::to_json(&query)?
                };
                println!("{}", json);
            }
            Ok(())
        }),
        Commands::Explain { args } => run(args, false).map(|result| {
            if let CheckResult::Compiled { parsed, query } = result {
                println!("{}", parsed);
                println!("{}", query);
            }
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: QueryArgs, syntax_only: bool) -> Result<CheckResult, CliError> {
    let query = match args.query {
        Some(q) => q,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let schema = args.schema.map(fs::read_to_string).transpose()?;

    let options = CheckOptions {
        query,
        namespace: args.namespace,
        schema,
        syntax_only,
        max_length: args.max_length,
    };
    cli::execute_check(&options)
}
