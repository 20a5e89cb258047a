use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::{ArgAction, Parser};
use depend::{config::config::Config, engine::engine::Engine};
use tracing::Level;

/// Parses PHP sources into a declaration model and reports what was found.
#[derive(Parser, Debug)]
#[command(name = "depend", version, about)]
struct Cli {
    /// Files or directories to analyse
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Comma separated file suffixes to parse
    #[arg(long, value_delimiter = ',')]
    suffixes: Option<Vec<String>>,

    /// Regular expression of paths to skip, may be repeated
    #[arg(long)]
    exclude: Vec<String>,

    /// Ignore @package and @subpackage annotations
    #[arg(long)]
    without_annotations: bool,

    /// Print the resolved dependencies of every declared type
    #[arg(long)]
    dependencies: bool,

    /// More log output, repeat for trace level
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new().with_ignore_annotations(cli.without_annotations);
    if let Some(suffixes) = &cli.suffixes {
        config = config.with_suffixes(suffixes);
    }
    let config = match config.with_exclude(&cli.exclude) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let mut engine = Engine::new(config);
    let report = match engine.run(&cli.paths) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("Error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    println!("Parsed {} files in {:?}", report.files, start.elapsed());

    let builder = engine.builder_mut();
    for namespace in builder.namespaces() {
        if namespace.types().is_empty() && namespace.functions().is_empty() {
            continue;
        }
        println!(
            "{}: {} types, {} functions",
            namespace.name,
            namespace.types().len(),
            namespace.functions().len()
        );
    }

    if cli.dependencies {
        let declared: Vec<_> = builder
            .types()
            .iter()
            .filter(|declaration| declaration.user_defined)
            .map(|declaration| declaration.id)
            .collect();

        for id in declared {
            let resolved = builder.type_dependencies(id);
            let dependencies: Vec<String> = resolved
                .into_iter()
                .map(|dependency| builder.qualified_type_name(dependency))
                .collect();
            println!(
                "{} -> [{}]",
                builder.qualified_type_name(id),
                dependencies.join(", ")
            );
        }
    }

    if report.has_parse_errors() {
        eprintln!("\n{} files could not be parsed:", report.errors.len());
        for error in &report.errors {
            eprintln!("{}", error);
        }
    }

    ExitCode::SUCCESS
}
