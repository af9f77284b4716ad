//! OpenAPI Transform CLI
//!
//! Command-line interface for transforming and inspecting OpenAPI documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use openapi_transform::{
    format_document, load_document_auto, resolve_references, Document, OutputFormat, Pipeline,
    StructuralPath, TransformConfig, TransformRegistry, VersionedDocument, Walker,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "openapi-tool")]
#[command(about = "Transform and inspect OpenAPI documents")]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Write logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the transforms of a configuration file to a document
    Transform {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Transform configuration (YAML)
        #[arg(long, short)]
        config: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format (default: same as the source, YAML for URLs)
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// Load a document and write it back out in canonical form
    Format {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format (default: same as the source, YAML for URLs)
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// Print the node at a structural path as JSON
    Inspect {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Colon separated path, e.g. components:schemas:Pet
        #[arg(long)]
        path: String,

        /// Inline local schema references and walk through them
        #[arg(long)]
        follow_refs: bool,
    },

    /// List the structural path and kind of every node
    Paths {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Only list paths below this colon separated prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Describe the installed transforms, or a configured pipeline
    Describe {
        /// Transform configuration (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    let result = match cli.command {
        Commands::Transform {
            document,
            config,
            output,
            format,
        } => run_transform(&document, &config, output, format),

        Commands::Format {
            document,
            output,
            format,
        } => run_format(&document, output, format),

        Commands::Inspect {
            document,
            path,
            follow_refs,
        } => run_inspect(&document, &path, follow_refs),

        Commands::Paths { document, prefix } => run_paths(&document, prefix.as_deref()),

        Commands::Describe { config } => run_describe(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run_transform(
    source: &str,
    config_path: &Path,
    output: Option<PathBuf>,
    format: Option<Format>,
) -> Result<(), u8> {
    let config = TransformConfig::load(config_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let pipeline = Pipeline::from_config(&TransformRegistry::builtin(), &config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut doc = load(source)?;
    pipeline.apply(&mut doc).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    write_document(&doc, source, output, format)
}

fn run_format(source: &str, output: Option<PathBuf>, format: Option<Format>) -> Result<(), u8> {
    let doc = load(source)?;
    write_document(&doc, source, output, format)
}

fn run_inspect(source: &str, path: &str, follow_refs: bool) -> Result<(), u8> {
    let mut doc = load_v3(source)?;
    if follow_refs {
        resolve_references(&mut doc);
    }

    let target = StructuralPath::parse(path);
    let mut found = None;
    Walker::new()
        .follow_refs(follow_refs)
        .visit_prefix(target.segments().iter().cloned())
        .walk::<serde_json::Error, _>(&mut doc, |path, _, node| {
            if !path.matches(target.segments()) {
                return Ok(true);
            }
            found = Some(node.to_value()?);
            Ok(false)
        })
        .map_err(|e| {
            eprintln!("Error serializing node: {}", e);
            2u8
        })?;

    let Some(value) = found else {
        eprintln!("Error: no node at {}", target);
        return Err(2);
    };
    let text = serde_json::to_string_pretty(&value).map_err(|e| {
        eprintln!("Error serializing node: {}", e);
        2u8
    })?;
    println!("{}", text);
    Ok(())
}

fn run_paths(source: &str, prefix: Option<&str>) -> Result<(), u8> {
    let mut doc = load_v3(source)?;

    let mut walker = Walker::new();
    if let Some(prefix) = prefix {
        walker = walker.visit_prefix(StructuralPath::parse(prefix).segments().iter().cloned());
    }
    let result = walker.walk(&mut doc, |path, _, node| {
        println!("{}\t{}", path, node.kind().name());
        Ok::<_, std::convert::Infallible>(true)
    });
    if let Err(never) = result {
        match never {}
    }
    Ok(())
}

fn run_describe(config_path: Option<&Path>) -> Result<(), u8> {
    let registry = TransformRegistry::builtin();

    let Some(config_path) = config_path else {
        let descriptions: Vec<String> = registry
            .iter()
            .map(|transform| format!("{}:\n{}", transform.name(), transform.describe()))
            .collect();
        print!("{}", descriptions.join("\n"));
        return Ok(());
    };

    let config = TransformConfig::load(config_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let pipeline = Pipeline::from_config(&registry, &config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    print!("{}", pipeline.describe());
    Ok(())
}

fn load(source: &str) -> Result<VersionedDocument, u8> {
    load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn load_v3(source: &str) -> Result<Document, u8> {
    match load(source)? {
        VersionedDocument::V3(doc) => Ok(*doc),
        VersionedDocument::V2(_) => {
            eprintln!("Error: {} is a Swagger 2.0 document; only OpenAPI 3 is supported", source);
            Err(2)
        }
    }
}

fn write_document(
    doc: &VersionedDocument,
    source: &str,
    output: Option<PathBuf>,
    format: Option<Format>,
) -> Result<(), u8> {
    let format = format
        .map(OutputFormat::from)
        .unwrap_or_else(|| OutputFormat::from_source(source));
    let text = format_document(doc, format).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &text).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            print!("{}", text);
        }
    }

    Ok(())
}
