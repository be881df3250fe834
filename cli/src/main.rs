//! richdoc CLI - stored rich-text document renderer

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use richdoc::{
    builtin, JsonFormat, Node, ResolvedRegistry, Richdoc, RichdocResult, UnhandledPolicy,
};

#[derive(Parser)]
#[command(name = "richdoc")]
#[command(version)]
#[command(about = "Render stored Tiptap/ProseMirror documents to HTML and text", long_about = None)]
struct Cli {
    /// Input document file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML
    Render {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Class name of the document wrapper element
        #[arg(long, env = "RICHDOC_ROOT_CLASS", default_value = "tiptap-editor")]
        root_class: String,

        /// Render without sanitizing; unknown types become errors
        #[arg(long)]
        no_sanitize: bool,

        /// Handling of types without a renderer: fail or omit
        #[arg(
            long,
            env = "RICHDOC_UNHANDLED",
            value_parser = UnhandledPolicy::parse,
            default_value = "fail"
        )]
        unhandled: UnhandledPolicy,

        /// Refuse extension lists with duplicate names
        #[arg(long)]
        fail_on_duplicates: bool,
    },

    /// Render a document to plain text
    Text {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Handling of types without a renderer: fail or omit
        #[arg(
            long,
            env = "RICHDOC_UNHANDLED",
            value_parser = UnhandledPolicy::parse,
            default_value = "fail"
        )]
        unhandled: UnhandledPolicy,
    },

    /// Strip unknown node and mark types and print the document as JSON
    Sanitize {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            root_class,
            no_sanitize,
            unhandled,
            fail_on_duplicates,
        }) => {
            let mut builder = Richdoc::new()
                .with_root_class(root_class)
                .with_unhandled(unhandled);
            if no_sanitize {
                builder = builder.without_sanitize();
            }
            if fail_on_duplicates {
                builder = builder.fail_on_duplicates();
            }
            cmd_render(builder, &input, output.as_deref())
        }
        Some(Commands::Text {
            input,
            output,
            unhandled,
        }) => cmd_text(&input, output.as_deref(), unhandled),
        Some(Commands::Sanitize {
            input,
            output,
            compact,
        }) => cmd_sanitize(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: render if input is provided
            if let Some(input) = cli.input {
                cmd_render(Richdoc::new(), &input, None)
            } else {
                println!("{}", "Usage: richdoc <FILE>".yellow());
                println!("       richdoc --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(builder: Richdoc, input: &Path) -> Result<RichdocResult, Box<dyn std::error::Error>> {
    let result = builder.load_file(input)?;
    log::debug!(
        "Loaded {} node(s) from {}",
        result.document().node_count(),
        input.display()
    );
    Ok(result)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_render(
    builder: Richdoc,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = load(builder, input)?.to_html()?;
    write_output(output, &html)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    unhandled: UnhandledPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = Richdoc::new().with_unhandled(unhandled);
    let text = load(builder, input)?.to_text()?;
    write_output(output, &text)
}

fn cmd_sanitize(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (clean, report) = load(Richdoc::new(), input)?.sanitized();

    if !report.is_clean() {
        eprintln!(
            "{} {} node(s), {} mark(s), {} truncated subtree(s)",
            "Removed".yellow(),
            report.removed_nodes,
            report.removed_marks,
            report.truncated_subtrees
        );
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = richdoc::render::to_json(&clean, format)?;
    write_output(output, &json)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read_to_string(input)?;
    let status = stored_status(&data);
    let result = load(Richdoc::new(), input)?;
    let doc = result.document();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    match status {
        Ok(()) => println!("{}: {}", "Content".bold(), "valid".green()),
        Err(e) => println!(
            "{}: {} ({})",
            "Content".bold(),
            "malformed, using default document".yellow(),
            e
        ),
    }
    println!("{}: {}", "Nodes".bold(), doc.node_count());
    println!("{}: {}", "Marks".bold(), doc.mark_count());
    println!("{}: {}", "Depth".bold(), doc.depth());
    println!(
        "{}: {}",
        "Words".bold(),
        doc.text_content().split_whitespace().count()
    );
    println!(
        "{}: {}",
        "Types".bold(),
        doc.types().into_iter().collect::<Vec<_>>().join(", ")
    );

    println!();
    println!("{}", "Registry".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let registry = result.registry();
    println!("{}: {}", "Extensions".bold(), registry.len());
    if !registry.duplicates().is_empty() {
        println!(
            "{}: {}",
            "Duplicates".bold(),
            registry.duplicates().join(", ").yellow()
        );
    }

    let unknown = unknown_types(doc, registry);
    if !unknown.is_empty() {
        println!(
            "{}: {}",
            "Unknown types".bold(),
            unknown.join(", ").red()
        );
    }

    Ok(())
}

/// Check whether stored content parses without falling back.
fn stored_status(data: &str) -> richdoc::Result<()> {
    let encoded = match serde_json::from_str::<serde_json::Value>(data) {
        Ok(serde_json::Value::String(s)) => s,
        _ => data.to_string(),
    };
    richdoc::model::try_parse_document(&encoded).map(|_| ())
}

/// Node and mark types the sanitizer would remove.
fn unknown_types(doc: &Node, registry: &ResolvedRegistry) -> Vec<String> {
    let mut unknown = Vec::new();
    for node in doc.descendants().skip(1) {
        let name = node.type_name();
        if !registry.is_allowed_node(name) && !unknown.iter().any(|u| u == name) {
            unknown.push(name.to_string());
        }
        for mark in node.mark_list() {
            let name = mark.type_name();
            if !registry.is_allowed_mark(name) && !unknown.iter().any(|u| u == name) {
                unknown.push(name.to_string());
            }
        }
    }
    unknown.sort();
    unknown
}

fn cmd_version() {
    println!("{} {}", "richdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Stored rich-text document renderer");
    println!();
    let registry = ResolvedRegistry::resolve(&builtin::review_extensions());
    println!(
        "Node types: {}, mark types: {}",
        registry.allowed_node_types().len(),
        registry.allowed_mark_types().len()
    );
    println!("License: MIT");
}
