//! Command-line interface for the descriptor mapper.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{parse_property_assignment, ParserConfig, StructuralErrorPolicy};
use crate::descriptor::Descriptor;
use crate::document::{read_document, save_document, write_document, DescriptorContext, DocumentKind};
use crate::error::Result;
use crate::model::{Application, ApplicationRuntime};
use crate::node::{Diagnostic, ParsedDocument};
use crate::yaml::generate_yaml;

/// Descriptor Mapper - Map XML deployment descriptors onto typed descriptors
/// and back.
#[derive(Parser)]
#[command(name = "descriptor-mapper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Drop subtrees with structural errors instead of failing
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Placeholder value as KEY=VALUE (repeatable)
    #[arg(long = "property", value_name = "KEY=VALUE", global = true)]
    pub properties: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a descriptor and report what was found.
    Parse {
        /// Descriptor file
        file: PathBuf,
    },

    /// Parse a descriptor and write it back as XML.
    Roundtrip {
        /// Descriptor file
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a descriptor and print it as YAML.
    Dump {
        /// Descriptor file
        file: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    execute(Cli::parse())
}

/// Execute parsed command-line arguments.
pub fn execute(cli: Cli) -> Result<()> {
    let ctx = DescriptorContext::new(build_config(&cli)?);

    match cli.command {
        Commands::Parse { file } => parse_command(&file, &ctx),
        Commands::Roundtrip { file, output } => roundtrip_command(&file, output.as_deref(), &ctx),
        Commands::Dump { file } => dump_command(&file, &ctx),
    }
}

/// Merge the configuration file with command-line overrides.
fn build_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };
    if cli.lenient {
        config.structural_errors = StructuralErrorPolicy::DropSubtree;
    }
    for assignment in &cli.properties {
        let (name, value) = parse_property_assignment(assignment)?;
        config.set_property(&name, &value)?;
    }
    Ok(config)
}

fn load(file: &Path, ctx: &DescriptorContext) -> Result<(DocumentKind, ParsedDocument)> {
    let xml = std::fs::read_to_string(file)?;
    let kind = DocumentKind::detect(&xml)?;
    tracing::debug!(file = %file.display(), kind = kind.name(), "Reading descriptor");
    let parsed = read_document(&xml, kind.root_node(), ctx)?;
    Ok((kind, parsed))
}

/// Execute the parse command.
fn parse_command(file: &Path, ctx: &DescriptorContext) -> Result<()> {
    let (kind, parsed) = load(file, ctx)?;

    println!(
        "{} {} from {}",
        style("Parsed").bold(),
        style(kind.name()).cyan(),
        style(file.display()).green()
    );
    for (label, count) in summary(parsed.descriptor.as_ref()) {
        println!("  {label}: {count}");
    }
    print_diagnostics(&parsed.diagnostics);
    Ok(())
}

/// Execute the roundtrip command.
fn roundtrip_command(file: &Path, output: Option<&Path>, ctx: &DescriptorContext) -> Result<()> {
    let (kind, parsed) = load(file, ctx)?;
    let xml = write_document(kind.root_node().as_ref(), parsed.descriptor.as_ref(), ctx)?;

    match output {
        Some(path) => {
            let saved = save_document(&xml, path)?;
            print_diagnostics(&parsed.diagnostics);
            println!(
                "{} {}",
                style("Saved to:").green().bold(),
                saved.display()
            );
        }
        None => print!("{xml}"),
    }
    Ok(())
}

/// Execute the dump command.
fn dump_command(file: &Path, ctx: &DescriptorContext) -> Result<()> {
    let (kind, parsed) = load(file, ctx)?;
    let descriptor = parsed.descriptor.as_ref();
    let yaml = match kind {
        DocumentKind::Application => descriptor
            .downcast_ref::<Application>()
            .map(generate_yaml)
            .transpose()?,
        DocumentKind::ApplicationRuntime => descriptor
            .downcast_ref::<ApplicationRuntime>()
            .map(generate_yaml)
            .transpose()?,
    };
    if let Some(yaml) = yaml {
        print!("{yaml}");
    }
    Ok(())
}

/// Counts of the collections held by a root descriptor.
fn summary(descriptor: &dyn Descriptor) -> Vec<(&'static str, usize)> {
    if let Some(application) = descriptor.downcast_ref::<Application>() {
        let environment = &application.environment;
        return vec![
            ("Modules", application.modules.len()),
            ("Security roles", application.security_roles.len()),
            ("Env entries", environment.env_entries.len()),
            ("EJB references", environment.ejb_references.len()),
            (
                "Resource references",
                environment.resource_references.len()
                    + environment.resource_env_references.len()
                    + environment.message_destination_references.len(),
            ),
            ("Resource definitions", application.resources.len()),
        ];
    }
    if let Some(runtime) = descriptor.downcast_ref::<ApplicationRuntime>() {
        return vec![
            ("Security role mappings", runtime.security_role_mappings.len()),
            ("References", runtime.references.len()),
            ("Properties", runtime.properties.len()),
            ("Extensions", runtime.extensions.len()),
        ];
    }
    Vec::new()
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("  Warnings: {}", style(diagnostics.len()).yellow().bold());
    for diagnostic in diagnostics {
        if diagnostic.is_error() {
            println!("    - {}", style(diagnostic).red());
        } else {
            println!("    - {diagnostic}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_roundtrip() {
        let cli = Cli::parse_from([
            "descriptor-mapper",
            "roundtrip",
            "application.xml",
            "-o",
            "out.xml",
        ]);

        let Commands::Roundtrip { file, output } = cli.command else {
            panic!("expected roundtrip command");
        };
        assert_eq!(file, PathBuf::from("application.xml"));
        assert_eq!(output, Some(PathBuf::from("out.xml")));
        assert!(!cli.lenient);
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::parse_from([
            "descriptor-mapper",
            "parse",
            "app.xml",
            "--lenient",
            "--property",
            "db.host=localhost",
            "--property",
            "db.port=5432",
        ]);

        assert!(cli.lenient);
        assert_eq!(cli.properties, vec!["db.host=localhost", "db.port=5432"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.structural_errors, StructuralErrorPolicy::DropSubtree);
        assert_eq!(config.properties.get("db.port").map(String::as_str), Some("5432"));
    }

    #[test]
    fn test_build_config_rejects_bad_property() {
        let cli = Cli::parse_from(["descriptor-mapper", "dump", "app.xml", "--property", "novalue"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_summary_counts() {
        let application = Application::default();
        let counts = summary(&application);
        assert_eq!(counts[0], ("Modules", 0));
        assert_eq!(counts.len(), 6);
    }
}
