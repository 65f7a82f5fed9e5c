//! # Etiqueta CLI
//!
//! Command-line interface for rendering label templates to PDF.
//!
//! ## Usage
//!
//! ```bash
//! # Render one label, filling placeholders from the command line
//! etiqueta render --template label.json --field lot=12345 --field code=ABC-001 -o label.pdf
//!
//! # One label per row of a comma-separated table, tiled on A4
//! etiqueta batch --template label.json --table rows.csv
//!
//! # Same, from a saved template on US Letter with a custom grid
//! etiqueta batch --store ./templates --id 6f1c... --table rows.csv --sheet letter --config sheet.toml
//!
//! # Manage saved templates
//! etiqueta templates save --store ./templates --name "Price tag" label.json
//! etiqueta templates list --store ./templates
//! ```
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) for layout and asset details.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use etiqueta::{
    EtiquetaError, FieldMap, SheetConfig, Template,
    document::{self, RenderOutput},
    store::{DirStore, TemplateStore},
    table::DataTable,
};

/// Etiqueta - Label template renderer
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the template comes from.
#[derive(Args, Debug)]
struct TemplateSource {
    /// Template JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "id")]
    template: Option<PathBuf>,

    /// Id of a saved template (needs --store)
    #[arg(long, requires = "store")]
    id: Option<String>,

    /// Template store directory
    #[arg(long, value_name = "DIR")]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a single label
    Render {
        #[command(flatten)]
        source: TemplateSource,

        /// Field value as NAME=VALUE (repeatable)
        #[arg(long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// Output PDF path (defaults to Labels_<timestamp>.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render one label per table row, tiled across sheets
    Batch {
        #[command(flatten)]
        source: TemplateSource,

        /// Comma-separated table; the first line names the fields
        #[arg(long, value_name = "FILE")]
        table: PathBuf,

        /// Sheet size: a4, letter, or WIDTHxHEIGHTmm
        #[arg(long, default_value = "a4")]
        sheet: String,

        /// TOML file overriding sheet and tile settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output PDF path (defaults to Labels_<timestamp>.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Manage saved templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand, Debug)]
enum TemplatesAction {
    /// List saved templates
    List {
        /// Template store directory
        #[arg(long, value_name = "DIR")]
        store: PathBuf,
    },

    /// Save a template file and print its id
    Save {
        /// Template store directory
        #[arg(long, value_name = "DIR")]
        store: PathBuf,

        /// Display name (defaults to the template's own name or the file stem)
        #[arg(long)]
        name: Option<String>,

        /// Template JSON file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.format_timestamp_millis().init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), EtiquetaError> {
    match command {
        Commands::Render {
            source,
            fields,
            output,
        } => {
            let template = load_template(&source)?;
            let fields = parse_fields(&fields)?;
            let result = document::render_single(&template, &fields)?;
            write_output(output, result)
        }

        Commands::Batch {
            source,
            table,
            sheet,
            config,
            output,
        } => {
            let template = load_template(&source)?;
            let table = DataTable::parse(&fs::read_to_string(&table)?)?;
            let mut sheet = SheetConfig::parse(&sheet)?;
            if let Some(path) = config {
                sheet = SheetConfig::load(&path, sheet)?;
            }
            let result = document::render_batch(&template, &table, &sheet)?;
            write_output(output, result)
        }

        Commands::Templates { action } => match action {
            TemplatesAction::List { store } => {
                let store = DirStore::open(store)?;
                let entries = store.list_all()?;
                if entries.is_empty() {
                    println!("No saved templates in {}", store.root().display());
                }
                for entry in entries {
                    println!("{}  {}", entry.id, entry.name);
                }
                Ok(())
            }
            TemplatesAction::Save { store, name, file } => {
                let json = fs::read_to_string(&file)?;
                // Refuse to store something that would fail at render time
                let template = Template::from_json(&json)?;
                let name = name
                    .or(template.name)
                    .unwrap_or_else(|| file_stem(&file));
                let mut store = DirStore::open(store)?;
                let id = store.save(&name, &json)?;
                println!("{}", id);
                Ok(())
            }
        },
    }
}

fn load_template(source: &TemplateSource) -> Result<Template, EtiquetaError> {
    match (&source.template, &source.id, &source.store) {
        (Some(path), _, _) => Template::from_json(&fs::read_to_string(path)?),
        (None, Some(id), Some(store)) => DirStore::open(store)?.load(id)?.template(),
        _ => Err(EtiquetaError::InputValidation(
            "Pass --template FILE or --store DIR --id ID".into(),
        )),
    }
}

/// Parse repeated `NAME=VALUE` arguments.
fn parse_fields(pairs: &[String]) -> Result<FieldMap, EtiquetaError> {
    let mut fields = FieldMap::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(EtiquetaError::InputValidation(format!(
                "Field '{}' is not NAME=VALUE",
                pair
            )));
        };
        fields.insert(name.trim(), value);
    }
    Ok(fields)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string())
}

fn default_output_name() -> PathBuf {
    PathBuf::from(format!(
        "Labels_{}.pdf",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn write_output(path: Option<PathBuf>, output: RenderOutput) -> Result<(), EtiquetaError> {
    let path = path.unwrap_or_else(default_output_name);
    fs::write(&path, &output.bytes)?;

    let report = &output.report;
    println!(
        "Wrote {} ({} label(s), {} page(s), {} bytes)",
        path.display(),
        report.labels(),
        report.pages,
        output.bytes.len()
    );
    if !report.issues.is_empty() {
        println!("{} element issue(s):", report.issues.len());
        for (label, issue) in &report.issues {
            println!("  label {}: {}", label, issue);
        }
    }
    Ok(())
}
