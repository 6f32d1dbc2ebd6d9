use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use tsql_render::{render_translate, Bindings, Dialect, Scalar, Value};

#[derive(Parser)]
#[command(name = "tsql-render")]
#[command(author, version, about = "SQL templating and dialect-translation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template and translate it into a target SQL dialect
    Render {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,

        /// Target dialect (e.g. oracle, postgresql, bigquery)
        #[arg(short, long)]
        dialect: String,

        /// Parameter binding, repeatable: --bind name=value
        #[arg(short, long = "bind")]
        bindings: Vec<String>,

        /// Schema to qualify emulated temp-table names with
        #[arg(short, long)]
        schema: Option<String>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            dialect,
            bindings,
            schema,
            verbose,
        } => {
            if verbose {
                println!("Reading template: {}", template.display());
            }
            let text = std::fs::read_to_string(&template)
                .with_context(|| format!("failed to read {}", template.display()))?;

            let target = Dialect::from_str(&dialect)?;
            let bindings = parse_bindings(&bindings)?;

            if verbose {
                println!("Rendering against {} binding(s)", bindings.len());
                println!("Translating to {target}");
            }

            let out = render_translate(&text, target, &bindings, schema.as_deref())?;
            println!("{out}");
        }
    }

    Ok(())
}

/// Parse `--bind name=value` flags into a binding map. Values that
/// parse as an integer or `TRUE`/`FALSE` are coerced accordingly;
/// everything else is a plain string. This is CLI-only convenience —
/// the library itself never guesses a binding's type.
fn parse_bindings(raw: &[String]) -> Result<Bindings> {
    let mut bindings = Bindings::new();
    for entry in raw {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --bind '{entry}', expected name=value"))?;
        bindings.insert(name.to_string(), Value::Scalar(coerce_scalar(value)));
    }
    Ok(bindings)
}

fn coerce_scalar(value: &str) -> Scalar {
    if value.eq_ignore_ascii_case("TRUE") {
        Scalar::Bool(true)
    } else if value.eq_ignore_ascii_case("FALSE") {
        Scalar::Bool(false)
    } else if let Ok(n) = value.parse::<i64>() {
        Scalar::Int(n)
    } else if let Ok(r) = value.parse::<f64>() {
        Scalar::Real(r)
    } else {
        Scalar::Str(value.to_string())
    }
}
