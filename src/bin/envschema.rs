//! envschema CLI
//!
//! Validates env files against a schema and keeps derived artifacts in sync.
//!
//! Exit codes: 0 success, 1 validation or lint failure (or unknown key for
//! `explain`), 2 any load, I/O or configuration error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use envschema::codegen::{self, example, TypesLang};
use envschema::init::{init_project, InitOptions, StarterFormat};
use envschema::output::{redact_environment, render_result, render_values};
use envschema::{
    check, explain, gitignore, load_env_files, load_schema, CheckOptions, EnvSchemaError,
    OutputContext, SchemaLinter, ToolConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envschema")]
#[command(version, about = "Validate .env files against a schema")]
struct Cli {
    /// Config file to load in addition to the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate env files against the schema
    Check {
        /// Schema file (default from config)
        #[arg(short, long)]
        schema: Option<PathBuf>,
        /// Env files, later overriding earlier (repeatable)
        #[arg(short, long = "env")]
        env: Vec<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// CI mode: warnings fail the run
        #[arg(long)]
        ci: bool,
        /// Undeclared keys are errors
        #[arg(long)]
        strict: bool,
        /// Also print the merged values (secrets hidden)
        #[arg(long)]
        show_values: bool,
    },

    /// Compare the example file with the schema
    Sync {
        #[arg(short, long)]
        schema: Option<PathBuf>,
        /// Example file (default from config)
        #[arg(long)]
        example: Option<PathBuf>,
        /// Regenerate the example file
        #[arg(long, conflicts_with = "prune_example")]
        write_example: bool,
        /// Remove lines for undeclared keys, keeping everything else
        #[arg(long)]
        prune_example: bool,
    },

    /// Emit type declarations
    Types {
        #[arg(short, long)]
        schema: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = LangArg::Ts)]
        lang: LangArg,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Describe one key and, with env files, its current state
    Explain {
        key: String,
        #[arg(short, long)]
        schema: Option<PathBuf>,
        #[arg(short, long = "env")]
        env: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },

    /// Scaffold a schema, example file, declarations and config
    Init {
        /// Fluent validator-tree schema
        #[arg(long, visible_alias = "typescript", conflicts_with = "json")]
        fluent: bool,
        /// Declarative JSON schema (default)
        #[arg(long)]
        json: bool,
        #[arg(long)]
        no_example: bool,
        #[arg(long)]
        no_types: bool,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Static checks on the schema itself
    Lint {
        #[arg(short, long)]
        schema: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    Ts,
    Rust,
}

impl From<LangArg> for TypesLang {
    fn from(lang: LangArg) -> Self {
        match lang {
            LangArg::Ts => TypesLang::Ts,
            LangArg::Rust => TypesLang::Rust,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = ToolConfig::load_from(cli.config.as_deref())
        .map_err(EnvSchemaError::from)
        .context("loading configuration")?;
    let ctx = OutputContext::detect(config.output.color);

    match cli.command {
        Commands::Check {
            schema,
            env,
            json,
            ci,
            strict,
            show_values,
        } => {
            let schema = load_schema(&schema.unwrap_or_else(|| config.paths.schema.clone()))?;
            let env_paths = if env.is_empty() { config.paths.env_files.clone() } else { env };
            let loaded = load_env_files(&env_paths)?;

            if config.check.gitignore {
                let root = std::env::current_dir().context("resolving working directory")?;
                let existing = loaded.files.iter().filter(|f| f.exists).map(|f| f.path.as_path());
                for path in gitignore::unignored_files(&root, existing) {
                    eprintln!("warning: {} is not ignored by git", path.display());
                }
            }

            let options = CheckOptions {
                strict: strict || config.check.strict,
                fail_on_warnings: ci || config.check.fail_on_warnings,
            };
            let result = check(&loaded.merged, &schema, options);

            if json {
                let mut value = serde_json::to_value(&result)?;
                if show_values {
                    value["values"] = serde_json::to_value(redact_environment(&schema, &loaded.merged))?;
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", render_result(&ctx, &result));
                if show_values && !loaded.merged.is_empty() {
                    println!();
                    println!("{}", render_values(&ctx, &schema, &loaded.merged));
                }
            }

            Ok(exit_code(result.ok))
        }

        Commands::Sync {
            schema,
            example: example_path,
            write_example,
            prune_example,
        } => {
            let schema = load_schema(&schema.unwrap_or_else(|| config.paths.schema.clone()))?;
            let path = example_path.unwrap_or_else(|| config.paths.example.clone());
            let generated = codegen::render_example(&schema);
            let current = read_optional(&path)?;

            if write_example {
                write_file(&path, &generated)?;
                println!("Wrote {}", path.display());
                return Ok(ExitCode::SUCCESS);
            }

            let Some(current) = current else {
                println!("{} does not exist; run with --write-example to create it", path.display());
                return Ok(ExitCode::SUCCESS);
            };

            if prune_example {
                let (pruned, removed) = example::prune_example(&schema, &current);
                if removed.is_empty() {
                    println!("Nothing to prune in {}", path.display());
                } else {
                    write_file(&path, &pruned)?;
                    for key in &removed {
                        println!("Removed {}", key);
                    }
                }
                return Ok(ExitCode::SUCCESS);
            }

            let drift = example::example_drift(&schema, &current);
            for key in &drift.missing {
                println!("missing from example: {}", key);
            }
            for key in &drift.extra {
                println!("not in schema: {}", key);
            }
            let diff = example::diff_example(&current, &generated);
            if diff.is_empty() {
                println!("{} is up to date", path.display());
            } else {
                print!("{}", diff);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Types { schema, lang, out } => {
            let schema = load_schema(&schema.unwrap_or_else(|| config.paths.schema.clone()))?;
            let rendered = codegen::render_types(&schema, lang.into());
            match out {
                Some(path) => {
                    write_file(&path, &rendered)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => print!("{}", rendered),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Explain {
            key,
            schema,
            env,
            json,
        } => {
            let schema = load_schema(&schema.unwrap_or_else(|| config.paths.schema.clone()))?;
            let merged = if env.is_empty() {
                None
            } else {
                Some(load_env_files(&env)?.merged)
            };

            match explain(&schema, &key, merged.as_ref()) {
                Ok(explanation) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&explanation)?);
                    } else {
                        println!("{}", explanation.render());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(unknown) => {
                    if json {
                        let value = serde_json::json!({
                            "key": unknown.key,
                            "found": false,
                            "suggestions": unknown.suggestions,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    } else {
                        eprintln!("{}", unknown);
                        if !unknown.suggestions.is_empty() {
                            eprintln!("Did you mean: {}", unknown.suggestions.join(", "));
                        }
                    }
                    Ok(ExitCode::from(1))
                }
            }
        }

        Commands::Init {
            fluent,
            json: _,
            no_example,
            no_types,
            force,
        } => {
            let dir = std::env::current_dir().context("resolving working directory")?;
            let options = InitOptions {
                format: if fluent { StarterFormat::Fluent } else { StarterFormat::Declarative },
                write_example: !no_example,
                write_types: !no_types,
                force,
            };
            let report = init_project(&dir, options)?;
            for path in &report.written {
                println!("created {}", display_relative(&dir, path));
            }
            for path in &report.skipped {
                println!("skipped {} (exists; use --force to overwrite)", display_relative(&dir, path));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Lint { schema, json } => {
            let schema = load_schema(&schema.unwrap_or_else(|| config.paths.schema.clone()))?;
            let result = SchemaLinter::new().lint(&schema);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for error in &result.errors {
                    println!("  error {} {}: {}", error.code, error.key, error.message);
                }
                for warning in &result.warnings {
                    println!("  warning {} {}: {}", warning.code, warning.key, warning.message);
                }
                println!(
                    "{}: {} error(s), {} warning(s)",
                    result.schema,
                    result.errors.len(),
                    result.warnings.len()
                );
            }

            Ok(exit_code(result.is_clean()))
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// File contents, or `None` when the file does not exist
fn read_optional(path: &Path) -> envschema::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EnvSchemaError::FileRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: &str) -> envschema::Result<()> {
    std::fs::write(path, content).map_err(|source| EnvSchemaError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
