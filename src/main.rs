//! # Hyperpad
//!
//! Command-line host for the hyperpad editing core.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the highlight spans of a file as JSON
//! cargo run -- highlight site/index.html
//!
//! # Preview a project in the browser
//! cargo run -- serve site --port 8080
//!
//! # See what a newline at the end of stdin would be indented with
//! printf '  if (x) {' | cargo run -- indent
//!
//! # Fetch with progress
//! cargo run -- git site fetch --remote origin
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hyperpad_core::{Config, Document, EditPipeline, PipelineConfig, Preferences};
use hyperpad_preview::{PreviewServer, PreviewState};
use hyperpad_syntax::{HighlightResult, Language, Theme};
use hyperpad_vcs::{Credentials, GitRepository, GitTask, Progress};
use serde_json::{Value, json};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Hyperpad - highlighting, auto-indent and preview for web files
#[derive(Parser, Debug)]
#[command(name = "hyperpad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the highlight spans of a file
    Highlight {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Language to use instead of the file extension
        #[arg(short, long)]
        language: Option<Language>,

        /// Use the dark palette
        #[arg(long)]
        dark: bool,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Serve a project directory for preview
    Serve {
        #[arg(value_name = "DIR")]
        root: PathBuf,

        #[arg(short, long)]
        port: Option<u16>,

        /// File served for `/`
        #[arg(long)]
        index: Option<String>,
    },

    /// Insert an auto-indented newline into stdin and print the result
    Indent {
        /// Char offset of the newline; defaults to the end of input
        #[arg(long)]
        at: Option<usize>,

        /// Indent unit; defaults to the configured one
        #[arg(long)]
        unit: Option<String>,
    },

    /// Run a network git operation on a project
    Git {
        #[arg(value_name = "DIR")]
        repo: PathBuf,

        #[arg(value_enum)]
        operation: GitOperation,

        /// Remote name; defaults to the configured one
        #[arg(short, long)]
        remote: Option<String>,

        #[arg(long, requires = "password")]
        username: Option<String>,

        #[arg(long, requires = "username")]
        password: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GitOperation {
    Fetch,
    Pull,
    Push,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting hyperpad v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Highlight {
            file,
            language,
            dark,
            format,
        } => {
            let language = language.or(config.editor.language);
            let document = match language {
                Some(language) => Document::open_as(&file, language),
                None => Document::open(&file),
            }
            .with_context(|| format!("failed to open {}", file.display()))?;

            let theme = Theme::for_dark_mode(dark || config.editor.dark_theme);
            let mut pipeline = EditPipeline::new(document, theme, PipelineConfig::from(&config.editor));
            let text = pipeline.document().text().into_owned();
            let result = pipeline.highlight_now();

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&spans_json(result))?),
                Format::Text => print!("{}", spans_text(&text, result)),
            }
        }
        Command::Serve { root, port, index } => {
            let index = index.unwrap_or_else(|| config.preview.index_file.clone());
            let addr = SocketAddr::new(config.preview.bind, port.unwrap_or(config.preview.port));
            let server = PreviewServer::start(PreviewState::new(root, &index), addr).await?;
            println!("Serving on http://{}", server.addr());

            tokio::signal::ctrl_c().await?;
            for entry in server.log().drain() {
                eprintln!("{entry}");
            }
            server.shutdown().await;
        }
        Command::Indent { at, unit } => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            let unit = unit.unwrap_or_else(|| config.editor.indent_unit.clone());
            print!("{}", indent_text(&input, at, &unit)?);
        }
        Command::Git {
            repo,
            operation,
            remote,
            username,
            password,
        } => {
            let repository = GitRepository::open(repo).with_program(config.vcs.git_program.clone());
            let remote = remote.unwrap_or_else(|| config.vcs.remote.clone());
            let credentials = username
                .zip(password)
                .map(|(username, password)| Credentials::new(username, password));

            let mut sink = |progress: &Progress| {
                eprintln!(
                    "{}: {}% ({}/{})",
                    progress.task, progress.percent, progress.current, progress.total
                );
            };
            let outcome = match operation {
                GitOperation::Fetch => {
                    GitTask::Fetch
                        .run(repository.fetch(&remote, credentials.as_ref(), &mut sink))
                        .await
                }
                GitOperation::Pull => {
                    GitTask::Pull
                        .run(repository.pull(&remote, credentials.as_ref(), &mut sink))
                        .await
                }
                GitOperation::Push => {
                    GitTask::Push
                        .run(repository.push(&remote, credentials.as_ref(), &mut sink))
                        .await
                }
            };

            if !outcome.success {
                anyhow::bail!("{}", outcome.message);
            }
            println!("{}", outcome.message);
        }
    }

    Ok(())
}

/// Loads the config file, then applies stored preferences on top.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    match Preferences::open_default() {
        Ok(prefs) => Ok(config.with_preferences(&prefs)),
        Err(err) => {
            tracing::warn!("Ignoring preferences: {}", err);
            Ok(config)
        }
    }
}

fn spans_json(result: &HighlightResult) -> Value {
    let spans: Vec<Value> = result
        .spans()
        .iter()
        .map(|span| {
            json!({
                "start": span.start,
                "end": span.end,
                "role": span.role.name(),
                "color": span.color.to_string(),
            })
        })
        .collect();
    json!({ "length": result.len_chars(), "spans": spans })
}

fn spans_text(text: &str, result: &HighlightResult) -> String {
    let chars: Vec<char> = text.chars().collect();
    result
        .spans()
        .iter()
        .map(|span| {
            let end = span.end.min(chars.len());
            let snippet: String = chars[span.start.min(end)..end].iter().collect();
            format!(
                "{}..{}\t{}\t{}\t{:?}\n",
                span.start,
                span.end,
                span.role.name(),
                span.color,
                snippet
            )
        })
        .collect()
}

/// Inserts a newline at `at` the way the editor would while typing.
fn indent_text(input: &str, at: Option<usize>, unit: &str) -> anyhow::Result<String> {
    let document = Document::from_text(Language::Js, input);
    let at = at.unwrap_or_else(|| document.len_chars()).min(document.len_chars());
    let config = PipelineConfig {
        auto_indent: true,
        indent_unit: unit.to_string(),
        ..PipelineConfig::default()
    };

    let mut pipeline = EditPipeline::new(document, Theme::default(), config);
    pipeline.insert(at, "\n", Instant::now())?;
    pipeline.cancel();
    Ok(pipeline.document().text().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperpad_syntax::highlight;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["hyperpad", "highlight", "index.html"]);
        assert_eq!(args.verbose, 0);
        match args.command {
            Command::Highlight {
                file,
                language,
                format,
                ..
            } => {
                assert_eq!(file, PathBuf::from("index.html"));
                assert!(language.is_none());
                assert_eq!(format, Format::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_language_and_verbosity() {
        let args = Args::parse_from(["hyperpad", "-vv", "highlight", "a.txt", "--language", "css"]);
        assert_eq!(args.verbose, 2);
        assert!(matches!(
            args.command,
            Command::Highlight {
                language: Some(Language::Css),
                ..
            }
        ));
    }

    #[test]
    fn test_git_credentials_come_in_pairs() {
        let result = Args::try_parse_from(["hyperpad", "git", "site", "push", "--username", "ada"]);
        assert!(result.is_err());

        let args = Args::parse_from(["hyperpad", "git", "site", "fetch"]);
        assert!(matches!(
            args.command,
            Command::Git {
                operation: GitOperation::Fetch,
                remote: None,
                ..
            }
        ));
    }

    #[test]
    fn test_spans_json_shape() {
        let result = highlight("<p>", Language::Html, &Theme::light());
        let value = spans_json(&result);
        assert_eq!(value["length"], 3);
        assert_eq!(value["spans"][0]["start"], 1);
        assert_eq!(value["spans"][0]["end"], 2);
        assert_eq!(value["spans"][0]["role"], "keyword");
    }

    #[test]
    fn test_spans_text_includes_snippet() {
        let result = highlight("<p>", Language::Html, &Theme::light());
        let text = spans_text("<p>", &result);
        assert!(text.starts_with("1..2\tkeyword\t"));
        assert!(text.trim_end().ends_with("\"p\""));
    }

    #[test]
    fn test_indent_text() {
        assert_eq!(indent_text("  if (x) {", None, "\t").unwrap(), "  if (x) {\n  \t");
        assert_eq!(indent_text("a;", Some(99), "  ").unwrap(), "a;\n");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nindent_unit = \"  \"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.editor.indent_unit, "  ");
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
