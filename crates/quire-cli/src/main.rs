use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use quire_common::telemetry::{self, TelemetryConfig};
use quire_common::{DocumentKind, EditorConfig, MemoryStore};
use quire_editor_core::{Document, FormatCommand, Selection, apply_command};
use quire_editor_session::{EditorSession, SessionContext, TracingNotifier};
use quire_renderer::{SanitizerPolicy, TemplateDocument, TemplateValues, default_shell};

#[derive(Parser)]
#[command(version, about = "Quire - markdown to email-safe HTML", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file (default: <config dir>/quire/config.toml if present)
    #[arg(long, global = true, env = "QUIRE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown file to sanitized HTML
    Preview {
        /// Markdown file
        file: PathBuf,
    },
    /// Compose a newsletter email from a markdown file
    Render {
        /// Markdown file with the newsletter body
        file: PathBuf,

        /// Template TOML (id, name, subject, html) used as the email shell
        #[arg(long)]
        template: Option<PathBuf>,

        /// Subject line; defaults to the template's subject
        #[arg(long)]
        subject: Option<String>,

        /// Merge-field value, repeatable
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Apply a formatting command to a markdown file
    Format {
        /// Markdown file
        file: PathBuf,

        /// bold, italic, code, link, heading, list, ordered-list, quote,
        /// code-block, rule or table
        #[arg(long)]
        command: FormatCommand,

        /// Selection start (char offset)
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Selection end (char offset); defaults to `start`
        #[arg(long)]
        end: Option<usize>,

        /// Text to insert when the selection is empty
        #[arg(long)]
        placeholder: Option<String>,

        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// List the placeholders a template uses
    Placeholders {
        /// Template TOML
        template: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("quire-cli"));

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Preview { file } => {
            let markdown = read(&file)?;
            let policy = SanitizerPolicy::with_allowed(&config.allowed_embeds);
            println!("{}", Document::from_markdown(markdown).preview(&policy));
        }
        Commands::Render {
            file,
            template,
            subject,
            vars,
        } => {
            let shell = match template {
                Some(path) => load_template(&path)?,
                None => default_shell(),
            };
            render_newsletter(&file, &shell, subject, vars.into_iter().collect(), config)?;
        }
        Commands::Format {
            file,
            command,
            start,
            end,
            placeholder,
            in_place,
        } => {
            let markdown = read(&file)?;
            let selection = Selection::new(start, end.unwrap_or(start));
            let outcome = apply_command(&markdown, selection, &command, placeholder.as_deref());
            tracing::info!(%command, caret = outcome.caret, "formatted");
            if in_place {
                std::fs::write(&file, &outcome.buffer)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("writing {}", file.display()))?;
            } else {
                print!("{}", outcome.buffer);
            }
        }
        Commands::Placeholders { template } => {
            for name in load_template(&template)?.placeholders() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Drive an in-memory editing session the way the console does at send time.
fn render_newsletter(
    file: &Path,
    shell: &TemplateDocument,
    subject: Option<String>,
    values: TemplateValues,
    config: EditorConfig,
) -> Result<()> {
    let mut session = EditorSession::new(
        DocumentKind::Newsletter,
        Arc::new(MemoryStore::new()),
        Arc::new(TracingNotifier),
        SessionContext::default(),
        config,
    );
    session.edit_text(read(file)?)?;
    session.set_subject(subject.unwrap_or_else(|| shell.subject.clone()))?;

    let email = session.compose(Some(shell), &values);
    eprintln!("Subject: {}", email.subject);
    println!("{}", email.html);
    session.close();
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", path.display()))
}

fn load_template(path: &Path) -> Result<TemplateDocument> {
    toml::from_str(&read(path)?)
        .into_diagnostic()
        .wrap_err_with(|| format!("parsing template {}", path.display()))
}

fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(EditorConfig::default()),
        },
    };
    tracing::debug!(path = %path.display(), "loading config");
    Ok(EditorConfig::load(&path)?)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quire").join("config.toml"))
}

fn parse_var(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("name=Ana"), Ok(("name".into(), "Ana".into())));
        assert_eq!(parse_var("url=a=b"), Ok(("url".into(), "a=b".into())));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_cli_parses_format() {
        let cli = Cli::try_parse_from([
            "quire", "format", "post.md", "--command", "bold", "--start", "2", "--end", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Format {
                command,
                start,
                end,
                ..
            } => {
                assert_eq!(command, FormatCommand::Bold);
                assert_eq!((start, end), (2, Some(5)));
            }
            _ => panic!("expected format"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(
            Cli::try_parse_from(["quire", "format", "post.md", "--command", "blink"]).is_err()
        );
    }

    #[test]
    fn test_template_toml() {
        let template: TemplateDocument = toml::from_str(
            r#"
            id = "welcome"
            name = "Welcome"
            subject = "Hello {{name}}"
            html = "<p>{{content}}</p>"
            "#,
        )
        .unwrap();
        assert_eq!(template.placeholders(), vec!["name", "content"]);
    }
}
