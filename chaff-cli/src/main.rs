//! chaff - find CSS selectors that no page in a corpus ever uses
//!
//! Progress goes to stderr (or `--log`), the selectors to review go to
//! stdout (or `--output`), so the result can be piped on its own.

use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chaff_audit::report::render_event;
use chaff_audit::{Audit, AuditConfig, PageSource, Palette};
use clap::{CommandFactory, Parser, ValueEnum};
use env_logger::{Env, Target};

/// chaff - report CSS selectors that no page matches
#[derive(Parser, Debug)]
#[command(name = "chaff")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Check two pages against one stylesheet
    chaff -s css/site.css index.html about.html

    # Resolve everything against a running server
    chaff -r http://localhost:3000 -s /assets/app.css / /about /contact

    # Extra rules from stdin, result with declarations into a file
    cat extra.css | chaff -s site.css --rules - --declarations -O unused.css page.html

    # Everything from a config file
    chaff -c chaff.json
"#)]
struct Cli {
    /// Pages to check, joined to --root unless they are URLs
    #[arg(value_name = "PAGE")]
    pages: Vec<String>,

    /// Stylesheet to audit (repeatable)
    #[arg(short = 's', long = "stylesheet", value_name = "FILE|URL")]
    stylesheets: Vec<String>,

    /// Prefix for every stylesheet and page location
    #[arg(short, long, value_name = "URL-OR-PATH")]
    root: Option<String>,

    /// Where to write the selectors to review (default: stdout)
    #[arg(short = 'O', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Where to write progress and log messages (default: stderr)
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// JSON config file; command-line values are added on top
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip selectors matching this regular expression (repeatable)
    #[arg(short, long = "ignore", value_name = "REGEX")]
    ignore: Vec<String>,

    /// Extra CSS to audit after the stylesheets; `-` reads it from stdin
    #[arg(long, value_name = "CSS")]
    rules: Option<String>,

    /// Write `selector { declarations }` instead of bare selectors
    #[arg(long)]
    declarations: bool,

    /// Colorize progress output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if config.stylesheets.is_empty() && config.pages.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let log_file = cli
        .log
        .as_ref()
        .map(|path| {
            File::create(path).with_context(|| format!("could not create {}", path.display()))
        })
        .transpose()?;
    init_logging(cli.verbose, log_file.as_ref())?;

    let palette = Palette::new(match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => log_file.is_none() && io::stderr().is_terminal(),
    });
    let mut progress: Box<dyn Write> = match &log_file {
        Some(file) => Box::new(file.try_clone()?),
        None => Box::new(io::stderr()),
    };

    let mut audit = Audit::new(config).context("invalid configuration")?;
    let run = audit.run();
    for event in &run.events {
        writeln!(progress, "{}", render_event(event, &palette))?;
    }
    audit.report(&mut progress, &palette)?;

    let mut output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("could not create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    audit.dump(&mut output, cli.declarations)?;
    output.flush()?;
    Ok(())
}

/// Config file (if any) with the command-line values layered on top.
fn load_config(cli: &Cli) -> Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_json_file(path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => AuditConfig::default(),
    };

    if let Some(root) = &cli.root {
        config.root.clone_from(root);
    }
    config.stylesheets.extend(cli.stylesheets.iter().cloned());
    config
        .pages
        .extend(cli.pages.iter().map(|page| PageSource::from(page.as_str())));
    config.ignore.extend(cli.ignore.iter().cloned());
    if let Some(rules) = &cli.rules {
        let css = if cli.rules_from_stdin() {
            read_stdin_rules()?
        } else {
            rules.clone()
        };
        append_rules(&mut config.rules, &css);
    }
    Ok(config)
}

impl Cli {
    /// `--rules -` asks for stdin. Nothing else reads it, so a pipe that
    /// never closes cannot stall a run.
    fn rules_from_stdin(&self) -> bool {
        self.rules.as_deref() == Some("-")
    }
}

fn append_rules(rules: &mut String, css: &str) {
    if !rules.is_empty() && !rules.ends_with('\n') {
        rules.push('\n');
    }
    rules.push_str(css);
}

fn read_stdin_rules() -> Result<String> {
    let mut css = String::new();
    let _ = io::stdin()
        .lock()
        .read_to_string(&mut css)
        .context("could not read rules from stdin")?;
    Ok(css)
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_logging(verbose: bool, file: Option<&File>) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));
    if let Some(file) = file {
        let _ = builder.target(Target::Pipe(Box::new(file.try_clone()?)));
    }
    builder.init();
    log::debug!(target: "chaff", "logging at {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "chaff",
            "-s",
            "a.css",
            "--stylesheet",
            "b.css",
            "-r",
            "site/",
            "-i",
            "^\\.js-",
            "--declarations",
            "--color",
            "never",
            "index.html",
            "about.html",
        ])
        .unwrap();
        assert_eq!(cli.stylesheets, vec!["a.css", "b.css"]);
        assert_eq!(cli.pages, vec!["index.html", "about.html"]);
        assert_eq!(cli.root.as_deref(), Some("site/"));
        assert_eq!(cli.ignore, vec!["^\\.js-"]);
        assert!(cli.declarations);
        assert_eq!(cli.color, ColorMode::Never);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_command_line_extends_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chaff.json");
        fs::write(
            &path,
            r#"{ "root": "a/", "stylesheets": ["x.css"], "rules": ".from-file {}" }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "chaff",
            "-c",
            path.to_str().unwrap(),
            "-s",
            "y.css",
            "--rules",
            ".from-flag {}",
            "p.html",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.root, "a/");
        assert_eq!(config.stylesheets, vec!["x.css", "y.css"]);
        assert_eq!(config.pages, vec![PageSource::from("p.html")]);
        assert_eq!(config.rules, ".from-file {}\n.from-flag {}");
    }

    #[test]
    fn test_stdin_is_read_only_on_request() {
        let cli = Cli::try_parse_from(["chaff", "-s", "a.css", "p.html"]).unwrap();
        assert!(!cli.rules_from_stdin());
        assert_eq!(load_config(&cli).unwrap().rules, "");

        let cli = Cli::try_parse_from(["chaff", "--rules", ".x {}", "p.html"]).unwrap();
        assert!(!cli.rules_from_stdin());

        let cli = Cli::try_parse_from(["chaff", "--rules", "-", "p.html"]).unwrap();
        assert!(cli.rules_from_stdin());
    }

    #[test]
    fn test_root_flag_overrides_config() {
        let cli = Cli::try_parse_from(["chaff", "-r", "http://localhost:3000", "/"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.root, "http://localhost:3000");
    }
}
