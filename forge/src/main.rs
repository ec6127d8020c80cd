//! `forge`: synthesize a template-injection payload that survives a
//! keyword filter.
//!
//! The filter is described by `--deny` words and the `[oracle]` table of the
//! config file. The payload is printed on stdout; diagnostics go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;

use forge::assembler::{DetailedPayload, PayloadForge};
use forge::core::goal::Goal;
use forge::core::synth::DetectMode;
use forge::error::ForgeError;
use forge::exit_codes;
use forge::io::config::load_config;
use forge::logging;

#[derive(Parser)]
#[command(
    name = "forge",
    version,
    about = "Filter-evading template payload synthesizer"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a payload for the target.
    Generate {
        target: Target,
        /// String, integer, code or shell command, depending on the target.
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
        /// TOML config with synthesis options, capabilities and a blacklist.
        #[arg(short, long, default_value = "forge.toml")]
        config: PathBuf,
        /// Forbidden substring, in addition to the configured blacklist.
        #[arg(short, long = "deny", value_name = "WORD")]
        deny: Vec<String>,
        /// Try the cheapest rules first.
        #[arg(long)]
        fast: bool,
        /// Print the derivation tree and sub-expressions as JSON.
        #[arg(long)]
        tree: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    #[value(name = "string")]
    Str,
    Integer,
    Config,
    OsModule,
    Eval,
    Popen,
    PopenRead,
    Builtins,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            target,
            value,
            config,
            deny,
            fast,
            tree,
        } => cmd_generate(target, value.as_deref(), &config, deny, fast, tree),
    }
}

fn cmd_generate(
    target: Target,
    value: Option<&str>,
    config: &Path,
    deny: Vec<String>,
    fast: bool,
    tree: bool,
) -> Result<i32> {
    let goal = target_goal(target, value)?;
    let cfg = load_config(config)?;
    let mut options = cfg.options();
    if fast {
        options.synthesis.detect_mode = DetectMode::Fast;
    }
    if deny.iter().any(String::is_empty) {
        bail!("--deny words must be non-empty");
    }
    let mut oracle = cfg.blacklist();
    oracle.extend(deny);
    debug!(?goal, words = oracle.words().len(), "generating");

    let mut forge = PayloadForge::new(oracle, options);
    let detailed = match forge.generate_detailed(&goal) {
        Ok(Some(detailed)) => detailed,
        Ok(None) => {
            eprintln!("no payload for {target:?} survives the filter");
            return Ok(exit_codes::GENERATION_FAILED);
        }
        Err(ForgeError::NoViableWrapper) => {
            eprintln!("{}", ForgeError::NoViableWrapper);
            return Ok(exit_codes::NO_WRAPPER);
        }
        Err(err) => return Err(err.into()),
    };
    if !detailed.visible {
        eprintln!("note: the selected wrapper does not display the evaluated value");
    }
    if tree {
        println!("{}", tree_json(&detailed)?);
    } else {
        println!("{}", detailed.payload);
    }
    Ok(exit_codes::OK)
}

fn target_goal(target: Target, value: Option<&str>) -> Result<Goal> {
    let required = || value.with_context(|| format!("target {target:?} needs a VALUE"));
    let goal = match target {
        Target::Str => Goal::string(required()?),
        Target::Integer => {
            let raw = required()?;
            let parsed: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("parse integer {raw:?}"))?;
            Goal::Integer(parsed)
        }
        Target::Config => Goal::ConfigObject,
        Target::OsModule => Goal::OsModule,
        Target::Eval => Goal::eval(Goal::string(required()?)),
        Target::Popen => Goal::ProcessSpawn(required()?.to_string()),
        Target::PopenRead => Goal::ProcessSpawnAndRead(required()?.to_string()),
        Target::Builtins => Goal::BuiltinsTable,
    };
    Ok(goal)
}

#[derive(Serialize)]
struct TreeReport<'a> {
    payload: &'a str,
    visible: bool,
    used: Vec<&'a str>,
    subexpressions: Vec<&'a str>,
    tree: &'a forge::core::derivation::Node,
}

fn tree_json(detailed: &DetailedPayload) -> Result<String> {
    let report = TreeReport {
        payload: &detailed.payload,
        visible: detailed.visible,
        used: detailed.used.iter().map(String::as_str).collect(),
        subexpressions: detailed.subexpressions().map(|(text, _)| text).collect(),
        tree: &detailed.tree,
    };
    serde_json::to_string_pretty(&report).context("serialize derivation tree")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_generate_defaults() {
        let cli = Cli::parse_from(["forge", "generate", "string", "ab"]);
        let Command::Generate {
            target,
            value,
            config,
            deny,
            fast,
            tree,
        } = cli.command;
        assert_eq!(target, Target::Str);
        assert_eq!(value.as_deref(), Some("ab"));
        assert_eq!(config, PathBuf::from("forge.toml"));
        assert!(deny.is_empty());
        assert!(!fast && !tree);
    }

    #[test]
    fn parse_repeated_deny() {
        let cli = Cli::parse_from([
            "forge", "generate", "popen-read", "id", "--deny", "__", "-d", ".", "--fast",
        ]);
        let Command::Generate {
            target, deny, fast, ..
        } = cli.command;
        assert_eq!(target, Target::PopenRead);
        assert_eq!(deny, vec!["__".to_string(), ".".to_string()]);
        assert!(fast);
    }

    #[test]
    fn value_is_required_for_strings() {
        let err = target_goal(Target::Str, None).expect_err("missing value");
        assert!(err.to_string().contains("needs a VALUE"));
        assert_eq!(
            target_goal(Target::OsModule, None).expect("no value needed"),
            Goal::OsModule
        );
    }

    #[test]
    fn integers_are_parsed() {
        assert_eq!(
            target_goal(Target::Integer, Some("-12")).expect("integer"),
            Goal::Integer(-12)
        );
        assert!(target_goal(Target::Integer, Some("twelve")).is_err());
    }
}
