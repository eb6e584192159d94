mod error_formatter;
mod formatter;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use formatter::Formatter;
use ruleinv::{Config, Engine, FrozenTrie, TokenString, TrieBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ruleinv")]
#[command(about = "Decide which mangling rules can be run backwards.")]
#[command(
    long_about = "ruleinv classifies password-mangling rules by how they can be reasoned about: inverted,\nonly optimized, or run forward over a wordlist. It also builds char-set tries over wordlists\nand enumerates the words matching a token pattern."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify rules and display their feasibility
    ///
    /// Loads every rule from the given files (directories are scanned for .rule files),
    /// runs dependency analysis, classification and special-case refinement, and prints
    /// one line per rule. No wordlist or cracking engine is needed.
    Classify {
        /// Rule files or directories containing .rule files
        #[arg(required = true)]
        rules: Vec<PathBuf>,
        /// Recognize class-based primitives (s?vX, @?d, ...)
        #[arg(long)]
        regex: bool,
        /// Skip lines that fail to parse instead of aborting
        #[arg(short = 'l', long)]
        lenient: bool,
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Classify rules and generate forward data for the ones that need it
    ///
    /// Rules that are not invertible are run forward through the cracking engine and their
    /// outputs written to the preprocess directory; invertible rules whose output count is
    /// unknown get a count file. A fingerprint of the wordlist and rule list is stored so an
    /// unchanged rerun skips forward generation entirely.
    ///
    /// Examples:
    ///   ruleinv preprocess best.rule -w rockyou.txt
    ///   ruleinv preprocess rules/ -w words.txt --engine john --engine-arg=--stdout
    Preprocess {
        /// Rule files or directories containing .rule files
        #[arg(required = true)]
        rules: Vec<PathBuf>,
        /// JSON configuration file; command-line flags override its values
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
        /// Wordlist fed to the cracking engine
        #[arg(short = 'w', long)]
        wordlist: Option<PathBuf>,
        /// String prepended to every word before the rule is applied
        #[arg(long)]
        prefix: Option<String>,
        /// Directory for forward data and the cache fingerprint
        #[arg(short = 'd', long = "dir")]
        dir: Option<PathBuf>,
        /// Recognize class-based primitives (s?vX, @?d, ...)
        #[arg(long)]
        regex: bool,
        /// Log every phase with its timing
        #[arg(long)]
        debug: bool,
        /// Abort on the first engine failure
        #[arg(long)]
        strict: bool,
        /// Cracking engine program (default: hashcat)
        #[arg(long = "engine", value_name = "PROGRAM")]
        engine: Option<String>,
        /// Engine argument; repeat for several. {rule_file} and {rule} are substituted
        #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
        engine_args: Vec<String>,
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Build a char-set trie over a wordlist and save it
    Freeze {
        /// Wordlist, one word per line
        #[arg(short = 'w', long)]
        wordlist: PathBuf,
        /// Destination of the serialized trie
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
    /// List the wordlist entries matching token patterns
    ///
    /// Patterns use mask syntax, one token per position:
    ///   abc          literal bytes
    ///   [bc]a[tr]    bracket sets, ranges like [a-z], [^...] negates
    ///   ?l ?u ?d ?s  lower, upper, digit, symbol (also ?a ?h ?H ?b)
    Lookup {
        /// Token patterns to match
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Build the trie from this wordlist
        #[arg(short = 'w', long, conflicts_with = "trie", required_unless_present = "trie")]
        wordlist: Option<PathBuf>,
        /// Load a trie written by `ruleinv freeze`
        #[arg(short = 't', long)]
        trie: Option<PathBuf>,
        /// Print only the number of matches per pattern
        #[arg(long)]
        count: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Commands::Preprocess { debug: true, .. });
    init_tracing(debug);

    let result = match &cli.command {
        Commands::Classify {
            rules,
            regex,
            lenient,
            json,
        } => classify_command(rules, *regex, *lenient, *json),
        Commands::Preprocess {
            rules,
            config,
            wordlist,
            prefix,
            dir,
            regex,
            debug,
            strict,
            engine,
            engine_args,
            json,
        } => {
            let overrides = Overrides {
                wordlist: wordlist.as_deref(),
                prefix: prefix.as_deref(),
                dir: dir.as_deref(),
                regex: *regex,
                debug: *debug,
                strict: *strict,
                engine: engine.as_deref(),
                engine_args,
            };
            preprocess_command(rules, config.as_deref(), &overrides, *json)
        }
        Commands::Freeze { wordlist, output } => freeze_command(wordlist, output),
        Commands::Lookup {
            patterns,
            wordlist,
            trie,
            count,
        } => lookup_command(patterns, wordlist.as_deref(), trie.as_deref(), *count),
    };

    if let Err(e) = result {
        // Check if it's a RuleInvError and format it nicely, otherwise use default
        if let Some(err) = e.downcast_ref::<ruleinv::RuleInvError>() {
            eprintln!("{}", error_formatter::format_error(err));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "ruleinv=debug" } else { "ruleinv=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn classify_command(paths: &[PathBuf], regex: bool, lenient: bool, json: bool) -> Result<()> {
    let mut engine = Engine::new();
    engine.config_mut().enable_regex = regex;
    let parse_errors = load_rules(&mut engine, paths, lenient)?;
    for error in &parse_errors {
        eprintln!("{}", error_formatter::format_error(error));
    }

    let errors = engine.classify()?;
    let summaries = engine.summaries();
    let formatter = Formatter::default();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print!("{}", formatter.format_summaries(&summaries));
    }
    for error in &errors {
        eprintln!("{}", error_formatter::format_error(error));
    }
    Ok(())
}

/// Command-line values layered over the configuration file
struct Overrides<'a> {
    wordlist: Option<&'a Path>,
    prefix: Option<&'a str>,
    dir: Option<&'a Path>,
    regex: bool,
    debug: bool,
    strict: bool,
    engine: Option<&'a str>,
    engine_args: &'a [String],
}

impl Overrides<'_> {
    fn apply(&self, config: &mut Config) {
        if let Some(wordlist) = self.wordlist {
            config.wordlist_path.name = wordlist.to_path_buf();
        }
        if let Some(prefix) = self.prefix {
            config.wordlist_path.prefix = Some(prefix.to_string());
        }
        if let Some(dir) = self.dir {
            config.preprocess_path = dir.to_path_buf();
        }
        config.enable_regex |= self.regex;
        config.debug |= self.debug;
        config.strict |= self.strict;
        if let Some(program) = self.engine {
            config.executor.program = program.to_string();
        }
        if !self.engine_args.is_empty() {
            config.executor.args = self.engine_args.to_vec();
        }
    }
}

fn preprocess_command(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    overrides: &Overrides<'_>,
    json: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);

    let mut engine = Engine::with_config(config);
    load_rules(&mut engine, paths, false)?;
    let report = engine.preprocess()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let formatter = Formatter::default();
        print!("{}", formatter.format_report(&report));
    }

    if !report.is_success() {
        std::process::exit(2);
    }
    Ok(())
}

fn freeze_command(wordlist: &Path, output: &Path) -> Result<()> {
    let trie = TrieBuilder::from_wordlist(wordlist)?.into_frozen();
    trie.save(output)?;
    println!(
        "Froze {} words ({} nodes) into {}",
        trie.word_count(),
        trie.node_count(),
        output.display()
    );
    Ok(())
}

fn lookup_command(
    patterns: &[String],
    wordlist: Option<&Path>,
    trie_path: Option<&Path>,
    count: bool,
) -> Result<()> {
    let patterns = patterns
        .iter()
        .map(|p| TokenString::parse(p))
        .collect::<Result<Vec<_>, _>>()?;

    let trie = match (trie_path, wordlist) {
        (Some(path), _) => FrozenTrie::load(path)?,
        (None, Some(path)) => TrieBuilder::from_wordlist(path)?.into_frozen(),
        (None, None) => bail!("either --wordlist or --trie is required"),
    };

    let formatter = Formatter::default();
    for pattern in &patterns {
        if count {
            println!("{}", trie.count_matches(pattern));
        } else {
            for word in trie.lookup(pattern) {
                println!("{}", formatter.format_word(&word));
            }
        }
    }
    Ok(())
}

/// Load rules from files and directories
///
/// Directories are walked for `.rule` files in file-name order so rule
/// indices are stable across runs. In lenient mode unparsable lines are
/// returned instead of aborting.
fn load_rules(
    engine: &mut Engine,
    paths: &[PathBuf],
    lenient: bool,
) -> Result<Vec<ruleinv::RuleInvError>> {
    let mut errors = Vec::new();
    for root in paths {
        if root.is_file() {
            load_rule_file(engine, root, lenient, &mut errors)?;
            continue;
        }
        if !root.exists() {
            bail!("rule source '{}' not found", root.display());
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|s| s.to_str()) == Some("rule")
            {
                load_rule_file(engine, path, lenient, &mut errors)?;
            }
        }
    }
    Ok(errors)
}

fn load_rule_file(
    engine: &mut Engine,
    path: &Path,
    lenient: bool,
    errors: &mut Vec<ruleinv::RuleInvError>,
) -> Result<()> {
    debug!(path = %path.display(), "loading rules");
    if lenient {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        errors.extend(engine.add_rules_lenient(&content, &path.to_string_lossy()));
    } else {
        engine.add_rule_file(path)?;
    }
    Ok(())
}
