//! Lorikeet CLI
//!
//! Compiles CSS selectors to XPath 1.0 location paths from the command
//! line, for debugging selectors and for shell pipelines (`--json`).

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;

use lorikeet_css::parse;
use lorikeet_xpath::{Builtins, Doctype, Options, VisitorConfig, xpath_for};

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "lorikeet", about = "Compile CSS selectors to XPath 1.0")]
struct Cli {
    /// Selectors to compile.
    #[arg(required = true)]
    selectors: Vec<String>,

    /// Path prefix applied to each compiled selector.
    #[arg(long, default_value = "//")]
    prefix: String,

    /// Namespace binding as prefix=uri (repeatable).
    #[arg(long = "ns", value_name = "PREFIX=URI")]
    namespaces: Vec<String>,

    /// Target document dialect.
    #[arg(long, value_enum, default_value = "xml")]
    doctype: DoctypeArg,

    /// Enable the non-standard convenience pseudo-classes
    /// (:contains, :first, :last, :eq, :has).
    #[arg(long)]
    builtins: bool,

    /// Bypass the selector cache.
    #[arg(long)]
    no_cache: bool,

    /// Emit a JSON document instead of human-readable output.
    #[arg(long)]
    json: bool,
}

/// `--doctype` values.
#[derive(Clone, Copy, ValueEnum)]
enum DoctypeArg {
    /// Case-sensitive element and attribute names.
    Xml,
    /// Element names are lowercased.
    Html4,
    /// Element and attribute names are lowercased.
    Html5,
}

impl From<DoctypeArg> for Doctype {
    fn from(arg: DoctypeArg) -> Self {
        match arg {
            DoctypeArg::Xml => Self::Xml,
            DoctypeArg::Html4 => Self::Html4,
            DoctypeArg::Html5 => Self::Html5,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut namespaces = BTreeMap::new();
    for binding in &cli.namespaces {
        let Some((prefix, uri)) = binding.split_once('=') else {
            bail!("invalid namespace binding '{binding}', expected PREFIX=URI");
        };
        let _ = namespaces.insert(prefix.to_string(), uri.to_string());
    }

    let config = VisitorConfig {
        prefix: cli.prefix.clone(),
        namespaces,
        builtins: if cli.builtins {
            Builtins::Always
        } else {
            Builtins::Strict
        },
        doctype: cli.doctype.into(),
    };
    let options = Options {
        visitor: Some(config.clone()),
        cache: !cli.no_cache,
        ..Options::default()
    };

    let mut reports = Vec::new();
    for selector in &cli.selectors {
        let paths = xpath_for(selector, &options)
            .with_context(|| format!("failed to compile '{selector}'"))?;
        // The entry point already validated the selector, so this re-parse
        // for specificity reporting cannot fail.
        let list = parse(selector).with_context(|| format!("failed to parse '{selector}'"))?;
        let specificities: Vec<[u32; 3]> = list
            .items
            .iter()
            .map(|item| {
                let spec = item.specificity();
                [spec.0, spec.1, spec.2]
            })
            .collect();
        reports.push((selector, paths, specificities));
    }

    if cli.json {
        let document = serde_json::json!({
            "config": config,
            "selectors": reports
                .iter()
                .map(|(selector, paths, specificities)| {
                    serde_json::json!({
                        "selector": selector,
                        "xpath": paths,
                        "specificity": specificities,
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    for (selector, paths, specificities) in &reports {
        println!("{}", selector.bold());
        for (path, spec) in paths.iter().zip(specificities) {
            println!(
                "  {}  {}",
                path.green(),
                format!("({},{},{})", spec[0], spec[1], spec[2]).dimmed()
            );
        }
    }

    Ok(())
}
