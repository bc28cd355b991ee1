//! Arbor CLI
//!
//! Parse a markup document or fragment and print the resulting tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use arbor_common::warning::clear_warnings;
use arbor_dom::{DomTree, NodeId};
use arbor_html::{
    ParseIssue, ParseOptions, SerializeOptions, parse_document_with, parse_fragment_with,
    print_tree, serialize,
};
use clap::Parser;
use owo_colors::OwoColorize;

/// Arbor - parse markup into a node tree and print it
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    arbor ./index.html

    # Parse inline markup
    arbor --html '<p>Hello<b>world'

    # Parse a fragment as the content of a <ul>
    arbor --fragment ul --html '<li>one<li>two'

    # Normalize a document
    arbor --serialize ./index.html
"#)]
struct Cli {
    /// Path to a markup file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Parse as a fragment in the given context element
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Print serialized markup instead of the tree
    #[arg(long)]
    serialize: bool,

    /// Print the parse issues after the output
    #[arg(long)]
    issues: bool,

    /// Do not echo parse issues to stderr while parsing
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input = load_input(&cli)?;

    clear_warnings();
    let options = ParseOptions {
        report_warnings: !cli.quiet,
        ..ParseOptions::default()
    };
    let (tree, issues) = match cli.fragment.as_deref() {
        Some(context) => parse_fragment_with(&input, context, options),
        None => parse_document_with(&input, options),
    };

    if cli.serialize {
        println!(
            "{}",
            serialize(&tree, NodeId::ROOT, &SerializeOptions::default())
        );
    } else {
        print_document(&tree);
    }

    if cli.issues {
        print_issues(&issues);
    }
    Ok(())
}

/// Read the markup named on the command line
fn load_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        Ok(html.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    } else {
        bail!("nothing to parse: pass a file path or --html")
    }
}

fn print_document(tree: &DomTree) {
    println!("{}", "=== Tree ===".bold());
    print_tree(tree, NodeId::ROOT, 0);
}

fn print_issues(issues: &[ParseIssue]) {
    println!("\n{}", "=== Parse Issues ===".bold());
    if issues.is_empty() {
        println!("  none");
        return;
    }
    for issue in issues {
        let label = if issue.is_error {
            "error".red().to_string()
        } else {
            "warning".yellow().to_string()
        };
        println!("  - [{label}] token {}: {}", issue.token_index, issue.message);
    }
}
