//! CLI entry point for share URL inspection.
//!
//! # Responsibility
//! - Verify `achievetree_core` linkage (`ping`).
//! - Print, decode and shrink share queries from the terminal.
//! - Keep output deterministic for scripting.

use achievetree_core::codec::budget::shrink_to_budget;
use achievetree_core::codec::share_url::{build_query, load_from_query};
use achievetree_core::config::ShrinkConfig;
use achievetree_core::model::node::{Node, ROOT_PARENT};
use achievetree_core::store::tree_ops::children_of;
use achievetree_core::{core_version, default_tree, ping, ShareState, Tree};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "achievetree",
    version,
    about = "Inspect and shrink achievement tree share URLs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage and version
    Ping,
    /// Print the share query of the default tree
    Default,
    /// Decode a share query and print the tree as an outline
    Inspect {
        /// Query string, with or without leading `?`
        query: String,
    },
    /// Shrink a share query to a length budget
    Shrink {
        /// Query string, with or without leading `?`
        query: String,
        /// Maximum query length in bytes (defaults to the editor budget)
        max_len: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command.unwrap_or(Command::Ping)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<String, String> {
    match command {
        Command::Ping => Ok(format!(
            "achievetree_core ping={}\nachievetree_core version={}",
            ping(),
            core_version()
        )),
        Command::Default => Ok(build_query(&default_tree(), &ShareState::default())),
        Command::Inspect { query } => inspect(&query),
        Command::Shrink { query, max_len } => shrink(&query, max_len),
    }
}

fn inspect(query: &str) -> Result<String, String> {
    let outcome = load_from_query(query);
    if let Some(err) = outcome.error {
        return Err(format!("inspect failed: {err}"));
    }
    let mut lines = vec![format!(
        "{} ({} nodes, view={})",
        outcome.tree.title,
        outcome.tree.len(),
        outcome.state.view
    )];
    write_outline(&outcome.tree, &mut lines);
    Ok(lines.join("\n"))
}

fn write_outline(tree: &Tree, lines: &mut Vec<String>) {
    let children = children_of(&tree.nodes);
    let mut stack: Vec<(&Node, usize)> = children
        .get(ROOT_PARENT)
        .map(|roots| roots.iter().rev().map(|node| (*node, 0)).collect())
        .unwrap_or_default();
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some((node, depth)) = stack.pop() {
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        let mut line = format!(
            "{}- [{}] {} ({})",
            "  ".repeat(depth),
            node.status.label(),
            node.title,
            node.id
        );
        if let Some(done_date) = &node.done_date {
            line.push_str(&format!(" done={done_date}"));
        }
        if node.collapsed {
            line.push_str(" collapsed");
        }
        lines.push(line);
        if let Some(kids) = children.get(node.id.as_str()) {
            stack.extend(kids.iter().rev().map(|kid| (*kid, depth + 1)));
        }
    }
}

fn shrink(query: &str, max_len: Option<usize>) -> Result<String, String> {
    let outcome = load_from_query(query);
    if let Some(err) = outcome.error {
        return Err(format!("shrink failed: {err}"));
    }
    let mut config = ShrinkConfig::default();
    if let Some(max_len) = max_len {
        config.url_budget = max_len;
    }
    let report = shrink_to_budget(&outcome.tree, &outcome.state, &config);
    if !report.fits {
        return Err(format!(
            "shrink failed: {} bytes after all steps, budget {}",
            report.query.len(),
            config.url_budget
        ));
    }
    Ok(report.query)
}
