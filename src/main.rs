// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so --json output on stdout stays clean)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = nothing renderable, 2 = error)
// =============================================================================

mod assignments;   // src/assignments/ - ledger + import/delete workflow
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - typed settings
mod error;         // src/error.rs - AppError
mod github;        // src/github/ - URL parsing, tree listing, downloads
mod render;        // src/render/ - entry file choice, link rewriting, live render
mod server;        // src/server/ - HTTP API
mod state;         // src/state.rs - shared handles
mod storage;       // src/storage.rs - per-assignment files on disk

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use assignments::{Assignment, AssignmentFilter, AssignmentUpdate, ImportRequest};
use cli::{Cli, Commands};
use config::{AppConfig, ServerConfig};
use error::AppError;
use github::{resolve_reference, GithubClient};
use state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global.log_level);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = done
//   Ok(1) = nothing to render (render found no HTML entry file)
//   Err   = anything else (exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    let config = AppConfig::from(&cli.global);

    match cli.command {
        Commands::Resolve { repo_url, json } => {
            let reference = resolve_reference(&repo_url)?;
            if json {
                print_json(&reference)?;
            } else {
                println!("owner:  {}", reference.owner);
                println!("repo:   {}", reference.name);
                println!(
                    "branch: {}",
                    reference.branch.as_deref().unwrap_or("(default)")
                );
            }
            Ok(0)
        }

        Commands::Branches { repo_url, json } => {
            let client = GithubClient::new(config.github)?;
            let reference = resolve_reference(&repo_url)?;
            let listing = client.branch_listing(&reference).await?;

            if json {
                print_json(&listing)?;
            } else {
                for branch in &listing.branches {
                    let marker = if branch.name == listing.default_branch { "*" } else { " " };
                    println!("{} {}", marker, branch.name);
                }
            }
            Ok(0)
        }

        Commands::Files { repo_url, json } => {
            let client = GithubClient::new(config.github)?;
            let reference = resolve_reference(&repo_url)?;
            let listing = client.fetch_files(&reference).await?;

            if json {
                print_json(&listing)?;
            } else {
                println!("📂 {} @ {} ({} files)", reference, listing.branch, listing.files.len());
                for file in &listing.files {
                    println!("{:>10}  {}", file.size, file.path);
                }
                match render::pick_entry(listing.paths().as_slice()) {
                    Some(entry) => println!("\n📄 Entry file: {}", entry),
                    None => println!("\n⚠️  No HTML entry file"),
                }
            }
            Ok(0)
        }

        Commands::Render { repo_url, branch, output } => {
            let client = GithubClient::new(config.github)?;
            let mut reference = resolve_reference(&repo_url)?;
            if let Some(branch) = branch {
                reference = reference.with_branch(branch);
            }

            match render::render_live(&client, &reference).await {
                Ok(html) => {
                    match output {
                        Some(path) => {
                            tokio::fs::write(&path, html)
                                .await
                                .with_context(|| format!("writing {}", path.display()))?;
                            println!("✅ Wrote {}", path.display());
                        }
                        None => print!("{}", html),
                    }
                    Ok(0)
                }
                Err(AppError::EntryNotFound) => {
                    eprintln!("⚠️  No HTML file found in {}", reference);
                    Ok(1)
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Import {
            repo_url,
            title,
            description,
            subject_area,
            tags,
            json,
        } => {
            let state = AppState::new(&config)?;
            let assignment = assignments::import_repository(
                &state,
                ImportRequest {
                    github_url: Some(repo_url),
                    title,
                    description,
                    subject_area,
                    tags,
                },
            )
            .await?;

            if json {
                print_json(&assignment)?;
            } else {
                print_assignment(&assignment);
            }
            Ok(0)
        }

        Commands::List { all, json } => {
            let state = AppState::new(&config)?;
            let filter = AssignmentFilter {
                published_only: !all,
                limit: usize::MAX,
                ..AssignmentFilter::default()
            };
            let found = state.store.list(&filter);

            if json {
                print_json(&found)?;
            } else if found.is_empty() {
                println!("No assignments yet");
            } else {
                print_table(&found);
            }
            Ok(0)
        }

        Commands::Update {
            id,
            title,
            description,
            subject_area,
            tags,
            publish,
            unpublish,
            json,
        } => {
            let state = AppState::new(&config)?;
            let update = AssignmentUpdate {
                title,
                description,
                subject_area,
                tags: (!tags.is_empty()).then_some(tags),
                is_published: match (publish, unpublish) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let assignment = state.store.update(id, update)?;

            if json {
                print_json(&assignment)?;
            } else {
                print_assignment(&assignment);
            }
            Ok(0)
        }

        Commands::Delete { id } => {
            let state = AppState::new(&config)?;
            let removed = assignments::delete_assignment(&state, id).await?;
            println!("🗑️  Deleted assignment {} ({})", removed.id, removed.title);
            Ok(0)
        }

        Commands::Serve { port } => {
            let state = Arc::new(AppState::new(&config)?);
            server::start_server(state, ServerConfig { port }).await?;
            Ok(0)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_assignment(assignment: &Assignment) {
    println!("✅ Imported assignment {}: {}", assignment.id, assignment.title);
    if let Some(branch) = &assignment.github_branch {
        println!("   branch: {}", branch);
    }
    match &assignment.file_path {
        Some(entry) => println!("   entry:  {}", entry),
        None => println!("   entry:  (none - no HTML file in repository)"),
    }
}

// Prints assignments as a human-readable table in the terminal
fn print_table(assignments: &[Assignment]) {
    println!("{:<6} {:<40} {:<15} {:<20}", "ID", "TITLE", "BRANCH", "ENTRY");
    println!("{}", "=".repeat(83));

    for a in assignments {
        // Truncate long titles so columns stay aligned
        let title = if a.title.chars().count() > 37 {
            format!("{}...", a.title.chars().take(37).collect::<String>())
        } else {
            a.title.clone()
        };

        println!(
            "{:<6} {:<40} {:<15} {:<20}",
            a.id,
            title,
            a.github_branch.as_deref().unwrap_or("-"),
            a.file_path.as_deref().unwrap_or("-")
        );
    }
}
