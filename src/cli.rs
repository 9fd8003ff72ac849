// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every connection/storage setting can also come from an environment
// variable (the `env = "..."` part), so the same binary works in a shell,
// a container, or a CI job without a wrapper script.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_API_BASE, DEFAULT_RAW_BASE};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "edu-importer",
    version = "0.1.0",
    about = "Import classroom assignments from GitHub repositories",
    long_about = "edu-importer turns GitHub repositories into assignments: it lists a repository's files, \
                  picks the HTML page to show, stores the files locally, and can render any branch live \
                  with its assets pointed back at GitHub."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// GitHub token sent as a bearer token (optional, raises rate limits)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, global = true, env = "GITHUB_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Raw file content host
    #[arg(long, global = true, env = "GITHUB_RAW_BASE", default_value = DEFAULT_RAW_BASE)]
    pub raw_base: String,

    /// Directory holding one subdirectory per imported assignment
    #[arg(long, global = true, env = "EDU_STORAGE_DIR", default_value = "storage")]
    pub storage_dir: PathBuf,

    /// JSON file that records assignments
    #[arg(long, global = true, env = "EDU_LEDGER_PATH", default_value = "assignments.json")]
    pub ledger: PathBuf,

    /// How many files to download at once during an import
    #[arg(long, global = true, env = "EDU_DOWNLOAD_CONCURRENCY", default_value_t = 1)]
    pub download_concurrency: usize,

    /// Log filter (e.g. info, debug, edu_importer=trace). RUST_LOG wins if set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a GitHub URL into owner, repository and branch
    ///
    /// Example: edu-importer resolve https://github.com/acme/demo/tree/dev
    Resolve {
        repo_url: String,

        #[arg(long)]
        json: bool,
    },

    /// List a repository's branches and its default branch
    Branches {
        repo_url: String,

        #[arg(long)]
        json: bool,
    },

    /// List the files an import would download
    Files {
        repo_url: String,

        #[arg(long)]
        json: bool,
    },

    /// Fetch a branch's entry page with assets rewritten to raw GitHub URLs
    ///
    /// Example: edu-importer render https://github.com/acme/demo --branch gh-pages -o page.html
    Render {
        repo_url: String,

        /// Branch to render (overrides any /tree/<branch> in the URL)
        #[arg(long)]
        branch: Option<String>,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download a repository into local storage and record it as an assignment
    Import {
        repo_url: String,

        /// Assignment title (defaults to the repository name)
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        subject_area: Option<String>,

        /// Tag to attach; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// List recorded assignments, newest first
    List {
        /// Include unpublished assignments
        #[arg(long)]
        all: bool,

        #[arg(long)]
        json: bool,
    },

    /// Edit an assignment's details or publish/unpublish it
    ///
    /// Example: edu-importer update 3 --title "Week 2" --unpublish
    Update {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        subject_area: Option<String>,

        /// Replace the tags; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long, conflicts_with = "unpublish")]
        publish: bool,

        #[arg(long)]
        unpublish: bool,

        #[arg(long)]
        json: bool,
    },

    /// Delete an assignment and its stored files
    Delete { id: u64 },

    /// Run the HTTP API
    Serve {
        #[arg(long, env = "EDU_PORT", default_value_t = 8000)]
        port: u16,
    },
}
