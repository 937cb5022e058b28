//! Project initialization command (strata init)

use crate::adapters;
use crate::output::green_check;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use strata_config::{ConfigStore, CONFIG_FILE, MANIFEST_FILE};

/// Adapter used when no `-d` flag is given
pub const DEFAULT_ADAPTER: &str = "snowflake";

/// Project descriptor written to project.yml
pub const PROJECT_FILE: &str = "project.yml";

const GITIGNORE_FILE: &str = ".gitignore";

/// Arguments for the init command
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Project name; the directory is its url-safe form
    pub name: String,
    /// Adapter kinds to scaffold datasources for
    pub datasources: Vec<String>,
    /// Initialize git repository
    pub git: bool,
    /// Directory to create the project in
    pub path: PathBuf,
    /// Verbose output
    pub verbose: bool,
}

impl Default for InitArgs {
    fn default() -> Self {
        Self {
            name: String::new(),
            datasources: Vec::new(),
            git: true,
            path: PathBuf::from("."),
            verbose: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProjectFile<'a> {
    name: &'a str,
    uid: &'a str,
}

/// Run the init command, returning the project root
pub fn run(args: InitArgs) -> Result<PathBuf> {
    let uid = adapters::url_safe_str(&args.name);
    if uid.is_empty() {
        bail!("Project name '{}' has no usable characters", args.name);
    }

    let root = args.path.join(&uid);
    if ConfigStore::is_project_root(&root) {
        bail!(
            "Project already initialized: {} exists at {}",
            CONFIG_FILE,
            root.display()
        );
    }

    let existing: Vec<&str> = [PROJECT_FILE, MANIFEST_FILE]
        .into_iter()
        .filter(|file| root.join(file).exists())
        .collect();
    if !existing.is_empty() {
        bail!(
            "Refusing to overwrite {} in {}",
            existing.join(", "),
            root.display()
        );
    }

    let datasources = plan_datasources(&args.datasources)?;

    create_project(&root, &args.name, &uid, &datasources, args.verbose)?;

    if args.git {
        init_git(&root, args.verbose)?;
    }

    println!("\n{} Created Strata project '{}'", green_check(), args.name);
    println!("  Path: {}", root.display());
    println!("\nNext steps:");
    println!("  cd {}", uid);
    for (key, _) in &datasources {
        println!("  strata ds auth {}", key);
    }

    Ok(root)
}

/// Resolve `-d` flags into unique (key, adapter) pairs
fn plan_datasources(requested: &[String]) -> Result<Vec<(String, String)>> {
    let kinds: Vec<String> = if requested.is_empty() {
        vec![DEFAULT_ADAPTER.to_string()]
    } else {
        requested.iter().map(|k| adapters::normalize(k)).collect()
    };

    if let Some(bad) = kinds.iter().find(|k| !adapters::is_supported(k)) {
        bail!(
            "'{}' is not a supported adapter (supported: {})",
            bad,
            super::supported_list()
        );
    }

    let mut planned: Vec<(String, String)> = Vec::new();
    for kind in kinds {
        let mut key = kind.clone();
        let mut suffix = 1;
        while planned.iter().any(|(existing, _)| *existing == key) {
            key = format!("{}_{}", kind, suffix);
            suffix += 1;
        }
        planned.push((key, kind));
    }
    Ok(planned)
}

/// Create project structure
fn create_project(
    root: &Path,
    name: &str,
    uid: &str,
    datasources: &[(String, String)],
    verbose: bool,
) -> Result<()> {
    fs::create_dir_all(root).context("Failed to create project directory")?;
    for dir in ["schema", "tests"] {
        fs::create_dir_all(root.join(dir))
            .with_context(|| format!("Failed to create {} directory", dir))?;
    }

    if verbose {
        println!("Creating project structure...");
    }

    let project = serde_yaml::to_string(&ProjectFile { name, uid })
        .context("Failed to render project.yml")?;
    write_file(&root.join(PROJECT_FILE), &project, verbose)?;
    write_file(&root.join(CONFIG_FILE), &generate_local_config(), verbose)?;
    write_file(
        &root.join(MANIFEST_FILE),
        &generate_manifest(datasources),
        verbose,
    )?;
    update_gitignore(&root.join(GITIGNORE_FILE), verbose)?;

    tracing::debug!(root = %root.display(), datasources = datasources.len(), "project created");
    Ok(())
}

fn write_file(path: &Path, content: &str, verbose: bool) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    if verbose {
        println!("  Created {}", path.display());
    }
    Ok(())
}

/// Generate the project .strata content
fn generate_local_config() -> String {
    format!(
        "api_key: YOUR_STRATA_API_KEY\nserver: {}\n",
        strata_config::document::DEFAULT_SERVER
    )
}

/// Generate datasources.yml content
fn generate_manifest(datasources: &[(String, String)]) -> String {
    let mut manifest = String::from("# Datasources configuration\n");
    for (key, kind) in datasources {
        if let Some(block) = adapters::template(kind, key) {
            manifest.push('\n');
            manifest.push_str(&block);
        }
    }
    manifest
}

/// Generate .gitignore content
fn generate_gitignore() -> String {
    format!("# Local settings and credentials\n{}\n", CONFIG_FILE)
}

/// Create .gitignore, or append the `.strata` entry to an existing one that
/// lacks it
fn update_gitignore(path: &Path, verbose: bool) -> Result<()> {
    let current = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return write_file(path, &generate_gitignore(), verbose);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let ignored = current
        .lines()
        .map(str::trim)
        .any(|line| line == CONFIG_FILE || line.strip_prefix('/') == Some(CONFIG_FILE));
    if ignored {
        return Ok(());
    }

    let mut updated = current;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&generate_gitignore());
    fs::write(path, updated).with_context(|| format!("Failed to update {}", path.display()))?;
    if verbose {
        println!("  Updated {}", path.display());
    }
    Ok(())
}

/// Initialize git repository
fn init_git(path: &Path, verbose: bool) -> Result<()> {
    if path.join(".git").exists() {
        if verbose {
            println!("  Git repository already exists");
        }
        return Ok(());
    }

    let output = std::process::Command::new("git")
        .arg("init")
        .current_dir(path)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            if verbose {
                println!("  Initialized git repository");
            }
        }
        Ok(out) => {
            tracing::warn!(status = %out.status, "git init failed");
        }
        Err(e) => {
            tracing::debug!(error = %e, "git not found, skipping repository initialization");
        }
    }
    Ok(())
}
