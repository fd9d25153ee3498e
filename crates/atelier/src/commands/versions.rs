//! Version history command handlers.
//!
//! Handles listing, inspecting, diffing, restoring, deleting and importing
//! saved versions of a design.

use anyhow::Context;
use atelier_history::snapshot::{ElementKind, Snapshot};
use atelier_history::{Version, VersionStore};
use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::io::{self, Write};
use std::path::PathBuf;

/// Version subcommands.
#[derive(Subcommand)]
pub enum VersionCommands {
    /// List saved versions of a design, newest first
    List {
        /// Design ID
        design: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version count, size and time span of a design
    Info {
        /// Design ID
        design: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single version
    Show {
        /// Design ID
        design: String,
        /// Version ID
        version: String,
        /// Print the full version as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two versions element by element
    Diff {
        /// Design ID
        design: String,
        /// Older version ID
        from: String,
        /// Newer version ID
        to: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a version's snapshot as JSON
    Restore {
        /// Design ID
        design: String,
        /// Version ID
        version: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a single version
    Delete {
        /// Design ID
        design: String,
        /// Version ID
        version: String,
    },
    /// Delete every version of a design
    Clear {
        /// Design ID
        design: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Save a snapshot JSON file as a new version
    Import {
        /// Design ID
        design: String,
        /// Snapshot file
        file: PathBuf,
    },
}

/// Handle version commands.
pub async fn handle_versions(command: VersionCommands, store: &VersionStore) -> anyhow::Result<()> {
    match command {
        VersionCommands::List { design, json } => {
            let versions = store.get_versions(&design).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&versions)?);
            } else if versions.is_empty() {
                println!("No versions found for {design}.");
            } else {
                println!("Versions of {design}:");
                println!();
                println!(
                    "{:<32} {:<20} {:>10} {:>9}",
                    "ID", "SAVED", "SIZE", "ELEMENTS"
                );
                println!("{}", "-".repeat(74));

                for version in &versions {
                    println!(
                        "{:<32} {:<20} {:>10} {:>9}",
                        version.id().as_str(),
                        format_time(version.timestamp()),
                        ByteSize::b(version.size()).to_string(),
                        version.data().elements.len()
                    );
                }
            }
        }
        VersionCommands::Info { design, json } => {
            let info = store.get_version_info(&design).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Design: {design}");
                println!("Versions: {} (keeping {})", info.count, store.max_versions());
                println!("Total size: {}", ByteSize::b(info.total_size));
                if let Some(newest) = info.newest {
                    println!("Newest: {}", format_time(newest));
                }
                if let Some(oldest) = info.oldest {
                    println!("Oldest: {}", format_time(oldest));
                }
            }
        }
        VersionCommands::Show {
            design,
            version,
            json,
        } => {
            let version = store.get_version(&design, &version).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&version)?);
            } else {
                print_version_details(&version);
            }
        }
        VersionCommands::Diff {
            design,
            from,
            to,
            json,
        } => {
            let diff = store.diff_versions(&design, &from, &to).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else if diff.is_empty() {
                println!("No changes between {from} and {to}.");
            } else {
                println!("Changes from {from} to {to}: {}", diff.summary());
                println!();
                for element in &diff.added {
                    println!("  + {:<28} {}", element.id, kind_label(element.kind));
                }
                for element in &diff.removed {
                    println!("  - {:<28} {}", element.id, kind_label(element.kind));
                }
                for change in &diff.modified {
                    println!("  ~ {:<28} {}", change.id(), kind_label(change.after.kind));
                }
            }
        }
        VersionCommands::Restore {
            design,
            version,
            output,
        } => {
            let snapshot = store.restore_version(&design, &version).await?;
            let json = serde_json::to_string_pretty(&snapshot)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Restored {version} to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        VersionCommands::Delete { design, version } => {
            // Deleting an unknown id is a no-op in the store; report it here
            store.get_version(&design, &version).await?;

            if !store.delete_version(&design, &version).await {
                anyhow::bail!("Failed to delete version {version}");
            }
            println!("Version deleted: {version}");
        }
        VersionCommands::Clear { design, yes } => {
            let count = store.get_version_info(&design).await.count;
            if count == 0 {
                println!("No versions found for {design}.");
                return Ok(());
            }

            if !yes && !confirm(&format!("Delete all {count} versions of {design}?"))? {
                println!("Cancelled.");
                return Ok(());
            }

            if !store.clear_versions(&design).await {
                anyhow::bail!("Failed to clear versions of {design}");
            }
            println!("Deleted {count} versions of {design}.");
        }
        VersionCommands::Import { design, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a design snapshot", file.display()))?;

            let version = store.save_version_checked(&design, snapshot).await?;
            println!(
                "Saved version {} ({} elements, {})",
                version.id(),
                version.data().elements.len(),
                ByteSize::b(version.size())
            );
        }
    }

    Ok(())
}

/// List every design that has saved versions.
pub async fn handle_designs(store: &VersionStore) -> anyhow::Result<()> {
    let designs = store.list_designs().await?;

    if designs.is_empty() {
        println!("No designs found.");
        return Ok(());
    }

    println!("Designs:");
    println!();
    println!("{:<32} {:>8} {:<20} {:>10}", "ID", "VERSIONS", "NEWEST", "SIZE");
    println!("{}", "-".repeat(73));

    for design in designs {
        let info = store.get_version_info(&design).await;
        let newest = info.newest.map(format_time).unwrap_or_else(|| "-".into());
        println!(
            "{:<32} {:>8} {:<20} {:>10}",
            design,
            info.count,
            newest,
            ByteSize::b(info.total_size).to_string()
        );
    }

    Ok(())
}

fn print_version_details(version: &Version) {
    let snapshot = version.data();

    println!("Version: {}", version.id());
    println!("Design: {}", version.design_id());
    println!("Saved: {}", format_time(version.timestamp()));
    println!("Size: {}", ByteSize::b(version.size()));
    println!("Active layer: {}", snapshot.active_layer_id);
    if let Some(fabric) = &snapshot.fabric_id {
        println!("Fabric: {fabric}");
    }
    println!();

    println!("Layers ({}):", snapshot.layers.len());
    for layer in &snapshot.layers {
        let hidden = if layer.visible { "" } else { " (hidden)" };
        println!("  {:<28} {}{}", layer.id, layer.name, hidden);
    }

    println!("Elements ({}):", snapshot.elements.len());
    for element in &snapshot.elements {
        println!(
            "  {:<28} {:<8} {}",
            element.id,
            kind_label(element.kind),
            element.layer_id
        );
    }

    if !snapshot.paths.is_empty() {
        println!("Paths ({}):", snapshot.paths.len());
        for path in &snapshot.paths {
            println!("  {:<28} {} points", path.id, path.points.len());
        }
    }
}

fn kind_label(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Panel => "panel",
        ElementKind::Trim => "trim",
        ElementKind::Shape => "shape",
        ElementKind::Text => "text",
        ElementKind::Image => "image",
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` declines.
fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
