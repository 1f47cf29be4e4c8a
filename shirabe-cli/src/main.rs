use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shirabe_core::{EntryRef, Image, ImageCache};

/// Simple ELF/DWARF introspection CLI
#[derive(Parser)]
#[command(
    name = "shirabe",
    about = "Inspect ELF debug info (sections, compilation units, and DIE trees)",
    version,
    author
)]
struct Cli {
    /// Path to binary file
    #[arg(required = true)]
    path: std::path::PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all sections
    Sections,
    /// Show all compilation units
    Units,
    /// Dump the debug entry tree
    Tree {
        /// Emit JSON instead of indented text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct EntryDump {
    tag: String,
    offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<EntryDump>,
}

fn dump_entry(entry: EntryRef) -> EntryDump {
    EntryDump {
        tag: entry.tag().to_string(),
        offset: entry.offset(),
        name: entry.name().map(str::to_string),
        children: entry.children().map(dump_entry).collect(),
    }
}

fn print_entry(entry: EntryRef, depth: usize) {
    let name = entry.name().unwrap_or("");
    println!(
        "{:indent$}<{:#x}> {} {}",
        "",
        entry.offset(),
        entry.tag(),
        name,
        indent = depth * 2
    );
    for child in entry.children() {
        print_entry(child, depth + 1);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Sections => {
            let image = Image::open(&cli.path)?;
            if image.sections().is_empty() {
                println!("No sections found (possibly stripped binary).");
            } else {
                println!(
                    "{:<24} {:<18} {:<10} {:<10} {:<10}",
                    "Section", "Addr", "Size", "Offset", "Flags"
                );
                println!("{}", "-".repeat(80));
                for s in image.sections() {
                    println!(
                        "{:<24} 0x{:<16x} {:<10x} {:<10x} {:<10x}",
                        s.name, s.addr, s.size, s.file_offset, s.flags
                    );
                }
            }
        }

        Command::Units => {
            let cache = ImageCache::new();
            let dwarf = cache.get(&cli.path)?;
            log::debug!("{} unit(s) in {}", dwarf.unit_count(), cli.path.display());
            println!(
                "{:<12} {:<8} {:<10} {:<10}",
                "Offset", "Version", "AddrSize", "Name"
            );
            println!("{}", "-".repeat(60));
            for unit in dwarf.units() {
                println!(
                    "{:<#12x} {:<8} {:<10} {:<10}",
                    unit.offset(),
                    unit.version(),
                    unit.address_size(),
                    unit.name().unwrap_or("<unnamed>")
                );
            }
        }

        Command::Tree { json } => {
            let cache = ImageCache::new();
            let dwarf = cache.get(&cli.path)?;
            if json {
                let units: Vec<EntryDump> =
                    dwarf.units().map(|u| dump_entry(u.root())).collect();
                println!("{}", serde_json::to_string_pretty(&units)?);
            } else {
                for unit in dwarf.units() {
                    print_entry(unit.root(), 0);
                }
            }
        }
    }

    Ok(())
}
