//! Open a LIB/LIBP archive, list its entries, and extract them to disk.
//!
//! Usage:
//!   cargo run --release --example extract --features crypto -- archive.lib output_dir/

use lib_stream::{ByteMedia, KnownKeys, LibArchive, LocalFileMedia};
use std::path::Path;
use std::sync::Arc;

/// Candidate keys tried against encrypted archives. Real hosts load these
/// from their own key store; the demo ships a couple of placeholders.
fn known_keys() -> KnownKeys {
    [
        ("sample-a", *b"0123456789abcdef"),
        ("sample-b", *b"fedcba9876543210"),
    ]
    .into_iter()
    .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: extract <archive.lib> <output_dir>");
        eprintln!("  extract ./data.lib ./out/");
        std::process::exit(1);
    }

    let archive_path = &args[1];
    let output_dir = Path::new(&args[2]);

    std::fs::create_dir_all(output_dir)?;

    let media: Arc<dyn ByteMedia> = Arc::new(LocalFileMedia::new(archive_path)?);

    // Plain first; fall back to the encrypted variant with known keys.
    let archive = match LibArchive::open_plain(media.clone()) {
        Ok(archive) => archive,
        Err(e) if e.is_not_recognized() => LibArchive::open_encrypted(media, &known_keys())?,
        Err(e) => return Err(e.into()),
    };

    if let Some(key) = archive.key_name() {
        println!("Decrypted with key '{key}'");
    }
    println!("{} entr(ies) in archive:", archive.entries().len());
    for entry in archive.entries() {
        println!("  {} ({} bytes)", entry.name, entry.size);
    }

    for entry in archive.entries() {
        let content = archive.read_entry(entry)?;
        let out_path = output_dir.join(&entry.name);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out_path, &content)?;
        println!("Extracted {} ({} bytes)", entry.name, content.len());
    }

    Ok(())
}
