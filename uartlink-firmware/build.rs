//! Build script for uartlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uartlink_core::LinkConfig;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml at compile time
///
/// The file is checked twice: once as full TOML (catches syntax the
/// on-device parser would misread) and once with the on-device parser
/// itself. Both must produce the same configuration.
fn validate_config() {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");
    if !config_path.exists() {
        fail(
            "link.toml not found",
            &["The firmware embeds link.toml from the uartlink-firmware directory."],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read link.toml", &[&e.to_string()]),
    };

    let document: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in link.toml", &[&e.to_string()]),
    };

    // Only the [link] section is allowed
    if let Some(table) = document.as_table() {
        let extra: Vec<String> = table
            .keys()
            .filter(|k| k.as_str() != "link")
            .map(|k| format!("Unexpected top-level entry '{}'", k))
            .collect();
        if !extra.is_empty() {
            let lines: Vec<&str> = extra.iter().map(String::as_str).collect();
            fail("Invalid link.toml layout", &lines);
        }
    }

    let from_toml: LinkConfig = match document.get("link") {
        Some(section) => match section.clone().try_into() {
            Ok(config) => config,
            Err(e) => fail("Invalid [link] section", &[&e.to_string()]),
        },
        None => LinkConfig::default(),
    };

    if let Err(e) = from_toml.validate() {
        fail("Invalid link configuration", &[&format!("{:?}", e)]);
    }

    let on_device = match uartlink_core::parse_config(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "link.toml uses syntax the on-device parser does not support",
            &[&format!("{:?}", e)],
        ),
    };

    if on_device != from_toml {
        fail(
            "link.toml is read differently on the device",
            &[
                &format!("toml:   {:?}", from_toml),
                &format!("device: {:?}", on_device),
            ],
        );
    }

    println!("cargo:warning=link.toml validated successfully");
}

/// Abort the build with a boxed error message
fn fail(title: &str, details: &[&str]) -> ! {
    let body = details
        .iter()
        .flat_map(|d| d.lines())
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
