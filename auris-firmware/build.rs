//! Build script for auris-firmware
//!
//! - Sets up linker search paths and arguments for memory.x
//! - Validates auris.toml at compile time
//! - Bundles coprocessor images from images/ into the firmware catalog

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest catalog the firmware accepts
const MAX_IMAGES: usize = 8;

/// Longest catalog entry name
const MAX_NAME_LEN: usize = 16;

/// Boot image file name; every other .bin is a firmware entry
const BOOT_IMAGE: &str = "boot.bin";

fn main() {
    setup_linker();
    validate_config();
    bundle_images();
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

/// Print a boxed build error and stop
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate auris.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=auris.toml");

    let config_path = Path::new("auris.toml");
    if !config_path.exists() {
        fail(
            "auris.toml not found!",
            &["The firmware embeds auris.toml from the crate directory".to_string()],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read auris.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in auris.toml",
            &e.to_string().lines().map(|l| l.to_string()).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_coproc(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_update(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in auris.toml", &errors);
    }

    println!("cargo:warning=auris.toml validated successfully");
}

fn validate_coproc(config: &toml::Value, errors: &mut Vec<String>) {
    let coproc = match config.get("coproc") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[coproc] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [coproc] section".to_string());
            return;
        }
    };

    let mut addrs = Vec::new();
    for key in ["data_addr", "cmd_addr"] {
        match coproc.get(key) {
            Some(toml::Value::Integer(addr)) if (0..=0x7F).contains(addr) => addrs.push(*addr),
            Some(_) => errors.push(format!("[coproc] {} must be a 7-bit address", key)),
            None => {}
        }
    }
    if addrs.len() == 2 && addrs[0] == addrs[1] {
        errors.push("[coproc] data_addr and cmd_addr must differ".to_string());
    }

    if let Some(value) = coproc.get("i2c_frequency") {
        match value {
            toml::Value::Integer(hz) if (10_000..=1_000_000).contains(hz) => {}
            _ => errors.push("[coproc] i2c_frequency must be 10000-1000000".to_string()),
        }
    }

    for key in ["vad_timeout_ms", "reset_hold_ms"] {
        if let Some(value) = coproc.get(key) {
            match value {
                toml::Value::Integer(ms) if *ms > 0 && *ms <= i64::from(i32::MAX) => {}
                _ => errors.push(format!("[coproc] {} must be a positive integer", key)),
            }
        }
    }

    if let Some(value) = coproc.get("current_version") {
        let valid = value.as_str().is_some_and(|v| {
            let parts: Vec<&str> = v.split('.').collect();
            parts.len() == 4 && parts.iter().all(|p| p.parse::<u8>().is_ok())
        });
        if !valid {
            errors.push("[coproc] current_version must look like \"0.0.0.3\"".to_string());
        }
    }
}

/// Pin number of a `[!^]*gpioN` string
fn pin_number(value: &str) -> Option<u8> {
    let digits = value.trim_start_matches(['!', '^']).strip_prefix("gpio")?;
    digits.parse::<u8>().ok().filter(|pin| *pin <= 29)
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let pins = match config.get("pins") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[pins] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [pins] section".to_string());
            return;
        }
    };

    let mut used: Vec<(u8, &str)> = Vec::new();
    for (key, value) in pins {
        let pin = match value.as_str().and_then(pin_number) {
            Some(pin) => pin,
            None => {
                errors.push(format!("[pins] {} must be \"gpio0\"-\"gpio29\"", key));
                continue;
            }
        };
        if let Some((_, other)) = used.iter().find(|(p, _)| *p == pin) {
            errors.push(format!("[pins] {} and {} share gpio{}", other, key, pin));
        }
        used.push((pin, key.as_str()));
    }
}

fn validate_update(config: &toml::Value, errors: &mut Vec<String>) {
    let update = match config.get("update") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[update] must be a table".to_string());
            return;
        }
        None => return,
    };

    match update.get("firmware") {
        Some(toml::Value::String(name)) if name.is_empty() => {}
        Some(toml::Value::String(name)) => {
            if name.len() > MAX_NAME_LEN {
                errors.push(format!("[update] firmware name longer than {}", MAX_NAME_LEN));
            }
            let image = Path::new("images").join(format!("{}.bin", name));
            if !image.exists() {
                errors.push(format!("[update] firmware '{}' not found in images/", name));
            }
        }
        Some(_) => errors.push("[update] firmware must be a string".to_string()),
        None => {}
    }
}

/// Generate `images.rs` with the boot image and firmware catalog
fn bundle_images() {
    println!("cargo:rerun-if-changed=images");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dir = Path::new("images");

    let mut boot: Option<PathBuf> = None;
    let mut firmware: Vec<(String, PathBuf)> = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            let path = fs::canonicalize(&path).unwrap();
            if path.file_name().and_then(|n| n.to_str()) == Some(BOOT_IMAGE) {
                boot = Some(path);
            } else if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                firmware.push((stem.to_string(), path.clone()));
            }
        }
    }
    firmware.sort();

    let mut errors = Vec::new();
    if firmware.len() > MAX_IMAGES {
        errors.push(format!("images/ holds more than {} firmware files", MAX_IMAGES));
    }
    if !firmware.is_empty() && boot.is_none() {
        errors.push(format!("images/ has firmware but no {}", BOOT_IMAGE));
    }
    for (name, _) in &firmware {
        if name.len() > MAX_NAME_LEN {
            errors.push(format!("image name '{}' longer than {}", name, MAX_NAME_LEN));
        }
    }
    if !errors.is_empty() {
        fail("Invalid coprocessor images", &errors);
    }

    let mut out = String::from("// Generated by build.rs from images/\n\n");
    match &boot {
        Some(path) => out.push_str(&format!(
            "pub static BOOT_IMAGE: &[u8] = include_bytes!({:?});\n\n",
            path
        )),
        None => out.push_str("pub static BOOT_IMAGE: &[u8] = &[];\n\n"),
    }
    out.push_str("pub static FIRMWARE_IMAGES: &[(&str, &[u8])] = &[\n");
    for (name, path) in &firmware {
        out.push_str(&format!("    ({:?}, include_bytes!({:?})),\n", name, path));
    }
    out.push_str("];\n");

    fs::write(out_dir.join("images.rs"), out).unwrap();
}
