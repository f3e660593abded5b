//! Doctor command implementation
//!
//! Checks that FluidSynth and a SoundFont can be found before a long run.

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use tonegen_backend_fluidsynth::synth::{FLUIDSYNTH_PATH_ENV, SOUNDFONT_ENV};
use tonegen_backend_fluidsynth::{FluidSynth, SynthError};
use tonegen_dataset::BackendError;

use super::args::SynthArgs;

/// Run the doctor command
///
/// Checks:
/// - FluidSynth executable and version
/// - SoundFont location
/// - Output directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(synth: &SynthArgs) -> Result<ExitCode> {
    println!("{}", "tonegen Doctor".cyan().bold());
    println!("{}", "==============".cyan());
    println!();

    let fluidsynth = synth.synthesizer();
    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} tonegen-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    all_ok &= check_fluidsynth(&fluidsynth);
    all_ok &= check_soundfont(&fluidsynth);
    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".tonegen_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

fn check_fluidsynth(synth: &FluidSynth) -> bool {
    let binary = match synth.find_fluidsynth() {
        Ok(binary) => binary,
        Err(e) => {
            print_failure(&e);
            println!(
                "     {}",
                format!("Install FluidSynth or set {}.", FLUIDSYNTH_PATH_ENV).dimmed()
            );
            return false;
        }
    };

    match synth.version() {
        Ok(version) => {
            println!(
                "  {} {} ({})",
                "ok".green(),
                parse_version(&version).unwrap_or(&version),
                binary.display()
            );
            true
        }
        Err(e) => {
            print_failure(&e);
            false
        }
    }
}

fn check_soundfont(synth: &FluidSynth) -> bool {
    match synth.find_soundfont() {
        Ok(path) => {
            println!("  {} SoundFont {}", "ok".green(), path.display());
            true
        }
        Err(e) => {
            print_failure(&e);
            println!(
                "     {}",
                format!("Pass --soundfont or set {}.", SOUNDFONT_ENV).dimmed()
            );
            false
        }
    }
}

fn print_failure(err: &SynthError) {
    println!("  {} [{}] {}", "!!".red(), err.code().yellow(), err.message());
}

/// Extracts "FluidSynth runtime version 2.3.4" from the banner line.
fn parse_version(banner: &str) -> Option<&str> {
    let start = banner.find("FluidSynth")?;
    Some(banner[start..].trim())
}
