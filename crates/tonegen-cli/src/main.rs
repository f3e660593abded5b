//! tonegen CLI - Synthetic single-tone instrument dataset generator
//!
//! This binary samples note parameters, renders them through FluidSynth and
//! reads the resulting datasets back.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tonegen_cli::commands;
use tonegen_cli::commands::args::{RenderArgs, SamplerArgs, SynthArgs};

/// tonegen - Synthetic Instrument Dataset Generator
#[derive(Parser)]
#[command(name = "tonegen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample notes, render them and cut the clips
    Generate {
        /// Number of notes to generate
        #[arg(short = 'c', long)]
        count: usize,

        /// Dataset directory
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        sampler: SamplerArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Replace artifacts of an earlier run
        #[arg(long)]
        force: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Sample note parameters without rendering them
    Sample {
        /// Number of notes to sample
        #[arg(short = 'c', long)]
        count: usize,

        /// Dataset directory
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        sampler: SamplerArgs,

        /// Replace an existing parameter table
        #[arg(long)]
        force: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render the parameters.csv of an existing dataset directory
    Render {
        /// Dataset directory holding parameters.csv
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Replace artifacts of an earlier render
        #[arg(long)]
        force: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Open a dataset and print a summary
    Inspect {
        /// Dataset directory
        #[arg(short, long)]
        path: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check FluidSynth and SoundFont availability
    Doctor {
        #[command(flatten)]
        synth: SynthArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            count,
            output_dir,
            sampler,
            render,
            force,
            json,
        } => commands::generate::run(count, &output_dir, &sampler, &render, force, json),
        Commands::Sample {
            count,
            output_dir,
            sampler,
            force,
            json,
        } => commands::sample::run(count, &output_dir, &sampler, force, json),
        Commands::Render {
            output_dir,
            render,
            force,
            json,
        } => commands::render::run(&output_dir, &render, force, json),
        Commands::Inspect { path, json } => commands::inspect::run(&path, json),
        Commands::Doctor { synth } => commands::doctor::run(&synth),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
