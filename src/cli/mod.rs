// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `encode`    — build a stack and run a padded batch
//   2. `neighbors` — rank the closest tokens to a word
//
// `--device` picks the Burn backend; both use cases are
// generic over it.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::{
    backend::{
        ndarray::{NdArray, NdArrayDevice},
        wgpu::{Wgpu, WgpuDevice},
    },
    prelude::Backend,
};
use clap::Parser;
use commands::{Commands, DeviceKind, EncodeArgs, NeighborsArgs};

use crate::application::{
    encode_use_case::{EncodeUseCase, RunConfig},
    neighbors_use_case::NeighborsUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "nlp-encoder",
    version = "0.1.0",
    about = "Run a Transformer encoder stack and explore its embedding space."
)]
pub struct Cli {
    /// Backend to run on
    #[arg(long, value_enum, global = true, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,

    /// The subcommand to run (encode or neighbors)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the device and subcommand, then dispatch.
    pub fn run(self) -> Result<()> {
        match self.device {
            DeviceKind::Cpu => self.dispatch::<NdArray>(&NdArrayDevice::Cpu),
            DeviceKind::Gpu => self.dispatch::<Wgpu>(&WgpuDevice::default()),
        }
    }

    fn dispatch<B: Backend>(&self, device: &B::Device) -> Result<()> {
        tracing::info!("Using {:?} backend", self.device);
        match &self.command {
            Commands::Encode(args)    => run_encode::<B>(args, device),
            Commands::Neighbors(args) => run_neighbors::<B>(args, device),
        }
    }
}

/// Handles the `encode` subcommand.
fn run_encode<B: Backend>(args: &EncodeArgs, device: &B::Device) -> Result<()> {
    let report = EncodeUseCase::new(RunConfig::from(args))
        .with_save(args.save)
        .with_tokenizer(args.tokenizer.clone())
        .execute::<B>(device)?;

    println!("Output shape:     {:?}", report.output_dims);
    println!("Sequence lengths: {:?}", report.lengths);
    println!("Mean / std:       {:.4} / {:.4}", report.mean, report.std);
    if args.save {
        println!("Checkpoint saved to '{}'.", args.checkpoint_dir);
    }
    Ok(())
}

/// Handles the `neighbors` subcommand.
fn run_neighbors<B: Backend>(args: &NeighborsArgs, device: &B::Device) -> Result<()> {
    let neighbors = NeighborsUseCase::new(&args.checkpoint_dir, args.tokenizer.clone())
        .nearest::<B>(&args.word, args.top_k, device)?;

    println!("\nNearest neighbours of '{}':", args.word.to_lowercase());
    for (rank, neighbor) in neighbors.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, neighbor);
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_encode_defaults() {
        let cli = Cli::try_parse_from(["nlp-encoder", "encode"]).unwrap();
        assert_eq!(cli.device, DeviceKind::Cpu);
        match cli.command {
            Commands::Encode(args) => {
                let cfg = RunConfig::from(&args);
                assert_eq!(cfg, RunConfig::default());
                assert!(!args.save);
            }
            other => panic!("expected encode, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_neighbors_with_device() {
        let cli = Cli::try_parse_from([
            "nlp-encoder", "neighbors", "--word", "Cat", "--top-k", "3", "--device", "gpu",
        ])
        .unwrap();
        assert_eq!(cli.device, DeviceKind::Gpu);
        match cli.command {
            Commands::Neighbors(args) => {
                assert_eq!(args.word, "Cat");
                assert_eq!(args.top_k, 3);
            }
            other => panic!("expected neighbors, got {other:?}"),
        }
    }

    #[test]
    fn test_neighbors_requires_word() {
        assert!(Cli::try_parse_from(["nlp-encoder", "neighbors"]).is_err());
    }
}
