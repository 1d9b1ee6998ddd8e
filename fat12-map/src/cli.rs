use clap::Parser;
use std::path::PathBuf;

/// Draws the cluster map of a FAT12 image and lists its root directory
#[derive(Parser)]
pub struct Cli {
    /// FAT12 volume image, e.g. a floppy dump
    pub image: PathBuf,

    /// Path inside the image whose contents are printed
    #[arg(long, short)]
    pub file: Option<String>,

    /// Wrap the cluster map after this many clusters
    #[arg(long, short)]
    pub width: Option<usize>,
}
