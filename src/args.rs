use clap::Parser;
use std::path::PathBuf;

pub const MAX_ROUNDS: u32 = 64;

/// Terminal card lottery
#[derive(Parser, Clone, Default, Debug)]
#[command(version, about, long_about = None)]
pub struct LotteryArgs {
    /// number of winners to draw
    #[arg(short, long, default_value_t = 4)]
    pub rounds: u32,
    /// directory holding the card images
    #[arg(short = 'd', long, default_value = "images")]
    pub image_dir: PathBuf,
    /// use every image in the image directory when no names are given
    #[arg(short, long)]
    pub scan: bool,
    /// fixed seed for the shuffle
    #[arg(long)]
    pub seed: Option<u64>,
    /// write a debug log to this file
    #[arg(short, long)]
    pub log: Option<PathBuf>,
    /// image file names, relative to the image directory
    pub images: Vec<String>,
}

impl LotteryArgs {
    pub fn clamped(mut self) -> Self {
        self.rounds = self.rounds.clamp(1, MAX_ROUNDS);
        self
    }
}
