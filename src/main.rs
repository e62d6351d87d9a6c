use args::LotteryArgs;
use clap::Parser;
use color_eyre::Result;

mod action;
mod args;
mod celebration;
mod entry;
mod lottery;
mod phase;
mod renderer;
mod source;
mod timer;
mod ui;

fn main() -> Result<()> {
    let args = LotteryArgs::parse().clamped();
    ui::main(args)
}
