use clap::Parser;
use metamorph::cli;

fn main() -> metamorph::Result<()> {
    let args = cli::Args::parse();
    cli::run(args)
}
