use clap::Parser;
use swarmtreasury::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
