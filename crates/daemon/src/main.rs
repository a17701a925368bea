mod cli;

use clap::Parser;
use cli::{args::Args, op::Op, op::OpContext, Daemon, Health, Init, Job, Version};

subcommands! {
    Daemon => Daemon,
    Health => Health,
    Init => Init,
    Job => Job,
    Version => Version,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = match OpContext::new(args.remote, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: could not build daemon address: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
