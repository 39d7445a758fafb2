mod api;
mod commands;
mod formats;
mod iotools;
mod query;

use commands::Command;
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    commands::Main::from_args().execute()
}
