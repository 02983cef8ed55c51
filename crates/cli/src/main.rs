use clap::Parser;

mod args;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();
    objview_viewer::run(args.model)
}
