use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a .obj model to load at startup. Without it the viewer
    /// starts with the built-in placeholder; load a model with the L key.
    pub model: Option<std::path::PathBuf>,
}
