use clap::Parser;

/// Merge container images into a single multi-platform manifest list
#[derive(Parser)]
#[command(name = "manifest-merge")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "Example: manifest-merge --target repo/app:v1.0.0 repo/app:v1.0.0-linux repo/app:v1.0.0-windows"
)]
pub struct Cli {
    /// Source manifest or image references, merged in the order given
    #[arg(value_name = "IMAGE", num_args = 2.., required = true)]
    pub sources: Vec<String>,

    /// Publish the merged manifest list to this reference instead of
    /// printing it to stdout
    #[arg(short, long, value_name = "IMAGE")]
    pub target: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
