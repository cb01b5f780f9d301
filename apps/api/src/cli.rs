use clap::Parser;

/// Local résumé optimizer backed by an Ollama inference server.
#[derive(Debug, Default, Parser)]
#[command(name = "atspro", version)]
pub struct Args {
    /// Inference server base URL. Takes precedence over NEXT_PUBLIC_OLLAMA_URL / OLLAMA_URL.
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Port to listen on. Overrides PORT.
    #[arg(long)]
    pub port: Option<u16>,
}
