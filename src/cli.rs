use crate::config::Config;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "hospitalsrv",
    about = "HTTP front end that serves the hospital website and admin dashboard",
    version,
    author
)]
pub struct Args {
    /// Port to listen on, overrides SERVER_PORT
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Backend REST API base URL, overrides BACKEND_API_URL
    #[arg(long)]
    pub backend_url: Option<String>,
}

impl Args {
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(ref backend_url) = self.backend_url {
            config.backend_api_url = backend_url.clone();
        }
    }
}
