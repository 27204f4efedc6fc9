use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the server, accepting line-protocol TCP connections.
    Server(ServerArgs),
    /// Connect to a running server and type commands interactively.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Port to listen on.
    #[arg(default_value_t = 6379)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Server address to connect to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to connect to.
    #[arg(long, default_value_t = 6379)]
    pub port: u16,
}
