use clap::Parser;
use marquee_cli::recent_cmd::RecentCommand;
use marquee_cli::search_cmd::SearchCommand;
use marquee_cli::session_cmd::SessionCommand;

/// Incremental search from the terminal.
#[derive(Debug, Parser)]
#[clap(author, version, bin_name = "marquee")]
struct MarqueeCli {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Run one query and print the grouped results.
    Search(SearchCommand),

    /// Drive the search overlay line by line from stdin.
    Session(SessionCommand),

    /// List or clear recent searches.
    Recent(RecentCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    marquee_cli::init_tracing();
    let cli = MarqueeCli::parse();
    match cli.subcommand {
        Subcommand::Search(cmd) => cmd.run().await,
        Subcommand::Session(cmd) => cmd.run().await,
        Subcommand::Recent(cmd) => cmd.run(),
    }
}
