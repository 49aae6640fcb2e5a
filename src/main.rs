// Entry point for the Alfred script filters.
// Prints one script filter document on stdout; errors are rendered as a result row.

use clap::Parser;
use tracing::error;

use alfred_filters::{app, config::Cli, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let output = app::render(app::run(cli.command).await);

    match serde_json::to_string(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!(error = %e, "failed to encode script filter output");
            std::process::exit(1);
        }
    }
}
