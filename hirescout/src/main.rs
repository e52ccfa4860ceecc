use hirescout::command_argument_builder;
use hirescout::handlers::{handle_harvest, handle_probe, handle_run};
use hirescout_core::print_banner;
use tracing::Level;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(quiet, verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let config = chosen_command.get_one::<String>("config").map(String::as_str);

    match chosen_command.subcommand() {
        Some(("harvest", primary_command)) => handle_harvest(config, primary_command).await,
        Some(("probe", primary_command)) => handle_probe(config, primary_command).await,
        Some(("run", primary_command)) => handle_run(config, primary_command).await,
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
