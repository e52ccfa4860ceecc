use clap::{Arg, arg, command};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("hirescout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("hirescout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Show debug logging")
                .required(false)
                .conflicts_with("quiet"),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Configuration file (default: $HIRESCOUT_CONFIG, then ~/.config/hirescout/config.json)"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("harvest")
                .about("Scroll the company list and save every name to search.txt")
                .args(harvest_args())
                .args(session_args()),
        )
        .subcommand(
            command!("probe")
                .about("Check a saved company list against every job board")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("Newline-delimited company list (default: <output>/search.txt)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .args(probe_args())
                .args(session_args()),
        )
        .subcommand(
            command!("run")
                .about("Harvest the company list, then probe every company")
                .args(harvest_args())
                .args(probe_args())
                .args(session_args()),
        )
}

fn harvest_args() -> Vec<Arg> {
    vec![
        arg!(-u --"url" <URL>)
            .required(false)
            .help("The page rendering the company list")
            .value_parser(clap::value_parser!(Url)),
        arg!(--"sentinel" <NAME>)
            .required(false)
            .help("Stop harvesting once this name has been seen")
            .conflicts_with("ceiling"),
        arg!(--"ceiling" <COUNT>)
            .required(false)
            .help("Stop harvesting once this many names have been collected")
            .value_parser(clap::value_parser!(usize))
            .conflicts_with("sentinel"),
        arg!(--"no-growth" <ROUNDS>)
            .required(false)
            .help("Scroll rounds without a new name before the list counts as complete")
            .value_parser(clap::value_parser!(usize)),
        arg!(--"settle-ms" <MILLIS>)
            .required(false)
            .help("Pause after each scroll before reading rows")
            .value_parser(clap::value_parser!(u64)),
        arg!(--"wait-timeout-ms" <MILLIS>)
            .required(false)
            .help("How long to wait for list rows to appear")
            .value_parser(clap::value_parser!(u64)),
    ]
}

fn probe_args() -> Vec<Arg> {
    vec![
        arg!(-k --"keywords" <LIST>)
            .required(false)
            .help("Comma-separated role keywords (default: engineer,developer,Engineer,Developer)"),
        arg!(--"first-hit")
            .required(false)
            .help("Stop probing a company after its first hiring board")
            .action(clap::ArgAction::SetTrue),
        arg!(--"probe-settle-ms" <MILLIS>)
            .required(false)
            .help("Pause after loading a job board before counting matches")
            .value_parser(clap::value_parser!(u64)),
    ]
}

fn session_args() -> Vec<Arg> {
    vec![
        arg!(-d --"driver" <DRIVER>)
            .required(false)
            .help("Page driver: chromium renders JavaScript, static only fetches HTML")
            .value_parser(["chromium", "static"])
            .default_value("chromium"),
        arg!(--"headful")
            .required(false)
            .help("Show the browser window")
            .action(clap::ArgAction::SetTrue),
        arg!(-o --"output" <DIR>)
            .required(false)
            .help("Directory for result files (default: results)"),
    ]
}
