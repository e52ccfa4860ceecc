use clap::ArgMatches;
use colored::Colorize;
use hirescout_core::config::Settings;
use hirescout_core::persist::{PersistReport, SEARCH_FILE, persist_run, write_search_list};
use hirescout_core::run::{CompanySource, RunCallbacks, RunReport, execute_harvest, execute_run};
use hirescout_scanner::error::Result as ScanResult;
use hirescout_scanner::harvester::{HarvestReport, TerminationPolicy};
use hirescout_scanner::result::CompanyVerdict;
use hirescout_scanner::{ChromiumDriver, DriverKind, PageDriver, StaticDriver};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn opt<'a, T: Clone + Send + Sync + 'static>(args: &'a ArgMatches, id: &str) -> Option<&'a T> {
    // Subcommands carry different argument sets; a missing id is simply unset.
    args.try_get_one::<T>(id).ok().flatten()
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    opt::<bool>(args, id).copied().unwrap_or(false)
}

/// Apply command-line overrides on top of loaded settings.
pub fn apply_overrides(settings: &mut Settings, args: &ArgMatches) {
    if let Some(url) = opt::<url::Url>(args, "url") {
        settings.source.url = url.to_string();
    }
    if let Some(sentinel) = opt::<String>(args, "sentinel") {
        settings.termination.policy = TerminationPolicy::Sentinel(sentinel.clone());
    }
    if let Some(ceiling) = opt::<usize>(args, "ceiling") {
        settings.termination.policy = TerminationPolicy::Ceiling(Some(*ceiling));
    }
    if let Some(rounds) = opt::<usize>(args, "no-growth") {
        settings.termination.no_growth_limit = *rounds;
    }
    if let Some(ms) = opt::<u64>(args, "settle-ms") {
        settings.timing.harvest_settle_ms = *ms;
    }
    if let Some(ms) = opt::<u64>(args, "wait-timeout-ms") {
        settings.timing.wait_timeout_ms = *ms;
    }
    if let Some(ms) = opt::<u64>(args, "probe-settle-ms") {
        settings.timing.probe_settle_ms = *ms;
    }
    if let Some(keywords) = opt::<String>(args, "keywords") {
        settings.keywords = keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
    }
    if flag(args, "first-hit") {
        settings.stop_on_first_hit = true;
    }
    if flag(args, "headful") {
        settings.browser.headless = false;
    }
    if let Some(dir) = opt::<String>(args, "output") {
        settings.output_dir = dir.clone();
    }
}

/// Resolve the config file, apply overrides and validate the result.
pub fn build_settings(config: Option<&str>, args: &ArgMatches) -> anyhow::Result<Settings> {
    let mut settings = Settings::load_or_default(config)?;
    apply_overrides(&mut settings, args);
    settings.validate()?;
    Ok(settings)
}

pub fn driver_kind(args: &ArgMatches) -> DriverKind {
    opt::<String>(args, "driver")
        .and_then(|name| DriverKind::from_str(name))
        .unwrap_or_default()
}

/// The list `probe` reads: `--input`, or the search list of the output directory.
pub fn probe_input(settings: &Settings, args: &ArgMatches) -> PathBuf {
    opt::<PathBuf>(args, "input")
        .cloned()
        .unwrap_or_else(|| settings.output_path().join(SEARCH_FILE))
}

async fn create_driver(kind: DriverKind, settings: &Settings) -> ScanResult<Box<dyn PageDriver>> {
    match kind {
        DriverKind::Chromium => {
            let driver = ChromiumDriver::launch(settings.chromium_options()).await?;
            Ok(Box::new(driver))
        }
        DriverKind::Static => {
            let timeout = Duration::from_millis(settings.timing.navigation_timeout_ms);
            Ok(Box::new(StaticDriver::with_timeout(timeout)?))
        }
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

fn settings_or_exit(config: Option<&str>, args: &ArgMatches) -> Settings {
    match build_settings(config, args) {
        Ok(settings) => settings,
        Err(e) => fail(format!("{:#}", e)),
    }
}

async fn driver_or_exit(settings: &Settings, args: &ArgMatches) -> Box<dyn PageDriver> {
    let kind = driver_kind(args);
    match create_driver(kind, settings).await {
        Ok(driver) => driver,
        Err(e) => fail(format!("Could not start the {:?} driver: {}", kind, e)),
    }
}

async fn close_driver(mut driver: Box<dyn PageDriver>) {
    if let Err(e) = driver.close().await {
        warn!("Failed to close the page driver: {}", e);
    }
}

fn harvest_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Harvesting companies...");
    spinner
}

fn callbacks_with_spinner(spinner: &ProgressBar) -> RunCallbacks {
    let progress_bar = spinner.clone();
    let message_bar = spinner.clone();
    let verdict_bar = spinner.clone();

    RunCallbacks {
        on_message: Some(Arc::new(move |msg: String| {
            message_bar.suspend(|| println!("{}", msg.yellow()));
        })),
        on_harvest_progress: Some(Arc::new(move |count: usize| {
            progress_bar.set_message(format!("Harvesting companies... {} found", count));
        })),
        on_verdict: Some(Arc::new(move |verdict: &CompanyVerdict| {
            // The first verdict means the harvest phase is over.
            if !verdict_bar.is_finished() {
                verdict_bar.finish_and_clear();
            }
            print_verdict(verdict);
        })),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn print_verdict(verdict: &CompanyVerdict) {
    if verdict.resolved() {
        for url in &verdict.hit_urls {
            println!(
                "{} Success - {}: {}",
                "✓".green().bold(),
                verdict.company.bright_white(),
                url
            );
        }
    } else {
        println!(
            "{} Unresolved - {}",
            "✗".yellow().bold(),
            verdict.company.bright_white()
        );
    }
}

fn print_harvest(report: &HarvestReport) {
    let marker = if report.converged() {
        "✓".green().bold()
    } else {
        "⚠".yellow().bold()
    };
    println!(
        "{} Harvested {} companies after {} scrolls ({})",
        marker,
        report.names.len().to_string().cyan(),
        report.scrolls,
        report.reason.describe()
    );
}

fn print_persisted(persisted: &PersistReport) {
    for path in &persisted.written {
        println!(
            "  {} {}",
            "✓".green(),
            path.display().to_string().bright_white()
        );
    }
    for (path, error) in &persisted.failed {
        eprintln!(
            "  {} {}: {}",
            "✗".red().bold(),
            path.display(),
            error
        );
    }
}

fn print_summary(report: &RunReport, persisted: &PersistReport) {
    let results = &report.results;

    println!();
    print_divider();
    println!("{}", "  SUMMARY".bright_white().bold());
    print_divider();
    println!("  Companies searched: {}", results.search.len().to_string().cyan());
    println!("  Keys probed:        {}", report.keys.len().to_string().cyan());
    println!("  Hiring boards:      {}", results.found.len().to_string().green());
    println!("  Unresolved:         {}", results.unresolved.len().to_string().yellow());
    println!("  Failed board loads: {}", results.failed_probes());
    println!();
    print_persisted(persisted);
    println!();

    if report.accomplished() {
        println!("{}", "Mission accomplished.".green().bold());
    } else {
        println!("{}", "Completed with errors.".yellow().bold());
    }
}

pub async fn handle_harvest(config: Option<&str>, args: &ArgMatches) {
    let settings = settings_or_exit(config, args);
    let mut driver = driver_or_exit(&settings, args).await;

    let spinner = harvest_spinner();
    let callbacks = callbacks_with_spinner(&spinner);
    let url = settings.source.url.clone();
    let report = execute_harvest(driver.as_mut(), &settings, &url, &callbacks).await;
    spinner.finish_and_clear();
    close_driver(driver).await;

    print_harvest(&report);
    let output = settings.output_path();
    match write_search_list(&report.names, &output) {
        Ok(path) => println!(
            "  {} {}",
            "✓".green(),
            path.display().to_string().bright_white()
        ),
        Err(e) => fail(format!("Error writing to {}: {}", output.display(), e)),
    }
}

pub async fn handle_probe(config: Option<&str>, args: &ArgMatches) {
    let settings = settings_or_exit(config, args);
    let input = probe_input(&settings, args);
    println!(
        "{} Probing companies from {}",
        "→".blue(),
        input.display().to_string().bright_white()
    );

    run_and_report(settings, args, CompanySource::File(input)).await;
}

pub async fn handle_run(config: Option<&str>, args: &ArgMatches) {
    let settings = settings_or_exit(config, args);
    let url = settings.source.url.clone();
    println!("{} Harvesting {}", "→".blue(), url.bright_white());

    run_and_report(settings, args, CompanySource::Harvest { url }).await;
}

async fn run_and_report(settings: Settings, args: &ArgMatches, source: CompanySource) {
    let mut driver = driver_or_exit(&settings, args).await;
    let harvesting = matches!(source, CompanySource::Harvest { .. });

    let spinner = if harvesting {
        harvest_spinner()
    } else {
        ProgressBar::hidden()
    };
    let callbacks = callbacks_with_spinner(&spinner);

    let report = execute_run(driver.as_mut(), &settings, source, &callbacks).await;
    spinner.finish_and_clear();
    close_driver(driver).await;

    if let Some(ref harvest) = report.harvest {
        print_harvest(harvest);
    }

    let output = settings.output_path();
    let persisted = persist_run(&report, &output);
    if !persisted.is_complete() {
        warn!("{} result files were not written", persisted.failed.len());
    }

    print_summary(&report, &persisted);
}
