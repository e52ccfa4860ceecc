pub mod config;
pub mod normalize;
pub mod persist;
pub mod results;
pub mod run;

pub use config::{ConfigError, Settings};
pub use normalize::{company_key, dedupe_keys, dedupe_names, normalize};
pub use results::ResultSets;
pub use run::{CompanySource, RunCallbacks, RunReport, execute_run};

pub fn print_banner() {
    println!(
        r#"
  _     _                                 _
 | |__ (_)_ __ ___  ___  ___ ___  _   _| |_
 | '_ \| | '__/ _ \/ __|/ __/ _ \| | | | __|
 | | | | | | |  __/\__ \ (_| (_) | |_| | |_
 |_| |_|_|_|  \___||___/\___\___/ \__,_|\__|
        who is hiring engineers right now?  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
