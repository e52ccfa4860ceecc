pub mod catalog;
pub mod chromium;
pub mod driver;
pub mod error;
pub mod harvester;
pub mod prober;
pub mod result;
pub mod static_page;

pub use catalog::{JobBoard, default_catalog};
pub use chromium::{ChromiumDriver, ChromiumOptions};
pub use driver::{DriverKind, PageDriver};
pub use error::ScanError;
pub use harvester::{HarvestOptions, HarvestReport, HarvestState, Harvester, StopReason, TerminationPolicy};
pub use prober::{ProbeOptions, Prober};
pub use result::{CompanyVerdict, ProbeErrorKind, ProbeOutcome};
pub use static_page::StaticDriver;
