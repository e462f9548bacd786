//! Pipeline orchestration
//!
//! - `processor`: one function, in memory (`process_function`)
//! - `io`: unit discovery, companion loading, output paths
//! - `error_log`: concurrent (unit, function) failure log → `errors.json`
//! - `batch`: rayon-driven run over a directory of units

pub mod batch;
pub mod error_log;
pub mod io;
pub mod processor;

pub use batch::{BatchInputs, BatchReport, BatchRunner};
pub use error_log::{ErrorLog, FunctionKey, LogRow};
pub use io::{discover_units, load_metadata, load_summary, UnitPaths};
pub use processor::{process_function, FunctionOutput};
