pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod remote;
pub mod util;

pub use application::LedgerService;
pub use domain::*;
