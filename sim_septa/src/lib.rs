//! # The simulation shell for septa
//!
//! Consumes a text event stream (a script file or stdin), drives the
//! registration-area tree and the phone directory through it, and writes
//! the aggregate `<PolicyName>_results.txt` report on termination.
//!
//! One event per line:
//!
//! ```text
//! select a
//! move a 1 0
//! call b
//! depth 2
//! quit
//! ```

pub mod config;
pub mod events;
pub mod report;
pub mod shell;

pub use events::Event;
pub use shell::{Flow, Shell};
