//! CLI command implementations.

mod ask;
mod doctor;
mod ingest;
mod init;
mod inspect;

pub use ask::run_ask;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use init::run_init;
pub use inspect::run_inspect;
