pub mod io;
pub mod log;
pub mod report;
