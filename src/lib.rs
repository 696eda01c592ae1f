pub mod browser;
pub mod cli;
pub mod llm;
pub mod net;
pub mod phases;
pub mod report;
pub mod scanner;
pub mod trace;

pub use phases::Phase;
pub use scanner::model::{PhaseResult, ScanResult};
pub use scanner::pipeline::Scanner;
