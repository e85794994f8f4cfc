pub mod display;
pub mod export;
pub mod fallback;
pub mod harness;
pub mod import;
pub mod strategies;
pub mod windows;
