// HDD Doctor: smartctl-based disk health diagnosis and secure erase

// Command line and runtime settings
pub mod config;
// Plain-text front-end
pub mod console;
// Parsing, scoring and progress tracking
pub mod diagnostics;
// Errors raised by the external tool layer
pub mod error;
// egui front-end
pub mod gui;
// Data models for reports and results
pub mod models;
// lsblk, smartctl and shred plumbing
pub mod scanner;
