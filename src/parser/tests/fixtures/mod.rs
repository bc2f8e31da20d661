// Test fixtures for parser testing
//
// Ruby snippets covering the call and execution-literal shapes the walker records.

pub mod call_patterns;
pub mod xstring_patterns;

pub use call_patterns::*;
pub use xstring_patterns::*;
