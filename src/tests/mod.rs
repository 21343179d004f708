// stylename test infrastructure
//
// Unit tests live beside their modules; this tree holds the cross-module
// scenarios: parser contracts, index consistency, watcher routing, providers
// and the batch checker.

pub mod helpers; // Temp directories and on-disk fixtures


pub mod watcher_tests; // Debounced routing of file-system changes

// ============================================================================
// FEATURES
// ============================================================================
pub mod provider_tests; // Completion, hover, definition, diagnostics
