//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// The template is valid JSONC and loads to the default configuration as is.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Aurea Configuration File
// ========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
//
// Documentation: https://github.com/aurea-rs/aurea

{
  // ============================================================================
  // Sizing
  // ============================================================================
  // Proportion of the available space given to the focused pane (must be > 0)
  // "ratio": 1.618,

  // Multiplier applied to the target width
  // "adjust_factor": 1.0,

  // Width multiplier used while widescreen mode is on
  // "wide_adjust_factor": 0.8,

  // Derive the width multiplier from the canvas width instead of adjust_factor:
  // 1.0 at 100 columns, narrower on wider canvases, never below 0.4
  // "auto_scale": false,

  // Upper bound on the focused pane width in columns (null or 0 disables it)
  // "max_width": null,

  // Center the focused pane on its cursor after resizing (editor hosts only)
  // "recenter": false,

  // ============================================================================
  // Hysteresis
  // ============================================================================
  // Skip width changes smaller than this many columns
  // "minimal_width_change": 2,

  // Skip height changes smaller than this many lines
  // "minimal_height_change": 2,

  // ============================================================================
  // Exclusions
  // ============================================================================
  // Panes matching any rule below keep their size. For tmux the filetype is
  // the command running in the pane and the name is the pane title.

  // Filetypes that are never resized (replaces the default list when set)
  // "exclude_filetypes": ["help", "qf", "NvimTree", "neo-tree", "undotree"],

  // Exact content names that are never resized
  // "exclude_buffer_names": [],

  // Regular expressions matched against content names, first match wins
  // "exclude_buffer_patterns": ["^term://"],

  // ============================================================================
  // Diagnostics
  // ============================================================================
  // Log exclusion decisions and resize passes at debug level
  // "debug": false
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
