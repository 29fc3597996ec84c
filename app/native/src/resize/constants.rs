//! Internal constants for resize tuning.
//!
//! # Organization
//!
//! - `auto_scale` - Width-derived scale factor curve
//! - `defaults` - Default configuration values

/// Width-derived scale factor curve used when `auto_scale` is on.
///
/// The factor is `1.0` at [`BASE_COLUMNS`](auto_scale::BASE_COLUMNS) and drops
/// by [`SLOPE`](auto_scale::SLOPE) every [`SPAN`](auto_scale::SPAN) columns,
/// never going below [`FLOOR`](auto_scale::FLOOR).
pub mod auto_scale {
    /// Canvas width at which the scale factor is exactly `1.0`.
    pub const BASE_COLUMNS: f64 = 100.0;

    /// Width interval over which the factor drops by `SLOPE`.
    pub const SPAN: f64 = 1000.0;

    /// Factor decrease per `SPAN` columns.
    pub const SLOPE: f64 = 1.8;

    /// Lowest factor ever produced.
    pub const FLOOR: f64 = 0.4;
}

/// Default configuration values.
pub mod defaults {
    /// Golden ratio.
    pub const RATIO: f64 = 1.618;

    /// Width multiplier outside widescreen mode.
    pub const ADJUST_FACTOR: f64 = 1.0;

    /// Width multiplier used while widescreen mode is on.
    pub const WIDE_ADJUST_FACTOR: f64 = 0.8;

    /// Minimum width change (columns) worth a resize request.
    pub const MINIMAL_WIDTH_CHANGE: u32 = 2;

    /// Minimum height change (lines) worth a resize request.
    pub const MINIMAL_HEIGHT_CHANGE: u32 = 2;

    /// Filetypes that are never resized.
    pub const EXCLUDE_FILETYPES: &[&str] = &[
        "help",
        "qf",
        "NvimTree",
        "neo-tree",
        "Outline",
        "Trouble",
        "undotree",
        "diff",
        "fugitive",
        "dapui_scopes",
        "dapui_watches",
        "dapui_stacks",
        "dapui_breakpoints",
        "dap-repl",
    ];
}
