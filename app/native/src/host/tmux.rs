//! tmux host.
//!
//! Drives the tmux server the process runs under through the `tmux` CLI.
//! Panes of the current window are the panes of the canvas, the command
//! running in a pane stands in for its filetype and the pane title for its
//! content name.
//!
//! Subscriptions are global hooks at a reserved array index, each running
//! `aurea trigger <kind>` in the background so the resize pass happens after
//! tmux finished processing the event.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{
    ContentId, ContentInfo, Host, HostError, HostResult, NoticeLevel, Pane, PaneId,
    SubscriptionId, Trigger,
};
use crate::resize::geometry::{Canvas, PaneGeometry};

/// Array index used for every hook aurea installs.
pub const HOOK_INDEX: u64 = 4242;

/// User option recording the name of the installed hook group.
const GROUP_OPTION: &str = "@aurea-group";

/// User option persisting runtime configuration overrides between invocations.
pub const OVERRIDES_OPTION: &str = "@aurea-overrides";

const PANE_FORMAT: &str = "#{pane_id}\t#{pane_top}\t#{pane_left}\t#{pane_height}\t#{pane_width}\t#{pane_active}\t#{pane_dead}\t#{pane_current_command}\t#{pane_title}";

const CANVAS_FORMAT: &str = "#{window_height}\t#{window_width}";

/// Duration notices stay on the status line, in milliseconds.
const NOTICE_DURATION_MS: &str = "3000";

// ============================================================================
// Parsing
// ============================================================================

/// One line of `list-panes` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxPane {
    pub id: PaneId,
    pub geometry: PaneGeometry,
    pub active: bool,
    pub dead: bool,
    pub command: String,
    pub title: String,
}

impl TmuxPane {
    fn to_pane(&self) -> Pane {
        Pane {
            id: self.id,
            geometry: self.geometry,
            content: ContentId(self.id.0),
            floating: false,
        }
    }
}

/// Parses a tmux pane id such as `%12`.
#[must_use]
pub fn parse_pane_id(raw: &str) -> Option<PaneId> {
    raw.trim().strip_prefix('%')?.parse().ok().map(PaneId)
}

fn parse_number(field: &str, name: &str, line: &str) -> HostResult<u32> {
    field
        .trim()
        .parse()
        .map_err(|_| HostError::Parse(format!("invalid {name} `{field}` in `{line}`")))
}

/// Parses the output of `list-panes -F` with [`PANE_FORMAT`].
///
/// # Errors
///
/// Returns [`HostError::Parse`] if a line is truncated or holds a
/// non-numeric geometry field.
pub fn parse_list_panes(output: &str) -> HostResult<Vec<TmuxPane>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.splitn(9, '\t').collect();
            if fields.len() < 7 {
                return Err(HostError::Parse(format!("truncated pane line `{line}`")));
            }
            let id = parse_pane_id(fields[0])
                .ok_or_else(|| HostError::Parse(format!("invalid pane id in `{line}`")))?;
            let geometry = PaneGeometry::new(
                parse_number(fields[1], "pane_top", line)?,
                parse_number(fields[2], "pane_left", line)?,
                parse_number(fields[3], "pane_height", line)?,
                parse_number(fields[4], "pane_width", line)?,
            );
            Ok(TmuxPane {
                id,
                geometry,
                active: fields[5] == "1",
                dead: fields[6] == "1",
                command: fields.get(7).map_or_else(String::new, |s| (*s).to_string()),
                title: fields.get(8).map_or_else(String::new, |s| (*s).to_string()),
            })
        })
        .collect()
}

/// Parses the output of `display-message -p` with [`CANVAS_FORMAT`].
///
/// # Errors
///
/// Returns [`HostError::Parse`] if the output is not two numbers.
pub fn parse_canvas(output: &str) -> HostResult<Canvas> {
    let line = output.trim();
    let (lines, columns) = line
        .split_once('\t')
        .ok_or_else(|| HostError::Parse(format!("invalid window size `{line}`")))?;
    Ok(Canvas::new(
        parse_number(lines, "window_height", line)?,
        parse_number(columns, "window_width", line)?,
    ))
}

// ============================================================================
// Quoting
// ============================================================================

/// Quotes a string for `sh`.
fn shell_quote(raw: &str) -> String { format!("'{}'", raw.replace('\'', r"'\''")) }

/// Quotes a string as a double-quoted tmux command argument.
fn tmux_quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '\\' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

const fn hook_name(trigger: Trigger) -> &'static str {
    match trigger {
        Trigger::FocusChanged => "after-select-pane",
        Trigger::CanvasResized => "client-resized",
        Trigger::ContentEntered => "after-split-window",
    }
}

fn hook_slot(trigger: Trigger) -> String { format!("{}[{HOOK_INDEX}]", hook_name(trigger)) }

/// Builds the tmux command a hook runs for a trigger.
#[must_use]
pub fn hook_command(exe: &Path, trigger: Trigger) -> String {
    let shell = format!("{} trigger {}", shell_quote(&exe.to_string_lossy()), trigger.as_str());
    format!("run-shell -b {}", tmux_quote(&shell))
}

// ============================================================================
// Host
// ============================================================================

/// Host backed by a running tmux server.
#[derive(Debug, Clone)]
pub struct TmuxHost {
    program: String,
    exe: PathBuf,
}

impl TmuxHost {
    /// Creates a host using `tmux` from `PATH` and the running executable for
    /// hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the path of the running executable is unknown.
    pub fn new() -> HostResult<Self> { Ok(Self::with_program("tmux", std::env::current_exe()?)) }

    /// Creates a host with an explicit tmux binary and hook executable.
    pub fn with_program(program: impl Into<String>, exe: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            exe: exe.into(),
        }
    }

    /// Returns true if the process runs inside a tmux session.
    #[must_use]
    pub fn is_inside_tmux() -> bool { std::env::var_os("TMUX").is_some() }

    fn run(&self, args: &[&str]) -> HostResult<String> {
        tracing::trace!(program = %self.program, ?args, "running tmux");
        let output = Command::new(&self.program).args(args).output()?;
        if !output.status.success() {
            return Err(HostError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn list_panes(&self) -> HostResult<Vec<TmuxPane>> {
        parse_list_panes(&self.run(&["list-panes", "-F", PANE_FORMAT])?)
    }

    fn find_pane(&self, id: PaneId) -> HostResult<TmuxPane> {
        self.list_panes()?
            .into_iter()
            .find(|pane| pane.id == id)
            .ok_or(HostError::PaneNotFound(id))
    }

    fn resize(&self, id: PaneId, flag: &str, size: u32) -> HostResult<()> {
        let target = format!("%{}", id.0);
        let size = size.to_string();
        self.run(&["resize-pane", "-t", &target, flag, &size]).map(|_| ()).map_err(|err| match err {
            HostError::CommandFailed { stderr, .. } if stderr.contains("can't find pane") => {
                HostError::PaneNotFound(id)
            }
            HostError::CommandFailed { stderr, .. } => HostError::Rejected {
                pane: id,
                reason: stderr,
            },
            other => other,
        })
    }

    /// Reads a global user option, `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if tmux cannot be queried.
    pub fn user_option(&self, name: &str) -> HostResult<Option<String>> {
        let value = self.run(&["show-options", "-gqv", name])?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    /// Sets a global user option.
    ///
    /// # Errors
    ///
    /// Returns an error if tmux rejects the option.
    pub fn set_user_option(&self, name: &str, value: &str) -> HostResult<()> {
        self.run(&["set-option", "-g", name, value]).map(|_| ())
    }

    /// Unsets a global user option.
    ///
    /// # Errors
    ///
    /// Returns an error if tmux rejects the request.
    pub fn unset_user_option(&self, name: &str) -> HostResult<()> {
        self.run(&["set-option", "-gu", name]).map(|_| ())
    }
}

impl Host for TmuxHost {
    fn canvas(&self) -> HostResult<Canvas> {
        parse_canvas(&self.run(&["display-message", "-p", CANVAS_FORMAT])?)
    }

    fn active_pane(&self) -> Option<PaneId> {
        match self.list_panes() {
            Ok(panes) => panes.into_iter().find(|pane| pane.active).map(|pane| pane.id),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read the active pane");
                None
            }
        }
    }

    fn panes(&self) -> HostResult<Vec<PaneId>> {
        Ok(self.list_panes()?.into_iter().map(|pane| pane.id).collect())
    }

    fn pane(&self, id: PaneId) -> HostResult<Pane> { self.find_pane(id).map(|pane| pane.to_pane()) }

    fn content(&self, id: ContentId) -> Option<ContentInfo> {
        let pane = self.find_pane(PaneId(id.0)).ok()?;
        if pane.dead {
            return None;
        }
        Some(ContentInfo {
            id,
            name: pane.title,
            filetype: pane.command,
        })
    }

    fn set_height(&mut self, id: PaneId, height: u32) -> HostResult<()> {
        self.resize(id, "-y", height)
    }

    fn set_width(&mut self, id: PaneId, width: u32) -> HostResult<()> {
        self.resize(id, "-x", width)
    }

    fn equalize(&mut self) -> HostResult<()> {
        // `select-layout -E` spreads one cell; spreading from every pane covers all of them.
        for pane in self.list_panes()? {
            let target = format!("%{}", pane.id.0);
            self.run(&["select-layout", "-t", &target, "-E"])?;
        }
        Ok(())
    }

    fn center_cursor(&mut self, _id: PaneId) -> HostResult<()> {
        Err(HostError::Unsupported("center cursor"))
    }

    fn subscribe(&mut self, group: &str, triggers: &[Trigger]) -> HostResult<SubscriptionId> {
        for &trigger in triggers {
            let command = hook_command(&self.exe, trigger);
            self.run(&["set-hook", "-g", &hook_slot(trigger), &command])?;
        }
        self.set_user_option(GROUP_OPTION, group)?;
        Ok(SubscriptionId(HOOK_INDEX))
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) -> HostResult<()> {
        for trigger in Trigger::ALL {
            self.run(&["set-hook", "-gu", &hook_slot(trigger)])?;
        }
        self.unset_user_option(GROUP_OPTION)
    }

    fn find_group(&self, group: &str) -> Option<SubscriptionId> {
        match self.user_option(GROUP_OPTION) {
            Ok(Some(name)) if name == group => Some(SubscriptionId(HOOK_INDEX)),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "failed to read hook group");
                None
            }
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        let text = format!("aurea [{level}]: {}", message.replace('#', "##"));
        if let Err(err) = self.run(&["display-message", "-d", NOTICE_DURATION_MS, &text]) {
            tracing::warn!(error = %err, message, "failed to show notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pane_id() {
        assert_eq!(parse_pane_id("%12"), Some(PaneId(12)));
        assert_eq!(parse_pane_id(" %0\n"), Some(PaneId(0)));
        assert_eq!(parse_pane_id("12"), None);
        assert_eq!(parse_pane_id("%x"), None);
    }

    #[test]
    fn test_parse_list_panes() {
        let output = "%0\t0\t0\t50\t100\t1\t0\tnvim\tmain.rs\n%3\t0\t101\t50\t99\t0\t0\tzsh\thost.local\n";
        let panes = parse_list_panes(output).unwrap();
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[0].id, PaneId(0));
        assert_eq!(panes[0].geometry, PaneGeometry::new(0, 0, 50, 100));
        assert!(panes[0].active);
        assert_eq!(panes[0].command, "nvim");
        assert_eq!(panes[1].geometry.col_start, 101);
        assert_eq!(panes[1].title, "host.local");
        assert!(!panes[1].dead);
    }

    #[test]
    fn test_parse_list_panes_keeps_tabs_in_titles() {
        let panes = parse_list_panes("%1\t0\t0\t10\t10\t0\t1\tbash\ta\tb\n").unwrap();
        assert_eq!(panes[0].title, "a\tb");
        assert!(panes[0].dead);
    }

    #[test]
    fn test_parse_list_panes_rejects_bad_lines() {
        assert!(matches!(parse_list_panes("%1\t0\t0\n"), Err(HostError::Parse(_))));
        assert!(matches!(parse_list_panes("%1\t0\t0\tx\t10\t0\t0\n"), Err(HostError::Parse(_))));
        assert!(parse_list_panes("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("50\t200\n").unwrap(), Canvas::new(50, 200));
        assert!(matches!(parse_canvas("50x200"), Err(HostError::Parse(_))));
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("/usr/bin/aurea"), "'/usr/bin/aurea'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_hook_command() {
        let command = hook_command(Path::new("/opt/aurea"), Trigger::FocusChanged);
        assert_eq!(command, r#"run-shell -b "'/opt/aurea' trigger focus""#);
        assert_eq!(hook_slot(Trigger::CanvasResized), "client-resized[4242]");
    }

    #[test]
    fn test_tmux_quote_escapes_specials() {
        assert_eq!(tmux_quote(r#"a"b$c\d"#), r#""a\"b\$c\\d""#);
    }

    #[test]
    fn test_missing_tmux_binary_is_io_error() {
        let host = TmuxHost::with_program("/nonexistent/tmux-binary", "/opt/aurea");
        assert!(matches!(host.canvas(), Err(HostError::Io(_))));
        assert_eq!(host.active_pane(), None);
    }
}
