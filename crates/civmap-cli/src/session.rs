//! Headless map-screen session.
//!
//! Reads one line at a time: JSON lines are surface messages, lines starting
//! with `:` are host-side UI commands. Injected scripts go to stdout so the
//! session can be piped into a real surface; logs go to stderr.

use std::future::Future;
use std::io::Write;
use std::time::Instant;

use civmap_bridge::{FilterKey, MapScreen, MapType, OutboundCall, SurfaceSink, Tab};
use civmap_core::FacilityId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Writes each injected call's script to stdout, one per line.
pub(crate) struct StdoutSink;

impl SurfaceSink for StdoutSink {
    fn inject(&mut self, call: &OutboundCall) {
        match call.to_script() {
            Ok(script) => {
                let mut out = std::io::stdout().lock();
                if let Err(e) = writeln!(out, "{script}").and_then(|()| out.flush()) {
                    tracing::warn!(error = %e, "failed to write script to stdout");
                }
            }
            Err(e) => tracing::warn!(error = %e, call = call.name(), "failed to encode call"),
        }
    }
}

/// A host-side UI event typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCommand {
    Filter(FilterKey),
    Search(String),
    Select(FacilityId),
    Close,
    Tab(Tab),
    Handle,
    /// Vertical drag of the panel by this many pixels (negative is up).
    Drag(f32),
    Map(MapType),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Input {
    Surface(String),
    Command(HostCommand),
}

/// Classify one input line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(Input::Surface(line.to_string())));
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    let parsed = match name {
        "filter" => HostCommand::Filter(arg.parse()?),
        "search" => HostCommand::Search(arg.to_string()),
        "select" => HostCommand::Select(FacilityId(
            arg.parse()
                .map_err(|_| format!("facility id '{arg}' is not numeric"))?,
        )),
        "close" => HostCommand::Close,
        "tab" => HostCommand::Tab(arg.parse()?),
        "handle" => HostCommand::Handle,
        "drag" => HostCommand::Drag(
            arg.parse()
                .map_err(|_| format!("drag distance '{arg}' is not a number"))?,
        ),
        "map" => HostCommand::Map(arg.parse()?),
        other => return Err(format!("unknown command ':{other}'")),
    };
    Ok(Some(Input::Command(parsed)))
}

fn apply_command<S: SurfaceSink>(screen: &mut MapScreen<S>, command: HostCommand, now: Instant) {
    match command {
        HostCommand::Filter(key) => {
            screen.toggle_filter(key);
        }
        HostCommand::Search(keyword) => screen.set_search_keyword(keyword),
        HostCommand::Select(id) => {
            if !screen.select_search_result(id, now) {
                tracing::warn!(facility_id = %id, "no such facility");
            }
        }
        HostCommand::Close => screen.close_panel(),
        HostCommand::Tab(tab) => {
            screen.set_tab(tab);
        }
        HostCommand::Handle => screen.tap_handle(now),
        HostCommand::Drag(dy) => {
            if screen.drag_begin(now) {
                screen.drag_move(0.0, dy);
                screen.drag_end(dy, now);
            }
        }
        HostCommand::Map(map_type) => screen.set_map_type(map_type),
    }
}

fn handle_line<S: SurfaceSink>(screen: &mut MapScreen<S>, line: &str) {
    let now = Instant::now();
    match parse_line(line) {
        Ok(Some(Input::Surface(raw))) => {
            if let Some(action) = screen.handle_surface_message(&raw, now) {
                tracing::info!(?action, "host action");
            }
        }
        Ok(Some(Input::Command(command))) => apply_command(screen, command, now),
        Ok(None) => {}
        Err(reason) => tracing::warn!(reason = %reason, "ignoring input line"),
    }

    let height = screen.tick(now);
    let selection = screen.selection();
    tracing::debug!(
        phase = ?selection.phase(),
        selected = ?selection.selected(),
        tab = ?selection.active_tab(),
        height,
        "screen state"
    );
}

/// Drive `screen` from `input` until EOF or `shutdown` resolves, then dispose
/// it.
pub(crate) async fn run_session<S, R, F>(
    screen: &mut MapScreen<S>,
    input: R,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: SurfaceSink,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut keywords = screen.debounce_search();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(screen, &line),
                None => {
                    tracing::info!("input closed");
                    break;
                }
            },
            Some(keyword) = keywords.recv() => screen.apply_search(keyword),
            () = &mut shutdown => {
                tracing::info!("received shutdown signal");
                break;
            }
        }
    }

    screen.dispose();
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
