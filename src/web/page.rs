//! HTML control page

use crate::command::{DispatchOutcome, ScriptCatalog};
use dronectl_shared::{CommandGroup, CommandKind, LaunchPolicy};
use std::fmt::Write;

const TITLE: &str = "Arducopter Drone Control";
const SUBTITLE: &str = "Institute for the Wireless Internet of Things";

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0; background: #f4f4f4; }
.header { background: #1d3557; color: #fff; padding: 1em 2em; }
.header p { margin: 0; opacity: 0.8; }
#main { padding: 1em 2em; }
.row { margin: 0.5em 0; }
.button { min-width: 10em; padding: 0.8em 1.2em; margin-right: 0.5em; border: 0;
  border-radius: 4px; background: #457b9d; color: #fff; text-decoration: none;
  display: inline-block; text-align: center; }
.button.disabled { background: #aaa; pointer-events: none; }
.notice { background: #ffe8a1; padding: 0.6em 1em; border-radius: 4px; }
footer { padding: 1em 2em; color: #666; font-size: 0.9em; }
";

/// Render the control page
///
/// Launch results are deliberately not shown; only a refusal because another
/// script is running gets a notice.
pub fn render(
    catalog: &ScriptCatalog,
    outcome: &DispatchOutcome,
    policy: LaunchPolicy,
) -> String {
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"header\"><h1>{TITLE}</h1><p>{SUBTITLE}</p></div>\n\
         <div id=\"main\">\n"
    );

    if let DispatchOutcome::Busy { command, running } = outcome {
        let busy = running
            .iter()
            .map(|(_, kind)| kind.label())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            html,
            "<p class=\"notice\">{} not started: {} still running.</p>",
            command.label(),
            busy
        );
    }

    for group in [CommandGroup::Status, CommandGroup::Movement] {
        let _ = writeln!(html, "<h2>{}</h2>", group.title());
        let kinds: Vec<CommandKind> = CommandKind::ALL
            .into_iter()
            .filter(|k| k.group() == group)
            .collect();

        // Two buttons per row, as on the original panel
        for pair in kinds.chunks(2) {
            html.push_str("<div class=\"row\">");
            for kind in pair {
                render_button(&mut html, catalog, *kind);
            }
            html.push_str("</div>\n");
        }
    }

    let policy = match policy {
        LaunchPolicy::Exclusive => "one script at a time, landing and disarm always allowed",
        LaunchPolicy::Concurrent => "scripts may overlap",
    };
    let _ = write!(
        html,
        "</div>\n<footer>Launch policy: {policy}. \
         <a href=\"/api/launches\">Launch history</a></footer>\n</body>\n</html>\n"
    );

    html
}

fn render_button(html: &mut String, catalog: &ScriptCatalog, kind: CommandKind) {
    if catalog.is_enabled(kind) {
        let _ = write!(
            html,
            "<a class=\"button\" href=\"/?command={}\">{}</a>",
            kind.id(),
            kind.label()
        );
    } else {
        let _ = write!(
            html,
            "<span class=\"button disabled\">{}</span>",
            kind.label()
        );
    }
}
