//! Terminal output helpers

const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Render a URL in cyan, wrapped in an OSC 8 hyperlink when stdout supports it
pub fn terminal_link(url: &str) -> String {
    render_link(url, supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout))
}

fn render_link(url: &str, hyperlink: bool) -> String {
    if hyperlink {
        format!("\x1b]8;;{url}\x07{CYAN}{url}{RESET}\x1b]8;;\x07")
    } else {
        format!("{CYAN}{url}{RESET}")
    }
}
