//! JSON, markdown and HTML document generation.
//!
//! The markdown document is meant to be readable by people and by agents
//! crawling the site: a signal table, the raw JSON, field descriptions and a
//! one-sentence-per-card summary.

use crate::models::{PulseSnapshot, SignalCard};
use crate::signals::Category;
use anyhow::{Context, Result};
use std::path::Path;

/// Pretty-printed JSON snapshot with a trailing newline.
pub fn generate_json_report(snapshot: &PulseSnapshot) -> Result<String> {
    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');
    Ok(json)
}

/// Generate the complete markdown document.
pub fn generate_markdown_report(snapshot: &PulseSnapshot, site_url: &str) -> Result<String> {
    let mut output = String::new();

    output.push_str(&generate_front_matter(snapshot, site_url));
    output.push_str(&format!("# Solana Pulse — {}\n\n", snapshot.date()));
    output.push_str("Daily health signals for the Solana ecosystem.\n");
    output.push_str("Each signal is a directional delta (up/flat/down), not an absolute value.\n\n");

    output.push_str(&generate_signal_table(snapshot.signals()));
    output.push_str(&generate_data_section(snapshot)?);
    output.push_str(&generate_field_descriptions());

    output.push_str("## Summary\n\n");
    output.push_str(&generate_summary(snapshot.signals()));
    output.push_str("\n\n");

    output.push_str(&generate_footer(site_url));

    Ok(output)
}

fn generate_front_matter(snapshot: &PulseSnapshot, site_url: &str) -> String {
    format!(
        "---\ntitle: Solana Pulse Signals\ndate: {}\nsource: {}\n---\n\n",
        snapshot.date(),
        site_url
    )
}

/// Generate the signal table.
fn generate_signal_table(signals: &[SignalCard]) -> String {
    let mut section = String::new();

    section.push_str("## Current Signals\n\n");
    section.push_str("| Signal | Direction | State | Context |\n");
    section.push_str("|--------|-----------|-------|---------|\n");

    for card in signals {
        section.push_str(&format!(
            "| {} | {} {} | {} | {} |\n",
            card.title,
            card.direction.arrow(),
            card.direction,
            card.state_label,
            card.context.as_deref().unwrap_or("—")
        ));
    }
    section.push('\n');

    section
}

fn generate_data_section(snapshot: &PulseSnapshot) -> Result<String> {
    let json = serde_json::to_string_pretty(snapshot)?;
    Ok(format!("## Data\n\n```jsonc\n{}\n```\n\n", json))
}

fn generate_field_descriptions() -> String {
    let ids: Vec<&str> = Category::ALL.iter().map(|c| c.id()).collect();
    let fields = [
        (
            "date",
            "`string`",
            "ISO date (YYYY-MM-DD) when signals were generated.".to_string(),
        ),
        (
            "signals",
            "`SignalCard[]`",
            "Array of signal card objects.".to_string(),
        ),
        ("signals[].id", "`string`", format!("One of: {}.", ids.join(", "))),
        (
            "signals[].signal",
            "`\"up\" | \"flat\" | \"down\"`",
            "Directional signal based on threshold analysis.".to_string(),
        ),
        (
            "signals[].state",
            "`string`",
            "Human-readable state phrase (e.g. \"Heating up\", \"Outflow\", \"Stable\").".to_string(),
        ),
        (
            "signals[].context",
            "`string`",
            "Delta context with percentage (e.g. \"+5.2% vs 7d avg\").".to_string(),
        ),
    ];

    let mut section = String::from("### Field Descriptions\n\n");
    for (name, ty, description) in fields {
        section.push_str(&format!("#### {}\nType: {}\n{}\n\n", name, ty, description));
    }
    section
}

/// One sentence per card, joined into a paragraph.
pub fn generate_summary(signals: &[SignalCard]) -> String {
    let sentences: Vec<String> = signals.iter().map(summary_sentence).collect();
    format!("{}.", sentences.join(". "))
}

/// Summary sentence for a single card (without the trailing period).
pub fn summary_sentence(card: &SignalCard) -> String {
    let context = card.context.as_deref().unwrap_or("no data");
    match card.id {
        // The protocol name is already in the state.
        Category::ProtocolHighlight => format!("{} ({})", card.state_label, context),
        _ => format!("{}: {} ({})", card.title, card.state_label, context),
    }
}

fn generate_footer(site_url: &str) -> String {
    let site = site_url.trim_end_matches('/');
    format!(
        "## More Info\n\n- Website: {}\n- Docs for AI agents: {}/llms.txt\n",
        site, site
    )
}

/// Self-contained HTML page rendering one card per signal.
pub fn generate_html_dashboard(snapshot: &PulseSnapshot) -> String {
    let mut cards = String::new();
    for card in snapshot.signals() {
        cards.push_str(&format!(
            concat!(
                "    <div class=\"card\" id=\"{}\">\n",
                "      <div class=\"head\"><span style=\"color:{}\">{}</span> {}</div>\n",
                "      <p class=\"state\">{}</p>\n",
                "      <p class=\"context\">{}</p>\n",
                "    </div>\n"
            ),
            card.id.id(),
            card.direction.color(),
            card.direction.glyph(),
            escape_html(&card.title),
            escape_html(&card.state_label),
            escape_html(card.context.as_deref().unwrap_or(""))
        ));
    }

    format!(
        concat!(
            "<!doctype html>\n<html lang=\"en\">\n<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>Solana Pulse — {date}</title>\n",
            "  <style>\n",
            "    body {{ background:#09090b; color:#f4f4f5; font-family:sans-serif; }}\n",
            "    .grid {{ display:grid; grid-template-columns:repeat(auto-fit,minmax(220px,1fr)); gap:12px; }}\n",
            "    .card {{ border:1px solid #27272a; border-radius:12px; padding:16px; }}\n",
            "    .head {{ color:#71717a; font-size:13px; }}\n",
            "    .state {{ font-size:17px; margin:8px 0 4px; }}\n",
            "    .context {{ color:#52525b; font-family:monospace; font-size:12px; margin:0; }}\n",
            "  </style>\n</head>\n<body>\n",
            "  <h1>Solana Pulse</h1>\n  <p>{date}</p>\n",
            "  <div class=\"grid\">\n{cards}  </div>\n",
            "</body>\n</html>\n"
        ),
        date = snapshot.date(),
        cards = cards
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Short human-readable summary for the terminal.
pub fn generate_terminal_summary(snapshot: &PulseSnapshot) -> String {
    let mut lines = vec![format!("📊 Solana Pulse — {}", snapshot.date())];
    for card in snapshot.signals() {
        lines.push(format!(
            "   {} {:<20} {:<22} {}",
            card.direction.glyph(),
            card.title,
            card.state_label,
            card.context.as_deref().unwrap_or("")
        ));
    }
    lines.join("\n")
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}
