//! Converts the constrained markdown the model returns into styled HTML fragments.
//!
//! The rewrite is a fixed sequence of regex passes over the whole text. Later
//! passes see the HTML produced by earlier ones, so the order matters.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::domain::SectionContent;

static FENCE_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n?").expect("FENCE_JSON is a valid regex pattern"));
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```\n?").expect("FENCE is a valid regex pattern"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+)$").expect("HEADING is a valid regex pattern"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("STRONG is a valid regex pattern"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("EMPHASIS is a valid regex pattern"));
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(\d+)\.\s+(.+)$").expect("NUMBERED_ITEM is a valid regex pattern")
});
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[-•]\s+(.+)$").expect("BULLET_ITEM is a valid regex pattern"));
static LIST_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<li[^>]*>.*?</li>\s*)+").expect("LIST_RUN is a valid regex pattern")
});
static TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\|(.+)\|\n\|[-:\s|]+\|\n((?:\|.+\|\n?)+)")
        .expect("TABLE is a valid regex pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("TAG is a valid regex pattern"));
static CELL_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</t[hd]>").expect("CELL_END is a valid regex pattern"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
        .expect("ENTITY is a valid regex pattern")
});

/// Lines starting with one of these are already block-level HTML.
const BLOCK_PREFIXES: [&str; 5] = ["<h", "<l", "<ul", "<table", "<div"];

pub fn process_content(text: &str) -> SectionContent {
    if text.is_empty() {
        return SectionContent::default();
    }

    let text = text.replace("\r\n", "\n");
    let text = FENCE_JSON.replace_all(&text, "");
    let text = FENCE.replace_all(&text, "");
    let text = HEADING.replace_all(
        &text,
        r#"<h3 class="text-2xl font-bold text-indigo-900 mt-8 mb-4 pb-2 border-b-2 border-indigo-200">${1}</h3>"#,
    );
    let text = STRONG.replace_all(&text, r#"<strong class="font-semibold text-gray-900">${1}</strong>"#);
    let text = EMPHASIS.replace_all(&text, r#"<em class="italic">${1}</em>"#);
    let text = NUMBERED_ITEM.replace_all(
        &text,
        r#"<li class="ml-6 my-3 pl-2"><span class="font-semibold text-indigo-600">${1}.</span> ${2}</li>"#,
    );
    let text = BULLET_ITEM.replace_all(&text, r#"<li class="ml-6 my-3 pl-2 list-disc">${1}</li>"#);
    let text = LIST_RUN.replace_all(&text, |caps: &Captures| {
        // whitespace after the last item stays outside the list
        let run = &caps[0];
        let items = run.trim_end();
        format!(r#"<ul class="space-y-2 my-4">{}</ul>{}"#, items, &run[items.len()..])
    });
    let text = TABLE.replace_all(&text, |caps: &Captures| {
        let mut table = render_table(&caps[1], &caps[2]);
        if caps[2].ends_with('\n') {
            table.push('\n');
        }
        table
    });

    SectionContent::new(wrap_paragraphs(&text))
}

fn split_cells(row: &str) -> Vec<&str> {
    row.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

fn render_table(header: &str, rows: &str) -> String {
    let mut table = String::from(
        r#"<div class="overflow-x-auto my-6"><table class="min-w-full border-collapse border border-gray-300 rounded-lg">"#,
    );
    table.push_str(r#"<thead class="bg-indigo-100"><tr>"#);
    for cell in split_cells(header) {
        table.push_str(&format!(
            r#"<th class="border border-gray-300 px-4 py-3 text-left font-bold text-gray-900">{}</th>"#,
            cell
        ));
    }
    table.push_str("</tr></thead><tbody>");

    for (idx, row) in rows.trim().split('\n').enumerate() {
        let stripe = if idx % 2 == 0 { "bg-white" } else { "bg-gray-50" };
        table.push_str(&format!(r#"<tr class="{}">"#, stripe));
        for cell in split_cells(row) {
            table.push_str(&format!(
                r#"<td class="border border-gray-300 px-4 py-3 text-gray-700">{}</td>"#,
                cell
            ));
        }
        table.push_str("</tr>");
    }

    table.push_str("</tbody></table></div>");
    table
}

fn wrap_paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() || BLOCK_PREFIXES.iter().any(|p| line.starts_with(p)) {
                line.to_string()
            } else {
                format!(r#"<p class="my-3 text-gray-700 leading-relaxed">{}</p>"#, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text rendering of a section for the text download.
pub fn strip_html(html: &str) -> String {
    let html = CELL_END.replace_all(html, "\t");
    let html = html.replace("</tr>", "\n");
    let text = TAG.replace_all(&html, "");
    decode_entities(&text)
}

/// Single pass, so `&amp;lt;` decodes to `&lt;` and not `<`. Unknown named
/// entities are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name.strip_prefix('#') {
                Some(num) => {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32).map(String::from)
                }
                None => named_entity(name).map(String::from),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "bull" => "\u{2022}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => return None,
    })
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
