use std::{collections::HashMap, sync::LazyLock};

use digest_datastore::Summary;
use regex::{Captures, Regex};

const DIGEST_TEMPLATE: &str = include_str!("templates/digest.html");
const CARD_TEMPLATE: &str = include_str!("templates/card.html");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// Renders the HTML body of a digest. `date` is shown in the header as is.
pub fn render_digest(date: &str, summaries: &[Summary]) -> String {
    let cards = summaries.iter().map(render_card).collect::<String>();

    fill_placeholders(
        DIGEST_TEMPLATE,
        &HashMap::from([
            ("date", escape_html(date)),
            ("count", summaries.len().to_string()),
            ("cards", cards),
        ]),
    )
}

fn render_card(summary: &Summary) -> String {
    let duration = if summary.duration.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="duration-badge">{}</div>"#,
            escape_html(&summary.duration)
        )
    };
    let views = if summary.view_count > 0 {
        format!(
            r#"<span class="meta-item">{} views</span>"#,
            group_thousands(summary.view_count)
        )
    } else {
        String::new()
    };

    fill_placeholders(
        CARD_TEMPLATE,
        &HashMap::from([
            ("thumbnail_url", escape_html(&summary.thumbnail_url)),
            ("title", escape_html(&summary.video_title)),
            ("channel_name", escape_html(&summary.channel_name)),
            ("summary", escape_html(&summary.summary)),
            ("published", summary.published_at.format("%b %-d, %Y").to_string()),
            ("video_url", escape_html(&summary.video_url)),
            ("duration", duration),
            ("views", views),
        ]),
    )
}

/// Replaces `{name}` placeholders in a single pass, so substituted values are
/// never re-expanded. Unknown placeholders are kept as is.
pub(crate) fn fill_placeholders(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
