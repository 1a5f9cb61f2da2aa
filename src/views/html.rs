// src/views/html.rs
//! Server-rendered markup for the two screens.

use std::fmt::Write;

use crate::models::{Label, Recommendation};
use crate::query::QueryKey;
use crate::views::{EvaluationPanel, KeyMap, LabelingPanel, Tile, ViewState};

pub const EVALUATION_ROUTE: &str = "/classification/evaluation";
pub const LABELING_ROUTE: &str = "/classification/labeling";

pub fn escape(text: &str) -> String {
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

/// Page shell. `watch` names the cache key whose invalidation reloads the page.
fn layout(title: &str, watch: QueryKey, body: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body data-watch="{watch}">
<main class="content">
<h1>{title}</h1>
{body}
{footer}
</main>
<script src="/static/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        watch = watch.as_str(),
        body = body,
        footer = footer,
    )
}

fn loading(message: &str) -> String {
    format!(r#"<div class="state state-loading">{}</div>"#, escape(message))
}

fn error(message: &str) -> String {
    format!(r#"<div class="state state-error">Error: {}</div>"#, escape(message))
}

fn tiles(tiles: &[Tile], class: &str) -> String {
    let mut out = format!(r#"<dl class="{}">"#, class);
    for tile in tiles {
        let _ = write!(
            out,
            r#"<div class="tile {}"><dt>{}</dt><dd>{}</dd></div>"#,
            tile.tone.css_class(),
            escape(tile.label),
            escape(&tile.value)
        );
    }
    out.push_str("</dl>");
    out
}

fn recommendation(rec: &Recommendation) -> String {
    format!(
        r#"<section class="card recommendation">
<h3>Recommendation</h3>
<p class="term">Sample Assessment:</p>
<p>{}</p>
<p class="term">Metrics Interpretation:</p>
<p>{}</p>
</section>"#,
        escape(&rec.sample_assessment),
        escape(&rec.metrics_interpretation)
    )
}

fn evaluation_panel(panel: &EvaluationPanel) -> String {
    let updated = panel
        .updated_at
        .map(|t| format!(r#"<p class="muted">Last fetched {}</p>"#, t.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_default();

    format!(
        r#"<div class="header-actions">
<div>
<h2>Current Model Performance</h2>
<p class="muted">Evaluation metrics based on manually labeled data</p>
{updated}
</div>
<form method="post" action="{route}/refresh"><button class="secondary" type="submit">Refresh Metrics</button></form>
</div>
<section class="card">
<h3>Labeled Data Pool</h3>
<div class="big-number">{count}</div>
<p class="muted">total manually labeled messages</p>
</section>
<section class="card">
<h3>Performance Metrics</h3>
<p class="muted">Classification performance on labeled data</p>
{metrics}
<h4>Confusion Matrix</h4>
{confusion}
</section>
{recommendation}"#,
        updated = updated,
        route = EVALUATION_ROUTE,
        count = escape(&panel.labeled_count),
        metrics = tiles(&panel.metrics, "metrics"),
        confusion = tiles(&panel.confusion, "confusion"),
        recommendation = panel
            .recommendation
            .as_ref()
            .map(recommendation)
            .unwrap_or_default(),
    )
}

pub fn evaluation_page(state: &ViewState<EvaluationPanel>) -> String {
    let body = match state {
        ViewState::Loading => loading("Loading evaluation data…"),
        ViewState::Error(msg) => error(msg),
        ViewState::Empty => r#"<div class="state state-empty"><p>No evaluation data available yet. Start labeling to build the evaluation dataset.</p></div>"#.to_string(),
        ViewState::Ready(panel) => evaluation_panel(panel),
    };
    let footer = format!(
        r#"<div class="nav"><a class="button large" href="{}">Start Manual Labeling</a></div>"#,
        LABELING_ROUTE
    );
    layout("Model Evaluation", QueryKey::Evaluation, &body, &footer)
}

fn label_button(label: Label, submitting: bool) -> String {
    let (class, text) = match label {
        Label::Match => ("label-yes", "✓ Yes"),
        Label::NoMatch => ("label-no", "✗ No"),
    };
    format!(
        r#"<form method="post" action="{}/label/{}"><button class="{}" type="submit"{}>{}</button></form>"#,
        LABELING_ROUTE,
        u8::from(label),
        class,
        if submitting { " disabled" } else { "" },
        text
    )
}

fn labeling_panel(panel: &LabelingPanel, keys: KeyMap) -> String {
    let failure = panel
        .last_error
        .as_deref()
        .map(|msg| format!(r#"<div class="state state-error">Label was not saved: {}</div>"#, escape(msg)))
        .unwrap_or_default();

    format!(
        r#"<p class="muted">Does this message match the classification criteria?</p>
{failure}
<section class="card message" data-message-id="{id}"><p class="message-text">{text}</p></section>
<section class="guidelines">
<h3>Labeling Guidelines:</h3>
<div><strong>✓ Yes:</strong> This message matches the classification criteria</div>
<div><strong>✗ No:</strong> This message does not match the classification criteria</div>
<p class="shortcuts"><strong>Keyboard shortcuts:</strong> Press <kbd>{yes}</kbd> for Yes, <kbd>{no}</kbd> for No</p>
</section>
<div class="label-buttons">
{yes_button}
{no_button}
</div>
<div class="nav">
<a class="button secondary" href="{eval_route}">← Back to Evaluation</a>
<form method="post" action="{route}/skip"><button class="secondary" type="submit">Skip Message</button></form>
</div>"#,
        failure = failure,
        id = escape(&panel.message.id.to_string()),
        text = escape(&panel.message.text),
        yes = escape(&keys.yes.to_uppercase().to_string()),
        no = escape(&keys.no.to_uppercase().to_string()),
        yes_button = label_button(Label::Match, panel.submitting),
        no_button = label_button(Label::NoMatch, panel.submitting),
        eval_route = EVALUATION_ROUTE,
        route = LABELING_ROUTE,
    )
}

pub fn labeling_page(state: &ViewState<LabelingPanel>, keys: KeyMap) -> String {
    let body = match state {
        ViewState::Loading => loading("Loading message…"),
        ViewState::Error(msg) => error(msg),
        ViewState::Empty => format!(
            r#"<div class="state state-empty"><p>No messages available for labeling</p><a class="button secondary" href="{}">Back to Evaluation</a></div>"#,
            EVALUATION_ROUTE
        ),
        ViewState::Ready(panel) => labeling_panel(panel, keys),
    };
    layout("Manual Message Labeling", QueryKey::LabelingMessage, &body, "")
}
