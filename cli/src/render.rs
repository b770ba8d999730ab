use marquee_search::OverlayController;
use marquee_search::OverlayStatus;
use marquee_search::TypeTag;
use serde_json::Value;
use serde_json::json;
use std::fmt::Write as _;

pub(crate) fn status_label(status: &OverlayStatus) -> &'static str {
    match status {
        OverlayStatus::Idle => "idle",
        OverlayStatus::Loading {
            spinner_visible: false,
        } => "loading",
        OverlayStatus::Loading {
            spinner_visible: true,
        } => "searching",
        OverlayStatus::Ready => "ready",
        OverlayStatus::Empty { .. } => "empty",
        OverlayStatus::Failed(_) => "failed",
    }
}

/// Plain-text view of the overlay. Rows are printed in the same order the
/// selection index walks them.
pub(crate) fn snapshot(overlay: &OverlayController) -> String {
    if !overlay.is_open() {
        return "closed\n".to_string();
    }
    let mut out = String::new();
    let filter = overlay.type_filter().map_or("all", TypeTag::as_str);
    let scope = overlay.scope_id().unwrap_or("-");
    let _ = writeln!(
        out,
        "query: {:?}  type: {filter}  scope: {scope}",
        overlay.input()
    );

    if overlay.input().is_empty() {
        if let Some(hint) = overlay.placeholder() {
            let _ = writeln!(out, "hint: {hint}");
        }
        let recent = overlay.recent_searches();
        if !recent.is_empty() {
            let _ = writeln!(out, "recent: {}", recent.join(", "));
        }
    }

    let _ = writeln!(out, "status: {}", status_label(overlay.status()));
    match overlay.status() {
        OverlayStatus::Empty { suggestions } if !suggestions.is_empty() => {
            let _ = writeln!(out, "did you mean: {}", suggestions.join(", "));
        }
        OverlayStatus::Failed(err) => {
            let _ = writeln!(out, "error: {err} (:retry to try again)");
        }
        _ => {}
    }

    let facets = overlay.facets();
    if facets.counts().total() > 0 {
        let pills: Vec<String> = facets
            .facets()
            .into_iter()
            .map(|facet| format!("{} {}", facet.kind, facet.count))
            .collect();
        let _ = writeln!(out, "facets: {}", pills.join("  "));
    }

    let selected = overlay.selection().flattened_index();
    for (index, kind, row) in overlay.results().rows() {
        let marker = if selected == Some(index) { ">" } else { " " };
        let kind = kind.as_str();
        let _ = writeln!(
            out,
            "{marker} [{index}] {kind:<9} {}  {}",
            row.title, row.href
        );
    }
    out
}

pub(crate) fn page_json(overlay: &OverlayController) -> Value {
    let results: Vec<Value> = overlay
        .results()
        .rows()
        .map(|(index, kind, row)| {
            json!({
                "index": index,
                "type": kind,
                "id": row.id,
                "title": row.title,
                "href": row.href,
            })
        })
        .collect();
    let suggestions = match overlay.status() {
        OverlayStatus::Empty { suggestions } => suggestions.clone(),
        _ => Vec::new(),
    };
    json!({
        "query": overlay.input(),
        "type": overlay.type_filter(),
        "scope": overlay.scope_id(),
        "status": status_label(overlay.status()),
        "facets": overlay.facets().facets(),
        "results": results,
        "suggestions": suggestions,
    })
}
