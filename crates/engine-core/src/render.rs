use connectors::feed::response::{HEADER_REQUEST_CHARGE, ResponseHeaders};
use model::{pagination::page::PageResult, resource::kind::ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder shown in the JSON pane when there is nothing to show.
pub const EMPTY_JSON: &str = "\"\"";

/// How a list of items is serialized for display.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// Pretty-printed JSON array.
    #[default]
    Standard,

    /// Items joined with `",\r\n"` inside brackets, kept for consumers that
    /// parse the explorer's historical output.
    Legacy,
}

/// What a sink is asked to display after an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub json: Option<String>,
    pub text: Option<String>,
    pub headers: String,
}

impl ResultView {
    pub fn page(
        page: &PageResult,
        kind: ResourceType,
        format: ResultFormat,
    ) -> Result<Self, serde_json::Error> {
        Ok(ResultView {
            json: Some(render_items(&page.items, format)?),
            text: Some(summary(page.item_count, kind, page.took_ms)),
            headers: render_headers(&page.response_metadata),
        })
    }

    pub fn resource(resource: &Value, headers: &ResponseHeaders) -> Result<Self, serde_json::Error> {
        Ok(ResultView {
            json: Some(serde_json::to_string_pretty(resource)?),
            text: None,
            headers: render_headers(headers),
        })
    }

    pub fn text(text: impl Into<String>, headers: &ResponseHeaders) -> Self {
        ResultView {
            json: None,
            text: Some(text.into()),
            headers: render_headers(headers),
        }
    }

    /// JSON pane content, with the empty placeholder substituted.
    pub fn json_or_placeholder(&self) -> &str {
        match self.json.as_deref() {
            Some(json) if !json.is_empty() => json,
            _ => EMPTY_JSON,
        }
    }
}

/// `"Returned {n} {noun} in {t} ms"`; the noun is plural only above one.
pub fn summary(count: usize, kind: ResourceType, took_ms: u128) -> String {
    format!("Returned {count} {} in {took_ms} ms", kind.noun(count > 1))
}

pub fn render_items(items: &[Value], format: ResultFormat) -> Result<String, serde_json::Error> {
    match format {
        ResultFormat::Standard => serde_json::to_string_pretty(items),
        ResultFormat::Legacy => {
            if items.is_empty() {
                return Ok(EMPTY_JSON.to_string());
            }
            let rendered = items
                .iter()
                .map(serde_json::to_string_pretty)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", rendered.join(",\r\n")))
        }
    }
}

/// One `"key: value\r\n"` line per header.
pub fn render_headers(headers: &ResponseHeaders) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{key}: {value}\r\n"))
        .collect()
}

pub fn request_charge(headers: &ResponseHeaders) -> Option<&str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(HEADER_REQUEST_CHARGE))
        .map(|(_, value)| value.as_str())
}

/// Appends the request charge, when the backend reported one, to a status line.
pub fn status_line(status: &str, headers: &ResponseHeaders) -> String {
    match request_charge(headers) {
        Some(charge) => format!("{status}, RequestCharge: {charge}"),
        None => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_pluralizes_above_one() {
        assert_eq!(
            summary(3, ResourceType::Document, 12),
            "Returned 3 documents in 12 ms"
        );
        assert_eq!(
            summary(1, ResourceType::Document, 5),
            "Returned 1 document in 5 ms"
        );
        assert_eq!(summary(0, ResourceType::Offer, 0), "Returned 0 offer in 0 ms");
    }

    #[test]
    fn legacy_format_joins_without_trailing_comma() {
        let items = vec![json!(1), json!("two"), json!(null)];
        let rendered = render_items(&items, ResultFormat::Legacy).unwrap();
        assert_eq!(rendered, "[1,\r\n\"two\",\r\nnull]");
    }

    #[test]
    fn legacy_format_of_nothing_is_placeholder() {
        assert_eq!(render_items(&[], ResultFormat::Legacy).unwrap(), EMPTY_JSON);
    }

    #[test]
    fn standard_format_is_valid_json() {
        let items = vec![json!({"id": "a,b"}), json!({"id": "c\"d"})];
        let rendered = render_items(&items, ResultFormat::Standard).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, items);

        assert_eq!(render_items(&[], ResultFormat::Standard).unwrap(), "[]");
    }

    #[test]
    fn headers_and_request_charge() {
        let mut headers = ResponseHeaders::new();
        headers.insert("X-MS-Request-Charge".into(), "2.50".into());
        headers.insert("etag".into(), "\"1\"".into());

        assert_eq!(
            render_headers(&headers),
            "X-MS-Request-Charge: 2.50\r\netag: \"1\"\r\n"
        );
        assert_eq!(
            status_line("QueryDocument: 3ms", &headers),
            "QueryDocument: 3ms, RequestCharge: 2.50"
        );
        assert_eq!(
            status_line("ReadDocument: 1ms", &ResponseHeaders::new()),
            "ReadDocument: 1ms"
        );
    }

    #[test]
    fn placeholder_for_missing_json() {
        let view = ResultView::text("Delete Document succeed!", &ResponseHeaders::new());
        assert_eq!(view.json_or_placeholder(), EMPTY_JSON);
    }
}
