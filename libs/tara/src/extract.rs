//! Scraping values out of server-rendered HTML
//!
//! The broker does not expose an API, so the CSRF token and the control code
//! are cut out of its pages between fixed markers. Any markup change upstream
//! breaks this; [`TokenScraper`] is the seam where a structured parser can be
//! plugged in without touching the handshake.

const CSRF_LEFT: &str = r#"name="_csrf" value=""#;
const CSRF_RIGHT: &str = "\"";
const CONTROL_CODE_LEFT: &str = r#"<p class="control-code">"#;
const CONTROL_CODE_RIGHT: &str = "<";

/// Substring strictly between the first `left` and the first `right` after it.
///
/// Returns `None` when `left` is absent or no `right` follows it. A `right`
/// occurring before `left` is ignored.
pub fn extract_between<'a>(text: &'a str, left: &str, right: &str) -> Option<&'a str> {
    let start = text.find(left)? + left.len();
    let rest = text.get(start..)?;
    let end = rest.find(right)?;
    rest.get(..end)
}

/// Pulls protocol values out of broker pages.
pub trait TokenScraper: Send + Sync {
    fn csrf_token(&self, html: &str) -> Option<String>;

    fn control_code(&self, html: &str) -> Option<String>;
}

/// [`TokenScraper`] over the broker's current markup, using fixed markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScraper;

impl TokenScraper for MarkerScraper {
    fn csrf_token(&self, html: &str) -> Option<String> {
        non_empty(extract_between(html, CSRF_LEFT, CSRF_RIGHT))
    }

    fn control_code(&self, html: &str) -> Option<String> {
        non_empty(extract_between(html, CONTROL_CODE_LEFT, CONTROL_CODE_RIGHT))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
