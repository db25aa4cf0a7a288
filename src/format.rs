use reqwest::Url;

use crate::error::RenderError;
use crate::listing::Listing;

/// Rendered notification: Telegram HTML text plus an optional validated
/// banner image url.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub text: String,
    pub media_url: Option<String>,
}

/// Placeholder for a missing project name, and the marker for an
/// unpublished price.
pub const UNKNOWN: &str = "غير معروف";

/// Render one listing. Deterministic and pure; fails only for a listing
/// with an empty id (no detail link can be derived).
pub fn render(listing: &Listing) -> Result<NotificationPayload, RenderError> {
    if listing.id.trim().is_empty() {
        return Err(RenderError {
            reason: "empty listing id".to_string(),
        });
    }

    let name = listing.name.as_deref().unwrap_or(UNKNOWN);
    // Zero means "price not published" no matter which source produced
    // the listing; the literal 0 must never reach a notification.
    let price = match listing.min_price.filter(|p| *p > 0) {
        Some(p) => format!("{} ريال", group_thousands(p)),
        None => UNKNOWN.to_string(),
    };

    let text = format!(
        "🏡 <b>{}</b>\n💰 السعر الابتدائي: <b>{}</b>\n🔗 <a href=\"{}\">رابط المشروع</a>",
        escape_html(name),
        escape_html(&price),
        listing.detail_url(),
    );

    Ok(NotificationPayload {
        text,
        media_url: listing.banner_url.as_deref().and_then(validated_media_url),
    })
}

/// Thousands grouping with commas: 1234567 -> "1,234,567".
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Only absolute http(s) urls are usable as a Telegram photo reference.
fn validated_media_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.into()),
        _ => None,
    }
}

/// Minimal escaping for Telegram parse_mode=HTML.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: Option<&str>, price: Option<u64>, banner: Option<&str>) -> Listing {
        Listing {
            id: "project_42".to_string(),
            name: name.map(String::from),
            min_price: price,
            banner_url: banner.map(String::from),
        }
    }

    #[test]
    fn test_price_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_renders_grouped_price() {
        let payload = render(&listing(Some("حي الفرسان"), Some(1234567), None)).unwrap();
        assert!(payload.text.contains("1,234,567 ريال"));
        assert!(payload.text.contains("حي الفرسان"));
        assert!(payload
            .text
            .contains("https://sakani.sa/app/land-projects/42"));
    }

    #[test]
    fn test_unknown_price_never_renders_zero() {
        for price in [None, Some(0)] {
            let payload = render(&listing(Some("X"), price, None)).unwrap();
            assert!(payload.text.contains(UNKNOWN));
            assert!(!payload.text.contains(">0<"));
            assert!(!payload.text.contains("0 ريال"));
        }
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let payload = render(&listing(None, Some(500_000), None)).unwrap();
        assert!(payload.text.contains(&format!("<b>{}</b>", UNKNOWN)));
        assert!(payload.text.contains("500,000 ريال"));
    }

    #[test]
    fn test_name_is_html_escaped() {
        let payload = render(&listing(Some("A & B <x>"), Some(1), None)).unwrap();
        assert!(payload.text.contains("A &amp; B &lt;x&gt;"));
    }

    #[test]
    fn test_media_url_must_be_absolute_http() {
        let ok = render(&listing(None, None, Some("https://cdn.sakani.sa/banner.jpg"))).unwrap();
        assert_eq!(
            ok.media_url.as_deref(),
            Some("https://cdn.sakani.sa/banner.jpg")
        );

        let relative = render(&listing(None, None, Some("/banner.jpg"))).unwrap();
        assert_eq!(relative.media_url, None);

        let ftp = render(&listing(None, None, Some("ftp://cdn.sakani.sa/banner.jpg"))).unwrap();
        assert_eq!(ftp.media_url, None);
    }

    #[test]
    fn test_empty_id_is_render_error() {
        let bad = Listing {
            id: "  ".to_string(),
            name: None,
            min_price: None,
            banner_url: None,
        };
        assert!(render(&bad).is_err());
    }
}
