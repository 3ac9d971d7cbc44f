// ABOUTME: URL and image normalizers: absolute-URL resolution, srcset/style/img sniffing, MIME inference.
// ABOUTME: Used by every extractor for link/image fields and by the assembler for enclosure types.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).unwrap());

static BACKGROUND_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*url\(\s*['"]?([^'")]+)['"]?\s*\)"#).unwrap()
});

/// Resolves `href` against `base`, returning `None` when neither yields an absolute URL.
///
/// Absolute inputs are returned as-is, protocol-relative (`//cdn/x.jpg`) inputs pick up
/// the base scheme, and data URIs pass through untouched.
pub fn resolve_url(href: &str, base: Option<&str>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") || href.starts_with("data:") {
        return Some(href.to_string());
    }

    let base = Url::parse(base?.trim()).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Resolves `href` against `base`, falling back to the raw trimmed value.
///
/// Matches how links are emitted: a source-relative link that cannot be resolved
/// is still better than nothing.
pub fn absolute_url(href: &str, base: &str) -> String {
    resolve_url(href, Some(base)).unwrap_or_else(|| href.trim().to_string())
}

/// Resolves an image URL against the first base that produces an absolute URL.
pub fn resolve_image_url(src: &str, bases: &[&str]) -> String {
    let src = src.trim();
    if src.is_empty() {
        return String::new();
    }
    for base in bases.iter().filter(|b| !b.trim().is_empty()) {
        if let Some(url) = resolve_url(src, Some(base)) {
            return url;
        }
    }
    resolve_url(src, None).unwrap_or_default()
}

/// Returns the `src` of the first `<img>` tag in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Returns the first URL of a `srcset` attribute value.
pub fn first_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

/// Extracts the URL from a `background-image: url(...)` declaration in an inline style.
pub fn background_image_url(style: &str) -> Option<String> {
    BACKGROUND_URL_RE
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Infers an image MIME type from the URL's file extension.
///
/// Unknown or missing extensions default to `image/jpeg`; `.jpg` maps to `jpeg`.
pub fn image_mime_type(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or("").to_string(),
    };

    let file = path.rsplit('/').next().unwrap_or("");
    let ext = match file.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "image/jpeg".to_string(),
    };

    let subtype = match ext.as_str() {
        "jpg" | "jpeg" => "jpeg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        "avif" => "avif",
        "bmp" => "bmp",
        "svg" => "svg+xml",
        _ => "jpeg",
    };
    format!("image/{subtype}")
}
