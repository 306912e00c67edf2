//! Simulated client identity generation
//!
//! Produces the randomized cookie and header material the upstream
//! expects from a fresh browser client. Values are regenerated wholesale
//! on every refresh so no two sessions share identity material.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashMap;

/// Header name the CSRF token is injected under after a successful fetch
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Chrome major versions rotated through generated user-agent strings
const CHROME_VERSIONS: &[&str] = &[
    "124.0.0.0",
    "125.0.0.0",
    "126.0.0.0",
    "127.0.0.0",
    "128.0.0.0",
    "129.0.0.0",
    "130.0.0.0",
];

/// Device strings rotated through generated user-agent strings
const ANDROID_DEVICES: &[&str] = &[
    "Linux; Android 10; K",
    "Linux; Android 11; SM-G991B",
    "Linux; Android 12; Pixel 6",
    "Linux; Android 13; SM-S918B",
];

/// One generated client identity: cookie set plus header set
///
/// Everything here is request-shaping material; the identity itself has
/// no validity state. A [`crate::session::ChatSession`] pairs it with a
/// fetched token.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Cookie names to values, sent on every upstream call
    pub cookies: HashMap<String, String>,
    /// Header names to values, including user-agent and referer
    pub headers: HashMap<String, String>,
}

impl Identity {
    /// Generate a fresh identity for the given upstream origin
    ///
    /// `origin` is the scheme+host of the upstream service, e.g.
    /// `https://app.claila.com`. Infallible; only consumes RNG and the
    /// current wall clock.
    pub fn generate(origin: &str) -> Self {
        Self {
            cookies: generate_cookies(),
            headers: generate_headers(origin),
        }
    }

    /// Render the cookie map as a single `Cookie` header value
    pub fn cookie_header(&self) -> String {
        let mut pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        // Stable ordering keeps the header reproducible for a given set
        pairs.sort();
        pairs.join("; ")
    }
}

/// Random alphanumeric string of the given length
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Pick a realistic mobile Chrome user-agent with a randomized version
fn random_user_agent() -> String {
    let mut rng = rand::rng();
    let device = ANDROID_DEVICES[rng.random_range(0..ANDROID_DEVICES.len())];
    let version = CHROME_VERSIONS[rng.random_range(0..CHROME_VERSIONS.len())];
    format!(
        "Mozilla/5.0 ({device}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Mobile Safari/537.36"
    )
}

/// Cookie set matching what the upstream hands a first-time browser client
///
/// The analytics-style `_ga`/`_gid` values embed randomized numeric
/// segments and the current timestamp so consecutive identities never
/// collide.
fn generate_cookies() -> HashMap<String, String> {
    let mut rng = rand::rng();
    let now = Utc::now().timestamp();

    let mut cookies = HashMap::new();
    cookies.insert("dmcfkjn3cdc".to_string(), random_string(32));
    cookies.insert(
        "_ga".to_string(),
        format!(
            "GA1.1.{}.{}",
            rng.random_range(100_000..=999_999),
            rng.random_range(1_000_000_000i64..=1_999_999_999i64)
        ),
    );
    cookies.insert(
        "_gid".to_string(),
        format!("GA1.1.{}.{}", rng.random_range(100_000_000..=999_999_999), now),
    );
    cookies.insert("theme".to_string(), "dark".to_string());
    cookies.insert("lang".to_string(), "en".to_string());
    cookies.insert("auh".to_string(), random_string(8));
    cookies.insert("session_id".to_string(), random_string(24));
    cookies
}

/// Header set shaped like an XHR from the upstream's own chat page
fn generate_headers(origin: &str) -> HashMap<String, String> {
    let authority = origin
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string();

    let mut headers = HashMap::new();
    headers.insert("authority".to_string(), authority);
    headers.insert("accept".to_string(), "*/*".to_string());
    headers.insert("accept-language".to_string(), "en-US,en;q=0.9".to_string());
    headers.insert(
        "content-type".to_string(),
        "application/x-www-form-urlencoded; charset=UTF-8".to_string(),
    );
    headers.insert("origin".to_string(), origin.trim_end_matches('/').to_string());
    headers.insert(
        "referer".to_string(),
        format!(
            "{}/chat?uid={}&lang=en",
            origin.trim_end_matches('/'),
            random_string(8)
        ),
    );
    headers.insert("user-agent".to_string(), random_user_agent());
    headers.insert("x-requested-with".to_string(), "XMLHttpRequest".to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://app.claila.com";

    #[test]
    fn test_identity_contains_required_cookies() {
        let identity = Identity::generate(ORIGIN);
        for key in [
            "dmcfkjn3cdc",
            "_ga",
            "_gid",
            "theme",
            "lang",
            "auh",
            "session_id",
        ] {
            assert!(identity.cookies.contains_key(key), "missing cookie {key}");
        }
    }

    #[test]
    fn test_identity_contains_required_headers() {
        let identity = Identity::generate(ORIGIN);
        for key in [
            "authority",
            "accept",
            "accept-language",
            "content-type",
            "origin",
            "referer",
            "user-agent",
            "x-requested-with",
        ] {
            assert!(identity.headers.contains_key(key), "missing header {key}");
        }
        assert_eq!(identity.headers["authority"], "app.claila.com");
        assert_eq!(identity.headers["origin"], ORIGIN);
        assert!(identity.headers["referer"].starts_with("https://app.claila.com/chat?uid="));
    }

    #[test]
    fn test_consecutive_identities_differ() {
        // Randomness property: repeated sampling must never produce
        // byte-identical identity material.
        for _ in 0..16 {
            let a = Identity::generate(ORIGIN);
            let b = Identity::generate(ORIGIN);
            assert_ne!(a.cookies["dmcfkjn3cdc"], b.cookies["dmcfkjn3cdc"]);
            assert_ne!(a.cookies["session_id"], b.cookies["session_id"]);
            assert_ne!(a.headers["referer"], b.headers["referer"]);
        }
    }

    #[test]
    fn test_random_string_length_and_charset() {
        let s = random_string(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_user_agent_shape() {
        let ua = random_user_agent();
        assert!(ua.starts_with("Mozilla/5.0 (Linux; Android"));
        assert!(ua.contains("Chrome/"));
        assert!(ua.ends_with("Mobile Safari/537.36"));
    }

    #[test]
    fn test_cookie_header_rendering() {
        let identity = Identity::generate(ORIGIN);
        let header = identity.cookie_header();
        assert!(header.contains("theme=dark"));
        assert!(header.contains("lang=en"));
        assert_eq!(header.matches("; ").count(), identity.cookies.len() - 1);
    }

    #[test]
    fn test_ga_cookie_embeds_timestamp() {
        let identity = Identity::generate(ORIGIN);
        let gid = &identity.cookies["_gid"];
        let parts: Vec<&str> = gid.split('.').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "GA1");
        let ts: i64 = parts[3].parse().expect("timestamp segment");
        assert!(ts > 1_600_000_000);
    }
}
