//! YouTube videos and channels

use crate::handler::canonical::{query_value, take_code};
use crate::handler::{CanonicalHandler, CanonicalRules, ChannelRules, CompoundChannelHandler};
use crate::request::RequestSpec;
use crate::url::{strip_protocol, PathRule};

/// Cookie that skips the EU consent interstitial
const CONSENT_COOKIE: &str = "YES+cb.20210328-17-p0.en+F+678";

/// `watch?v=`, `youtu.be/`, `shorts/`, `embed/` and `live/` video links
#[derive(Debug)]
pub struct YouTubeVideoRules;

const VIDEO_RULES: [PathRule; 5] = [
    PathRule::new("*.youtube.com", "/watch"),
    PathRule::new("youtu.be", "/"),
    PathRule::new("*.youtube.com", "/shorts/"),
    PathRule::new("*.youtube.com", "/embed/"),
    PathRule::new("*.youtube.com", "/live/"),
];

impl CanonicalRules for YouTubeVideoRules {
    const NAME: &'static str = "YouTubeVideoHandler";

    fn rules() -> &'static [PathRule] {
        &VIDEO_RULES
    }

    fn code_for_rule(rule: usize, stripped: &str) -> Option<String> {
        let code = match rule {
            0 => query_value(stripped, "v")?,
            _ => {
                let prefix = VIDEO_RULES.get(rule)?.prefix();
                let path = &stripped[stripped.find(prefix)? + prefix.len()..];
                take_code(path)
            }
        };
        Some(code.to_string())
    }

    fn code_to_url(code: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", code)
    }
}

pub type YouTubeVideoHandler = CanonicalHandler<YouTubeVideoRules>;

/// Channel pages, channel feeds, `@handle` and `/user/` links
#[derive(Debug)]
pub struct YouTubeChannelRules;

const CHANNEL_RULES: [PathRule; 4] = [
    PathRule::new("*.youtube.com", "/channel/"),
    PathRule::new("*.youtube.com", "/feeds/videos.xml"),
    PathRule::new("*.youtube.com", "/@"),
    PathRule::new("*.youtube.com", "/user/"),
];

impl ChannelRules for YouTubeChannelRules {
    const NAME: &'static str = "YouTubeChannelHandler";

    fn rules() -> &'static [PathRule] {
        &CHANNEL_RULES
    }

    fn code_from_url(url: &str) -> Option<String> {
        let stripped = strip_protocol(url);
        if !stripped.contains("youtube.com") {
            return None;
        }

        let code = if let Some(index) = stripped.find("/channel/") {
            take_code(&stripped[index + "/channel/".len()..])
        } else if stripped.contains("/feeds/") {
            query_value(stripped, "channel_id")?
        } else {
            return None;
        };
        (!code.is_empty()).then(|| code.to_string())
    }

    fn code_to_url(code: &str) -> String {
        format!("https://www.youtube.com/channel/{}", code)
    }

    fn code_to_feed(code: &str) -> String {
        format!("https://www.youtube.com/feeds/videos.xml?channel_id={}", code)
    }

    fn can_discover_code(url: &str) -> bool {
        let stripped = strip_protocol(url);
        stripped.contains("youtube.com/@") || stripped.contains("youtube.com/user/")
    }

    fn prepare_request(request: &mut RequestSpec) {
        request
            .cookies
            .insert("CONSENT".to_string(), CONSENT_COOKIE.to_string());
    }

    /// A feed link stays as given; anything else becomes the channel page
    fn canonical_url(input: &str, code: Option<&str>) -> Option<String> {
        if input.contains("/feeds/") {
            Some(input.to_string())
        } else {
            code.map(Self::code_to_url)
        }
    }
}

pub type YouTubeChannelHandler = CompoundChannelHandler<YouTubeChannelRules>;
