//! Odysee videos and channels

use crate::handler::canonical::take_code;
use crate::handler::{CanonicalHandler, CanonicalRules, ChannelRules, CompoundChannelHandler};
use crate::url::{strip_protocol, PathRule};

/// `odysee.com/@channel/video` and bare `odysee.com/video` links
#[derive(Debug)]
pub struct OdyseeVideoRules;

const VIDEO_RULES: [PathRule; 2] = [
    PathRule::new("odysee.com", "/@"),
    PathRule::new("odysee.com", "/"),
];

impl CanonicalRules for OdyseeVideoRules {
    const NAME: &'static str = "OdyseeVideoHandler";

    fn rules() -> &'static [PathRule] {
        &VIDEO_RULES
    }

    /// `@channel/video` or `video`; a channel link alone is not a video
    fn code_for_rule(rule: usize, stripped: &str) -> Option<String> {
        let path = &stripped[stripped.find('/')? + 1..];
        let first = take_code(path);

        if rule == 0 {
            let video = take_code(path[first.len()..].strip_prefix('/')?);
            if video.is_empty() {
                return None;
            }
            return Some(format!("{}/{}", first, video));
        }

        // `$/...` paths are site routes such as channel feeds
        if first.starts_with('$') || first.starts_with('@') {
            return None;
        }
        Some(first.to_string())
    }

    fn code_to_url(code: &str) -> String {
        format!("https://odysee.com/{}", code)
    }
}

pub type OdyseeVideoHandler = CanonicalHandler<OdyseeVideoRules>;

#[derive(Debug)]
pub struct OdyseeChannelRules;

const CHANNEL_RULES: [PathRule; 2] = [
    PathRule::new("odysee.com", "/@"),
    PathRule::new("odysee.com", "/$/rss/"),
];

impl ChannelRules for OdyseeChannelRules {
    const NAME: &'static str = "OdyseeChannelHandler";

    fn rules() -> &'static [PathRule] {
        &CHANNEL_RULES
    }

    /// `@name:id` out of a channel page or channel feed link
    fn code_from_url(url: &str) -> Option<String> {
        let stripped = strip_protocol(url);
        let path = if let Some(index) = stripped.find("odysee.com/$/rss/") {
            &stripped[index + "odysee.com/$/rss/".len()..]
        } else {
            &stripped[stripped.find("odysee.com/")? + "odysee.com/".len()..]
        };
        let code = take_code(path);
        code.starts_with('@').then(|| code.to_string())
    }

    fn code_to_url(code: &str) -> String {
        format!("https://odysee.com/{}", code)
    }

    fn code_to_feed(code: &str) -> String {
        format!("https://odysee.com/$/rss/{}", code)
    }
}

pub type OdyseeChannelHandler = CompoundChannelHandler<OdyseeChannelRules>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::request::RequestSpec;
    use crate::resolver::ResolverContext;

    fn channel(url: &str) -> OdyseeChannelHandler {
        OdyseeChannelHandler::new(RequestSpec::new(url), ResolverContext::new())
    }

    #[test]
    fn test_channel_page() {
        let handler = channel("https://odysee.com/@samtime:1?view=content");
        assert!(handler.is_handled_by());
        assert_eq!(handler.code(), Some("@samtime:1"));
        assert_eq!(
            handler.channel_sources(),
            vec![
                "https://odysee.com/$/rss/@samtime:1".to_string(),
                "https://odysee.com/@samtime:1".to_string(),
            ]
        );
    }

    #[test]
    fn test_channel_feed() {
        let handler = channel("https://odysee.com/$/rss/@samtime:1");
        assert_eq!(handler.code(), Some("@samtime:1"));
        assert_eq!(handler.feeds(), vec!["https://odysee.com/$/rss/@samtime:1"]);
    }

    #[test]
    fn test_video_links() {
        let handler = OdyseeVideoHandler::new(RequestSpec::new(
            "https://odysee.com/@samtime:1/some-video:a?r=x",
        ));
        assert!(handler.is_handled_by());
        assert_eq!(handler.url(), "https://odysee.com/@samtime:1/some-video:a");

        let handler = OdyseeVideoHandler::new(RequestSpec::new("https://odysee.com/some-video:a"));
        assert_eq!(handler.code(), Some("some-video:a"));

        for url in [
            "https://odysee.com/@samtime:1",
            "https://odysee.com/@samtime:1?view=content",
            "https://odysee.com/$/rss/@samtime:1",
            "https://odysee.com",
        ] {
            assert!(!OdyseeVideoHandler::new(RequestSpec::new(url)).is_handled_by(), "{}", url);
        }
    }

    #[test]
    fn test_not_a_channel() {
        assert!(!channel("https://odysee.com/").is_handled_by());
        assert!(!channel("https://www.youtube.com/@x").is_handled_by());
    }
}
