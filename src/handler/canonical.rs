//! Handlers that rewrite a URL into its canonical form before fetching

use crate::handler::{Handler, HttpPageHandler};
use crate::page::Page;
use crate::request::RequestSpec;
use crate::response::ResponseModel;
use crate::url::{first_matching_rule, strip_protocol, PathRule};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// URL shapes of one site and how to turn them into a canonical URL
pub trait CanonicalRules: Send + Sync + 'static {
    const NAME: &'static str;

    /// Accepted shapes, checked in order against the protocol-stripped URL
    fn rules() -> &'static [PathRule];

    /// Extracts the code from `stripped`, given the index of the matching rule
    fn code_for_rule(rule: usize, stripped: &str) -> Option<String>;

    fn code_to_url(code: &str) -> String;
}

/// Rewrites any accepted shape to one canonical URL, then fetches that
///
/// Matching is a pure string test; no network call happens before the URL
/// has been rewritten.
pub struct CanonicalHandler<R: CanonicalRules> {
    request: RequestSpec,
    code: Option<String>,
    canonical_url: Option<String>,
    inner: HttpPageHandler,
    _rules: PhantomData<R>,
}

impl<R: CanonicalRules> CanonicalHandler<R> {
    pub fn new(request: RequestSpec) -> Self {
        let code = Self::input_to_code(&request.url);
        let canonical_url = code.as_deref().map(R::code_to_url);
        let inner_url = canonical_url.clone().unwrap_or_else(|| request.url.clone());
        let inner = HttpPageHandler::new(request.with_url(inner_url));

        Self {
            request,
            code,
            canonical_url,
            inner,
            _rules: PhantomData,
        }
    }

    /// Code of `url`, if it has one of the accepted shapes
    pub fn input_to_code(url: &str) -> Option<String> {
        let stripped = strip_protocol(url);
        let rule = first_matching_rule(R::rules(), stripped)?;
        R::code_for_rule(rule, stripped).filter(|code| !code.is_empty())
    }

    pub fn input_to_url(url: &str) -> Option<String> {
        Self::input_to_code(url).map(|code| R::code_to_url(&code))
    }
}

impl<R: CanonicalRules> fmt::Debug for CanonicalHandler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(R::NAME)
            .field("url", &self.request.url)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: CanonicalRules> Handler for CanonicalHandler<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn url(&self) -> &str {
        self.canonical_url.as_deref().unwrap_or(&self.request.url)
    }

    fn request(&self) -> &RequestSpec {
        &self.request
    }

    fn is_handled_by(&self) -> bool {
        self.code.is_some()
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    async fn get_response(&mut self) -> Option<Arc<ResponseModel>> {
        self.inner.get_response().await
    }

    fn response(&self) -> Option<Arc<ResponseModel>> {
        self.inner.response()
    }

    fn page(&self) -> Option<&Page> {
        self.inner.page()
    }

    fn canonical_url(&self) -> Option<String> {
        self.canonical_url.clone()
    }
}

/// Value up to the first `?`, `&`, `/` or `#`
pub(crate) fn take_code(value: &str) -> &str {
    let end = value.find(['?', '&', '/', '#']).unwrap_or(value.len());
    &value[..end]
}

/// Value of query parameter `name` in a protocol-stripped URL
pub(crate) fn query_value<'a>(stripped: &'a str, name: &str) -> Option<&'a str> {
    let query = &stripped[stripped.find('?')? + 1..];
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}
