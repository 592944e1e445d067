//! Integration tests for WebLens
//!
//! `support` provides an in-process fixture crawler; HTTP behaviour that
//! needs a real socket (deadlines, robots.txt) runs against wiremock.

mod support;

mod compound_tests;
mod resolver_tests;
mod robots_tests;
mod transport_tests;
