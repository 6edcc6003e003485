//! Integration tests: the router driven in-process over the in-memory store,
//! plus smoke tests against a running server (ignored by default)

mod api_tests;
mod live_tests;
