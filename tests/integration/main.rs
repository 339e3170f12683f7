//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and tempfile output
//! directories to run the full mirror end-to-end.

mod mirror_tests;
