//! Integration tests for the catalog crawler

mod crawl_tests;
