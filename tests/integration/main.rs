//! In-process integration tests against an in-memory SQLite store

mod repository_tests;
