//! Property-based tests

mod cookie_proptest;
mod upload_path_proptest;
