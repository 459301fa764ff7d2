//! Integration tests for replica.

mod model;

mod concurrency;
mod plugins;
mod scenarios;
