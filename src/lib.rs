// src/lib.rs

//! Trending Watch Library
//!
//! Scrapes the GitHub trending listing, records repositories the first time
//! they appear and announces them on a messaging webhook.

pub mod config;
pub mod credentials;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
