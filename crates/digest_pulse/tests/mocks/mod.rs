#![allow(dead_code)]

pub mod datastore;
pub mod discoverer;
pub mod mailer;
pub mod summarizer;
pub mod transcripts;
