// src/jobs/mod.rs
//! The two scheduled jobs, wired over the collaborator traits in [`crate::clients`].

pub mod contents;
pub mod posts;
