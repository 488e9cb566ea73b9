//! Command-line front end for the freeleech monitor.
pub mod cli;
pub mod config;
