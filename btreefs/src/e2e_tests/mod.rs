//! End-to-end tests at the shell command level.
//!
//! Each test file covers one scenario, feeding command lines through a
//! [`Shell`](crate::shell::Shell) on a simulated clock and checking the text
//! it prints along with the resulting namespace.

#![cfg(test)]

mod helpers;

mod test_determinism;
mod test_directories;
mod test_files;
mod test_many_entries;
mod test_save_image;
mod test_timestamps;
