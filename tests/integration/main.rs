//! HTTP-level integration tests over the in-memory backends.

mod helpers;

mod file_test;
mod folder_test;
mod recycle_bin_test;
