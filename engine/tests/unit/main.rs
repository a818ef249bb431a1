//! Integration tests for the dresktop engine

mod support;
mod test_bootstrap;
mod test_deploy;
mod test_infrastructure;
mod test_journal;
mod test_sync_matrix;
mod test_tags;
