//! Integration tests for the switchyard settings core

mod active_configuration;
mod cli_commands;
mod profile_store;
mod provider_clients;
mod support;
