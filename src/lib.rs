//! Palaver library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod agent;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Visual theme applied to the whole interface at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}
