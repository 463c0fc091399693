use serde::{Deserialize, Serialize};

/// Share of a language across a user's repositories, in percent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub name: String,
    pub percentage: f64,
}
