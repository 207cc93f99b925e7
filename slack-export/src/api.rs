pub mod slack;

use std::collections::BTreeMap;

pub use slack::{SlackApi, SlackClient};

/// Query parameters of one API call.
pub type Params = BTreeMap<String, String>;

pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
