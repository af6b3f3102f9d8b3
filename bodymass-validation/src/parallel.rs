// Concurrent validation of independent groups

use crate::{Error, MessageBag, Result, Validator};
use bodymass_log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::task::JoinSet;

/// Combined outcome of several validators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub validated: BTreeMap<String, Value>,
    pub errors: MessageBag,
    pub failed: bool,
}

/// Run each validator on its own task and combine the results.
///
/// Error bags are merged with [`MessageBag::merge`] and validated maps are
/// unioned. Groups are expected to cover disjoint fields. The first
/// configuration error is returned and the remaining tasks are dropped.
///
/// # Examples
///
/// ```
/// # use bodymass_validation::{validate_groups, Validator};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let weight = Validator::builder()
///     .value("weight", "")
///     .rule("weight", "Required")
///     .build();
/// let height = Validator::builder()
///     .value("height", "1.75")
///     .rule("height", "Required,Numeric")
///     .build();
///
/// let report = validate_groups(vec![weight, height]).await.unwrap();
/// assert!(report.failed);
/// assert_eq!(report.errors.keys(), ["weight"]);
/// assert!(report.validated.contains_key("height"));
/// # }
/// ```
pub async fn validate_groups<I>(validators: I) -> Result<GroupReport>
where
    I: IntoIterator<Item = Validator>,
{
    let mut set = JoinSet::new();

    for validator in validators {
        set.spawn(async move { validator.into_report() });
    }

    debug!({ groups = set.len() }, "validating groups");

    let mut report = GroupReport::default();
    let mut bags = Vec::new();

    while let Some(joined) = set.join_next().await {
        let group = joined.map_err(|e| Error::TaskFailed(e.to_string()))??;

        report.failed |= !group.passed;
        report.validated.extend(group.validated);
        bags.push(group.errors);
    }

    report.errors.merge(&bags);
    Ok(report)
}
