//! Bucketed matching on the first link value.
//!
//! Source records are grouped by their primary link value. Each target
//! record is paired with a source record from the bucket sharing its primary
//! value; targets with no bucket are dropped.

use std::collections::HashMap;
use tracing::debug;

use notexfr_core::{CrossRef, Error, LinkId, Result, Service};

use crate::policy::{FirstWins, MatchPolicy};

/// Pair target records with source records using the default policy: the
/// first source record in a shared bucket wins.
pub fn link<S, T>(sources: &[S], targets: Vec<T>) -> Result<Vec<CrossRef<T>>>
where
    S: LinkId,
    T: LinkId,
{
    link_with(sources, targets, &FirstWins)
}

/// Pair target records with source records, deferring bucket resolution to
/// `policy`.
///
/// Output follows target order. Any record on either side with no link
/// values at all fails the whole call.
pub fn link_with<S, T>(
    sources: &[S],
    targets: Vec<T>,
    policy: &dyn MatchPolicy,
) -> Result<Vec<CrossRef<T>>>
where
    S: LinkId,
    T: LinkId,
{
    let mut buckets: HashMap<String, Vec<&str>> = HashMap::new();
    for (index, source) in sources.iter().enumerate() {
        let primary = first_link_value(source, Service::Evernote, index)?;
        buckets.entry(primary).or_default().push(source.id());
    }

    let total = targets.len();
    let mut out = Vec::with_capacity(total);
    let mut ambiguous = 0usize;

    for (index, target) in targets.into_iter().enumerate() {
        let primary = first_link_value(&target, Service::StandardNotes, index)?;
        let Some(candidates) = buckets.get(&primary) else {
            policy.unmatched(target.id());
            continue;
        };
        if candidates.len() > 1 {
            ambiguous += 1;
        }
        let Some(chosen) = policy
            .choose(target.id(), candidates)
            .and_then(|i| candidates.get(i))
        else {
            continue;
        };
        let source_id = chosen.to_string();
        out.push(CrossRef::new(target, source_id));
    }

    debug!(
        subsystem = "reconcile",
        component = "bucketed_matcher",
        source_count = sources.len(),
        target_count = total,
        bucket_count = buckets.len(),
        matched_count = out.len(),
        unmatched_count = total - out.len(),
        ambiguous_count = ambiguous,
        "Bucketed match complete"
    );
    Ok(out)
}

fn first_link_value<L: LinkId>(entity: &L, service: Service, index: usize) -> Result<String> {
    entity
        .link_values()
        .into_iter()
        .next()
        .ok_or(Error::LinksEmpty { service, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use notexfr_core::{ChainLink, Item, ItemData, Resource, Tag};

    use crate::policy::Reporting;

    fn en_tag(id: &str, name: &str) -> Tag {
        Tag {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: None,
        }
    }

    fn sn_tag(uuid: &str, title: &str) -> Item {
        Item::Tag(ItemData::new(uuid, title, Utc::now(), Utc::now()))
    }

    #[derive(Debug)]
    struct Linkless(String);

    impl Resource for Linkless {
        fn id(&self) -> &str {
            &self.0
        }

        fn set_id(&mut self, id: String) {
            self.0 = id;
        }
    }

    impl ChainLink for Linkless {
        fn link_values(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_sole_pair_matched() {
        let sources = vec![en_tag("en-foo", "foo"), en_tag("en-bar", "bar")];
        let targets = vec![sn_tag("sn-bar", "bar"), sn_tag("sn-foo", "foo")];

        let out = link(&sources, targets).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].item.uuid(), "sn-bar");
        assert_eq!(out[0].source_id, "en-bar");
        assert_eq!(out[1].source_id, "en-foo");
    }

    #[test]
    fn test_unpartnered_target_dropped() {
        let sources = vec![en_tag("en-foo", "foo")];
        let targets = vec![sn_tag("sn-x", "nope"), sn_tag("sn-foo", "foo")];

        let out = link(&sources, targets).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item.uuid(), "sn-foo");
    }

    #[test]
    fn test_ambiguous_bucket_first_wins() {
        let sources = vec![en_tag("en-1", "dup"), en_tag("en-2", "dup")];
        let targets = vec![sn_tag("sn-1", "dup")];

        let policy = Reporting::new();
        let out = link_with(&sources, targets, &policy).unwrap();
        assert_eq!(out[0].source_id, "en-1");
        assert_eq!(policy.report().ambiguous, vec!["sn-1"]);
    }

    #[test]
    fn test_reporting_policy_sees_unmatched() {
        let policy = Reporting::new();
        let out = link_with(&[en_tag("en-1", "a")], vec![sn_tag("sn-9", "z")], &policy).unwrap();
        assert!(out.is_empty());
        assert_eq!(policy.into_report().unmatched, vec!["sn-9"]);
    }

    #[test]
    fn test_empty_source_links_fail() {
        let sources = vec![Linkless("a".to_string())];
        let err = link(&sources, vec![sn_tag("sn-1", "x")]).unwrap_err();
        assert_eq!(err.to_string(), "links empty; evernote [0]");
    }

    #[test]
    fn test_empty_target_links_fail() {
        let sources = vec![en_tag("en-1", "x")];
        let targets = vec![
            Linkless("t0".to_string()),
            Linkless("t1".to_string()),
        ];
        let err = link(&sources, targets).unwrap_err();
        assert!(matches!(
            err,
            Error::LinksEmpty {
                service: Service::StandardNotes,
                index: 0
            }
        ));
    }

    #[test]
    fn test_no_sources_matches_nothing() {
        let out = link::<Tag, Item>(&[], vec![sn_tag("sn-1", "x")]).unwrap();
        assert!(out.is_empty());
    }
}
