//! Refresh engine - runs Read for many tracked resources in parallel
//!
//! Operations on different resource instances are independent, so they
//! can share a thread pool. Each instance still sees at most one call.

use crate::context::ProgressCallback;
use crate::resource::{Resource, ResourceExt};
use crate::types::{RefreshOptions, RefreshOutcome, RefreshSummary};
use anyhow::Result;
use rayon::prelude::*;

/// One tracked resource to refresh
pub struct RefreshTarget<'a, S: ?Sized> {
    /// Engine address, e.g. "cf_private_domain_access.shared"
    pub address: String,
    /// Resource type handling this instance
    pub resource: &'a dyn Resource<S>,
    /// Tracked identifier
    pub id: String,
}

/// Refresh every target and report per-address outcomes
///
/// Results come back in target order. A failed Read is reported as
/// [`RefreshOutcome::Failed`] and never as absence.
pub fn refresh_all<S, P>(
    session: &S,
    targets: &[RefreshTarget<'_, S>],
    opts: &RefreshOptions,
    progress: &mut P,
) -> Result<(Vec<(String, RefreshOutcome)>, RefreshSummary)>
where
    S: ?Sized + Sync,
    P: ProgressCallback,
{
    progress.on_batch_start(targets.len());

    let outcomes = if opts.jobs <= 1 || targets.len() <= 1 {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            progress.on_resource_start(&target.address);
            let outcome = target.resource.refresh(session, &target.id);
            progress.on_resource_complete(&target.address, &outcome);
            outcomes.push((target.address.clone(), outcome));
        }
        outcomes
    } else {
        refresh_parallel(session, targets, opts.jobs, progress)?
    };

    progress.on_batch_complete();

    let mut summary = RefreshSummary::default();
    for (_, outcome) in &outcomes {
        summary.add_outcome(outcome);
    }
    Ok((outcomes, summary))
}

fn refresh_parallel<S, P>(
    session: &S,
    targets: &[RefreshTarget<'_, S>],
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<(String, RefreshOutcome)>>
where
    S: ?Sized + Sync,
    P: ProgressCallback,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    // The callback isn't thread-safe; report after the pool finishes.
    let outcomes: Vec<(String, RefreshOutcome)> = pool.install(|| {
        targets
            .par_iter()
            .map(|target| {
                (
                    target.address.clone(),
                    target.resource.refresh(session, &target.id),
                )
            })
            .collect()
    });

    for (address, outcome) in &outcomes {
        progress.on_resource_complete(address, outcome);
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::error::{ResourceError, Result as ResourceResult};
    use crate::resource::AttributeSchema;
    use crate::types::{Attributes, ResourceData};
    use std::collections::BTreeSet;
    use std::io;

    /// Remote side: ids that exist, plus ids whose query fails
    struct Remote {
        existing: BTreeSet<String>,
        broken: BTreeSet<String>,
    }

    #[derive(Debug)]
    struct Lookup;

    impl Resource<Remote> for Lookup {
        fn resource_type(&self) -> &'static str {
            "lookup"
        }

        fn description(&self) -> String {
            "Lookup".into()
        }

        fn id_format(&self) -> String {
            "<id>".into()
        }

        fn schema(&self) -> Vec<AttributeSchema> {
            vec![]
        }

        fn create(&self, _: &Remote, _: &Attributes) -> ResourceResult<ResourceData> {
            Err(ResourceError::remote(io::Error::other("not supported")))
        }

        fn read(&self, remote: &Remote, id: &str) -> ResourceResult<Option<ResourceData>> {
            if remote.broken.contains(id) {
                return Err(ResourceError::remote(io::Error::other("503")));
            }
            Ok(remote
                .existing
                .contains(id)
                .then(|| ResourceData::passthrough(id)))
        }

        fn delete(&self, _: &Remote, _: &str) -> ResourceResult<()> {
            Ok(())
        }

        fn import(&self, _: &Remote, id: &str) -> ResourceResult<ResourceData> {
            Ok(ResourceData::passthrough(id))
        }
    }

    /// Records every callback, in order
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ProgressCallback for Recorder {
        fn on_batch_start(&mut self, count: usize) {
            self.0.push(format!("start {count}"));
        }
        fn on_resource_start(&mut self, address: &str) {
            self.0.push(format!("begin {address}"));
        }
        fn on_resource_complete(&mut self, address: &str, outcome: &RefreshOutcome) {
            let state = if outcome.is_present() {
                "present"
            } else if outcome.is_absent() {
                "absent"
            } else {
                "failed"
            };
            self.0.push(format!("done {address} {state}"));
        }
        fn on_batch_complete(&mut self) {
            self.0.push("end".into());
        }
    }

    fn remote() -> Remote {
        Remote {
            existing: ["a", "b"].iter().map(|s| s.to_string()).collect(),
            broken: ["c"].iter().map(|s| s.to_string()).collect(),
        }
    }

    fn targets(ids: &[&str]) -> Vec<RefreshTarget<'static, Remote>> {
        ids.iter()
            .map(|id| RefreshTarget {
                address: format!("lookup.{id}"),
                resource: &Lookup,
                id: id.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_refresh_empty() {
        let (outcomes, summary) =
            refresh_all(&remote(), &[], &RefreshOptions::default(), &mut NoProgress).unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_refresh_sequential() {
        let opts = RefreshOptions { jobs: 1 };
        let (outcomes, summary) =
            refresh_all(&remote(), &targets(&["a", "z", "c"]), &opts, &mut NoProgress).unwrap();
        assert!(outcomes[0].1.is_present());
        assert!(outcomes[1].1.is_absent());
        assert!(outcomes[2].1.is_failed());
        assert_eq!(summary.present, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_refresh_parallel_keeps_order() {
        let opts = RefreshOptions { jobs: 4 };
        let ids = ["a", "b", "x", "c", "y"];
        let (outcomes, summary) =
            refresh_all(&remote(), &targets(&ids), &opts, &mut NoProgress).unwrap();
        let addresses: Vec<_> = outcomes.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["lookup.a", "lookup.b", "lookup.x", "lookup.c", "lookup.y"]
        );
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_sequential_progress_order() {
        let mut rec = Recorder::default();
        let opts = RefreshOptions { jobs: 1 };
        refresh_all(&remote(), &targets(&["a", "z", "c"]), &opts, &mut rec).unwrap();
        assert_eq!(
            rec.0,
            vec![
                "start 3",
                "begin lookup.a",
                "done lookup.a present",
                "begin lookup.z",
                "done lookup.z absent",
                "begin lookup.c",
                "done lookup.c failed",
                "end",
            ]
        );
    }

    #[test]
    fn test_parallel_progress_order() {
        let mut rec = Recorder::default();
        let opts = RefreshOptions { jobs: 4 };
        refresh_all(&remote(), &targets(&["c", "a", "y", "b"]), &opts, &mut rec).unwrap();
        // no per-resource start on the parallel path; completions in target order
        assert_eq!(
            rec.0,
            vec![
                "start 4",
                "done lookup.c failed",
                "done lookup.a present",
                "done lookup.y absent",
                "done lookup.b present",
                "end",
            ]
        );
    }

    #[test]
    fn test_progress_empty_batch() {
        let mut rec = Recorder::default();
        refresh_all(&remote(), &[], &RefreshOptions { jobs: 4 }, &mut rec).unwrap();
        assert_eq!(rec.0, vec!["start 0", "end"]);
    }
}
