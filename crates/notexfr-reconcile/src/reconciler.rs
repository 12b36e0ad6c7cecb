//! Reconciliation and conversion operations.
//!
//! Each operation loads its inputs, runs one algorithm, writes one output
//! and returns the records it wrote. Operations run under a deadline that
//! is checked between stages; nothing is written once it has passed.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use notexfr_core::logging::{
    AMBIGUOUS_COUNT, DURATION_MS, ITEM_COUNT, OPERATION, PATH, SUBSYSTEM, UNMATCHED_COUNT,
};
use notexfr_core::{
    CrossRef, Error, IdSource, Item, ItemList, KeyedItems, LinkId, Note, Notebook, RandomIds,
    Result, SourceEntity, Tag,
};
use notexfr_repo as repo;

use crate::config::ReconcileConfig;
use crate::convert::{Convert, FlatConverter, StructuredConverter};
use crate::policy::{FirstWins, MatchPolicy, Reporting};
use crate::{linker, matcher, notebooks};

/// Input files of an API export, one JSON array per kind.
#[derive(Debug, Clone, Default)]
pub struct SourceFiles {
    pub notebooks: PathBuf,
    pub notes: PathBuf,
    pub tags: PathBuf,
}

/// Options for `match_tags`, `match_notes` and `reconcile_notebooks`.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Source export file for the entity kind being matched.
    pub source: PathBuf,
    /// Target conversion file.
    pub target: PathBuf,
    /// Output file; stdout when `None`.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct BackfillOptions {
    pub source: SourceFiles,
    pub target: PathBuf,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub source: SourceFiles,
    pub output: Option<PathBuf>,
}

/// Options for operations reading an XML export.
#[derive(Debug, Clone, Default)]
pub struct EnexOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

/// Wall-clock budget for one operation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail with [`Error::DeadlineExceeded`] if the budget is spent.
    pub fn check(&self, stage: &str) -> Result<()> {
        let elapsed = self.elapsed();
        if elapsed > self.limit {
            return Err(Error::DeadlineExceeded {
                stage: stage.to_string(),
                elapsed_ms: elapsed.as_millis(),
            });
        }
        Ok(())
    }
}

/// An API export loaded into keyed collections.
pub struct SourceExport {
    pub notebooks: KeyedItems<Notebook>,
    pub notes: KeyedItems<Note>,
    pub tags: KeyedItems<Tag>,
}

impl SourceExport {
    pub fn load(files: &SourceFiles) -> Result<Self> {
        Ok(Self {
            notebooks: KeyedItems::from_items(repo::read_notebooks(&files.notebooks)?),
            notes: KeyedItems::from_items(repo::read_notes(&files.notes)?),
            tags: KeyedItems::from_items(repo::read_tags(&files.tags)?),
        })
    }

    /// Notes, then tags, then notebooks, each in file order.
    pub fn entities(&self) -> Vec<SourceEntity> {
        let notes = self.notes.iter().cloned().map(SourceEntity::from);
        let tags = self.tags.iter().cloned().map(SourceEntity::from);
        let notebooks = self.notebooks.iter().cloned().map(SourceEntity::from);
        notes.chain(tags).chain(notebooks).collect()
    }
}

/// Entry point for every reconciliation and conversion operation.
pub struct Reconciler {
    config: ReconcileConfig,
    verbose: bool,
    now: Option<DateTime<Utc>>,
    ids: Box<dyn IdSource>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            verbose: false,
            now: None,
            ids: Box::new(RandomIds),
        }
    }

    /// Report dropped and ambiguous records at WARN level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Fix the conversion time instead of reading the clock.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Draw fresh item ids from `ids` instead of random UUIDs.
    pub fn with_ids(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Pair target tags with source tags by name.
    pub fn match_tags(&self, opts: &MatchOptions) -> Result<Vec<CrossRef<Item>>> {
        let deadline = Deadline::start(self.config.match_timeout());
        let sources = repo::read_tags(&opts.source)?;
        let (_, targets) = repo::read_conversion_file(&opts.target)?;
        deadline.check("load")?;

        let out = self.bucketed("match_tags", &sources, targets)?;
        deadline.check("match")?;

        finish("match_tags", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Pair target notes with source notes by creation time.
    pub fn match_notes(&self, opts: &MatchOptions) -> Result<Vec<CrossRef<Item>>> {
        let deadline = Deadline::start(self.config.match_timeout());
        let sources = repo::read_notes(&opts.source)?;
        let (targets, _) = repo::read_conversion_file(&opts.target)?;
        deadline.check("load")?;

        let out = self.bucketed("match_notes", &sources, targets)?;
        deadline.check("match")?;

        finish("match_notes", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Build target tags standing in for source notebooks and stacks.
    pub fn reconcile_notebooks(&mut self, opts: &MatchOptions) -> Result<Vec<CrossRef<Item>>> {
        let deadline = Deadline::start(self.config.match_timeout());
        let sources = repo::read_notebooks(&opts.source)?;
        let (_, tags) = repo::read_conversion_file(&opts.target)?;
        deadline.check("load")?;

        let out = notebooks::synthesize_notebook_tags(
            &sources,
            &tags,
            &self.config.conflict_prefix,
            self.ids.as_mut(),
        );
        deadline.check("synthesize")?;

        finish("reconcile_notebooks", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Link target notes to source notes and add notebook references.
    pub fn backfill_notes(&self, opts: &BackfillOptions) -> Result<Vec<CrossRef<Item>>> {
        let deadline = Deadline::start(self.config.backfill_timeout());
        let source = SourceExport::load(&opts.source)?;
        let (targets, _) = repo::read_conversion_file(&opts.target)?;
        deadline.check("load")?;

        let total = targets.len();
        let out = linker::backfill_notes(&source.notes, targets)?;
        deadline.check("backfill")?;

        if self.verbose && out.len() < total {
            warn!(
                { SUBSYSTEM } = "reconcile",
                { OPERATION } = "backfill_notes",
                { UNMATCHED_COUNT } = total - out.len(),
                "Target notes dropped without a unique source partner"
            );
        }

        finish("backfill_notes", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Convert an API export into a target import file.
    pub fn convert_edam(&self, opts: &ConvertOptions) -> Result<ItemList> {
        let deadline = Deadline::start(self.config.convert_timeout());
        let source = SourceExport::load(&opts.source)?;
        deadline.check("load")?;

        let items = StructuredConverter::new(self.now()).convert(&source.entities())?;
        deadline.check("convert")?;

        let out = ItemList::new(items);
        finish("convert_edam", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Convert an XML export into a target import file.
    pub fn convert_enex(&mut self, opts: &EnexOptions) -> Result<ItemList> {
        let deadline = Deadline::start(self.config.convert_timeout());
        let notes = repo::read_enex(&opts.input)?;
        deadline.check("load")?;

        let entities: Vec<SourceEntity> = notes.into_iter().map(SourceEntity::from).collect();
        let now = self.now();
        let items = FlatConverter::new(now, self.ids.as_mut()).convert(&entities)?;
        deadline.check("convert")?;

        let out = ItemList::new(items);
        finish("convert_enex", &out, opts.output.as_deref(), &deadline)?;
        Ok(out)
    }

    /// Dump the notes of an XML export as JSON.
    pub fn enex_to_json(&self, opts: &EnexOptions) -> Result<Vec<Note>> {
        let deadline = Deadline::start(self.config.convert_timeout());
        let notes = repo::read_enex(&opts.input)?;
        deadline.check("load")?;

        finish("enex_to_json", &notes, opts.output.as_deref(), &deadline)?;
        Ok(notes)
    }

    /// Render the notes of an XML export as Rust values, one line per note
    /// or multi-line when `pretty` is set.
    pub fn inspect_enex(&self, input: &Path, pretty: bool) -> Result<String> {
        let deadline = Deadline::start(self.config.convert_timeout());
        let notes = repo::read_enex(input)?;
        deadline.check("load")?;

        let rendered: Vec<String> = notes
            .iter()
            .map(|n| if pretty { format!("{n:#?}") } else { format!("{n:?}") })
            .collect();
        debug!(
            { SUBSYSTEM } = "reconcile",
            { OPERATION } = "inspect_enex",
            { ITEM_COUNT } = notes.len(),
            { DURATION_MS } = deadline.elapsed().as_millis() as u64,
            "Inspected ENEX export"
        );
        Ok(rendered.join("\n"))
    }

    fn bucketed<S: LinkId, T: LinkId>(
        &self,
        op: &str,
        sources: &[S],
        targets: Vec<T>,
    ) -> Result<Vec<CrossRef<T>>> {
        if !self.verbose {
            return matcher::link_with(sources, targets, &FirstWins);
        }

        let policy = Reporting::new();
        let out = matcher::link_with(sources, targets, &policy as &dyn MatchPolicy)?;
        let report = policy.into_report();
        if !report.unmatched.is_empty() || !report.ambiguous.is_empty() {
            warn!(
                { SUBSYSTEM } = "reconcile",
                { OPERATION } = op,
                { UNMATCHED_COUNT } = report.unmatched.len(),
                { AMBIGUOUS_COUNT } = report.ambiguous.len(),
                "Some target records were dropped or matched ambiguously"
            );
            debug!(unmatched = ?report.unmatched, ambiguous = ?report.ambiguous, "Match report");
        }
        Ok(out)
    }
}

/// Output document size, for logging.
trait RecordCount {
    fn record_count(&self) -> usize;
}

impl<T> RecordCount for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl RecordCount for ItemList {
    fn record_count(&self) -> usize {
        self.items.len()
    }
}

fn finish<T>(op: &str, out: &T, output: Option<&Path>, deadline: &Deadline) -> Result<()>
where
    T: serde::Serialize + RecordCount,
{
    repo::write_json(out, output)?;
    let path = output.map_or_else(|| "-".to_string(), |p| p.display().to_string());
    info!(
        { SUBSYSTEM } = "reconcile",
        { OPERATION } = op,
        { ITEM_COUNT } = out.record_count(),
        { PATH } = %path,
        { DURATION_MS } = deadline.elapsed().as_millis() as u64,
        "Operation complete"
    );
    Ok(())
}
