//! Upload orchestrator
//!
//! Walks a local path, creates or reuses remote folders, dispatches file
//! transfers serially or through a bounded worker pool, and aggregates
//! per-item outcomes. Failures stay scoped: a bad file never aborts its
//! siblings, a failed folder creation only fails its own subtree.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::cli::progress::{format_bytes, ProgressDisplay};
use crate::remote::RemoteStore;
use crate::upload::classify;
use crate::upload::dedup::DedupOracle;
use crate::upload::filter::PatternFilter;
use crate::upload::ledger::{ItemOutcome, ProgressLedger};
use crate::upload::retry::{with_backoff, BASE_DELAY, MAX_ATTEMPTS};

/// Size of the shared upload worker pool
pub const DEFAULT_POOL_SIZE: usize = 3;

/// Options for one upload invocation
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Skip files and folders that already exist under the same parent
    pub skip_existing: bool,
    /// Dispatch sibling files through the worker pool
    pub parallel: bool,
    /// Include glob patterns; empty means "match everything"
    pub include: Vec<String>,
    /// Exclude glob patterns
    pub exclude: Vec<String>,
    /// Compute the plan without performing any remote calls
    pub dry_run: bool,
    /// Consult and update the progress ledger
    pub resume: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
            parallel: false,
            include: Vec::new(),
            exclude: Vec::new(),
            dry_run: false,
            resume: true,
        }
    }
}

/// Aggregated outcome of one upload invocation
///
/// Paths appear in discovery order; a path occurs in exactly one list.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub success: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// Set when a user interrupt stopped the walk before completion
    pub interrupted: bool,
}

impl UploadReport {
    fn push(&mut self, path: PathBuf, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Success => self.success.push(path),
            ItemOutcome::Skipped => self.skipped.push(path),
            ItemOutcome::Failed => self.failed.push(path),
        }
    }

    /// Total number of recorded item outcomes
    pub fn total(&self) -> usize {
        self.success.len() + self.skipped.len() + self.failed.len()
    }

    /// Whether the run finished with no failures
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }
}

/// Recursive uploader over a remote store
pub struct Uploader {
    store: Arc<dyn RemoteStore>,
    oracle: DedupOracle,
    options: UploadOptions,
    filter: PatternFilter,
    ledger: Mutex<ProgressLedger>,
    pool: Arc<Semaphore>,
    interrupt: Arc<AtomicBool>,
    max_attempts: u32,
    base_delay: Duration,
}

impl Uploader {
    /// Create an uploader
    ///
    /// Fails when an include/exclude pattern does not compile.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        options: UploadOptions,
        ledger: ProgressLedger,
        interrupt: Arc<AtomicBool>,
    ) -> Result<Self> {
        let filter = PatternFilter::new(&options.include, &options.exclude)?;
        Ok(Self {
            oracle: DedupOracle::new(store.clone()),
            store,
            options,
            filter,
            ledger: Mutex::new(ledger),
            pool: Arc::new(Semaphore::new(DEFAULT_POOL_SIZE)),
            interrupt,
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.base_delay = base_delay;
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Upload a file or directory tree under a remote parent folder
    pub async fn upload(self: &Arc<Self>, local_path: &Path, parent_id: &str) -> UploadReport {
        let mut report = UploadReport::default();

        if !local_path.exists() {
            error!("Path does not exist: {}", local_path.display());
            report.failed.push(local_path.to_path_buf());
            return report;
        }

        let stats = classify::scan(local_path);
        info!(
            "Total items to upload: {} files, {} folders ({})",
            stats.files,
            stats.folders,
            format_bytes(stats.total_size)
        );

        if self.interrupted() {
            report.interrupted = true;
            return report;
        }

        if local_path.is_file() {
            let (path, outcome) = self.process_file(local_path.to_path_buf(), parent_id.to_string()).await;
            report.push(path, outcome);
        } else {
            self.process_tree(local_path, parent_id, &mut report).await;
        }

        if report.interrupted {
            warn!("Upload interrupted; progress ledger retains completed items");
        } else if self.options.resume && !self.options.dry_run && report.failed.is_empty() {
            // Full success: the ledger has served its purpose
            let mut ledger = self.ledger.lock().await;
            if let Err(e) = ledger.clear() {
                warn!("Could not clear progress ledger: {}", e);
            }
        }

        report
    }

    /// Walk the directory tree with an explicit work queue
    ///
    /// Depth-first preorder: a directory's files are dispatched before its
    /// subdirectories are visited.
    async fn process_tree(self: &Arc<Self>, root: &Path, parent_id: &str, report: &mut UploadReport) {
        let mut queue: VecDeque<(PathBuf, String)> = VecDeque::new();
        queue.push_back((root.to_path_buf(), parent_id.to_string()));

        while let Some((dir, parent)) = queue.pop_front() {
            if self.interrupted() {
                report.interrupted = true;
                break;
            }

            let folder_id = match self.ensure_folder(&dir, &parent).await {
                Some(id) => id,
                None => {
                    self.fail_subtree(&dir, report).await;
                    continue;
                }
            };

            let children = match classify::list_children(&dir) {
                Ok(children) => children,
                Err(e) => {
                    warn!("Cannot list directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            let mut files = Vec::new();
            let mut dirs = Vec::new();
            for child in children {
                if child.is_dir() {
                    dirs.push(child);
                } else {
                    files.push(child);
                }
            }

            let outcomes = if self.options.parallel {
                self.process_files_parallel(files, &folder_id).await
            } else {
                self.process_files_serial(files, &folder_id).await
            };
            for (path, outcome) in outcomes {
                report.push(path, outcome);
            }

            if self.interrupted() {
                report.interrupted = true;
                break;
            }

            for child_dir in dirs.into_iter().rev() {
                queue.push_front((child_dir, folder_id.clone()));
            }
        }
    }

    /// Resolve or create the remote folder mirroring a local directory
    async fn ensure_folder(&self, dir: &Path, parent_id: &str) -> Option<String> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        if self.options.dry_run {
            return Some(format!("dry-run:{}", name));
        }

        if self.options.skip_existing {
            if let Some(id) = self.oracle.find_folder(&name, parent_id).await {
                info!("Folder '{}' already exists (id: {})", name, id);
                return Some(id);
            }
        }

        match self.store.create_folder(&name, parent_id).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Failed to create folder '{}': {}", name, e);
                None
            }
        }
    }

    /// Mark every file beneath an unreachable directory as failed
    async fn fail_subtree(&self, dir: &Path, report: &mut UploadReport) {
        let files = classify::files_under(dir);
        warn!("Marking {} files under {} as failed", files.len(), dir.display());
        for file in files {
            self.record_outcome(&file, ItemOutcome::Failed).await;
            report.push(file, ItemOutcome::Failed);
        }
    }

    async fn process_files_serial(
        self: &Arc<Self>,
        files: Vec<PathBuf>,
        parent_id: &str,
    ) -> Vec<(PathBuf, ItemOutcome)> {
        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            if self.interrupted() {
                break;
            }
            outcomes.push(self.process_file(path, parent_id.to_string()).await);
        }
        outcomes
    }

    /// Fan sibling files out through the shared worker pool
    ///
    /// Each worker owns its indexed outcome slot; slots are merged in
    /// discovery order once every sibling has joined. The semaphore is
    /// process-wide, so deep trees cannot multiply concurrency.
    async fn process_files_parallel(
        self: &Arc<Self>,
        files: Vec<PathBuf>,
        parent_id: &str,
    ) -> Vec<(PathBuf, ItemOutcome)> {
        let mut slots: Vec<Option<(PathBuf, ItemOutcome)>> = Vec::new();
        slots.resize_with(files.len(), || None);

        let mut workers: JoinSet<(usize, (PathBuf, ItemOutcome))> = JoinSet::new();
        for (index, path) in files.into_iter().enumerate() {
            if self.interrupted() {
                break;
            }
            let Ok(permit) = self.pool.clone().acquire_owned().await else {
                break;
            };
            let uploader = Arc::clone(self);
            let parent = parent_id.to_string();
            workers.spawn(async move {
                let _permit = permit;
                let outcome = uploader.process_file(path, parent).await;
                (index, outcome)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Upload worker failed: {}", e),
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Carry one file to a terminal outcome
    async fn process_file(self: &Arc<Self>, path: PathBuf, parent_id: String) -> (PathBuf, ItemOutcome) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        if !self.filter.matches(&name) {
            debug!("'{}' excluded by filters", name);
            return (path, ItemOutcome::Skipped);
        }

        if self.options.dry_run {
            info!("[dry run] would upload '{}'", name);
            return (path, ItemOutcome::Success);
        }

        if self.options.resume && self.ledger.lock().await.is_done(&path) {
            info!("'{}' already completed in a previous run", name);
            return (path, ItemOutcome::Skipped);
        }

        if self.options.skip_existing {
            if let Some(existing) = self.oracle.find_file(&name, &parent_id).await {
                info!("Skipping '{}', already exists in Drive (id: {})", name, existing.id);
                self.record_outcome(&path, ItemOutcome::Skipped).await;
                return (path, ItemOutcome::Skipped);
            }
        }

        let size = path.metadata().map(|m| m.len()).unwrap_or(0);
        let parallel = self.options.parallel;
        let progress: Arc<dyn Fn(u64) + Send + Sync> = {
            let name = name.clone();
            Arc::new(move |done: u64| {
                debug!("'{}': {} / {} bytes uploaded", name, done, size);
                if !parallel {
                    let _ = ProgressDisplay::new(false).update_upload(&name, done, size);
                }
            })
        };

        let result = with_backoff(self.max_attempts, self.base_delay, {
            let store = self.store.clone();
            let path = path.clone();
            let parent_id = parent_id.clone();
            let progress = progress.clone();
            move |_| {
                let store = store.clone();
                let path = path.clone();
                let parent = parent_id.clone();
                let progress = progress.clone();
                async move { store.upload_file(&path, &parent, &*progress).await }
            }
        })
        .await;

        let _ = ProgressDisplay::new(parallel).finish_line();

        match result {
            Ok(id) => {
                info!("Successfully uploaded '{}' (id: {})", name, id);
                self.record_outcome(&path, ItemOutcome::Success).await;
                (path, ItemOutcome::Success)
            }
            Err(e) => {
                error!("Failed to upload '{}': {}", name, e);
                self.record_outcome(&path, ItemOutcome::Failed).await;
                (path, ItemOutcome::Failed)
            }
        }
    }

    /// Persist a terminal outcome to the ledger when resume is active
    async fn record_outcome(&self, path: &Path, outcome: ItemOutcome) {
        if !self.options.resume || self.options.dry_run {
            return;
        }
        let mut ledger = self.ledger.lock().await;
        ledger.record(path, outcome);
        if let Err(e) = ledger.save() {
            warn!("Could not persist progress ledger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ProgressFn, RemoteFile};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct StoreState {
        folders: HashMap<(String, String), String>,
        files: HashMap<(String, String), String>,
        lookups: Vec<String>,
        creates: Vec<String>,
        uploads: Vec<String>,
        fail_folders: HashSet<String>,
        fail_uploads: HashSet<String>,
        flaky_uploads: HashMap<String, u32>,
        next_id: u64,
    }

    #[derive(Default)]
    struct MockStore {
        state: StdMutex<StoreState>,
    }

    impl MockStore {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn seed_folder(&self, parent: &str, name: &str, id: &str) {
            let mut state = self.state.lock().unwrap();
            state.folders.insert((parent.to_string(), name.to_string()), id.to_string());
        }

        fn seed_file(&self, parent: &str, name: &str, id: &str) {
            let mut state = self.state.lock().unwrap();
            state.files.insert((parent.to_string(), name.to_string()), id.to_string());
        }

        fn fail_folder(&self, name: &str) {
            self.state.lock().unwrap().fail_folders.insert(name.to_string());
        }

        fn fail_upload(&self, name: &str) {
            self.state.lock().unwrap().fail_uploads.insert(name.to_string());
        }

        fn flaky_upload(&self, name: &str, failures: u32) {
            self.state.lock().unwrap().flaky_uploads.insert(name.to_string(), failures);
        }

        fn remote_calls(&self) -> usize {
            let state = self.state.lock().unwrap();
            state.lookups.len() + state.creates.len() + state.uploads.len()
        }

        fn upload_count(&self, name: &str) -> usize {
            self.state.lock().unwrap().uploads.iter().filter(|n| n.as_str() == name).count()
        }

        fn touched(&self, name: &str) -> bool {
            let state = self.state.lock().unwrap();
            state.lookups.iter().chain(state.uploads.iter()).any(|n| n == name)
        }

        fn create_count(&self) -> usize {
            self.state.lock().unwrap().creates.len()
        }

        fn total_upload_count(&self) -> usize {
            self.state.lock().unwrap().uploads.len()
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[async_trait]
    impl RemoteStore for MockStore {
        async fn find_file(&self, name: &str, parent_id: &str) -> anyhow::Result<Option<RemoteFile>> {
            let mut state = self.state.lock().unwrap();
            state.lookups.push(name.to_string());
            Ok(state
                .files
                .get(&(parent_id.to_string(), name.to_string()))
                .map(|id| RemoteFile {
                    id: id.clone(),
                    name: name.to_string(),
                    size: None,
                    mime_type: "application/octet-stream".to_string(),
                }))
        }

        async fn find_folder(&self, name: &str, parent_id: &str) -> anyhow::Result<Option<String>> {
            let mut state = self.state.lock().unwrap();
            state.lookups.push(name.to_string());
            Ok(state.folders.get(&(parent_id.to_string(), name.to_string())).cloned())
        }

        async fn create_folder(&self, name: &str, parent_id: &str) -> anyhow::Result<String> {
            let mut state = self.state.lock().unwrap();
            state.creates.push(name.to_string());
            if state.fail_folders.contains(name) {
                anyhow::bail!("folder quota exceeded");
            }
            state.next_id += 1;
            let id = format!("folder-{}", state.next_id);
            state.folders.insert((parent_id.to_string(), name.to_string()), id.clone());
            Ok(id)
        }

        async fn upload_file(&self, path: &Path, parent_id: &str, progress: ProgressFn<'_>) -> anyhow::Result<String> {
            let name = file_name(path);
            let size = path.metadata().map(|m| m.len()).unwrap_or(0);
            {
                let mut state = self.state.lock().unwrap();
                state.uploads.push(name.clone());
                if state.fail_uploads.contains(&name) {
                    anyhow::bail!("upload rejected");
                }
                if let Some(remaining) = state.flaky_uploads.get_mut(&name) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        anyhow::bail!("transient upload failure");
                    }
                }
            }
            progress(size);
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("file-{}", state.next_id);
            state.files.insert((parent_id.to_string(), name), id.clone());
            Ok(id)
        }
    }

    fn temp_tree(name: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let root = std::env::temp_dir().join(format!("relay_upload_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        for (rel, contents) in files {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, contents).unwrap();
        }
        root
    }

    fn make_uploader(store: Arc<MockStore>, options: UploadOptions, name: &str) -> Arc<Uploader> {
        let ledger_path = std::env::temp_dir().join(format!("relay_upl_ledger_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_file(&ledger_path);
        let ledger = ProgressLedger::open(ledger_path);
        let interrupt = Arc::new(AtomicBool::new(false));
        Arc::new(
            Uploader::new(store, options, ledger, interrupt)
                .unwrap()
                .with_retry(3, Duration::from_millis(1)),
        )
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| file_name(p)).collect()
    }

    #[tokio::test]
    async fn test_skip_existing_scenario() {
        let root = temp_tree("skip_existing", &[("a.txt", b"aaa"), ("b.txt", b"bbb")]);
        let root_name = file_name(&root);

        let store = MockStore::new();
        store.seed_folder("drive-root", &root_name, "folder-root");
        store.seed_file("folder-root", "a.txt", "file-a");

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "skip_existing");
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(names(&report.success), vec!["b.txt"]);
        assert_eq!(names(&report.skipped), vec!["a.txt"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.upload_count("a.txt"), 0);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_counts_match_classifier_with_failed_subtree() {
        let root = temp_tree(
            "counts",
            &[
                ("a.txt", b"a"),
                ("bad/x.txt", b"x"),
                ("bad/y.txt", b"y"),
                ("good/z.txt", b"z"),
            ],
        );
        let store = MockStore::new();
        store.fail_folder("bad");

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "counts");
        let report = uploader.upload(&root, "drive-root").await;
        let stats = classify::scan(&root);

        assert_eq!(report.total() as u64, stats.files);
        assert_eq!(names(&report.success), vec!["a.txt", "z.txt"]);
        assert_eq!(names(&report.failed), vec!["x.txt", "y.txt"]);
        assert!(report.skipped.is_empty());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let root = temp_tree("idempotent", &[("a.txt", b"a"), ("sub/b.txt", b"b")]);
        let store = MockStore::new();

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "idempotent");
        let first = uploader.upload(&root, "drive-root").await;
        assert_eq!(first.success.len(), 2);

        let uploads_after_first = store.total_upload_count();
        let creates_after_first = store.create_count();

        let second = uploader.upload(&root, "drive-root").await;
        assert_eq!(second.skipped.len(), 2);
        assert!(second.success.is_empty());
        // No new remote objects on the second run
        assert_eq!(store.total_upload_count(), uploads_after_first);
        assert_eq!(store.create_count(), creates_after_first);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_performs_no_remote_calls() {
        let root = temp_tree("dry_run", &[("a.txt", b"a"), ("sub/b.mp4", b"b"), ("sub/c.tmp", b"c")]);
        let store = MockStore::new();

        let options = UploadOptions {
            dry_run: true,
            exclude: vec!["*.tmp".to_string()],
            ..Default::default()
        };
        let uploader = make_uploader(store.clone(), options, "dry_run");
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(store.remote_calls(), 0);
        assert_eq!(report.success.len(), 2);
        assert_eq!(names(&report.skipped), vec!["c.tmp"]);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_include_filter_keeps_excluded_files_offline() {
        let root = temp_tree("include", &[("movie.mp4", b"m"), ("notes.txt", b"n")]);
        let store = MockStore::new();

        let options = UploadOptions {
            include: vec!["*.mp4".to_string()],
            ..Default::default()
        };
        let uploader = make_uploader(store.clone(), options, "include");
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(names(&report.success), vec!["movie.mp4"]);
        assert_eq!(names(&report.skipped), vec!["notes.txt"]);
        // The excluded file never contacts the remote service
        assert!(!store.touched("notes.txt"));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_file_failure_does_not_abort_siblings() {
        let root = temp_tree("per_file", &[("a.txt", b"a"), ("bad.txt", b"b"), ("c.txt", b"c")]);
        let store = MockStore::new();
        store.fail_upload("bad.txt");

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "per_file");
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(names(&report.success), vec!["a.txt", "c.txt"]);
        assert_eq!(names(&report.failed), vec!["bad.txt"]);
        // Retried up to the bound before surfacing the failure
        assert_eq!(store.upload_count("bad.txt"), 3);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_within_retry_bound() {
        let root = temp_tree("flaky", &[("flaky.txt", b"f")]);
        let store = MockStore::new();
        store.flaky_upload("flaky.txt", 2);

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "flaky");
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(names(&report.success), vec!["flaky.txt"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.upload_count("flaky.txt"), 3);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_parallel_matches_serial_membership() {
        let files: Vec<(String, Vec<u8>)> = (0..8)
            .map(|i| (format!("f{}.txt", i), vec![b'x'; i + 1]))
            .collect();
        let file_refs: Vec<(&str, &[u8])> =
            files.iter().map(|(n, c)| (n.as_str(), c.as_slice())).collect();
        let root = temp_tree("parallel", &file_refs);

        let store = MockStore::new();
        let options = UploadOptions { parallel: true, ..Default::default() };
        let uploader = make_uploader(store.clone(), options, "parallel");
        let report = uploader.upload(&root, "drive-root").await;

        // Outcome slots preserve discovery order despite concurrent workers
        assert_eq!(
            names(&report.success),
            (0..8).map(|i| format!("f{}.txt", i)).collect::<Vec<_>>()
        );
        assert!(report.failed.is_empty());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_resume_converts_ledger_success_to_skip() {
        let root = temp_tree("resume", &[("done.txt", b"d"), ("new.txt", b"n")]);
        let store = MockStore::new();

        let ledger_path = std::env::temp_dir().join(format!("relay_upl_ledger_resume_{}", std::process::id()));
        let _ = std::fs::remove_file(&ledger_path);
        let mut ledger = ProgressLedger::open(&ledger_path);
        ledger.record(&root.join("done.txt"), ItemOutcome::Success);
        ledger.save().unwrap();

        let uploader = Arc::new(
            Uploader::new(
                store.clone(),
                UploadOptions::default(),
                ProgressLedger::open(&ledger_path),
                Arc::new(AtomicBool::new(false)),
            )
            .unwrap()
            .with_retry(3, Duration::from_millis(1)),
        );
        let report = uploader.upload(&root, "drive-root").await;

        assert_eq!(names(&report.success), vec!["new.txt"]);
        assert_eq!(names(&report.skipped), vec!["done.txt"]);
        // The ledger hit skips the dedup lookup and the transfer entirely
        assert!(!store.touched("done.txt"));

        let _ = std::fs::remove_file(&ledger_path);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_missing_path_is_single_failure() {
        let store = MockStore::new();
        let uploader = make_uploader(store.clone(), UploadOptions::default(), "missing");

        let missing = PathBuf::from("/nonexistent/relay/upload");
        let report = uploader.upload(&missing, "drive-root").await;

        assert_eq!(report.failed, vec![missing]);
        assert_eq!(store.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_stops_dispatch() {
        let root = temp_tree("interrupt", &[("a.txt", b"a"), ("b.txt", b"b")]);
        let store = MockStore::new();

        let ledger_path = std::env::temp_dir().join(format!("relay_upl_ledger_int_{}", std::process::id()));
        let _ = std::fs::remove_file(&ledger_path);
        let uploader = Arc::new(
            Uploader::new(
                store.clone(),
                UploadOptions::default(),
                ProgressLedger::open(&ledger_path),
                Arc::new(AtomicBool::new(true)),
            )
            .unwrap(),
        );
        let report = uploader.upload(&root, "drive-root").await;

        assert!(report.interrupted);
        assert_eq!(report.total(), 0);
        assert_eq!(store.remote_calls(), 0);

        let _ = std::fs::remove_file(&ledger_path);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_single_file_upload() {
        let root = temp_tree("single", &[("only.txt", b"only")]);
        let store = MockStore::new();

        let uploader = make_uploader(store.clone(), UploadOptions::default(), "single");
        let report = uploader.upload(&root.join("only.txt"), "drive-root").await;

        assert_eq!(names(&report.success), vec!["only.txt"]);
        // A single file creates no folders
        assert_eq!(store.create_count(), 0);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
