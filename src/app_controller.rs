use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app_config::{ArticleOptions, Config, Selection, SynthesisEngine};
use crate::article::Article;
use crate::audio::{AudioAssembler, AudioProbe, AudioSegment, SegmentKind, chapters};
use crate::clips::{ClipDownloader, extract_clip_sources};
use crate::errors::AppError;
use crate::feed::{Episode, EpisodeCatalog, FeedBuilder};
use crate::sources::{ArticleSource, FreshRss, Wallabag};
use crate::synthesis::{NarrationSynthesizer, NarrationTarget, build_engine};
use crate::translation::Translator;

// @module: Batch controller for the episode assembly pipeline

/// Which service an article came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Wallabag,
    FreshRss,
}

/// One article queued for processing, with its resolved options
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// The article to narrate
    pub article: Article,

    /// Options after override resolution
    pub options: ArticleOptions,

    /// Originating service
    pub source: SourceKind,

    /// Episode title (may carry a `[Category]` prefix)
    pub title: String,

    /// Feed category label
    pub category: Option<String>,

    /// Feed item description
    pub description: String,
}

/// How one article's pipeline ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// Episode produced with every segment
    Success,

    /// Episode produced, but some clips were dropped
    PartialSuccess {
        /// Number of clips that failed to download
        dropped_clips: usize,
    },

    /// Article was skipped before the pipeline ran
    Skipped {
        /// Why the article was skipped
        reason: String,
    },

    /// Pipeline failed for this article
    Failed {
        /// Stage that failed
        stage: String,
        /// Failure description
        message: String,
    },
}

/// Per-article result line for the batch summary
#[derive(Debug, Clone)]
pub struct ArticleReport {
    /// Episode title
    pub title: String,

    /// Pipeline outcome
    pub outcome: ArticleOutcome,
}

/// Snapshot of a running or finished batch
#[derive(Debug, Clone, Default)]
pub struct BatchStatus {
    /// Articles queued for this batch
    pub total: usize,

    /// Articles fully handled so far
    pub processed: usize,

    /// Title currently being processed
    pub current: Option<String>,

    /// Per-article results, in processing order
    pub results: Vec<ArticleReport>,

    /// Whether the batch has ended
    pub finished: bool,
}

impl BatchStatus {
    /// Number of episodes produced (full or partial)
    pub fn produced(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    ArticleOutcome::Success | ArticleOutcome::PartialSuccess { .. }
                )
            })
            .count()
    }

    /// Number of failed articles
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ArticleOutcome::Failed { .. }))
            .count()
    }
}

/// Shared batch state: a single-writer running flag plus a status snapshot
///
/// The worker owning the guard is the only writer; any number of readers
/// may take snapshots while the batch runs.
#[derive(Debug, Default)]
pub struct BatchState {
    running: AtomicBool,
    status: RwLock<BatchStatus>,
}

impl BatchState {
    /// Create idle batch state
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the running flag, failing when a batch is already active
    pub fn try_begin(self: &Arc<Self>) -> Result<BatchGuard> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(anyhow!("A batch is already running"));
        }

        *self.status.write() = BatchStatus::default();
        Ok(BatchGuard {
            state: Arc::clone(self),
        })
    }

    /// Whether a batch is currently active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Copy of the current status
    pub fn snapshot(&self) -> BatchStatus {
        self.status.read().clone()
    }
}

/// Write handle for the active batch; releases the running flag on drop
pub struct BatchGuard {
    state: Arc<BatchState>,
}

impl BatchGuard {
    /// Record the number of queued articles
    pub fn set_total(&self, total: usize) {
        self.state.status.write().total = total;
    }

    /// Record the article now being processed
    pub fn start_article(&self, title: &str) {
        self.state.status.write().current = Some(title.to_string());
    }

    /// Record one article's outcome
    pub fn record(&self, title: &str, outcome: ArticleOutcome) {
        let mut status = self.state.status.write();
        status.results.push(ArticleReport {
            title: title.to_string(),
            outcome,
        });
        status.processed += 1;
        status.current = None;
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let mut status = self.state.status.write();
        status.finished = true;
        status.current = None;
        drop(status);
        self.state.running.store(false, Ordering::SeqCst);
    }
}

/// Main controller for the article-to-episode pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,

    /// Chunking translator with its selected back end
    translator: Translator,

    /// Narration front end with the default engine
    synthesizer: NarrationSynthesizer,

    /// Clip fetcher
    downloader: ClipDownloader,

    /// Segment concatenator
    assembler: AudioAssembler,

    /// Duration probe
    probe: AudioProbe,

    /// Shared batch state
    state: Arc<BatchState>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let translator = Translator::new(&config.translation)?;
        let synthesizer = NarrationSynthesizer::new(
            build_engine(&config.synthesis, &config.tools),
            config.output_dir.clone(),
            config.skip_existing,
        );

        Ok(Self::assemble_controller(config, translator, synthesizer))
    }

    /// Create a controller with explicit translator and synthesizer
    ///
    /// The seam tests use to avoid network and external tools.
    pub fn with_components(
        config: Config,
        translator: Translator,
        synthesizer: NarrationSynthesizer,
    ) -> Self {
        Self::assemble_controller(config, translator, synthesizer)
    }

    fn assemble_controller(
        config: Config,
        translator: Translator,
        synthesizer: NarrationSynthesizer,
    ) -> Self {
        let downloader = ClipDownloader::new(config.tools.ytdlp.clone());
        let assembler = AudioAssembler::new(config.tools.ffmpeg.clone());
        let probe = AudioProbe::new(config.tools.ffprobe.clone());

        Self {
            config,
            translator,
            synthesizer,
            downloader,
            assembler,
            probe,
            state: Arc::new(BatchState::new()),
        }
    }

    /// Shared batch state for status readers
    pub fn state(&self) -> Arc<BatchState> {
        Arc::clone(&self.state)
    }

    /// Feed builder bound to this controller's configuration
    pub fn feed_builder(&self) -> FeedBuilder {
        FeedBuilder::new(self.config.feed.clone(), self.config.output_dir.clone())
    }

    /// Build a synthesizer for a per-article engine override
    fn synthesizer_for(&self, engine: SynthesisEngine) -> NarrationSynthesizer {
        NarrationSynthesizer::new(
            build_engine(
                &crate::app_config::SynthesisConfig {
                    engine,
                    timeout_secs: self.config.synthesis.timeout_secs,
                },
                &self.config.tools,
            ),
            self.config.output_dir.clone(),
            self.config.skip_existing,
        )
    }

    /// Run one whole batch on a background worker
    ///
    /// Fails fast when a batch is already active; the returned handle
    /// resolves to the final status once the batch ends.
    pub fn spawn_batch(
        self: Arc<Self>,
        selection: Option<Selection>,
        generate_feed: bool,
    ) -> Result<tokio::task::JoinHandle<BatchStatus>> {
        let guard = self.state.try_begin()?;

        Ok(tokio::spawn(async move {
            self.run_batch(guard, selection, generate_feed).await
        }))
    }

    /// The batch worker body: collect, process sequentially, build feed
    async fn run_batch(
        &self,
        guard: BatchGuard,
        selection: Option<Selection>,
        generate_feed: bool,
    ) -> BatchStatus {
        let mut wallabag = self.config.wallabag.clone().map(Wallabag::new);
        let mut freshrss = self.config.freshrss.clone().map(FreshRss::new);

        let items = self
            .collect_items(wallabag.as_mut(), freshrss.as_mut(), selection.as_ref())
            .await;

        guard.set_total(items.len());
        info!("Processing {} article(s)", items.len());

        let progress = ProgressBar::new(items.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut catalog = EpisodeCatalog::new();

        for item in &items {
            guard.start_article(&item.title);
            progress.set_message(item.title.clone());

            if !item.article.has_content() {
                warn!("Skipping '{}': article has no content", item.title);
                guard.record(
                    &item.title,
                    ArticleOutcome::Skipped {
                        reason: "no content".to_string(),
                    },
                );
                progress.inc(1);
                continue;
            }

            match self.process_article(item).await {
                Ok((episode, dropped_clips)) => {
                    info!("Produced: {:?}", episode.path.file_name().unwrap_or_default());
                    catalog.add(episode);

                    self.mark_item_read(item, wallabag.as_mut(), freshrss.as_mut())
                        .await;

                    let outcome = if dropped_clips == 0 {
                        ArticleOutcome::Success
                    } else {
                        ArticleOutcome::PartialSuccess { dropped_clips }
                    };
                    guard.record(&item.title, outcome);
                }
                Err(e) => {
                    let stage = failing_stage(&e);
                    error!("Failed '{}' at {}: {}", item.title, stage, e);
                    guard.record(
                        &item.title,
                        ArticleOutcome::Failed {
                            stage: stage.to_string(),
                            message: e.to_string(),
                        },
                    );
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if generate_feed {
            if let Err(e) = self.write_feed(&catalog).await {
                error!("Feed generation failed: {}", e);
            }
        }

        let status = self.state.snapshot();
        info!(
            "Batch finished: {} produced, {} failed, {} total",
            status.produced(),
            status.failed(),
            status.total
        );
        for report in &status.results {
            match &report.outcome {
                ArticleOutcome::Success => debug!("  ok: {}", report.title),
                ArticleOutcome::PartialSuccess { dropped_clips } => {
                    info!("  partial ({} clip(s) dropped): {}", dropped_clips, report.title)
                }
                ArticleOutcome::Skipped { reason } => {
                    info!("  skipped ({}): {}", reason, report.title)
                }
                ArticleOutcome::Failed { stage, message } => {
                    info!("  failed at {}: {} ({})", stage, report.title, message)
                }
            }
        }

        drop(guard);
        self.state.snapshot()
    }

    /// Run the per-article pipeline
    ///
    /// Returns the produced episode and how many clips were dropped.
    pub async fn process_article(&self, item: &BatchItem) -> Result<(Episode, usize), AppError> {
        let synthesizer_override = item
            .options
            .engine
            .filter(|e| *e != self.config.synthesis.engine)
            .map(|e| self.synthesizer_for(e));
        let synthesizer = synthesizer_override.as_ref().unwrap_or(&self.synthesizer);

        crate::file_utils::FileManager::ensure_dir(&self.config.output_dir)
            .map_err(AppError::from)?;

        // Idempotence gate: an existing file satisfies the request outright
        let final_path = match synthesizer.resolve_target(&item.title) {
            NarrationTarget::Existing(path) => {
                let duration_ms = self.probe.duration_ms_or_estimate(&path).await;
                let episode = Episode::new(
                    item.title.clone(),
                    path,
                    duration_ms / 1000,
                    item.category.clone(),
                    Vec::new(),
                    item.description.clone(),
                );
                return Ok((episode, 0));
            }
            NarrationTarget::Fresh(path) => path,
        };

        let sources = if item.options.include_clips {
            extract_clip_sources(&item.article.raw_markup)
        } else {
            Vec::new()
        };
        if !sources.is_empty() {
            info!("Found {} embedded clip(s)", sources.len());
        }

        let text = self
            .translator
            .translate(
                &item.article.body,
                item.article.declared_language.as_deref(),
                &item.options.language,
            )
            .await;

        // Narration and clips live in a scoped working area; it is
        // discarded on every exit path, so a failed assembly never leaks
        // intermediate audio
        let workdir = tempfile::tempdir().map_err(AppError::from)?;
        let narration_path = workdir.path().join("narration.mp3");

        synthesizer
            .narrate_to(&text, &item.options.voice, &narration_path)
            .await
            .map_err(AppError::from)?;

        let mut segment_paths = vec![narration_path];
        let mut dropped_clips = 0usize;
        for source in &sources {
            match self.downloader.download(source, workdir.path()).await {
                Ok(path) => segment_paths.push(path),
                Err(e) => {
                    warn!("Dropping clip from '{}': {}", item.title, e);
                    dropped_clips += 1;
                }
            }
        }

        let mut segments = Vec::with_capacity(segment_paths.len());
        for (ordinal, path) in segment_paths.iter().enumerate() {
            let duration_ms = self.probe.duration_ms_or_estimate(path).await;
            let (kind, chapter_title) = if ordinal == 0 {
                (SegmentKind::Narration, item.title.clone())
            } else {
                (SegmentKind::ExternalClip, format!("Clip {}", ordinal))
            };
            segments.push(AudioSegment {
                kind,
                path: path.clone(),
                duration_ms,
                ordinal,
                title: chapter_title,
            });
        }

        self.assembler
            .assemble(&segment_paths, &final_path)
            .await
            .map_err(AppError::from)?;

        // Measure before tagging so the duration reflects the audio alone
        let total_ms = self.probe.duration_ms_or_estimate(&final_path).await;

        // Cosmetic step: a failed chapter table never unpublishes audio
        let (chapters, marked) = chapters::mark_episode(&final_path, &segments);
        if let Err(e) = marked {
            warn!("Chapter embedding failed for '{}': {}", item.title, e);
        }
        let chapters = if segments.len() > 1 { chapters } else { Vec::new() };
        let episode = Episode::new(
            item.title.clone(),
            final_path,
            total_ms / 1000,
            item.category.clone(),
            chapters,
            item.description.clone(),
        );

        Ok((episode, dropped_clips))
    }

    /// Write the feed, rebuilding from disk when nothing fresh exists
    async fn write_feed(&self, catalog: &EpisodeCatalog) -> Result<PathBuf, AppError> {
        let builder = self.feed_builder();

        if catalog.is_empty() {
            info!("No fresh episodes, rebuilding feed from existing files");
            let rebuilt =
                EpisodeCatalog::rebuild_from_dir(&self.config.output_dir, &self.probe).await?;
            return builder.write(&rebuilt).map_err(AppError::from);
        }

        builder.write(catalog).map_err(AppError::from)
    }

    /// Rebuild the feed purely from the audio files on disk
    pub async fn rebuild_feed(&self) -> Result<PathBuf, AppError> {
        let catalog =
            EpisodeCatalog::rebuild_from_dir(&self.config.output_dir, &self.probe).await?;
        self.feed_builder().write(&catalog).map_err(AppError::from)
    }

    async fn mark_item_read(
        &self,
        item: &BatchItem,
        wallabag: Option<&mut Wallabag>,
        freshrss: Option<&mut FreshRss>,
    ) {
        let result = match item.source {
            SourceKind::Wallabag => match wallabag {
                Some(client) => client.mark_read(&item.article.id).await,
                None => return,
            },
            SourceKind::FreshRss => match freshrss {
                Some(client) => client.mark_read(&item.article.id).await,
                None => return,
            },
        };

        if let Err(e) = result {
            warn!("Could not mark '{}' as read: {}", item.title, e);
        }
    }

    /// Gather the articles this batch should process
    ///
    /// Source errors are logged and shrink the batch; they never abort it.
    async fn collect_items(
        &self,
        wallabag: Option<&mut Wallabag>,
        freshrss: Option<&mut FreshRss>,
        selection: Option<&Selection>,
    ) -> Vec<BatchItem> {
        let mut items = Vec::new();
        let options = selection.map(|s| &s.options);

        if let Some(client) = wallabag {
            let limit = self.config.wallabag.as_ref().map(|c| c.limit).unwrap_or(10);
            match selection {
                Some(sel) => {
                    for picked in &sel.wallabag {
                        match client.get_article(&picked.id).await {
                            Ok(article) => items.push(self.wallabag_item(
                                article,
                                ArticleOptions::resolve(&self.config, options, Some(picked)),
                            )),
                            Err(e) => warn!("Wallabag article {} unavailable: {}", picked.id, e),
                        }
                    }
                }
                None => match client.get_articles(None, limit).await {
                    Ok(articles) => {
                        for article in articles {
                            items.push(self.wallabag_item(
                                article,
                                ArticleOptions::resolve(&self.config, options, None),
                            ));
                        }
                    }
                    Err(e) => warn!("Wallabag unavailable, skipping source: {}", e),
                },
            }
        }

        if let Some(client) = freshrss {
            match selection {
                Some(sel) => {
                    for picked in &sel.freshrss {
                        match client.get_article(&picked.id).await {
                            Ok(article) => {
                                let opts =
                                    ArticleOptions::resolve(&self.config, options, Some(picked));
                                items.push(self.freshrss_item(article, opts, None));
                            }
                            Err(e) => warn!("FreshRSS article {} unavailable: {}", picked.id, e),
                        }
                    }
                }
                None => {
                    items.extend(self.collect_freshrss_streams(client, options).await);
                }
            }
        }

        items
    }

    /// Fetch the configured FreshRSS categories/feeds, or the reading list
    async fn collect_freshrss_streams(
        &self,
        client: &mut FreshRss,
        options: Option<&crate::app_config::SelectionOptions>,
    ) -> Vec<BatchItem> {
        let Some(fr_config) = self.config.freshrss.clone() else {
            return Vec::new();
        };

        let mut items = Vec::new();

        if fr_config.categories.is_empty() && fr_config.feeds.is_empty() {
            match client.get_articles(Some("reading-list"), fr_config.limit).await {
                Ok(articles) => {
                    for article in articles {
                        let opts = ArticleOptions::resolve(&self.config, options, None);
                        items.push(self.freshrss_item(article, opts, None));
                    }
                }
                Err(e) => warn!("FreshRSS unavailable, skipping source: {}", e),
            }
            return items;
        }

        for category in &fr_config.categories {
            let stream = format!("user/-/label/{}", category.name);
            let limit = category.limit.unwrap_or(fr_config.limit);
            match client.get_articles(Some(&stream), limit).await {
                Ok(articles) => {
                    debug!("{} article(s) in category '{}'", articles.len(), category.name);
                    for article in articles {
                        let opts = ArticleOptions::resolve(&self.config, options, None);
                        items.push(self.freshrss_item(article, opts, Some(category.name.clone())));
                    }
                }
                Err(e) => warn!("Category '{}' unavailable: {}", category.name, e),
            }
        }

        for feed in &fr_config.feeds {
            let limit = feed.limit.unwrap_or(fr_config.limit);
            let label = feed.name.clone().unwrap_or_else(|| feed.id.clone());
            match client.get_articles(Some(&feed.id), limit).await {
                Ok(articles) => {
                    debug!("{} article(s) in feed '{}'", articles.len(), label);
                    for article in articles {
                        let opts = ArticleOptions::resolve(&self.config, options, None);
                        items.push(self.freshrss_item(article, opts, Some(label.clone())));
                    }
                }
                Err(e) => warn!("Feed '{}' unavailable: {}", label, e),
            }
        }

        items
    }

    fn wallabag_item(&self, article: Article, options: ArticleOptions) -> BatchItem {
        BatchItem {
            title: article.title.clone(),
            description: format!("{}: {}", "Wallabag", article.title),
            category: Some("Wallabag".to_string()),
            source: SourceKind::Wallabag,
            article,
            options,
        }
    }

    fn freshrss_item(
        &self,
        article: Article,
        options: ArticleOptions,
        category: Option<String>,
    ) -> BatchItem {
        let (title, feed_category) = match &category {
            Some(name) => (format!("[{}] {}", name, article.title), category.clone()),
            None => (article.title.clone(), Some("General".to_string())),
        };

        BatchItem {
            title,
            description: article.title.clone(),
            category: feed_category,
            source: SourceKind::FreshRss,
            article,
            options,
        }
    }
}

/// Map a pipeline error to the stage name used in failure reports
fn failing_stage(error: &AppError) -> &'static str {
    match error {
        AppError::Source(_) => "source",
        AppError::Provider(_) => "translation",
        AppError::Synthesis(_) => "synthesis",
        AppError::Clip(_) => "clip download",
        AppError::Assembly(_) => "assembly",
        AppError::Feed(_) => "feed",
        AppError::File(_) | AppError::Unknown(_) => "pipeline",
    }
}
