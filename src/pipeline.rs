use crate::{
    backlinks::{BacklinkInjector, InjectStats},
    config::LinkConfig,
    db::LinkStore,
    error::NotelinksError,
    extract::{ExtractStats, LinkExtractor},
    paths::{DiskOracle, PathOracle},
    title::{FrontmatterTitles, TitleResolver},
};

/// Results of a full extract-then-inject run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub extract: ExtractStats,
    pub inject: InjectStats,
}

fn check_dirs(config: &LinkConfig) -> Result<(), NotelinksError> {
    if !config.notes_dir.is_dir() {
        tracing::error!(
            "The notes dir {:?} does not exist. Exiting",
            config.notes_dir
        );
        return Err(NotelinksError::NotFound(format!(
            "The notes dir {} does not exist",
            config.notes_dir.display()
        )));
    }
    let export_root = config.export_root();
    if !export_root.is_dir() {
        tracing::error!(
            "The export root {:?} does not exist. Exiting",
            export_root
        );
        return Err(NotelinksError::NotFound(format!(
            "The export root {} does not exist",
            export_root.display()
        )));
    }
    tracing::info!("The notes dir is {:?}", config.notes_dir);
    Ok(())
}

/// Rebuilds the link graph in `store` and rewrites the backlinks section of every referenced
/// note. The store is cleared first; extraction finishes before injection starts.
pub async fn run_with<O, T>(
    config: &LinkConfig,
    store: &LinkStore,
    oracle: O,
    titles: T,
) -> Result<RunStats, NotelinksError>
where
    O: PathOracle,
    T: TitleResolver,
{
    check_dirs(config)?;
    rebuild(config, store, oracle, titles).await
}

async fn rebuild<O, T>(
    config: &LinkConfig,
    store: &LinkStore,
    oracle: O,
    titles: T,
) -> Result<RunStats, NotelinksError>
where
    O: PathOracle,
    T: TitleResolver,
{
    store.reset().await?;

    let extractor = LinkExtractor::new(config, oracle, titles);
    let extract = extractor.extract_all(store).await?;

    let injector = BacklinkInjector::new(config);
    let inject = injector.inject_all(store).await?;

    Ok(RunStats { extract, inject })
}

/// [`run_with`] against the real filesystem, front matter titles, and the sqlite file named in
/// `config.db_path`.
pub async fn run(config: &LinkConfig) -> Result<RunStats, NotelinksError> {
    check_dirs(config)?;
    let store = LinkStore::open(&config.db_path).await?;
    let stats = rebuild(config, &store, DiskOracle, FrontmatterTitles).await;
    store.close().await;
    stats
}

/// Runs [`run`] to completion on a current-thread runtime.
pub fn run_blocking(config: &LinkConfig) -> Result<RunStats, NotelinksError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}
