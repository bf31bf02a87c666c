//! Phase sequencing for one run.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::{
    config::Config,
    coordinator::{Coordinator, Packwiz},
    digest::DigestEngine,
    pack::PackRepository,
    reconcile::Reconciler,
    runtime::Runtime,
};

/// Run every selected mode in order: CurseForge detect, CurseForge URL
/// cache, Modrinth detect, Modrinth merge. Each phase sees what the
/// previous one left on disk.
#[tracing::instrument(skip(config))]
pub async fn run<R: Runtime + 'static>(config: Config<R>) -> Result<()> {
    let options = &config.options;
    let runtime = config.runtime.as_ref();

    let repo = PackRepository::new(runtime, &options.pack_file);
    let descriptor = repo.load_descriptor()?;
    info!(
        "Pack {} ({}, minecraft {})",
        descriptor.name, descriptor.pack_format, descriptor.versions.minecraft
    );

    let tool = Packwiz::new(runtime, &options.packwiz, repo.root(), repo.pack_file());
    let engine = DigestEngine::new(Arc::clone(&config.runtime), options.min_size, options.jobs);
    let coordinator = Coordinator::new(&repo, &tool, config.materialize());
    let reconciler = Reconciler::new(&repo, &engine, &coordinator);

    coordinator.refresh()?;

    if let Some(curseforge) = &config.curseforge {
        if options.cf_detect {
            let converted = reconciler.detect_curseforge(curseforge).await?;
            info!("Converted {} files to CurseForge metadata", converted);
        }
        if options.cf_url {
            let cached = reconciler.cache_urls(curseforge).await?;
            info!("Cached {} download URLs", cached);
        }
    }

    if let Some(modrinth) = &config.modrinth {
        if options.mr_detect {
            let converted = reconciler.detect_modrinth(modrinth).await?;
            info!("Converted {} files to Modrinth metadata", converted);
        }
        if options.mr_merge {
            let linked = reconciler.merge_modrinth(modrinth).await?;
            info!("Linked {} records to Modrinth", linked);
        }
    }

    Ok(())
}
