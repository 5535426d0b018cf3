//! Replays a recorded scene and update stream against the headless backend
//! and reports what was allocated.
//!
//! Run with: cargo run --bin plot-replay -- scene.json [updates.jsonl]
//!
//! Optional flags: `--config session.json`, `--atlas atlas.json` (a flat
//! JSON array of floats). `RUST_LOG` controls log output.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    use anyhow::{Context, bail};
    use log::{info, warn};
    use plot_sync::{
        HeadlessBackend, SceneDesc, Screen, Session, SessionConfig, Update, channel, drive,
        logging::{LoggingConfig, init_logging},
    };

    init_logging(LoggingConfig {
        env_filter: std::env::var("RUST_LOG").ok().or(Some("info".to_string())),
        is_test: false,
    });

    let mut positional = Vec::new();
    let mut config_path = None;
    let mut atlas_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(args.next().context("--config needs a path")?),
            "--atlas" => atlas_path = Some(args.next().context("--atlas needs a path")?),
            _ => positional.push(arg),
        }
    }
    let Some(scene_path) = positional.first() else {
        bail!("usage: plot-replay <scene.json> [updates.jsonl] [--config file] [--atlas file]");
    };

    let config = match config_path {
        Some(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path))?;
            SessionConfig::from_json(&json).with_context(|| format!("parsing {}", path))?
        }
        None => SessionConfig::default(),
    };
    let mut session = Session::new(HeadlessBackend::new(), config);

    if let Some(path) = atlas_path {
        let json = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path))?;
        let atlas: Vec<f32> = serde_json::from_str(&json).with_context(|| format!("parsing {}", path))?;
        info!("texture atlas with {} values", atlas.len());
        session.set_texture_atlas(atlas);
    }

    let json = tokio::fs::read_to_string(scene_path)
        .await
        .with_context(|| format!("reading {}", scene_path))?;
    let desc: SceneDesc = serde_json::from_str(&json).with_context(|| format!("parsing {}", scene_path))?;
    let root = session.deserialize_scene(&desc, Screen::default())?;
    session.flush();
    info!(
        "scene {} built: {} scenes, {} plots",
        root,
        session.registry().scene_count(),
        session.registry().plot_count()
    );

    let (tx, rx) = channel();
    if let Some(path) = positional.get(1) {
        let updates = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path))?;
        for (number, line) in updates.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Update>(line) {
                Ok(update) => tx.send(update)?,
                Err(e) => warn!("{}:{}: skipping malformed update: {}", path, number + 1, e),
            }
        }
    }
    drop(tx);

    let summary = drive(&mut session, rx).await;
    let backend = session.backend();
    println!(
        "updates: {} applied, {} rejected, {} uploads",
        summary.applied, summary.rejected, summary.uploads
    );
    println!(
        "live: {} geometries, {} textures, {} materials",
        backend.live_geometries(),
        backend.live_textures(),
        backend.live_materials()
    );
    println!("{:#?}", backend.stats());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
