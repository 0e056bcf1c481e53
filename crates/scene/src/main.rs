//! Randomizer: draws a winner from a saved list and plays the scene headless.

use anyhow::{Context, Result};
use engine_core::{FramePacer, SimClock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use roster::{draw_winner, ListStore, MemoryStore, RonStore};
use scene::{AnimationStage, Scene, SceneConfig, StageEvent};

/// Host loop rate.
const TICK_HZ: f64 = 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SceneConfig::load();
    let mut store: Box<dyn ListStore> = match &config.store_path {
        Some(path) => Box::new(RonStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let list_id = find_or_create_list(store.as_mut(), &config)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let draw = draw_winner(store.as_mut(), &list_id, &mut rng)?
        .with_context(|| format!("list {:?} has no participants", config.list_name))?;
    for flash in &draw.flashes {
        match flash.hold {
            Some(hold) => {
                log::debug!("  {}", flash.name);
                std::thread::sleep(hold);
            }
            None => log::info!("Winner: {}", flash.name),
        }
    }
    if draw.was_reset {
        log::info!("All participants had reached the limit; counters were reset");
    }

    let mut scene = Scene::new(&config);
    scene.set_roster(&draw.list.names());
    scene.set_winner(Some(draw.winner.clone()));
    scene.start();

    let mut clock = SimClock::new();
    let mut pacer = FramePacer::new(TICK_HZ);
    for _ in 0..config.max_ticks {
        pacer.wait();
        clock.step();
        for event in scene.tick(clock.elapsed_seconds()) {
            if let StageEvent::AnimationComplete = event {
                log::info!("{} celebrates at t={:.2}s", draw.winner, clock.elapsed_seconds());
            }
        }
        if clock.frame_count() % 60 == 0 && scene.state().stage() >= AnimationStage::AfterAttack {
            let frame = scene.frame();
            log::info!(
                "t={:.1}s stage={} sparks={} splatter={} explosion budget {}/{}",
                clock.elapsed_seconds(),
                scene.state().stage(),
                frame.spark_count(),
                frame.splatter.len(),
                scene.budgets().explosion.active(),
                scene.budgets().explosion.cap()
            );
        }
    }

    scene.stop();
    log::info!("Done after {} ticks", clock.frame_count());
    Ok(())
}

/// Id of the list named in the config, saving it from the configured
/// participants on first run.
fn find_or_create_list(store: &mut dyn ListStore, config: &SceneConfig) -> Result<String> {
    let existing = store
        .lists()
        .context("could not read saved lists")?
        .into_iter()
        .find(|l| l.name == config.list_name);
    if let Some(list) = existing {
        log::info!("Using list {:?} ({} participants)", list.name, list.participants.len());
        return Ok(list.id);
    }
    let id = store
        .save(&config.list_name, &config.participants)
        .context("could not save participant list")?;
    log::info!("Created list {:?} with {} participants", config.list_name, config.participants.len());
    Ok(id)
}
