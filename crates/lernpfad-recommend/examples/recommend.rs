use lernpfad_core::{ActivityId, RecommendationCandidate, TargetId};
use lernpfad_presence::MemoryMuseum;
use lernpfad_recommend::PathRecommender;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct RecommendationRecord {
    current: TargetId,
    activity: ActivityId,
    gamma: f64,
    candidates: Vec<RecommendationCandidate>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(current), Some(activity)) = (args.next(), args.next(), args.next())
    else {
        return Err("usage: recommend <museum.json> <current-target> <activity>".into());
    };
    let path = PathBuf::from(path);
    let current = TargetId(current.parse()?);
    let activity = ActivityId(activity.parse()?);

    let museum = MemoryMuseum::load(&path)?
        .ok_or_else(|| format!("museum snapshot not found: {}", path.display()))?;
    let engine = PathRecommender::new(&museum, &museum, &museum);

    let theme = museum.activity(activity)?.theme;
    let record = RecommendationRecord {
        current,
        activity,
        gamma: engine.normalization_parameter(theme)?,
        candidates: engine.recommend(current, activity)?,
    };

    serde_json::to_writer_pretty(std::io::stdout(), &record)?;
    println!();

    Ok(())
}
