use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fertilizer_core::domain::contract::RecommendationRequest;
use fertilizer_core::reference::CropTable;

#[derive(Debug, Parser)]
#[command(name = "fertilizer_cli")]
struct Args {
    /// Crop name, matched case-insensitively against the reference table.
    #[arg(long)]
    crop: String,

    /// Growing season: Kharif, Rabi or Zaid.
    #[arg(long)]
    season: String,

    /// Current soil nitrogen.
    #[arg(short = 'n', long = "nitrogen", allow_negative_numbers = true)]
    current_n: f64,

    /// Current soil phosphorus.
    #[arg(short = 'p', long = "phosphorus", allow_negative_numbers = true)]
    current_p: f64,

    /// Current soil potassium.
    #[arg(short = 'k', long = "potassium", allow_negative_numbers = true)]
    current_k: f64,

    /// Field area in hectares. Adds total amount, bag count and cost.
    #[arg(long)]
    land_size: Option<f64>,

    /// Reference table path. Overrides CROP_TABLE_PATH.
    #[arg(long)]
    table: Option<PathBuf>,
}

impl Args {
    fn into_request(self) -> anyhow::Result<RecommendationRequest> {
        let request = RecommendationRequest {
            crop: self.crop,
            season: self.season,
            land_size_ha: self.land_size,
            current_n: self.current_n,
            current_p: self.current_p,
            current_k: self.current_k,
        };
        request.validate().context("invalid command line arguments")?;
        Ok(request)
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fertilizer_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let mut args = Args::parse();
    let table_path = args
        .table
        .take()
        .unwrap_or_else(|| settings.crop_table_path.clone());

    let crops = CropTable::from_path(&table_path).map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        e
    })?;

    let request = args.into_request()?;
    let recommendation = fertilizer_core::recommend::recommend(&crops, &request)
        .with_context(|| format!("no recommendation for crop '{}'", request.crop))?;

    tracing::info!(
        crop = %request.crop,
        season = %request.season,
        fertilizer = recommendation.fertilizer().map(|f| f.name()).unwrap_or("none"),
        "recommendation computed"
    );

    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

fn init_sentry(settings: &fertilizer_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_nutrient_flags() {
        let args = Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Kharif", "-n", "20", "-p", "40", "-k",
            "40", "--land-size", "2",
        ])
        .unwrap();
        let req = args.into_request().unwrap();
        assert_eq!(req.crop, "Rice");
        assert_eq!(req.current_n, 20.0);
        assert_eq!(req.land_size_ha, Some(2.0));
    }

    #[test]
    fn land_size_is_optional() {
        let args = Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Rabi", "--nitrogen", "1",
            "--phosphorus", "2", "--potassium", "3",
        ])
        .unwrap();
        assert_eq!(args.into_request().unwrap().land_size_ha, None);
    }

    #[test]
    fn rejects_negative_land_size() {
        let args = Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Rabi", "-n", "1", "-p", "2", "-k",
            "3", "--land-size=-1",
        ])
        .unwrap();
        assert!(args.into_request().is_err());
    }

    #[test]
    fn rejects_nan_and_infinite_readings() {
        let args = Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Kharif", "-n", "NaN", "-p", "40",
            "-k", "40",
        ])
        .unwrap();
        let err = args.into_request().unwrap_err();
        assert!(format!("{err:#}").contains("field 'N' must be numeric"), "{err:#}");

        let args = Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Kharif", "-n", "20", "-p", "40",
            "-k", "inf",
        ])
        .unwrap();
        assert!(args.into_request().is_err());
    }

    #[test]
    fn requires_all_nutrients() {
        assert!(Args::try_parse_from([
            "fertilizer_cli", "--crop", "Rice", "--season", "Rabi", "-n", "1",
        ])
        .is_err());
    }
}
