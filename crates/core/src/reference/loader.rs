use crate::reference::{CropIdealProfile, CropTable};
use anyhow::{bail, ensure, Context};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CROP_COLUMN: &str = "Crop";
const N_COLUMN: &str = "N_mean";
const P_COLUMN: &str = "P_mean";
const K_COLUMN: &str = "K_mean";

struct Columns {
    crop: usize,
    n: usize,
    p: usize,
    k: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("crop table is missing required column '{name}'"))
        };
        Ok(Self {
            crop: find(CROP_COLUMN)?,
            n: find(N_COLUMN)?,
            p: find(P_COLUMN)?,
            k: find(K_COLUMN)?,
        })
    }
}

impl CropTable {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open crop table {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("failed to load crop table {}", path.display()))?;
        tracing::info!(path = %path.display(), crops = table.len(), "loaded crop table");
        Ok(table)
    }

    /// Parses CSV with at least `Crop`, `N_mean`, `P_mean` and `K_mean` columns.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns = Columns::locate(reader.headers().context("failed to read header row")?)?;

        let mut profiles = Vec::new();
        for record in reader.records() {
            let record = record.context("malformed row in crop table")?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            profiles.push(parse_row(&record, &columns, line)?);
        }

        ensure!(!profiles.is_empty(), "crop table contains no rows");

        let (table, duplicates) = CropTable::from_profiles(profiles);
        for dup in duplicates {
            tracing::warn!(crop = %dup.crop_name, "duplicate crop in table; keeping first entry");
        }
        Ok(table)
    }
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    line: u64,
) -> anyhow::Result<CropIdealProfile> {
    let crop_name = record.get(columns.crop).unwrap_or_default().to_string();
    ensure!(!crop_name.is_empty(), "empty crop name at line {line}");

    Ok(CropIdealProfile {
        ideal_n: parse_value(record, columns.n, N_COLUMN, line)?,
        ideal_p: parse_value(record, columns.p, P_COLUMN, line)?,
        ideal_k: parse_value(record, columns.k, K_COLUMN, line)?,
        crop_name,
    })
}

fn parse_value(
    record: &StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> anyhow::Result<f64> {
    let raw = record.get(idx).unwrap_or_default();
    let value: f64 = match raw.parse() {
        Ok(v) => v,
        Err(_) => bail!("invalid {column} value {raw:?} at line {line}"),
    };
    ensure!(value.is_finite(), "non-finite {column} value {raw:?} at line {line}");
    Ok(value)
}
