use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const OUTPUT_DIR: &str = "sample_data";

const TEAMS: [&str; 5] = ["Falcons", "Wolves", "Sharks", "Titans", "Comets"];
const POSITIONS: [&str; 5] = ["Guard", "Guard", "Forward", "Forward", "Center"];
const FIRST_NAMES: [&str; 10] = [
    "Alex", "Jordan", "Sam", "Chris", "Taylor", "Morgan", "Jamie", "Riley", "Casey", "Drew",
];
const LAST_NAMES: [&str; 6] = ["Smith", "Garcia", "Okafor", "Novak", "Kim", "Silva"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

/// One season line per player.
struct PlayerRow {
    player: String,
    team: &'static str,
    position: &'static str,
    games: i64,
    points: f64,
    assists: i64,
    rebounds: i64,
    /// Missing for a few players, to exercise null handling.
    minutes: Option<f64>,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<PlayerRow> {
    let mut rows = Vec::new();
    for (t, &team) in TEAMS.iter().enumerate() {
        for (p, &position) in POSITIONS.iter().enumerate() {
            let first = FIRST_NAMES[(t * 3 + p) % FIRST_NAMES.len()];
            let last = LAST_NAMES[(t + p * 2) % LAST_NAMES.len()];

            let minutes = rng.gauss(28.0, 6.0).clamp(8.0, 40.0);
            let games = rng.range(40, 82);
            // Scoring tracks playing time; bigs rebound, guards assist.
            let points = (minutes * 0.55 + rng.gauss(0.0, 3.0)).max(0.0);
            let (assist_rate, rebound_rate) = match position {
                "Guard" => (0.22, 0.12),
                "Forward" => (0.10, 0.22),
                _ => (0.06, 0.35),
            };
            let assists = (minutes * assist_rate + rng.gauss(0.0, 1.0)).round().max(0.0) as i64;
            let rebounds = (minutes * rebound_rate + rng.gauss(0.0, 1.5)).round().max(0.0) as i64;

            rows.push(PlayerRow {
                player: format!("{first} {last}"),
                team,
                position,
                games,
                points: (points * 10.0).round() / 10.0,
                assists,
                rebounds,
                minutes: (rng.next_f64() > 0.1).then(|| (minutes * 10.0).round() / 10.0),
            });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[PlayerRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "player", "team", "position", "games", "points", "assists", "rebounds", "minutes",
    ])?;
    for row in rows {
        writer.write_record([
            row.player.clone(),
            row.team.to_string(),
            row.position.to_string(),
            row.games.to_string(),
            row.points.to_string(),
            row.assists.to_string(),
            row.rebounds.to_string(),
            row.minutes.map(|m| m.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[PlayerRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("player", DataType::Utf8, false),
        Field::new("team", DataType::Utf8, false),
        Field::new("position", DataType::Utf8, false),
        Field::new("games", DataType::Int64, false),
        Field::new("points", DataType::Float64, false),
        Field::new("assists", DataType::Int64, false),
        Field::new("rebounds", DataType::Int64, false),
        Field::new("minutes", DataType::Float64, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.player.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.team))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.position))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.games))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.points))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.assists))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.rebounds))),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.minutes).collect::<Vec<_>>(),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}/"))?;

    let csv_path = dir.join("sports_stats.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = dir.join("sports_stats.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} player rows to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
