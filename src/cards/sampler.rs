use log::debug;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::clients::entities::TrackRecord;

/// Inclusive range of release years a card may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub const DEFAULT_FROM: i32 = 1800;
    pub const DEFAULT_TO: i32 = 2222;

    pub fn new(from: Option<i32>, to: Option<i32>) -> Self {
        YearRange {
            from: from.unwrap_or(Self::DEFAULT_FROM),
            to: to.unwrap_or(Self::DEFAULT_TO),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::new(None, None)
    }
}

/// Draw up to `limit` records released within `years`, uniformly and without
/// replacement. The order of the result is unspecified; pass a `seed` to make
/// the draw reproducible.
pub fn sample(
    records: Vec<TrackRecord>,
    years: YearRange,
    limit: i64,
    seed: Option<u64>,
) -> Vec<TrackRecord> {
    let Ok(limit) = usize::try_from(limit) else {
        return Vec::new();
    };

    let filtered: Vec<TrackRecord> = records
        .into_iter()
        .filter(|r| years.contains(r.year))
        .collect();
    let n = limit.min(filtered.len());
    debug!(
        "Sampling {n} of {} records released {}..={}",
        filtered.len(),
        years.from,
        years.to
    );

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    filtered.choose_multiple(&mut rng, n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32) -> TrackRecord {
        TrackRecord {
            artist: format!("Artist {year}"),
            song: format!("Song {year}"),
            year,
            album: None,
            link: format!("https://open.spotify.com/track/{year}"),
        }
    }

    fn records() -> Vec<TrackRecord> {
        (1960..2020).map(record).collect()
    }

    #[test]
    fn respects_limit_and_year_range() {
        let years = YearRange::new(Some(1980), Some(1989));
        for limit in [0, 1, 5, 10, 50] {
            let picked = sample(records(), years, limit, None);
            assert!(picked.len() <= usize::try_from(limit).unwrap());
            assert!(picked.iter().all(|r| years.contains(r.year)));
        }
        assert_eq!(sample(records(), years, 50, None).len(), 10);
    }

    #[test]
    fn picks_without_replacement() {
        let mut picked = sample(records(), YearRange::default(), 60, None);
        assert_eq!(picked.len(), 60);
        picked.sort_by_key(|r| r.year);
        picked.dedup();
        assert_eq!(picked.len(), 60);
    }

    #[test]
    fn empty_filtered_set_gives_empty_sample() {
        let years = YearRange::new(Some(2100), None);
        assert!(sample(records(), years, 10, None).is_empty());
        assert!(sample(Vec::new(), YearRange::default(), 10, None).is_empty());
    }

    #[test]
    fn non_positive_limit_gives_empty_sample() {
        assert!(sample(records(), YearRange::default(), 0, None).is_empty());
        assert!(sample(records(), YearRange::default(), -3, None).is_empty());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let years = YearRange::new(Some(1975), Some(1975));
        assert_eq!(sample(records(), years, 10, None), vec![record(1975)]);
    }

    #[test]
    fn seeded_samples_are_reproducible() {
        let first = sample(records(), YearRange::default(), 12, Some(7));
        let second = sample(records(), YearRange::default(), 12, Some(7));
        assert_eq!(first, second);
    }
}
