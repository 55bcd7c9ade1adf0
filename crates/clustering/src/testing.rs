//! Shared fixtures for unit tests.

use catalog::{StationKind, StationPoint};

pub(crate) fn station(id: &str, lat: f64, lon: f64) -> StationPoint {
    StationPoint::new(id, id.to_uppercase(), StationKind::Audio, lat, lon)
}

/// splitmix64 stream: deterministic inputs for randomized property checks.
pub(crate) struct SplitMix(u64);

impl SplitMix {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut x = self.0;
        x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
        x ^ (x >> 31)
    }

    /// Uniform in `[lo, hi)`.
    pub(crate) fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / 9007199254740992.0;
        lo + (hi - lo) * unit
    }

    pub(crate) fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// A mixed catalog: mostly valid points around a few hubs, some invalid.
pub(crate) fn random_catalog(rng: &mut SplitMix, n: usize) -> Vec<StationPoint> {
    const CITIES: [(&str, &str, f64, f64); 4] = [
        ("Paris", "France", 48.85, 2.35),
        ("Berlin", "Germany", 52.52, 13.40),
        ("Lagos", "Nigeria", 6.52, 3.37),
        ("Lima", "Peru", -12.04, -77.04),
    ];

    (0..n)
        .map(|i| {
            let id = format!("s{i}");
            let roll = rng.below(20);
            let (lat, lon) = match roll {
                0 => (f64::NAN, 0.0),
                1 => (rng.range(90.5, 120.0), rng.range(-180.0, 180.0)),
                2 => (0.0, rng.range(-400.0, -181.0)),
                _ => {
                    let (_, _, clat, clon) = CITIES[(roll % 4) as usize];
                    (clat + rng.range(-0.8, 0.8), clon + rng.range(-0.8, 0.8))
                }
            };
            let mut s = station(&id, lat, lon).with_popularity(rng.below(50));
            if roll % 3 != 0 {
                let (city, country, _, _) = CITIES[(roll % 4) as usize];
                let country = if roll % 5 == 0 { "Unknown" } else { country };
                s = s.with_place(Some(city), Some(country));
            }
            if roll % 7 == 0 {
                s.kind = StationKind::Video;
            }
            s
        })
        .collect()
}
