// src/terrain/biome.rs
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One entry of the ordered biome catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub key: String,
    pub label: String,
    /// CSS-style hex colour, e.g. `#2a4a2a`.
    pub primary_color: String,
    /// Raises (or lowers) terrain; scaled by `TerrainConfig::biome_altitude_scale`.
    pub altitude_bias: f64,
    pub humidity: f64,
    pub flora: Vec<String>,
    pub ambient_sound: String,
}

impl Biome {
    fn entry(
        key: &str,
        label: &str,
        primary_color: &str,
        altitude_bias: f64,
        humidity: f64,
        flora: [&str; 3],
        ambient_sound: &str,
    ) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            primary_color: primary_color.to_owned(),
            altitude_bias,
            humidity,
            flora: flora.iter().map(|f| (*f).to_owned()).collect(),
            ambient_sound: ambient_sound.to_owned(),
        }
    }
}

static DEFAULT_CATALOG: Lazy<Vec<Biome>> = Lazy::new(|| {
    vec![
        Biome::entry(
            "wasteland",
            "Cracked Wasteland",
            "#2a4a2a",
            0.1,
            0.2,
            ["charred stump", "ashen shrub", "rusted sign"],
            "wind",
        ),
        Biome::entry(
            "marsh",
            "Toxic Marsh",
            "#1f332a",
            -0.15,
            0.85,
            ["bulb reed", "glow lily", "fungal bloom"],
            "drip",
        ),
        Biome::entry(
            "highlands",
            "Highlands",
            "#365d7a",
            0.35,
            0.45,
            ["pine cluster", "rock shelf", "sky vine"],
            "gust",
        ),
        Biome::entry(
            "crystal",
            "Crystaline Steppe",
            "#4a4a7a",
            0.05,
            0.3,
            ["crystal shard", "prism bloom", "lumen grass"],
            "hum",
        ),
        Biome::entry(
            "oasis",
            "Desert Oasis",
            "#5a4a2a",
            -0.05,
            0.6,
            ["palm stalk", "succulent", "cattail"],
            "water",
        ),
    ]
});

/// The built-in five-entry catalog. Order matters: biome indices are
/// positions in this list.
pub fn default_catalog() -> Vec<Biome> {
    DEFAULT_CATALOG.clone()
}
