//! Conversion settings (`universalis.toml`)
//!
//! Every field has a default except the game and output paths. Paths are
//! checked when a run asks for them, so a settings file can be loaded and
//! inspected before it is complete.

use std::path::{Path, PathBuf};

use clausewitz::grouping::GroupMapping;
use clausewitz::localisation::{LookupPolicy, SuffixHeuristic, WithOverrides, DEFAULT_OVERRIDES};
use clausewitz::script::{Indent, ScriptWriter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default settings file name looked up in the working directory.
pub const SETTINGS_FILE: &str = "universalis.toml";

fn default_hue_factor() -> f64 {
    0.04
}

fn default_language() -> String {
    "english".to_string()
}

fn default_adjective_overrides() -> IndexMap<String, String> {
    DEFAULT_OVERRIDES
        .iter()
        .map(|(tag, adjective)| ((*tag).to_string(), (*adjective).to_string()))
        .collect()
}

/// How culture colors are settled within one culture file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Every culture gets the first culture's color rotated by its position,
    /// explicit colors included.
    #[default]
    RotateSiblings,
    /// Keep explicit colors and rotate the group color for the rest.
    RotateMissing,
    /// Leave explicit colors alone and derive the rest from their names.
    KeepExplicit,
}

/// The full settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Imperator: Rome install (the directory holding `common/`, `setup/`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir_game: Option<PathBuf>,
    /// Europa Universalis V install, used for basegame localisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu5_game: Option<PathBuf>,
    /// Where the converted mod is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_root: Option<PathBuf>,
    #[serde(default = "default_hue_factor")]
    pub hue_factor: f64,
    #[serde(default)]
    pub color_policy: ColorPolicy,
    #[serde(default, with = "indent_serde")]
    pub indent: Indent,
    #[serde(default)]
    pub localisation_policy: LookupPolicy,
    #[serde(default = "default_language")]
    pub language: String,
    /// Country tag → adjective, checked before any lookup or derivation.
    #[serde(default = "default_adjective_overrides")]
    pub adjective_overrides: IndexMap<String, String>,
    /// Religion group → member religions.
    #[serde(default)]
    pub religion_groups: GroupMapping,
    #[serde(default)]
    pub map: MapHierarchy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ir_game: None,
            eu5_game: None,
            mod_root: None,
            hue_factor: default_hue_factor(),
            color_policy: ColorPolicy::default(),
            indent: Indent::default(),
            localisation_policy: LookupPolicy::default(),
            language: default_language(),
            adjective_overrides: default_adjective_overrides(),
            religion_groups: GroupMapping::default(),
            map: MapHierarchy::default(),
        }
    }
}

impl Settings {
    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The Imperator install, or [`Error::MissingSetting`].
    pub fn ir_game(&self) -> Result<&Path> {
        self.ir_game
            .as_deref()
            .ok_or(Error::MissingSetting { key: "ir_game" })
    }

    /// The output directory, or [`Error::MissingSetting`].
    pub fn mod_root(&self) -> Result<&Path> {
        self.mod_root
            .as_deref()
            .ok_or(Error::MissingSetting { key: "mod_root" })
    }

    pub fn eu5_game(&self) -> Option<&Path> {
        self.eu5_game.as_deref()
    }

    /// Script writer with the configured indentation.
    pub fn writer(&self) -> ScriptWriter {
        ScriptWriter::new(self.indent)
    }

    /// Adjective strategy with the configured overrides.
    pub fn adjective_strategy(&self) -> WithOverrides<SuffixHeuristic> {
        WithOverrides::new(SuffixHeuristic, self.adjective_overrides.clone())
    }
}

/// Continent → subcontinent → superregion → region tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapHierarchy {
    /// Continent → subcontinents.
    #[serde(default)]
    pub continents: GroupMapping,
    /// Subcontinent → (superregion → regions).
    #[serde(default)]
    pub superregions: IndexMap<String, GroupMapping>,
}

const EUROPE: &[(&str, &[&str])] = &[
    (
        "italy",
        &["central_italy_region", "magna_graecia_region", "cisalpine_gaul_region"],
    ),
    (
        "germany",
        &[
            "belgica_region",
            "germania_region",
            "germania_superior_region",
            "rhaetia_region",
            "bohemia_area",
        ],
    ),
    (
        "france",
        &[
            "transalpine_gaul_region",
            "central_gaul_region",
            "armorica_region",
            "aquitaine_region",
        ],
    ),
    (
        "iberia",
        &[
            "lusitania_region",
            "tarraconensis_region",
            "baetica_region",
            "contestania_region",
        ],
    ),
    ("britain", &["britain_region", "caledonia_region"]),
    (
        "north_sea",
        &["scandinavia_region", "baltic_sea_region", "atlantic_region"],
    ),
    (
        "balkans",
        &[
            "greece_region",
            "macedonia_region",
            "illyria_region",
            "albania_region",
            "thrace_region",
            "moesia_region",
        ],
    ),
    (
        "eastern_europe",
        &[
            "dacia_region",
            "sarmatia_europea_region",
            "vistulia_region",
            "venedia_region",
            "pannonia_region",
        ],
    ),
];

const ASIA: &[(&str, &[&str])] = &[
    (
        "anatolia",
        &[
            "asia_region",
            "bithynia_region",
            "galatia_region",
            "cappadocia_region",
            "cappadocia_pontica_region",
            "cilicia_region",
        ],
    ),
    (
        "middle_east",
        &[
            "taurica_region",
            "sarmatia_asiatica_region",
            "assyria_region",
            "mesopotamia_region",
            "gedrosia_region",
            "persis_region",
            "media_region",
            "bactriana_region",
            "ariana_region",
            "parthia_region",
            "syria_region",
            "palestine_region",
            "arabia_region",
            "arabia_felix_region",
        ],
    ),
    (
        "india",
        &[
            "gandhara_region",
            "maru_region",
            "avanti_region",
            "madhyadesa_region",
            "pracya_region",
            "vindhyaprstha_region",
            "dravida_region",
            "aparanta_region",
            "karnata_region",
        ],
    ),
    (
        "central_asia",
        &["tibet_region", "himalayan_region", "sogdiana_region"],
    ),
];

fn superregion_table(rows: &[(&str, &[&str])]) -> GroupMapping {
    rows.iter()
        .map(|(superregion, regions)| (*superregion, regions.iter().copied()))
        .collect()
}

impl Default for MapHierarchy {
    fn default() -> Self {
        let mut superregions = IndexMap::new();
        superregions.insert("europe".to_string(), superregion_table(EUROPE));
        superregions.insert("asia".to_string(), superregion_table(ASIA));

        Self {
            continents: GroupMapping::new().with_group("eurasia", ["europe", "asia"]),
            superregions,
        }
    }
}

impl MapHierarchy {
    /// Superregion → regions across every subcontinent, in table order.
    pub fn superregion_mapping(&self) -> GroupMapping {
        let mut mapping = GroupMapping::new();
        for table in self.superregions.values() {
            for (superregion, regions) in table.groups() {
                mapping.insert(superregion, regions.iter().map(String::as_str));
            }
        }
        mapping
    }

    /// Subcontinent → superregions.
    pub fn subcontinent_mapping(&self) -> GroupMapping {
        self.superregions
            .iter()
            .map(|(subcontinent, table)| {
                (
                    subcontinent.as_str(),
                    table.groups().map(|(superregion, _)| superregion.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

/// `indent = "tab"` or `indent = 4`.
mod indent_serde {
    use clausewitz::script::Indent;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Width(usize),
        Name(String),
    }

    pub fn serialize<S: Serializer>(indent: &Indent, serializer: S) -> Result<S::Ok, S::Error> {
        match indent {
            Indent::Tab => serializer.serialize_str("tab"),
            Indent::Spaces(n) => serializer.serialize_u64(*n as u64),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Indent, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Width(n) => Ok(Indent::Spaces(n)),
            Repr::Name(name) if name.eq_ignore_ascii_case("tab") => Ok(Indent::Tab),
            Repr::Name(name) => name.trim().parse().map(Indent::Spaces).map_err(|_| {
                D::Error::custom(format!(
                    "indent must be \"tab\" or a number of spaces, got '{name}'"
                ))
            }),
        }
    }
}
