//! Full conversion run
//!
//! A run has a hard barrier between reading and writing: every source file
//! is scanned and every cross-file reference resolved before the first
//! output file is touched.

use std::path::{Path, PathBuf};

use clausewitz::localisation::{LocalisationAccumulator, LocalisationResolver, LocalisationTable, TextSource};
use clausewitz::script::BlockScanner;

use crate::config::Settings;
use crate::corpus::{find_script_files, scan_files, CorpusScan, ScanMode, ScanProgress, SkippedFile, SourceFile};
use crate::error::Result;
use crate::extract::countries::{country_list, CountrySources};
use crate::extract::map::{MapSources, DEFINITION_CSV};
use crate::extract::{extract_countries, extract_cultures, extract_map, extract_religions, ExtractContext};
use crate::localisation::render_files;
use crate::output::OutputSet;
use crate::summary::RunSummary;

/// Imperator input locations, relative to the game root.
pub mod layout {
    pub const CULTURES_DIR: &str = "common/cultures";
    pub const RELIGIONS_DIR: &str = "common/religions";
    pub const COUNTRY_LIST: &str = "setup/countries/countries.txt";
    pub const DEFAULT_SETUP: &str = "setup/main/00_default.txt";
    pub const AREAS: &str = "map_data/areas.txt";
    pub const REGIONS: &str = "map_data/regions.txt";

    /// Imperator localisation directory for `language`.
    pub fn source_localisation(language: &str) -> String {
        format!("localization/{language}")
    }

    /// EU5 localisation directory for `language`.
    pub fn basegame_localisation(language: &str) -> String {
        format!("main_menu/localization/{language}")
    }
}

/// Phases of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Localisation,
    Scanning,
    Extracting,
    Writing,
}

impl Stage {
    pub const COUNT: usize = 4;

    /// 1-based position of the stage.
    pub fn step(self) -> usize {
        match self {
            Self::Localisation => 1,
            Self::Scanning => 2,
            Self::Extracting => 3,
            Self::Writing => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Localisation => "Loading localisation...",
            Self::Scanning => "Scanning Imperator files...",
            Self::Extracting => "Converting cultures, religions, countries and map...",
            Self::Writing => "Writing mod files...",
        }
    }
}

/// Progress events of a run.
#[derive(Debug, Clone)]
pub enum RunProgress {
    Stage(Stage),
    File(ScanProgress),
}

/// Everything read from the Imperator install.
#[derive(Debug, Default)]
struct Corpus {
    cultures: Vec<SourceFile>,
    religions: Vec<SourceFile>,
    country_list: Option<SourceFile>,
    setups: Vec<SourceFile>,
    default_setup: Option<SourceFile>,
    areas: Option<SourceFile>,
    regions: Option<SourceFile>,
    definitions: Option<String>,
    skipped: Vec<SkippedFile>,
    scanned: usize,
}

/// Converts an Imperator install into EU5 mod files.
#[derive(Debug, Clone)]
pub struct Converter {
    settings: Settings,
    scanner: BlockScanner,
}

impl Converter {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            scanner: BlockScanner::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the conversion without progress reporting.
    pub fn run(&self, dry_run: bool) -> Result<RunSummary> {
        self.run_with_progress(dry_run, |_| {})
    }

    /// Run the conversion. With `dry_run` nothing is written and
    /// [`RunSummary::files_written`] lists the planned outputs.
    pub fn run_with_progress<F>(&self, dry_run: bool, progress: F) -> Result<RunSummary>
    where
        F: Fn(&RunProgress) + Send + Sync,
    {
        let ir = self.settings.ir_game()?;
        // A missing mod root is reported before any scanning.
        let mod_root = if dry_run { None } else { Some(self.settings.mod_root()?) };

        progress(&RunProgress::Stage(Stage::Localisation));
        let resolver = self.resolver(ir)?;

        progress(&RunProgress::Stage(Stage::Scanning));
        let mut corpus = self.scan(ir, &progress);

        progress(&RunProgress::Stage(Stage::Extracting));
        let mut summary = RunSummary {
            files_scanned: corpus.scanned,
            skipped: std::mem::take(&mut corpus.skipped),
            dry_run,
            ..RunSummary::default()
        };
        let outputs = self.convert(&corpus, &resolver, &mut summary)?;

        progress(&RunProgress::Stage(Stage::Writing));
        summary.files_written = match mod_root {
            Some(root) => outputs.commit(root)?,
            None => outputs.paths().map(Path::to_path_buf).collect(),
        };

        tracing::info!(
            "Conversion finished: {} scanned, {} skipped, {} diagnostics, {} outputs",
            summary.files_scanned,
            summary.skipped.len(),
            summary.diagnostics.len(),
            summary.files_written.len()
        );
        Ok(summary)
    }

    fn resolver(&self, ir: &Path) -> Result<LocalisationResolver> {
        let language = &self.settings.language;
        let mut resolver = LocalisationResolver::new(self.settings.localisation_policy);
        match self.settings.eu5_game() {
            Some(eu5) => resolver.add_table(
                LocalisationTable::load_dir(eu5.join(layout::basegame_localisation(language)))?,
                TextSource::Basegame,
            ),
            None => tracing::warn!("eu5_game not set, basegame localisation is unavailable"),
        }
        resolver.add_table(
            LocalisationTable::load_dir(ir.join(layout::source_localisation(language)))?,
            TextSource::Source,
        );
        Ok(resolver)
    }

    fn scan<F>(&self, ir: &Path, progress: &F) -> Corpus
    where
        F: Fn(&RunProgress) + Send + Sync,
    {
        let on_file = |p: &ScanProgress| progress(&RunProgress::File(p.clone()));
        let mut skipped = Vec::new();
        let mut scanned = 0;
        let mut keep = |scan: CorpusScan| {
            scanned += scan.files.len();
            skipped.extend(scan.skipped);
            scan.files
        };

        let mut scan_single = |relative: &str, mode: ScanMode| {
            let path = ir.join(relative);
            if !path.is_file() {
                tracing::debug!("No {relative} in {}", ir.display());
                return None;
            }
            keep(scan_files(&[path], ir, &self.scanner, mode, on_file)).pop()
        };
        let country_list_file = scan_single(layout::COUNTRY_LIST, ScanMode::Document);
        let default_setup = scan_single(layout::DEFAULT_SETUP, ScanMode::Blocks);
        let areas = scan_single(layout::AREAS, ScanMode::Blocks);
        let regions = scan_single(layout::REGIONS, ScanMode::Blocks);

        let mut scan_dir = |dir: &str| {
            let files = find_script_files(ir.join(dir));
            keep(scan_files(&files, ir, &self.scanner, ScanMode::Blocks, on_file))
        };
        let cultures = scan_dir(layout::CULTURES_DIR);
        let religions = scan_dir(layout::RELIGIONS_DIR);

        let setups = match &country_list_file {
            Some(list) => {
                let (entries, _) = country_list(list);
                let paths: Vec<PathBuf> = entries.iter().map(|e| ir.join(&e.path)).collect();
                keep(scan_files(&paths, ir, &self.scanner, ScanMode::Document, on_file))
            }
            None => Vec::new(),
        };

        let mut definitions = None;
        let definition_path = ir.join(DEFINITION_CSV);
        if definition_path.is_file() {
            let read = std::fs::read(&definition_path)
                .map_err(|e| format!("read failed: {e}"))
                .and_then(|bytes| String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {e}")));
            match read {
                Ok(text) => {
                    definitions = Some(text);
                    scanned += 1;
                }
                Err(reason) => {
                    tracing::warn!("Skipping {DEFINITION_CSV}: {reason}");
                    skipped.push(SkippedFile {
                        path: PathBuf::from(DEFINITION_CSV),
                        reason,
                    });
                }
            }
        }

        Corpus {
            cultures,
            religions,
            country_list: country_list_file,
            setups,
            default_setup,
            areas,
            regions,
            definitions,
            skipped,
            scanned,
        }
    }

    fn convert(
        &self,
        corpus: &Corpus,
        resolver: &LocalisationResolver,
        summary: &mut RunSummary,
    ) -> Result<OutputSet> {
        let ctx = ExtractContext::new(&self.settings, resolver);
        let writer = self.settings.writer();
        let mut outputs = OutputSet::new();
        let mut localisation = LocalisationAccumulator::new();

        let cultures = extract_cultures(&corpus.cultures, &ctx);
        let religions = extract_religions(&corpus.religions, &ctx);

        let entries = match &corpus.country_list {
            Some(list) => {
                let (entries, diagnostics) = country_list(list);
                summary.diagnostics.extend(diagnostics);
                entries
            }
            None => Vec::new(),
        };
        let countries = extract_countries(
            CountrySources {
                entries: &entries,
                setups: &corpus.setups,
                default_setup: corpus.default_setup.as_ref(),
            },
            &cultures,
            &religions,
            &ctx,
        );

        let map = extract_map(
            MapSources {
                definitions: corpus.definitions.as_deref(),
                areas: corpus.areas.as_ref(),
                regions: corpus.regions.as_ref(),
            },
            &self.settings.map,
        );

        outputs.register_all(cultures.render(&writer))?;
        outputs.register_all(religions.render(&writer))?;
        outputs.register_all(countries.render(&writer))?;
        outputs.register_all(map.render(&writer))?;

        summary.diagnostics.extend(cultures.diagnostics);
        summary.diagnostics.extend(religions.diagnostics);
        summary.diagnostics.extend(countries.diagnostics);
        summary.diagnostics.extend(map.diagnostics);

        localisation.merge(cultures.localisation);
        localisation.merge(religions.localisation);
        localisation.merge(countries.localisation);
        if !localisation.is_empty() {
            outputs.register_all(render_files(localisation, &self.settings.language))?;
        }
        Ok(outputs)
    }
}
