use clausewitz::prelude::*;
use pretty_assertions::assert_eq;

/// Name, attributes, values and nesting, without offsets.
#[derive(Debug, PartialEq)]
struct Shape {
    name: String,
    attributes: Vec<(String, String)>,
    values: Vec<String>,
    children: Vec<Shape>,
}

fn shape(block: &RawBlock) -> Shape {
    Shape {
        name: block.name.clone(),
        attributes: block.attributes.clone(),
        values: block.values.clone(),
        children: block.children.iter().map(shape).collect(),
    }
}

fn shapes(text: &str) -> Vec<Shape> {
    BlockScanner::default()
        .scan_all(text)
        .unwrap()
        .iter()
        .map(shape)
        .collect()
}

const CULTURE_FILE: &str = "\u{feff}# Latin cultures
latin = {
    color = rgb { 200 40 40 }
    graphical_culture = roman_gfx

    culture = {
        # The Romans
        roman = { color = rgb { 180 30 30 } }
        etruscan = {
            family = { tyrrhenian lemnian }
            \"quoted key\" = yes
        }
        samnite = { }
    }
}

# Greek cultures
hellenic = {
    color = hsv { 0.6 0.5 0.8 }
    culture = { athenian = { } }
}
";

#[test]
fn test_structural_round_trip() {
    for indent in [Indent::Tab, Indent::Spaces(4)] {
        let tree = ScriptTree::parse(CULTURE_FILE).unwrap();
        let written = ScriptWriter::new(indent).render_blocks(&tree.blocks);
        assert_eq!(shapes(&written), shapes(CULTURE_FILE));

        // writing the re-scanned text again is stable byte for byte
        let again = ScriptTree::parse(&written).unwrap();
        assert_eq!(ScriptWriter::new(indent).render_blocks(&again.blocks), written);
    }
}

#[test]
fn test_comments_survive_round_trip() {
    let tree = ScriptTree::parse(CULTURE_FILE).unwrap();
    assert_eq!(tree.get("latin").unwrap().comment.as_deref(), Some("Latin cultures"));
    let roman = &tree.get("latin").unwrap().child("culture").unwrap().children[0];
    assert_eq!(roman.comment.as_deref(), Some("The Romans"));

    let written = ScriptWriter::default().render_blocks(&tree.blocks);
    let again = ScriptTree::parse(&written).unwrap();
    assert_eq!(again.get("hellenic").unwrap().comment.as_deref(), Some("Greek cultures"));
}

#[test]
fn test_rgb_text_round_trip() {
    for r in (0..=255).step_by(51) {
        for g in [0, 1, 127, 128, 254, 255] {
            for b in [0, 99, 255] {
                let color = Color::Rgb8(r, g, b);
                let text = format!("color = {}", render(color));
                assert_eq!(to_rgb8(parse_color(&text).unwrap()), (r, g, b));
            }
        }
    }
}

#[test]
fn test_hue_rotate_zero_is_identity() {
    for base in [Color::Rgb8(10, 20, 30), Color::Rgb8(255, 255, 0), Color::Rgb8(90, 12, 200)] {
        for factor in [0.0, 0.04, 0.5, 3.0] {
            assert_eq!(hue_rotate(base, 0, factor), base);
        }
    }
}

#[test]
fn test_hue_rotate_arithmetic() {
    let base = Color::Rgb8(90, 12, 200);
    let (h0, _, _) = clausewitz::color::to_hsv(base);
    for i in 1..10 {
        let (h, _, _) = rotate_hsv(base, i, 0.04);
        let expected = (h0 + f64::from(i) * 0.04).rem_euclid(1.0);
        assert!((h - expected).abs() < 1e-12);
    }
}

#[test]
fn test_name_derivation_is_pure() {
    assert_eq!(derive_color_from_name("Rome"), derive_color_from_name("Rome"));
    assert_ne!(derive_color_from_name("Rome"), derive_color_from_name("Athens"));
}

#[test]
fn test_culture_scenario() {
    let tree = ScriptTree::parse("culture = { ruman = { color = rgb { 10 20 30 } } }").unwrap();
    assert_eq!(tree.len(), 1);
    let culture = &tree.blocks[0];
    assert_eq!(culture.name, "culture");
    assert_eq!(culture.children.len(), 1);
    assert_eq!(culture.children[0].name, "ruman");
    assert_eq!(culture.children[0].color, Some(Color::Rgb8(10, 20, 30)));
}

#[test]
fn test_unbalanced_file_is_isolated() {
    let files = ["a = { b = { }", "c = { d = { color = rgb { 1 2 3 } } }"];
    let results: Vec<std::result::Result<ScriptTree, ScanError>> = files.iter().map(|t| ScriptTree::parse(t)).collect();

    assert!(matches!(
        results[0],
        Err(ScanError::UnbalancedBraces {
            fault: BraceFault::Unclosed,
            ..
        })
    ));
    let good = results[1].as_ref().unwrap();
    assert_eq!(good.blocks[0].children[0].color, Some(Color::Rgb8(1, 2, 3)));
}

#[test]
fn test_float_triplet_classification() {
    assert_eq!(RawFloatTriplet(0.4, 0.6, 0.8).classify(), Ok(Color::Rgb8(102, 153, 204)));
    assert_eq!(RawFloatTriplet(40.0, 60.0, 80.0).classify(), Ok(Color::Rgb8(40, 60, 80)));
}

#[test]
fn test_duplicate_output_key() {
    let mapping = GroupMapping::new().with_group("hellenic", ["ATH"]);
    let grouping = HierarchyGrouper::new().group(
        [
            Entity::new("ATH", "ATH").with_label("Athens"),
            Entity::new("ATH", "ATH").with_label("Second Athens"),
        ],
        &mapping,
    );
    assert_eq!(grouping.entity_count(), 1);
    assert_eq!(grouping.get("hellenic").unwrap()[0].display_label.as_deref(), Some("Athens"));
    assert!(matches!(
        grouping.diagnostics.as_slice(),
        [GroupError::DuplicateKey { key, .. }] if key == "ATH"
    ));
}

#[test]
fn test_localisation_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let acc: LocalisationAccumulator = [("ROM", "Rome"), ("ROM_ADJ", "Roman")].into_iter().collect();
    clausewitz::localisation::write_localisation(dir.path().join("x_l_english.yml"), "english", &acc)
        .unwrap();

    let resolver = LocalisationResolver::new(LookupPolicy::Strict).with_table(
        LocalisationTable::load_dir(dir.path()).unwrap(),
        TextSource::Basegame,
    );
    assert_eq!(resolver.resolve(&["ROM_ADJ"], None, "ROM").text, "Roman");
}
