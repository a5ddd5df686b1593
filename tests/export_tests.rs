//! Numbering, MEI construction, writing and loading boxes back.

use std::path::PathBuf;

use chrono::NaiveDate;
use gtruth::export::{build_export_on, notes_path, write_export};
use gtruth::mei::build_mei;
use gtruth::{
    number_measures, parse_mei, parse_mei_file, AnnotationStore, BoxKind, GtruthError, ImageInfo,
    NumberingWarning, Rect, Settings, Strict,
};
use pretty_assertions::assert_eq;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2013, 6, 21).unwrap()
}

fn image_info() -> ImageInfo {
    ImageInfo {
        path: PathBuf::from("scans/page1.tiff"),
        width: 2400,
        height: 3300,
        dpi: 300.0,
    }
}

/// Two staves, three bars, drawn in a scrambled order.
fn two_staff_page() -> (Vec<Rect>, Vec<Rect>) {
    let bars = vec![
        Rect::new(50.0, 10.0, 30.0, 80.0),  // staff A, second
        Rect::new(5.0, 210.0, 40.0, 80.0),  // staff B, first
        Rect::new(10.0, 10.0, 30.0, 80.0),  // staff A, first
    ];
    let staves = vec![
        Rect::new(0.0, 200.0, 300.0, 100.0), // B
        Rect::new(0.0, 0.0, 300.0, 100.0),   // A
    ];
    (bars, staves)
}

// ─── Numbering ───────────────────────────────────────────────────────

#[test]
fn numbers_run_down_then_across() {
    let (mut bars, staves) = two_staff_page();
    let numbering = number_measures(&mut bars, &staves);

    assert_eq!(bars[2].number, Some(1));
    assert_eq!(bars[0].number, Some(2));
    assert_eq!(bars[1].number, Some(3));
    assert_eq!(numbering.order, vec![2, 0, 1]);
    assert!(numbering.is_complete());
    assert!(numbering.warnings.is_empty());

    let staff_numbers: Vec<_> = numbering.staves.iter().map(|s| s.number).collect();
    assert_eq!(staff_numbers, vec![Some(1), Some(2)]);
    // staves become the tight bound of their bars
    assert_eq!(numbering.staves[0].bbox(), (10.0, 10.0, 70.0, 80.0));
    assert_eq!(numbering.staves[0].children(), &[2, 0]);
}

#[test]
fn numbering_overwrites_earlier_numbers() {
    let (mut bars, staves) = two_staff_page();
    for bar in bars.iter_mut() {
        bar.number = Some(99);
    }
    number_measures(&mut bars, &staves);
    let numbers: Vec<_> = bars.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![Some(2), Some(3), Some(1)]);
}

#[test]
fn empty_staff_is_skipped() {
    let mut bars = vec![Rect::new(10.0, 10.0, 30.0, 80.0)];
    let staves = vec![
        Rect::new(0.0, 500.0, 300.0, 100.0),
        Rect::new(0.0, 0.0, 300.0, 100.0),
    ];
    let numbering = number_measures(&mut bars, &staves);
    assert_eq!(bars[0].number, Some(1));
    assert_eq!(numbering.staves.len(), 1);
    assert_eq!(
        numbering.warnings,
        vec![NumberingWarning::EmptyStaff { staff_index: 0 }]
    );
}

#[test]
fn bar_outside_every_staff_stays_unnumbered() {
    let mut bars = vec![
        Rect::new(10.0, 10.0, 30.0, 80.0),
        Rect::new(10.0, 400.0, 30.0, 80.0),
    ];
    let staves = vec![Rect::new(0.0, 0.0, 300.0, 100.0)];
    let numbering = number_measures(&mut bars, &staves);

    assert_eq!(bars[1].number, None);
    assert_eq!(numbering.unnumbered, vec![1]);
    assert!(!numbering.is_complete());
    assert_eq!(numbering.export_order().collect::<Vec<_>>(), vec![0, 1]);
    assert!(numbering
        .warnings
        .contains(&NumberingWarning::UnnumberedBar { bar_index: 1 }));
}

#[test]
fn bar_in_overlapping_staves_is_numbered_once() {
    let mut bars = vec![
        Rect::new(10.0, 40.0, 20.0, 20.0),
        Rect::new(50.0, 120.0, 20.0, 20.0),
    ];
    let staves = vec![
        Rect::new(0.0, 0.0, 100.0, 100.0),
        Rect::new(0.0, 30.0, 100.0, 120.0), // also holds bar 0
    ];
    let numbering = number_measures(&mut bars, &staves);
    assert_eq!(bars[0].number, Some(1));
    assert_eq!(bars[1].number, Some(2));
    assert_eq!(numbering.order, vec![0, 1]);
}

#[test]
fn no_boxes_numbers_nothing() {
    let mut bars: Vec<Rect> = Vec::new();
    let numbering = number_measures(&mut bars, &[]);
    assert!(numbering.is_complete());
    assert!(numbering.order.is_empty());
}

// ─── MEI tree ────────────────────────────────────────────────────────

#[test]
fn mei_has_one_zone_and_measure_per_bar() {
    let (mut bars, staves) = two_staff_page();
    let numbering = number_measures(&mut bars, &staves);
    let doc = build_mei(&bars, numbering.export_order(), &image_info(), &Settings::default(), date());

    let zones = doc.zones();
    let measures = doc.measures();
    assert_eq!(zones.len(), 3);
    assert_eq!(measures.len(), 3);

    let ns: Vec<_> = measures.iter().map(|m| m.attribute("n")).collect();
    assert_eq!(ns, vec![Some("1"), Some("2"), Some("3")]);

    for (measure, zone) in measures.iter().zip(&zones) {
        assert_eq!(measure.attribute("facs"), Some(format!("#{}", zone.id).as_str()));
    }

    let first = zones[0];
    assert_eq!(first.attribute("ulx"), Some("10"));
    assert_eq!(first.attribute("uly"), Some("10"));
    assert_eq!(first.attribute("lrx"), Some("40"));
    assert_eq!(first.attribute("lry"), Some("90"));
}

#[test]
fn mei_ids_are_unique() {
    let (mut bars, staves) = two_staff_page();
    let numbering = number_measures(&mut bars, &staves);
    let doc = build_mei(&bars, numbering.export_order(), &image_info(), &Settings::default(), date());
    let xml = doc.to_xml();

    let mut ids: Vec<&str> = xml
        .split("xml:id=\"")
        .skip(1)
        .filter_map(|s| s.split('"').next())
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn mei_header_and_graphic() {
    let doc = build_mei(&[], [], &image_info(), &Settings::default(), date());
    let root = &doc.root;

    assert_eq!(root.name, "mei");
    assert_eq!(root.attribute("meiversion"), Some("2013"));
    assert_eq!(root.attribute("xmlns"), Some("http://www.music-encoding.org/ns/mei"));

    let graphic = root.find("graphic").unwrap();
    assert_eq!(graphic.attribute("width"), Some("2400"));
    assert_eq!(graphic.attribute("height"), Some("3300"));
    assert_eq!(graphic.attribute("resolution"), Some("300"));
    assert_eq!(graphic.attribute("unit"), Some("px"));
    assert_eq!(graphic.attribute("target"), Some("scans/page1.tiff"));

    assert_eq!(root.find("date").and_then(|d| d.value.as_deref()), Some("2013-06-21"));

    let application = root.find("application").unwrap();
    let reference = root.find("ref").unwrap();
    assert_eq!(
        reference.attribute("target"),
        Some(format!("#{}", application.id).as_str())
    );
    assert!(doc.measures().is_empty());
    assert!(root.find("scoreDef").is_some());
}

#[test]
fn unnumbered_measure_has_no_n() {
    let mut bars = vec![Rect::new(1.4, 2.6, 10.0, 10.0)];
    let numbering = number_measures(&mut bars, &[]);
    let doc = build_mei(&bars, numbering.export_order(), &image_info(), &Settings::default(), date());

    let measure = doc.measures()[0];
    assert_eq!(measure.attribute("n"), None);
    assert!(measure.attribute("facs").is_some());
    // coordinates are rounded to whole pixels
    assert_eq!(doc.zones()[0].attribute("ulx"), Some("1"));
    assert_eq!(doc.zones()[0].attribute("uly"), Some("3"));
}

#[test]
fn serialized_mei_parses_back() {
    let (mut bars, staves) = two_staff_page();
    let numbering = number_measures(&mut bars, &staves);
    let doc = build_mei(&bars, numbering.export_order(), &image_info(), &Settings::default(), date());
    let xml = doc.to_xml();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<p xml:id="));
    assert!(xml.contains(">Encoded using <ref "));

    let loaded = parse_mei(&xml).unwrap();
    let expected = vec![
        Rect::new(10.0, 10.0, 30.0, 80.0).with_number(1),
        Rect::new(50.0, 10.0, 30.0, 80.0).with_number(2),
        Rect::new(5.0, 210.0, 40.0, 80.0).with_number(3),
    ];
    assert_eq!(loaded, expected);
}

// ─── Export pipeline ─────────────────────────────────────────────────

#[test]
fn export_without_image_is_aborted() {
    let (bars, staves) = two_staff_page();
    let mut store = AnnotationStore::default();
    store.extend(BoxKind::Bar, bars);
    store.extend(BoxKind::Staff, staves);

    let mut proceed = |_: &[usize]| true;
    let err = build_export_on(&mut store, None, &Settings::default(), &mut proceed, date()).unwrap_err();
    assert!(matches!(err, GtruthError::ExportAborted(_)));
}

#[test]
fn declined_prompt_aborts_export() {
    let mut store = AnnotationStore::default();
    store.push(BoxKind::Bar, Rect::new(10.0, 400.0, 30.0, 80.0));
    store.push(BoxKind::Staff, Rect::new(0.0, 0.0, 300.0, 100.0));

    let info = image_info();
    let err = build_export_on(&mut store, Some(&info), &Settings::default(), &mut Strict, date())
        .unwrap_err();
    assert!(matches!(err, GtruthError::ExportAborted(_)));
}

#[test]
fn prompt_sees_the_unnumbered_bars() {
    let mut store = AnnotationStore::default();
    store.push(BoxKind::Bar, Rect::new(10.0, 10.0, 30.0, 80.0));
    store.push(BoxKind::Bar, Rect::new(10.0, 400.0, 30.0, 80.0));
    store.push(BoxKind::Staff, Rect::new(0.0, 0.0, 300.0, 100.0));

    let mut seen = Vec::new();
    let mut prompt = |unnumbered: &[usize]| {
        seen.extend_from_slice(unnumbered);
        true
    };
    let info = image_info();
    let export = build_export_on(&mut store, Some(&info), &Settings::default(), &mut prompt, date())
        .unwrap();
    assert_eq!(seen, vec![1]);
    assert_eq!(export.document.measures().len(), 2);
    assert_eq!(store.bars()[0].number, Some(1));
}

#[test]
fn complete_numbering_never_prompts() {
    let (bars, staves) = two_staff_page();
    let mut store = AnnotationStore::default();
    store.extend(BoxKind::Bar, bars);
    store.extend(BoxKind::Staff, staves);

    let info = image_info();
    let export = build_export_on(&mut store, Some(&info), &Settings::default(), &mut Strict, date())
        .unwrap();
    assert_eq!(export.numbering.order, vec![2, 0, 1]);
}

#[test]
fn write_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mei_path = dir.path().join("page1_boxes.mei");

    let (mut bars, staves) = two_staff_page();
    let numbering = number_measures(&mut bars, &staves);
    let doc = build_mei(&bars, numbering.export_order(), &image_info(), &Settings::default(), date());

    let report = write_export(&doc, &mei_path, "bar 3 is smudged").unwrap();
    assert_eq!(report.measures, 3);
    assert_eq!(report.notes_path, dir.path().join("page1_boxes.txt"));
    assert_eq!(notes_path(&mei_path), report.notes_path);
    assert_eq!(
        std::fs::read_to_string(&report.notes_path).unwrap(),
        "bar 3 is smudged"
    );

    let loaded = parse_mei_file(&mei_path).unwrap();
    let numbers: Vec<_> = loaded.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(loaded[2].bbox(), (5.0, 210.0, 40.0, 80.0));
}

// ─── Loading boxes ───────────────────────────────────────────────────

const ZONE_AND_MEASURE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<mei xmlns="http://www.music-encoding.org/ns/mei" meiversion="2013">
  <music>
    <facsimile>
      <surface>
        <zone xml:id="z1" ulx="10" uly="20" lrx="110" lry="220"/>
        <zone xml:id="z2" ulx="120" uly="20" lrx="200" lry="220"/>
      </surface>
    </facsimile>
    <body><mdiv><score><section>
      <measure xml:id="m1" n="7" facs="#z1"/>
      <measure xml:id="m2" facs="#z2"/>
    </section></score></mdiv></body>
  </music>
</mei>"##;

#[test]
fn load_converts_corners_to_size() {
    let rects = parse_mei(ZONE_AND_MEASURE).unwrap();
    assert_eq!(
        rects,
        vec![
            Rect::new(10.0, 20.0, 100.0, 200.0).with_number(7),
            Rect::new(120.0, 20.0, 80.0, 200.0),
        ]
    );
}

#[test]
fn load_fails_on_missing_zone() {
    let xml = ZONE_AND_MEASURE.replace("facs=\"#z2\"", "facs=\"#nowhere\"");
    assert!(matches!(parse_mei(&xml), Err(GtruthError::MalformedBoxes(_))));
}

#[test]
fn load_fails_on_non_numeric_coordinate() {
    let xml = ZONE_AND_MEASURE.replace("lrx=\"200\"", "lrx=\"wide\"");
    assert!(matches!(parse_mei(&xml), Err(GtruthError::MalformedBoxes(_))));
}

#[test]
fn load_fails_on_inverted_zone() {
    let xml = ZONE_AND_MEASURE.replace("lrx=\"110\"", "lrx=\"5\"");
    assert!(matches!(parse_mei(&xml), Err(GtruthError::MalformedBoxes(_))));
}

#[test]
fn load_rejects_other_roots_and_bad_xml() {
    assert!(matches!(
        parse_mei("<score><measure facs=\"#a\"/></score>"),
        Err(GtruthError::MalformedBoxes(_))
    ));
    assert!(matches!(parse_mei("<mei><zone"), Err(GtruthError::Xml(_))));
}

#[test]
fn load_rejects_non_mei_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boxes.xml");
    std::fs::write(&path, ZONE_AND_MEASURE).unwrap();
    assert!(matches!(
        parse_mei_file(&path),
        Err(GtruthError::WrongFileType { expected: "MEI", .. })
    ));
}

#[test]
fn load_of_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        parse_mei_file(dir.path().join("gone.mei")),
        Err(GtruthError::Io { .. })
    ));
}

#[test]
fn failed_notes_write_leaves_no_mei() {
    let dir = tempfile::tempdir().unwrap();
    let mei_path = dir.path().join("out.mei");
    // a directory where the notes file should go
    std::fs::create_dir(dir.path().join("out.txt")).unwrap();

    let doc = build_mei(&[], [], &image_info(), &Settings::default(), date());
    assert!(matches!(
        write_export(&doc, &mei_path, "notes"),
        Err(GtruthError::Io { .. })
    ));
    assert!(!mei_path.exists());
}

#[test]
fn failed_mei_write_removes_the_notes() {
    let dir = tempfile::tempdir().unwrap();
    let mei_path = dir.path().join("out.mei");
    std::fs::create_dir(&mei_path).unwrap();

    let doc = build_mei(&[], [], &image_info(), &Settings::default(), date());
    assert!(write_export(&doc, &mei_path, "notes").is_err());
    assert!(!dir.path().join("out.txt").exists());
}
