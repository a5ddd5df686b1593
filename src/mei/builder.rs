//! Builds the MEI tree from numbered bar boxes.

use chrono::NaiveDate;

use super::{IdGen, MeiDocument, MeiElement};
use crate::config::Settings;
use crate::constants::MEI_NAMESPACE;
use crate::model::Rect;
use crate::scan::ImageInfo;

/// Build the document for `bars`, emitting one zone/measure pair per index
/// of `order`, in that order.
pub fn build_mei(
    bars: &[Rect],
    order: impl IntoIterator<Item = usize>,
    image: &ImageInfo,
    settings: &Settings,
    date: NaiveDate,
) -> MeiDocument {
    let mut ids = IdGen::default();

    let mut mei = ids
        .element("mei")
        .with_attribute("xmlns", MEI_NAMESPACE)
        .with_attribute("meiversion", settings.mei_version.as_str());

    mei.add_child(create_header(&mut ids, settings, date));

    let mut surface = ids.element("surface");
    surface.add_child(create_graphic(&mut ids, image));
    let mut section = ids.element("section");

    for index in order {
        let Some(bar) = bars.get(index) else {
            continue;
        };
        let zone = create_zone(&mut ids, bar);
        section.add_child(create_measure(&mut ids, bar.number, &zone.id));
        surface.add_child(zone);
    }

    let facsimile = ids.element("facsimile").with_child(surface);
    let score = ids
        .element("score")
        .with_child(ids.element("scoreDef"))
        .with_child(section);
    let body = ids
        .element("body")
        .with_child(ids.element("mdiv").with_child(score));
    let music = ids.element("music").with_child(facsimile).with_child(body);
    mei.add_child(music);

    MeiDocument { root: mei }
}

// ─── Header ──────────────────────────────────────────────────────────

fn corp_resp(ids: &mut IdGen, settings: &Settings) -> MeiElement {
    ids.element("respStmt")
        .with_child(ids.element("corpName").with_value(settings.corp_name.as_str()))
}

fn create_header(ids: &mut IdGen, settings: &Settings, date: NaiveDate) -> MeiElement {
    let mut mei_head = ids.element("meiHead");

    // file description
    let title_stmt = ids
        .element("titleStmt")
        .with_child(ids.element("title"))
        .with_child(corp_resp(ids, settings));
    let pub_stmt = ids.element("pubStmt").with_child(corp_resp(ids, settings));
    mei_head.add_child(
        ids.element("fileDesc")
            .with_child(title_stmt)
            .with_child(pub_stmt),
    );

    // encoding description
    let application = ids
        .element("application")
        .with_attribute("version", settings.app_version.as_str())
        .with_child(ids.element("name").with_value(settings.app_name.as_str()))
        .with_child(
            ids.element("ptr")
                .with_attribute("target", settings.app_link.as_str()),
        );
    let application_id = application.id.clone();
    mei_head.add_child(
        ids.element("encodingDesc")
            .with_child(ids.element("appInfo").with_child(application)),
    );

    // revision description
    let reference = ids
        .element("ref")
        .with_attribute("target", format!("#{application_id}"))
        .with_value(settings.app_name.as_str())
        .with_tail(".");
    let paragraph = ids
        .element("p")
        .with_value("Encoded using ")
        .with_child(reference);
    let change = ids
        .element("change")
        .with_attribute("n", "1")
        .with_child(corp_resp(ids, settings))
        .with_child(ids.element("changeDesc").with_child(paragraph))
        .with_child(ids.element("date").with_value(date.format("%Y-%m-%d").to_string()));
    mei_head.add_child(ids.element("revisionDesc").with_child(change));

    mei_head
}

// ─── Facsimile ───────────────────────────────────────────────────────

fn create_graphic(ids: &mut IdGen, image: &ImageInfo) -> MeiElement {
    ids.element("graphic")
        .with_attribute("height", image.height.to_string())
        .with_attribute("width", image.width.to_string())
        .with_attribute("target", image.path.display().to_string())
        .with_attribute("resolution", image.dpi.to_string())
        .with_attribute("unit", "px")
}

fn create_zone(ids: &mut IdGen, bar: &Rect) -> MeiElement {
    ids.element("zone")
        .with_attribute("ulx", pixel(bar.position.x))
        .with_attribute("uly", pixel(bar.position.y))
        .with_attribute("lrx", pixel(bar.right()))
        .with_attribute("lry", pixel(bar.bottom()))
}

fn create_measure(ids: &mut IdGen, number: Option<u32>, zone_id: &str) -> MeiElement {
    let mut measure = ids.element("measure");
    if let Some(n) = number {
        measure.add_attribute("n", n.to_string());
    }
    measure.add_attribute("facs", format!("#{zone_id}"));
    measure
}

fn pixel(v: f64) -> String {
    format!("{}", v.round() as i64)
}
