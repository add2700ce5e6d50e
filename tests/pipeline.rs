use std::path::PathBuf;

use paintshop::{
    BackendKind, ColorOption, CpuSurface, LiveryOption, OptionCatalog, PartOption, RenderOpts,
    RenderSurface, SurfacePool, Variant, enumerate_variants, filter_by_body, prepare_template,
    render_batch, variant_mutations,
};

const RAW_TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><g id="Coupe"><g id="Car"><rect width="8" height="4" style="fill:#123456"/></g><g id="Add-Ons"><g id="Spoiler"><rect y="4" width="2" height="2" style="fill:#123456"/></g></g><g id="Racing"><g id="Zone1"><rect x="2" y="4" width="2" height="2" style="fill:#123456"/></g><g id="Zone2"><rect x="4" y="4" width="2" height="2" style="fill:#123456"/></g></g><g id="Wheels"><g id="Shadow"><rect y="6" width="8" height="1" style="fill:#000000"/></g><g id="Sport"><rect y="7" width="4" height="1" style="fill:#123456"/></g><g id="Classic"><rect x="4" y="7" width="4" height="1" style="fill:#123456"/></g></g></g></svg>"#;

fn part(name: &str, identifier: &str) -> PartOption {
    PartOption {
        name: name.to_string(),
        identifier: identifier.to_string(),
    }
}

fn color(name: &str, value: &str) -> ColorOption {
    ColorOption {
        name: name.to_string(),
        identifier: name.to_lowercase(),
        value: value.to_string(),
    }
}

fn palette() -> Vec<ColorOption> {
    vec![
        color("Red", "#ff0000"),
        color("Green", "#00ff00"),
        color("Blue", "#0000ff"),
    ]
}

fn catalog() -> OptionCatalog {
    OptionCatalog {
        bodies: vec![part("Coupe", "coupe")],
        addons: vec![part("None", ""), part("Spoiler", "spoiler")],
        liveries: vec![LiveryOption {
            name: "Racing".to_string(),
            identifier: "racing".to_string(),
            color1_identifier: "zone1".to_string(),
            color2_identifier: "zone2".to_string(),
        }],
        car_colors: palette(),
        livery_colors1: palette(),
        livery_colors2: palette(),
        wheels: vec![part("Sport", "sport"), part("Classic", "classic")],
    }
}

fn prepared_template() -> String {
    let mut surface = CpuSurface::new();
    prepare_template(RAW_TEMPLATE, &catalog(), &mut surface).unwrap()
}

fn fresh_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn png_count(dir: &PathBuf) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .path()
                .extension()
                .is_some_and(|ext| ext == "png")
        })
        .count()
}

#[test]
fn prepared_template_is_an_all_off_baseline() {
    let prepared = prepared_template();
    let root = paintshop::dom::parse_markup(&prepared).unwrap();

    let body = root.find_id_prefix("coupe").unwrap();
    assert_eq!(body.style_property("display").as_deref(), Some("none"));

    let car_shape = root
        .find_id_prefix("car")
        .unwrap()
        .child_elements()
        .next()
        .unwrap();
    assert_eq!(car_shape.style_property("fill").as_deref(), Some("#fff"));

    for hidden in ["spoiler", "sport", "classic", "racing"] {
        let el = root.find_id_prefix(hidden).unwrap();
        assert_eq!(
            el.style_property("display").as_deref(),
            Some("none"),
            "{hidden} must start hidden"
        );
    }

    // Wheel shadows are not catalogued and stay visible.
    let shadow = root.find_id_prefix("shadow").unwrap();
    assert_eq!(shadow.style_property("display"), None);

    for zone in ["zone1", "zone2"] {
        let shape = root
            .find_id_prefix(zone)
            .unwrap()
            .child_elements()
            .next()
            .unwrap();
        assert_eq!(shape.style_property("fill").as_deref(), Some("#fff"));
    }
}

#[test]
fn render_run_is_idempotent_and_names_embed_every_option() {
    let template = prepared_template();
    let variants = enumerate_variants(&catalog());
    let filtered = filter_by_body(&variants, "Coupe");
    // 2 addons x 1 livery x 6 color permutations x 2 wheels.
    assert_eq!(filtered.len(), 24);

    let out_dir = fresh_dir("pipeline_idempotent");
    let pool = SurfacePool::new(BackendKind::Cpu);
    let opts = RenderOpts {
        chunk_size: 10,
        out_dir: out_dir.clone(),
        threads: None,
    };

    let first = render_batch(&filtered, &template, &pool, &opts).unwrap();
    assert_eq!(first.total, 24);
    assert_eq!(first.rendered, 24);
    assert_eq!(first.skipped, 0);
    assert_eq!(png_count(&out_dir), 24);

    // First variant: first valid color triple is (Red, Green, Blue).
    let expected = out_dir.join("1_Coupe_A-None_L-Racing_CC-Red_LC1-Green_LC2-Blue_W-Sport.png");
    assert!(expected.exists());

    // Second run performs zero renders and leaves the output set unchanged.
    let second = render_batch(&filtered, &template, &pool, &opts).unwrap();
    assert_eq!(second.total, 24);
    assert_eq!(second.rendered, 0);
    assert_eq!(second.skipped, 24);
    assert_eq!(png_count(&out_dir), 24);
}

#[test]
fn rendered_artifact_shows_selected_colors() {
    let template = prepared_template();
    let filtered = filter_by_body(&enumerate_variants(&catalog()), "Coupe");

    let out_dir = fresh_dir("pipeline_pixels");
    let pool = SurfacePool::new(BackendKind::Cpu);
    let opts = RenderOpts {
        chunk_size: 50,
        out_dir: out_dir.clone(),
        threads: None,
    };
    render_batch(&filtered[..1], &template, &pool, &opts).unwrap();

    let path = out_dir.join("1_Coupe_A-None_L-Racing_CC-Red_LC1-Green_LC2-Blue_W-Sport.png");
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (8, 8));
    // Car region is painted with the primary color.
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    // Livery zones carry the two livery colors.
    assert_eq!(img.get_pixel(2, 4).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(4, 4).0, [0, 0, 255, 255]);
    // The add-on is "None": its region stays hidden, transparent background.
    assert_eq!(img.get_pixel(0, 4).0[3], 0);
    // Classic wheels were not selected.
    assert_eq!(img.get_pixel(4, 7).0[3], 0);
}

#[test]
fn none_addon_applies_no_visibility_mutation() {
    let filtered = filter_by_body(&enumerate_variants(&catalog()), "Coupe");
    let none_variant = &filtered[0];
    assert_eq!(none_variant.addon.name, "None");

    let template = prepared_template();
    let mut surface = CpuSurface::new();
    surface.load(&template).unwrap();
    surface.apply(&variant_mutations(none_variant)).unwrap();

    let root = paintshop::dom::parse_markup(&surface.markup().unwrap()).unwrap();
    let spoiler = root.find_id_prefix("spoiler").unwrap();
    assert_eq!(spoiler.style_property("display").as_deref(), Some("none"));
}

#[test]
fn failing_chunk_does_not_stop_other_chunks() {
    let template = prepared_template();
    let filtered = filter_by_body(&enumerate_variants(&catalog()), "Coupe");

    let good = filtered[0].clone();
    let mut bad = filtered[1].clone();
    bad.livery.identifier = "missing".to_string();
    let variants: Vec<Variant> = vec![good, bad];

    let out_dir = fresh_dir("pipeline_chunk_failure");
    let pool = SurfacePool::new(BackendKind::Cpu);
    let opts = RenderOpts {
        chunk_size: 1,
        out_dir: out_dir.clone(),
        threads: None,
    };

    let err = render_batch(&variants, &template, &pool, &opts).unwrap_err();
    assert!(err.to_string().contains("mutation error:"));

    // The healthy chunk completed despite the failing one.
    assert_eq!(png_count(&out_dir), 1);
    assert!(
        out_dir
            .join("1_Coupe_A-None_L-Racing_CC-Red_LC1-Green_LC2-Blue_W-Sport.png")
            .exists()
    );
}
