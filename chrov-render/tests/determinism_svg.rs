use chrov_core::{Cytoband, Locus};
use chrov_render::config::FigureConfig;
use chrov_render::figure::plot_with_chroms;
use chrov_render::scene::Figure;
use chrov_render::vector_export::{ExportConfig, SvgExporter};

fn demo_cytobands() -> Vec<Cytoband> {
    vec![
        Cytoband::new("1", 0, 2_300_000, "p36.33", "gneg"),
        Cytoband::new("1", 2_300_000, 5_300_000, "p36.32", "gpos25"),
        Cytoband::new("1", 5_300_000, 7_100_000, "p11", "acen"),
        Cytoband::new("1", 7_100_000, 9_100_000, "q11", "acen"),
        Cytoband::new("1", 9_100_000, 12_500_000, "q12", "gpos50"),
        Cytoband::new("2", 0, 4_400_000, "p25.3", "gneg"),
        Cytoband::new("2", 4_400_000, 6_900_000, "p11", "acen"),
        Cytoband::new("2", 6_900_000, 9_000_000, "q11", "gvar"),
    ]
}

fn demo_loci() -> Vec<Locus> {
    vec![
        Locus::point("1", 1_000_000).with_label("TP73").with_value(3.5),
        Locus::point("1", 10_000_000).with_label("NRAS").with_value(1.2),
        Locus::point("2", 5_000_000).with_label("MYCN").with_value(4.8),
    ]
}

fn render(config: &FigureConfig) -> Figure {
    let mut fig = Figure::new(800.0, 600.0);
    plot_with_chroms(&mut fig, &demo_loci(), &demo_cytobands(), config, None).unwrap();
    fig
}

#[test]
fn svg_export_is_deterministic() {
    let _ = env_logger::builder().is_test(true).try_init();
    let cfg = ExportConfig {
        show_footer: false, // disable dynamic timestamp
        title: Some("Determinism Test".into()),
        ..ExportConfig::default()
    };
    let exporter = SvgExporter::new(cfg);

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");

    for config in [FigureConfig::default(), FigureConfig { arc: false, ..FigureConfig::default() }] {
        exporter.export_svg(&f1, &render(&config)).unwrap();
        exporter.export_svg(&f2, &render(&config)).unwrap();

        let b1 = std::fs::read(&f1).unwrap();
        let b2 = std::fs::read(&f2).unwrap();
        assert_eq!(b1, b2, "SVG bytes differ between identical renders");
    }
}

#[test]
fn svg_contains_every_label() {
    let svg = SvgExporter::new(ExportConfig { show_footer: false, ..ExportConfig::default() })
        .to_svg_string(&render(&FigureConfig::default()));
    for label in ["TP73", "NRAS", "MYCN"] {
        assert!(svg.contains(label), "missing {label}");
    }
}
