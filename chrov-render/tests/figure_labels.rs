use chrov_core::{Cytoband, Locus};
use chrov_render::annot::LabelLoc;
use chrov_render::config::{FigureConfig, LabelConfig};
use chrov_render::figure::{plot_with_chroms, plot_with_genome, XKind};
use chrov_render::scene::{Artist, Figure};

fn cytobands() -> Vec<Cytoband> {
    vec![
        Cytoband::new("1", 0, 400, "p11", "gneg"),
        Cytoband::new("1", 400, 500, "p10", "acen"),
        Cytoband::new("1", 500, 1000, "q11", "gpos75"),
        Cytoband::new("2", 0, 600, "p11", "gpos25"),
        Cytoband::new("2", 600, 800, "q11", "gneg"),
    ]
}

fn linear() -> FigureConfig {
    FigureConfig { arc: false, ..FigureConfig::default() }
}

#[test]
fn single_gene_gets_one_label_on_its_chromosome() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut fig = Figure::default();
    let data = vec![Locus::point("1", 500).with_label("GENE").with_value(2.0)];
    let axes = plot_with_chroms(&mut fig, &data, &cytobands(), &linear(), None).unwrap();

    let chrom_axes = fig.axes(axes.chrom).unwrap();
    let labels: Vec<(f64, f64, &str)> = chrom_axes.texts().filter(|(_, _, t)| *t == "GENE").collect();
    assert_eq!(labels.len(), 1);
    let chrom1 = &axes.layout.chromosomes[0];
    assert_eq!(chrom1.chromosome.as_str(), "1");
    assert!(labels[0].0 >= chrom1.start && labels[0].0 <= chrom1.end);
    assert_eq!(fig.texts().iter().filter(|t| **t == "GENE").count(), 1);
}

#[test]
fn polar_figure_places_labels_on_the_circle() {
    let mut fig = Figure::default();
    let data = vec![
        Locus::point("1", 100).with_label("A").with_value(1.0),
        Locus::point("2", 300).with_label("B").with_value(2.0),
    ];
    let axes = plot_with_genome(&mut fig, &data, &cytobands(), &FigureConfig::default(), None).unwrap();
    assert!(fig.axes(axes.chrom).unwrap().is_polar());
    assert!(fig.axes(axes.data).unwrap().is_polar());
    assert_eq!(axes.labels.len(), 2);
    for anchor in &axes.labels {
        assert!(anchor.label_x >= 0.0 && anchor.label_x <= 2.0 * std::f64::consts::PI);
    }
    let label_texts = fig
        .axes(axes.chrom)
        .unwrap()
        .artists
        .iter()
        .filter(|a| matches!(a, Artist::Text { text, .. } if text == "A" || text == "B"))
        .count();
    assert_eq!(label_texts, 2);
}

#[test]
fn group_mode_requires_x_values() {
    let mut fig = Figure::default();
    let data = vec![Locus::point("1", 100).with_label("A").with_value(1.0)];
    let config = FigureConfig { xkind: XKind::Group, ..linear() };
    let err = plot_with_chroms(&mut fig, &data, &cytobands(), &config, None).unwrap_err();
    assert!(err.is_invalid_data());

    let mut fig = Figure::default();
    let data = vec![
        Locus::point("1", 100).with_label("A").with_value(1.0).with_x(2.0),
        Locus::point("2", 50).with_label("B").with_value(1.0).with_x(1.0),
    ];
    let axes = plot_with_chroms(&mut fig, &data, &cytobands(), &config, None).unwrap();
    // anchors follow the genomic order, not the x order
    let names: Vec<&str> = axes.labels.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn inner_labels_sit_below_the_chromosomes() {
    let mut fig = Figure::default();
    let data = vec![Locus::point("1", 700).with_label("IN").with_value(1.0)];
    let config = FigureConfig {
        labels: LabelConfig { loc: LabelLoc::In, ..LabelConfig::default() },
        ..linear()
    };
    let axes = plot_with_chroms(&mut fig, &data, &cytobands(), &config, None).unwrap();
    let (_, y, _) = fig.axes(axes.chrom).unwrap().texts().find(|(_, _, t)| *t == "IN").unwrap();
    assert!(y < 0.0);
}

#[test]
fn layout_serializes_to_json() {
    let mut fig = Figure::default();
    let data = vec![Locus::point("2", 10).with_label("X").with_value(1.0)];
    let axes = plot_with_genome(&mut fig, &data, &cytobands(), &linear(), None).unwrap();
    let json = serde_json::to_string(&axes.layout).unwrap();
    let back: chrov_render::chrom::ChromsLayout = serde_json::from_str(&json).unwrap();
    assert_eq!(back, axes.layout);
}
