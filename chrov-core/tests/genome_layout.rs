use chrov_core::concat::concat_chroms;
use chrov_core::polar::{sub_range, AngularRange};
use chrov_core::types::validate_cytobands;
use chrov_core::{Chrom, Cytoband, CytobandReader, GenomeLayout, Locus};
use std::io::Cursor;

fn demo_cytobands() -> Vec<Cytoband> {
    vec![
        Cytoband::new("X", 0, 300, "p11", "gneg"),
        Cytoband::new("X", 300, 600, "q11", "gpos50"),
        Cytoband::new("1", 0, 400, "p11", "gneg"),
        Cytoband::new("1", 400, 450, "p10", "acen"),
        Cytoband::new("1", 450, 1000, "q11", "gpos75"),
        Cytoband::new("2", 0, 1000, "q11", "gneg"),
    ]
}

#[test]
fn concatenated_chromosomes_are_contiguous() {
    let _ = env_logger::builder().is_test(true).try_init();
    let bands = demo_cytobands();
    validate_cytobands(&bands).expect("valid cytobands");

    let (layout, placed) = concat_chroms(&bands, None).expect("concatenate");
    let names: Vec<&str> = layout.spans().iter().map(|s| s.chromosome.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "X"]);

    for pair in layout.spans().windows(2) {
        assert_eq!(pair[0].end + 1, pair[1].start);
    }
    let two = layout.span(&Chrom::new("2")).unwrap();
    assert_eq!((two.start, two.end), (1001, 2000));
    assert_eq!(layout.total_length(), 2600);

    // rows come back in chromosome order with shifted coordinates
    assert_eq!(placed.first().unwrap().chromosome().as_str(), "1");
    assert_eq!(placed.last().unwrap().end, 2600);
}

#[test]
fn loci_reuse_reference_genome_ends() {
    let reference = GenomeLayout::from_intervals(&demo_cytobands(), None).unwrap();
    let layout = GenomeLayout::from_genome_ends(reference.genome_ends()).unwrap();
    let loci = vec![Locus::point("X", 10).with_label("A"), Locus::point("1", 500).with_label("B")];
    let placed = layout.place(&loci).unwrap();
    assert_eq!(placed[0].row.label.as_deref(), Some("B"));
    assert_eq!(placed[0].start, 500);
    assert_eq!(placed[1].start, 2010);
}

#[test]
fn layout_round_trips_through_json() {
    let layout = GenomeLayout::from_intervals(&demo_cytobands(), None).unwrap();
    let json = serde_json::to_string(&layout).unwrap();
    let back: GenomeLayout = serde_json::from_str(&json).unwrap();
    assert_eq!(back.span(&Chrom::new("X")).unwrap().start, 2001);
}

#[test]
fn arm_angles_are_proportional_to_length() {
    let layout = GenomeLayout::from_intervals(&demo_cytobands(), None).unwrap();
    let total = (1.0, layout.total_length() as f64);
    let circle = AngularRange::default();
    let one = layout.span(&Chrom::new("1")).unwrap();
    let x = layout.span(&Chrom::new("X")).unwrap();
    let a1 = sub_range((one.start as f64, one.end as f64), total, circle);
    let ax = sub_range((x.start as f64, x.end as f64), total, circle);
    let ratio = a1.span() / ax.span();
    assert!((ratio - 1000.0 / 600.0).abs() < 0.01, "ratio {}", ratio);
}

#[test]
fn reader_output_feeds_the_layout() {
    let text = "chr2\t0\t1000\tp1\tgneg\nchr1\t0\t1000\tp1\tgneg\n";
    let bands = CytobandReader::new(Cursor::new(text)).read_all().unwrap();
    let layout = GenomeLayout::from_intervals(&bands, Some(&[Chrom::new("2")])).unwrap();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout.span(&Chrom::new("2")).unwrap().start, 1);
}
