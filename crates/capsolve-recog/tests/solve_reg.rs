//! End-to-end solve regression test
//!
//! Captures are synthesized over a noisy baseline. Reference tables are
//! built from the features of the synthetic glyphs themselves, so an
//! undisturbed glyph matches its own entry at distance 0 and every other
//! entry at distance 8 or more.
//!
//! Tests:
//!   1. six clean glyphs are read from the first (bold) table
//!   2. an ambiguous third glyph in bold retries the whole image in slim
//!   3. ambiguous in both tables gives the two characters before it
//!   4. five glyphs are read completely but reported as the wrong length
//!   5. results never exceed six characters and only use table characters
//!   6. color captures and encoded captures read the same as gray ones

use capsolve_core::{ImageFormat, Pix};
use capsolve_recog::features::Feature;
use capsolve_recog::solver::evaluate;
use capsolve_recog::{
    FeatureVector, RecogError, ReferenceTable, ReferenceTables, ResultKind, SolveResult, Solver,
    SolverParams,
};
use capsolve_test::RegParams;
use capsolve_test::synth::{self, ALPHABET};
use rand::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Table over the whole synthetic alphabet, relabeled through `label`.
fn alphabet_table(name: &str, baseline: &Pix, label: impl Fn(char) -> char) -> ReferenceTable {
    let image = synth::render_code(baseline, ALPHABET, 99).unwrap();
    let features = evaluate(&image, baseline, &SolverParams::default()).unwrap();
    assert_eq!(features.len(), ALPHABET.len());
    ALPHABET
        .chars()
        .zip(features)
        .fold(ReferenceTable::new(name), |t, (ch, f)| t.with_entry(label(ch), f))
}

/// Copy of `f` whose weighted distance to `f` is 2.
fn decoy(f: &FeatureVector) -> FeatureVector {
    let mut v = *f.values();
    v[Feature::Overall as usize] += 2.0;
    FeatureVector::new(v)
}

fn with_decoy(table: ReferenceTable, of: char, decoy_ch: char) -> ReferenceTable {
    let near = decoy(table.get(of).unwrap());
    table.with_entry(decoy_ch, near)
}

#[test]
fn solve_reg() {
    init_logger();
    let mut rp = RegParams::new("solve");

    let baseline = synth::baseline(5).unwrap();
    let bold = alphabet_table("bold", &baseline, |c| c);
    let slim = alphabet_table("slim", &baseline, |c| c.to_ascii_lowercase());
    let params = SolverParams::default();

    let solver = Solver::new(
        baseline.clone(),
        ReferenceTables::bold_slim(bold.clone(), slim.clone()),
        params.clone(),
    )
    .unwrap();

    // 1. all six glyphs confident in bold
    let capture = synth::render_code(&baseline, "ABCDEF", 1).unwrap();
    rp.write_pix(&capture, ImageFormat::Png).unwrap();
    rp.write_pix(&solver.clean(&capture).unwrap(), ImageFormat::Png).unwrap();
    let report = solver.solve_pix(&capture).unwrap();
    rp.compare_strings(b"ABCDEF", report.result.text().as_bytes());
    rp.compare_values(1.0, report.result.is_success() as u8 as f64, 0.0);
    rp.compare_strings(b"bold", report.table.as_bytes());
    rp.compare_values(1.0, report.attempts as f64, 0.0);

    // 2. third glyph ambiguous in bold, resolved by slim
    let ambiguous_bold = with_decoy(bold.clone(), 'C', 'Z');
    let solver2 = Solver::new(
        baseline.clone(),
        ReferenceTables::bold_slim(ambiguous_bold.clone(), slim.clone()),
        params.clone(),
    )
    .unwrap();
    let report = solver2.solve_pix(&capture).unwrap();
    let expected = SolveResult::Success {
        text: "abcdef".into(),
    };
    rp.compare_values(1.0, (report.result == expected) as u8 as f64, 0.0);
    rp.compare_strings(b"slim", report.table.as_bytes());
    rp.compare_values(2.0, report.attempts as f64, 0.0);

    // 3. ambiguous in both tables
    let ambiguous_slim = with_decoy(slim.clone(), 'c', 'z');
    let solver3 = Solver::new(
        baseline.clone(),
        ReferenceTables::bold_slim(ambiguous_bold, ambiguous_slim),
        params.clone(),
    )
    .unwrap();
    let report = solver3.solve_pix(&capture).unwrap();
    rp.compare_values(
        1.0,
        (report.result.kind() == ResultKind::LowConfidence) as u8 as f64,
        0.0,
    );
    rp.compare_strings(b"ab", report.result.text().as_bytes());

    // 4. five glyphs
    let short = synth::render_code(&baseline, "GHJKA", 2).unwrap();
    let report = solver.solve_pix(&short).unwrap();
    let expected = SolveResult::InvalidLength {
        partial_text: "GHJKA".into(),
    };
    rp.compare_values(1.0, (report.result == expected) as u8 as f64, 0.0);
    rp.compare_strings(b"bold", report.table.as_bytes());

    // 5. length and alphabet bounds over random captures
    let mut rng = StdRng::seed_from_u64(77);
    let alphabet: Vec<char> = ALPHABET.chars().collect();
    for seed in 0..40 {
        let len: usize = rng.random_range(0..=9);
        let code: String = (0..len)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect();
        let capture = synth::render_code(&baseline, &code, 100 + seed).unwrap();
        let report = solver2.solve_pix(&capture).unwrap();
        let text = report.result.text();
        rp.compare_values(1.0, (text.chars().count() <= 6) as u8 as f64, 0.0);
        let table = solver2.tables().get(&report.table).unwrap();
        rp.compare_values(
            1.0,
            text.chars().all(|c| table.get(c).is_some()) as u8 as f64,
            0.0,
        );
        rp.compare_values(len as f64, report.glyphs as f64, 0.0);
        if len == 6 && !code.contains('C') {
            rp.compare_strings(code.as_bytes(), text.as_bytes());
        }
    }

    // 6. color and encoded input
    let capture = synth::render_code(&baseline, "KJHGFE", 3).unwrap();
    let color = synth::to_rgb(&capture).unwrap();
    let report = solver.solve_pix(&color).unwrap();
    rp.compare_strings(b"KJHGFE", report.result.text().as_bytes());

    let png = capsolve_io::write_image_mem(&capture, ImageFormat::Png).unwrap();
    let report = solver.solve_bytes(&png).unwrap();
    rp.compare_strings(b"KJHGFE", report.result.text().as_bytes());

    let pnm = capsolve_io::write_image_mem(&color, ImageFormat::Pnm).unwrap();
    let report = solver.solve_bytes(&pnm).unwrap();
    rp.compare_strings(b"KJHGFE", report.result.text().as_bytes());

    assert!(rp.cleanup(), "solve regression test failed");
}

#[test]
fn solve_errors_reg() {
    init_logger();
    let mut rp = RegParams::new("solve_errors");

    let baseline = synth::baseline(6).unwrap();
    let bold = alphabet_table("bold", &baseline, |c| c);
    let solver = Solver::new(
        baseline.clone(),
        ReferenceTables::new().with_table(bold),
        SolverParams::default(),
    )
    .unwrap();

    // wrong capture size
    let small = Pix::new(200, 80, capsolve_core::PixelDepth::Bit8).unwrap();
    rp.compare_values(
        1.0,
        matches!(solver.solve_pix(&small), Err(RecogError::SizeMismatch { .. })) as u8 as f64,
        0.0,
    );

    // undecodable bytes
    rp.compare_values(
        1.0,
        matches!(solver.solve_bytes(b"P7 nope"), Err(RecogError::Decode { .. })) as u8 as f64,
        0.0,
    );

    // the same capture always gives the same report
    let capture = synth::render_code(&baseline, "ABCDEF", 4).unwrap();
    let first = solver.solve_pix(&capture).unwrap();
    let second = solver.solve_pix(&capture).unwrap();
    rp.compare_values(1.0, (first == second) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "solve error regression test failed");
}
