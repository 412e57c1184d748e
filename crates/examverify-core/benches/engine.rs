use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examverify_core::classify::compare_answers;
use examverify_core::config::{Thresholds, VerifierConfig};
use examverify_core::engine::{NoopReporter, Verifier};
use examverify_core::model::{AnswerShape, Exam, GraphDescriptor, QuestionSlot, Section};
use examverify_core::normalize::normalize_prompt;

fn make_exam(index: usize) -> Exam {
    let slots = (1..=15u8)
        .map(|position| {
            let base = (index * 17 + usize::from(position) * 3) as f64;
            let answers = match position {
                5 | 7 => vec![base, -base],
                9 => vec![base, base + 4.0],
                4..=10 => vec![base],
                _ => vec![],
            };
            QuestionSlot {
                position,
                section: match position {
                    1..=3 => Section::A,
                    4..=10 => Section::B,
                    11..=13 => Section::C,
                    _ => Section::D,
                },
                kind: "bench".into(),
                prompt: format!(r"\(\frac{{{index}}}{{x-{position}}} = {base}\)"),
                answers: AnswerShape::classify(&answers, 0.01),
                choice: None,
                graph: (11..=13).contains(&position).then(|| GraphDescriptor {
                    expression: if index % 2 == 0 {
                        format!("(x-{index})^2+{position}")
                    } else {
                        format!("-(x-{index})^2+{position}")
                    },
                    key_point: None,
                }),
                context: None,
            }
        })
        .collect();

    Exam {
        id: format!("exam-{index:02}"),
        title: String::new(),
        source: format!("exam-{index:02}.json").into(),
        is_reference: index == 0,
        slots,
    }
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let verifier = Verifier::new(VerifierConfig::default());

    for count in [5usize, 30] {
        let exams: Vec<Exam> = (0..count).map(make_exam).collect();
        group.bench_function(format!("{count}_exams"), |b| {
            b.iter(|| verifier.run(black_box(&exams), &NoopReporter))
        });
    }

    group.finish();
}

fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    let thresholds = Thresholds::default();
    let pm_a = AnswerShape::classify(&[3.0, -3.0], 0.01);
    let pm_b = AnswerShape::classify(&[-3.0, 3.0], 0.01);
    let set_a = AnswerShape::classify(&[1.0, 5.0, 9.0], 0.01);
    let set_b = AnswerShape::classify(&[9.0, 1.0, 5.0], 0.01);

    group.bench_function("plus_minus", |b| {
        b.iter(|| compare_answers(black_box(&pm_a), black_box(&pm_b), &thresholds))
    });
    group.bench_function("sorted_set", |b| {
        b.iter(|| compare_answers(black_box(&set_a), black_box(&set_b), &thresholds))
    });
    group.bench_function("normalize_prompt", |b| {
        b.iter(|| normalize_prompt(black_box(r"<p>Solve \( \left(x - 1\right)^{2} \, = 9 \)</p>")))
    });

    group.finish();
}

criterion_group!(benches, bench_engine, bench_classifier);
criterion_main!(benches);
