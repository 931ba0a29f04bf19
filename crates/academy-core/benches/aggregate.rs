use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use academy_core::aggregate::{level_pct, level_summary};
use academy_core::key::ModuleKey;
use academy_core::model::{Chapter, Level, Subject};
use academy_core::record::{ProgressMap, ProgressRecord};

fn make_level(chapters: usize, subjects: usize) -> Level {
    Level {
        key: "Level 1".into(),
        chapters: (1..=chapters)
            .map(|c| Chapter {
                id: c.to_string(),
                title: format!("Chapter {c}"),
                mandatory: c <= 2,
                subjects: (1..=subjects)
                    .map(|s| Subject {
                        id: format!("s{s}"),
                        title: format!("Subject {s}"),
                        minutes: Some(8),
                        video_ref: None,
                        quiz_ref: Some(format!("quiz-{c}-{s}")),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn make_progress(level: &Level) -> ProgressMap {
    let mut progress = ProgressMap::new();
    for (i, chapter) in level.chapters.iter().enumerate() {
        for (j, subject) in chapter.subjects.iter().enumerate() {
            let key = ModuleKey::new(&level.key, &chapter.id, &subject.id);
            let mut rec = ProgressRecord::new(key.clone(), Utc::now());
            rec.watched = true;
            rec.pct = (((i * 37 + j * 13) % 101) as u8).min(100);
            progress.insert(key.code(), rec);
        }
    }
    progress
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    let level = make_level(8, 6);
    let progress = make_progress(&level);
    group.bench_function("level_pct 8x6", |b| {
        b.iter(|| level_pct(black_box(&progress), black_box(&level)))
    });

    let big = make_level(40, 25);
    let big_progress = make_progress(&big);
    group.bench_function("level_summary 40x25", |b| {
        b.iter(|| level_summary(black_box(&big_progress), black_box(&big)))
    });

    group.finish();
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
