use criterion::{black_box, criterion_group, criterion_main, Criterion};

use autoreels::domain::rules::{ChunkSelector, EngagementScorer};
use autoreels::subtitles::{format_srt, parse_srt};
use autoreels::{Chunk, ChunkScore, TranscriptSegment};

fn transcript(segments: usize) -> Vec<TranscriptSegment> {
    (0..segments)
        .map(|i| {
            let start = i as f64 * 1.9;
            TranscriptSegment::new(start, start + 1.8, "so this is the part where it gets interesting")
        })
        .collect()
}

fn bench_score_segments(c: &mut Criterion) {
    let segments = transcript(12);
    c.bench_function("score_segments_12", |b| {
        b.iter(|| EngagementScorer::score_segments(black_box(&segments)))
    });
}

fn bench_parse_srt(c: &mut Criterion) {
    let content = format_srt(&transcript(200));
    c.bench_function("parse_srt_200_blocks", |b| b.iter(|| parse_srt(black_box(&content))));
}

fn bench_pick_top(c: &mut Criterion) {
    let scores: Vec<ChunkScore> = (0..1000u32)
        .map(|i| ChunkScore {
            chunk: Chunk::new(i, format!("chunk_{:03}.mp4", i), 20),
            subtitle_path: None,
            score: (i * 7919) % 101,
            word_count: 0,
            duration: 0.0,
        })
        .collect();
    c.bench_function("pick_top_3_of_1000", |b| {
        b.iter(|| ChunkSelector::pick_top(black_box(&scores), 3))
    });
}

criterion_group!(benches, bench_score_segments, bench_parse_srt, bench_pick_top);
criterion_main!(benches);
