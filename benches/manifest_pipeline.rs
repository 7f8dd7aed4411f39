//! Benchmark the manifest-to-playlist pipeline on a synthetic manifest.
//!
//! Measures JSON parsing (including init segment decoding), ranking, and
//! rendering of the full playlist set into memory. No network or disk I/O.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use segmux::hls::{MemorySink, write_playlists};
use segmux::manifest::parse_manifest;
use segmux::rank::rank;
use serde_json::{Value, json};
use url::Url;

const SEGMENTS: usize = 900;

fn segments() -> Vec<Value> {
    (0..SEGMENTS)
        .map(|i| {
            let start = i as f64 * 4.0;
            json!({ "start": start, "end": start + 4.0, "url": format!("segment-{i}.m4s") })
        })
        .collect()
}

fn synthetic_manifest() -> String {
    let video: Vec<Value> = [(640, 360, 800_000), (1280, 720, 2_500_000), (1920, 1080, 5_000_000)]
        .iter()
        .map(|(w, h, bitrate)| {
            json!({
                "id": format!("v{h}"),
                "base_url": format!("video/{h}/"),
                "width": w,
                "height": h,
                "bitrate": bitrate,
                "avg_bitrate": bitrate * 9 / 10,
                "codecs": "avc1.640028",
                "init_segment": "AAAAGGZ0eXBpc281AAAAAWlzbzVkYXNo",
                "segments": segments(),
            })
        })
        .collect();

    let audio: Vec<Value> = [(64_000, 44_100), (128_000, 48_000)]
        .iter()
        .map(|(bitrate, rate)| {
            json!({
                "id": format!("a{bitrate}"),
                "base_url": format!("audio/{bitrate}/"),
                "bitrate": bitrate,
                "sample_rate": rate,
                "channels": 2,
                "init_segment": "AAAAGGZ0eXBpc281AAAAAWlzbzVkYXNo",
                "segments": segments(),
            })
        })
        .collect();

    json!({ "clip_id": "123456789", "base_url": "../", "video": video, "audio": audio })
        .to_string()
}

fn bench_manifest_pipeline(c: &mut Criterion) {
    let body = synthetic_manifest();
    let url = Url::parse("https://cdn.example.com/exp=1~hmac=abc/123/sep/video/playlist.json")
        .unwrap();
    let ranked = rank(parse_manifest(&body).unwrap());

    let mut group = c.benchmark_group("manifest_pipeline");

    group.bench_function("parse", |b| {
        b.iter(|| parse_manifest(black_box(&body)).unwrap());
    });

    group.bench_function("write_playlists", |b| {
        b.iter(|| {
            let mut sink = MemorySink::default();
            write_playlists(black_box(&ranked), &url, &mut sink).unwrap();
            sink
        });
    });

    group.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let manifest = rank(parse_manifest(black_box(&body)).unwrap());
            let mut sink = MemorySink::default();
            write_playlists(&manifest, &url, &mut sink).unwrap();
            sink
        });
    });

    group.finish();
}

criterion_group!(benches, bench_manifest_pipeline);
criterion_main!(benches);
