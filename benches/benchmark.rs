//! Benchmarks for prompt rendering and form state.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scenecraft::{
    ensure_aspect_ratio, render_request, AspectRatio, Character, CharacterRegistry,
    GenerationRequest, SceneCharacter, SceneComposer, StructuredVideoRequest, StyleSet,
    TextToImageRequest,
};

fn cast(count: usize) -> Vec<SceneCharacter> {
    (0..count)
        .map(|i| {
            SceneCharacter::new(
                Character::new(i as i64, format!("Nhân vật {i}"))
                    .with_description("tóc đen dài, mặc áo dài truyền thống"),
            )
            .with_dialogue("Chào mọi người, hôm nay trời đẹp quá!")
        })
        .collect()
}

fn bench_render_structured_video(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_structured_video");
    for count in [0usize, 4, 32] {
        let request = GenerationRequest::StructuredVideo(StructuredVideoRequest {
            main_idea: "hai giáo viên nói chuyện trong phòng giáo viên".into(),
            setting: String::new(),
            styles: vec!["Hoạt hình".into(), "Điện ảnh".into()],
            characters: cast(count),
        });
        group.bench_with_input(BenchmarkId::from_parameter(count), &request, |b, request| {
            b.iter(|| black_box(render_request(request)))
        });
    }
    group.finish();
}

fn bench_render_text_to_image(c: &mut Criterion) {
    let request = GenerationRequest::TextToImage(TextToImageRequest {
        idea: "cô gái ngồi bên cửa sổ, trời đang mưa".into(),
        setting: "quán cà phê nhỏ".into(),
        styles: vec!["Hiện thực".into(), "3D Hoạt hình".into()],
        aspect_ratio: AspectRatio::Landscape,
        characters: cast(4),
    });
    c.bench_function("render_text_to_image", |b| {
        b.iter(|| black_box(render_request(&request)))
    });
}

fn bench_ensure_aspect_ratio(c: &mut Criterion) {
    let text = "A melancholic young woman sits by a tall window as raindrops stream down the \
                glass, soft cool light, photorealistic, cinematic lighting, 8K --ar 16:9,";
    c.bench_function("ensure_aspect_ratio", |b| {
        b.iter(|| black_box(ensure_aspect_ratio(black_box(text), AspectRatio::Landscape)))
    });
}

fn bench_style_toggle(c: &mut Criterion) {
    c.bench_function("style_toggle", |b| {
        let mut set = StyleSet::with_styles(["Hiện thực", "Điện ảnh", "Hoạt hình"]);
        let styles = ["Hiện thực", "Anime", "Điện ảnh", "Hoạt hình"];
        let mut i = 0usize;
        b.iter(|| {
            black_box(set.toggle(styles[i % styles.len()]));
            i += 1;
        })
    });
}

fn bench_build_request(c: &mut Criterion) {
    let mut registry = CharacterRegistry::new();
    let mut composer = SceneComposer::new();
    composer.set_main_idea("hai giáo viên nói chuyện");
    for i in 0..8 {
        if let Ok(character) = registry.add(&format!("Nhân vật {i}"), "cô giáo trẻ") {
            composer.add_character(&character);
            composer.set_dialogue(character.id, "Ý hay quá!");
        }
    }
    c.bench_function("build_request", |b| {
        b.iter(|| black_box(composer.build_request()))
    });
}

criterion_group!(
    benches,
    bench_render_structured_video,
    bench_render_text_to_image,
    bench_ensure_aspect_ratio,
    bench_style_toggle,
    bench_build_request,
);

criterion_main!(benches);
