use detdecode::{
    nms, CoordSpace, DecodeConfig, Decoder, Layout, NmsMode, RawTensor, COCO_CLASSES,
    YOLOV5_PREDICTIONS,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// YOLOv5-sized output where roughly one prediction in forty clears 0.3.
fn make_output(predictions: usize) -> RawTensor {
    let cols = 5 + COCO_CLASSES;
    let mut data = Vec::with_capacity(predictions * cols);
    for i in 0..predictions {
        let cell = (i % 400) as f32;
        data.push((cell % 20.0) / 20.0 + 0.025);
        data.push((cell / 20.0).floor() / 20.0 + 0.025);
        data.push(0.04 + ((i * 7) % 13) as f32 * 0.01);
        data.push(0.08 + ((i * 5) % 17) as f32 * 0.01);
        data.push(if i % 40 == 0 { 0.9 } else { 0.05 });
        for k in 0..COCO_CLASSES {
            data.push(if k == i % 3 { 0.8 } else { 0.01 });
        }
    }
    RawTensor::new(data, predictions, cols).unwrap()
}

fn bench_decoder(c: &mut Criterion) {
    let output = make_output(YOLOV5_PREDICTIONS);
    let transposed = output.transposed();

    let person = Decoder::new(DecodeConfig::default()).unwrap();
    c.bench_function("decode_person_prediction_major", |b| {
        b.iter(|| black_box(person.decode(output.view()).unwrap()));
    });

    let all_classes = Decoder::new(DecodeConfig {
        target_class: None,
        output_space: CoordSpace::Pixel {
            width: 1280,
            height: 720,
        },
        ..DecodeConfig::default()
    })
    .unwrap();
    c.bench_function("decode_all_classes_pixel", |b| {
        b.iter(|| black_box(all_classes.decode(output.view()).unwrap()));
    });

    let attribute_major = Decoder::new(DecodeConfig {
        layout: Layout::AttributeMajor,
        target_class: None,
        ..DecodeConfig::default()
    })
    .unwrap();
    c.bench_function("decode_all_classes_attribute_major", |b| {
        b.iter(|| black_box(attribute_major.decode(transposed.view()).unwrap()));
    });

    let loose = Decoder::new(DecodeConfig {
        target_class: None,
        iou_threshold: 1.0,
        ..DecodeConfig::default()
    })
    .unwrap();
    let candidates = loose.decode(output.view()).unwrap();
    c.bench_function("nms_only", |b| {
        b.iter(|| {
            let mut dets = candidates.clone();
            black_box(nms(&mut dets, 0.45, NmsMode::ClassAgnostic))
        });
    });

    #[cfg(feature = "rayon")]
    {
        let parallel = Decoder::new(DecodeConfig {
            target_class: None,
            parallel: true,
            ..DecodeConfig::default()
        })
        .unwrap();
        c.bench_function("decode_all_classes_parallel", |b| {
            b.iter(|| black_box(parallel.decode(output.view()).unwrap()));
        });
    }
}

criterion_group!(benches, bench_decoder);
criterion_main!(benches);
